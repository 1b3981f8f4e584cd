//! Zeitquelle für TTL-Berechnungen; in Tests manuell steuerbar.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Liefert den aktuellen Zeitpunkt.
pub trait Clock: Send + Sync {
    /// Aktueller Zeitpunkt.
    fn now(&self) -> Instant;
}

/// Echte Systemzeit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Simulierte Zeit, die nur per `advance` voranschreitet.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_millis: AtomicU64,
}

impl ManualClock {
    /// Erstellt eine Uhr, die beim aktuellen Zeitpunkt steht.
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_millis: AtomicU64::new(0),
        }
    }

    /// Stellt die Uhr um `delta` vor.
    pub fn advance(&self, delta: Duration) {
        self.offset_millis
            .fetch_add(delta.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_millis.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_on_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.advance(Duration::from_secs(601));
        assert_eq!(clock.now() - t0, Duration::from_secs(601));
    }
}
