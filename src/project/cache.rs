//! Snapshot-Cache: memoisiert geparste Projekte hinter einem Content-Key.
//!
//! Reine Datenstruktur ohne I/O und ohne eigene Uhr: jeder Aufruf bekommt `now`.
//! Einträge verfallen `ttl` nach ihrer letzten Nutzung; nach jedem `put` wird
//! auf `capacity` Einträge (LRU) reduziert.

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::sources::CacheKey;

/// Ein Cache-Eintrag mit Zeitstempeln.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    /// Geteilte, unveränderliche Nutzdaten
    pub data: Arc<T>,
    /// Zeitpunkt des Einfügens
    pub created_at: Instant,
    /// Zeitpunkt der letzten Nutzung
    pub last_used_at: Instant,
}

impl<T> Snapshot<T> {
    /// Erstellt einen frischen Snapshot.
    pub fn new(data: T, now: Instant) -> Self {
        Self {
            data: Arc::new(data),
            created_at: now,
            last_used_at: now,
        }
    }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_used_at) > ttl
    }
}

/// Key → Snapshot mit TTL und Kapazitätsgrenze.
#[derive(Debug)]
pub struct SnapshotCache<T> {
    entries: IndexMap<CacheKey, Snapshot<T>>,
    ttl: Duration,
    capacity: usize,
}

impl<T> SnapshotCache<T> {
    /// Erstellt einen leeren Cache.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            ttl,
            capacity,
        }
    }

    /// Konfigurierte TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Konfigurierte Kapazität.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Anzahl gehaltener Einträge.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Gibt `true` zurück, wenn der Cache leer ist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gibt `true` zurück, wenn ein (evtl. abgelaufener) Eintrag existiert.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Liefert die Daten zu `key`; räumt vorher abgelaufene Einträge ab
    /// und aktualisiert `last_used_at` bei Treffer.
    pub fn get(&mut self, key: &CacheKey, now: Instant) -> Option<Arc<T>> {
        self.evict_expired(self.ttl, now);
        let entry = self.entries.get_mut(key)?;
        entry.last_used_at = now;
        Some(Arc::clone(&entry.data))
    }

    /// Legt einen Snapshot ab und hält danach die Kapazitätsgrenze ein.
    pub fn put(&mut self, key: CacheKey, snapshot: Snapshot<T>) {
        log::debug!("Snapshot-Cache: speichere {}", key);
        self.entries.insert(key, snapshot);
        self.evict_lru(self.capacity);
    }

    /// Entfernt alle Einträge, deren letzte Nutzung länger als `ttl` zurückliegt.
    pub fn evict_expired(&mut self, ttl: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, snap| {
            let keep = !snap.is_expired(ttl, now);
            if !keep {
                log::info!("Snapshot-Cache: {} abgelaufen", key);
            }
            keep
        });
        before - self.entries.len()
    }

    /// Entfernt die am längsten ungenutzten Einträge bis höchstens `max_entries` übrig sind.
    pub fn evict_lru(&mut self, max_entries: usize) -> usize {
        let mut evicted = 0;
        while self.entries.len() > max_entries {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, snap)| snap.last_used_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            self.entries.shift_remove(&oldest);
            log::info!("Snapshot-Cache: {} verdrängt (LRU)", oldest);
            evicted += 1;
        }
        evicted
    }

    /// Leert den Cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::sources::{LoadSources, SourceBlob};

    fn key(name: &str) -> CacheKey {
        CacheKey::from_sources(
            &LoadSources::from_blobs(vec![SourceBlob::new(name, "x")]),
            64,
        )
    }

    #[test]
    fn get_refreshes_last_used() {
        let t0 = Instant::now();
        let mut cache = SnapshotCache::new(Duration::from_secs(10), 3);
        cache.put(key("a"), Snapshot::new(1, t0));

        let later = t0 + Duration::from_secs(8);
        assert_eq!(cache.get(&key("a"), later).as_deref(), Some(&1));
        // 8 s + 8 s liegt über der TTL ab Einfügen, aber nicht ab letzter Nutzung
        assert!(cache.get(&key("a"), later + Duration::from_secs(8)).is_some());
    }

    #[test]
    fn lru_is_evicted_beyond_capacity() {
        let t0 = Instant::now();
        let mut cache = SnapshotCache::new(Duration::from_secs(600), 3);
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            cache.put(key(name), Snapshot::new(i, t0 + Duration::from_secs(i as u64)));
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&key("a"), t0 + Duration::from_secs(5)).is_none());
        assert!(cache.get(&key("d"), t0 + Duration::from_secs(5)).is_some());
    }

    #[test]
    fn expired_entries_miss_regardless_of_capacity() {
        let t0 = Instant::now();
        let mut cache = SnapshotCache::new(Duration::from_secs(600), 3);
        cache.put(key("a"), Snapshot::new(1, t0));
        let after_ttl = t0 + Duration::from_secs(601);
        assert!(cache.get(&key("a"), after_ttl).is_none());
        assert!(cache.is_empty());
    }
}
