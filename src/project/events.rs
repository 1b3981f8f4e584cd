//! Ereignisse des Document Stores (Ladefortschritt, Load, Metadaten).

use std::sync::Mutex;

/// Phase eines Loads für Fortschrittsanzeigen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadPhase {
    /// Quellen werden geladen
    Download,
    /// Einzelne Datei wird geparsed
    Parse,
    /// Erweiterte Glyph-Tabelle wird geladen
    Glyphs,
    /// Schaltplan-Hierarchie wird bestimmt
    Hierarchy,
    /// Stückliste wird berechnet
    Bom,
    /// Abschluss (Indizes, Cache)
    Finalize,
    /// Load ist gescheitert; Meldung bleibt sichtbar
    Failed,
}

/// Fortschrittsmeldung `{ phase, message, done?, total? }`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LoadStatus {
    /// Phase
    pub phase: LoadPhase,
    /// Menschenlesbare Meldung
    pub message: String,
    /// Erledigte Schritte
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<usize>,
    /// Gesamtzahl Schritte
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl LoadStatus {
    /// Meldung ohne Zähler.
    pub fn new(phase: LoadPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            done: None,
            total: None,
        }
    }

    /// Meldung mit Fortschrittszähler.
    pub fn progress(phase: LoadPhase, message: impl Into<String>, done: usize, total: usize) -> Self {
        Self {
            phase,
            message: message.into(),
            done: Some(done),
            total: Some(total),
        }
    }
}

/// Ereignis eines Projekts.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    /// Fortschritt
    Status(LoadStatus),
    /// Load abgeschlossen ("loaded"-Gate offen)
    Loaded {
        /// Aus dem Snapshot-Cache wiederhergestellt
        from_cache: bool,
    },
    /// Anzeigename des Projekts hat sich geändert
    FileMetaChanged {
        /// Neuer Anzeigename
        display_name: String,
    },
}

/// Thread-sichere Ereignis-Warteschlange; Worker-Threads melden hier Fortschritt.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<Vec<ProjectEvent>>,
}

impl EventQueue {
    /// Hängt ein Ereignis an.
    pub fn push(&self, event: ProjectEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    /// Meldet einen Fortschritt.
    pub fn status(&self, status: LoadStatus) {
        log::debug!("Load-Status {:?}: {}", status.phase, status.message);
        self.push(ProjectEvent::Status(status));
    }

    /// Entnimmt alle bisher gemeldeten Ereignisse.
    pub fn drain(&self) -> Vec<ProjectEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}
