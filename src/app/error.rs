//! Fehler der Viewer-Shell.

/// Abgewiesene Viewer-Operationen.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewerError {
    /// Ein Load läuft bereits; Loads werden von der Shell serialisiert
    #[error("es läuft bereits ein Load")]
    LoadInFlight,
    /// Archiv enthält keine unterstützte Design-Datei
    #[error("ZIP-Archiv {name} enthält keine unterstützte Datei")]
    EmptyArchive {
        /// Name bzw. URL des Archivs
        name: String,
    },
    /// Load-Anfrage ohne Quellen
    #[error("keine Quellen angegeben")]
    NoSources,
}
