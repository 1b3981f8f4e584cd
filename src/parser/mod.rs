//! Import von KiCad-Dateien.
//!
//! Ein kleiner S-Expression-Leser speist die Board- und Schaltplan-Parser;
//! Projektdateien sind JSON. `FileKind` routet nach Dateiendung.

pub mod board;
pub mod schematic;
pub mod settings;
pub mod sexpr;

pub use board::parse_board;
pub use schematic::parse_schematic;
pub use settings::parse_project_settings;
pub use sexpr::{parse_sexpr, SExpr, SExprError};

/// Dateityp anhand der Endung (Groß-/Kleinschreibung egal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.kicad_pcb`
    Board,
    /// `.kicad_sch`
    Schematic,
    /// `.kicad_pro`
    ProjectSettings,
    /// `.glb` (3-D-Modell, hier nicht verarbeitet)
    Model3d,
    /// Alles andere
    Unknown,
}

impl FileKind {
    /// Ermittelt den Dateityp aus dem Dateinamen.
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".kicad_pcb") {
            Self::Board
        } else if lower.ends_with(".kicad_sch") {
            Self::Schematic
        } else if lower.ends_with(".kicad_pro") {
            Self::ProjectSettings
        } else if lower.ends_with(".glb") {
            Self::Model3d
        } else {
            Self::Unknown
        }
    }

    /// Gibt `true` zurück für Dateien, die der Viewer selbst parsed.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Board | Self::Schematic | Self::ProjectSettings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_suffix_case_insensitively() {
        assert_eq!(FileKind::from_filename("Main.KiCad_PCB"), FileKind::Board);
        assert_eq!(FileKind::from_filename("a/b.kicad_sch"), FileKind::Schematic);
        assert_eq!(FileKind::from_filename("demo.kicad_pro"), FileKind::ProjectSettings);
        assert_eq!(FileKind::from_filename("case.glb"), FileKind::Model3d);
        assert_eq!(FileKind::from_filename("readme.md"), FileKind::Unknown);
        assert!(!FileKind::Model3d.is_supported());
    }
}
