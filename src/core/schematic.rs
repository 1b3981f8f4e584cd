//! Schaltplan-Dokument: Symbole, Sheets, Labels, Wires.

use glam::Vec2;

/// Instanz eines Symbols in einem konkreten Sheet-Pfad.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInstance {
    /// Sheet-Pfad (`/root-uuid/sheet-uuid`)
    pub path: String,
    /// Referenz-Designator dieser Instanz
    pub reference: String,
    /// Unit-Nummer
    pub unit: u32,
}

/// Platziertes Schaltplan-Symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SchematicSymbol {
    /// UUID
    pub uuid: String,
    /// Bibliotheks-ID
    pub lib_id: String,
    /// Referenz (Property `Reference`)
    pub reference: String,
    /// Wert (Property `Value`)
    pub value: String,
    /// Footprint (Property `Footprint`)
    pub footprint: String,
    /// Position
    pub position: Vec2,
    /// "Do not populate"
    pub dnp: bool,
    /// In der Stückliste
    pub in_bom: bool,
    /// Instanzen pro Sheet-Pfad
    pub instances: Vec<SymbolInstance>,
}

impl SchematicSymbol {
    /// Power-Symbole und Flags (`#PWR`, `#FLG`) gehören nicht in die Stückliste.
    pub fn is_virtual(&self) -> bool {
        self.reference.starts_with('#')
    }

    /// Alle Designatoren dieses Symbols (Instanz-Referenzen, sonst die Property).
    pub fn designators(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self
            .instances
            .iter()
            .map(|i| i.reference.as_str())
            .filter(|r| !r.is_empty())
            .collect();
        if refs.is_empty() && !self.reference.is_empty() {
            refs.push(self.reference.as_str());
        }
        refs.dedup();
        refs
    }
}

/// Instanz eines Sheets (Elternpfad + Seitennummer).
#[derive(Debug, Clone, PartialEq)]
pub struct SheetInstance {
    /// Pfad des Eltern-Sheets
    pub path: String,
    /// Deklarierte Seitennummer
    pub page: Option<String>,
}

/// Hierarchisches Sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SchematicSheet {
    /// UUID
    pub uuid: String,
    /// Sheet-Name (Property `Sheetname`)
    pub name: Option<String>,
    /// Referenzierte Datei (Property `Sheetfile`)
    pub file: Option<String>,
    /// Position
    pub position: Vec2,
    /// Größe
    pub size: Vec2,
    /// Instanzen
    pub instances: Vec<SheetInstance>,
}

/// Art eines Netz-Labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Lokales Label
    Local,
    /// Globales Label
    Global,
    /// Hierarchisches Label
    Hierarchical,
}

/// Netz-Label.
#[derive(Debug, Clone, PartialEq)]
pub struct NetLabel {
    /// UUID
    pub uuid: String,
    /// Labeltext (Netzname)
    pub text: String,
    /// Art
    pub kind: LabelKind,
    /// Position
    pub position: Vec2,
    /// Rotation (Grad)
    pub rotation: f32,
}

/// Leitung.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    /// UUID
    pub uuid: String,
    /// Stützpunkte
    pub points: Vec<Vec2>,
}

/// Vollständiges Schaltplan-Dokument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchematicDocument {
    /// Dateiname
    pub filename: String,
    /// Format-Version
    pub version: Option<String>,
    /// UUID des Dokuments
    pub uuid: String,
    /// Titel aus dem Title-Block
    pub title: Option<String>,
    /// Seitennummer aus `sheet_instances` (nur Root-Dokumente)
    pub root_page: Option<String>,
    /// Symbole
    pub symbols: Vec<SchematicSymbol>,
    /// Sheets
    pub sheets: Vec<SchematicSheet>,
    /// Labels
    pub labels: Vec<NetLabel>,
    /// Leitungen
    pub wires: Vec<Wire>,
}

impl SchematicDocument {
    /// Erstellt ein leeres Schaltplan-Dokument.
    pub fn new(filename: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    /// Findet ein Symbol anhand eines Designators (Instanz oder Property).
    pub fn find_symbol(&self, designator: &str) -> Option<&SchematicSymbol> {
        self.symbols
            .iter()
            .find(|s| s.designators().contains(&designator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn designators_prefer_instance_references() {
        let symbol = SchematicSymbol {
            uuid: "u1".into(),
            lib_id: "Device:R".into(),
            reference: "R?".into(),
            value: "10k".into(),
            footprint: String::new(),
            position: Vec2::ZERO,
            dnp: false,
            in_bom: true,
            instances: vec![
                SymbolInstance {
                    path: "/a/b".into(),
                    reference: "R1".into(),
                    unit: 1,
                },
                SymbolInstance {
                    path: "/a/c".into(),
                    reference: "R7".into(),
                    unit: 1,
                },
            ],
        };
        assert_eq!(symbol.designators(), vec!["R1", "R7"]);
        assert!(!symbol.is_virtual());
    }
}
