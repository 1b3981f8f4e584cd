//! Stückliste (Bill of Materials) aus Schaltplänen oder Boards.
//!
//! Gruppiert wird nach `(footprint, value, dnp)`; die Designatoren einer Gruppe
//! werden in einer Zeile zusammengeführt und natürlich sortiert.

use indexmap::IndexMap;

use super::board::BoardDocument;
use super::geometry::natural_cmp;
use super::schematic::SchematicDocument;

/// Eine Zeile der Stückliste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomItem {
    /// Footprint (Bibliotheks-ID)
    pub footprint: String,
    /// Wert
    pub value: String,
    /// "Do not populate"
    pub dnp: bool,
    /// Zusammengeführte Designatoren (natürlich sortiert, ohne Duplikate)
    pub designators: Vec<String>,
}

impl BomItem {
    /// Stückzahl der Zeile.
    pub fn quantity(&self) -> usize {
        self.designators.len()
    }
}

type BomKey = (String, String, bool);

fn collect(entries: impl Iterator<Item = (BomKey, String)>) -> Vec<BomItem> {
    let mut groups: IndexMap<BomKey, Vec<String>> = IndexMap::new();
    for (key, designator) in entries {
        groups.entry(key).or_default().push(designator);
    }

    let mut items: Vec<BomItem> = groups
        .into_iter()
        .map(|((footprint, value, dnp), mut designators)| {
            designators.sort_by(|a, b| natural_cmp(a, b));
            designators.dedup();
            BomItem {
                footprint,
                value,
                dnp,
                designators,
            }
        })
        .collect();

    // DNP-Zeilen ans Ende, sonst nach erstem Designator
    items.sort_by(|a, b| {
        a.dnp.cmp(&b.dnp).then_with(|| {
            let da = a.designators.first().map(String::as_str).unwrap_or("");
            let db = b.designators.first().map(String::as_str).unwrap_or("");
            natural_cmp(da, db)
        })
    });
    items
}

/// Stückliste aus allen Schaltplänen (Symbole mit `in_bom`, ohne Power-Symbole).
pub fn bom_from_schematics<'a>(
    schematics: impl IntoIterator<Item = &'a SchematicDocument>,
) -> Vec<BomItem> {
    let entries = schematics
        .into_iter()
        .flat_map(|sch| sch.symbols.iter())
        .filter(|s| s.in_bom && !s.is_virtual())
        .flat_map(|s| {
            let key = (s.footprint.clone(), s.value.clone(), s.dnp);
            s.designators()
                .into_iter()
                .map(move |d| (key.clone(), d.to_string()))
        });
    collect(entries)
}

/// Stückliste aus allen Boards (Footprints ohne `exclude_from_bom`).
pub fn bom_from_boards<'a>(boards: impl IntoIterator<Item = &'a BoardDocument>) -> Vec<BomItem> {
    let entries = boards
        .into_iter()
        .flat_map(|b| b.footprints.iter())
        .filter(|f| !f.exclude_from_bom && !f.reference.is_empty() && !f.reference.starts_with('#'))
        .map(|f| {
            (
                (f.lib_id.clone(), f.value.clone(), f.dnp),
                f.reference.clone(),
            )
        });
    collect(entries)
}
