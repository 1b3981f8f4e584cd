//! Bestimmung der Schaltplan-Hierarchie (Seitenliste und Root-Seite).

use indexmap::IndexMap;
use std::sync::Arc;

use crate::core::geometry::natural_cmp;
use crate::core::{SchematicDocument, SchematicSheet, SheetInstance};

/// Art einer Projektseite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Schaltplanseite
    Schematic,
    /// Platine
    Board,
}

/// Eine anzeigbare Seite des Projekts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPage {
    /// Seitenart
    pub kind: PageKind,
    /// Datei, die auf dieser Seite dargestellt wird
    pub filename: String,
    /// Hierarchischer Pfad (`/root-uuid/sheet-uuid`)
    pub project_path: String,
    /// Anzeigename
    pub name: String,
    /// Deklarierte Seitennummer
    pub page: Option<String>,
}

/// Ergebnis der Hierarchie-Bestimmung.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageHierarchy {
    /// Seiten nach Pfad, in Anzeigereihenfolge
    pub pages: IndexMap<String, ProjectPage>,
    /// Pfad der Root-Seite
    pub root_path: Option<String>,
}

impl PageHierarchy {
    /// Root-Seite.
    pub fn root(&self) -> Option<&ProjectPage> {
        self.root_path.as_ref().and_then(|p| self.pages.get(p))
    }
}

/// Ordnet die Schaltpläne zu einer Seitenliste.
///
/// Root ist das Dokument hinter dem kürzesten Sheet-Instanzpfad, dessen
/// Elternpfad zu einem bekannten Schaltplan auflöst. Nicht erreichbare
/// Dokumente werden als verwaiste Seiten angehängt; ohne Root wird die erste
/// Seite als Root verwendet.
pub fn determine_schematic_hierarchy(schematics: &[Arc<SchematicDocument>]) -> PageHierarchy {
    let by_filename: IndexMap<&str, &SchematicDocument> = schematics
        .iter()
        .map(|s| (s.filename.as_str(), s.as_ref()))
        .collect();

    let mut paths_to_schematics: IndexMap<String, &SchematicDocument> = IndexMap::new();
    let mut paths_to_sheet_instances: IndexMap<String, (&SchematicSheet, &SheetInstance)> =
        IndexMap::new();

    for schematic in schematics {
        paths_to_schematics.insert(format!("/{}", schematic.uuid), schematic.as_ref());
        for sheet in &schematic.sheets {
            let Some(file) = sheet.file.as_deref() else {
                continue;
            };
            if !by_filename.contains_key(file) {
                continue;
            }
            for instance in &sheet.instances {
                paths_to_schematics.insert(instance.path.clone(), schematic.as_ref());
                paths_to_sheet_instances
                    .insert(format!("{}/{}", instance.path, sheet.uuid), (sheet, instance));
            }
        }
    }

    let mut candidate_paths: Vec<&String> = paths_to_sheet_instances.keys().collect();
    candidate_paths.sort_by_key(|p| p.len());
    let root = candidate_paths.iter().find_map(|path| {
        let (parent, _) = path.rsplit_once('/')?;
        if parent.is_empty() {
            return None;
        }
        paths_to_schematics.get(parent).copied()
    });

    let mut pages: Vec<ProjectPage> = Vec::new();
    if let Some(root) = root {
        pages.push(ProjectPage {
            kind: PageKind::Schematic,
            filename: root.filename.clone(),
            project_path: format!("/{}", root.uuid),
            name: "Root".to_string(),
            page: Some(root.root_page.clone().unwrap_or_else(|| "1".to_string())),
        });
        for (path, (sheet, instance)) in &paths_to_sheet_instances {
            let file = sheet.file.clone().unwrap_or_default();
            pages.push(ProjectPage {
                kind: PageKind::Schematic,
                filename: file.clone(),
                project_path: path.clone(),
                name: sheet.name.clone().unwrap_or(file),
                page: Some(instance.page.clone().unwrap_or_default()),
            });
        }
    }
    pages.sort_by(|a, b| {
        natural_cmp(
            a.page.as_deref().unwrap_or_default(),
            b.page.as_deref().unwrap_or_default(),
        )
    });

    let mut hierarchy = PageHierarchy::default();
    for page in pages {
        hierarchy.pages.insert(page.project_path.clone(), page);
    }

    for schematic in schematics {
        let reachable = hierarchy
            .pages
            .values()
            .any(|p| p.filename == schematic.filename);
        if !reachable {
            let path = format!("/{}", schematic.uuid);
            log::debug!("Verwaiste Schaltplanseite: {}", schematic.filename);
            hierarchy.pages.insert(
                path.clone(),
                ProjectPage {
                    kind: PageKind::Schematic,
                    filename: schematic.filename.clone(),
                    project_path: path,
                    name: schematic.filename.clone(),
                    page: None,
                },
            );
        }
    }

    hierarchy.root_path = hierarchy.pages.keys().next().cloned();
    hierarchy
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn sheet(uuid: &str, file: &str, parent: &str, page: &str) -> SchematicSheet {
        SchematicSheet {
            uuid: uuid.into(),
            name: Some(format!("Sheet {page}")),
            file: Some(file.into()),
            position: Vec2::ZERO,
            size: Vec2::ONE,
            instances: vec![SheetInstance {
                path: parent.into(),
                page: Some(page.into()),
            }],
        }
    }

    #[test]
    fn pages_sort_numerically() {
        let mut root = SchematicDocument::new("root.kicad_sch", "r");
        root.sheets = vec![
            sheet("s10", "ten.kicad_sch", "/r", "10"),
            sheet("s2", "two.kicad_sch", "/r", "2"),
        ];
        let docs = vec![
            Arc::new(root),
            Arc::new(SchematicDocument::new("ten.kicad_sch", "t")),
            Arc::new(SchematicDocument::new("two.kicad_sch", "w")),
        ];

        let h = determine_schematic_hierarchy(&docs);
        let numbers: Vec<&str> = h
            .pages
            .values()
            .filter_map(|p| p.page.as_deref())
            .collect();
        assert_eq!(numbers, vec!["1", "2", "10"]);
        assert_eq!(h.root().map(|p| p.filename.as_str()), Some("root.kicad_sch"));
        assert!(h.pages.contains_key("/r/s2"));
    }

    #[test]
    fn unreachable_documents_become_orphans() {
        let mut root = SchematicDocument::new("root.kicad_sch", "r");
        root.sheets = vec![sheet("s2", "two.kicad_sch", "/r", "2")];
        let docs = vec![
            Arc::new(root),
            Arc::new(SchematicDocument::new("two.kicad_sch", "w")),
            Arc::new(SchematicDocument::new("loose.kicad_sch", "l")),
        ];
        let h = determine_schematic_hierarchy(&docs);
        assert_eq!(h.pages.len(), 3);
        assert_eq!(
            h.pages.get("/l").map(|p| p.name.as_str()),
            Some("loose.kicad_sch")
        );
    }

    #[test]
    fn without_hierarchy_first_page_is_root() {
        let docs = vec![
            Arc::new(SchematicDocument::new("a.kicad_sch", "a")),
            Arc::new(SchematicDocument::new("b.kicad_sch", "b")),
        ];
        let h = determine_schematic_hierarchy(&docs);
        assert_eq!(h.root_path.as_deref(), Some("/a"));
        assert_eq!(h.pages.len(), 2);
    }
}
