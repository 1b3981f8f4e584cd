//! Parser für KiCad-Schaltpläne (`.kicad_sch`).
//!
//! Bibliothekssymbole (`lib_symbols`) werden übersprungen; benötigt werden nur
//! platzierte Symbole, Sheets, Labels und Wires.

use anyhow::{bail, Context, Result};
use glam::Vec2;

use super::sexpr::{parse_sexpr, SExpr};
use crate::core::{
    LabelKind, NetLabel, SchematicDocument, SchematicSheet, SchematicSymbol, SheetInstance,
    SymbolInstance, Wire,
};

/// Parsed einen Schaltplan aus dem Dateiinhalt.
pub fn parse_schematic(filename: &str, text: &str) -> Result<SchematicDocument> {
    let root = parse_sexpr(text).with_context(|| format!("S-Expression in {filename} ungültig"))?;
    if root.head() != Some("kicad_sch") {
        bail!(
            "{filename}: kein kicad_sch-Dokument (Kopf: {:?})",
            root.head()
        );
    }

    let mut doc = SchematicDocument::new(filename, root.child_str("uuid").unwrap_or_default());
    doc.version = root.child_str("version").map(str::to_string);
    doc.title = root
        .child("title_block")
        .and_then(|tb| tb.child_str("title"))
        .map(str::to_string);
    doc.root_page = root
        .child("sheet_instances")
        .and_then(|si| si.children("path").find(|p| p.str_arg(0) == Some("/")))
        .and_then(|p| p.child_str("page"))
        .map(str::to_string);

    for item in root.args() {
        match item.head() {
            Some("symbol") => doc.symbols.push(parse_symbol(item)),
            Some("sheet") => doc.sheets.push(parse_sheet(item)),
            Some("wire") => doc.wires.push(Wire {
                uuid: item.child_str("uuid").unwrap_or_default().to_string(),
                points: parse_points(item),
            }),
            Some("label") => push_label(&mut doc, item, LabelKind::Local),
            Some("global_label") => push_label(&mut doc, item, LabelKind::Global),
            Some("hierarchical_label") => push_label(&mut doc, item, LabelKind::Hierarchical),
            _ => {}
        }
    }

    if let Some(legacy) = root.child("symbol_instances") {
        apply_legacy_symbol_instances(&mut doc, legacy);
    }

    log::debug!(
        "{}: {} Symbole, {} Sheets, {} Labels",
        filename,
        doc.symbols.len(),
        doc.sheets.len(),
        doc.labels.len()
    );
    Ok(doc)
}

fn parse_points(expr: &SExpr) -> Vec<Vec2> {
    expr.child("pts")
        .map(|pts| {
            pts.children("xy")
                .filter_map(|xy| Some(Vec2::new(xy.f32_arg(0)?, xy.f32_arg(1)?)))
                .collect()
        })
        .unwrap_or_default()
}

fn position_of(expr: &SExpr) -> (Vec2, f32) {
    expr.child("at")
        .map(|at| {
            (
                Vec2::new(at.f32_arg(0).unwrap_or(0.0), at.f32_arg(1).unwrap_or(0.0)),
                at.f32_arg(2).unwrap_or(0.0),
            )
        })
        .unwrap_or((Vec2::ZERO, 0.0))
}

fn push_label(doc: &mut SchematicDocument, expr: &SExpr, kind: LabelKind) {
    let Some(text) = expr.str_arg(0) else {
        return;
    };
    let (position, rotation) = position_of(expr);
    doc.labels.push(NetLabel {
        uuid: expr.child_str("uuid").unwrap_or_default().to_string(),
        text: text.to_string(),
        kind,
        position,
        rotation,
    });
}

/// `(instances (project "name" (path "/…" (reference "R1") (unit 1))))`
fn parse_symbol(expr: &SExpr) -> SchematicSymbol {
    let instances = expr
        .child("instances")
        .into_iter()
        .flat_map(|i| i.children("project"))
        .flat_map(|p| p.children("path"))
        .map(|path| SymbolInstance {
            path: path.str_arg(0).unwrap_or_default().to_string(),
            reference: path.child_str("reference").unwrap_or_default().to_string(),
            unit: path
                .child("unit")
                .and_then(|u| u.f32_arg(0))
                .map_or(1, |u| u as u32),
        })
        .collect();

    SchematicSymbol {
        uuid: expr.child_str("uuid").unwrap_or_default().to_string(),
        lib_id: expr.child_str("lib_id").unwrap_or_default().to_string(),
        reference: expr.property("Reference").unwrap_or_default().to_string(),
        value: expr.property("Value").unwrap_or_default().to_string(),
        footprint: expr.property("Footprint").unwrap_or_default().to_string(),
        position: position_of(expr).0,
        dnp: expr.child("dnp").is_some_and(|d| d.str_arg(0) != Some("no")),
        in_bom: expr.child("in_bom").map_or(true, |b| b.str_arg(0) != Some("no")),
        instances,
    }
}

fn parse_sheet(expr: &SExpr) -> SchematicSheet {
    let instances = expr
        .child("instances")
        .into_iter()
        .flat_map(|i| i.children("project"))
        .flat_map(|p| p.children("path"))
        .map(|path| SheetInstance {
            path: path.str_arg(0).unwrap_or_default().to_string(),
            page: path.child_str("page").map(str::to_string),
        })
        .collect();

    SchematicSheet {
        uuid: expr.child_str("uuid").unwrap_or_default().to_string(),
        name: expr
            .property("Sheetname")
            .or_else(|| expr.property("Sheet name"))
            .map(str::to_string),
        file: expr
            .property("Sheetfile")
            .or_else(|| expr.property("Sheet file"))
            .map(str::to_string),
        position: position_of(expr).0,
        size: expr.child_vec2("size").unwrap_or(Vec2::ZERO),
        instances,
    }
}

/// KiCad-6-Format: Instanzen stehen zentral im Root-Dokument,
/// das letzte Pfadsegment ist die Symbol-UUID.
fn apply_legacy_symbol_instances(doc: &mut SchematicDocument, legacy: &SExpr) {
    for path in legacy.children("path") {
        let Some(full) = path.str_arg(0) else {
            continue;
        };
        let Some((parent, uuid)) = full.rsplit_once('/') else {
            continue;
        };
        if let Some(symbol) = doc.symbols.iter_mut().find(|s| s.uuid == uuid) {
            symbol.instances.push(SymbolInstance {
                path: parent.to_string(),
                reference: path.child_str("reference").unwrap_or_default().to_string(),
                unit: path
                    .child("unit")
                    .and_then(|u| u.f32_arg(0))
                    .map_or(1, |u| u as u32),
            });
        }
    }
}
