//! Parser für KiCad-Platinendateien (`.kicad_pcb`).

use anyhow::{bail, Context, Result};
use glam::Vec2;
use std::collections::HashMap;

use super::sexpr::{parse_sexpr, SExpr};
use crate::core::geometry::local_to_world;
use crate::core::{
    BoardDocument, BoardText, Footprint, GraphicItem, GraphicShape, LayerDecl, LayerKind, Net,
    NetNumber, Pad, PadKind, PadNet, PadShape, TrackArc, TrackSegment, Via, ViaKind, Zone,
};

/// Lokale Transformation eines Footprints (Ursprung + Rotation).
#[derive(Clone, Copy)]
struct Placement {
    origin: Vec2,
    rotation: f32,
}

impl Placement {
    const IDENTITY: Self = Self {
        origin: Vec2::ZERO,
        rotation: 0.0,
    };

    fn apply(&self, local: Vec2) -> Vec2 {
        if self.rotation == 0.0 && self.origin == Vec2::ZERO {
            local
        } else {
            local_to_world(local, self.origin, self.rotation)
        }
    }
}

/// Parsed ein Board aus dem Dateiinhalt.
pub fn parse_board(filename: &str, text: &str) -> Result<BoardDocument> {
    let root = parse_sexpr(text).with_context(|| format!("S-Expression in {filename} ungültig"))?;
    if root.head() != Some("kicad_pcb") {
        bail!(
            "{filename}: kein kicad_pcb-Dokument (Kopf: {:?})",
            root.head()
        );
    }

    let mut board = BoardDocument::new(filename);
    board.version = root.child_str("version").map(str::to_string);
    board.title = root
        .child("title_block")
        .and_then(|tb| tb.child_str("title"))
        .map(str::to_string);

    if let Some(layers) = root.child("layers") {
        board.layers = layers.args().iter().filter_map(parse_layer_decl).collect();
    }

    for net in root.children("net") {
        if let (Some(number), Some(name)) = (net.f32_arg(0), net.str_arg(1)) {
            board.nets.push(Net {
                number: number as NetNumber,
                name: name.to_string(),
            });
        }
    }
    let net_names: HashMap<String, NetNumber> = board
        .nets
        .iter()
        .map(|n| (n.name.clone(), n.number))
        .collect();

    for item in root.args() {
        match item.head() {
            Some("footprint") | Some("module") => {
                board.footprints.push(parse_footprint(item, &net_names))
            }
            Some("segment") => {
                if let Some(seg) = parse_segment(item, &net_names) {
                    board.segments.push(seg);
                }
            }
            Some("arc") => {
                if let Some(arc) = parse_track_arc(item, &net_names) {
                    board.arcs.push(arc);
                }
            }
            Some("via") => {
                if let Some(via) = parse_via(item, &net_names) {
                    board.vias.push(via);
                }
            }
            Some("zone") => board.zones.push(parse_zone(item, &net_names)),
            Some("gr_text") => {
                if let Some(text) = parse_text(item, 0, &Placement::IDENTITY) {
                    board.texts.push(text);
                }
            }
            Some(head) if head.starts_with("gr_") => {
                if let Some(g) = parse_graphic(item, &Placement::IDENTITY) {
                    board.graphics.push(g);
                }
            }
            _ => {}
        }
    }

    log::debug!(
        "{}: {} Layer, {} Netze, {} Footprints, {} Segmente, {} Vias, {} Zonen",
        filename,
        board.layers.len(),
        board.nets.len(),
        board.footprints.len(),
        board.segments.len(),
        board.vias.len(),
        board.zones.len()
    );
    Ok(board)
}

fn parse_layer_decl(expr: &SExpr) -> Option<LayerDecl> {
    let ordinal = expr.head()?.parse::<i32>().ok()?;
    Some(LayerDecl {
        ordinal,
        name: expr.str_arg(0)?.to_string(),
        kind: LayerKind::from_token(expr.str_arg(1).unwrap_or("user")),
        user_name: expr.str_arg(2).map(str::to_string),
    })
}

/// Netznummer aus `(net 3)`, `(net 3 "GND")` oder `(net "GND")`.
fn parse_net_ref(expr: &SExpr, net_names: &HashMap<String, NetNumber>) -> Option<PadNet> {
    let net = expr.child("net")?;
    let first = net.str_arg(0)?;
    match first.parse::<u32>() {
        Ok(number) => {
            let name = net.str_arg(1).unwrap_or_default().to_string();
            Some(PadNet { number, name })
        }
        Err(_) => Some(PadNet {
            number: net_names.get(first).copied().unwrap_or(0),
            name: first.to_string(),
        }),
    }
}

fn net_number(expr: &SExpr, net_names: &HashMap<String, NetNumber>) -> NetNumber {
    parse_net_ref(expr, net_names).map_or(0, |n| n.number)
}

fn uuid_of(expr: &SExpr) -> String {
    expr.child_str("uuid")
        .or_else(|| expr.child_str("tstamp"))
        .unwrap_or_default()
        .to_string()
}

fn stroke_width(expr: &SExpr) -> f32 {
    expr.child("stroke")
        .and_then(|s| s.child("width"))
        .and_then(|w| w.f32_arg(0))
        .or_else(|| expr.child("width").and_then(|w| w.f32_arg(0)))
        .unwrap_or(0.0)
}

fn parse_points(expr: &SExpr, placement: &Placement) -> Vec<Vec2> {
    expr.child("pts")
        .map(|pts| {
            pts.children("xy")
                .filter_map(|xy| Some(placement.apply(Vec2::new(xy.f32_arg(0)?, xy.f32_arg(1)?))))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_footprint(expr: &SExpr, net_names: &HashMap<String, NetNumber>) -> Footprint {
    let at = expr.child("at");
    let position = at
        .and_then(|a| Some(Vec2::new(a.f32_arg(0)?, a.f32_arg(1)?)))
        .unwrap_or(Vec2::ZERO);
    let rotation = at.and_then(|a| a.f32_arg(2)).unwrap_or(0.0);
    let placement = Placement {
        origin: position,
        rotation,
    };
    let attr = expr.child("attr");

    let mut reference = expr.property("Reference").unwrap_or_default().to_string();
    let mut value = expr.property("Value").unwrap_or_default().to_string();
    let mut texts = Vec::new();

    for p in expr.children("property") {
        if let Some(text) = parse_text(p, 1, &placement) {
            texts.push(text);
        }
    }
    for t in expr.children("fp_text") {
        match t.str_arg(0) {
            Some("reference") if reference.is_empty() => {
                reference = t.str_arg(1).unwrap_or_default().to_string()
            }
            Some("value") if value.is_empty() => value = t.str_arg(1).unwrap_or_default().to_string(),
            _ => {}
        }
        if let Some(text) = parse_text(t, 1, &placement) {
            texts.push(text);
        }
    }

    let pads = expr
        .children("pad")
        .map(|p| parse_pad(p, &placement, net_names))
        .collect();
    let graphics = expr
        .args()
        .iter()
        .filter(|c| c.head().is_some_and(|h| h.starts_with("fp_") && h != "fp_text"))
        .filter_map(|c| parse_graphic(c, &placement))
        .collect();

    Footprint {
        uuid: uuid_of(expr),
        lib_id: expr.str_arg(0).unwrap_or_default().to_string(),
        reference,
        value,
        layer: expr.child_str("layer").unwrap_or("F.Cu").to_string(),
        position,
        rotation,
        dnp: attr.is_some_and(|a| a.flag("dnp")) || expr.flag("dnp"),
        exclude_from_bom: attr.is_some_and(|a| a.flag("exclude_from_bom")),
        pads,
        graphics,
        texts,
    }
}

fn parse_pad(expr: &SExpr, placement: &Placement, net_names: &HashMap<String, NetNumber>) -> Pad {
    let at = expr.child("at");
    let local = at
        .and_then(|a| Some(Vec2::new(a.f32_arg(0)?, a.f32_arg(1)?)))
        .unwrap_or(Vec2::ZERO);
    // Pad-Winkel ist in der Datei bereits absolut
    let rotation = at.and_then(|a| a.f32_arg(2)).unwrap_or(placement.rotation);
    let size = expr
        .child_vec2("size")
        .unwrap_or_else(|| Vec2::splat(expr.child("size").and_then(|s| s.f32_arg(0)).unwrap_or(0.0)));
    let drill = expr.child("drill").and_then(|d| {
        d.args()
            .iter()
            .find_map(|a| a.as_f32())
    });
    let layers = expr
        .child("layers")
        .map(|l| l.args().iter().filter_map(SExpr::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    Pad {
        number: expr.str_arg(0).unwrap_or_default().to_string(),
        kind: PadKind::from_token(expr.str_arg(1).unwrap_or("smd")),
        shape: PadShape::from_token(expr.str_arg(2).unwrap_or("rect")),
        position: placement.apply(local),
        size,
        rotation,
        layers,
        net: parse_net_ref(expr, net_names),
        drill,
        uuid: expr.child_str("uuid").map(str::to_string),
    }
}

fn parse_segment(expr: &SExpr, net_names: &HashMap<String, NetNumber>) -> Option<TrackSegment> {
    Some(TrackSegment {
        uuid: uuid_of(expr),
        start: expr.child_vec2("start")?,
        end: expr.child_vec2("end")?,
        width: expr.child("width").and_then(|w| w.f32_arg(0)).unwrap_or(0.0),
        layer: expr.child_str("layer")?.to_string(),
        net: net_number(expr, net_names),
    })
}

fn parse_track_arc(expr: &SExpr, net_names: &HashMap<String, NetNumber>) -> Option<TrackArc> {
    Some(TrackArc {
        uuid: uuid_of(expr),
        start: expr.child_vec2("start")?,
        mid: expr.child_vec2("mid")?,
        end: expr.child_vec2("end")?,
        width: expr.child("width").and_then(|w| w.f32_arg(0)).unwrap_or(0.0),
        layer: expr.child_str("layer")?.to_string(),
        net: net_number(expr, net_names),
    })
}

fn parse_via(expr: &SExpr, net_names: &HashMap<String, NetNumber>) -> Option<Via> {
    let kind = if expr.flag("micro") {
        ViaKind::Micro
    } else if expr.flag("blind") {
        ViaKind::BlindBuried
    } else {
        ViaKind::Through
    };
    let layers = expr.child("layers");
    let from = layers.and_then(|l| l.str_arg(0)).unwrap_or("F.Cu");
    let to = layers.and_then(|l| l.str_arg(1)).unwrap_or("B.Cu");

    Some(Via {
        uuid: uuid_of(expr),
        kind,
        position: expr.child_vec2("at")?,
        diameter: expr.child("size").and_then(|s| s.f32_arg(0)).unwrap_or(0.0),
        drill: expr.child("drill").and_then(|d| d.f32_arg(0)).unwrap_or(0.0),
        layers: (from.to_string(), to.to_string()),
        net: net_number(expr, net_names),
    })
}

fn parse_zone(expr: &SExpr, net_names: &HashMap<String, NetNumber>) -> Zone {
    let mut layers: Vec<String> = expr
        .child("layers")
        .map(|l| l.args().iter().filter_map(SExpr::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    if let Some(layer) = expr.child_str("layer") {
        layers.push(layer.to_string());
    }

    let outline = expr
        .child("polygon")
        .map(|p| parse_points(p, &Placement::IDENTITY))
        .unwrap_or_default();
    let filled = expr
        .children("filled_polygon")
        .map(|fp| {
            let layer = fp
                .child_str("layer")
                .map(str::to_string)
                .or_else(|| layers.first().cloned())
                .unwrap_or_default();
            (layer, parse_points(fp, &Placement::IDENTITY))
        })
        .collect();

    let net_name = expr.child_str("net_name").unwrap_or_default().to_string();
    let net = match expr.child("net").and_then(|n| n.str_arg(0)) {
        Some(first) => first
            .parse::<u32>()
            .ok()
            .or_else(|| net_names.get(first).copied())
            .unwrap_or(0),
        None => net_names.get(&net_name).copied().unwrap_or(0),
    };

    Zone {
        uuid: uuid_of(expr),
        net,
        net_name,
        layers,
        outline,
        filled,
    }
}

fn parse_graphic(expr: &SExpr, placement: &Placement) -> Option<GraphicItem> {
    let head = expr.head()?;
    let kind = head.trim_start_matches("gr_").trim_start_matches("fp_");
    let pt = |name: &str| expr.child_vec2(name).map(|p| placement.apply(p));

    let shape = match kind {
        "line" => GraphicShape::Line {
            start: pt("start")?,
            end: pt("end")?,
        },
        "rect" => {
            let (a, b) = (expr.child_vec2("start")?, expr.child_vec2("end")?);
            if placement.rotation == 0.0 {
                GraphicShape::Rect {
                    start: placement.apply(a),
                    end: placement.apply(b),
                }
            } else {
                let corners = [a, Vec2::new(b.x, a.y), b, Vec2::new(a.x, b.y)];
                GraphicShape::Polygon {
                    points: corners.iter().map(|c| placement.apply(*c)).collect(),
                }
            }
        }
        "circle" => {
            let center = pt("center")?;
            let end = pt("end")?;
            GraphicShape::Circle {
                center,
                radius: center.distance(end),
            }
        }
        "arc" => GraphicShape::Arc {
            start: pt("start")?,
            mid: pt("mid")?,
            end: pt("end")?,
        },
        "poly" => GraphicShape::Polygon {
            points: parse_points(expr, placement),
        },
        _ => return None,
    };

    let filled = matches!(
        expr.child_str("fill"),
        Some("solid") | Some("yes")
    ) || expr
        .child("fill")
        .and_then(|f| f.child_str("type"))
        .is_some_and(|t| t == "solid");

    Some(GraphicItem {
        shape,
        layer: expr.child_str("layer").unwrap_or_default().to_string(),
        width: stroke_width(expr),
        filled,
    })
}

/// Liest einen Text; `text_arg` ist der Index des Textinhalts unter den Argumenten.
fn parse_text(expr: &SExpr, text_arg: usize, placement: &Placement) -> Option<BoardText> {
    let content = expr.str_arg(text_arg)?;
    let at = expr.child("at")?;
    let local = Vec2::new(at.f32_arg(0)?, at.f32_arg(1)?);
    let effects = expr.child("effects");
    let size = effects
        .and_then(|e| e.child("font"))
        .and_then(|f| f.child("size"))
        .and_then(|s| s.f32_arg(0))
        .unwrap_or(1.0);
    let hidden = expr.flag("hide") || effects.is_some_and(|e| e.flag("hide"));

    let mut text = BoardText::new(
        content,
        placement.apply(local),
        size,
        expr.child_str("layer").unwrap_or_default(),
    );
    text.rotation = at.f32_arg(2).unwrap_or(0.0);
    text.hidden = hidden;
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BOARD: &str = r#"(kicad_pcb (version 20240108) (generator "pcbnew")
      (title_block (title "Demo"))
      (layers (0 "F.Cu" signal) (31 "B.Cu" signal) (37 "F.SilkS" user "F.Silkscreen") (44 "Edge.Cuts" user))
      (net 0 "")
      (net 1 "/power/VCC")
      (footprint "Resistor_SMD:R_0603" (layer "F.Cu") (uuid "fp1") (at 10 10 90)
        (property "Reference" "R1" (at 0 -1.5 90) (layer "F.SilkS") (effects (font (size 1 1))))
        (property "Value" "10k" (at 0 1.5 90) (layer "F.Fab") hide)
        (attr smd dnp)
        (pad "1" smd roundrect (at -1 0 90) (size 0.8 0.9) (layers "F.Cu" "F.Paste" "F.Mask") (net 1 "/power/VCC"))
        (pad "2" smd roundrect (at 1 0 90) (size 0.8 0.9) (layers "F.Cu" "F.Paste" "F.Mask") (net 0 "")))
      (segment (start 0 0) (end 10 0) (width 0.25) (layer "F.Cu") (net 1) (uuid "s1"))
      (via blind (at 10 0) (size 0.6) (drill 0.3) (layers "F.Cu" "B.Cu") (net 1) (uuid "v1"))
      (gr_rect (start 0 0) (end 50 40) (stroke (width 0.1) (type default)) (fill none) (layer "Edge.Cuts"))
    )"#;

    #[test]
    fn parses_board_items() {
        let board = parse_board("demo.kicad_pcb", BOARD).expect("Board parsebar");
        assert_eq!(board.title.as_deref(), Some("Demo"));
        assert_eq!(board.copper_layers(), vec!["F.Cu", "B.Cu"]);
        assert_eq!(board.net_name(1), Some("/power/VCC"));
        assert_eq!(board.segments.len(), 1);
        assert_eq!(board.vias[0].kind, ViaKind::BlindBuried);
        assert_relative_eq!(board.bbox().width(), 50.1, epsilon = 1e-4);

        let fp = &board.footprints[0];
        assert_eq!(fp.reference, "R1");
        assert_eq!(fp.value, "10k");
        assert!(fp.dnp);
        assert_eq!(fp.pads[0].net_number(), 1);
        assert!(fp.texts.iter().any(|t| t.text == "10k" && t.hidden));
    }

    #[test]
    fn pad_positions_are_rotated_with_footprint() {
        let board = parse_board("demo.kicad_pcb", BOARD).expect("Board parsebar");
        let pad = &board.footprints[0].pads[0];
        // (-1, 0) um 90° gedreht (KiCad-Konvention) → (0, +1) relativ
        assert_relative_eq!(pad.position.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(pad.position.y, 11.0, epsilon = 1e-4);
    }

    #[test]
    fn rejects_non_board_documents() {
        assert!(parse_board("x.kicad_pcb", "(kicad_sch (version 1))").is_err());
        assert!(parse_board("x.kicad_pcb", "(kicad_pcb").is_err());
    }
}
