//! Typ-spezifische Painter für Board-Items.
//!
//! Jeder Painter bestimmt die Ziel-Layer seines Items und gibt Zeichenbefehle
//! an eine [`PaintSink`] aus. Die Sink entscheidet, wohin die Befehle landen:
//! in die regulären Layer (statischer Pass) oder in ein Overlay (Net-Fokus).

use glam::Vec2;

use super::glyphs::text_render_cache;
use super::labels::layout_pad_labels;
use super::layers::{LayerId, LayerSet, PadSide};
use super::paint::{Color, PaintList, PaintOp};
use crate::core::geometry::{arc_through_points, local_to_world};
use crate::core::{
    BoardDocument, BoardItem, BoardText, Footprint, GraphicItem, GraphicShape, NetNumber, Pad,
    PadShape, TrackArc, TrackSegment, Via, Zone,
};

/// Segmente pro Kreisbogen-Approximation.
const ARC_SEGMENTS: usize = 24;

/// Ziel für Zeichenbefehle.
pub trait PaintSink {
    /// Grundfarbe eines Layers.
    fn color_of(&self, layer: &LayerId) -> Color;
    /// Nimmt einen Befehl für einen Layer entgegen.
    fn emit(&mut self, layer: &LayerId, op: PaintOp);
}

impl PaintSink for LayerSet {
    fn color_of(&self, layer: &LayerId) -> Color {
        self.get(layer).map_or(Color::USER, |l| l.color)
    }

    fn emit(&mut self, layer: &LayerId, op: PaintOp) {
        match self.get_mut(layer) {
            Some(l) => l.paint.push(op),
            None => log::trace!("Zeichenbefehl für unbekannten Layer {layer} verworfen"),
        }
    }
}

/// Sammelt alle Befehle in einer einzigen Liste mit einheitlicher Farbe.
///
/// Wird für die Overlays von Net-Fokus und Bauteil-Isolation genutzt.
pub struct OverlaySink<'a> {
    layers: &'a LayerSet,
    out: PaintList,
    color: Option<Color>,
    alpha: f32,
}

impl<'a> OverlaySink<'a> {
    /// Übernimmt die Farbe des Ursprungs-Layers mit angepasstem Alpha.
    pub fn dimmed(layers: &'a LayerSet, alpha: f32) -> Self {
        Self {
            layers,
            out: PaintList::new(),
            color: None,
            alpha,
        }
    }

    /// Färbt alle Befehle einheitlich ein.
    pub fn tinted(layers: &'a LayerSet, color: Color) -> Self {
        Self {
            layers,
            out: PaintList::new(),
            color: Some(color),
            alpha: color.alpha(),
        }
    }

    /// Liefert die gesammelten Befehle.
    pub fn finish(self) -> PaintList {
        self.out
    }
}

impl PaintSink for OverlaySink<'_> {
    fn color_of(&self, layer: &LayerId) -> Color {
        self.color
            .unwrap_or_else(|| self.layers.color_of(layer))
            .with_alpha(self.alpha)
    }

    fn emit(&mut self, layer: &LayerId, op: PaintOp) {
        // nur Layer, die der Nutzer auch regulär sehen würde
        if self.layers.is_effectively_visible(layer) {
            self.out.push(op);
        }
    }
}

/// Netz-Filter eines Paint-Durchlaufs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetFilter {
    /// Alles zeichnen
    #[default]
    All,
    /// Nur Items des Netzes
    Only(NetNumber),
    /// Alles außer Items des Netzes
    Except(NetNumber),
}

impl NetFilter {
    /// Prüft ein Item mit optionaler Netznummer.
    pub fn accepts(&self, net: Option<NetNumber>) -> bool {
        match *self {
            Self::All => true,
            Self::Only(n) => net == Some(n),
            Self::Except(n) => net != Some(n),
        }
    }
}

/// Gemeinsamer Kontext eines Paint-Durchlaufs.
#[derive(Debug, Clone, Copy)]
pub struct PaintContext<'a> {
    /// Board des Durchlaufs
    pub board: &'a BoardDocument,
    /// Netz-Filter
    pub filter: NetFilter,
    /// Pad-Nummern und Pad-Netznamen mitzeichnen
    pub pad_labels: bool,
    /// Maximale Pad-Label-Größe (mm)
    pub pad_label_max_size: f32,
}

impl<'a> PaintContext<'a> {
    /// Kontext für den statischen Pass.
    pub fn full(board: &'a BoardDocument, pad_label_max_size: f32) -> Self {
        Self {
            board,
            filter: NetFilter::All,
            pad_labels: true,
            pad_label_max_size,
        }
    }

    /// Kontext für Overlays: gefiltert, ohne Pad-Labels.
    pub fn filtered(board: &'a BoardDocument, filter: NetFilter) -> Self {
        Self {
            board,
            filter,
            pad_labels: false,
            pad_label_max_size: 0.0,
        }
    }
}

/// Painter für einen Item-Typ.
pub trait ItemPainter<T: ?Sized> {
    /// Zeichnet `item` in die passenden Layer.
    fn paint(&self, ctx: &PaintContext<'_>, item: &T, sink: &mut dyn PaintSink);
}

/// Leiterbahnsegmente.
pub struct SegmentPainter;
/// Leiterbahnbögen.
pub struct ArcPainter;
/// Vias inkl. Bohrung.
pub struct ViaPainter;
/// Zonenfüllungen.
pub struct ZonePainter;
/// Footprints: Grafik, Texte und Pads.
pub struct FootprintPainter;
/// Einzelne Pads inkl. Bohrung und Labels.
pub struct PadPainter;
/// Grafische Elemente.
pub struct GraphicPainter;
/// Texte.
pub struct TextPainter;

impl ItemPainter<TrackSegment> for SegmentPainter {
    fn paint(&self, ctx: &PaintContext<'_>, seg: &TrackSegment, sink: &mut dyn PaintSink) {
        if !ctx.filter.accepts(Some(seg.net)) {
            return;
        }
        let layer = LayerId::physical(seg.layer.clone());
        let color = sink.color_of(&layer);
        sink.emit(
            &layer,
            PaintOp::Polyline {
                points: vec![seg.start, seg.end],
                width: seg.width,
                color,
            },
        );
    }
}

impl ItemPainter<TrackArc> for ArcPainter {
    fn paint(&self, ctx: &PaintContext<'_>, arc: &TrackArc, sink: &mut dyn PaintSink) {
        if !ctx.filter.accepts(Some(arc.net)) {
            return;
        }
        let layer = LayerId::physical(arc.layer.clone());
        let color = sink.color_of(&layer);
        sink.emit(
            &layer,
            PaintOp::Polyline {
                points: arc.points(),
                width: arc.width,
                color,
            },
        );
    }
}

impl ItemPainter<Via> for ViaPainter {
    fn paint(&self, ctx: &PaintContext<'_>, via: &Via, sink: &mut dyn PaintSink) {
        if !ctx.filter.accepts(Some(via.net)) {
            return;
        }
        let layer = LayerId::Vias(via.kind);
        let color = sink.color_of(&layer);
        sink.emit(
            &layer,
            PaintOp::Circle {
                center: via.position,
                radius: via.diameter * 0.5,
                color,
                filled: true,
            },
        );
        if via.drill > 0.0 {
            let color = sink.color_of(&LayerId::ViaHoles);
            sink.emit(
                &LayerId::ViaHoles,
                PaintOp::Circle {
                    center: via.position,
                    radius: via.drill * 0.5,
                    color,
                    filled: true,
                },
            );
        }
    }
}

impl ItemPainter<Zone> for ZonePainter {
    fn paint(&self, ctx: &PaintContext<'_>, zone: &Zone, sink: &mut dyn PaintSink) {
        if !ctx.filter.accepts(Some(zone.net)) {
            return;
        }
        for (layer_name, polygon) in &zone.filled {
            if polygon.len() < 3 {
                continue;
            }
            let layer = LayerId::Zones(layer_name.clone());
            let color = sink.color_of(&layer);
            sink.emit(
                &layer,
                PaintOp::Polygon {
                    points: polygon.clone(),
                    color,
                },
            );
        }
    }
}

impl ItemPainter<Footprint> for FootprintPainter {
    fn paint(&self, ctx: &PaintContext<'_>, fp: &Footprint, sink: &mut dyn PaintSink) {
        // Grafik und Texte gehören keinem Netz
        if ctx.filter.accepts(None) {
            for g in &fp.graphics {
                GraphicPainter.paint(ctx, g, sink);
            }
            for t in &fp.texts {
                TextPainter.paint(ctx, t, sink);
            }
        }
        for pad in &fp.pads {
            PadPainter.paint(ctx, pad, sink);
        }
    }
}

/// Seite des Pad-Layers, auf dem ein Pad landet.
pub fn pad_side(pad: &Pad) -> Option<PadSide> {
    if pad.is_through_hole() {
        Some(PadSide::Global)
    } else if pad.on_layer("F.Cu") {
        Some(PadSide::Front)
    } else if pad.on_layer("B.Cu") {
        Some(PadSide::Back)
    } else {
        None
    }
}

fn pad_outline(pad: &Pad) -> Vec<Vec2> {
    let half = pad.size * 0.5;
    [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
    .into_iter()
    .map(|corner| local_to_world(corner, pad.position, pad.rotation))
    .collect()
}

impl ItemPainter<Pad> for PadPainter {
    fn paint(&self, ctx: &PaintContext<'_>, pad: &Pad, sink: &mut dyn PaintSink) {
        let net = pad.net.as_ref().map(|n| n.number);
        if !ctx.filter.accepts(net) {
            return;
        }
        let Some(side) = pad_side(pad) else {
            return;
        };

        let layer = LayerId::Pads(side);
        let color = sink.color_of(&layer);
        let op = match pad.shape {
            PadShape::Circle => PaintOp::Circle {
                center: pad.position,
                radius: pad.size.x * 0.5,
                color,
                filled: true,
            },
            PadShape::Oval if (pad.size.x - pad.size.y).abs() > f32::EPSILON => {
                // Langloch als Strich mit runden Enden
                let (len, width) = (pad.size.max_element(), pad.size.min_element());
                let axis = if pad.size.x >= pad.size.y {
                    Vec2::X
                } else {
                    Vec2::Y
                };
                let half = axis * (len - width) * 0.5;
                PaintOp::Polyline {
                    points: vec![
                        local_to_world(-half, pad.position, pad.rotation),
                        local_to_world(half, pad.position, pad.rotation),
                    ],
                    width,
                    color,
                }
            }
            PadShape::Oval => PaintOp::Circle {
                center: pad.position,
                radius: pad.size.x * 0.5,
                color,
                filled: true,
            },
            _ => PaintOp::Polygon {
                points: pad_outline(pad),
                color,
            },
        };
        sink.emit(&layer, op);

        if let Some(drill) = pad.drill.filter(|d| *d > 0.0) {
            let color = sink.color_of(&LayerId::PadHoles);
            sink.emit(
                &LayerId::PadHoles,
                PaintOp::Circle {
                    center: pad.position,
                    radius: drill * 0.5,
                    color,
                    filled: true,
                },
            );
        }

        if ctx.pad_labels {
            let labels = layout_pad_labels(pad, ctx.pad_label_max_size);
            let targets = [
                (labels.number, LayerId::PadNumbers(side)),
                (labels.net_name, LayerId::PadNetNames(side)),
            ];
            for (label, layer) in targets {
                let Some(label) = label.filter(|l| !l.text.is_empty()) else {
                    continue;
                };
                let color = sink.color_of(&layer);
                sink.emit(
                    &layer,
                    PaintOp::Text {
                        text: label.text,
                        position: label.position,
                        size: label.size,
                        angle: label.angle,
                        color,
                    },
                );
            }
        }
    }
}

impl ItemPainter<GraphicItem> for GraphicPainter {
    fn paint(&self, ctx: &PaintContext<'_>, g: &GraphicItem, sink: &mut dyn PaintSink) {
        if !ctx.filter.accepts(None) {
            return;
        }
        let layer = LayerId::physical(g.layer.clone());
        let color = sink.color_of(&layer);
        let outline = |points: Vec<Vec2>| PaintOp::Polyline {
            points,
            width: g.width,
            color,
        };
        let op = match &g.shape {
            GraphicShape::Line { start, end } => outline(vec![*start, *end]),
            GraphicShape::Rect { start, end } => {
                let corners = vec![
                    *start,
                    Vec2::new(end.x, start.y),
                    *end,
                    Vec2::new(start.x, end.y),
                ];
                if g.filled {
                    PaintOp::Polygon {
                        points: corners,
                        color,
                    }
                } else {
                    let mut closed = corners;
                    closed.push(*start);
                    outline(closed)
                }
            }
            GraphicShape::Circle { center, radius } => PaintOp::Circle {
                center: *center,
                radius: *radius,
                color,
                filled: g.filled,
            },
            GraphicShape::Arc { start, mid, end } => {
                outline(arc_through_points(*start, *mid, *end, ARC_SEGMENTS))
            }
            GraphicShape::Polygon { points } if g.filled => PaintOp::Polygon {
                points: points.clone(),
                color,
            },
            GraphicShape::Polygon { points } => {
                let mut closed = points.clone();
                if let Some(first) = points.first() {
                    closed.push(*first);
                }
                outline(closed)
            }
        };
        sink.emit(&layer, op);
    }
}

impl ItemPainter<BoardText> for TextPainter {
    fn paint(&self, ctx: &PaintContext<'_>, text: &BoardText, sink: &mut dyn PaintSink) {
        if text.hidden || text.text.is_empty() || !ctx.filter.accepts(None) {
            return;
        }
        let cache = text
            .render_cache
            .get_or_init(|| text_render_cache(&text.text, text.position, text.size));
        if cache.unstrokable > 0 {
            log::debug!(
                "Text '{}' enthält {} nicht zeichenbare Glyphen",
                text.text,
                cache.unstrokable
            );
        }
        let layer = LayerId::physical(text.layer.clone());
        let color = sink.color_of(&layer);
        sink.emit(
            &layer,
            PaintOp::Text {
                text: text.text.clone(),
                position: text.position,
                size: text.size,
                angle: text.rotation,
                color,
            },
        );
    }
}

/// Dispatch eines Items an seinen Painter.
pub fn paint_item(ctx: &PaintContext<'_>, item: BoardItem<'_>, sink: &mut dyn PaintSink) {
    match item {
        BoardItem::Segment(s) => SegmentPainter.paint(ctx, s, sink),
        BoardItem::Arc(a) => ArcPainter.paint(ctx, a, sink),
        BoardItem::Via(v) => ViaPainter.paint(ctx, v, sink),
        BoardItem::Zone(z) => ZonePainter.paint(ctx, z, sink),
        BoardItem::Footprint(f) => FootprintPainter.paint(ctx, f, sink),
        BoardItem::Graphic(g) => GraphicPainter.paint(ctx, g, sink),
        BoardItem::Text(t) => TextPainter.paint(ctx, t, sink),
    }
}

/// Zeichnet alle Items des Kontexts.
pub fn paint_board(ctx: &PaintContext<'_>, sink: &mut dyn PaintSink) {
    for item in ctx.board.items() {
        paint_item(ctx, item, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LayerDecl, LayerKind, PadKind, PadNet};

    fn board() -> BoardDocument {
        let mut b = BoardDocument::new("t.kicad_pcb");
        b.layers = ["F.Cu", "B.Cu", "F.SilkS"]
            .iter()
            .enumerate()
            .map(|(i, n)| LayerDecl {
                ordinal: i as i32,
                name: n.to_string(),
                kind: if n.ends_with(".Cu") {
                    LayerKind::Signal
                } else {
                    LayerKind::User
                },
                user_name: None,
            })
            .collect();
        b.segments.push(TrackSegment {
            uuid: "s1".into(),
            start: Vec2::ZERO,
            end: Vec2::new(10.0, 0.0),
            width: 0.25,
            layer: "F.Cu".into(),
            net: 1,
        });
        b.footprints.push(Footprint {
            uuid: "f1".into(),
            lib_id: "R:R_0603".into(),
            reference: "R1".into(),
            value: "10k".into(),
            layer: "F.Cu".into(),
            position: Vec2::new(5.0, 5.0),
            rotation: 0.0,
            dnp: false,
            exclude_from_bom: false,
            pads: vec![Pad {
                number: "1".into(),
                kind: PadKind::ThroughHole,
                shape: PadShape::Circle,
                position: Vec2::new(5.0, 5.0),
                size: Vec2::splat(1.6),
                rotation: 0.0,
                layers: vec!["*.Cu".into()],
                net: Some(PadNet {
                    number: 2,
                    name: "/sub/GND".into(),
                }),
                drill: Some(0.8),
                uuid: None,
            }],
            graphics: Vec::new(),
            texts: vec![BoardText::new("R1", Vec2::new(5.0, 3.0), 1.0, "F.SilkS")],
        });
        b
    }

    #[test]
    fn static_pass_fills_dedicated_layers() {
        let board = board();
        let mut layers = LayerSet::new(&board);
        paint_board(&PaintContext::full(&board, 1.5), &mut layers);

        let count = |id: LayerId| layers.get(&id).map_or(0, |l| l.paint.len());
        assert_eq!(count(LayerId::physical("F.Cu")), 1);
        assert_eq!(count(LayerId::Pads(PadSide::Global)), 1);
        assert_eq!(count(LayerId::PadHoles), 1);
        assert_eq!(count(LayerId::physical("F.SilkS")), 1);

        let net_names: Vec<&str> = layers
            .get(&LayerId::PadNetNames(PadSide::Global))
            .map(|l| l.paint.texts().map(|t| t.0).collect())
            .unwrap_or_default();
        assert_eq!(net_names, vec!["GND"]);
        assert!(board.footprints[0].texts[0].render_cache.get().is_some());
    }

    #[test]
    fn filter_splits_items_by_net() {
        let board = board();
        let layers = LayerSet::new(&board);

        let mut fg = OverlaySink::tinted(&layers, Color::HIGHLIGHT);
        paint_board(&PaintContext::filtered(&board, NetFilter::Only(1)), &mut fg);
        assert_eq!(fg.finish().len(), 1);

        let mut bg = OverlaySink::dimmed(&layers, 0.25);
        paint_board(&PaintContext::filtered(&board, NetFilter::Except(1)), &mut bg);
        let bg = bg.finish();
        // Pad, Bohrung, Silkscreen-Text
        assert_eq!(bg.len(), 3);
        assert!(bg.ops().iter().all(|op| !matches!(op, PaintOp::Polyline { .. })));
    }
}
