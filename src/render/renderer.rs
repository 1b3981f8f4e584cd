//! Board-Renderer: statischer Pass, dynamischer Label-Pass, Picking und Fokus.

use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;

use super::dynamic_labels::{update_dynamic_labels, DynamicLabelStats, LabelSettings};
use super::focus::FocusState;
use super::layers::{Layer, LayerId, LayerSet};
use super::painters::{paint_board, PaintContext};
use crate::core::{BBox, BoardDocument, NetNumber, PickMatch, SpatialIndex};
use crate::shared::{RenderScene, ViewerOptions};

/// Benachrichtigungen des Renderers an die Viewer-Shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// Net-Fokus gesetzt
    NetFocused(NetNumber),
    /// Net-Fokus aufgehoben (auch ohne vorherigen Fokus)
    NetFocusCleared,
    /// Bauteil isoliert
    ComponentIsolated {
        /// Designator
        reference: String,
    },
    /// Bauteil-Isolation aufgehoben
    IsolationCleared,
}

/// Renderer eines Boards.
///
/// Hält die Layer mit ihrem retained Paint-Output; das Board selbst bleibt
/// unverändert und wird mit dem Project geteilt.
#[derive(Debug)]
pub struct BoardRenderer {
    board: Arc<BoardDocument>,
    layers: LayerSet,
    index: SpatialIndex,
    focus: FocusState,
    label_settings: LabelSettings,
    pad_label_max_size: f32,
    dim_alpha: f32,
    static_painted: bool,
    last_stats: DynamicLabelStats,
    events: Vec<RenderEvent>,
}

impl BoardRenderer {
    /// Baut Layer-Set und Spatial-Index für ein Board.
    pub fn new(board: Arc<BoardDocument>, options: &ViewerOptions) -> Self {
        let start = Instant::now();
        let layers = LayerSet::new(&board);
        let index = SpatialIndex::from_board(&board);
        log::debug!(
            "Renderer für {}: {} Layer, {} indizierte Items in {:?}",
            board.filename,
            layers.len(),
            index.len(),
            start.elapsed()
        );
        Self {
            board,
            layers,
            index,
            focus: FocusState::default(),
            label_settings: LabelSettings::from_options(options),
            pad_label_max_size: options.pad_label_max_size_mm,
            dim_alpha: options.net_focus_dim_alpha,
            static_painted: false,
            last_stats: DynamicLabelStats::default(),
            events: Vec::new(),
        }
    }

    /// Das gerenderte Board.
    pub fn board(&self) -> &Arc<BoardDocument> {
        &self.board
    }

    /// Layer-Menge.
    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    /// Layer-Menge, veränderlich (Sichtbarkeit, Deckkraft).
    pub fn layers_mut(&mut self) -> &mut LayerSet {
        &mut self.layers
    }

    /// Gibt `true` zurück, sobald der statische Pass gelaufen ist.
    pub fn is_painted(&self) -> bool {
        self.static_painted
    }

    /// Zähler des letzten dynamischen Passes.
    pub fn last_label_stats(&self) -> DynamicLabelStats {
        self.last_stats
    }

    /// Statischer Pass: alle Items in ihre Layer zeichnen.
    pub fn paint_static(&mut self) {
        let start = Instant::now();
        for layer in self.layers.iter_mut() {
            if !layer.id.is_overlay() && !layer.id.is_dynamic() {
                layer.clear();
            }
        }
        let ctx = PaintContext::full(&self.board, self.pad_label_max_size);
        paint_board(&ctx, &mut self.layers);
        self.static_painted = true;
        log::info!(
            "Statischer Pass für {}: {} Items in {:?}",
            self.board.filename,
            self.board.item_count(),
            start.elapsed()
        );
    }

    /// Ein Frame: statischer Pass bei Bedarf, dann dynamische Labels.
    pub fn draw(&mut self, scene: &RenderScene) -> DynamicLabelStats {
        if !self.static_painted {
            self.paint_static();
        }
        self.last_stats =
            update_dynamic_labels(&self.board, &mut self.layers, scene, &self.label_settings);
        self.last_stats
    }

    /// Layer mit Ausgabe in Zeichenreihenfolge (unten zuerst).
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers
            .in_draw_order()
            .filter(|l| !l.paint.is_empty() && self.layers.is_effectively_visible(&l.id))
    }

    /// Oberstes Item unter einem Weltpunkt.
    pub fn pick(&self, world: glam::Vec2, tolerance: f32) -> Option<PickMatch> {
        self.index.pick_first(&self.board, world, tolerance)
    }

    /// Bounding Box eines Netzes (für Kamera-Fit).
    pub fn net_bbox(&self, net: NetNumber) -> BBox {
        self.board.net_bbox(net)
    }

    /// Aktuell fokussiertes Netz.
    pub fn focused_net(&self) -> Option<NetNumber> {
        self.focus.focused_net()
    }

    /// Index des isolierten Footprints.
    pub fn isolated_footprint(&self) -> Option<usize> {
        self.focus.isolated_footprint()
    }

    /// Hebt ein Netz hervor.
    pub fn highlight_net(&mut self, net: NetNumber) -> bool {
        if net == 0 {
            self.clear_net_focus();
            return false;
        }
        let changed = self
            .focus
            .highlight_net(&self.board, &mut self.layers, net, self.dim_alpha);
        if changed {
            self.events.push(RenderEvent::NetFocused(net));
        }
        changed
    }

    /// Hebt den Net-Fokus auf; meldet `NetFocusCleared` in jedem Fall.
    pub fn clear_net_focus(&mut self) {
        self.focus.clear_net_focus(&mut self.layers);
        self.events.push(RenderEvent::NetFocusCleared);
    }

    /// Isoliert ein Bauteil (Zonen versteckt bis zum nächsten Hintergrund-Klick).
    pub fn isolate_component(&mut self, footprint: usize) -> bool {
        let isolated = self
            .focus
            .isolate_component(&self.board, &mut self.layers, footprint);
        if isolated {
            let reference = self.board.footprints[footprint].reference.clone();
            self.events.push(RenderEvent::ComponentIsolated { reference });
        }
        isolated
    }

    /// Hebt eine Bauteil-Isolation auf.
    pub fn clear_isolation(&mut self) -> bool {
        let cleared = self.focus.clear_isolation(&mut self.layers);
        if cleared {
            self.events.push(RenderEvent::IsolationCleared);
        }
        cleared
    }

    /// Sichtbarkeit eines Layers setzen; während eines Net-Fokus erst nach dem Aufheben wirksam.
    pub fn set_layer_visible(&mut self, id: &LayerId, visible: bool) -> bool {
        if self.layers.get(id).is_none() {
            return false;
        }
        if !self.focus.update_saved_visibility(id, visible) {
            self.layers.set_visible(id, visible);
        }
        true
    }

    /// Effektive Sichtbarkeit aus Nutzersicht (ignoriert einen aktiven Net-Fokus).
    pub fn user_visibility(&self) -> IndexMap<LayerId, bool> {
        self.focus
            .saved_visibility()
            .cloned()
            .unwrap_or_else(|| self.layers.visibility_snapshot())
    }

    /// Entnimmt alle angefallenen Benachrichtigungen.
    pub fn drain_events(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Camera2D, LayerDecl, LayerKind, Net, TrackSegment};
    use glam::Vec2;

    fn renderer() -> BoardRenderer {
        let mut b = BoardDocument::new("t.kicad_pcb");
        b.layers = vec![LayerDecl {
            ordinal: 0,
            name: "F.Cu".into(),
            kind: LayerKind::Signal,
            user_name: None,
        }];
        b.nets = vec![Net {
            number: 3,
            name: "SDA".into(),
        }];
        b.segments.push(TrackSegment {
            uuid: "s".into(),
            start: Vec2::new(-4.0, 0.0),
            end: Vec2::new(4.0, 0.0),
            width: 0.5,
            layer: "F.Cu".into(),
            net: 3,
        });
        BoardRenderer::new(Arc::new(b), &ViewerOptions::default())
    }

    #[test]
    fn draw_paints_static_once_and_labels_every_frame() {
        let mut r = renderer();
        let mut camera = Camera2D::new();
        camera.zoom = 40.0;
        let scene = RenderScene::new(camera, [400.0, 400.0]);

        let stats = r.draw(&scene);
        assert!(r.is_painted());
        assert!(stats.track_labels >= 1);
        assert!(r
            .visible_layers()
            .any(|l| l.id == LayerId::TrackNetName("F.Cu".into())));

        // herausgezoomt: LOD greift, Labels verschwinden
        let mut far = scene.clone();
        far.camera.zoom = 1.0;
        assert_eq!(r.draw(&far).track_labels, 0);
    }

    #[test]
    fn clear_focus_always_notifies() {
        let mut r = renderer();
        r.clear_net_focus();
        assert_eq!(r.drain_events(), vec![RenderEvent::NetFocusCleared]);

        r.paint_static();
        assert!(r.highlight_net(3));
        assert_eq!(r.focused_net(), Some(3));
        r.clear_net_focus();
        assert_eq!(
            r.drain_events(),
            vec![RenderEvent::NetFocused(3), RenderEvent::NetFocusCleared]
        );
    }

    #[test]
    fn pick_finds_track() {
        let r = renderer();
        let hit = r.pick(Vec2::new(1.0, 0.1), 0.1).expect("Treffer");
        assert_eq!(hit.target.net(r.board()), 3);
    }
}
