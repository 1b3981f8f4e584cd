//! Net-Fokus und Bauteil-Isolation über Overlay-Layer.

use indexmap::IndexMap;

use super::layers::{LayerId, LayerSet, OverlayKind};
use super::paint::Color;
use super::painters::{paint_board, FootprintPainter, ItemPainter, NetFilter, OverlaySink, PaintContext};
use crate::core::{BoardDocument, NetNumber};

const FOCUS_BACKGROUND: LayerId = LayerId::Overlay(OverlayKind::FocusBackground);
const FOCUS_FOREGROUND: LayerId = LayerId::Overlay(OverlayKind::FocusForeground);
const SELECTION: LayerId = LayerId::Overlay(OverlayKind::Selection);

/// Zustand von Net-Fokus und Bauteil-Isolation eines Boards.
#[derive(Debug, Clone, Default)]
pub struct FocusState {
    net: Option<NetNumber>,
    saved_visibility: Option<IndexMap<LayerId, bool>>,
    isolated: Option<usize>,
    saved_zones: Option<IndexMap<LayerId, bool>>,
}

impl FocusState {
    /// Aktuell fokussiertes Netz.
    pub fn focused_net(&self) -> Option<NetNumber> {
        self.net
    }

    /// Index des isolierten Footprints.
    pub fn isolated_footprint(&self) -> Option<usize> {
        self.isolated
    }

    /// Vor dem Fokus gesicherte Sichtbarkeit.
    pub fn saved_visibility(&self) -> Option<&IndexMap<LayerId, bool>> {
        self.saved_visibility.as_ref()
    }

    /// Gibt `true` zurück, solange eine Sichtbarkeit wiederherzustellen ist.
    pub fn needs_restore(&self) -> bool {
        self.saved_visibility.is_some()
    }

    /// Ändert die gesicherte Sichtbarkeit während eines Net-Fokus.
    ///
    /// Rückgabe `false`, wenn kein Fokus aktiv ist.
    pub fn update_saved_visibility(&mut self, id: &LayerId, visible: bool) -> bool {
        match self.saved_visibility.as_mut() {
            Some(saved) => {
                saved.insert(id.clone(), visible);
                true
            }
            None => false,
        }
    }

    /// Hebt ein Netz hervor: Hintergrund abgeblendet, Netz betont.
    ///
    /// Hat das Zeichnen etwas erzeugt, werden alle regulären Layer versteckt.
    /// Rückgabe: `true`, wenn sich die Overlays geändert haben.
    pub fn highlight_net(
        &mut self,
        board: &BoardDocument,
        layers: &mut LayerSet,
        net: NetNumber,
        dim_alpha: f32,
    ) -> bool {
        if net == 0 {
            self.clear_net_focus(layers);
            return false;
        }
        // Overlays aus der Nutzer-Sichtbarkeit berechnen, nicht aus dem Fokus-Zustand
        if let Some(saved) = self.saved_visibility.take() {
            layers.restore_visibility(&saved);
        }

        let mut background = OverlaySink::dimmed(layers, dim_alpha);
        paint_board(
            &PaintContext::filtered(board, NetFilter::Except(net)),
            &mut background,
        );
        let background = background.finish();

        let mut foreground = OverlaySink::tinted(layers, Color::HIGHLIGHT);
        paint_board(
            &PaintContext::filtered(board, NetFilter::Only(net)),
            &mut foreground,
        );
        let foreground = foreground.finish();

        let changed = !foreground.is_empty() || !background.is_empty();
        if !changed {
            log::debug!("Net-Fokus {net}: nichts zu zeichnen");
            clear_focus_overlays(layers);
            self.net = None;
            return false;
        }

        self.saved_visibility = Some(layers.visibility_snapshot());
        for layer in layers.iter_mut() {
            layer.visible = layer.id.is_overlay();
        }
        if let Some(layer) = layers.get_mut(&FOCUS_BACKGROUND) {
            layer.paint = background;
            layer.visible = true;
        }
        if let Some(layer) = layers.get_mut(&FOCUS_FOREGROUND) {
            layer.paint = foreground;
            layer.visible = true;
        }
        self.net = Some(net);
        log::debug!("Net-Fokus auf Netz {net}");
        true
    }

    /// Hebt den Net-Fokus auf. Ohne vorherigen Fokus ein No-op.
    pub fn clear_net_focus(&mut self, layers: &mut LayerSet) {
        if let Some(saved) = self.saved_visibility.take() {
            layers.restore_visibility(&saved);
        }
        clear_focus_overlays(layers);
        self.net = None;
    }

    /// Isoliert ein Bauteil: Zonen aus, Footprint auf dem Auswahl-Overlay.
    pub fn isolate_component(
        &mut self,
        board: &BoardDocument,
        layers: &mut LayerSet,
        footprint: usize,
    ) -> bool {
        let Some(fp) = board.footprints.get(footprint) else {
            return false;
        };
        self.clear_isolation(layers);

        let mut sink = OverlaySink::tinted(layers, Color::HIGHLIGHT);
        FootprintPainter.paint(&PaintContext::filtered(board, NetFilter::All), fp, &mut sink);
        let paint = sink.finish();

        let zones: IndexMap<LayerId, bool> = layers
            .zone_layers()
            .map(|l| (l.id.clone(), l.visible))
            .collect();
        for id in zones.keys() {
            layers.set_visible(id, false);
        }
        self.saved_zones = Some(zones);

        if let Some(layer) = layers.get_mut(&SELECTION) {
            layer.paint = paint;
        }
        self.isolated = Some(footprint);
        log::debug!("Bauteil {} isoliert", fp.reference);
        true
    }

    /// Hebt eine Bauteil-Isolation auf und blendet die Zonen wieder ein.
    pub fn clear_isolation(&mut self, layers: &mut LayerSet) -> bool {
        let had_isolation = self.isolated.take().is_some();
        if let Some(zones) = self.saved_zones.take() {
            layers.restore_visibility(&zones);
        }
        if let Some(layer) = layers.get_mut(&SELECTION) {
            layer.clear();
        }
        had_isolation
    }
}

fn clear_focus_overlays(layers: &mut LayerSet) {
    for id in [FOCUS_BACKGROUND, FOCUS_FOREGROUND] {
        if let Some(layer) = layers.get_mut(&id) {
            layer.clear();
            layer.visible = false;
        }
    }
}
