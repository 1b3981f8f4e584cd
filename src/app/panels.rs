//! Sub-Panels des Viewers und ihre Registry.
//!
//! Die View-State-Engine greift ausschließlich über [`ViewerPanels`] zu; ein
//! Panel, das (noch) nicht montiert ist, liefert `None`.

use glam::Vec2;

use super::events::OpacitySlider;
use crate::core::Camera2D;
use crate::render::{BoardRenderer, LayerId, LayerSet, PadSide, RenderScene};
use crate::shared::ViewerOptions;

/// Layer-Panel.
pub trait LayersPanel {
    /// Setzt die Sichtbarkeit eines Layers; `false` bei unbekanntem Namen.
    fn set_layer_visible(&mut self, name: &str, visible: bool) -> bool;
}

/// Objekt-Panel (Deckkraft, Objektgruppen, Highlight).
pub trait ObjectsPanel {
    /// Setzt einen Deckkraft-Regler.
    fn set_opacity(&mut self, slider: OpacitySlider, value: f32);
    /// Schaltet die Hervorhebung der obersten sichtbaren Kupferlage.
    fn set_highlight_track(&mut self, enabled: bool);
    /// Blendet eine Objektgruppe ein/aus; `false` bei unbekannter Gruppe.
    fn set_object_visible(&mut self, group: &str, visible: bool) -> bool;
}

/// Netz-Panel.
pub trait NetsPanel {
    /// Setzt den Filtertext.
    fn set_filter_text(&mut self, text: &str);
    /// Wählt ein Netz (Fokus + Kamera-Fit) oder hebt die Auswahl auf.
    fn select_net(&mut self, net: Option<u32>);
}

/// Tab-Leiste.
pub trait TabsPanel {
    /// Aktiviert einen Tab; `false`, wenn es ihn nicht gibt.
    fn select_tab(&mut self, tab: &str) -> bool;
}

/// Registry der Panels eines Viewers.
pub trait ViewerPanels {
    /// Layer-Panel, falls montiert.
    fn layers(&mut self) -> Option<&mut dyn LayersPanel>;
    /// Objekt-Panel, falls montiert.
    fn objects(&mut self) -> Option<&mut dyn ObjectsPanel>;
    /// Netz-Panel, falls montiert.
    fn nets(&mut self) -> Option<&mut dyn NetsPanel>;
    /// Tab-Leiste, falls montiert.
    fn tabs(&mut self) -> Option<&mut dyn TabsPanel>;
    /// Hebt den Net-Fokus direkt am Viewer auf (ohne Netz-Panel).
    fn clear_net_focus(&mut self);
}

/// Objektgruppen des Objekt-Panels.
fn group_layer_ids(layers: &LayerSet, group: &str) -> Option<Vec<LayerId>> {
    let sides = [PadSide::Global, PadSide::Front, PadSide::Back];
    let ids = match group {
        "tracks" => layers.copper_layers().map(|l| l.id.clone()).collect(),
        "vias" => layers
            .via_layers()
            .map(|l| l.id.clone())
            .chain([LayerId::ViaHoles])
            .collect(),
        "pads" => layers
            .pad_layers()
            .map(|l| l.id.clone())
            .chain([LayerId::PadHoles])
            .collect(),
        "zones" => layers.zone_layers().map(|l| l.id.clone()).collect(),
        "padNumbers" => sides.into_iter().map(LayerId::PadNumbers).collect(),
        "padNetNames" => sides.into_iter().map(LayerId::PadNetNames).collect(),
        "trackNetNames" => layers
            .track_netname_label_layers()
            .map(|l| l.id.clone())
            .collect(),
        "viaNetNames" => vec![LayerId::ViaNetNames],
        "grid" => layers.grid_layers().map(|l| l.id.clone()).collect(),
        _ => return None,
    };
    Some(ids)
}

fn slider_group(slider: OpacitySlider) -> &'static str {
    match slider {
        OpacitySlider::Tracks => "tracks",
        OpacitySlider::Vias => "vias",
        OpacitySlider::Pads => "pads",
        OpacitySlider::Zones => "zones",
        OpacitySlider::Grid => "grid",
    }
}

/// Board-Ansicht: Renderer, Kamera und Panel-Zustand.
#[derive(Debug)]
pub struct BoardView {
    /// Renderer des Boards
    pub renderer: BoardRenderer,
    /// Kamera
    pub camera: Camera2D,
    /// Viewport-Größe in Pixeln
    pub viewport_size: [f32; 2],
    /// Filtertext des Netz-Panels
    pub filter_text: String,
    /// Gewähltes Netz
    pub selected_net: Option<u32>,
    /// Highlight-Track aktiv
    pub highlight_track: bool,
    zoom_limits: (f32, f32),
    fit_margin: f32,
}

impl BoardView {
    /// Erstellt die Ansicht und passt die Kamera auf das Board ein.
    pub fn new(renderer: BoardRenderer, viewport_size: [f32; 2], options: &ViewerOptions) -> Self {
        let mut view = Self {
            renderer,
            camera: Camera2D::new(),
            viewport_size,
            filter_text: String::new(),
            selected_net: None,
            highlight_track: false,
            zoom_limits: (options.camera_zoom_min, options.camera_zoom_max),
            fit_margin: options.camera_fit_margin,
        };
        let bbox = view.renderer.board().bbox();
        view.fit(&bbox);
        view
    }

    fn fit(&mut self, bbox: &crate::core::BBox) {
        let (min, max) = self.zoom_limits;
        self.camera
            .fit_bbox(bbox, self.viewport_size, self.fit_margin, min, max);
    }

    /// Szene des aktuellen Frames.
    pub fn scene(&self) -> RenderScene {
        RenderScene::new(self.camera.clone(), self.viewport_size)
    }

    /// Ändert die Viewport-Größe.
    pub fn resize(&mut self, size: [f32; 2]) {
        self.viewport_size = size;
    }

    /// Verschiebt die Kamera.
    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    /// Zoomt innerhalb der konfigurierten Grenzen.
    pub fn zoom(&mut self, factor: f32) {
        let (min, max) = self.zoom_limits;
        self.camera.zoom_by_clamped(factor, min, max);
    }

    /// Netze, deren Anzeigename den Filtertext enthält.
    pub fn filtered_nets(&self) -> Vec<(u32, &str)> {
        let needle = self.filter_text.to_lowercase();
        self.renderer
            .board()
            .nets
            .iter()
            .filter(|n| n.number > 0)
            .filter(|n| needle.is_empty() || n.name.to_lowercase().contains(&needle))
            .map(|n| (n.number, n.name.as_str()))
            .collect()
    }
}

impl LayersPanel for BoardView {
    fn set_layer_visible(&mut self, name: &str, visible: bool) -> bool {
        match name.parse::<LayerId>() {
            Ok(id) => self.renderer.set_layer_visible(&id, visible),
            Err(e) => {
                log::debug!("{e}");
                false
            }
        }
    }
}

impl ObjectsPanel for BoardView {
    fn set_opacity(&mut self, slider: OpacitySlider, value: f32) {
        let layers = self.renderer.layers_mut();
        let Some(ids) = group_layer_ids(layers, slider_group(slider)) else {
            return;
        };
        for id in ids {
            if let Some(layer) = layers.get_mut(&id) {
                layer.set_opacity(value);
            }
        }
    }

    fn set_highlight_track(&mut self, enabled: bool) {
        self.highlight_track = enabled;
        let visibility = self.renderer.user_visibility();
        let layers = self.renderer.layers_mut();
        let copper = layers.copper_layer_names().to_vec();
        for name in &copper {
            layers.set_highlighted(name, false);
        }
        if !enabled {
            return;
        }
        let top = copper
            .iter()
            .find(|name| visibility.get(&LayerId::physical(name.as_str())) == Some(&true));
        if let Some(top) = top {
            layers.set_highlighted(top, true);
        }
    }

    fn set_object_visible(&mut self, group: &str, visible: bool) -> bool {
        let Some(ids) = group_layer_ids(self.renderer.layers(), group) else {
            log::debug!("Unbekannte Objektgruppe: {group}");
            return false;
        };
        for id in ids {
            self.renderer.set_layer_visible(&id, visible);
        }
        true
    }
}

impl NetsPanel for BoardView {
    fn set_filter_text(&mut self, text: &str) {
        self.filter_text = text.to_string();
    }

    fn select_net(&mut self, net: Option<u32>) {
        match net {
            Some(n) if n > 0 => {
                self.renderer.highlight_net(n);
                let bbox = self.renderer.net_bbox(n);
                self.fit(&bbox);
                self.selected_net = Some(n);
            }
            _ => {
                self.renderer.clear_net_focus();
                self.selected_net = None;
            }
        }
    }
}

/// Tab-Leiste mit den aus dem Projekt abgeleiteten Tabs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabBar {
    /// Alle Tabs in Anzeigereihenfolge
    pub tabs: Vec<String>,
    /// Aktiver Tab
    pub active: Option<String>,
}

impl TabBar {
    /// Erstellt die Tab-Leiste; der erste Tab ist aktiv.
    pub fn new(tabs: Vec<String>) -> Self {
        let active = tabs.first().cloned();
        Self { tabs, active }
    }
}

impl TabsPanel for TabBar {
    fn select_tab(&mut self, tab: &str) -> bool {
        if self.tabs.iter().any(|t| t == tab) {
            self.active = Some(tab.to_string());
            true
        } else {
            false
        }
    }
}

/// Welche Panels montiert sind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountedPanels {
    /// Layer-Panel
    pub layers: bool,
    /// Objekt-Panel
    pub objects: bool,
    /// Netz-Panel
    pub nets: bool,
    /// Tab-Leiste
    pub tabs: bool,
}

impl MountedPanels {
    /// Alle Panels montiert.
    pub fn all() -> Self {
        Self {
            layers: true,
            objects: true,
            nets: true,
            tabs: true,
        }
    }
}

/// Konkrete Panel-Registry des Viewers.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    /// Board-Ansicht (existiert ab dem ersten geladenen Board)
    pub board: Option<BoardView>,
    /// Tab-Leiste (existiert ab dem Load)
    pub tabs: Option<TabBar>,
    /// Montierte Panels
    pub mounted: MountedPanels,
}

impl PanelRegistry {
    /// Montiert alle Panels, deren Daten vorhanden sind.
    pub fn mount_available(&mut self) -> bool {
        let before = self.mounted;
        let has_board = self.board.is_some();
        self.mounted = MountedPanels {
            layers: has_board,
            objects: has_board,
            nets: has_board,
            tabs: self.tabs.is_some(),
        };
        before != self.mounted
    }

    /// Entfernt alle Panels und Ansichten.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl ViewerPanels for PanelRegistry {
    fn layers(&mut self) -> Option<&mut dyn LayersPanel> {
        if !self.mounted.layers {
            return None;
        }
        self.board.as_mut().map(|b| b as &mut dyn LayersPanel)
    }

    fn objects(&mut self) -> Option<&mut dyn ObjectsPanel> {
        if !self.mounted.objects {
            return None;
        }
        self.board.as_mut().map(|b| b as &mut dyn ObjectsPanel)
    }

    fn nets(&mut self) -> Option<&mut dyn NetsPanel> {
        if !self.mounted.nets {
            return None;
        }
        self.board.as_mut().map(|b| b as &mut dyn NetsPanel)
    }

    fn tabs(&mut self) -> Option<&mut dyn TabsPanel> {
        if !self.mounted.tabs {
            return None;
        }
        self.tabs.as_mut().map(|t| t as &mut dyn TabsPanel)
    }

    fn clear_net_focus(&mut self) {
        if let Some(board) = self.board.as_mut() {
            board.renderer.clear_net_focus();
            board.selected_net = None;
        }
    }
}
