//! Geordnete Layer-Menge eines Boards.
//!
//! Einfügereihenfolge ist die UI-Reihenfolge (oben zuerst); gezeichnet wird
//! in umgekehrter Reihenfolge.

use indexmap::IndexMap;

use super::id::{LayerId, OverlayKind, PadSide};
use super::layer::Layer;
use crate::core::{BoardDocument, ViaKind};
use crate::render::paint::Color;

const VIA_KINDS: [ViaKind; 3] = [ViaKind::Through, ViaKind::BlindBuried, ViaKind::Micro];

/// Alle Layer eines Boards mit expliziter Lookup-Tabelle.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    layers: IndexMap<LayerId, Layer>,
    copper: Vec<String>,
}

fn copper_color(name: &str) -> Color {
    match name {
        "F.Cu" => Color::COPPER_FRONT,
        "B.Cu" => Color::COPPER_BACK,
        _ => Color::COPPER_INNER,
    }
}

impl LayerSet {
    /// Baut die Layer aus dem Kupfer-Stack und dem festen Katalog abgeleiteter Layer.
    pub fn new(board: &BoardDocument) -> Self {
        let copper: Vec<String> = board
            .copper_layers()
            .into_iter()
            .map(str::to_string)
            .collect();
        let front_tech: Vec<&str> = board
            .layers
            .iter()
            .filter(|l| !l.is_copper() && l.name.starts_with("F."))
            .map(|l| l.name.as_str())
            .collect();
        let back_tech: Vec<&str> = board
            .layers
            .iter()
            .filter(|l| !l.is_copper() && l.name.starts_with("B."))
            .map(|l| l.name.as_str())
            .collect();
        let other_tech: Vec<&str> = board
            .layers
            .iter()
            .filter(|l| !l.is_copper() && !l.name.starts_with("F.") && !l.name.starts_with("B."))
            .map(|l| l.name.as_str())
            .collect();

        let mut set = Self {
            layers: IndexMap::new(),
            copper: copper.clone(),
        };

        set.add(Layer::new(LayerId::Overlay(OverlayKind::Selection), Color::HIGHLIGHT));
        set.add(Layer::new(LayerId::Overlay(OverlayKind::FocusForeground), Color::HIGHLIGHT).hidden());
        set.add(Layer::new(LayerId::Overlay(OverlayKind::FocusBackground), Color::USER).hidden());

        set.add(Layer::new(LayerId::ViaNetNames, Color::LABEL));
        for kind in VIA_KINDS {
            set.add(Layer::new(LayerId::Vias(kind), Color::VIA));
        }
        set.add(Layer::new(LayerId::ViaHoles, Color::HOLE));
        set.add(Layer::new(LayerId::PadHoles, Color::HOLE));

        set.add_pad_layers(PadSide::Global);
        set.add_pad_layers(PadSide::Front);
        for name in front_tech {
            set.add(Layer::new(LayerId::physical(name), Color::USER));
        }

        for name in &copper {
            let physical = LayerId::physical(name.clone());
            set.add(
                Layer::new(LayerId::TrackNetName(name.clone()), Color::LABEL)
                    .depending_on(physical.clone()),
            );
            set.add(Layer::new(physical.clone(), copper_color(name)));
            set.add(
                Layer::new(LayerId::Zones(name.clone()), copper_color(name).with_alpha(0.6))
                    .depending_on(physical),
            );
        }

        set.add_pad_layers(PadSide::Back);
        for name in back_tech.into_iter().chain(other_tech) {
            set.add(Layer::new(LayerId::physical(name), Color::USER));
        }
        set.add(Layer::new(LayerId::Grid, Color::USER.with_alpha(0.3)));

        log::debug!(
            "Layer-Set: {} Layer, {} Kupferlagen",
            set.layers.len(),
            set.copper.len()
        );
        set
    }

    fn add_pad_layers(&mut self, side: PadSide) {
        let parent = side.copper_layer().map(LayerId::physical);
        let color = match side {
            PadSide::Global => Color::VIA,
            PadSide::Front => Color::COPPER_FRONT,
            PadSide::Back => Color::COPPER_BACK,
        };
        for layer in [
            Layer::new(LayerId::PadNetNames(side), Color::LABEL),
            Layer::new(LayerId::PadNumbers(side), Color::LABEL),
            Layer::new(LayerId::Pads(side), color),
        ] {
            match &parent {
                Some(p) => self.add(layer.depending_on(p.clone())),
                None => self.add(layer),
            }
        }
    }

    fn add(&mut self, layer: Layer) {
        self.layers.insert(layer.id.clone(), layer);
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Layer nach Name (wie im View-State gespeichert).
    pub fn by_name(&self, name: &str) -> Option<&Layer> {
        let id: LayerId = name.parse().ok()?;
        self.layers.get(&id)
    }

    /// Layer nach Name, veränderlich.
    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut Layer> {
        let id: LayerId = name.parse().ok()?;
        self.layers.get_mut(&id)
    }

    /// Layer nach Identität.
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Layer nach Identität, veränderlich.
    pub fn get_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    /// Anzahl Layer.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Gibt `true` zurück, wenn keine Layer existieren.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    // ── Enumeratoren ────────────────────────────────────────────────

    /// Namen der Kupferlagen in Stack-Reihenfolge.
    pub fn copper_layer_names(&self) -> &[String] {
        &self.copper
    }

    /// Physische Kupferlagen in Stack-Reihenfolge.
    pub fn copper_layers(&self) -> impl Iterator<Item = &Layer> {
        self.copper
            .iter()
            .filter_map(|name| self.layers.get(&LayerId::physical(name.clone())))
    }

    /// Via-Layer (pro Via-Typ).
    pub fn via_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().filter(|l| matches!(l.id, LayerId::Vias(_)))
    }

    /// Pad-Layer (global, vorne, hinten).
    pub fn pad_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().filter(|l| matches!(l.id, LayerId::Pads(_)))
    }

    /// Zonen-Layer (pro Kupferlage).
    pub fn zone_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().filter(|l| matches!(l.id, LayerId::Zones(_)))
    }

    /// Raster-Layer.
    pub fn grid_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().filter(|l| l.id == LayerId::Grid)
    }

    /// Track-Netzname-Layer, einer pro Kupferlage.
    pub fn track_netname_label_layers(&self) -> impl Iterator<Item = &Layer> {
        self.copper
            .iter()
            .filter_map(|name| self.layers.get(&LayerId::TrackNetName(name.clone())))
    }

    /// Pad-Nummern-Layer einer Seite.
    pub fn pad_number_layer(&self, side: PadSide) -> Option<&Layer> {
        self.layers.get(&LayerId::PadNumbers(side))
    }

    /// Pad-Netznamen-Layer einer Seite.
    pub fn pad_netname_layer(&self, side: PadSide) -> Option<&Layer> {
        self.layers.get(&LayerId::PadNetNames(side))
    }

    /// Der gemeinsame Via-Netznamen-Layer.
    pub fn via_netname_layer(&self) -> Option<&Layer> {
        self.layers.get(&LayerId::ViaNetNames)
    }

    /// Stabile Reihenfolge für Layer-Panels (oben zuerst).
    pub fn in_ui_order(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values()
    }

    /// Zeichenreihenfolge (unten zuerst).
    pub fn in_draw_order(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().rev()
    }

    /// Alle Layer veränderlich.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.values_mut()
    }

    // ── Sichtbarkeit ────────────────────────────────────────────────

    /// Gibt `true` zurück, wenn der Layer und ggf. sein physischer Eltern-Layer ausgeben dürfen.
    pub fn is_effectively_visible(&self, id: &LayerId) -> bool {
        let Some(layer) = self.layers.get(id) else {
            return false;
        };
        if !layer.is_renderable() {
            return false;
        }
        match &layer.depends_on {
            Some(parent) => self.layers.get(parent).is_some_and(Layer::is_renderable),
            None => true,
        }
    }

    /// Setzt das Sichtbar-Flag; `false` bei unbekanntem Layer.
    pub fn set_visible(&mut self, id: &LayerId, visible: bool) -> bool {
        match self.layers.get_mut(id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Sichtbarkeit aller Layer (für Wiederherstellung nach Net-Fokus).
    pub fn visibility_snapshot(&self) -> IndexMap<LayerId, bool> {
        self.layers
            .iter()
            .map(|(id, l)| (id.clone(), l.visible))
            .collect()
    }

    /// Stellt eine zuvor gesicherte Sichtbarkeit wieder her.
    pub fn restore_visibility(&mut self, snapshot: &IndexMap<LayerId, bool>) {
        for (id, visible) in snapshot {
            if let Some(layer) = self.layers.get_mut(id) {
                layer.visible = *visible;
            }
        }
    }

    /// Markiert eine Kupferlage als hervorgehoben (High-Contrast-Näherung).
    pub fn set_highlighted(&mut self, copper_layer: &str, highlighted: bool) -> bool {
        match self.layers.get_mut(&LayerId::physical(copper_layer)) {
            Some(layer) if self.copper.iter().any(|c| c == copper_layer) => {
                layer.highlighted = highlighted;
                true
            }
            _ => false,
        }
    }

    /// Hervorgehobene Kupferlage, wenn genau eine markiert ist.
    ///
    /// Solange sie gesetzt ist, werden Track- und Via-Labels auf diese Lage beschränkt.
    pub fn primary_high_contrast_copper_layer_name(&self) -> Option<&str> {
        let mut highlighted = self.copper_layers().filter(|l| l.highlighted);
        let first = highlighted.next()?;
        if highlighted.next().is_some() {
            return None;
        }
        match &first.id {
            LayerId::Physical(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LayerDecl, LayerKind};

    fn board() -> BoardDocument {
        let mut b = BoardDocument::new("t.kicad_pcb");
        let decl = |ordinal, name: &str, kind| LayerDecl {
            ordinal,
            name: name.into(),
            kind,
            user_name: None,
        };
        b.layers = vec![
            decl(0, "F.Cu", LayerKind::Signal),
            decl(2, "B.Cu", LayerKind::Signal),
            decl(4, "In1.Cu", LayerKind::Signal),
            decl(5, "F.SilkS", LayerKind::User),
            decl(7, "B.SilkS", LayerKind::User),
            decl(25, "Edge.Cuts", LayerKind::User),
        ];
        b
    }

    #[test]
    fn one_track_label_layer_per_copper_layer() {
        let set = LayerSet::new(&board());
        let names: Vec<String> = set.track_netname_label_layers().map(Layer::name).collect();
        assert_eq!(
            names,
            vec![":TrackNetName:F.Cu", ":TrackNetName:In1.Cu", ":TrackNetName:B.Cu"]
        );
        assert_eq!(set.via_layers().count(), 3);
        assert_eq!(set.pad_layers().count(), 3);
        assert_eq!(set.zone_layers().count(), 3);
        assert!(set.by_name("Edge.Cuts").is_some());
        assert!(set.by_name(":PadNumbers:Front").is_some());
        assert!(set.by_name("F.Fab").is_none());
    }

    #[test]
    fn ui_order_puts_front_above_back() {
        let set = LayerSet::new(&board());
        let order: Vec<String> = set.in_ui_order().map(Layer::name).collect();
        let pos = |n: &str| order.iter().position(|o| o == n).expect("Layer vorhanden");
        assert!(pos("F.SilkS") < pos("F.Cu"));
        assert!(pos("F.Cu") < pos("In1.Cu"));
        assert!(pos("In1.Cu") < pos("B.Cu"));
        assert!(pos("B.Cu") < pos("B.SilkS"));
    }

    #[test]
    fn dependency_on_physical_layer_hides_labels() {
        let mut set = LayerSet::new(&board());
        let label = LayerId::TrackNetName("F.Cu".into());
        assert!(set.is_effectively_visible(&label));
        set.set_visible(&LayerId::physical("F.Cu"), false);
        assert!(!set.is_effectively_visible(&label));
    }

    #[test]
    fn primary_layer_requires_exactly_one_highlight() {
        let mut set = LayerSet::new(&board());
        assert_eq!(set.primary_high_contrast_copper_layer_name(), None);
        set.set_highlighted("In1.Cu", true);
        assert_eq!(set.primary_high_contrast_copper_layer_name(), Some("In1.Cu"));
        set.set_highlighted("B.Cu", true);
        assert_eq!(set.primary_high_contrast_copper_layer_name(), None);
        assert!(!set.set_highlighted("F.SilkS", true));
    }
}
