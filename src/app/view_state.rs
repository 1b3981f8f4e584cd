//! Persistierter View-State (JSON-Blob des Hosts).
//!
//! Wird nie als Ganzes ersetzt, sondern über [`ViewState::merge`] fortgeschrieben:
//! flach pro Top-Level-Key, tief für alle `pcb.*`-Teilbäume.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::events::OpacitySlider;

/// Unterscheidet "Feld fehlt" (`None`) von explizitem `null` (`Some(None)`).
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Oberste Ebene des View-States.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Aktiver Tab (`pcb:<datei>`, `sch:<pfad>`, `bom`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<String>,
    /// Eingeklappt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    /// Board-Ansicht
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcb: Option<PcbViewState>,
}

/// Zustand der Board-Ansicht.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PcbViewState {
    /// Layer-Sichtbarkeit nach Layer-Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<IndexMap<String, bool>>,
    /// Objekt-Panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<ObjectsViewState>,
    /// Netz-Panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nets: Option<NetsViewState>,
}

/// Zustand des Objekt-Panels (Deckkraft-Regler, Sichtbarkeiten).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectsViewState {
    /// Deckkraft der Leiterbahnen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks_opacity: Option<f32>,
    /// Deckkraft der Vias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vias_opacity: Option<f32>,
    /// Deckkraft der Pads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pads_opacity: Option<f32>,
    /// Deckkraft der Zonen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones_opacity: Option<f32>,
    /// Deckkraft des Rasters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_opacity: Option<f32>,
    /// Hervorhebung der obersten sichtbaren Kupferlage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_track: Option<bool>,
    /// Sichtbarkeit nach Objektgruppe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_visibilities: Option<IndexMap<String, bool>>,
}

/// Zustand des Netz-Panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetsViewState {
    /// Filtertext
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
    /// Ausgewähltes Netz: fehlt = unverändert, `null` = Auswahl aufheben
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_net_number: Option<Option<u32>>,
}

fn merge_map(target: &mut Option<IndexMap<String, bool>>, source: &Option<IndexMap<String, bool>>) {
    if let Some(source) = source {
        let target = target.get_or_insert_with(IndexMap::new);
        for (k, v) in source {
            target.insert(k.clone(), *v);
        }
    }
}

fn merge_value<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if source.is_some() {
        target.clone_from(source);
    }
}

impl ObjectsViewState {
    fn merge(&mut self, other: &Self) {
        merge_value(&mut self.tracks_opacity, &other.tracks_opacity);
        merge_value(&mut self.vias_opacity, &other.vias_opacity);
        merge_value(&mut self.pads_opacity, &other.pads_opacity);
        merge_value(&mut self.zones_opacity, &other.zones_opacity);
        merge_value(&mut self.grid_opacity, &other.grid_opacity);
        merge_value(&mut self.highlight_track, &other.highlight_track);
        merge_map(&mut self.object_visibilities, &other.object_visibilities);
    }

    /// Gibt `true` zurück, wenn kein Feld gesetzt ist.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fragment mit einer einzelnen Deckkraft.
    pub fn with_opacity(slider: OpacitySlider, value: f32) -> Self {
        let mut objects = Self::default();
        let field = match slider {
            OpacitySlider::Tracks => &mut objects.tracks_opacity,
            OpacitySlider::Vias => &mut objects.vias_opacity,
            OpacitySlider::Pads => &mut objects.pads_opacity,
            OpacitySlider::Zones => &mut objects.zones_opacity,
            OpacitySlider::Grid => &mut objects.grid_opacity,
        };
        *field = Some(value);
        objects
    }
}

impl NetsViewState {
    fn merge(&mut self, other: &Self) {
        merge_value(&mut self.filter_text, &other.filter_text);
        merge_value(&mut self.selected_net_number, &other.selected_net_number);
    }

    /// Gibt `true` zurück, wenn kein Feld gesetzt ist.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PcbViewState {
    fn merge(&mut self, other: &Self) {
        merge_map(&mut self.layers, &other.layers);
        if let Some(objects) = &other.objects {
            self.objects.get_or_insert_with(Default::default).merge(objects);
        }
        if let Some(nets) = &other.nets {
            self.nets.get_or_insert_with(Default::default).merge(nets);
        }
    }

    /// Gibt `true` zurück, wenn kein Teilbaum etwas enthält.
    pub fn is_empty(&self) -> bool {
        self.layers.as_ref().is_none_or(IndexMap::is_empty)
            && self.objects.as_ref().is_none_or(ObjectsViewState::is_empty)
            && self.nets.as_ref().is_none_or(NetsViewState::is_empty)
    }
}

impl ViewState {
    /// Schreibt ein Fragment in diesen Zustand ein.
    pub fn merge(&mut self, fragment: &ViewState) {
        merge_value(&mut self.active_tab, &fragment.active_tab);
        merge_value(&mut self.collapsed, &fragment.collapsed);
        if let Some(pcb) = &fragment.pcb {
            self.pcb.get_or_insert_with(Default::default).merge(pcb);
        }
    }

    /// Gibt `true` zurück, wenn das Fragment nichts enthält.
    pub fn is_empty(&self) -> bool {
        self.active_tab.is_none()
            && self.collapsed.is_none()
            && self.pcb.as_ref().is_none_or(PcbViewState::is_empty)
    }

    /// Liest einen View-State aus JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        serde_json::from_str(json).context("View-State-JSON ungültig")
    }

    /// Serialisiert den View-State als JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        use anyhow::Context;
        serde_json::to_string(self).context("View-State nicht serialisierbar")
    }

    // ── Fragment-Konstruktoren ──────────────────────────────────────

    /// Fragment mit einer Layer-Sichtbarkeit.
    pub fn layer_visibility(name: impl Into<String>, visible: bool) -> Self {
        Self::with_pcb(PcbViewState {
            layers: Some(IndexMap::from([(name.into(), visible)])),
            ..Default::default()
        })
    }

    /// Fragment mit Objekt-Panel-Werten.
    pub fn objects(objects: ObjectsViewState) -> Self {
        Self::with_pcb(PcbViewState {
            objects: Some(objects),
            ..Default::default()
        })
    }

    /// Fragment mit Netz-Panel-Werten.
    pub fn nets(nets: NetsViewState) -> Self {
        Self::with_pcb(PcbViewState {
            nets: Some(nets),
            ..Default::default()
        })
    }

    /// Fragment mit einer Netzauswahl (`None` hebt sie auf).
    pub fn selected_net(net: Option<u32>) -> Self {
        Self::nets(NetsViewState {
            filter_text: None,
            selected_net_number: Some(net),
        })
    }

    fn with_pcb(pcb: PcbViewState) -> Self {
        Self {
            pcb: Some(pcb),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_net_distinguishes_missing_and_null() {
        let missing = ViewState::from_json(r#"{"pcb":{"nets":{"filterText":"GND"}}}"#)
            .expect("gültig");
        let nets = missing.pcb.and_then(|p| p.nets).expect("nets");
        assert_eq!(nets.selected_net_number, None);

        let cleared = ViewState::from_json(r#"{"pcb":{"nets":{"selectedNetNumber":null}}}"#)
            .expect("gültig");
        let nets = cleared.pcb.and_then(|p| p.nets).expect("nets");
        assert_eq!(nets.selected_net_number, Some(None));

        let json = ViewState::selected_net(None).to_json().expect("serialisierbar");
        assert_eq!(json, r#"{"pcb":{"nets":{"selectedNetNumber":null}}}"#);
    }

    #[test]
    fn merge_is_deep_for_pcb_and_shallow_on_top() {
        let mut state = ViewState::from_json(
            r#"{"activeTab":"pcb:a.kicad_pcb","pcb":{"layers":{"F.Cu":true,"B.Cu":true},
                "objects":{"zonesOpacity":0.5}}}"#,
        )
        .expect("gültig");
        let fragment = ViewState::from_json(
            r#"{"collapsed":true,"pcb":{"layers":{"B.Cu":false},"objects":{"tracksOpacity":0.3}}}"#,
        )
        .expect("gültig");
        state.merge(&fragment);

        assert_eq!(state.active_tab.as_deref(), Some("pcb:a.kicad_pcb"));
        assert_eq!(state.collapsed, Some(true));
        let pcb = state.pcb.expect("pcb");
        let layers = pcb.layers.expect("layers");
        assert_eq!(layers.get("F.Cu"), Some(&true));
        assert_eq!(layers.get("B.Cu"), Some(&false));
        let objects = pcb.objects.expect("objects");
        assert_eq!(objects.zones_opacity, Some(0.5));
        assert_eq!(objects.tracks_opacity, Some(0.3));
    }

    #[test]
    fn null_selection_overrides_previous_net() {
        let mut state = ViewState::selected_net(Some(5));
        state.merge(&ViewState::selected_net(None));
        let nets = state.pcb.and_then(|p| p.nets).expect("nets");
        assert_eq!(nets.selected_net_number, Some(None));
    }

    #[test]
    fn empty_fragments() {
        assert!(ViewState::default().is_empty());
        assert!(ViewState::from_json(r#"{"pcb":{"layers":{}}}"#)
            .expect("gültig")
            .is_empty());
        assert!(!ViewState::layer_visibility("F.Cu", false).is_empty());
    }
}
