//! View-State-Engine: Merge, Apply auf die Panels, gebundener Retry.

use super::events::{OpacitySlider, StateOrigin, ViewerEvent};
use super::panels::ViewerPanels;
use super::view_state::{NetsViewState, PcbViewState, ViewState};

/// Reconciliert den persistierten View-State mit dem lebenden Viewer.
#[derive(Debug, Clone)]
pub struct ViewStateEngine {
    state: ViewState,
    pending: Option<ViewState>,
    pending_origin: StateOrigin,
    retries: u32,
    max_retries: u32,
    notifications: Vec<ViewerEvent>,
}

impl ViewStateEngine {
    /// Erstellt eine Engine mit der gegebenen Retry-Grenze.
    pub fn new(max_retries: u32) -> Self {
        Self {
            state: ViewState::default(),
            pending: None,
            pending_origin: StateOrigin::Restore,
            retries: 0,
            max_retries,
            notifications: Vec::new(),
        }
    }

    /// Kopie des aktuellen Zustands.
    pub fn get_view_state(&self) -> ViewState {
        self.state.clone()
    }

    /// Noch nicht angewendeter Rest.
    pub fn pending(&self) -> Option<&ViewState> {
        self.pending.as_ref()
    }

    /// Bisherige Retries des ausstehenden Rests.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Schreibt ein Fragment ein und wendet es soweit möglich an.
    ///
    /// Nicht anwendbare Teile bleiben ausstehend und werden per [`Self::tick`]
    /// erneut versucht.
    pub fn set_view_state(
        &mut self,
        fragment: &ViewState,
        origin: StateOrigin,
        panels: &mut dyn ViewerPanels,
    ) {
        self.state.merge(fragment);
        let mut pending = self.pending.take().unwrap_or_default();
        pending.merge(fragment);
        if origin == StateOrigin::User {
            self.pending_origin = StateOrigin::User;
        }
        self.retries = 0;
        self.apply_pending(pending, panels);
    }

    /// Reiht den gesamten aktuellen Zustand erneut zum Anwenden ein.
    ///
    /// Nach einem Neuaufbau der Ansichten; angewendet wird im nächsten Tick
    /// mit Herkunft `Restore`, sofern kein Nutzer-Rest aussteht.
    pub fn requeue_current_state(&mut self) {
        let mut replay = self.state.clone();
        replay.collapsed = None;
        if replay.is_empty() {
            return;
        }
        let mut pending = self.pending.take().unwrap_or_default();
        pending.merge(&replay);
        self.pending = Some(pending);
        self.retries = 0;
    }

    /// Meldet eine bereits im Viewer ausgeführte Nutzeraktion.
    pub fn record_user_change(&mut self, fragment: &ViewState) {
        self.state.merge(fragment);
        // ein später angewendeter Replay-Rest darf die Nutzeraktion nicht überschreiben
        if let Some(pending) = self.pending.as_mut() {
            pending.merge(fragment);
        }
        self.notify(StateOrigin::User);
    }

    /// Retry des ausstehenden Rests im nächsten Idle-Tick.
    pub fn tick(&mut self, panels: &mut dyn ViewerPanels) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.retries += 1;
        self.apply_pending(pending, panels);
    }

    /// Entnimmt alle angefallenen Benachrichtigungen.
    pub fn drain_notifications(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.notifications)
    }

    fn apply_pending(&mut self, pending: ViewState, panels: &mut dyn ViewerPanels) {
        let rest = apply_fragment(&pending, panels);
        let origin = self.pending_origin;
        if rest.is_empty() {
            self.pending = None;
            self.pending_origin = StateOrigin::Restore;
            self.notify(origin);
        } else if self.retries >= self.max_retries {
            log::warn!(
                "View-State-Replay nach {} Versuchen verworfen: {}",
                self.retries,
                rest.to_json().unwrap_or_default()
            );
            self.pending = None;
            self.pending_origin = StateOrigin::Restore;
            self.notify(origin);
            self.notifications
                .push(ViewerEvent::ReplayAbandoned { dropped: rest });
        } else {
            log::trace!("View-State teilweise ausstehend (Versuch {})", self.retries);
            self.pending = Some(rest);
        }
    }

    fn notify(&mut self, origin: StateOrigin) {
        self.notifications.push(ViewerEvent::StateChanged {
            view_state: self.state.clone(),
            origin,
        });
    }
}

/// Wendet ein Fragment an und liefert den nicht anwendbaren Rest.
fn apply_fragment(fragment: &ViewState, panels: &mut dyn ViewerPanels) -> ViewState {
    let mut rest = ViewState::default();

    if let Some(tab) = &fragment.active_tab {
        let selected = panels.tabs().is_some_and(|tabs| tabs.select_tab(tab));
        if !selected {
            rest.active_tab = Some(tab.clone());
        }
    }

    if let Some(pcb) = &fragment.pcb {
        let pcb_rest = apply_pcb(pcb, panels);
        if !pcb_rest.is_empty() {
            rest.pcb = Some(pcb_rest);
        }
    }
    rest
}

fn apply_pcb(pcb: &PcbViewState, panels: &mut dyn ViewerPanels) -> PcbViewState {
    let mut rest = PcbViewState::default();

    if let Some(layers) = &pcb.layers {
        match panels.layers() {
            Some(panel) => {
                for (name, visible) in layers {
                    if !panel.set_layer_visible(name, *visible) {
                        log::debug!("View-State: Layer {name} existiert nicht, übersprungen");
                    }
                }
            }
            None => rest.layers = Some(layers.clone()),
        }
    }

    if let Some(objects) = &pcb.objects {
        match panels.objects() {
            Some(panel) => {
                let sliders = [
                    (OpacitySlider::Tracks, objects.tracks_opacity),
                    (OpacitySlider::Vias, objects.vias_opacity),
                    (OpacitySlider::Pads, objects.pads_opacity),
                    (OpacitySlider::Zones, objects.zones_opacity),
                    (OpacitySlider::Grid, objects.grid_opacity),
                ];
                for (slider, value) in sliders {
                    if let Some(value) = value {
                        panel.set_opacity(slider, value);
                    }
                }
                for (group, visible) in objects.object_visibilities.iter().flatten() {
                    if !panel.set_object_visible(group, *visible) {
                        log::debug!("View-State: Objektgruppe {group} unbekannt");
                    }
                }
                // nach den Sichtbarkeiten, damit die oberste sichtbare Lage stimmt
                if let Some(enabled) = objects.highlight_track {
                    panel.set_highlight_track(enabled);
                }
            }
            None => rest.objects = Some(objects.clone()),
        }
    }

    if let Some(nets) = &pcb.nets {
        let nets_rest = apply_nets(nets, panels);
        if !nets_rest.is_empty() {
            rest.nets = Some(nets_rest);
        }
    }
    rest
}

fn apply_nets(nets: &NetsViewState, panels: &mut dyn ViewerPanels) -> NetsViewState {
    let mut rest = NetsViewState::default();
    match panels.nets() {
        Some(panel) => {
            if let Some(text) = &nets.filter_text {
                panel.set_filter_text(text);
            }
            if let Some(selection) = nets.selected_net_number {
                panel.select_net(selection);
            }
        }
        None => {
            rest.filter_text.clone_from(&nets.filter_text);
            match nets.selected_net_number {
                // explizites null wirkt auch ohne Netz-Panel
                Some(None) => panels.clear_net_focus(),
                Some(Some(n)) => rest.selected_net_number = Some(Some(n)),
                None => {}
            }
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::panels::{LayersPanel, NetsPanel, ObjectsPanel, TabsPanel};
    use indexmap::IndexMap;

    /// Panel-Attrappe, die alle Aufrufe protokolliert.
    #[derive(Default)]
    struct FakePanels {
        mounted: bool,
        layers: IndexMap<String, bool>,
        opacities: Vec<(OpacitySlider, f32)>,
        selected: Option<u32>,
        select_calls: usize,
        direct_clears: usize,
        tabs: Vec<String>,
        active_tab: Option<String>,
    }

    impl LayersPanel for FakePanels {
        fn set_layer_visible(&mut self, name: &str, visible: bool) -> bool {
            if name == "Nope" {
                return false;
            }
            self.layers.insert(name.to_string(), visible);
            true
        }
    }

    impl ObjectsPanel for FakePanels {
        fn set_opacity(&mut self, slider: OpacitySlider, value: f32) {
            self.opacities.push((slider, value));
        }
        fn set_highlight_track(&mut self, _enabled: bool) {}
        fn set_object_visible(&mut self, _group: &str, _visible: bool) -> bool {
            true
        }
    }

    impl NetsPanel for FakePanels {
        fn set_filter_text(&mut self, _text: &str) {}
        fn select_net(&mut self, net: Option<u32>) {
            self.selected = net;
            self.select_calls += 1;
        }
    }

    impl TabsPanel for FakePanels {
        fn select_tab(&mut self, tab: &str) -> bool {
            if self.tabs.iter().any(|t| t == tab) {
                self.active_tab = Some(tab.to_string());
                true
            } else {
                false
            }
        }
    }

    impl ViewerPanels for FakePanels {
        fn layers(&mut self) -> Option<&mut dyn LayersPanel> {
            if self.mounted {
                Some(self)
            } else {
                None
            }
        }
        fn objects(&mut self) -> Option<&mut dyn ObjectsPanel> {
            if self.mounted {
                Some(self)
            } else {
                None
            }
        }
        fn nets(&mut self) -> Option<&mut dyn NetsPanel> {
            if self.mounted {
                Some(self)
            } else {
                None
            }
        }
        fn tabs(&mut self) -> Option<&mut dyn TabsPanel> {
            if self.mounted {
                Some(self)
            } else {
                None
            }
        }
        fn clear_net_focus(&mut self) {
            self.direct_clears += 1;
        }
    }

    fn state_changes(events: &[ViewerEvent]) -> Vec<StateOrigin> {
        events
            .iter()
            .filter_map(|e| match e {
                ViewerEvent::StateChanged { origin, .. } => Some(*origin),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn get_view_state_returns_copy() {
        let mut engine = ViewStateEngine::new(3);
        let mut panels = FakePanels::default();
        engine.set_view_state(
            &ViewState::layer_visibility("F.Cu", false),
            StateOrigin::Restore,
            &mut panels,
        );
        let mut copy = engine.get_view_state();
        copy.collapsed = Some(true);
        assert_eq!(engine.get_view_state().collapsed, None);
    }

    #[test]
    fn unmounted_panels_keep_fragment_pending_until_tick() {
        let mut engine = ViewStateEngine::new(5);
        let mut panels = FakePanels::default();
        let fragment = ViewState::from_json(
            r#"{"collapsed":false,"pcb":{"layers":{"B.Cu":false},"objects":{"zonesOpacity":0.4}}}"#,
        )
        .expect("gültig");

        engine.set_view_state(&fragment, StateOrigin::Restore, &mut panels);
        assert_eq!(engine.get_view_state().collapsed, Some(false));
        assert!(engine.pending().is_some());
        assert!(engine.drain_notifications().is_empty());

        engine.tick(&mut panels);
        assert_eq!(engine.retries(), 1);

        panels.mounted = true;
        engine.tick(&mut panels);
        assert!(engine.pending().is_none());
        assert_eq!(panels.layers.get("B.Cu"), Some(&false));
        assert_eq!(panels.opacities, vec![(OpacitySlider::Zones, 0.4)]);
        assert_eq!(
            state_changes(&engine.drain_notifications()),
            vec![StateOrigin::Restore]
        );
    }

    #[test]
    fn exhausted_retries_drop_pending_and_report() {
        let mut engine = ViewStateEngine::new(2);
        let mut panels = FakePanels {
            mounted: true,
            tabs: vec!["bom".into()],
            ..Default::default()
        };
        let fragment = ViewState {
            active_tab: Some("sch:/missing".into()),
            ..Default::default()
        };
        engine.set_view_state(&fragment, StateOrigin::Restore, &mut panels);
        engine.tick(&mut panels);
        assert!(engine.pending().is_some());
        engine.tick(&mut panels);
        assert!(engine.pending().is_none());

        let events = engine.drain_notifications();
        assert_eq!(state_changes(&events), vec![StateOrigin::Restore]);
        assert!(events.iter().any(|e| matches!(
            e,
            ViewerEvent::ReplayAbandoned { dropped } if dropped.active_tab.as_deref() == Some("sch:/missing")
        )));

        // weitere Ticks sind No-ops
        engine.tick(&mut panels);
        assert!(engine.drain_notifications().is_empty());
    }

    #[test]
    fn requeued_state_is_applied_to_fresh_panels() {
        let mut engine = ViewStateEngine::new(5);
        let mut panels = FakePanels {
            mounted: true,
            ..Default::default()
        };
        engine.set_view_state(
            &ViewState::layer_visibility("B.Cu", false),
            StateOrigin::User,
            &mut panels,
        );
        engine.drain_notifications();

        let mut rebuilt = FakePanels::default();
        engine.requeue_current_state();
        assert!(engine.pending().is_some());
        rebuilt.mounted = true;
        engine.tick(&mut rebuilt);

        assert!(engine.pending().is_none());
        assert_eq!(rebuilt.layers.get("B.Cu"), Some(&false));
        assert_eq!(
            state_changes(&engine.drain_notifications()),
            vec![StateOrigin::Restore]
        );
    }

    #[test]
    fn requeue_of_empty_state_is_noop() {
        let mut engine = ViewStateEngine::new(5);
        engine.set_view_state(
            &ViewState {
                collapsed: Some(true),
                ..Default::default()
            },
            StateOrigin::Restore,
            &mut FakePanels::default(),
        );
        engine.requeue_current_state();
        assert!(engine.pending().is_none());
    }

    #[test]
    fn replay_twice_is_idempotent() {
        let mut engine = ViewStateEngine::new(5);
        let mut panels = FakePanels {
            mounted: true,
            ..Default::default()
        };
        let fragment = ViewState::from_json(
            r#"{"pcb":{"layers":{"F.Cu":false,"Nope":true},"nets":{"selectedNetNumber":4}}}"#,
        )
        .expect("gültig");

        engine.set_view_state(&fragment, StateOrigin::Restore, &mut panels);
        let once = (panels.layers.clone(), panels.selected, engine.get_view_state());
        engine.set_view_state(&fragment, StateOrigin::Restore, &mut panels);
        let twice = (panels.layers.clone(), panels.selected, engine.get_view_state());

        assert_eq!(once, twice);
        assert_eq!(panels.select_calls, 2);
        assert_eq!(
            state_changes(&engine.drain_notifications()),
            vec![StateOrigin::Restore, StateOrigin::Restore]
        );
    }

    #[test]
    fn null_selection_clears_focus_without_panel() {
        let mut engine = ViewStateEngine::new(5);
        let mut panels = FakePanels::default();
        engine.set_view_state(&ViewState::selected_net(None), StateOrigin::Restore, &mut panels);
        assert_eq!(panels.direct_clears, 1);
        assert!(engine.pending().is_none());
    }

    #[test]
    fn user_change_overrides_pending_replay() {
        let mut engine = ViewStateEngine::new(5);
        let mut panels = FakePanels::default();
        engine.set_view_state(
            &ViewState::layer_visibility("F.Cu", false),
            StateOrigin::Restore,
            &mut panels,
        );
        engine.record_user_change(&ViewState::layer_visibility("F.Cu", true));
        assert_eq!(
            state_changes(&engine.drain_notifications()),
            vec![StateOrigin::User]
        );

        panels.mounted = true;
        engine.tick(&mut panels);
        assert_eq!(panels.layers.get("F.Cu"), Some(&true));
    }
}
