//! Viewer-Shell: Load-Zustand, Einklappen, Panels und View-State einer Instanz.

use std::sync::Arc;

use anyhow::Result;
use glam::Vec2;
use indexmap::IndexMap;

use super::deferred::DeferredLoad;
use super::engine::ViewStateEngine;
use super::error::ViewerError;
use super::events::{StateOrigin, ViewerEvent, ViewerIntent};
use super::panels::{BoardView, PanelRegistry, TabBar, ViewerPanels};
use super::view_state::{NetsViewState, ObjectsViewState, ViewState};
use crate::core::PickTarget;
use crate::project::{
    LoadOutcome, LoadPhase, LoadStatus, PageKind, PreparedLoad, Project, ProjectEvent,
    ProjectServices,
};
use crate::render::{BoardRenderer, DynamicLabelStats, RenderEvent};
use crate::shared::options::DEFAULT_VIEWPORT_SIZE;
use crate::shared::ViewerOptions;

/// Load-Zustand einer Viewer-Instanz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Noch nichts geladen
    Uninitialized,
    /// Load läuft
    Loading,
    /// Projekt geladen
    Loaded,
}

/// Ergebnis einer Load-Anfrage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequestOutcome {
    /// Viewer ist eingeklappt; Anfrage wurde aufgeschoben
    Deferred,
    /// Load wurde ausgeführt
    Completed(LoadOutcome),
}

/// Eine Viewer-Instanz.
pub struct Viewer {
    project: Project,
    options: ViewerOptions,
    load_state: LoadState,
    collapsed: bool,
    fullscreen: bool,
    deferred: Option<DeferredLoad>,
    engine: ViewStateEngine,
    panels: PanelRegistry,
    viewport_size: [f32; 2],
    events: Vec<ViewerEvent>,
}

impl Viewer {
    /// Erstellt einen leeren Viewer.
    pub fn new(services: ProjectServices, options: ViewerOptions) -> Self {
        Self {
            project: Project::new(services),
            engine: ViewStateEngine::new(options.view_state_max_retries),
            options,
            load_state: LoadState::Uninitialized,
            collapsed: false,
            fullscreen: false,
            deferred: None,
            panels: PanelRegistry::default(),
            viewport_size: DEFAULT_VIEWPORT_SIZE,
            events: Vec::new(),
        }
    }

    /// Viewer mit Dateisystem-Fetcher und prozessweitem Cache.
    pub fn with_options(options: ViewerOptions) -> Self {
        Self::new(ProjectServices::from_options(&options), options)
    }

    // ── Zustand ─────────────────────────────────────────────────────

    /// Load-Zustand.
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Eingeklappt.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Vollbild aktiv.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Aufgeschobene Load-Anfrage.
    pub fn deferred_load(&self) -> Option<&DeferredLoad> {
        self.deferred.as_ref()
    }

    /// Document Store.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Panel-Registry.
    pub fn panels(&self) -> &PanelRegistry {
        &self.panels
    }

    /// Board-Ansicht, sobald ein Board geladen ist.
    pub fn board_view(&self) -> Option<&BoardView> {
        self.panels.board.as_ref()
    }

    /// Board-Ansicht, veränderlich.
    pub fn board_view_mut(&mut self) -> Option<&mut BoardView> {
        self.panels.board.as_mut()
    }

    /// Kopie des aktuellen View-States.
    pub fn get_view_state(&self) -> ViewState {
        self.engine.get_view_state()
    }

    /// Noch nicht angewendeter View-State-Rest.
    pub fn pending_view_state(&self) -> Option<&ViewState> {
        self.engine.pending()
    }

    // ── Load ────────────────────────────────────────────────────────

    /// Fordert einen Load an.
    ///
    /// Ist der Viewer eingeklappt und noch nicht geladen, wird die Anfrage nur
    /// vermerkt (eine neue Anfrage ersetzt eine ältere).
    pub fn request_load(&mut self, request: DeferredLoad) -> Result<LoadRequestOutcome> {
        if self.collapsed && self.load_state == LoadState::Uninitialized {
            log::info!("Viewer eingeklappt, Load aufgeschoben: {}", request.describe());
            self.deferred = Some(request);
            return Ok(LoadRequestOutcome::Deferred);
        }
        let prepared = self.begin_load(request)?;
        Ok(LoadRequestOutcome::Completed(self.complete_load(prepared)))
    }

    /// Erster Schritt eines Loads: Quellen auflösen und vorbereiten.
    ///
    /// Bis zum zugehörigen [`Self::complete_load`] wird jeder weitere Load mit
    /// [`ViewerError::LoadInFlight`] abgewiesen.
    pub fn begin_load(&mut self, request: DeferredLoad) -> Result<PreparedLoad> {
        if self.load_state == LoadState::Loading {
            return Err(ViewerError::LoadInFlight.into());
        }
        let description = request.describe();
        let sources = match request.into_sources(self.project.services().fetcher.as_ref()) {
            Ok(sources) => sources,
            Err(e) => {
                log::warn!("Load {description} fehlgeschlagen: {e:#}");
                self.events.push(ViewerEvent::LoadStatus(LoadStatus::new(
                    LoadPhase::Failed,
                    format!("Download fehlgeschlagen: {e}"),
                )));
                return Err(e);
            }
        };
        if sources.is_empty() {
            return Err(ViewerError::NoSources.into());
        }

        self.load_state = LoadState::Loading;
        self.events.push(ViewerEvent::LoadStatus(LoadStatus::progress(
            LoadPhase::Download,
            "Lade Quellen",
            0,
            sources.len(),
        )));
        let prepared = self.project.prepare(&sources);
        self.collect_project_events();
        Ok(prepared)
    }

    /// Zweiter Schritt eines Loads: Ergebnis übernehmen und Ansichten aufbauen.
    pub fn complete_load(&mut self, prepared: PreparedLoad) -> LoadOutcome {
        let outcome = self.project.commit(prepared);
        self.collect_project_events();
        match outcome {
            LoadOutcome::Parsed { .. } | LoadOutcome::FromCache => {
                self.load_state = LoadState::Loaded;
                self.deferred = None;
                self.build_views();
            }
            LoadOutcome::Empty | LoadOutcome::Discarded => {
                self.load_state = if self.project.is_loaded() {
                    LoadState::Loaded
                } else {
                    LoadState::Uninitialized
                };
            }
        }
        outcome
    }

    fn collect_project_events(&mut self) {
        let events = self.project.drain_events().into_iter().map(|event| match event {
            ProjectEvent::Status(status) => ViewerEvent::LoadStatus(status),
            ProjectEvent::Loaded { from_cache } => ViewerEvent::Loaded { from_cache },
            ProjectEvent::FileMetaChanged { display_name } => {
                ViewerEvent::FileMetaChanged { display_name }
            }
        });
        self.events.extend(events);
    }

    fn build_views(&mut self) {
        let board = self.project.boards().first().map(Arc::clone);
        let mut tabs: Vec<String> = self
            .project
            .boards()
            .iter()
            .map(|b| format!("pcb:{}", b.filename))
            .collect();
        tabs.extend(
            self.project
                .pages()
                .filter(|p| p.kind == PageKind::Schematic)
                .map(|p| format!("sch:{}", p.project_path)),
        );
        tabs.push("bom".to_string());

        // Panels werden erst im nächsten Tick montiert
        self.panels.reset();
        self.panels.tabs = Some(TabBar::new(tabs));
        self.panels.board = board.map(|board| {
            let renderer = BoardRenderer::new(board, &self.options);
            BoardView::new(renderer, self.viewport_size, &self.options)
        });
        // neu aufgebaute Panels starten mit Defaults: aktuellen Zustand nachspielen
        self.engine.requeue_current_state();
    }

    /// Verwirft Projekt und Ansichten.
    pub fn dispose(&mut self) {
        self.project.dispose();
        self.panels.reset();
        self.load_state = LoadState::Uninitialized;
        self.deferred = None;
    }

    // ── Einklappen / Vollbild ───────────────────────────────────────

    /// Klappt den Viewer ein oder aus.
    ///
    /// Während Vollbild ohne Wirkung. Ausklappen eines noch nicht geladenen
    /// Viewers führt die aufgeschobene Anfrage genau einmal aus.
    pub fn set_collapsed(&mut self, collapsed: bool) -> Result<Option<LoadOutcome>> {
        if self.fullscreen {
            log::debug!("Einklappen im Vollbild ignoriert");
            return Ok(None);
        }
        self.collapsed = collapsed;
        if collapsed || self.load_state != LoadState::Uninitialized {
            return Ok(None);
        }
        let Some(request) = self.deferred.take() else {
            return Ok(None);
        };
        log::info!("Viewer ausgeklappt, starte aufgeschobenen Load");
        match self.request_load(request)? {
            LoadRequestOutcome::Completed(outcome) => Ok(Some(outcome)),
            LoadRequestOutcome::Deferred => Ok(None),
        }
    }

    /// Schaltet Vollbild.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    // ── View-State ──────────────────────────────────────────────────

    /// Schreibt ein Fragment ein und wendet es an.
    pub fn set_view_state(&mut self, fragment: &ViewState, origin: StateOrigin) -> Result<()> {
        self.engine.set_view_state(fragment, origin, &mut self.panels);
        if let Some(collapsed) = fragment.collapsed {
            self.set_collapsed(collapsed)?;
        }
        Ok(())
    }

    /// Replay eines persistierten Zustands (Herkunft `Restore`).
    pub fn restore_view_state(&mut self, fragment: &ViewState) -> Result<()> {
        self.set_view_state(fragment, StateOrigin::Restore)
    }

    /// Idle-Tick: Panels montieren und ausstehende Fragmente erneut anwenden.
    pub fn tick(&mut self) {
        if self.panels.mount_available() {
            log::debug!("Panels montiert: {:?}", self.panels.mounted);
        }
        self.engine.tick(&mut self.panels);
    }

    // ── Interaktion ─────────────────────────────────────────────────

    /// Verarbeitet eine Nutzereingabe; Zustandsänderungen tragen Herkunft `User`.
    pub fn handle_intent(&mut self, intent: ViewerIntent) -> Result<()> {
        match intent {
            ViewerIntent::LayerVisibilityToggled { name, visible } => {
                if let Some(panel) = self.panels.layers() {
                    panel.set_layer_visible(&name, visible);
                }
                self.engine
                    .record_user_change(&ViewState::layer_visibility(name, visible));
            }
            ViewerIntent::OpacityChanged { slider, value } => {
                let value = value.clamp(0.0, 1.0);
                if let Some(panel) = self.panels.objects() {
                    panel.set_opacity(slider, value);
                }
                self.engine.record_user_change(&ViewState::objects(
                    ObjectsViewState::with_opacity(slider, value),
                ));
            }
            ViewerIntent::ObjectVisibilityToggled { name, visible } => {
                if let Some(panel) = self.panels.objects() {
                    panel.set_object_visible(&name, visible);
                }
                self.engine.record_user_change(&ViewState::objects(ObjectsViewState {
                    object_visibilities: Some(IndexMap::from([(name, visible)])),
                    ..Default::default()
                }));
            }
            ViewerIntent::HighlightTrackToggled { enabled } => {
                if let Some(panel) = self.panels.objects() {
                    panel.set_highlight_track(enabled);
                }
                self.engine.record_user_change(&ViewState::objects(ObjectsViewState {
                    highlight_track: Some(enabled),
                    ..Default::default()
                }));
            }
            ViewerIntent::NetSelected { net } => self.select_net(net),
            ViewerIntent::NetFilterChanged { text } => {
                if let Some(panel) = self.panels.nets() {
                    panel.set_filter_text(&text);
                }
                self.engine.record_user_change(&ViewState::nets(NetsViewState {
                    filter_text: Some(text),
                    selected_net_number: None,
                }));
            }
            ViewerIntent::TabSelected { tab } => {
                let selected = self
                    .panels
                    .tabs()
                    .is_some_and(|tabs| tabs.select_tab(&tab));
                if selected {
                    self.engine.record_user_change(&ViewState {
                        active_tab: Some(tab),
                        ..Default::default()
                    });
                } else {
                    log::debug!("Unbekannter Tab: {tab}");
                }
            }
            ViewerIntent::CanvasClicked { world } => self.click(world),
            ViewerIntent::CanvasDoubleClicked { world } => self.double_click(world),
            ViewerIntent::CollapseToggled { collapsed } => {
                if self.fullscreen {
                    log::debug!("Einklappen im Vollbild ignoriert");
                    return Ok(());
                }
                self.engine.record_user_change(&ViewState {
                    collapsed: Some(collapsed),
                    ..Default::default()
                });
                self.set_collapsed(collapsed)?;
            }
            ViewerIntent::FullscreenToggled { fullscreen } => self.set_fullscreen(fullscreen),
            ViewerIntent::ViewportResized { size } => {
                self.viewport_size = size;
                if let Some(view) = self.panels.board.as_mut() {
                    view.resize(size);
                }
            }
            ViewerIntent::CameraPan { delta } => {
                if let Some(view) = self.panels.board.as_mut() {
                    view.pan(delta);
                }
            }
            ViewerIntent::CameraZoom { factor } => {
                if let Some(view) = self.panels.board.as_mut() {
                    view.zoom(factor);
                }
            }
        }
        Ok(())
    }

    fn select_net(&mut self, net: Option<u32>) {
        match self.panels.nets() {
            Some(panel) => panel.select_net(net),
            None if net.is_none() => self.panels.clear_net_focus(),
            None => log::debug!("Netz-Panel nicht montiert, Auswahl nur im View-State"),
        }
        self.engine.record_user_change(&ViewState::selected_net(net));
    }

    fn pick(&self, world: Vec2) -> Option<PickTarget> {
        let view = self.panels.board.as_ref()?;
        let tolerance = self.options.pick_radius_px / view.camera.zoom.max(f32::EPSILON);
        view.renderer.pick(world, tolerance).map(|m| m.target)
    }

    fn click(&mut self, world: Vec2) {
        if self.pick(world).is_some() {
            return;
        }
        if let Some(view) = self.panels.board.as_mut() {
            view.renderer.clear_isolation();
        }
    }

    fn double_click(&mut self, world: Vec2) {
        let Some(target) = self.pick(world) else {
            return;
        };
        let net = match self.panels.board.as_ref() {
            Some(view) => target.net(view.renderer.board()),
            None => return,
        };
        if net > 0 {
            self.select_net(Some(net));
        } else if let (Some(footprint), Some(view)) = (target.footprint(), self.panels.board.as_mut()) {
            view.renderer.isolate_component(footprint);
        }
    }

    // ── Zeichnen / Ereignisse ───────────────────────────────────────

    /// Ein Frame der Board-Ansicht.
    pub fn draw(&mut self) -> Option<DynamicLabelStats> {
        let view = self.panels.board.as_mut()?;
        let scene = view.scene();
        Some(view.renderer.draw(&scene))
    }

    /// Entnimmt alle Benachrichtigungen an den Host.
    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        self.collect_project_events();
        let mut events = std::mem::take(&mut self.events);

        if let Some(view) = self.panels.board.as_mut() {
            for event in view.renderer.drain_events() {
                match event {
                    RenderEvent::NetFocusCleared => events.push(ViewerEvent::NetFocusCleared),
                    other => log::trace!("Render-Ereignis: {other:?}"),
                }
            }
        }
        events.extend(self.engine.drain_notifications());
        events
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("load_state", &self.load_state)
            .field("collapsed", &self.collapsed)
            .field("fullscreen", &self.fullscreen)
            .field("deferred", &self.deferred.as_ref().map(DeferredLoad::describe))
            .finish_non_exhaustive()
    }
}
