//! Ereignisse des Viewers an den Host und Eingaben aus UI/Host.

use glam::Vec2;
use serde::Serialize;

use super::view_state::ViewState;
use crate::project::LoadStatus;

/// Herkunft einer View-State-Änderung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateOrigin {
    /// Live-Interaktion im Viewer
    User,
    /// Replay aus persistiertem Zustand
    Restore,
}

/// Benachrichtigung des Viewers an den Host.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// View-State hat sich geändert
    StateChanged {
        /// Vollständiger Zustand nach der Änderung
        view_state: ViewState,
        /// Herkunft
        origin: StateOrigin,
    },
    /// Ladefortschritt
    LoadStatus(LoadStatus),
    /// Load abgeschlossen
    Loaded {
        /// Aus dem Snapshot-Cache bedient
        from_cache: bool,
    },
    /// Net-Fokus aufgehoben
    NetFocusCleared,
    /// Anzeigename des Projekts hat sich geändert
    FileMetaChanged {
        /// Neuer Anzeigename
        display_name: String,
    },
    /// Ausstehender View-State-Replay nach erschöpften Retries verworfen
    ReplayAbandoned {
        /// Nicht angewendeter Rest
        dropped: ViewState,
    },
}

/// Deckkraft-Regler des Objekt-Panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpacitySlider {
    /// Leiterbahnen (physische Kupferlagen)
    Tracks,
    /// Vias
    Vias,
    /// Pads
    Pads,
    /// Zonen
    Zones,
    /// Raster
    Grid,
}

/// Eingaben aus UI oder Host ohne direkte Mutationslogik.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerIntent {
    /// Layer im Layer-Panel umgeschaltet
    LayerVisibilityToggled {
        /// Layer-Name
        name: String,
        /// Neue Sichtbarkeit
        visible: bool,
    },
    /// Deckkraft-Regler bewegt
    OpacityChanged {
        /// Regler
        slider: OpacitySlider,
        /// Neuer Wert 0..1
        value: f32,
    },
    /// Objektgruppe ein-/ausgeblendet
    ObjectVisibilityToggled {
        /// Gruppenname
        name: String,
        /// Neue Sichtbarkeit
        visible: bool,
    },
    /// "Highlight track" umgeschaltet
    HighlightTrackToggled {
        /// Neuer Zustand
        enabled: bool,
    },
    /// Netz im Netz-Panel gewählt (`None` hebt die Auswahl auf)
    NetSelected {
        /// Netznummer
        net: Option<u32>,
    },
    /// Filtertext im Netz-Panel geändert
    NetFilterChanged {
        /// Neuer Text
        text: String,
    },
    /// Tab gewählt
    TabSelected {
        /// Tab-Kennung
        tab: String,
    },
    /// Einfacher Klick auf die Zeichenfläche
    CanvasClicked {
        /// Weltposition (mm)
        world: Vec2,
    },
    /// Doppelklick auf die Zeichenfläche
    CanvasDoubleClicked {
        /// Weltposition (mm)
        world: Vec2,
    },
    /// Ein-/Ausklappen
    CollapseToggled {
        /// Neuer Zustand
        collapsed: bool,
    },
    /// Vollbild umgeschaltet
    FullscreenToggled {
        /// Neuer Zustand
        fullscreen: bool,
    },
    /// Viewport-Größe geändert
    ViewportResized {
        /// Größe in Pixeln
        size: [f32; 2],
    },
    /// Kamera verschieben (Welt-Einheiten)
    CameraPan {
        /// Verschiebung
        delta: Vec2,
    },
    /// Kamera zoomen
    CameraZoom {
        /// Faktor
        factor: f32,
    },
}
