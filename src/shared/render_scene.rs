//! Render-Szene als expliziter Übergabevertrag zwischen App und Renderer.
//!
//! Lebt im shared-Modul, da `app` sie baut und `render` sie konsumiert.

use crate::core::{BBox, Camera2D};

/// Read-only Daten für einen Render-Frame.
#[derive(Debug, Clone)]
pub struct RenderScene {
    /// Kamera-Zustand für diesen Frame
    pub camera: Camera2D,
    /// Viewport-Größe in Pixeln [Breite, Höhe]
    pub viewport_size: [f32; 2],
}

impl RenderScene {
    /// Erstellt eine Szene aus Kamera und Viewport-Größe.
    pub fn new(camera: Camera2D, viewport_size: [f32; 2]) -> Self {
        Self {
            camera,
            viewport_size,
        }
    }

    /// Sichtbarer Weltausschnitt (mm) dieses Frames.
    pub fn viewport_bbox(&self) -> BBox {
        self.camera.viewport_bbox(self.viewport_size)
    }

    /// Gibt zurück, ob der Viewport eine darstellbare Fläche hat.
    pub fn has_area(&self) -> bool {
        self.viewport_size[0] > 0.0 && self.viewport_size[1] > 0.0
    }
}
