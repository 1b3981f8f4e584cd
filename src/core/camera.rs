//! 2D-Kamera für Pan und Zoom über der Platine.

use super::BBox;
use glam::Vec2;

/// 2D-Kamera mit Pan und Zoom.
///
/// Weltkoordinaten sind Millimeter, `zoom` ist in Pixel pro Millimeter.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// Weltposition im Zentrum des Viewports
    pub center: Vec2,
    /// Zoom-Level (Pixel pro mm)
    pub zoom: f32,
}

impl Camera2D {
    /// Minimaler Zoom-Faktor.
    pub const ZOOM_MIN: f32 = crate::shared::options::CAMERA_ZOOM_MIN;
    /// Maximaler Zoom-Faktor.
    pub const ZOOM_MAX: f32 = crate::shared::options::CAMERA_ZOOM_MAX;

    /// Erstellt eine neue Kamera
    pub fn new() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Zentriert die Kamera auf einen Punkt
    pub fn look_at(&mut self, target: Vec2) {
        self.center = target;
    }

    /// Verschiebt die Kamera (Pan)
    pub fn pan(&mut self, delta: Vec2) {
        self.center += delta;
    }

    /// Ändert den Zoom-Level mit konfigurierbaren Grenzen.
    pub fn zoom_by_clamped(&mut self, factor: f32, min: f32, max: f32) {
        self.zoom = (self.zoom * factor).clamp(min, max);
    }

    /// Sichtbarer Weltausschnitt für eine Viewport-Größe in Pixeln.
    pub fn viewport_bbox(&self, viewport_size: [f32; 2]) -> BBox {
        let half = Vec2::new(viewport_size[0], viewport_size[1]) / (2.0 * self.zoom.max(f32::EPSILON));
        BBox::from_corners(self.center - half, self.center + half)
    }

    /// Konvertiert Screen-Koordinaten (Pixel, Ursprung oben links) zu Welt-Koordinaten.
    pub fn screen_to_world(&self, screen_pos: Vec2, screen_size: Vec2) -> Vec2 {
        (screen_pos - screen_size * 0.5) / self.zoom + self.center
    }

    /// Konvertiert Welt-Koordinaten zu Screen-Koordinaten.
    pub fn world_to_screen(&self, world_pos: Vec2, screen_size: Vec2) -> Vec2 {
        (world_pos - self.center) * self.zoom + screen_size * 0.5
    }

    /// Passt Zentrum und Zoom so an, dass `bbox` (plus Rand) vollständig sichtbar ist.
    ///
    /// Keine Operation bei leerer Box oder leerem Viewport.
    pub fn fit_bbox(&mut self, bbox: &BBox, viewport_size: [f32; 2], margin: f32, min: f32, max: f32) {
        if bbox.is_empty() || viewport_size[0] <= 0.0 || viewport_size[1] <= 0.0 {
            return;
        }
        let padded = bbox.grow(bbox.width().max(bbox.height()) * margin);
        let width = padded.width().max(f32::EPSILON);
        let height = padded.height().max(f32::EPSILON);
        self.center = padded.center();
        self.zoom = (viewport_size[0] / width)
            .min(viewport_size[1] / height)
            .clamp(min, max);
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_pan() {
        let mut camera = Camera2D::new();
        camera.pan(Vec2::new(10.0, 5.0));
        assert_relative_eq!(camera.center.x, 10.0);
        assert_relative_eq!(camera.center.y, 5.0);
    }

    #[test]
    fn test_viewport_bbox_shrinks_with_zoom() {
        let mut camera = Camera2D::new();
        camera.zoom = 10.0;
        let bbox = camera.viewport_bbox([800.0, 600.0]);
        assert_relative_eq!(bbox.width(), 80.0);
        assert_relative_eq!(bbox.height(), 60.0);
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let mut camera = Camera2D::new();
        camera.center = Vec2::new(100.0, 50.0);
        camera.zoom = 4.0;
        let size = Vec2::new(800.0, 600.0);
        let world = camera.screen_to_world(Vec2::new(400.0, 300.0), size);
        assert_relative_eq!(world.x, 100.0);
        assert_relative_eq!(world.y, 50.0);
        let screen = camera.world_to_screen(Vec2::new(110.0, 50.0), size);
        assert_relative_eq!(screen.x, 440.0);
    }

    #[test]
    fn test_fit_bbox_centers_and_zooms() {
        let mut camera = Camera2D::new();
        let bbox = BBox::from_corners(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0));
        camera.fit_bbox(&bbox, [1000.0, 1000.0], 0.0, 0.01, 1000.0);
        assert_relative_eq!(camera.center.x, 50.0);
        assert_relative_eq!(camera.center.y, 25.0);
        assert_relative_eq!(camera.zoom, 10.0);
    }
}
