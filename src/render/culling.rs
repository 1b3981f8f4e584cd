//! Viewport-Culling für Strecken gegen den sichtbaren Weltausschnitt.

use glam::Vec2;

use crate::core::BBox;

/// Prüft ob eine Strecke den Viewport schneidet oder darin liegt.
pub(super) fn segment_intersects_bbox(start: Vec2, end: Vec2, viewport: &BBox) -> bool {
    if viewport.is_empty() {
        return false;
    }
    if viewport.contains_point(start) || viewport.contains_point(end) {
        return true;
    }

    let (min, max) = (viewport.min, viewport.max);
    let corners = [
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
        Vec2::new(max.x, max.y),
        Vec2::new(min.x, max.y),
    ];
    (0..4).any(|i| segments_intersect(start, end, corners[i], corners[(i + 1) % 4]))
}

fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
        return true;
    }

    const EPS: f32 = 1e-6;
    (o1.abs() <= EPS && on_segment(b1, a1, a2))
        || (o2.abs() <= EPS && on_segment(b2, a1, a2))
        || (o3.abs() <= EPS && on_segment(a1, b1, b2))
        || (o4.abs() <= EPS && on_segment(a2, b1, b2))
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    const EPS: f32 = 1e-6;
    p.cmpge(a.min(b) - EPS).all() && p.cmple(a.max(b) + EPS).all()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> BBox {
        BBox::from_corners(Vec2::splat(-1.0), Vec2::splat(1.0))
    }

    #[test]
    fn crossing_segment_is_visible() {
        assert!(segment_intersects_bbox(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0), &view()));
        assert!(segment_intersects_bbox(Vec2::new(-3.0, -2.0), Vec2::new(2.0, 3.0), &view()));
    }

    #[test]
    fn segment_outside_is_culled() {
        assert!(!segment_intersects_bbox(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0), &view()));
        assert!(!segment_intersects_bbox(Vec2::ZERO, Vec2::ONE, &BBox::empty()));
    }
}
