//! Achsenparallele Bounding Box in Weltkoordinaten (mm).

use glam::Vec2;

/// Achsenparallele Bounding Box. Eine leere Box hat `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// Untere linke Ecke
    pub min: Vec2,
    /// Obere rechte Ecke
    pub max: Vec2,
}

impl BBox {
    /// Erstellt eine leere Box, die durch `expand_*` wächst.
    pub fn empty() -> Self {
        Self {
            min: Vec2::splat(f32::INFINITY),
            max: Vec2::splat(f32::NEG_INFINITY),
        }
    }

    /// Erstellt eine Box aus zwei beliebigen Ecken.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Erstellt die umschließende Box einer Punktmenge.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_point(*p);
        }
        bbox
    }

    /// Gibt `true` zurück, wenn die Box noch keinen Punkt enthält.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Erweitert die Box um einen Punkt.
    pub fn expand_point(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Erweitert die Box um eine andere Box.
    pub fn expand_bbox(&mut self, other: &BBox) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Vergrößert die Box in alle Richtungen um `amount`.
    pub fn grow(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    /// Breite der Box (0 bei leerer Box).
    pub fn width(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    /// Höhe der Box (0 bei leerer Box).
    pub fn height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }

    /// Mittelpunkt der Box.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Prüft ob ein Punkt innerhalb der Box liegt (Ränder inklusive).
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Prüft ob sich zwei Boxen überlappen.
    pub fn intersects(&self, other: &BBox) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || other.min.x > self.max.x
            || other.max.x < self.min.x
            || other.min.y > self.max.y
            || other.max.y < self.min.y)
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_grows_with_points() {
        let mut bbox = BBox::empty();
        assert!(bbox.is_empty());
        bbox.expand_point(Vec2::new(1.0, 2.0));
        bbox.expand_point(Vec2::new(-1.0, 5.0));
        assert_eq!(bbox.min, Vec2::new(-1.0, 2.0));
        assert_eq!(bbox.max, Vec2::new(1.0, 5.0));
        assert_eq!(bbox.width(), 2.0);
        assert_eq!(bbox.height(), 3.0);
    }

    #[test]
    fn intersects_ignores_empty_boxes() {
        let a = BBox::from_corners(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = BBox::from_corners(Vec2::new(5.0, 5.0), Vec2::new(20.0, 20.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&BBox::empty()));
    }
}
