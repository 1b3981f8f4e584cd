//! Retained Paint-Output: Zeichenbefehle, die ein Layer zwischen Frames hält.

use glam::Vec2;

/// RGBA-Farbe (0..1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    /// Weiß
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    /// Kupfer vorne
    pub const COPPER_FRONT: Self = Self([0.78, 0.20, 0.20, 1.0]);
    /// Kupfer hinten
    pub const COPPER_BACK: Self = Self([0.30, 0.50, 0.90, 1.0]);
    /// Innenlagen
    pub const COPPER_INNER: Self = Self([0.80, 0.75, 0.25, 1.0]);
    /// Vias und Pads (global)
    pub const VIA: Self = Self([0.85, 0.85, 0.85, 1.0]);
    /// Bohrungen
    pub const HOLE: Self = Self([0.05, 0.05, 0.05, 1.0]);
    /// Beschriftung auf Kupfer
    pub const LABEL: Self = Self([1.0, 1.0, 1.0, 0.9]);
    /// Hervorhebung (Net-Fokus, Auswahl)
    pub const HIGHLIGHT: Self = Self([1.0, 1.0, 0.4, 1.0]);
    /// Technische Lagen
    pub const USER: Self = Self([0.75, 0.75, 0.65, 1.0]);

    /// Gleiche Farbe mit anderem Alpha.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, alpha.clamp(0.0, 1.0)])
    }

    /// Alpha-Kanal.
    pub fn alpha(&self) -> f32 {
        self.0[3]
    }
}

/// Ein einzelner Zeichenbefehl in Weltkoordinaten (mm).
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// Linienzug mit Strichbreite
    Polyline {
        /// Stützpunkte
        points: Vec<Vec2>,
        /// Breite
        width: f32,
        /// Farbe
        color: Color,
    },
    /// Gefülltes Polygon
    Polygon {
        /// Eckpunkte
        points: Vec<Vec2>,
        /// Farbe
        color: Color,
    },
    /// Kreis
    Circle {
        /// Mittelpunkt
        center: Vec2,
        /// Radius
        radius: f32,
        /// Farbe
        color: Color,
        /// Gefüllt oder nur Umriss
        filled: bool,
    },
    /// Strichschrift-Text, zentriert
    Text {
        /// Inhalt
        text: String,
        /// Mittelpunkt
        position: Vec2,
        /// Schrifthöhe
        size: f32,
        /// Winkel (Grad)
        angle: f32,
        /// Farbe
        color: Color,
    },
}

impl PaintOp {
    /// Liefert eine Kopie mit überschriebener Farbe.
    pub fn recolored(&self, color: Color) -> Self {
        let mut op = self.clone();
        match &mut op {
            Self::Polyline { color: c, .. }
            | Self::Polygon { color: c, .. }
            | Self::Circle { color: c, .. }
            | Self::Text { color: c, .. } => *c = color,
        }
        op
    }
}

/// Retained Paint-Liste eines Layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintList {
    ops: Vec<PaintOp>,
}

impl PaintList {
    /// Leere Liste.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hängt einen Befehl an.
    pub fn push(&mut self, op: PaintOp) {
        self.ops.push(op);
    }

    /// Hängt mehrere Befehle an.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = PaintOp>) {
        self.ops.extend(ops);
    }

    /// Leert die Liste.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Anzahl Befehle.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Gibt `true` zurück, wenn nichts gezeichnet wurde.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Alle Befehle.
    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    /// Alle Text-Befehle (für Tests und Label-Auswertungen).
    pub fn texts(&self) -> impl Iterator<Item = (&str, Vec2, f32, f32)> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Text {
                text,
                position,
                size,
                angle,
                ..
            } => Some((text.as_str(), *position, *size, *angle)),
            _ => None,
        })
    }

    /// Text-Befehl anhängen.
    pub fn text(&mut self, text: impl Into<String>, position: Vec2, size: f32, angle: f32, color: Color) {
        self.push(PaintOp::Text {
            text: text.into(),
            position,
            size,
            angle,
            color,
        });
    }
}
