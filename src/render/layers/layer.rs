//! Ein einzelner virtueller Layer.

use super::id::LayerId;
use crate::render::paint::{Color, PaintList};

/// Sichtbarkeitseinheit mit Deckkraft und retained Paint-Output.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Identität
    pub id: LayerId,
    /// Sichtbar-Flag
    pub visible: bool,
    /// Deckkraft 0..1
    pub opacity: f32,
    /// Physischer Layer, dessen Sichtbarkeit zusätzlich gilt
    pub depends_on: Option<LayerId>,
    /// Hervorgehoben (nur Kupferlagen, High-Contrast-Näherung)
    pub highlighted: bool,
    /// Grundfarbe
    pub color: Color,
    /// Retained Paint-Output
    pub paint: PaintList,
}

impl Layer {
    /// Erstellt einen sichtbaren, voll deckenden Layer.
    pub fn new(id: LayerId, color: Color) -> Self {
        Self {
            id,
            visible: true,
            opacity: 1.0,
            depends_on: None,
            highlighted: false,
            color,
            paint: PaintList::new(),
        }
    }

    /// Setzt die Abhängigkeit von einem physischen Layer.
    pub fn depending_on(mut self, parent: LayerId) -> Self {
        self.depends_on = Some(parent);
        self
    }

    /// Startet unsichtbar.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Layer-Name für UI und View-State.
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    /// Gibt `true` zurück, wenn der Layer selbst etwas ausgeben darf.
    ///
    /// Unsichtbar und Deckkraft 0 unterdrücken unabhängig voneinander.
    pub fn is_renderable(&self) -> bool {
        self.visible && self.opacity > 0.0
    }

    /// Setzt die Deckkraft (auf 0..1 begrenzt).
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Verwirft den Paint-Output.
    pub fn clear(&mut self) {
        self.paint.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invisible_and_transparent_are_checked_independently() {
        let mut layer = Layer::new(LayerId::physical("F.Cu"), Color::COPPER_FRONT);
        assert!(layer.is_renderable());

        layer.set_opacity(0.0);
        assert!(layer.visible);
        assert!(!layer.is_renderable());

        layer.set_opacity(0.7);
        layer.visible = false;
        assert!(!layer.is_renderable());
    }

    #[test]
    fn opacity_is_clamped() {
        let mut layer = Layer::new(LayerId::Grid, Color::USER);
        layer.set_opacity(3.0);
        assert_eq!(layer.opacity, 1.0);
        layer.set_opacity(f32::NAN);
        assert_eq!(layer.opacity, 1.0);
    }
}
