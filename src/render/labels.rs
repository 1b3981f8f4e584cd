//! Textlayout für Pad-Nummern und Netznamen.

use glam::Vec2;

use crate::core::Pad;
use crate::render::glyphs::glyph_count;

/// Präfix, mit dem KiCad nicht verbundene Pad-Netze benennt.
const UNCONNECTED_PREFIX: &str = "unconnected-";
/// Platzhalter für nicht verbundene Netze.
const UNCONNECTED_PLACEHOLDER: &str = "x";

/// Anzeigeform eines Netznamens: nur der Teil nach dem letzten `/`.
pub fn display_net_name(name: &str) -> &str {
    if name.starts_with(UNCONNECTED_PREFIX) {
        return UNCONNECTED_PLACEHOLDER;
    }
    match name.rfind('/') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Ein platziertes Label.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    /// Text
    pub text: String,
    /// Mittelpunkt (Welt)
    pub position: Vec2,
    /// Schrifthöhe (mm)
    pub size: f32,
    /// Winkel (Grad)
    pub angle: f32,
}

/// Ergebnis des Pad-Label-Layouts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PadLabels {
    /// Pad-Nummer
    pub number: Option<PlacedLabel>,
    /// Netzname
    pub net_name: Option<PlacedLabel>,
}

/// Berechnet Größe und Lage von Pad-Nummer und Netzname.
///
/// Die kürzere Pad-Seite bestimmt die Grundgröße. Ist das Pad höher als
/// breit, laufen die Labels senkrecht. Werden beide Labels gezeigt,
/// schrumpfen sie und rücken quer zur Leserichtung auseinander.
pub fn layout_pad_labels(pad: &Pad, max_size: f32) -> PadLabels {
    let number = pad.number.trim();
    let net = pad
        .net
        .as_ref()
        .filter(|n| !n.name.is_empty())
        .map(|n| display_net_name(&n.name));

    let show_number = !number.is_empty();
    let show_net = net.is_some();
    if !show_number && !show_net {
        return PadLabels::default();
    }

    let world = pad.world_size();
    let vertical = world.x < world.y;
    let (along, across) = if vertical {
        (world.y, world.x)
    } else {
        (world.x, world.y)
    };
    let angle = if vertical { 90.0 } else { 0.0 };
    let normal = if vertical { Vec2::X } else { -Vec2::Y };

    let mut size = across;
    let mut offset = 0.0;
    if show_number && show_net {
        size /= 2.5;
        offset = size / 1.7;
    }

    let net_name = net.map(|text| {
        let chars = glyph_count(text).max(5) as f32;
        PlacedLabel {
            text: text.to_string(),
            position: pad.position + normal * offset,
            size: (1.5 * along / chars).min(size).min(max_size),
            angle,
        }
    });
    let number = show_number.then(|| {
        let chars = glyph_count(number).max(3) as f32;
        PlacedLabel {
            text: number.to_string(),
            position: pad.position - normal * offset,
            size: (1.5 * along / chars).min(size).min(max_size),
            angle,
        }
    });

    PadLabels { number, net_name }
}
