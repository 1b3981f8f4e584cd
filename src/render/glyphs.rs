//! Glyph-Tabellen für die Strichschrift.
//!
//! Die Basistabelle (Latein, Griechisch, Kyrillisch) ist immer vorhanden. CJK-Glyphen
//! stehen erst nach `ensure_extended_glyphs` zur Verfügung; bis dahin zählen sie
//! als nicht zeichenbar.

use glam::Vec2;
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use crate::core::TextRenderCache;
use crate::core::BBox;

/// Breite einer Standard-Glyphe relativ zur Schrifthöhe.
const GLYPH_ASPECT: f32 = 0.8;
/// CJK-Glyphen sind quadratisch.
const WIDE_GLYPH_ASPECT: f32 = 1.0;

/// Zusätzliche Unicode-Bereiche, die nachgeladen werden.
#[derive(Debug)]
pub struct ExtendedGlyphTable {
    ranges: Vec<RangeInclusive<char>>,
}

impl ExtendedGlyphTable {
    fn build() -> Self {
        Self {
            ranges: vec![
                '\u{2E80}'..='\u{2FDF}', // CJK-Radikale
                '\u{3000}'..='\u{30FF}', // Satzzeichen, Hiragana, Katakana
                '\u{3400}'..='\u{4DBF}', // Erweiterung A
                '\u{4E00}'..='\u{9FFF}', // Vereinheitlichte Ideogramme
                '\u{AC00}'..='\u{D7AF}', // Hangul
                '\u{F900}'..='\u{FAFF}', // Kompatibilitäts-Ideogramme
                '\u{FF00}'..='\u{FFEF}', // Halbe/volle Breite
            ],
        }
    }

    /// Gibt `true` zurück, wenn die Tabelle eine Glyphe für `c` enthält.
    pub fn contains(&self, c: char) -> bool {
        self.ranges.iter().any(|r| r.contains(&c))
    }
}

static EXTENDED: OnceLock<ExtendedGlyphTable> = OnceLock::new();

fn cjk_regex() -> Option<&'static Regex> {
    static CJK: OnceLock<Option<Regex>> = OnceLock::new();
    CJK.get_or_init(|| {
        Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}\x{3000}-\x{303F}\x{FF00}-\x{FFEF}]")
            .map_err(|e| log::warn!("CJK-Regex ungültig: {}", e))
            .ok()
    })
    .as_ref()
}

/// Gibt `true` zurück, wenn der Text Zeichen aus CJK-Bereichen enthält.
pub fn contains_cjk(text: &str) -> bool {
    cjk_regex().is_some_and(|re| re.is_match(text))
}

/// Lädt die erweiterte Glyph-Tabelle (einmalig pro Prozess).
pub fn ensure_extended_glyphs() -> &'static ExtendedGlyphTable {
    EXTENDED.get_or_init(|| {
        log::info!("Erweiterte Glyph-Tabelle (CJK) geladen");
        ExtendedGlyphTable::build()
    })
}

/// Gibt `true` zurück, wenn die erweiterte Tabelle bereits geladen ist.
pub fn extended_glyphs_loaded() -> bool {
    EXTENDED.get().is_some()
}

fn is_base_glyph(c: char) -> bool {
    // Latein bis Latin Extended-B, Griechisch, Kyrillisch, allgemeine Zeichen
    c.is_whitespace()
        || (c as u32) < 0x0250
        || ('\u{0370}'..='\u{04FF}').contains(&c)
        || ('\u{2000}'..='\u{22FF}').contains(&c)
}

/// Gibt `true` zurück, wenn die Glyphe aktuell gestrichen werden kann.
pub fn is_strokable(c: char) -> bool {
    is_base_glyph(c) || EXTENDED.get().is_some_and(|t| t.contains(c))
}

/// Anzahl sichtbarer Glyphen (Grapheme werden nicht zusammengefasst).
pub fn glyph_count(text: &str) -> usize {
    text.chars().filter(|c| !c.is_control()).count()
}

/// Geschätzte Textausdehnung (Breite, Höhe) bei Schrifthöhe `size`.
pub fn measure_text(text: &str, size: f32) -> Vec2 {
    let width: f32 = text
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            if is_base_glyph(c) {
                GLYPH_ASPECT
            } else {
                WIDE_GLYPH_ASPECT
            }
        })
        .sum();
    Vec2::new(width * size, size)
}

/// Berechnet den Render-Cache eines Texts an `position` (zentriert).
pub fn text_render_cache(text: &str, position: Vec2, size: f32) -> TextRenderCache {
    let extent = measure_text(text, size);
    TextRenderCache {
        glyph_count: glyph_count(text),
        unstrokable: text.chars().filter(|c| !c.is_control() && !is_strokable(*c)).count(),
        bbox: BBox::from_corners(position - extent * 0.5, position + extent * 0.5),
    }
}
