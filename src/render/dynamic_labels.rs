//! Viewport-abhängige Netznamen auf Tracks und Vias.
//!
//! Läuft bei jedem Draw. Fehler einzelner Items werden verschluckt, damit
//! ein defektes Item nicht den Rest des Boards unbeschriftet lässt.

use std::panic::{catch_unwind, AssertUnwindSafe};

use glam::Vec2;

use super::culling::segment_intersects_bbox;
use super::glyphs::glyph_count;
use super::labels::{display_net_name, PlacedLabel};
use super::layers::{LayerId, LayerSet};
use super::paint::PaintOp;
use crate::core::geometry::normalize_label_angle;
use crate::core::{BBox, BoardDocument, TrackSegment, Via};
use crate::shared::{RenderScene, ViewerOptions};

/// Labels pro Viewport-Ausdehnung entlang eines langen Tracks.
const LABELS_PER_VIEWPORT: f32 = 2.0;
/// Obergrenze für Wiederholungen eines Labels auf einem Segment.
const MAX_REPEATS: usize = 4096;
/// Achsen-Toleranz für waagrechte/senkrechte Segmente (mm).
const AXIS_EPSILON: f32 = 1e-4;

/// Fehler bei der Berechnung eines einzelnen Labels. Wird nie nach außen gereicht.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LabelError {
    /// Geometrie mit NaN, Unendlich oder nicht-positiver Breite
    #[error("ungültige Geometrie in Item {uuid}")]
    InvalidGeometry {
        /// UUID des Items
        uuid: String,
    },
    /// Panic während der Berechnung
    #[error("Label-Berechnung für Item {uuid} abgebrochen: {message}")]
    Panicked {
        /// UUID des Items
        uuid: String,
        /// Panic-Nachricht
        message: String,
    },
}

/// Parameter des dynamischen Passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSettings {
    /// LOD-Schwelle Tracks (mm)
    pub track_lod_mm: f32,
    /// LOD-Schwelle Vias (mm)
    pub via_lod_mm: f32,
    /// Track-Label-Größe relativ zur Breite
    pub track_size_ratio: f32,
    /// Via-Label-Größe relativ zum Durchmesser
    pub via_size_ratio: f32,
}

impl LabelSettings {
    /// Übernimmt die Werte aus den Viewer-Optionen.
    pub fn from_options(options: &ViewerOptions) -> Self {
        Self {
            track_lod_mm: options.track_label_lod_mm,
            via_lod_mm: options.via_label_lod_mm,
            track_size_ratio: options.track_label_size_ratio,
            via_size_ratio: options.via_label_size_ratio,
        }
    }
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self::from_options(&ViewerOptions::default())
    }
}

/// Zähler eines dynamischen Passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DynamicLabelStats {
    /// Erzeugte Track-Labels
    pub track_labels: usize,
    /// Erzeugte Via-Labels
    pub via_labels: usize,
    /// Verschluckte Fehler
    pub failures: usize,
}

/// Anzahl Labels auf einem Segment abhängig von Länge und Viewport.
///
/// Waagrechte Segmente werden an der Viewport-Breite gemessen, senkrechte an
/// der Höhe, diagonale an der ungünstigeren der beiden Achsen.
pub fn repeat_count(start: Vec2, end: Vec2, viewport: &BBox) -> usize {
    let d = (end - start).abs();
    let width = viewport.width().max(f32::EPSILON);
    let height = viewport.height().max(f32::EPSILON);

    let ratio = if d.y <= AXIS_EPSILON {
        d.x / width
    } else if d.x <= AXIS_EPSILON {
        d.y / height
    } else {
        (d.x / width).max(d.y / height)
    };
    ((ratio * LABELS_PER_VIEWPORT) as usize).clamp(1, MAX_REPEATS)
}

/// Labels eines Track-Segments für den aktuellen Viewport.
pub fn track_segment_labels(
    seg: &TrackSegment,
    net_name: &str,
    zoom: f32,
    viewport: &BBox,
    settings: &LabelSettings,
) -> Result<Vec<PlacedLabel>, LabelError> {
    let finite = seg.start.is_finite() && seg.end.is_finite() && seg.width.is_finite();
    if !finite || seg.width <= 0.0 {
        return Err(LabelError::InvalidGeometry {
            uuid: seg.uuid.clone(),
        });
    }
    if zoom < settings.track_lod_mm / seg.width {
        return Ok(Vec::new());
    }

    let text = display_net_name(net_name);
    let chars = glyph_count(text);
    if chars == 0 || seg.length() < seg.width * chars as f32 {
        return Ok(Vec::new());
    }
    if !segment_intersects_bbox(seg.start, seg.end, viewport) {
        return Ok(Vec::new());
    }

    let n = repeat_count(seg.start, seg.end, viewport);
    let dir = seg.end - seg.start;
    let angle = normalize_label_angle(dir.y.atan2(dir.x).to_degrees());
    let size = seg.width * settings.track_size_ratio;
    let divisor = (n + 1) as f32;

    Ok((0..n)
        .map(|i| seg.start * (n - i) as f32 / divisor + seg.end * (i + 1) as f32 / divisor)
        .filter(|p| viewport.contains_point(*p))
        .map(|position| PlacedLabel {
            text: text.to_string(),
            position,
            size,
            angle,
        })
        .collect())
}

/// Label eines Vias, falls es den Sichtbarkeitsregeln genügt.
pub fn via_label(
    via: &Via,
    net_name: &str,
    zoom: f32,
    viewport: &BBox,
    settings: &LabelSettings,
) -> Result<Option<PlacedLabel>, LabelError> {
    if !via.position.is_finite() || !via.diameter.is_finite() || via.diameter <= 0.0 {
        return Err(LabelError::InvalidGeometry {
            uuid: via.uuid.clone(),
        });
    }
    if zoom < settings.via_lod_mm / via.diameter || !viewport.contains_point(via.position) {
        return Ok(None);
    }
    let text = display_net_name(net_name);
    let chars = glyph_count(text);
    if chars == 0 {
        return Ok(None);
    }
    let size = (via.diameter * settings.via_size_ratio).min(via.diameter * 1.2 / chars as f32);
    Ok(Some(PlacedLabel {
        text: text.to_string(),
        position: via.position,
        size,
        angle: 0.0,
    }))
}

fn guarded<T>(uuid: &str, f: impl FnOnce() -> Result<T, LabelError>) -> Result<T, LabelError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            Err(LabelError::Panicked {
                uuid: uuid.to_string(),
                message,
            })
        }
    }
}

fn push_labels(layers: &mut LayerSet, id: &LayerId, labels: Vec<PlacedLabel>) {
    if let Some(layer) = layers.get_mut(id) {
        let color = layer.color;
        for label in labels {
            layer.paint.push(PaintOp::Text {
                text: label.text,
                position: label.position,
                size: label.size,
                angle: label.angle,
                color,
            });
        }
    }
}

/// Erzeugt Track- und Via-Netznamen für den aktuellen Frame neu.
pub fn update_dynamic_labels(
    board: &BoardDocument,
    layers: &mut LayerSet,
    scene: &RenderScene,
    settings: &LabelSettings,
) -> DynamicLabelStats {
    let mut stats = DynamicLabelStats::default();
    let viewport = scene.viewport_bbox();
    let zoom = scene.camera.zoom;
    let primary = layers
        .primary_high_contrast_copper_layer_name()
        .map(str::to_string);

    // ── Tracks ──────────────────────────────────────────────────
    let copper = layers.copper_layer_names().to_vec();
    for copper_layer in &copper {
        let id = LayerId::TrackNetName(copper_layer.clone());
        if let Some(layer) = layers.get_mut(&id) {
            layer.clear();
        }
        if !layers.is_effectively_visible(&id) || !scene.has_area() {
            continue;
        }
        if primary.as_ref().is_some_and(|p| p != copper_layer) {
            continue;
        }

        let mut labels = Vec::new();
        for seg in board
            .segments
            .iter()
            .filter(|s| s.net > 0 && &s.layer == copper_layer)
        {
            let Some(net_name) = board.net_name(seg.net) else {
                continue;
            };
            match guarded(&seg.uuid, || {
                track_segment_labels(seg, net_name, zoom, &viewport, settings)
            }) {
                Ok(mut placed) => labels.append(&mut placed),
                Err(e) => {
                    log::debug!("Track-Label übersprungen: {e}");
                    stats.failures += 1;
                }
            }
        }
        stats.track_labels += labels.len();
        push_labels(layers, &id, labels);
    }

    // ── Vias ────────────────────────────────────────────────────
    let id = LayerId::ViaNetNames;
    if let Some(layer) = layers.get_mut(&id) {
        layer.clear();
    }
    if layers.is_effectively_visible(&id) && scene.has_area() {
        let mut labels = Vec::new();
        for via in board.vias.iter().filter(|v| v.net > 0) {
            let span = board.via_span(via);
            let spans_visible = span
                .iter()
                .any(|l| layers.is_effectively_visible(&LayerId::physical(*l)));
            if !spans_visible {
                continue;
            }
            if let Some(p) = &primary {
                if !span.iter().any(|l| l == p) {
                    continue;
                }
            }
            let Some(net_name) = board.net_name(via.net) else {
                continue;
            };
            match guarded(&via.uuid, || via_label(via, net_name, zoom, &viewport, settings)) {
                Ok(Some(label)) => labels.push(label),
                Ok(None) => {}
                Err(e) => {
                    log::debug!("Via-Label übersprungen: {e}");
                    stats.failures += 1;
                }
            }
        }
        stats.via_labels = labels.len();
        push_labels(layers, &id, labels);
    }

    if stats.failures > 0 {
        log::warn!(
            "Dynamischer Label-Pass: {} Items übersprungen",
            stats.failures
        );
    }
    stats
}
