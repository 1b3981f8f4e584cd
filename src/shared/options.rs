//! Zentrale Konfiguration für den ECAD-Viewer.
//!
//! `ViewerOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Snapshot-Cache ──────────────────────────────────────────────────

/// Lebensdauer eines Cache-Eintrags seit der letzten Nutzung (Sekunden).
pub const SNAPSHOT_TTL_SECS: u64 = 10 * 60;
/// Maximale Anzahl gleichzeitig gehaltener Snapshots.
pub const SNAPSHOT_CACHE_CAPACITY: usize = 3;
/// Anzahl Bytes pro Blob, die in den Cache-Key-Hash einfließen.
pub const CACHE_KEY_HASH_PREFIX_BYTES: usize = 64 * 1024;

// ── Level of Detail ─────────────────────────────────────────────────

/// LOD-Schwelle für Track-Netznamen (mm-Äquivalent): `zoom >= schwelle / breite`.
pub const TRACK_LABEL_LOD_MM: f32 = 4.0;
/// LOD-Schwelle für Via-Netznamen (mm-Äquivalent): `zoom >= schwelle / durchmesser`.
pub const VIA_LABEL_LOD_MM: f32 = 10.0;

// ── Labels ──────────────────────────────────────────────────────────

/// Maximale Schrifthöhe für Pad-Nummern und Pad-Netznamen (mm).
pub const PAD_LABEL_MAX_SIZE_MM: f32 = 1.5;
/// Schrifthöhe eines Track-Labels relativ zur Track-Breite.
pub const TRACK_LABEL_SIZE_RATIO: f32 = 0.6;
/// Schrifthöhe eines Via-Labels relativ zum Via-Durchmesser.
pub const VIA_LABEL_SIZE_RATIO: f32 = 0.3;

// ── View-State ──────────────────────────────────────────────────────

/// Maximale Anzahl Idle-Ticks, die ein ausstehender View-State-Replay wartet.
pub const VIEW_STATE_MAX_RETRIES: u32 = 50;

// ── Kamera ──────────────────────────────────────────────────────────

/// Minimaler Zoom (Pixel pro Millimeter).
pub const CAMERA_ZOOM_MIN: f32 = 0.05;
/// Maximaler Zoom (Pixel pro Millimeter).
pub const CAMERA_ZOOM_MAX: f32 = 500.0;
/// Rand um eine Bounding Box beim Einpassen der Kamera (Anteil der Box).
pub const CAMERA_FIT_MARGIN: f32 = 0.1;
/// Pick-Radius für Klicks auf die Zeichenfläche (Pixel).
pub const PICK_RADIUS_PX: f32 = 6.0;
/// Viewport-Größe, bis der Host eine echte Größe meldet (Pixel).
pub const DEFAULT_VIEWPORT_SIZE: [f32; 2] = [1280.0, 800.0];

// ── Net-Fokus ───────────────────────────────────────────────────────

/// Alpha-Wert für abgeblendete Items im Hintergrund-Overlay.
pub const NET_FOCUS_DIM_ALPHA: f32 = 0.25;

/// Alle zur Laufzeit änderbaren Viewer-Optionen.
/// Wird als `ecad_viewer.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewerOptions {
    // ── Cache ───────────────────────────────────────────────────
    /// TTL eines Snapshots in Sekunden
    pub snapshot_ttl_secs: u64,
    /// Maximale Anzahl Snapshots im Cache
    pub snapshot_capacity: usize,
    /// Präfixlänge (Bytes) für den Blob-Hash im Cache-Key
    #[serde(default = "default_hash_prefix_bytes")]
    pub cache_key_hash_prefix_bytes: usize,

    // ── LOD ─────────────────────────────────────────────────────
    /// LOD-Schwelle für Track-Labels (mm)
    pub track_label_lod_mm: f32,
    /// LOD-Schwelle für Via-Labels (mm)
    pub via_label_lod_mm: f32,

    // ── Labels ──────────────────────────────────────────────────
    /// Maximale Pad-Label-Größe (mm)
    pub pad_label_max_size_mm: f32,
    /// Track-Label-Größe relativ zur Breite
    pub track_label_size_ratio: f32,
    /// Via-Label-Größe relativ zum Durchmesser
    #[serde(default = "default_via_label_size_ratio")]
    pub via_label_size_ratio: f32,

    // ── View-State ──────────────────────────────────────────────
    /// Retry-Limit für ausstehende View-State-Fragmente
    pub view_state_max_retries: u32,

    // ── Kamera ──────────────────────────────────────────────────
    /// Minimaler Zoom
    pub camera_zoom_min: f32,
    /// Maximaler Zoom
    pub camera_zoom_max: f32,
    /// Rand beim Einpassen auf eine Bounding Box
    #[serde(default = "default_camera_fit_margin")]
    pub camera_fit_margin: f32,
    /// Pick-Radius in Pixeln
    #[serde(default = "default_pick_radius_px")]
    pub pick_radius_px: f32,

    // ── Net-Fokus ───────────────────────────────────────────────
    /// Alpha für abgeblendete Items
    pub net_focus_dim_alpha: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            snapshot_ttl_secs: SNAPSHOT_TTL_SECS,
            snapshot_capacity: SNAPSHOT_CACHE_CAPACITY,
            cache_key_hash_prefix_bytes: CACHE_KEY_HASH_PREFIX_BYTES,

            track_label_lod_mm: TRACK_LABEL_LOD_MM,
            via_label_lod_mm: VIA_LABEL_LOD_MM,

            pad_label_max_size_mm: PAD_LABEL_MAX_SIZE_MM,
            track_label_size_ratio: TRACK_LABEL_SIZE_RATIO,
            via_label_size_ratio: VIA_LABEL_SIZE_RATIO,

            view_state_max_retries: VIEW_STATE_MAX_RETRIES,

            camera_zoom_min: CAMERA_ZOOM_MIN,
            camera_zoom_max: CAMERA_ZOOM_MAX,
            camera_fit_margin: CAMERA_FIT_MARGIN,
            pick_radius_px: PICK_RADIUS_PX,

            net_focus_dim_alpha: NET_FOCUS_DIM_ALPHA,
        }
    }
}

/// Serde-Default für `cache_key_hash_prefix_bytes` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_hash_prefix_bytes() -> usize {
    CACHE_KEY_HASH_PREFIX_BYTES
}

/// Serde-Default für `via_label_size_ratio` (Abwärtskompatibilität).
fn default_via_label_size_ratio() -> f32 {
    VIA_LABEL_SIZE_RATIO
}

/// Serde-Default für `camera_fit_margin` (Abwärtskompatibilität).
fn default_camera_fit_margin() -> f32 {
    CAMERA_FIT_MARGIN
}

/// Serde-Default für `pick_radius_px` (Abwärtskompatibilität).
fn default_pick_radius_px() -> f32 {
    PICK_RADIUS_PX
}

impl ViewerOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("ecad-viewer"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("ecad_viewer.toml")
    }

    /// TTL eines Snapshots als `Duration`.
    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.snapshot_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let opts = ViewerOptions::default();
        assert_eq!(opts.snapshot_ttl(), Duration::from_secs(600));
        assert_eq!(opts.snapshot_capacity, 3);
        assert_eq!(opts.view_state_max_retries, 50);
        assert_eq!(opts.track_label_lod_mm, 4.0);
        assert_eq!(opts.via_label_lod_mm, 10.0);
    }

    #[test]
    fn toml_without_optional_fields_uses_serde_defaults() {
        let mut table = toml::to_string(&ViewerOptions::default()).expect("Serialisierung");
        table = table
            .lines()
            .filter(|l| {
                !l.starts_with("cache_key_hash_prefix_bytes")
                    && !l.starts_with("via_label_size_ratio")
                    && !l.starts_with("camera_fit_margin")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let parsed: ViewerOptions = toml::from_str(&table).expect("alte TOML-Datei lesbar");
        assert_eq!(parsed, ViewerOptions::default());
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("ecad_viewer_missing_options_4711.toml");
        let _ = std::fs::remove_file(&path);
        assert_eq!(ViewerOptions::load_from_file(&path), ViewerOptions::default());
    }
}
