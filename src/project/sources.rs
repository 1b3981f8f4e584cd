//! Eingabequellen eines Loads und der daraus abgeleitete Cache-Key.

use std::fmt;

/// Eine Datei, die bereits im Speicher liegt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlob {
    /// Dateiname inkl. Endung (bestimmt den Parser)
    pub filename: String,
    /// Dateiinhalt
    pub content: String,
}

impl SourceBlob {
    /// Erstellt einen Blob.
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Alle Quellen eines Loads: URLs werden geladen, Blobs direkt geparsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSources {
    /// URLs bzw. Pfade in der gewünschten Reihenfolge
    pub urls: Vec<String>,
    /// In-Memory-Dateien
    pub blobs: Vec<SourceBlob>,
}

impl LoadSources {
    /// Quellen nur aus URLs.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            blobs: Vec::new(),
        }
    }

    /// Quellen nur aus Blobs.
    pub fn from_blobs(blobs: Vec<SourceBlob>) -> Self {
        Self {
            urls: Vec::new(),
            blobs,
        }
    }

    /// Gibt `true` zurück, wenn keine Quelle angegeben ist.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.blobs.is_empty()
    }

    /// Anzahl aller Quellen.
    pub fn len(&self) -> usize {
        self.urls.len() + self.blobs.len()
    }
}

/// Dateiname aus einer URL: letztes Pfadsegment ohne Query/Fragment.
pub fn filename_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let trimmed = without_query.trim_end_matches('/');
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
        .to_string()
}

/// Nicht-kryptografischer Rolling-Hash (`h = h * 31 + b`) über höchstens `limit` Bytes.
pub fn rolling_hash(bytes: &[u8], limit: usize) -> u32 {
    bytes
        .iter()
        .take(limit)
        .fold(0u32, |h, &b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Deterministischer Schlüssel eines Source-Sets.
///
/// Identische URLs und Blob-Inhalte ergeben denselben Schlüssel, auch über
/// unabhängige Viewer-Instanzen hinweg.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Leitet den Schlüssel aus den Quellen ab.
    pub fn from_sources(sources: &LoadSources, hash_prefix_bytes: usize) -> Self {
        let mut key = sources.urls.join("|");
        for blob in &sources.blobs {
            let bytes = blob.content.as_bytes();
            key.push_str(&format!(
                "|{}:{:08x}:{}",
                blob.filename,
                rolling_hash(bytes, hash_prefix_bytes),
                bytes.len()
            ));
        }
        Self(key)
    }

    /// Schlüssel als Text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lange Blob-Listen nur gekürzt loggen
        if self.0.chars().count() > 96 {
            let short: String = self.0.chars().take(96).collect();
            write!(f, "{short}…")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_last_url_segment() {
        assert_eq!(filename_from_url("https://x.org/a/b/demo.kicad_pcb?raw=1"), "demo.kicad_pcb");
        assert_eq!(filename_from_url("file:///tmp/p/x.kicad_sch"), "x.kicad_sch");
        assert_eq!(filename_from_url("plain.kicad_pro"), "plain.kicad_pro");
    }

    #[test]
    fn hash_only_covers_prefix() {
        let a = b"abcdef";
        let b = b"abcxyz";
        assert_eq!(rolling_hash(a, 3), rolling_hash(b, 3));
        assert_ne!(rolling_hash(a, 6), rolling_hash(b, 6));
        assert_eq!(rolling_hash(b"", 10), 0);
    }

    #[test]
    fn key_contains_urls_in_order() {
        let k1 = CacheKey::from_sources(&LoadSources::from_urls(["a", "b"]), 16);
        let k2 = CacheKey::from_sources(&LoadSources::from_urls(["b", "a"]), 16);
        assert_ne!(k1, k2);
        assert_eq!(k1.as_str(), "a|b");
    }
}
