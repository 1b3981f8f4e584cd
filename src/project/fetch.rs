//! Laden von Quell-URLs.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Lädt den Inhalt einer URL. Implementierungen müssen thread-safe sein,
/// weil jede Quelle auf einem eigenen Worker-Thread geladen wird.
pub trait SourceFetcher: Send + Sync {
    /// Lädt eine Textdatei.
    fn fetch(&self, url: &str) -> Result<String>;

    /// Lädt eine Binärdatei (z.B. ZIP-Archive).
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Lädt lokale Pfade und `file://`-URLs.
#[derive(Debug, Default, Clone)]
pub struct FsFetcher {
    base_dir: Option<PathBuf>,
}

impl FsFetcher {
    /// Fetcher, der relative Pfade gegen das Arbeitsverzeichnis auflöst.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher, der relative Pfade gegen `base_dir` auflöst.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf> {
        let path = match url.split_once("://") {
            Some(("file", rest)) => PathBuf::from(rest),
            Some((scheme, _)) => anyhow::bail!("URL-Schema '{scheme}' wird nicht unterstützt: {url}"),
            None => PathBuf::from(url),
        };
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        })
    }
}

impl SourceFetcher for FsFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let path = self.resolve(url)?;
        std::fs::read_to_string(&path)
            .with_context(|| format!("Datei konnte nicht gelesen werden: {}", path.display()))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.resolve(url)?;
        std::fs::read(&path)
            .with_context(|| format!("Datei konnte nicht gelesen werden: {}", path.display()))
    }
}
