//! Gemeinsame Hilfen der Integrationstests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ecad_viewer::project::{FsFetcher, ManualClock, SourceFetcher};
use ecad_viewer::{LoadSources, ProjectServices, SourceBlob, ViewerOptions};

/// Alle Dateien des Demo-Projekts.
pub const DEMO_FILES: [&str; 5] = [
    "demo.kicad_pro",
    "demo.kicad_pcb",
    "demo.kicad_sch",
    "power.kicad_sch",
    "io.kicad_sch",
];

/// Verzeichnis der Demo-Fixtures.
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/demo")
}

/// Liest eine Fixture als Blob.
pub fn fixture_blob(name: &str) -> SourceBlob {
    let content = std::fs::read_to_string(fixture_dir().join(name))
        .unwrap_or_else(|e| panic!("Fixture {name} nicht lesbar: {e}"));
    SourceBlob::new(name, content)
}

/// Alle Demo-Dateien als Blobs.
pub fn demo_blobs() -> LoadSources {
    LoadSources::from_blobs(DEMO_FILES.iter().map(|f| fixture_blob(f)).collect())
}

/// Alle Demo-Dateien als URLs (relativ zum Fixture-Verzeichnis).
pub fn demo_urls() -> LoadSources {
    LoadSources::from_urls(DEMO_FILES)
}

/// Fetcher, der jeden Aufruf zählt.
#[derive(Debug)]
pub struct CountingFetcher {
    inner: FsFetcher,
    fetches: AtomicUsize,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self {
            inner: FsFetcher::with_base_dir(fixture_dir()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SourceFetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(url)
    }

    fn fetch_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_bytes(url)
    }
}

/// Isolierte Services mit Zähl-Fetcher und manueller Uhr.
pub struct TestServices {
    pub fetcher: Arc<CountingFetcher>,
    pub clock: Arc<ManualClock>,
    pub services: ProjectServices,
}

pub fn test_services(options: &ViewerOptions) -> TestServices {
    let fetcher = Arc::new(CountingFetcher::new());
    let clock = Arc::new(ManualClock::new());
    let services = ProjectServices::isolated(fetcher.clone(), clock.clone(), options);
    TestServices {
        fetcher,
        clock,
        services,
    }
}
