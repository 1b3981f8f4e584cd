//! Document Store: lädt Quellen, parsed sie und hält die abgeleiteten Indizes.
//!
//! Ein Load läuft in zwei Schritten: `prepare` (Cache-Key, Cache-Lookup oder
//! Fetch + Parse auf Worker-Threads) und `commit` (Registrierung, Hierarchie,
//! Stückliste, Indizes, Snapshot). `commit` verwirft Ergebnisse, deren
//! Generation nicht mehr aktuell ist, d.h. wenn das Projekt inzwischen per
//! `dispose` verworfen wurde.

use indexmap::IndexMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use super::cache::{Snapshot, SnapshotCache};
use super::clock::{Clock, SystemClock};
use super::events::{EventQueue, LoadPhase, LoadStatus, ProjectEvent};
use super::fetch::{FsFetcher, SourceFetcher};
use super::hierarchy::{determine_schematic_hierarchy, PageHierarchy, ProjectPage};
use super::indices::{DesignatorRef, NetRef, ProjectIndices};
use super::sources::{filename_from_url, CacheKey, LoadSources, SourceBlob};
use crate::core::{
    bom_from_boards, bom_from_schematics, file_stem, BoardDocument, BomItem, ProjectSettings,
    SchematicDocument,
};
use crate::parser::{parse_board, parse_project_settings, parse_schematic, FileKind};
use crate::render::glyphs::{contains_cjk, ensure_extended_glyphs};
use crate::shared::ViewerOptions;

/// Ein registriertes, geparstes Dokument.
#[derive(Debug, Clone)]
pub enum ProjectFile {
    /// Platine
    Board(Arc<BoardDocument>),
    /// Schaltplan
    Schematic(Arc<SchematicDocument>),
    /// Projekt-Einstellungen
    Settings(Arc<ProjectSettings>),
}

impl ProjectFile {
    /// Gibt `true` zurück, wenn beide auf dasselbe geteilte Dokument zeigen.
    pub fn ptr_eq(&self, other: &ProjectFile) -> bool {
        match (self, other) {
            (Self::Board(a), Self::Board(b)) => Arc::ptr_eq(a, b),
            (Self::Schematic(a), Self::Schematic(b)) => Arc::ptr_eq(a, b),
            (Self::Settings(a), Self::Settings(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Alle Maps, Listen und Indizes eines Projekts; Inhalt eines Snapshots.
///
/// `clone()` kopiert die Container, die Dokumente selbst bleiben geteilt (`Arc`).
#[derive(Debug, Clone, Default)]
pub struct ProjectData {
    /// Dateiname → Dokument
    pub files_by_name: IndexMap<String, ProjectFile>,
    /// Dateiname → Rohtext
    pub file_content: IndexMap<String, Arc<str>>,
    /// Boards in Ladereihenfolge
    pub boards: Vec<Arc<BoardDocument>>,
    /// Schaltpläne in Ladereihenfolge
    pub schematics: Vec<Arc<SchematicDocument>>,
    /// Stückliste
    pub bom_items: Vec<BomItem>,
    /// Netz- und Designator-Indizes
    pub indices: ProjectIndices,
    /// Projekt-Einstellungen
    pub settings: Option<Arc<ProjectSettings>>,
    /// Seitenhierarchie
    pub hierarchy: PageHierarchy,
    /// Anzeigename des Projekts
    pub display_name: Option<String>,
}

/// Prozessweit oder pro Test geteilter Snapshot-Cache.
pub type SharedSnapshotCache = Arc<Mutex<SnapshotCache<ProjectData>>>;

/// Erstellt einen frischen, isolierten Cache.
pub fn new_snapshot_cache(options: &ViewerOptions) -> SharedSnapshotCache {
    Arc::new(Mutex::new(SnapshotCache::new(
        options.snapshot_ttl(),
        options.snapshot_capacity,
    )))
}

/// Prozessweiter Cache; die Optionen des ersten Aufrufs legen TTL und Kapazität fest.
pub fn process_wide_cache(options: &ViewerOptions) -> SharedSnapshotCache {
    static CACHE: OnceLock<SharedSnapshotCache> = OnceLock::new();
    Arc::clone(CACHE.get_or_init(|| new_snapshot_cache(options)))
}

fn lock_cache(cache: &SharedSnapshotCache) -> MutexGuard<'_, SnapshotCache<ProjectData>> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Externe Kollaborateure eines Projekts.
#[derive(Clone)]
pub struct ProjectServices {
    /// Lädt URLs
    pub fetcher: Arc<dyn SourceFetcher>,
    /// Snapshot-Cache
    pub cache: SharedSnapshotCache,
    /// Zeitquelle für TTL
    pub clock: Arc<dyn Clock>,
    /// Präfixlänge für den Blob-Hash
    pub hash_prefix_bytes: usize,
}

impl ProjectServices {
    /// Dateisystem-Fetcher, prozessweiter Cache, Systemzeit.
    pub fn from_options(options: &ViewerOptions) -> Self {
        Self {
            fetcher: Arc::new(FsFetcher::new()),
            cache: process_wide_cache(options),
            clock: Arc::new(SystemClock),
            hash_prefix_bytes: options.cache_key_hash_prefix_bytes,
        }
    }

    /// Eigener Cache und injizierte Kollaborateure (Tests, isolierte Instanzen).
    pub fn isolated(
        fetcher: Arc<dyn SourceFetcher>,
        clock: Arc<dyn Clock>,
        options: &ViewerOptions,
    ) -> Self {
        Self {
            fetcher,
            cache: new_snapshot_cache(options),
            clock,
            hash_prefix_bytes: options.cache_key_hash_prefix_bytes,
        }
    }
}

impl std::fmt::Debug for ProjectServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectServices")
            .field("hash_prefix_bytes", &self.hash_prefix_bytes)
            .finish_non_exhaustive()
    }
}

/// Ergebnis eines Loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Dateien wurden geladen und geparsed
    Parsed {
        /// Anzahl neu registrierter Dateien
        files: usize,
    },
    /// Aus dem Snapshot-Cache wiederhergestellt
    FromCache,
    /// Keine Datei konnte geladen werden
    Empty,
    /// Projekt wurde während des Loads verworfen
    Discarded,
}

#[derive(Debug)]
struct ParsedFile {
    filename: String,
    content: Arc<str>,
    file: ProjectFile,
}

#[derive(Debug)]
enum Prepared {
    Cached(Arc<ProjectData>),
    Parsed(Vec<ParsedFile>),
}

/// Vorbereiteter Load; wird per `Project::commit` übernommen.
#[derive(Debug)]
pub struct PreparedLoad {
    generation: u64,
    key: CacheKey,
    payload: Prepared,
}

impl PreparedLoad {
    /// Cache-Key der Quellen.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Gibt `true` zurück, wenn der Load aus dem Cache bedient wird.
    pub fn is_cache_hit(&self) -> bool {
        matches!(self.payload, Prepared::Cached(_))
    }
}

enum Job<'a> {
    Url(&'a str),
    Blob(&'a str),
}

/// Ein Projekt (Document Store) pro Viewer-Instanz.
pub struct Project {
    services: ProjectServices,
    data: ProjectData,
    loaded: bool,
    generation: u64,
    events: EventQueue,
}

impl Project {
    /// Erstellt ein leeres Projekt.
    pub fn new(services: ProjectServices) -> Self {
        Self {
            services,
            data: ProjectData::default(),
            loaded: false,
            generation: 0,
            events: EventQueue::default(),
        }
    }

    /// Lädt die Quellen (Cache-Lookup, sonst Fetch + Parse) und übernimmt das Ergebnis.
    pub fn load(&mut self, sources: &LoadSources) -> LoadOutcome {
        let prepared = self.prepare(sources);
        self.commit(prepared)
    }

    /// Berechnet den Cache-Key und lädt bei Cache-Miss alle Quellen parallel.
    pub fn prepare(&self, sources: &LoadSources) -> PreparedLoad {
        let key = CacheKey::from_sources(sources, self.services.hash_prefix_bytes);
        let now = self.services.clock.now();

        if let Some(data) = lock_cache(&self.services.cache).get(&key, now) {
            log::info!("Snapshot-Cache: Treffer für {}", key);
            return PreparedLoad {
                generation: self.generation,
                key,
                payload: Prepared::Cached(data),
            };
        }
        log::info!(
            "Snapshot-Cache: kein Treffer, lade {} Quellen ({} URLs, {} Blobs)",
            sources.len(),
            sources.urls.len(),
            sources.blobs.len()
        );

        let mut seen: Vec<String> = Vec::new();
        let mut jobs: Vec<(String, Job<'_>)> = Vec::new();
        let candidates = sources
            .urls
            .iter()
            .map(|u| (filename_from_url(u), Job::Url(u.as_str())))
            .chain(
                sources
                    .blobs
                    .iter()
                    .map(|b| (b.filename.clone(), Job::Blob(b.content.as_str()))),
            );
        for (filename, job) in candidates {
            if seen.contains(&filename) {
                log::debug!("{} mehrfach angegeben, wird nur einmal geparsed", filename);
                continue;
            }
            seen.push(filename.clone());
            jobs.push((filename, job));
        }

        let total = jobs.len();
        self.events.status(LoadStatus::progress(
            LoadPhase::Download,
            format!("Lade {total} Dateien"),
            0,
            total,
        ));

        let done = AtomicUsize::new(0);
        let fetcher = self.services.fetcher.as_ref();
        let events = &self.events;
        let parsed = std::thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|(filename, job)| {
                    let done = &done;
                    scope.spawn(move || load_one(fetcher, events, filename, job, done, total))
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|h| match h.join() {
                    Ok(result) => result,
                    Err(_) => {
                        log::warn!("Worker-Thread beim Laden abgestürzt");
                        None
                    }
                })
                .collect::<Vec<_>>()
        });

        PreparedLoad {
            generation: self.generation,
            key,
            payload: Prepared::Parsed(parsed),
        }
    }

    /// Übernimmt einen vorbereiteten Load, sofern das Projekt nicht inzwischen verworfen wurde.
    pub fn commit(&mut self, prepared: PreparedLoad) -> LoadOutcome {
        if prepared.generation != self.generation {
            log::warn!(
                "Load-Ergebnis verworfen: Projekt-Generation {} ist nicht mehr aktuell ({})",
                prepared.generation,
                self.generation
            );
            return LoadOutcome::Discarded;
        }

        match prepared.payload {
            Prepared::Cached(data) => {
                self.reset();
                self.data = ProjectData::clone(&data);
                self.loaded = true;
                self.events.status(LoadStatus::new(
                    LoadPhase::Finalize,
                    "Aus Cache wiederhergestellt",
                ));
                self.events.push(ProjectEvent::Loaded { from_cache: true });
                if let Some(name) = self.data.display_name.clone() {
                    self.events
                        .push(ProjectEvent::FileMetaChanged { display_name: name });
                }
                LoadOutcome::FromCache
            }
            Prepared::Parsed(files) => {
                // ein Load baut den Zustand immer komplett neu auf
                self.reset();
                let count = files.len();
                if count == 0 {
                    self.events.status(LoadStatus::new(
                        LoadPhase::Failed,
                        "Keine Datei konnte geladen werden",
                    ));
                    log::warn!("Load ohne Ergebnis: keine Datei geladen");
                    return LoadOutcome::Empty;
                }
                for f in files {
                    self.register_file(&f.filename, f.content, f.file);
                }
                self.finish_load();

                let now = self.services.clock.now();
                lock_cache(&self.services.cache).put(prepared.key, Snapshot::new(self.data.clone(), now));
                log::info!(
                    "Projekt geladen: {} Boards, {} Schaltpläne, {} Seiten, {} BOM-Zeilen",
                    self.data.boards.len(),
                    self.data.schematics.len(),
                    self.data.hierarchy.pages.len(),
                    self.data.bom_items.len()
                );
                LoadOutcome::Parsed { files: count }
            }
        }
    }

    fn finish_load(&mut self) {
        if self.data.file_content.values().any(|c| contains_cjk(c)) {
            self.events
                .status(LoadStatus::new(LoadPhase::Glyphs, "Lade erweiterte Glyphen"));
            ensure_extended_glyphs();
        }

        if !self.data.schematics.is_empty() {
            self.events
                .status(LoadStatus::new(LoadPhase::Hierarchy, "Bestimme Schaltplan-Hierarchie"));
            self.data.hierarchy = determine_schematic_hierarchy(&self.data.schematics);
        }

        self.events
            .status(LoadStatus::new(LoadPhase::Bom, "Berechne Stückliste"));
        self.data.bom_items = if self.data.schematics.is_empty() {
            bom_from_boards(self.data.boards.iter().map(|d| d.as_ref()))
        } else {
            bom_from_schematics(self.data.schematics.iter().map(|d| d.as_ref()))
        };

        self.events
            .status(LoadStatus::new(LoadPhase::Finalize, "Baue Indizes"));
        self.data.indices = ProjectIndices::build(&self.data.boards, &self.data.schematics);
        self.update_display_name();

        self.loaded = true;
        self.events.push(ProjectEvent::Loaded { from_cache: false });
    }

    /// Registriert ein Dokument; ein bereits registrierter Name liefert das vorhandene Dokument.
    fn register_file(&mut self, filename: &str, content: Arc<str>, file: ProjectFile) -> ProjectFile {
        if let Some(existing) = self.data.files_by_name.get(filename) {
            return existing.clone();
        }
        match &file {
            ProjectFile::Board(b) => self.data.boards.push(Arc::clone(b)),
            ProjectFile::Schematic(s) => self.data.schematics.push(Arc::clone(s)),
            ProjectFile::Settings(s) => self.data.settings = Some(Arc::clone(s)),
        }
        self.data.file_content.insert(filename.to_string(), content);
        self.data
            .files_by_name
            .insert(filename.to_string(), file.clone());
        file
    }

    /// Registriert einen einzelnen Blob. Ist der Dateiname schon bekannt, wird
    /// das vorhandene Dokument ohne erneutes Parsen zurückgegeben.
    pub fn add_blob(&mut self, blob: &SourceBlob) -> anyhow::Result<Option<ProjectFile>> {
        if let Some(existing) = self.data.files_by_name.get(&blob.filename) {
            return Ok(Some(existing.clone()));
        }
        let Some(file) = parse_file(&blob.filename, &blob.content)? else {
            return Ok(None);
        };
        Ok(Some(self.register_file(
            &blob.filename,
            Arc::from(blob.content.as_str()),
            file,
        )))
    }

    fn update_display_name(&mut self) {
        let name = self
            .data
            .settings
            .as_ref()
            .map(|s| s.name.clone())
            .or_else(|| self.data.boards.first().map(|b| file_stem(&b.filename).to_string()))
            .or_else(|| {
                self.data
                    .schematics
                    .first()
                    .map(|s| file_stem(&s.filename).to_string())
            });
        if name != self.data.display_name {
            self.data.display_name = name.clone();
            if let Some(display_name) = name {
                self.events
                    .push(ProjectEvent::FileMetaChanged { display_name });
            }
        }
    }

    fn reset(&mut self) {
        self.data = ProjectData::default();
        self.loaded = false;
    }

    /// Verwirft alle Maps; laufende Loads werden beim `commit` ignoriert.
    pub fn dispose(&mut self) {
        self.reset();
        self.generation += 1;
        log::debug!("Projekt verworfen (Generation {})", self.generation);
    }

    /// Entnimmt alle angefallenen Ereignisse.
    pub fn drain_events(&self) -> Vec<ProjectEvent> {
        self.events.drain()
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    /// Gibt `true` zurück, sobald ein Load abgeschlossen ist.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Injizierte Kollaborateure (Fetcher, Cache, Uhr).
    pub fn services(&self) -> &ProjectServices {
        &self.services
    }

    /// Aktuelle Generation (wird von `dispose` erhöht).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Gesamter Datenbestand.
    pub fn data(&self) -> &ProjectData {
        &self.data
    }

    /// Dateiname → Dokument.
    pub fn files_by_name(&self) -> &IndexMap<String, ProjectFile> {
        &self.data.files_by_name
    }

    /// Rohtext einer Datei.
    pub fn file_content(&self, filename: &str) -> Option<&str> {
        self.data.file_content.get(filename).map(|c| c.as_ref())
    }

    /// Dokument zu einem Dateinamen.
    pub fn file_by_name(&self, filename: &str) -> Option<&ProjectFile> {
        self.data.files_by_name.get(filename)
    }

    /// Board zu einem Dateinamen.
    pub fn board_by_name(&self, filename: &str) -> Option<&Arc<BoardDocument>> {
        match self.file_by_name(filename)? {
            ProjectFile::Board(b) => Some(b),
            _ => None,
        }
    }

    /// Schaltplan zu einem Dateinamen.
    pub fn schematic_by_name(&self, filename: &str) -> Option<&Arc<SchematicDocument>> {
        match self.file_by_name(filename)? {
            ProjectFile::Schematic(s) => Some(s),
            _ => None,
        }
    }

    /// Alle Boards.
    pub fn boards(&self) -> &[Arc<BoardDocument>] {
        &self.data.boards
    }

    /// Alle Schaltpläne.
    pub fn schematics(&self) -> &[Arc<SchematicDocument>] {
        &self.data.schematics
    }

    /// Stückliste.
    pub fn bom_items(&self) -> &[BomItem] {
        &self.data.bom_items
    }

    /// Projekt-Einstellungen.
    pub fn settings(&self) -> Option<&ProjectSettings> {
        self.data.settings.as_deref()
    }

    /// Seiten in Anzeigereihenfolge.
    pub fn pages(&self) -> impl Iterator<Item = &ProjectPage> {
        self.data.hierarchy.pages.values()
    }

    /// Root-Seite der Schaltplan-Hierarchie.
    pub fn root_page(&self) -> Option<&ProjectPage> {
        self.data.hierarchy.root()
    }

    /// Seite zu einem hierarchischen Pfad.
    pub fn page_by_path(&self, path: &str) -> Option<&ProjectPage> {
        self.data.hierarchy.pages.get(path)
    }

    /// Erste Fundstelle eines Designators.
    pub fn find_designator(&self, designator: &str) -> Option<&DesignatorRef> {
        self.data
            .indices
            .designator_refs
            .get(designator)
            .and_then(|refs| refs.first())
    }

    /// Alle Items eines Label-/Netznamens.
    pub fn net_refs_by_label(&self, name: &str) -> &[NetRef] {
        self.data
            .indices
            .label_name_refs
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Netz-Referenz eines Items.
    pub fn net_ref(&self, uuid: &str) -> Option<&NetRef> {
        self.data.indices.net_item_refs.get(uuid)
    }

    /// Anzeigename des Projekts.
    pub fn display_name(&self) -> Option<&str> {
        self.data.display_name.as_deref()
    }
}

/// Parsed eine Datei nach Endung; `None` für ignorierte Typen.
fn parse_file(filename: &str, content: &str) -> anyhow::Result<Option<ProjectFile>> {
    let file = match FileKind::from_filename(filename) {
        FileKind::Board => ProjectFile::Board(Arc::new(parse_board(filename, content)?)),
        FileKind::Schematic => {
            ProjectFile::Schematic(Arc::new(parse_schematic(filename, content)?))
        }
        FileKind::ProjectSettings => {
            ProjectFile::Settings(Arc::new(parse_project_settings(filename, content)?))
        }
        FileKind::Model3d => {
            log::info!("3D-Modell {} wird hier nicht verarbeitet", filename);
            return Ok(None);
        }
        FileKind::Unknown => {
            log::warn!("Unbekannter Dateityp wird ignoriert: {}", filename);
            return Ok(None);
        }
    };
    Ok(Some(file))
}

fn load_one(
    fetcher: &dyn SourceFetcher,
    events: &EventQueue,
    filename: &str,
    job: &Job<'_>,
    done: &AtomicUsize,
    total: usize,
) -> Option<ParsedFile> {
    let content: Arc<str> = match job {
        Job::Url(url) => match fetcher.fetch(url) {
            Ok(text) => Arc::from(text),
            Err(e) => {
                log::warn!("Download fehlgeschlagen: {:#}", e);
                let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                events.status(LoadStatus::progress(
                    LoadPhase::Download,
                    format!("Download fehlgeschlagen: {filename}"),
                    n,
                    total,
                ));
                return None;
            }
        },
        Job::Blob(content) => Arc::from(*content),
    };

    let result = parse_file(filename, &content);
    let n = done.fetch_add(1, Ordering::SeqCst) + 1;
    match result {
        Ok(Some(file)) => {
            events.status(LoadStatus::progress(
                LoadPhase::Parse,
                format!("{filename} geladen"),
                n,
                total,
            ));
            Some(ParsedFile {
                filename: filename.to_string(),
                content,
                file,
            })
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Parsen von {} fehlgeschlagen: {:#}", filename, e);
            events.status(LoadStatus::progress(
                LoadPhase::Parse,
                format!("{filename} fehlerhaft"),
                n,
                total,
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::clock::ManualClock;

    struct NoFetch;

    impl SourceFetcher for NoFetch {
        fn fetch(&self, url: &str) -> anyhow::Result<String> {
            anyhow::bail!("kein Netz: {url}")
        }
        fn fetch_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("kein Netz: {url}")
        }
    }

    fn project() -> Project {
        Project::new(ProjectServices::isolated(
            Arc::new(NoFetch),
            Arc::new(ManualClock::new()),
            &ViewerOptions::default(),
        ))
    }

    const SCH: &str = r#"(kicad_sch (version 20231120) (uuid "r")
      (symbol (lib_id "Device:R") (at 0 0 0) (in_bom yes) (uuid "s1")
        (property "Reference" "R1") (property "Value" "1k") (property "Footprint" "R_0603")))"#;

    #[test]
    fn duplicate_blob_returns_existing_document() {
        let mut p = project();
        let blob = SourceBlob::new("a.kicad_sch", SCH);
        let first = p.add_blob(&blob).expect("parsebar").expect("Dokument");
        let second = p
            .add_blob(&SourceBlob::new("a.kicad_sch", "kaputt"))
            .expect("kein erneutes Parsen")
            .expect("Dokument");
        assert!(first.ptr_eq(&second));
        assert_eq!(p.schematics().len(), 1);
    }

    #[test]
    fn failed_downloads_leave_project_unloaded_with_failed_status() {
        let mut p = project();
        let outcome = p.load(&LoadSources::from_urls(["x/missing.kicad_pcb"]));
        assert_eq!(outcome, LoadOutcome::Empty);
        assert!(!p.is_loaded());
        let last = p
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                ProjectEvent::Status(s) => Some(s),
                _ => None,
            })
            .last()
            .expect("Status erwartet");
        assert_eq!(last.phase, LoadPhase::Failed);
    }

    #[test]
    fn commit_after_dispose_is_discarded() {
        let mut p = project();
        let prepared = p.prepare(&LoadSources::from_blobs(vec![SourceBlob::new("a.kicad_sch", SCH)]));
        p.dispose();
        assert_eq!(p.commit(prepared), LoadOutcome::Discarded);
        assert!(p.files_by_name().is_empty());
    }

    #[test]
    fn display_name_falls_back_to_schematic_stem() {
        let mut p = project();
        p.load(&LoadSources::from_blobs(vec![SourceBlob::new("main.kicad_sch", SCH)]));
        assert_eq!(p.display_name(), Some("main"));
        assert!(p
            .drain_events()
            .iter()
            .any(|e| matches!(e, ProjectEvent::FileMetaChanged { display_name } if display_name == "main")));
        assert_eq!(p.find_designator("R1").map(|d| d.uuid.as_str()), Some("s1"));
        assert_eq!(p.bom_items().len(), 1);
    }
}
