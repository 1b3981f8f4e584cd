//! Document Store und Snapshot-Cache.
//!
//! - `Project`: lädt Quellen, parsed sie, baut Hierarchie, Stückliste und Indizes
//! - `SnapshotCache`: memoisiert geparste Projekte hinter einem Content-Key
//! - `SourceFetcher`/`Clock`: injizierbare Kollaborateure für I/O und Zeit

pub mod cache;
pub mod clock;
pub mod events;
pub mod fetch;
pub mod hierarchy;
pub mod indices;
#[allow(clippy::module_inception)]
pub mod project;
pub mod sources;

pub use cache::{Snapshot, SnapshotCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{LoadPhase, LoadStatus, ProjectEvent};
pub use fetch::{FsFetcher, SourceFetcher};
pub use hierarchy::{determine_schematic_hierarchy, PageHierarchy, PageKind, ProjectPage};
pub use indices::{DesignatorKind, DesignatorRef, NetRef, NetRefKind, ProjectIndices};
pub use project::{
    new_snapshot_cache, process_wide_cache, LoadOutcome, PreparedLoad, Project, ProjectData,
    ProjectFile, ProjectServices, SharedSnapshotCache,
};
pub use sources::{filename_from_url, rolling_hash, CacheKey, LoadSources, SourceBlob};
