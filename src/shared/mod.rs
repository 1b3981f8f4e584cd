//! Geteilte Typen für modulübergreifende Verträge.
//!
//! Enthält Typen, die zwischen `app`, `project` und `render` geteilt werden,
//! um direkte Abhängigkeiten zu vermeiden.

pub mod options;
mod render_scene;

pub use options::ViewerOptions;
pub use render_scene::RenderScene;
