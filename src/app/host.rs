//! Host-Anbindung: persistierter View-State und Dirty-Flag.

use anyhow::Result;

use super::events::{StateOrigin, ViewerEvent};
use super::shell::Viewer;
use super::view_state::ViewState;

/// Persistenzseite des Hosts für eine Viewer-Instanz.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostBinding {
    stored: Option<String>,
    dirty: bool,
}

impl HostBinding {
    /// Anbindung mit einem bereits gespeicherten JSON-Blob.
    pub fn with_stored(json: impl Into<String>) -> Self {
        Self {
            stored: Some(json.into()),
            dirty: false,
        }
    }

    /// Gespeicherter Blob.
    pub fn stored(&self) -> Option<&str> {
        self.stored.as_deref()
    }

    /// Gibt `true` zurück, sobald eine Nutzeränderung ungespeichert ist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Markiert den Inhalt als gespeichert.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Spielt den gespeicherten Blob in den Viewer ein.
    pub fn replay(&self, viewer: &mut Viewer) -> Result<()> {
        let Some(json) = &self.stored else {
            return Ok(());
        };
        let state = ViewState::from_json(json)?;
        viewer.restore_view_state(&state)
    }

    /// Verarbeitet Viewer-Ereignisse; nur `User`-Änderungen werden persistiert.
    pub fn observe(&mut self, events: &[ViewerEvent]) -> Result<()> {
        for event in events {
            let ViewerEvent::StateChanged { view_state, origin } = event else {
                continue;
            };
            match origin {
                StateOrigin::User => {
                    self.stored = Some(view_state.to_json()?);
                    self.dirty = true;
                }
                StateOrigin::Restore => log::trace!("Restore-Änderung ignoriert"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(origin: StateOrigin) -> ViewerEvent {
        ViewerEvent::StateChanged {
            view_state: ViewState::layer_visibility("F.Cu", false),
            origin,
        }
    }

    #[test]
    fn restore_origin_never_marks_dirty() {
        let mut host = HostBinding::with_stored("{}");
        host.observe(&[changed(StateOrigin::Restore)]).expect("ok");
        assert!(!host.is_dirty());
        assert_eq!(host.stored(), Some("{}"));
    }

    #[test]
    fn user_origin_persists_and_marks_dirty() {
        let mut host = HostBinding::default();
        host.observe(&[changed(StateOrigin::User)]).expect("ok");
        assert!(host.is_dirty());
        assert_eq!(host.stored(), Some(r#"{"pcb":{"layers":{"F.Cu":false}}}"#));
        host.mark_saved();
        assert!(!host.is_dirty());
    }
}
