//! The collaboration session manager.
//!
//! One session per collaboration id. The session owns the local page
//! list, a per-page last-sent baseline used as the diff base, and the
//! stroke state machine that batches outbound updates. Inbound frames
//! are applied through the scene diff adapter in authoritative
//! (non-stacked) mode.
//!
//! The `&mut self` event methods serialize all processing: a snapshot
//! arriving mid-stroke lands in a single-slot pending buffer (latest
//! wins) and flushes at stroke end, so no two diff computations ever
//! interleave.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use sketchsync_scene::{apply_scene_diff, diff_scene, ApplyMode, Scene};

use crate::message::CollabMessage;
use crate::surface::{DrawingSurface, SceneUpdate};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Error)]
pub enum CollabError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("session is closed")]
    SessionClosed,
}

/// Transport lifecycle, terminal at `Closed`: resuming collaboration
/// requires a new session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// A sketch page: identity, display name, and scene content.
#[derive(Clone, Debug, PartialEq)]
pub struct SketchPage {
    pub id: String,
    pub name: String,
    pub scene: Scene,
}

impl SketchPage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> SketchPage {
        SketchPage {
            id: id.into(),
            name: name.into(),
            scene: Scene::empty(),
        }
    }
}

pub struct CollabSession<T: Transport> {
    collab_id: u32,
    transport: T,
    state: SessionState,
    pages: Vec<SketchPage>,
    active_page_id: String,
    /// Last-sent snapshot per page; single-writer, mutated only after a
    /// successful send so the diff base never drifts from what peers saw.
    baselines: HashMap<String, Scene>,
    drawing: bool,
    /// Latest mid-stroke snapshot waiting for stroke end.
    pending: Option<(String, Scene)>,
    needs_remount: bool,
    scene_version: u64,
}

impl<T: Transport> CollabSession<T> {
    /// Creates a session in `Connecting` state. `pages` must contain
    /// `active_page_id`; an empty page list gets a default page.
    pub fn new(
        collab_id: u32,
        transport: T,
        mut pages: Vec<SketchPage>,
        active_page_id: impl Into<String>,
    ) -> CollabSession<T> {
        if pages.is_empty() {
            pages.push(SketchPage::new("page-1", "Page 1"));
        }
        let active_page_id = active_page_id.into();
        let active_page_id = if pages.iter().any(|p| p.id == active_page_id) {
            active_page_id
        } else {
            pages[0].id.clone()
        };
        CollabSession {
            collab_id,
            transport,
            state: SessionState::Connecting,
            pages,
            active_page_id,
            baselines: HashMap::new(),
            drawing: false,
            pending: None,
            needs_remount: false,
            scene_version: 0,
        }
    }

    pub fn collab_id(&self) -> u32 {
        self.collab_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pages(&self) -> &[SketchPage] {
        &self.pages
    }

    pub fn active_page_id(&self) -> &str {
        &self.active_page_id
    }

    pub fn active_page(&self) -> Option<&SketchPage> {
        self.pages.iter().find(|p| p.id == self.active_page_id)
    }

    /// Monotonic counter the rendering layer watches: each bump means
    /// the displayed scene changed under it and the canvas must remount.
    pub fn scene_version(&self) -> u64 {
        self.scene_version
    }

    pub fn set_active_page(&mut self, page_id: &str) {
        if self.pages.iter().any(|p| p.id == page_id) {
            self.active_page_id = page_id.to_owned();
        } else {
            warn!(page_id, "cannot activate unknown page");
        }
    }

    // ── Transport lifecycle ───────────────────────────────────────────────

    /// Transport established. Announces the active page to peers, and
    /// when that page already has content, its full scene, so a late
    /// joiner starts from the current drawing.
    pub fn handle_open(&mut self) -> Result<(), CollabError> {
        if self.state == SessionState::Closed {
            return Err(CollabError::SessionClosed);
        }
        self.state = SessionState::Active;
        info!(collab_id = self.collab_id, "collaboration transport open");

        let Some(active) = self.active_page().cloned() else {
            return Ok(());
        };
        self.transport.send(&CollabMessage::PageUpdate {
            page_id: active.id.clone(),
            name: Some(active.name.clone()),
        })?;
        if !active.scene.is_empty() {
            if let Some(patch) = diff_scene(&Scene::empty(), &active.scene) {
                self.transport.send(&CollabMessage::SceneUpdate {
                    page_id: active.id.clone(),
                    patch,
                })?;
                self.baselines.insert(active.id, active.scene);
            }
        }
        Ok(())
    }

    /// Transport closed. Terminal; all state stays locally available,
    /// only synchronization stops.
    pub fn handle_close(&mut self) {
        info!(collab_id = self.collab_id, "collaboration transport closed");
        self.state = SessionState::Closed;
        self.pending = None;
    }

    // ── Local-edit path ───────────────────────────────────────────────────

    /// Pointer went down on the canvas: subsequent snapshots coalesce
    /// until the stroke ends.
    pub fn stroke_started(&mut self) {
        self.drawing = true;
    }

    /// Pointer came up: flush the pending snapshot (if any) and perform
    /// any remount deferred while the stroke was in progress.
    pub fn stroke_ended(&mut self) -> Result<(), CollabError> {
        let was_drawing = self.drawing;
        self.drawing = false;
        if was_drawing && self.needs_remount {
            self.scene_version += 1;
            self.needs_remount = false;
        }
        if let Some((page_id, scene)) = self.pending.take() {
            self.send_if_changed(&page_id, scene)?;
        }
        Ok(())
    }

    /// The drawing surface reported a new snapshot of the active page.
    pub fn scene_changed(&mut self, scene: Scene) -> Result<(), CollabError> {
        let page_id = self.active_page_id.clone();
        self.store_scene(&page_id, &scene);
        if self.drawing {
            // Only the latest snapshot matters; earlier pending ones are
            // superseded.
            self.pending = Some((page_id, scene));
            return Ok(());
        }
        self.send_if_changed(&page_id, scene)
    }

    /// Pulls the current snapshot from the drawing surface and routes it
    /// through [`Self::scene_changed`].
    pub fn sync_from_surface(&mut self, surface: &impl DrawingSurface) -> Result<(), CollabError> {
        self.scene_changed(surface.current_scene())
    }

    /// Pushes the active page's stored scene back into the drawing
    /// surface. The rendering layer calls this when
    /// [`Self::scene_version`] moves: the drawing library cannot safely
    /// absorb partial external state into a live editing session, so the
    /// refresh is always a full-scene remount.
    pub fn refresh_surface(&self, surface: &mut impl DrawingSurface) {
        if let Some(active) = self.active_page() {
            surface.apply_scene_update(SceneUpdate::Full(active.scene.clone()));
        }
    }

    fn store_scene(&mut self, page_id: &str, scene: &Scene) {
        if let Some(page) = self.pages.iter_mut().find(|p| p.id == page_id) {
            page.scene = scene.clone();
        }
    }

    fn send_if_changed(&mut self, page_id: &str, scene: Scene) -> Result<(), CollabError> {
        if self.state != SessionState::Active {
            debug!(page_id, "not active; skipping scene send");
            return Ok(());
        }
        let baseline = self
            .baselines
            .get(page_id)
            .cloned()
            .unwrap_or_else(Scene::empty);
        let Some(patch) = diff_scene(&baseline, &scene) else {
            return Ok(());
        };
        if patch.is_trivial() {
            debug!(page_id, "app-state-only delta suppressed");
            return Ok(());
        }
        self.transport.send(&CollabMessage::SceneUpdate {
            page_id: page_id.to_owned(),
            patch,
        })?;
        // Deep clone: the live scene keeps mutating after this point and
        // must not alias the sent baseline.
        self.baselines.insert(page_id.to_owned(), scene);
        Ok(())
    }

    // ── Local page lifecycle ──────────────────────────────────────────────

    pub fn add_page(&mut self, id: &str, name: &str) -> Result<(), CollabError> {
        self.pages.push(SketchPage::new(id, name));
        self.notify_page(id, Some(name))
    }

    pub fn duplicate_page(&mut self, id: &str, name: &str, scene: Scene) -> Result<(), CollabError> {
        self.pages.push(SketchPage {
            id: id.to_owned(),
            name: name.to_owned(),
            scene: scene.clone(),
        });
        self.notify_page(id, Some(name))?;
        self.send_if_changed(id, scene)
    }

    pub fn rename_page(&mut self, id: &str, name: &str) -> Result<(), CollabError> {
        match self.pages.iter_mut().find(|p| p.id == id) {
            Some(page) => page.name = name.to_owned(),
            None => {
                warn!(id, "cannot rename unknown page");
                return Ok(());
            }
        }
        self.notify_page(id, Some(name))
    }

    pub fn delete_page(&mut self, id: &str) -> Result<(), CollabError> {
        if self.pages.len() <= 1 {
            warn!(id, "refusing to delete the last page");
            return Ok(());
        }
        self.pages.retain(|p| p.id != id);
        self.baselines.remove(id);
        if self.active_page_id == id {
            self.active_page_id = self.pages[0].id.clone();
            self.scene_version += 1;
        }
        self.notify_page(id, None)
    }

    fn notify_page(&mut self, id: &str, name: Option<&str>) -> Result<(), CollabError> {
        if self.state != SessionState::Active {
            debug!(id, "not active; skipping page notification");
            return Ok(());
        }
        self.transport.send(&CollabMessage::PageUpdate {
            page_id: id.to_owned(),
            name: name.map(str::to_owned),
        })?;
        Ok(())
    }

    // ── Remote-update path ────────────────────────────────────────────────

    /// Applies one inbound frame. Malformed or unroutable frames are
    /// logged and dropped; they never end the session.
    pub fn handle_message(&mut self, message: CollabMessage) {
        if self.state == SessionState::Closed {
            warn!("dropping message received after close");
            return;
        }
        match message {
            CollabMessage::PageUpdate { page_id, name } => self.apply_page_update(page_id, name),
            CollabMessage::SceneUpdate { page_id, patch } => {
                self.apply_scene_update(page_id, patch)
            }
        }
    }

    fn apply_page_update(&mut self, page_id: String, name: Option<String>) {
        let Some(name) = name else {
            // Deletion; never drop below one page.
            if self.pages.len() <= 1 {
                warn!(%page_id, "ignoring deletion of the last page");
                return;
            }
            self.pages.retain(|p| p.id != page_id);
            self.baselines.remove(&page_id);
            if self.active_page_id == page_id {
                self.active_page_id = self.pages[0].id.clone();
                self.scene_version += 1;
            }
            return;
        };

        if let Some(page) = self.pages.iter_mut().find(|p| p.id == page_id) {
            page.name = name;
            return;
        }

        // First-contact bootstrap: a lone, still-empty default page is
        // replaced by the collaborator's page rather than kept alongside.
        let lone_empty_default = self.pages.len() == 1
            && self.pages[0].scene.is_empty()
            && self.pages[0].id != page_id;
        if lone_empty_default {
            info!(%page_id, "replacing empty default page with collaborator page");
            let scene = self.pages[0].scene.clone();
            self.pages[0] = SketchPage {
                id: page_id.clone(),
                name,
                scene,
            };
            self.active_page_id = page_id;
            self.scene_version += 1;
            return;
        }

        // New page from a collaborator; do not switch to it.
        self.pages.push(SketchPage::new(page_id, name));
    }

    fn apply_scene_update(&mut self, page_id: String, patch: sketchsync_scene::ScenePatch) {
        let Some(page) = self.pages.iter_mut().find(|p| p.id == page_id) else {
            warn!(%page_id, "scene update for unknown page dropped");
            return;
        };
        page.scene = apply_scene_diff(&page.scene, &patch, ApplyMode::Remote);

        if page_id == self.active_page_id {
            if self.drawing {
                // The drawing library cannot absorb an external state
                // mid-stroke; remount once the stroke finishes.
                self.needs_remount = true;
            } else {
                self.scene_version += 1;
            }
        }
    }
}
