//! Snapshot rendering
//!
//! `DisplayModel::from_snapshot` builds the view; `Renderer` pushes it to a
//! `DisplaySurface`, replacing whatever was shown before.

mod model;
mod surface;

pub use model::*;
pub use surface::*;

use tracing::{debug, warn};

use crate::snapshot::Snapshot;

/// Turns snapshots into surface updates
pub struct Renderer<D: DisplaySurface> {
    surface: D,
    current: DisplayModel,
    frames: u64,
}

impl<D: DisplaySurface> Renderer<D> {
    pub fn new(surface: D) -> Self {
        Self {
            surface,
            current: DisplayModel::default(),
            frames: 0,
        }
    }

    /// Replace the display with the view of `snapshot`
    pub fn render(&mut self, snapshot: &Snapshot) -> &DisplayModel {
        let model = DisplayModel::from_snapshot(snapshot);

        for skipped in &model.skipped {
            warn!(village = %skipped.id, reason = %skipped.reason, "Skipping malformed village");
        }

        self.frames += 1;
        debug!(
            frame = self.frames,
            villages = model.villages.len(),
            skipped = model.skipped.len(),
            "Rendering snapshot"
        );

        self.surface.replace(&model);
        self.current = model;
        &self.current
    }

    pub fn show_notice(&mut self, notice: &str) {
        self.surface.show_notice(notice);
    }

    /// The last rendered model
    pub fn current(&self) -> &DisplayModel {
        &self.current
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }
}
