//! Freehand stroke recorder.
//!
//! A path is open from `start` until `finish` seals it. Appends to unknown or
//! sealed paths are ignored and reported as `false`, never as an error.
//! Point timestamps come from the engine clock at append time. Colours are
//! carried verbatim as the host's packed little-endian RGBA word.

#[cfg(test)]
#[path = "paths_test.rs"]
mod paths_test;

use std::collections::HashMap;

use scene_buffers::{DrawPathRecord, DrawPointRecord, write_draw_path};

use crate::consts::{MAX_PATH_ID, MAX_POINTS_PER_PATH};

/// Caller-chosen path identifier, often a millisecond timestamp.
pub type PathId = u64;

#[derive(Debug, Clone, PartialEq)]
struct DrawPath {
    record: DrawPathRecord,
    sealed: bool,
}

/// All recorded paths in start order.
#[derive(Debug, Default)]
pub struct PathRecorder {
    paths: Vec<DrawPath>,
    index: HashMap<PathId, usize>,
}

impl PathRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new path with its first point.
    ///
    /// Returns `false` for an id already in use or above [`MAX_PATH_ID`], a
    /// non-positive or non-finite line width, or a non-finite point.
    pub fn start(&mut self, id: PathId, first: DrawPointRecord, color: u32, line_width: f32) -> bool {
        if id > MAX_PATH_ID {
            tracing::debug!(id, "draw path id not representable in the output stream");
            return false;
        }
        if self.index.contains_key(&id) {
            tracing::debug!(id, "draw path id already in use");
            return false;
        }
        if !(line_width.is_finite() && line_width > 0.0) || !point_is_finite(&first) {
            tracing::debug!(id, line_width, "rejected draw path start");
            return false;
        }
        self.index.insert(id, self.paths.len());
        self.paths.push(DrawPath {
            record: DrawPathRecord { id, color, line_width, closed: false, points: vec![first] },
            sealed: false,
        });
        true
    }

    /// Append a point to an open path. Returns whether it was stored.
    pub fn add_point(&mut self, id: PathId, point: DrawPointRecord) -> bool {
        let Some(path) = self.open_mut(id) else {
            return false;
        };
        if path.record.points.len() >= MAX_POINTS_PER_PATH || !point_is_finite(&point) {
            return false;
        }
        path.record.points.push(point);
        true
    }

    /// Seal an open path. Returns `false` if it was unknown or already sealed.
    pub fn finish(&mut self, id: PathId, closed: bool) -> bool {
        let Some(path) = self.open_mut(id) else {
            return false;
        };
        path.record.closed = closed;
        path.sealed = true;
        true
    }

    fn open_mut(&mut self, id: PathId) -> Option<&mut DrawPath> {
        let &i = self.index.get(&id)?;
        self.paths.get_mut(i).filter(|p| !p.sealed)
    }

    /// Discard every path, open or sealed.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.index.clear();
    }

    #[must_use]
    pub fn is_sealed(&self, id: PathId) -> Option<bool> {
        self.index.get(&id).map(|&i| self.paths[i].sealed)
    }

    #[must_use]
    pub fn get(&self, id: PathId) -> Option<&DrawPathRecord> {
        self.index.get(&id).map(|&i| &self.paths[i].record)
    }

    /// Serialize every path into the variable-length draw-path stream.
    pub fn write(&self, out: &mut Vec<f64>) {
        for path in &self.paths {
            write_draw_path(&path.record, out);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn point_is_finite(p: &DrawPointRecord) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.pressure.is_finite()
}
