//! Flat numeric wire format shared by the scene engine and its host.
//!
//! Every record crossing the engine boundary is a fixed run of numbers in a
//! flat typed array: `f32` for scene state, `i32` for events, and `f64` for
//! draw paths (whose caller-chosen ids are often millisecond timestamps).
//! This crate owns those layouts so the engine and any host agree on them.
//!
//! Decoding is all-or-nothing: a buffer whose length is not an exact multiple
//! of the record stride, or that carries an invalid id, is rejected before
//! any record is handed back.

use serde::{Deserialize, Serialize};

/// Error returned when a buffer does not match its record layout.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BufferError {
    /// The buffer length is not a multiple of the record stride.
    #[error("{kind} buffer of length {len} is not a multiple of stride {stride}")]
    Stride { kind: &'static str, len: usize, stride: usize },
    /// A single-record buffer did not have exactly one record's worth of values.
    #[error("{kind} buffer must hold exactly {expected} values, got {len}")]
    Length { kind: &'static str, len: usize, expected: usize },
    /// A pointer buffer fits neither the 4-field nor the 5-field layout.
    #[error("pointer buffer of length {len} fits neither the 4- nor 5-field layout")]
    InvalidPointerLayout { len: usize },
    /// An id field is not a finite integer in the accepted range.
    #[error("{kind} record carries invalid id {value}")]
    InvalidId { kind: &'static str, value: f64 },
    /// A variable-length draw-path stream ended inside a record.
    #[error("draw path stream truncated at offset {offset}")]
    Truncated { offset: usize },
    /// The event `type` integer does not map to a known [`EventKind`].
    #[error("invalid event type: {0}")]
    InvalidEventKind(i32),
}

// =============================================================================
// FIXED-STRIDE RECORDS
// =============================================================================

/// A fixed-stride `f32` record.
pub trait Record: Sized {
    /// Human-readable record name used in errors.
    const KIND: &'static str;
    /// Number of `f32` values per record.
    const STRIDE: usize;

    /// Read one record from a chunk of exactly [`Self::STRIDE`] values.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidId`] when an id field is not a valid integer.
    fn read(chunk: &[f32]) -> Result<Self, BufferError>;

    /// Append this record's values to `out`.
    fn write(&self, out: &mut Vec<f32>);
}

/// Decode a buffer holding any number of whole records.
///
/// # Errors
///
/// Returns [`BufferError::Stride`] when the length is not a multiple of the
/// stride, or the first per-record error encountered.
pub fn decode<R: Record>(buf: &[f32]) -> Result<Vec<R>, BufferError> {
    if buf.len() % R::STRIDE != 0 {
        return Err(BufferError::Stride { kind: R::KIND, len: buf.len(), stride: R::STRIDE });
    }
    buf.chunks_exact(R::STRIDE).map(R::read).collect()
}

/// Decode a buffer holding exactly one record.
///
/// # Errors
///
/// Returns [`BufferError::Length`] unless the buffer holds exactly one record.
pub fn decode_one<R: Record>(buf: &[f32]) -> Result<R, BufferError> {
    if buf.len() != R::STRIDE {
        return Err(BufferError::Length { kind: R::KIND, len: buf.len(), expected: R::STRIDE });
    }
    R::read(buf)
}

/// Encode records back-to-back. Never emits a partial record.
#[must_use]
pub fn encode<R: Record>(records: &[R]) -> Vec<f32> {
    let mut out = Vec::with_capacity(records.len() * R::STRIDE);
    for record in records {
        record.write(&mut out);
    }
    out
}

fn read_id(kind: &'static str, value: f32, min: i32) -> Result<i32, BufferError> {
    let wide = f64::from(value);
    if !wide.is_finite() || wide.fract() != 0.0 || wide < f64::from(min) || wide > f64::from(i32::MAX) {
        return Err(BufferError::InvalidId { kind, value: wide });
    }
    Ok(value as i32)
}

/// `[id, x, y, w, h, vx, vy, flags]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub flags: u32,
}

impl Record for NodeRecord {
    const KIND: &'static str = "node";
    const STRIDE: usize = 8;

    fn read(c: &[f32]) -> Result<Self, BufferError> {
        Ok(Self {
            id: read_id(Self::KIND, c[0], 1)?,
            x: c[1],
            y: c[2],
            w: c[3],
            h: c[4],
            vx: c[5],
            vy: c[6],
            flags: c[7].max(0.0) as u32,
        })
    }

    fn write(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[
            self.id as f32,
            self.x,
            self.y,
            self.w,
            self.h,
            self.vx,
            self.vy,
            self.flags as f32,
        ]);
    }
}

/// `[left, top, right, bottom, gridX, gridY, inertia, damping]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintsRecord {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub grid_x: f32,
    pub grid_y: f32,
    pub inertia: f32,
    pub damping: f32,
}

impl Record for ConstraintsRecord {
    const KIND: &'static str = "constraints";
    const STRIDE: usize = 8;

    fn read(c: &[f32]) -> Result<Self, BufferError> {
        Ok(Self {
            left: c[0],
            top: c[1],
            right: c[2],
            bottom: c[3],
            grid_x: c[4],
            grid_y: c[5],
            inertia: c[6],
            damping: c[7],
        })
    }

    fn write(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[
            self.left,
            self.top,
            self.right,
            self.bottom,
            self.grid_x,
            self.grid_y,
            self.inertia,
            self.damping,
        ]);
    }
}

/// `[x, y, vx, vy, radius, life]`, used both for spawning and for frame output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub life: f32,
}

impl Record for ParticleRecord {
    const KIND: &'static str = "particle";
    const STRIDE: usize = 6;

    fn read(c: &[f32]) -> Result<Self, BufferError> {
        Ok(Self { x: c[0], y: c[1], vx: c[2], vy: c[3], radius: c[4], life: c[5] })
    }

    fn write(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[self.x, self.y, self.vx, self.vy, self.radius, self.life]);
    }
}

/// `[gravityX, gravityY, damping, restitution]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleParamsRecord {
    pub gravity_x: f32,
    pub gravity_y: f32,
    pub damping: f32,
    pub restitution: f32,
}

impl Record for ParticleParamsRecord {
    const KIND: &'static str = "particle params";
    const STRIDE: usize = 4;

    fn read(c: &[f32]) -> Result<Self, BufferError> {
        Ok(Self { gravity_x: c[0], gravity_y: c[1], damping: c[2], restitution: c[3] })
    }

    fn write(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[self.gravity_x, self.gravity_y, self.damping, self.restitution]);
    }
}

/// `[tapMaxSeconds, moveThresholdPx, doubleTapWindowSeconds, singleTapDelaySeconds]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapParamsRecord {
    pub tap_max_s: f32,
    pub move_threshold_px: f32,
    pub double_tap_window_s: f32,
    pub single_tap_delay_s: f32,
}

impl Record for TapParamsRecord {
    const KIND: &'static str = "tap params";
    const STRIDE: usize = 4;

    fn read(c: &[f32]) -> Result<Self, BufferError> {
        Ok(Self {
            tap_max_s: c[0],
            move_threshold_px: c[1],
            double_tap_window_s: c[2],
            single_tap_delay_s: c[3],
        })
    }

    fn write(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[
            self.tap_max_s,
            self.move_threshold_px,
            self.double_tap_window_s,
            self.single_tap_delay_s,
        ]);
    }
}

/// `[id, x, y, angle, sx, sy, reserved]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformRecord {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub sx: f32,
    pub sy: f32,
}

impl Record for TransformRecord {
    const KIND: &'static str = "transform";
    const STRIDE: usize = 7;

    fn read(c: &[f32]) -> Result<Self, BufferError> {
        Ok(Self { id: read_id(Self::KIND, c[0], 1)?, x: c[1], y: c[2], angle: c[3], sx: c[4], sy: c[5] })
    }

    fn write(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[self.id as f32, self.x, self.y, self.angle, self.sx, self.sy, 0.0]);
    }
}

// =============================================================================
// POINTERS (TWO LAYOUTS)
// =============================================================================

/// Which pointer record layout a buffer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerLayout {
    /// `[id, x, y, buttons]`; pressure is reported as 1.0.
    Compact,
    /// `[id, x, y, pressure, buttons]`
    WithPressure,
}

impl PointerLayout {
    /// Values per record in this layout.
    #[must_use]
    pub fn stride(self) -> usize {
        match self {
            Self::Compact => 4,
            Self::WithPressure => 5,
        }
    }

    /// Pick the layout from a buffer length.
    ///
    /// Lengths that fit both layouts (multiples of 20) are read as
    /// [`PointerLayout::Compact`]; hosts sending pressure in such batches
    /// should name the layout explicitly via [`decode_pointers_with`].
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidPointerLayout`] when neither stride fits.
    pub fn detect(len: usize) -> Result<Self, BufferError> {
        if len % 4 == 0 {
            Ok(Self::Compact)
        } else if len % 5 == 0 {
            Ok(Self::WithPressure)
        } else {
            Err(BufferError::InvalidPointerLayout { len })
        }
    }
}

/// One pointer contact as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerRecord {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    pub buttons: u32,
}

impl PointerRecord {
    /// Whether any button is held.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.buttons != 0
    }
}

/// Decode a pointer buffer, detecting the layout from its length.
///
/// # Errors
///
/// See [`PointerLayout::detect`] and [`decode_pointers_with`].
pub fn decode_pointers(buf: &[f32]) -> Result<Vec<PointerRecord>, BufferError> {
    decode_pointers_with(buf, PointerLayout::detect(buf.len())?)
}

/// Decode a pointer buffer in an explicit layout.
///
/// # Errors
///
/// Returns [`BufferError::Stride`] when the length does not fit the layout and
/// [`BufferError::InvalidId`] for a non-integral or negative pointer id.
pub fn decode_pointers_with(buf: &[f32], layout: PointerLayout) -> Result<Vec<PointerRecord>, BufferError> {
    let stride = layout.stride();
    if buf.len() % stride != 0 {
        return Err(BufferError::Stride { kind: "pointer", len: buf.len(), stride });
    }
    buf.chunks_exact(stride)
        .map(|c| {
            let (pressure, buttons) = match layout {
                PointerLayout::Compact => (1.0, c[3]),
                PointerLayout::WithPressure => (c[3], c[4]),
            };
            Ok(PointerRecord {
                id: read_id("pointer", c[0], 0)?,
                x: c[1],
                y: c[2],
                pressure,
                buttons: buttons.max(0.0) as u32,
            })
        })
        .collect()
}

/// Encode pointers in the given layout.
#[must_use]
pub fn encode_pointers(pointers: &[PointerRecord], layout: PointerLayout) -> Vec<f32> {
    let mut out = Vec::with_capacity(pointers.len() * layout.stride());
    for p in pointers {
        out.extend_from_slice(&[p.id as f32, p.x, p.y]);
        if layout == PointerLayout::WithPressure {
            out.push(p.pressure);
        }
        out.push(p.buttons as f32);
    }
    out
}

// =============================================================================
// EVENTS (i32)
// =============================================================================

/// Gesture transition reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DragStart,
    DragEnd,
    Tap,
    DoubleTap,
}

impl EventKind {
    /// Wire integer for this kind.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::DragStart => 1,
            Self::DragEnd => 2,
            Self::Tap => 10,
            Self::DoubleTap => 11,
        }
    }

    /// Parse a kind from its wire integer.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidEventKind`] for unknown values.
    pub fn from_i32(value: i32) -> Result<Self, BufferError> {
        match value {
            1 => Ok(Self::DragStart),
            2 => Ok(Self::DragEnd),
            10 => Ok(Self::Tap),
            11 => Ok(Self::DoubleTap),
            other => Err(BufferError::InvalidEventKind(other)),
        }
    }
}

/// `[type, a, b, data]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub kind: EventKind,
    pub a: i32,
    pub b: i32,
    pub data: i32,
}

/// Values per event record.
pub const EVENT_STRIDE: usize = 4;

/// Encode events back-to-back.
#[must_use]
pub fn encode_events(events: &[EventRecord]) -> Vec<i32> {
    let mut out = Vec::with_capacity(events.len() * EVENT_STRIDE);
    for e in events {
        out.extend_from_slice(&[e.kind.as_i32(), e.a, e.b, e.data]);
    }
    out
}

/// Decode an event buffer.
///
/// # Errors
///
/// Returns [`BufferError::Stride`] for a partial record and
/// [`BufferError::InvalidEventKind`] for an unknown type.
pub fn decode_events(buf: &[i32]) -> Result<Vec<EventRecord>, BufferError> {
    if buf.len() % EVENT_STRIDE != 0 {
        return Err(BufferError::Stride { kind: "event", len: buf.len(), stride: EVENT_STRIDE });
    }
    buf.chunks_exact(EVENT_STRIDE)
        .map(|c| Ok(EventRecord { kind: EventKind::from_i32(c[0])?, a: c[1], b: c[2], data: c[3] }))
        .collect()
}

// =============================================================================
// DRAW PATHS (VARIABLE LENGTH, f64)
// =============================================================================

/// Values in a draw-path header: `[id, packedColor, lineWidth, closedFlag, pointCount]`.
pub const DRAW_PATH_HEADER: usize = 5;
/// Values per draw point: `[x, y, pressure, timestamp]`.
pub const DRAW_POINT_STRIDE: usize = 4;

/// One sampled point of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawPointRecord {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    /// Seconds on the engine clock.
    pub timestamp: f64,
}

/// A serialized freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawPathRecord {
    pub id: u64,
    pub color: u32,
    pub line_width: f32,
    pub closed: bool,
    pub points: Vec<DrawPointRecord>,
}

/// Append one path to a draw-path stream.
pub fn write_draw_path(path: &DrawPathRecord, out: &mut Vec<f64>) {
    out.reserve(DRAW_PATH_HEADER + path.points.len() * DRAW_POINT_STRIDE);
    out.extend_from_slice(&[
        path.id as f64,
        f64::from(path.color),
        f64::from(path.line_width),
        if path.closed { 1.0 } else { 0.0 },
        path.points.len() as f64,
    ]);
    for p in &path.points {
        out.extend_from_slice(&[f64::from(p.x), f64::from(p.y), f64::from(p.pressure), p.timestamp]);
    }
}

/// Encode paths into one stream.
#[must_use]
pub fn encode_draw_paths(paths: &[DrawPathRecord]) -> Vec<f64> {
    let mut out = Vec::new();
    for path in paths {
        write_draw_path(path, &mut out);
    }
    out
}

/// Decode a draw-path stream, advancing by each record's `pointCount`.
///
/// # Errors
///
/// Returns [`BufferError::Truncated`] when a header or its points run past
/// the end of the buffer, and [`BufferError::InvalidId`] for a malformed id
/// or point count.
pub fn decode_draw_paths(buf: &[f64]) -> Result<Vec<DrawPathRecord>, BufferError> {
    let mut paths = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let Some(header) = buf.get(offset..offset + DRAW_PATH_HEADER) else {
            return Err(BufferError::Truncated { offset });
        };
        let id = header[0];
        if !id.is_finite() || id < 0.0 || id.fract() != 0.0 {
            return Err(BufferError::InvalidId { kind: "draw path", value: id });
        }
        let count = header[4];
        if !count.is_finite() || count < 0.0 || count.fract() != 0.0 {
            return Err(BufferError::InvalidId { kind: "draw path point count", value: count });
        }
        let count = count as usize;
        let start = offset + DRAW_PATH_HEADER;
        let end = start.saturating_add(count.saturating_mul(DRAW_POINT_STRIDE));
        let Some(body) = buf.get(start..end) else {
            return Err(BufferError::Truncated { offset });
        };
        let points = body
            .chunks_exact(DRAW_POINT_STRIDE)
            .map(|c| DrawPointRecord { x: c[0] as f32, y: c[1] as f32, pressure: c[2] as f32, timestamp: c[3] })
            .collect();
        paths.push(DrawPathRecord {
            id: id as u64,
            color: header[1] as u32,
            line_width: header[2] as f32,
            closed: header[3] > 0.0,
            points,
        });
        offset = end;
    }
    Ok(paths)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
