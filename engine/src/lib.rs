//! Frame-stepped interaction, physics, particle, and drawing engine.
//!
//! This crate is compiled to WebAssembly and driven by a host UI once per
//! display frame. The host writes node, pointer, and particle state through
//! flat numeric buffers; [`engine::EngineCore::process_frame`] advances every
//! subsystem by `dt` and hands back dense buffers (transforms, particles,
//! events, draw paths) for the host to paint. Nothing here touches the DOM.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Frame orchestrator and testable [`engine::EngineCore`] |
//! | [`wasm`] | `wasm-bindgen` host boundary ([`wasm::SceneEngine`]) |
//! | [`scene`] | Node table and node flags |
//! | [`gesture`] | Pointer bindings, tap/drag/pinch recognition |
//! | [`physics`] | Constraints and the per-node stepper |
//! | [`particles`] | Capacity-bounded particle pool |
//! | [`paths`] | Freehand draw-path recorder |
//! | [`hit`] | Topmost-wins hit-testing |
//! | [`image`] | RGBA image registry and resampling |
//! | [`geom`] | Points, pinch and resample anchoring math |
//! | [`view`] | Scene-to-device view transform |
//! | [`error`] | [`error::EngineError`] |
//! | [`consts`] | Shared numeric limits and defaults |

pub mod consts;
pub mod engine;
pub mod error;
pub mod geom;
pub mod gesture;
pub mod hit;
pub mod image;
pub mod particles;
pub mod paths;
pub mod physics;
pub mod scene;
pub mod view;
pub mod wasm;

pub use engine::{EngineCore, EngineStats, FrameOutput};
pub use error::EngineError;
