//! Resource contracts between the effect layer and the rendering engine.
//!
//! Responsibilities:
//! - init params (with the engine's defaults) for planes, render targets and passes
//! - the object-safe resource traits the controllers drive
//! - the event vocabulary the engine reports back through an [`EventSink`]
//!
//! Extending the boundary:
//! - add the setter to the resource trait
//! - record it in `headless::Call`
//! - patch it from the owning controller in `scrim-fx`

mod engine;
mod error;
mod event;
mod id;
mod params;

pub use engine::{Engine, PassResource, PlaneResource, TargetResource};
pub use error::{EngineError, EngineErrorKind};
pub use event::{EventSink, PassEvent, PlaneEvent, TextureInfo};
pub use id::{MountPoint, ResourceId};
pub use params::{
    CullFace, DrawCheckMargins, PlaneParams, RenderTargetParams, ShaderPassParams, ShaderSource,
    TextureFilter, TextureOptions, Uniform, UniformValue,
};
