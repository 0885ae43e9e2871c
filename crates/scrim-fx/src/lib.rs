//! Scrim FX: declarative planes, render targets and shader passes on top of
//! `scrim-engine`.
//!
//! The host describes what should be on screen as a [`Node`](node::Node) tree
//! and hands it to a [`Stage`](stage::Stage) on every update. The stage keeps
//! one controller per mounted node and turns tree changes into the smallest
//! set of engine calls: planes are created once and patched in place, render
//! targets sharing a `unique_key` collapse into one engine target, and every
//! plane or pass declared below a render target is pointed at it.
//!
//! # Quick start
//!
//! ```rust
//! use scrim_engine::headless::HeadlessEngine;
//! use scrim_fx::prelude::*;
//!
//! let mut stage = Stage::with_engine(Box::new(HeadlessEngine::new()));
//! stage.render(vec![
//!     Node::render_target(RenderTargetProps::new().unique_key("fx1"))
//!         .child(Node::plane("hero", PlaneProps::new().fov(35.0)))
//!         .child(Node::shader_pass(PassProps::new().fragment_shader("void main() {}"))),
//! ]);
//!
//! let target = stage.context().render_targets().find("fx1").unwrap();
//! assert_eq!(target.attachments(), 2);
//! ```

pub mod context;
pub mod error;
pub mod inject;
pub mod node;
pub mod pass;
pub mod plane;
pub mod stage;
pub mod target;

/// The types needed to declare and mount a tree.
pub mod prelude {
    pub use crate::context::{BindingContext, Resolved};
    pub use crate::error::{FxError, FxResult};
    pub use crate::inject::{inject_target, map_tree};
    pub use crate::node::{Node, NodeKind};
    pub use crate::pass::{PassController, PassHandle, PassProps};
    pub use crate::plane::{PlaneController, PlaneProps};
    pub use crate::stage::Stage;
    pub use crate::target::{RenderTargetController, RenderTargetProps, TargetHandle};

    pub use scrim_engine::coords::{Vec2, Vec3};
    pub use scrim_engine::resource::{CullFace, DrawCheckMargins, MountPoint, Uniform, UniformValue};
}
