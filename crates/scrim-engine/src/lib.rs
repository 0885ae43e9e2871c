//! Scrim engine crate.
//!
//! This crate owns the contract between the declarative effect layer
//! (`scrim-fx`) and the rendering engine that actually creates planes,
//! render targets and shader passes. It never draws anything itself.

pub mod coords;
pub mod headless;
pub mod logging;
pub mod resource;
