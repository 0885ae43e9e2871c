//! Planes: the drawable surface descriptor and the controller that keeps one
//! engine plane in sync with it.

mod controller;
mod props;

pub use controller::PlaneController;
pub use props::{PlaneCallback, PlaneEvents, PlaneProps};
