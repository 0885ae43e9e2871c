//! Vector value objects handed to the engine for plane transforms.
//!
//! Plane space conventions follow the engine:
//! - translation is relative to the plane's DOM-derived position, in CSS pixels
//! - rotation is in radians around X, Y, Z
//! - transform origin is normalized (`0.5, 0.5, 0.0` is the plane center)

mod vec2;
mod vec3;

pub use vec2::Vec2;
pub use vec3::Vec3;
