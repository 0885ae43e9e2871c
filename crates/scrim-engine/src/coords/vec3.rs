/// 3-component vector. Used for plane translation, rotation and transform origin.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Plane center, the engine's default transform origin.
    pub const CENTER: Vec3 = Vec3::new(0.5, 0.5, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Builds a vector from the first three entries of `v`.
    ///
    /// Returns `None` when `v` has fewer than three entries. A partial tuple is
    /// never padded with zeros.
    #[inline]
    pub fn from_slice(v: &[f32]) -> Option<Self> {
        match v {
            [x, y, z, ..] => Some(Self::new(*x, *y, *z)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_short_tuples() {
        assert_eq!(Vec3::from_slice(&[]), None);
        assert_eq!(Vec3::from_slice(&[1.0, 2.0]), None);
    }

    #[test]
    fn from_slice_takes_first_three() {
        assert_eq!(Vec3::from_slice(&[1.0, 2.0, 3.0]), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(Vec3::from_slice(&[1.0, 2.0, 3.0, 4.0]), Some(Vec3::new(1.0, 2.0, 3.0)));
    }
}
