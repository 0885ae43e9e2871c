/// 2-component vector. Used for plane scale.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Unit scale.
    pub const ONE: Vec2 = Vec2::new(1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Builds a vector from the first two entries of `v`.
    ///
    /// Returns `None` when `v` has fewer than two entries; extra entries are ignored.
    #[inline]
    pub fn from_slice(v: &[f32]) -> Option<Self> {
        match v {
            [x, y, ..] => Some(Self::new(*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_needs_two_components() {
        assert_eq!(Vec2::from_slice(&[]), None);
        assert_eq!(Vec2::from_slice(&[3.0]), None);
        assert_eq!(Vec2::from_slice(&[3.0, 4.0]), Some(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn from_slice_ignores_extra_components() {
        assert_eq!(Vec2::from_slice(&[1.0, 2.0, 9.0]), Some(Vec2::new(1.0, 2.0)));
    }
}
