use std::fmt;

/// Engine-assigned identity of a plane, render target or shader pass.
///
/// Ids are unique per engine instance and never reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host element a plane is laid over.
///
/// The engine reads the element's box to size and position the plane. The
/// effect layer treats it as an opaque label.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MountPoint(String);

impl MountPoint {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
