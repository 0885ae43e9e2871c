/// Category of an engine-side failure.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EngineErrorKind {
    /// Vertex or fragment shader failed to compile or link.
    ShaderCompile,
    /// A texture source could not be loaded or uploaded.
    TextureLoad,
    /// The drawing context was lost or could not be created.
    Context,
}

/// Failure reported by the engine through a resource's error event.
///
/// The effect layer never wraps or retries these; they reach the caller's
/// `on_error` slot exactly as the engine produced them.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{kind:?}: {message}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn shader_compile(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::ShaderCompile, message)
    }

    pub fn texture_load(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::TextureLoad, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_and_message() {
        let e = EngineError::shader_compile("missing main");
        assert_eq!(e.to_string(), "ShaderCompile: missing main");
    }
}
