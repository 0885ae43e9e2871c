/// Errors raised by the binding context itself.
///
/// Engine failures (shader compile, texture load) are not represented here;
/// they travel through the resources' event slots.
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum FxError {
    #[error("binding context already has an engine attached")]
    AlreadyAttached,

    #[error("binding context has no engine attached")]
    NotAttached,
}

pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable() {
        assert!(FxError::AlreadyAttached.to_string().contains("already"));
        assert!(FxError::NotAttached.to_string().contains("no engine"));
    }
}
