use crate::context::BindingContext;
use crate::inject::inject_target;
use crate::node::Node;

use super::{RenderTargetProps, TargetHandle};

/// Resolves one render target node to an engine target and wires its children to it.
#[derive(Debug, Default)]
pub struct RenderTargetController {
    handle: Option<TargetHandle>,
}

impl RenderTargetController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved target, if any.
    pub fn handle(&self) -> Option<&TargetHandle> {
        self.handle.as_ref()
    }

    /// Finds or creates the target for `props`.
    ///
    /// The first successful call settles the target for the lifetime of the
    /// mount; later calls return it again. `on_ready` fires only when this
    /// call created the target. `None` while the context has no engine.
    pub fn resolve(&mut self, ctx: &mut BindingContext, props: &RenderTargetProps) -> Option<TargetHandle> {
        if let Some(handle) = self.handle.as_ref().filter(|h| !h.is_removed()) {
            return Some(handle.clone());
        }
        let resolved = match ctx.resolve_target(props.unique_key.as_deref(), &props.init_params()) {
            Ok(resolved) => resolved,
            Err(err) => {
                log::trace!("render target: resolve pending: {err}");
                return None;
            }
        };
        if resolved.created {
            if let Some(f) = &props.on_ready {
                f(&resolved.handle);
            }
        }
        self.handle = Some(resolved.handle.clone());
        Some(resolved.handle)
    }

    /// The children to mount under this target.
    ///
    /// With auto-detection on they are stamped with the resolved target, and
    /// nothing is mounted until it resolves. With it off they pass through.
    pub fn children(&self, props: &RenderTargetProps, declared: &[Node]) -> Vec<Node> {
        if !props.auto_detect_children {
            return declared.to_vec();
        }
        match &self.handle {
            Some(handle) => inject_target(declared, handle, props.unique_key.as_deref()),
            None => Vec::new(),
        }
    }

    /// Owner unmount. Removal waits for attached planes and passes to let go.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.release() && !handle.is_removed() {
                log::trace!("render target {}: kept alive by {} attachment(s)", handle.id(), handle.attachments());
            }
        }
    }
}

impl Drop for RenderTargetController {
    fn drop(&mut self) {
        self.dispose();
    }
}
