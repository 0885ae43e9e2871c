//! Resource binding context.
//!
//! One [`BindingContext`] exists per root surface. It holds the attached
//! engine (absent until the host surface is ready) and the registries that
//! let keyed descriptors find each other's resources. Controllers receive it
//! by `&mut` on every lifecycle call; nothing here is global.

use scrim_engine::resource::{Engine, RenderTargetParams};

use crate::error::{FxError, FxResult};
use crate::pass::PassRegistry;
use crate::target::{TargetHandle, TargetRegistry};

/// Outcome of [`BindingContext::resolve_target`].
#[derive(Debug, Clone)]
pub struct Resolved {
    pub handle: TargetHandle,
    /// `true` if the target was created by this call, `false` if reused.
    pub created: bool,
}

pub struct BindingContext {
    engine: Option<Box<dyn Engine>>,
    targets: TargetRegistry,
    passes: PassRegistry,
}

impl BindingContext {
    /// A context with no engine yet. Binds stay pending until [`attach`](Self::attach).
    pub fn new() -> Self {
        Self { engine: None, targets: TargetRegistry::new(), passes: PassRegistry::new() }
    }

    pub fn with_engine(engine: Box<dyn Engine>) -> Self {
        Self { engine: Some(engine), ..Self::new() }
    }

    /// Makes `engine` available to controllers.
    pub fn attach(&mut self, engine: Box<dyn Engine>) -> FxResult<()> {
        if self.engine.is_some() {
            return Err(FxError::AlreadyAttached);
        }
        self.engine = Some(engine);
        log::debug!("binding context: engine attached");
        Ok(())
    }

    /// Removes every registered pass and target, then hands the engine back.
    pub fn detach(&mut self) -> Option<Box<dyn Engine>> {
        self.passes.teardown_all();
        self.targets.teardown_all();
        let engine = self.engine.take();
        if engine.is_some() {
            log::debug!("binding context: engine detached");
        }
        engine
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine_mut(&mut self) -> FxResult<&mut (dyn Engine + 'static)> {
        self.engine.as_deref_mut().ok_or(FxError::NotAttached)
    }

    /// Live render targets, in creation order.
    pub fn render_targets(&self) -> &TargetRegistry {
        &self.targets
    }

    /// Live shader passes, in creation order.
    pub fn shader_passes(&self) -> &PassRegistry {
        &self.passes
    }

    pub(crate) fn passes_mut(&mut self) -> &mut PassRegistry {
        &mut self.passes
    }

    /// Finds the live target stamped with `key`, or creates one from `params`.
    ///
    /// Without a key a new target is always created. A reused target keeps its
    /// original params and gains an owner, cancelling any pending release.
    pub fn resolve_target(
        &mut self,
        key: Option<&str>,
        params: &RenderTargetParams,
    ) -> FxResult<Resolved> {
        if let Some(key) = key {
            if let Some(handle) = self.targets.find(key) {
                handle.adopt();
                log::debug!("render target {}: reused for key '{key}'", handle.id());
                return Ok(Resolved { handle, created: false });
            }
        }

        let backend = self.engine_mut()?.create_render_target(params);
        let handle = TargetHandle::new(backend, key.map(str::to_string), false);
        self.targets.insert(handle.clone());
        log::debug!("render target {}: created (key {:?})", handle.id(), key);
        Ok(Resolved { handle, created: true })
    }

    /// Creates a target that belongs to a single shader pass.
    ///
    /// It is registered so it shows up in [`render_targets`](Self::render_targets),
    /// but it is never shared by key and only its pass removes it.
    pub(crate) fn create_pass_target(&mut self, params: &RenderTargetParams) -> FxResult<TargetHandle> {
        let backend = self.engine_mut()?.create_render_target(params);
        let handle = TargetHandle::new(backend, None, true);
        self.targets.insert(handle.clone());
        Ok(handle)
    }
}

impl Default for BindingContext {
    fn default() -> Self {
        Self::new()
    }
}
