//! In-memory engine that records every resource call.
//!
//! [`HeadlessEngine`] implements [`Engine`] without touching a GPU. It backs the
//! test suites and the studio binary. Keep a [`Probe`] around before boxing
//! the engine into a context: the probe shares the engine's state and can
//! read the call journal, fire events and fake texture attachments.
//!
//! ```rust
//! use scrim_engine::headless::{Call, HeadlessEngine};
//! use scrim_engine::resource::{Engine, EventSink, MountPoint, PlaneParams};
//!
//! let mut engine = HeadlessEngine::new();
//! let probe = engine.probe();
//! let mut plane = engine.create_plane(&MountPoint::new("hero"), &PlaneParams::default(), EventSink::new());
//! plane.set_perspective(35.0);
//! assert_eq!(probe.count(|c| matches!(c, Call::SetPerspective { .. })), 1);
//! ```

mod journal;
mod resources;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::resource::{
    Engine, EngineError, EventSink, MountPoint, PassEvent, PassResource, PlaneEvent, PlaneParams,
    PlaneResource, RenderTargetParams, ResourceId, ShaderPassParams, ShaderSource,
    TargetResource,
};

pub use journal::Call;

use resources::{HeadlessPass, HeadlessPlane, HeadlessTarget};

#[derive(Default)]
pub(crate) struct State {
    next_id: u64,
    pub(crate) calls: Vec<Call>,
    pub(crate) planes: BTreeMap<ResourceId, EventSink<PlaneEvent>>,
    pub(crate) passes: BTreeMap<ResourceId, EventSink<PassEvent>>,
    /// Live targets and their attached texture count.
    pub(crate) targets: BTreeMap<ResourceId, usize>,
}

impl State {
    fn alloc_id(&mut self) -> ResourceId {
        self.next_id += 1;
        ResourceId(self.next_id)
    }
}

pub(crate) type Shared = Rc<RefCell<State>>;

fn compile_check(fragment: &ShaderSource) -> Option<EngineError> {
    match fragment.source.as_deref() {
        Some(src) if src.trim().is_empty() => {
            Some(EngineError::shader_compile("fragment shader source is empty"))
        }
        _ => None,
    }
}

// ── HeadlessEngine ────────────────────────────────────────────────────────

/// Recording engine. See the module docs.
#[derive(Default)]
pub struct HeadlessEngine {
    state: Shared,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a probe sharing this engine's state.
    pub fn probe(&self) -> Probe {
        Probe { state: Rc::clone(&self.state) }
    }
}

impl Engine for HeadlessEngine {
    fn create_plane(
        &mut self,
        mount: &MountPoint,
        params: &PlaneParams,
        events: EventSink<PlaneEvent>,
    ) -> Box<dyn PlaneResource> {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.calls.push(Call::CreatePlane { id, mount: mount.label().to_string() });

        match compile_check(&params.fragment_shader) {
            Some(err) => events.push(PlaneEvent::Error(err)),
            None => events.push(PlaneEvent::Ready),
        }
        state.planes.insert(id, events);
        log::trace!("headless: plane {id} created on '{mount}'");

        Box::new(HeadlessPlane::new(id, params.fov, Rc::clone(&self.state)))
    }

    fn create_render_target(&mut self, params: &RenderTargetParams) -> Box<dyn TargetResource> {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.calls.push(Call::CreateTarget { id, depth: params.depth });
        state.targets.insert(id, 0);
        log::trace!("headless: render target {id} created");

        Box::new(HeadlessTarget::new(id, Rc::clone(&self.state)))
    }

    fn create_shader_pass(
        &mut self,
        params: &ShaderPassParams,
        target: Option<ResourceId>,
        events: EventSink<PassEvent>,
    ) -> Box<dyn PassResource> {
        let mut state = self.state.borrow_mut();
        let id = state.alloc_id();
        state.calls.push(Call::CreatePass { id, target });

        match compile_check(&params.fragment_shader) {
            Some(err) => events.push(PassEvent::Error(err)),
            None => events.push(PassEvent::Ready),
        }
        state.passes.insert(id, events);
        log::trace!("headless: shader pass {id} created");

        Box::new(HeadlessPass::new(id, Rc::clone(&self.state)))
    }
}

// ── Probe ─────────────────────────────────────────────────────────────────

/// Inspection and event-injection handle for a [`HeadlessEngine`].
#[derive(Clone)]
pub struct Probe {
    state: Shared,
}

impl Probe {
    /// Snapshot of every call recorded so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|&c| pred(c)).count()
    }

    /// Forget the journal. Live resources are unaffected.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_planes(&self) -> Vec<ResourceId> {
        self.state.borrow().planes.keys().copied().collect()
    }

    pub fn live_targets(&self) -> Vec<ResourceId> {
        self.state.borrow().targets.keys().copied().collect()
    }

    pub fn live_passes(&self) -> Vec<ResourceId> {
        self.state.borrow().passes.keys().copied().collect()
    }

    /// Queue `event` on a live plane. Returns `false` if the plane is gone.
    pub fn emit_plane(&self, id: ResourceId, event: PlaneEvent) -> bool {
        match self.state.borrow().planes.get(&id) {
            Some(sink) => {
                sink.push(event);
                true
            }
            None => false,
        }
    }

    /// Queue `event` on a live pass. Returns `false` if the pass is gone.
    pub fn emit_pass(&self, id: ResourceId, event: PassEvent) -> bool {
        match self.state.borrow().passes.get(&id) {
            Some(sink) => {
                sink.push(event);
                true
            }
            None => false,
        }
    }

    /// Fake a texture landing on a live target.
    pub fn attach_texture(&self, target: ResourceId) -> bool {
        match self.state.borrow_mut().targets.get_mut(&target) {
            Some(n) => {
                *n += 1;
                true
            }
            None => false,
        }
    }

    pub fn detach_texture(&self, target: ResourceId) -> bool {
        match self.state.borrow_mut().targets.get_mut(&target) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    /// One engine frame: `Render` then `AfterRender` on every live plane and pass.
    pub fn run_frame(&self) {
        let state = self.state.borrow();
        for sink in state.planes.values() {
            sink.push(PlaneEvent::Render);
            sink.push(PlaneEvent::AfterRender);
        }
        for sink in state.passes.values() {
            sink.push(PassEvent::Render);
            sink.push(PassEvent::AfterRender);
        }
    }
}
