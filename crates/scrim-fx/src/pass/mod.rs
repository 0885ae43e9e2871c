//! Post-processing shader passes.
//!
//! Passes declared under the same `unique_key` collapse into one engine pass,
//! the same way keyed render targets do. Every mounted pass node counts as a
//! binder; the engine pass goes away with the last one.
//!
//! The engine reports into a single queue held by the handle. The oldest
//! binder still mounted is the listener and is the only one that drains it,
//! so the queue keeps being drained when the creator unmounts first.

mod controller;
mod props;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use scrim_engine::resource::{EventSink, PassEvent, PassResource, ResourceId};

use crate::target::TargetHandle;

pub use controller::PassController;
pub use props::{PassCallback, PassEvents, PassProps};

/// Identifies one binder of a shared pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct BinderId(u64);

// ── PassHandle ────────────────────────────────────────────────────────────

struct PassInner {
    id: ResourceId,
    key: Option<String>,
    backend: RefCell<Option<Box<dyn PassResource>>>,
    events: EventSink<PassEvent>,
    /// Mounted binders in bind order; the first one is the listener.
    binders: RefCell<Vec<BinderId>>,
    next_binder: Cell<u64>,
    /// External target the pass draws into; holds one attachment on it.
    attached: RefCell<Option<TargetHandle>>,
    /// Target created for this pass alone.
    owned: Option<TargetHandle>,
    render_order: Cell<i32>,
    depth_test: Cell<bool>,
}

/// Shared reference to one engine shader pass.
#[derive(Clone)]
pub struct PassHandle(Rc<PassInner>);

impl PassHandle {
    /// Wraps a freshly created engine pass. `events` must be the sink the
    /// engine was given. No binder is registered yet.
    pub(crate) fn new(
        backend: Box<dyn PassResource>,
        events: EventSink<PassEvent>,
        key: Option<String>,
        attached: Option<TargetHandle>,
        owned: Option<TargetHandle>,
        render_order: i32,
        depth_test: bool,
    ) -> Self {
        Self(Rc::new(PassInner {
            id: backend.id(),
            key,
            backend: RefCell::new(Some(backend)),
            events,
            binders: RefCell::new(Vec::new()),
            next_binder: Cell::new(0),
            attached: RefCell::new(attached),
            owned,
            render_order: Cell::new(render_order),
            depth_test: Cell::new(depth_test),
        }))
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.0.id
    }

    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.0.key.as_deref()
    }

    /// Mounted pass nodes sharing this pass.
    pub fn binders(&self) -> usize {
        self.0.binders.borrow().len()
    }

    /// Engine events queued and not yet delivered.
    pub fn pending_events(&self) -> usize {
        self.0.events.len()
    }

    pub fn is_removed(&self) -> bool {
        self.0.backend.borrow().is_none()
    }

    /// Target the pass currently draws into.
    pub fn target(&self) -> Option<TargetHandle> {
        self.0.attached.borrow().clone().or_else(|| self.0.owned.clone())
    }

    /// Target created for this pass when it was declared without one.
    pub fn owned_target(&self) -> Option<&TargetHandle> {
        self.0.owned.as_ref()
    }

    /// Runs `f` on the engine pass unless it has been removed.
    pub(crate) fn with_backend(&self, f: impl FnOnce(&mut dyn PassResource)) {
        if let Some(backend) = self.0.backend.borrow_mut().as_mut() {
            f(backend.as_mut());
        }
    }

    pub(crate) fn add_binder(&self) -> BinderId {
        let id = BinderId(self.0.next_binder.get());
        self.0.next_binder.set(id.0 + 1);
        self.0.binders.borrow_mut().push(id);
        id
    }

    pub(crate) fn is_listener(&self, binder: BinderId) -> bool {
        self.0.binders.borrow().first() == Some(&binder)
    }

    /// Drains the engine queue if `binder` is the listener; empty otherwise.
    pub(crate) fn take_events(&self, binder: BinderId) -> Vec<PassEvent> {
        if self.is_listener(binder) { self.0.events.take() } else { Vec::new() }
    }

    /// Points the pass at `target`, moving its attachment off the previous one.
    pub(crate) fn retarget(&self, target: &TargetHandle) {
        if self.0.attached.borrow().as_ref() == Some(target) {
            return;
        }
        if target.is_removed() {
            log::warn!("shader pass {}: render target {} already removed", self.id(), target.id());
            return;
        }
        target.attach();
        self.with_backend(|p| p.set_render_target(Some(target.id())));
        if let Some(old) = self.0.attached.replace(Some(target.clone())) {
            old.detach();
        }
        log::trace!("shader pass {}: render target -> {}", self.id(), target.id());
    }

    pub(crate) fn set_render_order(&self, order: i32) {
        if self.0.render_order.replace(order) != order {
            self.with_backend(|p| p.set_render_order(order));
        }
    }

    pub(crate) fn set_depth_test(&self, enabled: bool) {
        if self.0.depth_test.replace(enabled) != enabled {
            self.with_backend(|p| p.enable_depth_test(enabled));
        }
    }

    /// Drops `binder`. Returns `true` if that was the last and the pass is gone.
    ///
    /// When the listener leaves, the next oldest binder takes over the queue.
    pub(crate) fn release_binder(&self, binder: BinderId) -> bool {
        let left = {
            let mut binders = self.0.binders.borrow_mut();
            let was_listener = binders.first() == Some(&binder);
            binders.retain(|b| *b != binder);
            if was_listener && !binders.is_empty() {
                log::trace!("shader pass {}: events now go to binder {:?}", self.id(), binders[0]);
            }
            binders.len()
        };
        if left > 0 {
            log::trace!("shader pass {}: {left} binder(s) left", self.id());
            return false;
        }
        self.teardown();
        true
    }

    /// Removes the engine pass and lets go of its targets. Idempotent.
    pub(crate) fn teardown(&self) {
        let Some(mut backend) = self.0.backend.borrow_mut().take() else {
            return;
        };
        backend.remove();
        self.0.events.take();
        if let Some(target) = self.0.attached.borrow_mut().take() {
            target.detach();
        }
        if let Some(owned) = &self.0.owned {
            owned.teardown();
        }
        log::debug!("shader pass {}: removed", self.id());
    }
}

impl PartialEq for PassHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for PassHandle {}

impl fmt::Debug for PassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassHandle")
            .field("id", &self.id())
            .field("key", &self.key())
            .field("binders", &self.binders())
            .field("target", &self.target().map(|t| t.id()))
            .field("removed", &self.is_removed())
            .finish()
    }
}

// ── PassRegistry ──────────────────────────────────────────────────────────

/// Live shader passes of one binding context, in creation order.
#[derive(Debug, Default)]
pub struct PassRegistry {
    live: Vec<PassHandle>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PassHandle> {
        self.live.iter().filter(|p| !p.is_removed())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First live pass stamped with `key`.
    pub fn find(&self, key: &str) -> Option<PassHandle> {
        self.iter().find(|p| p.key() == Some(key)).cloned()
    }

    pub(crate) fn insert(&mut self, handle: PassHandle) {
        self.live.retain(|p| !p.is_removed());
        self.live.push(handle);
    }

    /// Removes every pass regardless of binders.
    pub(crate) fn teardown_all(&mut self) {
        for p in self.live.drain(..) {
            p.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_engine::headless::{Call, HeadlessEngine, Probe};
    use scrim_engine::resource::{Engine, EventSink, RenderTargetParams, ShaderPassParams};

    fn setup() -> (HeadlessEngine, Probe) {
        let engine = HeadlessEngine::new();
        let probe = engine.probe();
        (engine, probe)
    }

    fn target(engine: &mut HeadlessEngine) -> TargetHandle {
        TargetHandle::new(engine.create_render_target(&RenderTargetParams::default()), None, false)
    }

    fn pass(engine: &mut HeadlessEngine, attached: Option<TargetHandle>) -> (PassHandle, BinderId) {
        let events = EventSink::new();
        let backend = engine.create_shader_pass(
            &ShaderPassParams::default(),
            attached.as_ref().map(TargetHandle::id),
            events.clone(),
        );
        if let Some(t) = &attached {
            t.attach();
        }
        let handle = PassHandle::new(backend, events, Some("fx1".into()), attached, None, 0, true);
        let creator = handle.add_binder();
        (handle, creator)
    }

    #[test]
    fn last_binder_removes_pass_and_detaches() {
        let (mut engine, probe) = setup();
        let t = target(&mut engine);
        let (p, creator) = pass(&mut engine, Some(t.clone()));
        let other = p.add_binder();

        assert!(!p.release_binder(creator));
        assert_eq!(t.attachments(), 1);
        assert!(p.release_binder(other));
        assert!(p.is_removed());
        assert_eq!(t.attachments(), 0);
        assert_eq!(probe.count(|c| *c == Call::Remove { id: p.id() }), 1);
    }

    #[test]
    fn retarget_moves_attachment_once() {
        let (mut engine, probe) = setup();
        let a = target(&mut engine);
        let b = target(&mut engine);
        let (p, _) = pass(&mut engine, Some(a.clone()));
        probe.clear_calls();

        p.retarget(&b);
        p.retarget(&b);
        assert_eq!((a.attachments(), b.attachments()), (0, 1));
        assert_eq!(probe.calls(), vec![Call::SetRenderTarget { id: p.id(), target: Some(b.id()) }]);
    }

    #[test]
    fn unchanged_order_and_depth_write_nothing() {
        let (mut engine, probe) = setup();
        let (p, _) = pass(&mut engine, None);
        probe.clear_calls();

        p.set_render_order(0);
        p.set_depth_test(true);
        assert!(probe.calls().is_empty());

        p.set_render_order(4);
        p.set_depth_test(false);
        assert_eq!(probe.calls().len(), 2);
    }

    #[test]
    fn listener_role_moves_to_oldest_survivor() {
        let (mut engine, probe) = setup();
        let (p, creator) = pass(&mut engine, None);
        let second = p.add_binder();
        let third = p.add_binder();

        assert_eq!(p.take_events(second), Vec::new());
        assert_eq!(p.take_events(creator), vec![PassEvent::Ready]);

        p.release_binder(creator);
        probe.run_frame();
        assert!(p.take_events(third).is_empty());
        assert_eq!(p.take_events(second), vec![PassEvent::Render, PassEvent::AfterRender]);
        assert_eq!(p.pending_events(), 0);
    }

    #[test]
    fn teardown_drops_queued_events() {
        let (mut engine, probe) = setup();
        let (p, creator) = pass(&mut engine, None);
        probe.run_frame();
        assert!(p.release_binder(creator));
        assert_eq!(p.pending_events(), 0);
    }

    #[test]
    fn registry_finds_live_pass_by_key() {
        let (mut engine, _probe) = setup();
        let mut registry = PassRegistry::new();
        let (p, _) = pass(&mut engine, None);
        registry.insert(p.clone());
        assert_eq!(registry.find("fx1"), Some(p.clone()));

        registry.teardown_all();
        assert!(p.is_removed());
        assert!(registry.find("fx1").is_none());
    }
}
