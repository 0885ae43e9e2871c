use scrim_engine::resource::{EventSink, PassEvent, PassResource, ResourceId};

use crate::context::BindingContext;
use crate::target::TargetHandle;

use super::{BinderId, PassCallback, PassEvents, PassHandle, PassProps};

struct Bound {
    pass: PassHandle,
    binder: BinderId,
    /// Render target this binder last declared. Binders sharing a pass may
    /// declare different targets; only a change in this binder's own
    /// declaration moves the pass.
    declared: Option<TargetHandle>,
}

fn fire(slot: &Option<PassCallback>, pass: &mut dyn PassResource) {
    if let Some(f) = slot {
        f(pass);
    }
}

/// Keeps one mounted pass node bound to an engine shader pass.
pub struct PassController {
    bound: Option<Bound>,
    events: PassEvents,
}

impl PassController {
    pub fn new() -> Self {
        Self { bound: None, events: PassEvents::default() }
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn id(&self) -> Option<ResourceId> {
        self.bound.as_ref().map(|b| b.pass.id())
    }

    pub fn handle(&self) -> Option<&PassHandle> {
        self.bound.as_ref().map(|b| &b.pass)
    }

    /// `true` if this binder currently receives the pass's engine events.
    pub fn is_listener(&self) -> bool {
        self.bound.as_ref().is_some_and(|b| b.pass.is_listener(b.binder))
    }

    /// Binds to the live pass sharing `props.unique_key`, or creates one.
    ///
    /// A new pass draws into `props.render_target`; without one it gets a
    /// target of its own. A reused pass keeps the target it already has.
    /// Returns `None` while the context has no engine.
    pub fn bind(&mut self, ctx: &mut BindingContext, props: &PassProps) -> Option<ResourceId> {
        if let Some(bound) = &self.bound {
            return Some(bound.pass.id());
        }
        if !ctx.is_ready() {
            log::trace!("shader pass: bind pending, no engine yet");
            return None;
        }
        self.events = props.events.clone();
        let declared = props.render_target.clone();

        if let Some(pass) = props.unique_key.as_deref().and_then(|k| ctx.shader_passes().find(k)) {
            let binder = pass.add_binder();
            let id = pass.id();
            log::debug!("shader pass {id}: reused for key {:?}, {} binder(s)", pass.key(), pass.binders());
            self.bound = Some(Bound { pass, binder, declared });
            return Some(id);
        }

        let params = props.init_params();
        let owned = match &props.render_target {
            Some(target) if !target.is_removed() => None,
            _ => match ctx.create_pass_target(&props.owned_target_params()) {
                Ok(owned) => Some(owned),
                Err(err) => {
                    log::warn!("shader pass: could not create its render target: {err}");
                    return None;
                }
            },
        };
        let attached = if owned.is_some() { None } else { props.render_target.clone() };

        if let Some(f) = &self.events.on_before_create {
            f();
        }
        let target_id = attached.as_ref().or(owned.as_ref()).map(TargetHandle::id);
        let events = EventSink::new();
        let backend = match ctx.engine_mut() {
            Ok(engine) => engine.create_shader_pass(&params, target_id, events.clone()),
            Err(err) => {
                log::warn!("shader pass: {err}");
                if let Some(owned) = &owned {
                    owned.teardown();
                }
                return None;
            }
        };
        if let Some(target) = &attached {
            target.attach();
        }
        let pass = PassHandle::new(
            backend,
            events,
            props.unique_key.clone(),
            attached,
            owned,
            params.render_order,
            params.depth_test,
        );
        let binder = pass.add_binder();
        ctx.passes_mut().insert(pass.clone());

        let id = pass.id();
        log::debug!("shader pass {id}: created (key {:?})", pass.key());
        self.bound = Some(Bound { pass, binder, declared });
        Some(id)
    }

    /// Writes changed render target, render order and depth test. No-op until bound.
    pub fn patch(&mut self, props: &PassProps) {
        self.events = props.events.clone();
        let Some(bound) = self.bound.as_mut() else {
            return;
        };
        if let Some(target) = &props.render_target {
            if bound.declared.as_ref() != Some(target) {
                bound.pass.retarget(target);
                bound.declared = Some(target.clone());
            }
        }
        if let Some(order) = props.render_order {
            bound.pass.set_render_order(order);
        }
        if let Some(enabled) = props.depth_test {
            bound.pass.set_depth_test(enabled);
        }
    }

    /// Forwards queued engine events to the callback slots. Only the
    /// listening binder drains the queue; for the others this is a no-op.
    pub fn pump(&mut self) {
        let Some(bound) = &self.bound else {
            return;
        };
        let events = &self.events;
        for event in bound.pass.take_events(bound.binder) {
            bound.pass.with_backend(|pass| match event {
                PassEvent::AfterRender => fire(&events.on_after_render, pass),
                PassEvent::AfterResize => fire(&events.on_after_resize, pass),
                PassEvent::Error(err) => {
                    log::debug!("shader pass {}: engine error: {err}", pass.id());
                    if let Some(f) = &events.on_error {
                        f(pass, &err);
                    }
                }
                PassEvent::Loading(texture) => {
                    if let Some(f) = &events.on_loading {
                        f(pass, &texture);
                    }
                }
                PassEvent::Ready => fire(&events.on_ready, pass),
                PassEvent::Render => fire(&events.on_render, pass),
            });
        }
    }

    /// Lets go of the pass. The last binder removes it. Idempotent.
    pub fn dispose(&mut self) {
        let Some(bound) = self.bound.take() else {
            return;
        };
        bound.pass.with_backend(|pass| fire(&self.events.on_before_remove, pass));
        bound.pass.release_binder(bound.binder);
    }
}

impl Default for PassController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PassController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use scrim_engine::headless::{Call, HeadlessEngine, Probe};
    use scrim_engine::resource::RenderTargetParams;

    use super::*;

    fn ready_ctx() -> (BindingContext, Probe) {
        let engine = HeadlessEngine::new();
        let probe = engine.probe();
        (BindingContext::with_engine(Box::new(engine)), probe)
    }

    fn creates(probe: &Probe) -> usize {
        probe.count(|c| matches!(c, Call::CreatePass { .. }))
    }

    #[test]
    fn pass_without_target_gets_its_own() {
        let (mut ctx, probe) = ready_ctx();
        let mut c = PassController::new();
        let id = c.bind(&mut ctx, &PassProps::new()).unwrap();

        let owned = c.handle().unwrap().owned_target().cloned().unwrap();
        assert!(owned.is_pass_owned());
        assert_eq!(probe.calls()[1], Call::CreatePass { id, target: Some(owned.id()) });
        assert_eq!(ctx.render_targets().len(), 1);

        c.dispose();
        assert!(owned.is_removed());
        assert!(probe.live_targets().is_empty());
        assert!(probe.live_passes().is_empty());
    }

    #[test]
    fn given_target_is_attached_not_owned() {
        let (mut ctx, _probe) = ready_ctx();
        let t = ctx.resolve_target(Some("fx1"), &RenderTargetParams::default()).unwrap().handle;
        let mut c = PassController::new();
        c.bind(&mut ctx, &PassProps::new().render_target(t.clone()));

        assert_eq!(t.attachments(), 1);
        assert!(c.handle().unwrap().owned_target().is_none());
        c.dispose();
        c.dispose();
        assert_eq!(t.attachments(), 0);
        assert!(!t.is_removed());
    }

    #[test]
    fn same_key_shares_one_engine_pass() {
        let (mut ctx, probe) = ready_ctx();
        let t = ctx.resolve_target(Some("fx1"), &RenderTargetParams::default()).unwrap().handle;
        let props = PassProps::new().render_target(t.clone()).unique_key("fx1");
        let mut a = PassController::new();
        let mut b = PassController::new();

        assert_eq!(a.bind(&mut ctx, &props), b.bind(&mut ctx, &props));
        assert_eq!(creates(&probe), 1);
        assert_eq!(a.handle().unwrap().binders(), 2);
        assert_eq!(t.attachments(), 1);

        a.dispose();
        assert!(probe.live_passes().len() == 1);
        b.dispose();
        assert!(probe.live_passes().is_empty());
        assert_eq!(t.attachments(), 0);
    }

    #[test]
    fn bind_waits_for_engine() {
        let mut ctx = BindingContext::new();
        let mut c = PassController::new();
        assert_eq!(c.bind(&mut ctx, &PassProps::new()), None);
        c.patch(&PassProps::new().render_order(2));
        assert!(!c.is_bound());

        let engine = HeadlessEngine::new();
        let probe = engine.probe();
        ctx.attach(Box::new(engine)).unwrap();
        assert!(c.bind(&mut ctx, &PassProps::new()).is_some());
        assert_eq!(creates(&probe), 1);
    }

    #[test]
    fn patch_writes_only_changes() {
        let (mut ctx, probe) = ready_ctx();
        let a = ctx.resolve_target(None, &RenderTargetParams::default()).unwrap().handle;
        let b = ctx.resolve_target(None, &RenderTargetParams::default()).unwrap().handle;
        let mut c = PassController::new();
        let id = c.bind(&mut ctx, &PassProps::new().render_target(a.clone())).unwrap();
        probe.clear_calls();

        c.patch(&PassProps::new().render_target(a.clone()).render_order(0).depth_test(true));
        assert!(probe.calls().is_empty());

        c.patch(&PassProps::new().render_target(b.clone()).render_order(5));
        assert_eq!(
            probe.calls(),
            vec![
                Call::SetRenderTarget { id, target: Some(b.id()) },
                Call::SetRenderOrder { id, order: 5 },
            ]
        );
        assert_eq!((a.attachments(), b.attachments()), (0, 1));
    }

    fn tagged(heard: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> PassProps {
        let heard = heard.clone();
        PassProps::new()
            .unique_key("fx1")
            .on_render(move |_: &mut dyn PassResource| heard.borrow_mut().push(tag))
    }

    #[test]
    fn only_the_listener_hears_engine_events() {
        let (mut ctx, probe) = ready_ctx();
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut a = PassController::new();
        let mut b = PassController::new();
        a.bind(&mut ctx, &tagged(&heard, "a"));
        b.bind(&mut ctx, &tagged(&heard, "b"));
        assert!(a.is_listener());
        assert!(!b.is_listener());

        probe.run_frame();
        b.pump();
        a.pump();
        assert_eq!(*heard.borrow(), vec!["a"]);
    }

    #[test]
    fn survivor_takes_over_events_when_creator_leaves() {
        let (mut ctx, probe) = ready_ctx();
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut a = PassController::new();
        let mut b = PassController::new();
        a.bind(&mut ctx, &tagged(&heard, "a"));
        b.bind(&mut ctx, &tagged(&heard, "b"));

        a.dispose();
        assert!(b.is_listener());
        for _ in 0..100 {
            probe.run_frame();
        }
        let pass = b.handle().unwrap().clone();
        assert_eq!(pass.pending_events(), 201);

        b.pump();
        assert_eq!(heard.borrow().len(), 100);
        assert!(heard.borrow().iter().all(|t| *t == "b"));
        assert_eq!(pass.pending_events(), 0);
    }

    #[test]
    fn binders_declaring_different_targets_do_not_flip_the_pass() {
        let (mut ctx, probe) = ready_ctx();
        let t1 = ctx.resolve_target(None, &RenderTargetParams::default()).unwrap().handle;
        let t2 = ctx.resolve_target(None, &RenderTargetParams::default()).unwrap().handle;
        let pa = PassProps::new().unique_key("blur").render_target(t1.clone());
        let pb = PassProps::new().unique_key("blur").render_target(t2.clone());
        let mut a = PassController::new();
        let mut b = PassController::new();
        a.bind(&mut ctx, &pa);
        a.patch(&pa);
        b.bind(&mut ctx, &pb);
        b.patch(&pb);

        for _ in 0..5 {
            a.patch(&pa);
            b.patch(&pb);
        }
        assert_eq!(probe.count(|c| matches!(c, Call::SetRenderTarget { .. })), 0);
        assert_eq!(a.handle().unwrap().target(), Some(t1.clone()));

        // A change in b's own declaration still moves the pass.
        let t3 = ctx.resolve_target(None, &RenderTargetParams::default()).unwrap().handle;
        b.patch(&PassProps::new().unique_key("blur").render_target(t3.clone()));
        assert_eq!(probe.count(|c| matches!(c, Call::SetRenderTarget { .. })), 1);
        assert_eq!((t1.attachments(), t3.attachments()), (0, 1));
    }

    #[test]
    fn before_create_runs_only_for_created_pass() {
        let (mut ctx, _probe) = ready_ctx();
        let created = Rc::new(RefCell::new(0));
        let props = {
            let created = created.clone();
            PassProps::new().unique_key("k").on_before_create(move || *created.borrow_mut() += 1)
        };
        let mut a = PassController::new();
        let mut b = PassController::new();
        a.bind(&mut ctx, &props);
        b.bind(&mut ctx, &props);
        assert_eq!(*created.borrow(), 1);
    }

    #[test]
    fn before_remove_runs_for_every_binder() {
        let (mut ctx, _probe) = ready_ctx();
        let removed = Rc::new(RefCell::new(0));
        let props = {
            let removed = removed.clone();
            PassProps::new()
                .unique_key("k")
                .on_before_remove(move |_: &mut dyn PassResource| *removed.borrow_mut() += 1)
        };
        let mut a = PassController::new();
        let mut b = PassController::new();
        a.bind(&mut ctx, &props);
        b.bind(&mut ctx, &props);
        drop(a);
        drop(b);
        assert_eq!(*removed.borrow(), 2);
    }
}
