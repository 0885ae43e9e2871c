use scrim_engine::resource::{Engine, MountPoint};

use crate::context::BindingContext;
use crate::error::FxResult;
use crate::node::{Node, NodeKind};
use crate::pass::PassController;
use crate::plane::PlaneController;
use crate::target::RenderTargetController;

// ── Mounted ───────────────────────────────────────────────────────────────

/// A node instance that survives across [`Stage::render`] calls.
enum Mounted {
    Plane { ctl: PlaneController, children: Vec<Mounted> },
    Pass { ctl: PassController, children: Vec<Mounted> },
    Target { ctl: RenderTargetController, children: Vec<Mounted> },
    Element { children: Vec<Mounted> },
    Text,
}

impl Mounted {
    fn empty(node: &Node) -> Self {
        match node {
            Node::Plane(p) => Mounted::Plane { ctl: PlaneController::new(p.mount.clone()), children: Vec::new() },
            Node::ShaderPass(_) => Mounted::Pass { ctl: PassController::new(), children: Vec::new() },
            Node::RenderTarget(_) => {
                Mounted::Target { ctl: RenderTargetController::new(), children: Vec::new() }
            }
            Node::Element(_) => Mounted::Element { children: Vec::new() },
            Node::Text(_) => Mounted::Text,
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            Mounted::Plane { .. } => NodeKind::Plane,
            Mounted::Pass { .. } => NodeKind::ShaderPass,
            Mounted::Target { .. } => NodeKind::RenderTarget,
            Mounted::Element { .. } => NodeKind::Element,
            Mounted::Text => NodeKind::Text,
        }
    }

    fn mount_point(&self) -> Option<&MountPoint> {
        match self {
            Mounted::Plane { ctl, .. } => Some(ctl.mount()),
            _ => None,
        }
    }

    /// `true` if `node` can be applied to this instance as an update.
    fn accepts(&self, node: &Node) -> bool {
        match node {
            Node::Plane(p) => self.mount_point() == Some(&p.mount),
            _ => self.kind() == node.kind(),
        }
    }

    fn update(&mut self, ctx: &mut BindingContext, node: &Node) {
        match (self, node) {
            (Mounted::Plane { ctl, children }, Node::Plane(p)) => {
                ctl.bind(ctx, &p.props);
                ctl.patch(&p.props);
                reconcile(ctx, children, &p.children);
            }
            (Mounted::Pass { ctl, children }, Node::ShaderPass(p)) => {
                ctl.bind(ctx, &p.props);
                ctl.patch(&p.props);
                reconcile(ctx, children, &p.children);
            }
            (Mounted::Target { ctl, children }, Node::RenderTarget(t)) => {
                ctl.resolve(ctx, &t.props);
                let declared = ctl.children(&t.props, &t.children);
                reconcile(ctx, children, &declared);
            }
            (Mounted::Element { children }, Node::Element(e)) => {
                reconcile(ctx, children, &e.children);
            }
            (Mounted::Text, Node::Text(_)) => {}
            (m, n) => log::warn!("stage: {:?} update applied to a {:?} instance", n.kind(), m.kind()),
        }
    }

    fn pump(&mut self) {
        match self {
            Mounted::Plane { ctl, children } => {
                ctl.pump();
                children.iter_mut().for_each(Mounted::pump);
            }
            Mounted::Pass { ctl, children } => {
                ctl.pump();
                children.iter_mut().for_each(Mounted::pump);
            }
            Mounted::Target { children, .. } | Mounted::Element { children } => {
                children.iter_mut().for_each(Mounted::pump);
            }
            Mounted::Text => {}
        }
    }

    /// Disposes the subtree, children before their parent.
    fn unmount(self) {
        match self {
            Mounted::Plane { mut ctl, children } => {
                unmount_all(children);
                ctl.dispose();
            }
            Mounted::Pass { mut ctl, children } => {
                unmount_all(children);
                ctl.dispose();
            }
            Mounted::Target { mut ctl, children } => {
                unmount_all(children);
                ctl.dispose();
            }
            Mounted::Element { children } => unmount_all(children),
            Mounted::Text => {}
        }
    }
}

fn unmount_all(children: Vec<Mounted>) {
    for child in children.into_iter().rev() {
        child.unmount();
    }
}

/// Brings `mounted` in line with `nodes`, slot by slot.
fn reconcile(ctx: &mut BindingContext, mounted: &mut Vec<Mounted>, nodes: &[Node]) {
    while mounted.len() > nodes.len() {
        if let Some(surplus) = mounted.pop() {
            surplus.unmount();
        }
    }
    for (i, node) in nodes.iter().enumerate() {
        match mounted.get_mut(i) {
            Some(slot) if slot.accepts(node) => slot.update(ctx, node),
            Some(slot) => {
                let old = std::mem::replace(slot, Mounted::empty(node));
                old.unmount();
                slot.update(ctx, node);
            }
            None => {
                let mut fresh = Mounted::empty(node);
                fresh.update(ctx, node);
                mounted.push(fresh);
            }
        }
    }
}

// ── Stage ─────────────────────────────────────────────────────────────────

/// Owns a binding context and the instances mounted from the host's tree.
///
/// Each [`render`](Self::render) call hands over the whole declared tree; the
/// stage matches it against what is mounted by position and kind. Nothing is
/// created on the engine until one is attached.
///
/// # Example
///
/// ```rust
/// use scrim_engine::headless::HeadlessEngine;
/// use scrim_fx::prelude::*;
///
/// let mut stage = Stage::new();
/// stage.render(vec![Node::render_target(RenderTargetProps::new().unique_key("fx1"))
///     .child(Node::plane("hero", PlaneProps::new()))]);
/// assert!(stage.context().render_targets().is_empty());
///
/// stage.attach_engine(Box::new(HeadlessEngine::new())).unwrap();
/// assert_eq!(stage.context().render_targets().len(), 1);
/// ```
pub struct Stage {
    ctx: BindingContext,
    tree: Vec<Node>,
    mounted: Vec<Mounted>,
}

impl Stage {
    pub fn new() -> Self {
        Self { ctx: BindingContext::new(), tree: Vec::new(), mounted: Vec::new() }
    }

    pub fn with_engine(engine: Box<dyn Engine>) -> Self {
        Self { ctx: BindingContext::with_engine(engine), tree: Vec::new(), mounted: Vec::new() }
    }

    pub fn context(&self) -> &BindingContext {
        &self.ctx
    }

    /// Attaches `engine` and binds everything that was waiting for it.
    pub fn attach_engine(&mut self, engine: Box<dyn Engine>) -> FxResult<()> {
        self.ctx.attach(engine)?;
        let tree = self.tree.clone();
        reconcile(&mut self.ctx, &mut self.mounted, &tree);
        Ok(())
    }

    /// Disposes every mounted instance and hands the engine back.
    ///
    /// The last tree is kept; attaching another engine mounts it again.
    pub fn detach_engine(&mut self) -> Option<Box<dyn Engine>> {
        unmount_all(std::mem::take(&mut self.mounted));
        self.ctx.detach()
    }

    /// Reconciles the mounted instances against `tree`.
    pub fn render(&mut self, tree: Vec<Node>) {
        reconcile(&mut self.ctx, &mut self.mounted, &tree);
        self.tree = tree;
    }

    /// Delivers queued engine events to the callback slots of every mounted node.
    pub fn pump_events(&mut self) {
        self.mounted.iter_mut().for_each(Mounted::pump);
    }

    /// Disposes everything and forgets the tree. The engine stays attached.
    pub fn unmount(&mut self) {
        unmount_all(std::mem::take(&mut self.mounted));
        self.tree.clear();
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        unmount_all(std::mem::take(&mut self.mounted));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use scrim_engine::headless::{Call, HeadlessEngine, Probe};
    use scrim_engine::resource::{PlaneResource, ResourceId};

    use super::*;
    use crate::pass::PassProps;
    use crate::plane::PlaneProps;
    use crate::target::RenderTargetProps;

    fn stage() -> (Stage, Probe) {
        let engine = HeadlessEngine::new();
        let probe = engine.probe();
        (Stage::with_engine(Box::new(engine)), probe)
    }

    fn fx1(children: Vec<Node>) -> Node {
        Node::render_target(RenderTargetProps::new().unique_key("fx1")).with_children(children)
    }

    fn plane(mount: &str) -> Node {
        Node::plane(mount, PlaneProps::new())
    }

    fn targets_of(probe: &Probe) -> Vec<Option<ResourceId>> {
        probe
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetRenderTarget { target, .. } => Some(target),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn keyed_siblings_draw_into_one_target() {
        let (mut stage, probe) = stage();
        stage.render(vec![fx1(vec![plane("a")]), fx1(vec![plane("b")])]);

        assert_eq!(probe.count(|c| matches!(c, Call::CreateTarget { .. })), 1);
        let t = stage.context().render_targets().find("fx1").unwrap();
        assert_eq!(t.attachments(), 2);
        assert_eq!(t.owners(), 2);
        assert_eq!(targets_of(&probe), vec![Some(t.id()), Some(t.id())]);
    }

    #[test]
    fn pass_under_keyed_target_inherits_key() {
        let (mut stage, probe) = stage();
        stage.render(vec![fx1(vec![Node::element("div").child(Node::shader_pass(PassProps::new()))])]);

        let t = stage.context().render_targets().find("fx1").unwrap();
        let pass = stage.context().shader_passes().find("fx1").unwrap();
        assert_eq!(pass.target(), Some(t.clone()));
        assert!(pass.owned_target().is_none());
        assert_eq!(probe.calls()[1], Call::CreatePass { id: pass.id(), target: Some(t.id()) });
    }

    #[test]
    fn shared_target_outlives_its_first_owner() {
        let (mut stage, probe) = stage();
        stage.render(vec![fx1(vec![plane("a")]), fx1(vec![plane("b")])]);
        let t = stage.context().render_targets().find("fx1").unwrap();
        probe.attach_texture(t.id());

        stage.render(vec![Node::element("div"), fx1(vec![plane("b")])]);
        assert!(!t.is_removed());
        assert_eq!((t.owners(), t.attachments()), (1, 1));

        stage.render(vec![Node::element("div"), fx1(Vec::new())]);
        assert!(!t.is_removed());
        assert_eq!(t.texture_count(), 1);

        stage.render(Vec::new());
        assert!(t.is_removed());
        assert!(probe.live_targets().is_empty());
        assert!(probe.live_planes().is_empty());
    }

    #[test]
    fn last_owner_gone_waits_for_remaining_attachment() {
        let (mut stage, _probe) = stage();
        let t = {
            stage.render(vec![fx1(Vec::new())]);
            stage.context().render_targets().find("fx1").unwrap()
        };
        // Wired by hand, outside the target node.
        stage.render(vec![fx1(Vec::new()), Node::plane("loose", PlaneProps::new().target(t.clone()))]);
        assert_eq!(t.attachments(), 1);

        stage.render(vec![Node::text("gone"), Node::plane("loose", PlaneProps::new().target(t.clone()))]);
        assert!(t.is_release_pending());
        assert!(!t.is_removed());

        stage.render(Vec::new());
        assert!(t.is_removed());
    }

    #[test]
    fn pending_tree_binds_on_attach() {
        let mut stage = Stage::new();
        stage.render(vec![fx1(vec![plane("a"), Node::shader_pass(PassProps::new())])]);
        stage.pump_events();

        let engine = HeadlessEngine::new();
        let probe = engine.probe();
        stage.attach_engine(Box::new(engine)).unwrap();

        assert_eq!(probe.live_targets().len(), 1);
        assert_eq!(probe.live_planes().len(), 1);
        assert_eq!(probe.live_passes().len(), 1);
        assert!(stage.attach_engine(Box::new(HeadlessEngine::new())).is_err());
    }

    #[test]
    fn unmount_while_pending_is_clean() {
        let mut stage = Stage::new();
        stage.render(vec![fx1(vec![plane("a")]), plane("b")]);
        stage.unmount();
        stage.unmount();

        let engine = HeadlessEngine::new();
        let probe = engine.probe();
        stage.attach_engine(Box::new(engine)).unwrap();
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn kind_swap_disposes_then_mounts() {
        let (mut stage, probe) = stage();
        stage.render(vec![plane("a")]);
        let plane_id = probe.live_planes()[0];

        stage.render(vec![Node::shader_pass(PassProps::new())]);
        assert!(probe.live_planes().is_empty());
        assert_eq!(probe.live_passes().len(), 1);
        assert!(probe.calls().contains(&Call::Remove { id: plane_id }));
    }

    #[test]
    fn new_mount_point_remounts_plane() {
        let (mut stage, probe) = stage();
        stage.render(vec![plane("a")]);
        stage.render(vec![plane("a")]);
        assert_eq!(probe.count(|c| matches!(c, Call::CreatePlane { .. })), 1);

        stage.render(vec![plane("b")]);
        assert_eq!(probe.count(|c| matches!(c, Call::CreatePlane { .. })), 2);
        assert_eq!(probe.live_planes().len(), 1);
    }

    #[test]
    fn children_dispose_before_parent() {
        let (mut stage, probe) = stage();
        let order = Rc::new(RefCell::new(Vec::new()));
        let tagged = |mount: &'static str| {
            let order = order.clone();
            Node::plane(
                mount,
                PlaneProps::new().on_before_remove(move |_: &mut dyn PlaneResource| order.borrow_mut().push(mount)),
            )
        };
        stage.render(vec![tagged("outer").child(tagged("inner"))]);
        stage.unmount();

        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
        assert!(probe.live_planes().is_empty());
    }

    #[test]
    fn detach_and_reattach_replays_tree() {
        let (mut stage, probe) = stage();
        stage.render(vec![fx1(vec![plane("a")])]);

        let engine = stage.detach_engine();
        assert!(engine.is_some());
        assert!(probe.live_planes().is_empty());
        assert!(probe.live_targets().is_empty());

        let fresh = HeadlessEngine::new();
        let fresh_probe = fresh.probe();
        stage.attach_engine(Box::new(fresh)).unwrap();
        assert_eq!(fresh_probe.live_planes().len(), 1);
        assert_eq!(fresh_probe.live_targets().len(), 1);
    }

    #[test]
    fn pump_reaches_nested_nodes() {
        let (mut stage, probe) = stage();
        let frames = Rc::new(RefCell::new(0));
        let props = {
            let frames = frames.clone();
            PlaneProps::new().on_render(move |_: &mut dyn PlaneResource| *frames.borrow_mut() += 1)
        };
        stage.render(vec![fx1(vec![Node::element("section").child(Node::plane("deep", props))])]);

        probe.run_frame();
        probe.run_frame();
        stage.pump_events();
        assert_eq!(*frames.borrow(), 2);
    }

    #[test]
    fn shared_pass_under_two_targets_stays_put() {
        let (mut stage, probe) = stage();
        let tree = || {
            let blur = || Node::shader_pass(PassProps::new().unique_key("blur"));
            vec![
                Node::render_target(RenderTargetProps::new()).child(blur()),
                Node::render_target(RenderTargetProps::new()).child(blur()),
            ]
        };
        stage.render(tree());
        assert_eq!(probe.live_passes().len(), 1);
        let pass = stage.context().shader_passes().find("blur").unwrap();
        let first = pass.target().unwrap();
        probe.clear_calls();

        for _ in 0..5 {
            stage.render(tree());
        }
        assert!(targets_of(&probe).is_empty());
        assert_eq!(pass.target(), Some(first));
    }

    #[test]
    fn auto_detect_toggle_keeps_plane_attached() {
        let (mut stage, probe) = stage();
        let tree = |props: RenderTargetProps| vec![Node::render_target(props).child(plane("a"))];

        stage.render(tree(RenderTargetProps::new()));
        let t = stage.context().render_targets().iter().next().cloned().unwrap();
        assert_eq!(targets_of(&probe), vec![Some(t.id())]);

        // Children mount unmodified; a missing target leaves the plane as is.
        stage.render(tree(RenderTargetProps::new().manual_children()));
        assert_eq!(t.attachments(), 1);
        assert_eq!(probe.live_planes().len(), 1);

        stage.render(tree(RenderTargetProps::new()));
        assert_eq!(t.attachments(), 1);
        assert_eq!(targets_of(&probe), vec![Some(t.id())]);
        assert_eq!(probe.count(|c| matches!(c, Call::CreatePlane { .. })), 1);
        assert_eq!(probe.count(|c| matches!(c, Call::CreateTarget { .. })), 1);
        assert_eq!(stage.context().render_targets().len(), 1);
    }
}
