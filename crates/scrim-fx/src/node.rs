//! Declarative descriptor tree.
//!
//! A [`Node`] is what the host hands the stage each update: a closed set of
//! kinds rather than arbitrary components. Props sit behind `Rc` so cloning a
//! node (or a whole subtree) never copies them, and an untouched node in a
//! transformed tree still shares its props with the original.
//!
//! ```rust
//! use scrim_fx::prelude::*;
//!
//! let tree = Node::render_target(RenderTargetProps::new().unique_key("fx1"))
//!     .child(Node::plane("hero", PlaneProps::new().fov(35.0)))
//!     .child(Node::element("div").attr("class", "caption").child(Node::text("hello")))
//!     .child(Node::shader_pass(PassProps::new()));
//! assert_eq!(tree.children().len(), 3);
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use scrim_engine::resource::MountPoint;

use crate::pass::PassProps;
use crate::plane::PlaneProps;
use crate::target::{RenderTargetProps, TargetHandle};

/// Host attributes of a plain element.
pub type Attrs = BTreeMap<String, String>;

/// Discriminant of [`Node`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Plane,
    ShaderPass,
    RenderTarget,
    Element,
    Text,
}

#[derive(Debug, Clone)]
pub struct PlaneNode {
    pub mount: MountPoint,
    pub props: Rc<PlaneProps>,
    pub children: Vec<Node>,
}

impl PlaneNode {
    /// Same node with `target` as its render target; every other prop is kept.
    pub fn with_target(&self, target: &TargetHandle) -> Self {
        let props = PlaneProps { target: Some(target.clone()), ..(*self.props).clone() };
        Self { mount: self.mount.clone(), props: Rc::new(props), children: self.children.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct PassNode {
    pub props: Rc<PassProps>,
    pub children: Vec<Node>,
}

impl PassNode {
    /// Same node bound to `target`. `key` is forwarded only if the pass has none.
    pub fn with_target(&self, target: &TargetHandle, key: Option<&str>) -> Self {
        let mut props = PassProps { render_target: Some(target.clone()), ..(*self.props).clone() };
        if props.unique_key.is_none() {
            props.unique_key = key.map(str::to_string);
        }
        Self { props: Rc::new(props), children: self.children.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct TargetNode {
    pub props: Rc<RenderTargetProps>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Rc<str>,
    pub attrs: Rc<Attrs>,
    pub children: Vec<Node>,
}

// ── Node ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Node {
    Plane(PlaneNode),
    ShaderPass(PassNode),
    RenderTarget(TargetNode),
    /// Plain host markup. Passed through untouched.
    Element(ElementNode),
    /// Text content. Not an element: it has no props and no children.
    Text(Rc<str>),
}

impl Node {
    pub fn plane(mount: impl Into<String>, props: PlaneProps) -> Self {
        Node::Plane(PlaneNode {
            mount: MountPoint::new(mount),
            props: Rc::new(props),
            children: Vec::new(),
        })
    }

    pub fn shader_pass(props: PassProps) -> Self {
        Node::ShaderPass(PassNode { props: Rc::new(props), children: Vec::new() })
    }

    pub fn render_target(props: RenderTargetProps) -> Self {
        Node::RenderTarget(TargetNode { props: Rc::new(props), children: Vec::new() })
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element(ElementNode {
            tag: Rc::from(tag.into()),
            attrs: Rc::new(Attrs::new()),
            children: Vec::new(),
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Rc::from(text.into()))
    }

    /// Sets a host attribute. Only meaningful on elements; ignored elsewhere.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let kind = self.kind();
        match &mut self {
            Node::Element(el) => {
                Rc::make_mut(&mut el.attrs).insert(key.into(), value.into());
            }
            _ => log::warn!("attr on a {kind:?} node ignored"),
        }
        self
    }

    /// Appends a child. Text nodes cannot have children.
    pub fn child(mut self, child: Node) -> Self {
        match self.children_mut() {
            Some(children) => children.push(child),
            None => log::warn!("text nodes cannot have children; child dropped"),
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Plane(_) => NodeKind::Plane,
            Node::ShaderPass(_) => NodeKind::ShaderPass,
            Node::RenderTarget(_) => NodeKind::RenderTarget,
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
        }
    }

    /// `false` for text content.
    #[inline]
    pub fn is_element(&self) -> bool {
        !matches!(self, Node::Text(_))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Plane(n) => &n.children,
            Node::ShaderPass(n) => &n.children,
            Node::RenderTarget(n) => &n.children,
            Node::Element(n) => &n.children,
            Node::Text(_) => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Plane(n) => Some(&mut n.children),
            Node::ShaderPass(n) => Some(&mut n.children),
            Node::RenderTarget(n) => Some(&mut n.children),
            Node::Element(n) => Some(&mut n.children),
            Node::Text(_) => None,
        }
    }

    /// Clone of this node with `children` in place of its own. Props are shared.
    pub fn with_children(&self, children: Vec<Node>) -> Node {
        let mut node = self.clone();
        if let Some(slot) = node.children_mut() {
            *slot = children;
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_engine::headless::HeadlessEngine;
    use scrim_engine::resource::{Engine, RenderTargetParams};

    fn handle() -> TargetHandle {
        let mut engine = HeadlessEngine::new();
        TargetHandle::new(engine.create_render_target(&RenderTargetParams::default()), None, false)
    }

    #[test]
    fn text_nodes_drop_children() {
        let n = Node::text("hi").child(Node::element("span"));
        assert!(n.children().is_empty());
        assert!(!n.is_element());
    }

    #[test]
    fn with_children_shares_props() {
        let n = Node::element("div").attr("id", "a").child(Node::text("x"));
        let m = n.with_children(vec![Node::text("y"), Node::text("z")]);
        match (&n, &m) {
            (Node::Element(a), Node::Element(b)) => assert!(Rc::ptr_eq(&a.attrs, &b.attrs)),
            _ => unreachable!(),
        }
        assert_eq!(m.children().len(), 2);
        assert_eq!(n.children().len(), 1);
    }

    #[test]
    fn plane_with_target_keeps_other_props() {
        let t = handle();
        let Node::Plane(p) = Node::plane("hero", PlaneProps::new().fov(20.0).visible(false)) else {
            unreachable!()
        };
        let q = p.with_target(&t);
        assert_eq!(q.props.target.as_ref(), Some(&t));
        assert_eq!(q.props.fov, Some(20.0));
        assert_eq!(q.props.visible, Some(false));
        assert!(p.props.target.is_none());
        assert_eq!(q.mount, p.mount);
    }

    #[test]
    fn pass_with_target_keeps_its_own_key() {
        let t = handle();
        let Node::ShaderPass(p) = Node::shader_pass(PassProps::new().unique_key("mine")) else {
            unreachable!()
        };
        let q = p.with_target(&t, Some("fx1"));
        assert_eq!(q.props.unique_key.as_deref(), Some("mine"));
        assert_eq!(q.props.render_target.as_ref(), Some(&t));
    }
}
