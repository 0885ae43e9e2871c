//! Subtree injection: stamping a render target onto the planes and passes
//! declared below it.
//!
//! The walk is a pure tree transform. Each element child first has its own
//! children transformed, then the callback runs on the rebuilt child, so a
//! node always sees an already-transformed subtree. Text passes through
//! without reaching the callback. Nested render targets are walked like any
//! other element; the inner target re-stamps its own children when it mounts.

use crate::node::Node;
use crate::target::TargetHandle;

/// Rebuilds `children`, applying `f` to every element bottom-up.
///
/// An empty slice maps to an empty vector. Order and shape are preserved.
pub fn map_tree<F>(children: &[Node], f: &mut F) -> Vec<Node>
where
    F: FnMut(Node) -> Node,
{
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        if !child.is_element() {
            out.push(child.clone());
            continue;
        }
        let node = if child.children().is_empty() {
            child.clone()
        } else {
            child.with_children(map_tree(child.children(), f))
        };
        out.push(f(node));
    }
    out
}

/// Points every plane and shader pass in `children` at `target`.
///
/// Passes without their own `unique_key` inherit `key`, so a pass and the
/// target it reads deduplicate together.
pub fn inject_target(children: &[Node], target: &TargetHandle, key: Option<&str>) -> Vec<Node> {
    map_tree(children, &mut |node| match node {
        Node::Plane(plane) => Node::Plane(plane.with_target(target)),
        Node::ShaderPass(pass) => Node::ShaderPass(pass.with_target(target, key)),
        other => other,
    })
}
