//! Render targets: the shared handle, its registry and its controller.
//!
//! A render target can be reached from several descriptors at once (a keyed
//! target declared in a loop, the planes drawing into it, the passes reading
//! it). Nobody holds an exclusive ownership token, so physical teardown is
//! driven by an attachment count:
//!
//! 1. every render target node resolving to the target is an owner
//! 2. every plane or pass pointed at the target attaches once
//! 3. an owner's unmount calls [`TargetHandle::release`]
//! 4. the target is removed once it has neither owners nor attachments;
//!    whichever of the two drains last performs the removal

mod controller;
mod props;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use scrim_engine::resource::{ResourceId, TargetResource};

pub use controller::RenderTargetController;
pub use props::RenderTargetProps;

// ── TargetHandle ──────────────────────────────────────────────────────────

struct TargetInner {
    id: ResourceId,
    key: Option<String>,
    pass_owned: bool,
    backend: RefCell<Option<Box<dyn TargetResource>>>,
    owners: Cell<usize>,
    attachments: Cell<usize>,
}

/// Shared reference to one engine render target.
///
/// Cheap to clone. Two handles compare equal only if they point at the same
/// target.
#[derive(Clone)]
pub struct TargetHandle(Rc<TargetInner>);

impl TargetHandle {
    pub(crate) fn new(backend: Box<dyn TargetResource>, key: Option<String>, pass_owned: bool) -> Self {
        Self(Rc::new(TargetInner {
            id: backend.id(),
            key,
            pass_owned,
            backend: RefCell::new(Some(backend)),
            owners: Cell::new(usize::from(!pass_owned)),
            attachments: Cell::new(0),
        }))
    }

    #[inline]
    pub fn id(&self) -> ResourceId {
        self.0.id
    }

    /// Identity key the target was created with, if any.
    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.0.key.as_deref()
    }

    /// `true` if the target exists only to feed a single shader pass.
    #[inline]
    pub fn is_pass_owned(&self) -> bool {
        self.0.pass_owned
    }

    /// Planes and passes currently pointed at this target.
    #[inline]
    pub fn attachments(&self) -> usize {
        self.0.attachments.get()
    }

    /// `true` once the engine target has been removed.
    pub fn is_removed(&self) -> bool {
        self.0.backend.borrow().is_none()
    }

    /// Render target nodes currently resolved to this target.
    #[inline]
    pub fn owners(&self) -> usize {
        self.0.owners.get()
    }

    /// `true` while the last owner is gone but attachments keep the target alive.
    pub fn is_release_pending(&self) -> bool {
        !self.is_pass_owned() && self.owners() == 0 && !self.is_removed()
    }

    /// Textures the engine reports on the target. Zero once removed.
    pub fn texture_count(&self) -> usize {
        self.0.backend.borrow().as_ref().map_or(0, |b| b.texture_count())
    }

    pub(crate) fn attach(&self) {
        if self.is_removed() {
            log::warn!("attach to removed render target {} ignored", self.id());
            return;
        }
        self.0.attachments.set(self.attachments() + 1);
    }

    /// Drops one attachment. Performs a deferred teardown when this was the last one.
    pub(crate) fn detach(&self) {
        let n = self.attachments().saturating_sub(1);
        self.0.attachments.set(n);
        if n == 0 && self.is_release_pending() {
            log::debug!("render target {}: last attachment gone, removing", self.id());
            self.teardown();
        }
    }

    /// Owner unmount. Returns `true` if the target was removed right away.
    ///
    /// Removal waits until nothing is attached: planes and passes pointed at
    /// the target hold it alive. The engine's texture count is only logged.
    /// Pass-owned targets are left to their pass.
    pub(crate) fn release(&self) -> bool {
        if self.is_pass_owned() || self.is_removed() {
            return false;
        }
        let owners = self.owners().saturating_sub(1);
        self.0.owners.set(owners);
        if owners > 0 {
            log::trace!("render target {}: {owners} owner(s) left", self.id());
            return false;
        }
        if self.attachments() == 0 {
            self.teardown();
            return true;
        }
        log::debug!(
            "render target {}: release deferred, {} attachment(s), {} texture(s)",
            self.id(),
            self.attachments(),
            self.texture_count(),
        );
        false
    }

    /// Another render target node resolved to this target by key.
    pub(crate) fn adopt(&self) {
        self.0.owners.set(self.owners() + 1);
    }

    /// Removes the engine target now. Idempotent.
    pub(crate) fn teardown(&self) {
        if let Some(mut backend) = self.0.backend.borrow_mut().take() {
            backend.remove();
        }
    }
}

impl PartialEq for TargetHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TargetHandle {}

impl fmt::Debug for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetHandle")
            .field("id", &self.id())
            .field("key", &self.key())
            .field("owners", &self.owners())
            .field("attachments", &self.attachments())
            .field("removed", &self.is_removed())
            .finish()
    }
}

// ── TargetRegistry ────────────────────────────────────────────────────────

/// Live render targets of one binding context, in creation order.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    live: Vec<TargetHandle>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live targets in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &TargetHandle> {
        self.live.iter().filter(|t| !t.is_removed())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First live target stamped with `key`.
    pub fn find(&self, key: &str) -> Option<TargetHandle> {
        self.iter().find(|t| t.key() == Some(key)).cloned()
    }

    pub(crate) fn insert(&mut self, handle: TargetHandle) {
        self.prune();
        self.live.push(handle);
    }

    /// Forgets targets that have been removed.
    pub(crate) fn prune(&mut self) {
        self.live.retain(|t| !t.is_removed());
    }

    /// Removes every target regardless of attachments. Used when the engine goes away.
    pub(crate) fn teardown_all(&mut self) {
        for t in self.live.drain(..) {
            t.teardown();
        }
    }
}
