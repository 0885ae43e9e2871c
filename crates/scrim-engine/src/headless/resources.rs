use crate::coords::{Vec2, Vec3};
use crate::resource::{
    CullFace, DrawCheckMargins, PassResource, PlaneResource, ResourceId, TargetResource,
    UniformValue,
};

use super::{Call, Shared};

// ── HeadlessPlane ─────────────────────────────────────────────────────────

pub(super) struct HeadlessPlane {
    id: ResourceId,
    fov: f32,
    removed: bool,
    state: Shared,
}

impl HeadlessPlane {
    pub(super) fn new(id: ResourceId, fov: f32, state: Shared) -> Self {
        Self { id, fov, removed: false, state }
    }

    fn record(&self, call: Call) {
        if self.removed {
            log::warn!("headless: call on removed plane {}: {call:?}", self.id);
        }
        self.state.borrow_mut().calls.push(call);
    }
}

impl PlaneResource for HeadlessPlane {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn set_always_draw(&mut self, value: bool) {
        self.record(Call::SetAlwaysDraw { id: self.id, value });
    }

    fn set_cull_face(&mut self, value: CullFace) {
        self.record(Call::SetCullFace { id: self.id, value });
    }

    fn set_draw_check_margins(&mut self, value: DrawCheckMargins) {
        self.record(Call::SetDrawCheckMargins { id: self.id, value });
    }

    fn set_visible(&mut self, value: bool) {
        self.record(Call::SetVisible { id: self.id, value });
    }

    fn set_watch_scroll(&mut self, value: bool) {
        self.record(Call::SetWatchScroll { id: self.id, value });
    }

    fn enable_depth_test(&mut self, enabled: bool) {
        self.record(Call::EnableDepthTest { id: self.id, enabled });
    }

    fn set_render_target(&mut self, target: Option<ResourceId>) {
        self.record(Call::SetRenderTarget { id: self.id, target });
    }

    fn set_render_order(&mut self, order: i32) {
        self.record(Call::SetRenderOrder { id: self.id, order });
    }

    fn set_relative_translation(&mut self, value: Vec3) {
        self.record(Call::SetRelativeTranslation { id: self.id, value });
    }

    fn set_rotation(&mut self, value: Vec3) {
        self.record(Call::SetRotation { id: self.id, value });
    }

    fn set_scale(&mut self, value: Vec2) {
        self.record(Call::SetScale { id: self.id, value });
    }

    fn set_transform_origin(&mut self, value: Vec3) {
        self.record(Call::SetTransformOrigin { id: self.id, value });
    }

    fn fov(&self) -> f32 {
        self.fov
    }

    fn set_perspective(&mut self, fov: f32) {
        self.fov = fov;
        self.record(Call::SetPerspective { id: self.id, fov });
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.record(Call::SetUniform { id: self.id, name: name.to_string(), value });
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        let mut state = self.state.borrow_mut();
        state.planes.remove(&self.id);
        state.calls.push(Call::Remove { id: self.id });
    }
}

// ── HeadlessTarget ────────────────────────────────────────────────────────

pub(super) struct HeadlessTarget {
    id: ResourceId,
    removed: bool,
    state: Shared,
}

impl HeadlessTarget {
    pub(super) fn new(id: ResourceId, state: Shared) -> Self {
        Self { id, removed: false, state }
    }
}

impl TargetResource for HeadlessTarget {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn texture_count(&self) -> usize {
        self.state.borrow().targets.get(&self.id).copied().unwrap_or(0)
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        let mut state = self.state.borrow_mut();
        state.targets.remove(&self.id);
        state.calls.push(Call::Remove { id: self.id });
    }
}

// ── HeadlessPass ──────────────────────────────────────────────────────────

pub(super) struct HeadlessPass {
    id: ResourceId,
    removed: bool,
    state: Shared,
}

impl HeadlessPass {
    pub(super) fn new(id: ResourceId, state: Shared) -> Self {
        Self { id, removed: false, state }
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl PassResource for HeadlessPass {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn set_render_target(&mut self, target: Option<ResourceId>) {
        self.record(Call::SetRenderTarget { id: self.id, target });
    }

    fn set_render_order(&mut self, order: i32) {
        self.record(Call::SetRenderOrder { id: self.id, order });
    }

    fn enable_depth_test(&mut self, enabled: bool) {
        self.record(Call::EnableDepthTest { id: self.id, enabled });
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.record(Call::SetUniform { id: self.id, name: name.to_string(), value });
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        let mut state = self.state.borrow_mut();
        state.passes.remove(&self.id);
        state.calls.push(Call::Remove { id: self.id });
    }
}
