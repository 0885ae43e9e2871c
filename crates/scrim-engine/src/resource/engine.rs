use crate::coords::{Vec2, Vec3};

use super::{
    CullFace, DrawCheckMargins, EventSink, MountPoint, PassEvent, PlaneEvent, PlaneParams,
    RenderTargetParams, ResourceId, ShaderPassParams, UniformValue,
};

/// A live plane owned by the engine.
///
/// Setters write straight through; the engine picks changes up on its next
/// draw submission. Callers are expected to skip writes that would not change
/// anything.
pub trait PlaneResource {
    fn id(&self) -> ResourceId;

    fn set_always_draw(&mut self, always_draw: bool);
    fn set_cull_face(&mut self, cull_face: CullFace);
    fn set_draw_check_margins(&mut self, margins: DrawCheckMargins);
    fn set_visible(&mut self, visible: bool);
    fn set_watch_scroll(&mut self, watch_scroll: bool);

    /// Depth testing is switched through a call, not a flag write: the engine
    /// updates its GL state as part of the call.
    fn enable_depth_test(&mut self, enabled: bool);

    /// Draw into `target` instead of the screen. `None` draws to the screen.
    fn set_render_target(&mut self, target: Option<ResourceId>);
    fn set_render_order(&mut self, order: i32);

    fn set_relative_translation(&mut self, translation: Vec3);
    fn set_rotation(&mut self, rotation: Vec3);
    fn set_scale(&mut self, scale: Vec2);
    fn set_transform_origin(&mut self, origin: Vec3);

    /// Field of view currently cached by the plane's camera, in degrees.
    fn fov(&self) -> f32;
    /// Recomputes the projection. Expensive.
    fn set_perspective(&mut self, fov: f32);

    fn set_uniform(&mut self, name: &str, value: UniformValue);

    /// Releases engine-side state. The resource must not be used afterwards.
    fn remove(&mut self);
}

/// A live off-screen render target owned by the engine.
pub trait TargetResource {
    fn id(&self) -> ResourceId;
    /// Number of textures currently attached to the target's framebuffer.
    fn texture_count(&self) -> usize;
    fn remove(&mut self);
}

/// A live post-processing pass owned by the engine.
pub trait PassResource {
    fn id(&self) -> ResourceId;
    fn set_render_target(&mut self, target: Option<ResourceId>);
    fn set_render_order(&mut self, order: i32);
    fn enable_depth_test(&mut self, enabled: bool);
    fn set_uniform(&mut self, name: &str, value: UniformValue);
    fn remove(&mut self);
}

/// The rendering engine, as seen by the effect layer.
///
/// Creation never fails synchronously. Shader or texture problems surface
/// later as `Error` / `Loading` events on the sink handed to the engine.
pub trait Engine {
    fn create_plane(
        &mut self,
        mount: &MountPoint,
        params: &PlaneParams,
        events: EventSink<PlaneEvent>,
    ) -> Box<dyn PlaneResource>;

    fn create_render_target(&mut self, params: &RenderTargetParams) -> Box<dyn TargetResource>;

    /// `target` is the render target the pass is bound to.
    fn create_shader_pass(
        &mut self,
        params: &ShaderPassParams,
        target: Option<ResourceId>,
        events: EventSink<PassEvent>,
    ) -> Box<dyn PassResource>;
}
