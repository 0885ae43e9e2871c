use scrim_engine::coords::{Vec2, Vec3};
use scrim_engine::resource::{
    CullFace, DrawCheckMargins, EventSink, MountPoint, PlaneEvent, PlaneParams, PlaneResource,
    ResourceId,
};

use crate::context::BindingContext;
use crate::target::TargetHandle;

use super::{PlaneCallback, PlaneEvents, PlaneProps};

/// Last value written to the engine for each patchable property.
struct Applied {
    always_draw: bool,
    cull_face: CullFace,
    draw_check_margins: DrawCheckMargins,
    visible: bool,
    watch_scroll: bool,
    depth_test: bool,
    render_order: i32,
    target: Option<TargetHandle>,
    translation: Vec3,
    rotation: Vec3,
    scale: Vec2,
    origin: Vec3,
}

impl Applied {
    fn from_params(p: &PlaneParams) -> Self {
        Self {
            always_draw: p.always_draw,
            cull_face: p.cull_face,
            draw_check_margins: p.draw_check_margins,
            visible: p.visible,
            watch_scroll: p.watch_scroll,
            depth_test: p.depth_test,
            render_order: p.render_order,
            target: None,
            translation: Vec3::zero(),
            rotation: Vec3::zero(),
            scale: Vec2::ONE,
            origin: Vec3::CENTER,
        }
    }
}

struct Bound {
    resource: Box<dyn PlaneResource>,
    applied: Applied,
}

/// Returns `next` if it is set and differs from `slot`, recording it in `slot`.
fn changed<T: PartialEq + Copy>(slot: &mut T, next: Option<T>) -> Option<T> {
    let next = next?;
    if *slot == next {
        return None;
    }
    *slot = next;
    Some(next)
}

fn tuple3(id: ResourceId, name: &str, tuple: Option<&[f32]>) -> Option<Vec3> {
    let tuple = tuple?;
    let v = Vec3::from_slice(tuple);
    if v.is_none() {
        log::warn!("plane {id}: ignoring {name} with {} component(s), need 3", tuple.len());
    }
    v
}

fn tuple2(id: ResourceId, name: &str, tuple: Option<&[f32]>) -> Option<Vec2> {
    let tuple = tuple?;
    let v = Vec2::from_slice(tuple);
    if v.is_none() {
        log::warn!("plane {id}: ignoring {name} with {} component(s), need 2", tuple.len());
    }
    v
}

fn fire(slot: &Option<PlaneCallback>, plane: &mut dyn PlaneResource) {
    if let Some(f) = slot {
        f(plane);
    }
}

// ── PlaneController ───────────────────────────────────────────────────────

/// Keeps one engine plane in sync with a [`PlaneProps`] descriptor.
///
/// Lifecycle per mount:
/// 1. [`bind`](Self::bind) creates the plane once the context has an engine;
///    repeated calls are no-ops
/// 2. [`patch`](Self::patch) writes changed properties, one by one
/// 3. [`dispose`](Self::dispose) fires `on_before_remove`, removes the plane
///    and lets go of its render target; safe to call any number of times
pub struct PlaneController {
    mount: MountPoint,
    bound: Option<Bound>,
    sink: EventSink<PlaneEvent>,
    events: PlaneEvents,
}

impl PlaneController {
    pub fn new(mount: MountPoint) -> Self {
        Self { mount, bound: None, sink: EventSink::new(), events: PlaneEvents::default() }
    }

    #[inline]
    pub fn mount(&self) -> &MountPoint {
        &self.mount
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Id of the engine plane, once bound.
    pub fn id(&self) -> Option<ResourceId> {
        self.bound.as_ref().map(|b| b.resource.id())
    }

    /// Render target the plane currently draws into.
    pub fn target(&self) -> Option<&TargetHandle> {
        self.bound.as_ref().and_then(|b| b.applied.target.as_ref())
    }

    /// Creates the engine plane from `props`.
    ///
    /// Returns the plane id, or `None` while the context has no engine. Once
    /// bound, further calls return the same id without touching the engine.
    pub fn bind(&mut self, ctx: &mut BindingContext, props: &PlaneProps) -> Option<ResourceId> {
        if let Some(bound) = &self.bound {
            return Some(bound.resource.id());
        }
        let Ok(engine) = ctx.engine_mut() else {
            log::trace!("plane '{}': bind pending, no engine yet", self.mount);
            return None;
        };

        self.events = props.events.clone();
        if let Some(f) = &self.events.on_before_create {
            f();
        }

        let params = props.init_params();
        let resource = engine.create_plane(&self.mount, &params, self.sink.clone());
        let id = resource.id();
        log::debug!("plane {id}: bound to '{}'", self.mount);

        self.bound = Some(Bound { resource, applied: Applied::from_params(&params) });
        Some(id)
    }

    /// Writes every patchable property of `props` that is set and differs
    /// from what the plane already has. No-op until bound.
    pub fn patch(&mut self, props: &PlaneProps) {
        self.events = props.events.clone();
        let Some(bound) = self.bound.as_mut() else {
            return;
        };
        let plane = bound.resource.as_mut();
        let applied = &mut bound.applied;
        let id = plane.id();

        if let Some(v) = changed(&mut applied.always_draw, props.always_draw) {
            plane.set_always_draw(v);
        }
        if let Some(v) = changed(&mut applied.cull_face, props.cull_face) {
            plane.set_cull_face(v);
        }
        if let Some(v) = changed(&mut applied.draw_check_margins, props.draw_check_margins) {
            plane.set_draw_check_margins(v);
        }
        if let Some(v) = changed(&mut applied.visible, props.visible) {
            plane.set_visible(v);
        }
        if let Some(v) = changed(&mut applied.watch_scroll, props.watch_scroll) {
            plane.set_watch_scroll(v);
        }
        if let Some(v) = changed(&mut applied.depth_test, props.depth_test) {
            plane.enable_depth_test(v);
        }

        if let Some(target) = &props.target {
            if applied.target.as_ref() != Some(target) {
                if target.is_removed() {
                    log::warn!("plane {id}: render target {} already removed", target.id());
                } else {
                    target.attach();
                    plane.set_render_target(Some(target.id()));
                    if let Some(old) = applied.target.replace(target.clone()) {
                        old.detach();
                    }
                    log::trace!("plane {id}: render target -> {}", target.id());
                }
            }
        }

        if let Some(v) = changed(&mut applied.render_order, props.render_order) {
            plane.set_render_order(v);
        }

        let translation = tuple3(id, "relative_translation", props.relative_translation.as_deref());
        if let Some(v) = changed(&mut applied.translation, translation) {
            plane.set_relative_translation(v);
        }
        if let Some(v) = changed(&mut applied.rotation, tuple3(id, "rotation", props.rotation.as_deref())) {
            plane.set_rotation(v);
        }
        if let Some(v) = changed(&mut applied.scale, tuple2(id, "scale", props.scale.as_deref())) {
            plane.set_scale(v);
        }
        let origin = tuple3(id, "transform_origin", props.transform_origin.as_deref());
        if let Some(v) = changed(&mut applied.origin, origin) {
            plane.set_transform_origin(v);
        }

        // Compared against the camera, not our last write: the projection is expensive.
        if let Some(fov) = props.fov {
            if fov != plane.fov() {
                plane.set_perspective(fov);
            }
        }
    }

    /// Forwards queued engine events to the current callback slots.
    pub fn pump(&mut self) {
        let Some(bound) = self.bound.as_mut() else {
            return;
        };
        for event in self.sink.take() {
            let plane = bound.resource.as_mut();
            match event {
                PlaneEvent::AfterRender => fire(&self.events.on_after_render, plane),
                PlaneEvent::AfterResize => fire(&self.events.on_after_resize, plane),
                PlaneEvent::Error(err) => {
                    log::debug!("plane {}: engine error: {err}", plane.id());
                    if let Some(f) = &self.events.on_error {
                        f(plane, &err);
                    }
                }
                PlaneEvent::LeaveView => fire(&self.events.on_leave_view, plane),
                PlaneEvent::Loading(texture) => {
                    if let Some(f) = &self.events.on_loading {
                        f(plane, &texture);
                    }
                }
                PlaneEvent::Ready => fire(&self.events.on_ready, plane),
                PlaneEvent::ReEnterView => fire(&self.events.on_re_enter_view, plane),
                PlaneEvent::Render => fire(&self.events.on_render, plane),
            }
        }
    }

    /// Removes the engine plane. Safe on a never-bound or already-disposed controller.
    pub fn dispose(&mut self) {
        let Some(mut bound) = self.bound.take() else {
            return;
        };
        fire(&self.events.on_before_remove, bound.resource.as_mut());

        let id = bound.resource.id();
        bound.resource.remove();
        self.sink.take();
        if let Some(target) = bound.applied.target.take() {
            target.detach();
        }
        log::debug!("plane {id}: removed");
    }
}

impl Drop for PlaneController {
    fn drop(&mut self) {
        self.dispose();
    }
}
