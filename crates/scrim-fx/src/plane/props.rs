use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use scrim_engine::resource::{
    CullFace, DrawCheckMargins, EngineError, PlaneParams, PlaneResource, ShaderSource,
    TextureInfo, TextureOptions, Uniform,
};

use crate::target::TargetHandle;

pub type PlaneCallback = Rc<dyn Fn(&mut dyn PlaneResource)>;

/// Named callback slots of a plane.
///
/// Engine events land in the matching slot when the stage pumps events.
/// `on_before_create` and `on_before_remove` are fired by the controller
/// itself around bind and dispose.
#[derive(Clone, Default)]
pub struct PlaneEvents {
    pub on_after_render: Option<PlaneCallback>,
    pub on_after_resize: Option<PlaneCallback>,
    pub on_error: Option<Rc<dyn Fn(&mut dyn PlaneResource, &EngineError)>>,
    pub on_leave_view: Option<PlaneCallback>,
    pub on_loading: Option<Rc<dyn Fn(&mut dyn PlaneResource, &TextureInfo)>>,
    pub on_ready: Option<PlaneCallback>,
    pub on_re_enter_view: Option<PlaneCallback>,
    pub on_render: Option<PlaneCallback>,
    pub on_before_create: Option<Rc<dyn Fn()>>,
    pub on_before_remove: Option<PlaneCallback>,
}

/// Declared attributes of a plane.
///
/// Every field is optional. At bind time `None` means "engine default"; on a
/// later patch it means "leave as is", never "reset".
///
/// Only `render_order`, `depth_test`, `cull_face`, `always_draw`, `visible`,
/// `draw_check_margins`, `watch_scroll`, `fov`, `target` and the four
/// transforms are patched after bind. The rest are read once.
#[derive(Clone, Default)]
pub struct PlaneProps {
    pub vertex_shader: ShaderSource,
    pub fragment_shader: ShaderSource,
    pub width_segments: Option<u32>,
    pub height_segments: Option<u32>,
    pub transparent: Option<bool>,
    pub autoload_sources: Option<bool>,
    pub textures_options: Option<TextureOptions>,
    pub cross_origin: Option<String>,
    pub uniforms: BTreeMap<String, Uniform>,

    pub render_order: Option<i32>,
    pub depth_test: Option<bool>,
    pub cull_face: Option<CullFace>,
    pub always_draw: Option<bool>,
    pub visible: Option<bool>,
    pub draw_check_margins: Option<DrawCheckMargins>,
    pub watch_scroll: Option<bool>,
    pub fov: Option<f32>,

    /// Render target to draw into. Usually injected by an enclosing render target.
    pub target: Option<TargetHandle>,

    /// `[x, y, z]`; shorter tuples are ignored.
    pub relative_translation: Option<Vec<f32>>,
    /// `[x, y, z]` in radians; shorter tuples are ignored.
    pub rotation: Option<Vec<f32>>,
    /// `[x, y]`; shorter tuples are ignored.
    pub scale: Option<Vec<f32>>,
    /// `[x, y, z]`, normalized to the plane; shorter tuples are ignored.
    pub transform_origin: Option<Vec<f32>>,

    pub events: PlaneEvents,
}

impl PlaneProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_shader(mut self, source: impl Into<String>) -> Self {
        self.vertex_shader.source = Some(source.into());
        self
    }

    pub fn vertex_shader_id(mut self, id: impl Into<String>) -> Self {
        self.vertex_shader.id = Some(id.into());
        self
    }

    pub fn fragment_shader(mut self, source: impl Into<String>) -> Self {
        self.fragment_shader.source = Some(source.into());
        self
    }

    pub fn fragment_shader_id(mut self, id: impl Into<String>) -> Self {
        self.fragment_shader.id = Some(id.into());
        self
    }

    pub fn segments(mut self, width: u32, height: u32) -> Self {
        self.width_segments = Some(width);
        self.height_segments = Some(height);
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = Some(transparent);
        self
    }

    pub fn autoload_sources(mut self, autoload: bool) -> Self {
        self.autoload_sources = Some(autoload);
        self
    }

    pub fn textures_options(mut self, options: TextureOptions) -> Self {
        self.textures_options = Some(options);
        self
    }

    pub fn cross_origin(mut self, value: impl Into<String>) -> Self {
        self.cross_origin = Some(value.into());
        self
    }

    /// Adds a uniform under `key`.
    pub fn uniform(mut self, key: impl Into<String>, uniform: Uniform) -> Self {
        self.uniforms.insert(key.into(), uniform);
        self
    }

    pub fn render_order(mut self, order: i32) -> Self {
        self.render_order = Some(order);
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = Some(enabled);
        self
    }

    pub fn cull_face(mut self, cull_face: CullFace) -> Self {
        self.cull_face = Some(cull_face);
        self
    }

    pub fn always_draw(mut self, always_draw: bool) -> Self {
        self.always_draw = Some(always_draw);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn draw_check_margins(mut self, margins: DrawCheckMargins) -> Self {
        self.draw_check_margins = Some(margins);
        self
    }

    pub fn watch_scroll(mut self, watch_scroll: bool) -> Self {
        self.watch_scroll = Some(watch_scroll);
        self
    }

    pub fn fov(mut self, fov: f32) -> Self {
        self.fov = Some(fov);
        self
    }

    pub fn target(mut self, target: TargetHandle) -> Self {
        self.target = Some(target);
        self
    }

    pub fn relative_translation(mut self, v: impl Into<Vec<f32>>) -> Self {
        self.relative_translation = Some(v.into());
        self
    }

    pub fn rotation(mut self, v: impl Into<Vec<f32>>) -> Self {
        self.rotation = Some(v.into());
        self
    }

    pub fn scale(mut self, v: impl Into<Vec<f32>>) -> Self {
        self.scale = Some(v.into());
        self
    }

    pub fn transform_origin(mut self, v: impl Into<Vec<f32>>) -> Self {
        self.transform_origin = Some(v.into());
        self
    }

    pub fn on_after_render(mut self, f: impl Fn(&mut dyn PlaneResource) + 'static) -> Self {
        self.events.on_after_render = Some(Rc::new(f));
        self
    }

    pub fn on_after_resize(mut self, f: impl Fn(&mut dyn PlaneResource) + 'static) -> Self {
        self.events.on_after_resize = Some(Rc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&mut dyn PlaneResource, &EngineError) + 'static) -> Self {
        self.events.on_error = Some(Rc::new(f));
        self
    }

    pub fn on_leave_view(mut self, f: impl Fn(&mut dyn PlaneResource) + 'static) -> Self {
        self.events.on_leave_view = Some(Rc::new(f));
        self
    }

    pub fn on_loading(mut self, f: impl Fn(&mut dyn PlaneResource, &TextureInfo) + 'static) -> Self {
        self.events.on_loading = Some(Rc::new(f));
        self
    }

    pub fn on_ready(mut self, f: impl Fn(&mut dyn PlaneResource) + 'static) -> Self {
        self.events.on_ready = Some(Rc::new(f));
        self
    }

    pub fn on_re_enter_view(mut self, f: impl Fn(&mut dyn PlaneResource) + 'static) -> Self {
        self.events.on_re_enter_view = Some(Rc::new(f));
        self
    }

    pub fn on_render(mut self, f: impl Fn(&mut dyn PlaneResource) + 'static) -> Self {
        self.events.on_render = Some(Rc::new(f));
        self
    }

    pub fn on_before_create(mut self, f: impl Fn() + 'static) -> Self {
        self.events.on_before_create = Some(Rc::new(f));
        self
    }

    pub fn on_before_remove(mut self, f: impl Fn(&mut dyn PlaneResource) + 'static) -> Self {
        self.events.on_before_remove = Some(Rc::new(f));
        self
    }

    /// Engine params with defaults filled in.
    pub fn init_params(&self) -> PlaneParams {
        let d = PlaneParams::default();
        PlaneParams {
            vertex_shader: self.vertex_shader.clone(),
            fragment_shader: self.fragment_shader.clone(),
            width_segments: self.width_segments.unwrap_or(d.width_segments),
            height_segments: self.height_segments.unwrap_or(d.height_segments),
            render_order: self.render_order.unwrap_or(d.render_order),
            depth_test: self.depth_test.unwrap_or(d.depth_test),
            transparent: self.transparent.unwrap_or(d.transparent),
            cull_face: self.cull_face.unwrap_or(d.cull_face),
            always_draw: self.always_draw.unwrap_or(d.always_draw),
            visible: self.visible.unwrap_or(d.visible),
            draw_check_margins: self.draw_check_margins.unwrap_or(d.draw_check_margins),
            watch_scroll: self.watch_scroll.unwrap_or(d.watch_scroll),
            autoload_sources: self.autoload_sources.unwrap_or(d.autoload_sources),
            textures_options: self.textures_options.clone().unwrap_or(d.textures_options),
            cross_origin: self.cross_origin.clone(),
            fov: self.fov.unwrap_or(d.fov),
            uniforms: self.uniforms.clone(),
        }
    }
}

impl fmt::Debug for PlaneProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaneProps")
            .field("vertex_shader", &self.vertex_shader)
            .field("fragment_shader", &self.fragment_shader)
            .field("render_order", &self.render_order)
            .field("visible", &self.visible)
            .field("fov", &self.fov)
            .field("target", &self.target.as_ref().map(TargetHandle::id))
            .field("relative_translation", &self.relative_translation)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("transform_origin", &self.transform_origin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_engine::resource::UniformValue;

    #[test]
    fn init_params_fill_engine_defaults() {
        let p = PlaneProps::new().fov(75.0).visible(false).init_params();
        let d = PlaneParams::default();
        assert_eq!(p.fov, 75.0);
        assert!(!p.visible);
        assert_eq!(p.width_segments, d.width_segments);
        assert_eq!(p.cull_face, d.cull_face);
        assert_eq!(p.depth_test, d.depth_test);
    }

    #[test]
    fn uniforms_and_shaders_carry_through() {
        let p = PlaneProps::new()
            .fragment_shader("void main() {}")
            .vertex_shader_id("plane-vs")
            .uniform("time", Uniform::new("uTime", UniformValue::Float(0.0)))
            .init_params();
        assert_eq!(p.fragment_shader.source.as_deref(), Some("void main() {}"));
        assert_eq!(p.vertex_shader.id.as_deref(), Some("plane-vs"));
        assert_eq!(p.uniforms["time"].name, "uTime");
    }
}
