use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use scrim_engine::resource::{
    EngineError, PassResource, RenderTargetParams, ShaderPassParams, ShaderSource, TextureInfo,
    TextureOptions, Uniform,
};

use crate::target::TargetHandle;

pub type PassCallback = Rc<dyn Fn(&mut dyn PassResource)>;

/// Named callback slots of a shader pass.
#[derive(Clone, Default)]
pub struct PassEvents {
    pub on_after_render: Option<PassCallback>,
    pub on_after_resize: Option<PassCallback>,
    pub on_error: Option<Rc<dyn Fn(&mut dyn PassResource, &EngineError)>>,
    pub on_loading: Option<Rc<dyn Fn(&mut dyn PassResource, &TextureInfo)>>,
    pub on_ready: Option<PassCallback>,
    pub on_render: Option<PassCallback>,
    pub on_before_create: Option<Rc<dyn Fn()>>,
    pub on_before_remove: Option<PassCallback>,
}

/// Declared attributes of a post-processing pass.
///
/// `render_target` and `unique_key` are normally filled in by an enclosing
/// render target rather than by hand.
#[derive(Clone, Default)]
pub struct PassProps {
    pub vertex_shader: ShaderSource,
    pub fragment_shader: ShaderSource,
    pub render_order: Option<i32>,
    pub depth_test: Option<bool>,
    pub depth: Option<bool>,
    pub clear: Option<bool>,
    pub textures_options: Option<TextureOptions>,
    pub cross_origin: Option<String>,
    pub uniforms: BTreeMap<String, Uniform>,
    pub render_target: Option<TargetHandle>,
    /// Passes sharing a key within one context resolve to one engine pass.
    pub unique_key: Option<String>,
    pub events: PassEvents,
}

impl PassProps {
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

    pub fn render_order(mut self, order: i32) -> Self {
        self.render_order = Some(order);
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = Some(enabled);
        self
    }

    pub fn depth(mut self, depth: bool) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn clear(mut self, clear: bool) -> Self {
        self.clear = Some(clear);
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

    pub fn uniform(mut self, key: impl Into<String>, uniform: Uniform) -> Self {
        self.uniforms.insert(key.into(), uniform);
        self
    }

    pub fn render_target(mut self, target: TargetHandle) -> Self {
        self.render_target = Some(target);
        self
    }

    pub fn unique_key(mut self, key: impl Into<String>) -> Self {
        self.unique_key = Some(key.into());
        self
    }

    pub fn on_after_render(mut self, f: impl Fn(&mut dyn PassResource) + 'static) -> Self {
        self.events.on_after_render = Some(Rc::new(f));
        self
    }

    pub fn on_after_resize(mut self, f: impl Fn(&mut dyn PassResource) + 'static) -> Self {
        self.events.on_after_resize = Some(Rc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&mut dyn PassResource, &EngineError) + 'static) -> Self {
        self.events.on_error = Some(Rc::new(f));
        self
    }

    pub fn on_loading(mut self, f: impl Fn(&mut dyn PassResource, &TextureInfo) + 'static) -> Self {
        self.events.on_loading = Some(Rc::new(f));
        self
    }

    pub fn on_ready(mut self, f: impl Fn(&mut dyn PassResource) + 'static) -> Self {
        self.events.on_ready = Some(Rc::new(f));
        self
    }

    pub fn on_render(mut self, f: impl Fn(&mut dyn PassResource) + 'static) -> Self {
        self.events.on_render = Some(Rc::new(f));
        self
    }

    pub fn on_before_create(mut self, f: impl Fn() + 'static) -> Self {
        self.events.on_before_create = Some(Rc::new(f));
        self
    }

    pub fn on_before_remove(mut self, f: impl Fn(&mut dyn PassResource) + 'static) -> Self {
        self.events.on_before_remove = Some(Rc::new(f));
        self
    }

    /// Engine params with defaults filled in.
    pub fn init_params(&self) -> ShaderPassParams {
        let d = ShaderPassParams::default();
        ShaderPassParams {
            vertex_shader: self.vertex_shader.clone(),
            fragment_shader: self.fragment_shader.clone(),
            render_order: self.render_order.unwrap_or(d.render_order),
            depth_test: self.depth_test.unwrap_or(d.depth_test),
            depth: self.depth.unwrap_or(d.depth),
            clear: self.clear.unwrap_or(d.clear),
            textures_options: self.textures_options.clone().unwrap_or(d.textures_options),
            cross_origin: self.cross_origin.clone(),
            uniforms: self.uniforms.clone(),
        }
    }

    /// Params for the target a pass creates when none is given.
    pub(crate) fn owned_target_params(&self) -> RenderTargetParams {
        let p = self.init_params();
        RenderTargetParams {
            depth: p.depth,
            clear: p.clear,
            textures_options: p.textures_options,
            ..RenderTargetParams::default()
        }
    }
}

impl fmt::Debug for PassProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassProps")
            .field("fragment_shader", &self.fragment_shader)
            .field("render_order", &self.render_order)
            .field("depth_test", &self.depth_test)
            .field("render_target", &self.render_target.as_ref().map(TargetHandle::id))
            .field("unique_key", &self.unique_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_target_follows_pass_depth_and_clear() {
        let p = PassProps::new().depth(true).clear(false).owned_target_params();
        assert!(p.depth);
        assert!(!p.clear);
        assert_eq!(p.min_width, RenderTargetParams::default().min_width);
    }
}
