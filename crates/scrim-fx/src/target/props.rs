use std::fmt;
use std::rc::Rc;

use scrim_engine::resource::{RenderTargetParams, TextureOptions};

use super::TargetHandle;

/// Declared attributes of a render target node.
///
/// `None` fields fall back to the engine defaults at creation. Init params are
/// read once; a target reused through its `unique_key` keeps the params of
/// whoever created it.
#[derive(Clone)]
pub struct RenderTargetProps {
    pub depth: Option<bool>,
    pub clear: Option<bool>,
    pub min_width: Option<f32>,
    pub min_height: Option<f32>,
    pub textures_options: Option<TextureOptions>,
    /// Targets sharing a key within one context resolve to one engine target.
    pub unique_key: Option<String>,
    /// Stamp this target onto every plane and pass below it. Defaults to `true`.
    pub auto_detect_children: bool,
    /// Fired once, when this node creates the target (never on reuse).
    pub on_ready: Option<Rc<dyn Fn(&TargetHandle)>>,
}

impl RenderTargetProps {
    pub fn new() -> Self {
        Self {
            depth: None,
            clear: None,
            min_width: None,
            min_height: None,
            textures_options: None,
            unique_key: None,
            auto_detect_children: true,
            on_ready: None,
        }
    }

    pub fn depth(mut self, depth: bool) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn clear(mut self, clear: bool) -> Self {
        self.clear = Some(clear);
        self
    }

    pub fn min_size(mut self, width: f32, height: f32) -> Self {
        self.min_width = Some(width);
        self.min_height = Some(height);
        self
    }

    pub fn textures_options(mut self, options: TextureOptions) -> Self {
        self.textures_options = Some(options);
        self
    }

    pub fn unique_key(mut self, key: impl Into<String>) -> Self {
        self.unique_key = Some(key.into());
        self
    }

    /// Turn off child injection; the caller wires targets by hand.
    pub fn manual_children(mut self) -> Self {
        self.auto_detect_children = false;
        self
    }

    pub fn on_ready(mut self, f: impl Fn(&TargetHandle) + 'static) -> Self {
        self.on_ready = Some(Rc::new(f));
        self
    }

    /// Engine params with defaults filled in.
    pub fn init_params(&self) -> RenderTargetParams {
        let d = RenderTargetParams::default();
        RenderTargetParams {
            depth: self.depth.unwrap_or(d.depth),
            clear: self.clear.unwrap_or(d.clear),
            min_width: self.min_width.unwrap_or(d.min_width),
            min_height: self.min_height.unwrap_or(d.min_height),
            textures_options: self.textures_options.clone().unwrap_or(d.textures_options),
        }
    }
}

impl Default for RenderTargetProps {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderTargetProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTargetProps")
            .field("depth", &self.depth)
            .field("clear", &self.clear)
            .field("min_width", &self.min_width)
            .field("min_height", &self.min_height)
            .field("unique_key", &self.unique_key)
            .field("auto_detect_children", &self.auto_detect_children)
            .finish_non_exhaustive()
    }
}
