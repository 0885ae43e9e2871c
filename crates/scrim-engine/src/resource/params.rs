use std::collections::BTreeMap;

use crate::coords::{Vec2, Vec3};

// ── Shared value types ────────────────────────────────────────────────────

/// A shader given either inline or by the id of a host script element.
///
/// When both are set the engine prefers the inline source. When neither is set
/// the engine falls back to its built-in shader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderSource {
    pub source: Option<String>,
    pub id: Option<String>,
}

impl ShaderSource {
    pub fn inline(source: impl Into<String>) -> Self {
        Self { source: Some(source.into()), id: None }
    }

    pub fn element(id: impl Into<String>) -> Self {
        Self { source: None, id: Some(id.into()) }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.id.is_none()
    }
}

/// Which faces the plane culls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CullFace {
    #[default]
    Back,
    Front,
    None,
}

/// Extra pixels around the viewport inside which a plane still counts as visible.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DrawCheckMargins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl DrawCheckMargins {
    pub const fn all(v: f32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }
}

/// Texture sampling filter.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

/// Options applied to every texture a plane, pass or render target creates.
///
/// `None` fields keep the engine default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureOptions {
    pub premultiply_alpha: Option<bool>,
    pub anisotropy: Option<u32>,
    pub generate_mipmap: Option<bool>,
    pub flip_y: Option<bool>,
    pub float_texture: Option<bool>,
    pub min_filter: Option<TextureFilter>,
    pub mag_filter: Option<TextureFilter>,
}

/// Value of a shader uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

/// A shader uniform: the name it has in the shader plus its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub value: UniformValue,
}

impl Uniform {
    pub fn new(name: impl Into<String>, value: UniformValue) -> Self {
        Self { name: name.into(), value }
    }
}

// ── Init params ───────────────────────────────────────────────────────────

/// Creation parameters for a plane. Defaults mirror the engine's own.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneParams {
    pub vertex_shader: ShaderSource,
    pub fragment_shader: ShaderSource,
    pub width_segments: u32,
    pub height_segments: u32,
    pub render_order: i32,
    pub depth_test: bool,
    pub transparent: bool,
    pub cull_face: CullFace,
    pub always_draw: bool,
    pub visible: bool,
    pub draw_check_margins: DrawCheckMargins,
    pub watch_scroll: bool,
    pub autoload_sources: bool,
    pub textures_options: TextureOptions,
    pub cross_origin: Option<String>,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Keyed by the caller's handle for the uniform, not the shader name.
    pub uniforms: BTreeMap<String, Uniform>,
}

impl Default for PlaneParams {
    fn default() -> Self {
        Self {
            vertex_shader: ShaderSource::default(),
            fragment_shader: ShaderSource::default(),
            width_segments: 1,
            height_segments: 1,
            render_order: 0,
            depth_test: true,
            transparent: false,
            cull_face: CullFace::Back,
            always_draw: false,
            visible: true,
            draw_check_margins: DrawCheckMargins::default(),
            watch_scroll: true,
            autoload_sources: true,
            textures_options: TextureOptions::default(),
            cross_origin: None,
            fov: 50.0,
            uniforms: BTreeMap::new(),
        }
    }
}

/// Creation parameters for an off-screen render target.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetParams {
    /// Attach a depth buffer.
    pub depth: bool,
    /// Clear the target before each draw into it.
    pub clear: bool,
    pub min_width: f32,
    pub min_height: f32,
    pub textures_options: TextureOptions,
}

impl Default for RenderTargetParams {
    fn default() -> Self {
        Self {
            depth: false,
            clear: true,
            min_width: 1024.0,
            min_height: 1024.0,
            textures_options: TextureOptions::default(),
        }
    }
}

/// Creation parameters for a post-processing shader pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPassParams {
    pub vertex_shader: ShaderSource,
    pub fragment_shader: ShaderSource,
    pub render_order: i32,
    pub depth_test: bool,
    pub depth: bool,
    pub clear: bool,
    pub textures_options: TextureOptions,
    pub cross_origin: Option<String>,
    pub uniforms: BTreeMap<String, Uniform>,
}

impl Default for ShaderPassParams {
    fn default() -> Self {
        Self {
            vertex_shader: ShaderSource::default(),
            fragment_shader: ShaderSource::default(),
            render_order: 0,
            depth_test: true,
            depth: false,
            clear: true,
            textures_options: TextureOptions::default(),
            cross_origin: None,
            uniforms: BTreeMap::new(),
        }
    }
}
