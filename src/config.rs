//! Demo settings: window, variant and asset locations.

use std::path::PathBuf;

use crate::mesh::VertexLayout;

/// Window title used by every variant.
pub const DEFAULT_TITLE: &str = "Test Demo";
/// Window width in logical pixels.
pub const DEFAULT_WIDTH: u32 = 720;
/// Window height in logical pixels.
pub const DEFAULT_HEIGHT: u32 = 480;
/// Background color (RGBA).
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.0, 0.15, 0.3, 1.0];
/// Counter increment per frame for the animated variant.
pub const DEFAULT_ANIMATION_STEP: f32 = 0.01;
/// Texture sampled by the textured variants.
pub const DEFAULT_TEXTURE_PATH: &str = "./res/checker.png";

/// Which demo to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    /// Untextured triangle, positions only.
    #[default]
    Basic,
    /// Triangle with texture coordinates sampling an image.
    Textured,
    /// Textured triangle moved every frame by a model matrix.
    Transformed,
}

impl Variant {
    /// Attribute streams the mesh and program use.
    #[must_use]
    pub fn layout(self) -> VertexLayout {
        match self {
            Self::Basic => VertexLayout::Position,
            Self::Textured | Self::Transformed => VertexLayout::PositionTexCoord,
        }
    }

    /// Whether a texture is loaded and bound.
    #[must_use]
    pub fn is_textured(self) -> bool {
        self.layout().has_tex_coords()
    }

    /// Whether a per-frame transform is uploaded.
    #[must_use]
    pub fn is_animated(self) -> bool {
        matches!(self, Self::Transformed)
    }

    /// Base path (without `.vs`/`.fs`) of the variant's shaders.
    #[must_use]
    pub fn default_shader_base(self) -> &'static str {
        match self {
            Self::Basic => "./res/basicShader",
            Self::Textured => "./res/texturedShader",
            Self::Transformed => "./res/transformShader",
        }
    }
}

/// Everything a demo run needs to know up front.
#[derive(Clone, Debug, PartialEq)]
pub struct DemoConfig {
    /// Window title.
    pub title: String,
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Demo variant.
    pub variant: Variant,
    /// Shader base path; `.vs` and `.fs` are appended.
    pub shader_base_path: PathBuf,
    /// Image used by textured variants.
    pub texture_path: PathBuf,
    /// Background color (RGBA).
    pub clear_color: [f32; 4],
    /// Animation counter increment per frame.
    pub animation_step: f32,
}

impl DemoConfig {
    /// Defaults for `variant`.
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            variant,
            shader_base_path: PathBuf::from(variant.default_shader_base()),
            texture_path: PathBuf::from(DEFAULT_TEXTURE_PATH),
            clear_color: DEFAULT_CLEAR_COLOR,
            animation_step: DEFAULT_ANIMATION_STEP,
        }
    }

    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the window size. Zero dimensions are raised to 1.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Override the shader base path.
    #[must_use]
    pub fn with_shader_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.shader_base_path = path.into();
        self
    }

    /// Override the texture image path.
    #[must_use]
    pub fn with_texture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture_path = path.into();
        self
    }

    /// Override the background color.
    #[must_use]
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Override the animation step.
    #[must_use]
    pub fn with_animation_step(mut self, step: f32) -> Self {
        self.animation_step = step;
        self
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}
