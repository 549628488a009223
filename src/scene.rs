//! What the demo draws each frame, independent of the window system.

use std::fmt;

use glam::Vec3;

use crate::backend::Backend;
use crate::config::DemoConfig;
use crate::context::Context;
use crate::error::Result;
use crate::mesh::{Mesh, Vertex};
use crate::shaders::ShaderProgram;
use crate::texture::Texture;
use crate::transform::Transform;

/// Texture unit the demo samples from.
const TEXTURE_UNIT: u32 = 0;

/// The demo triangle, with texture coordinates spanning the image.
#[must_use]
pub fn triangle() -> [Vertex; 3] {
    [
        Vertex::textured([-0.5, -0.5, 0.0], [0.0, 0.0]),
        Vertex::textured([0.0, 0.5, 0.0], [0.5, 1.0]),
        Vertex::textured([0.5, -0.5, 0.0], [1.0, 0.0]),
    ]
}

/// Per-frame motion for the animated variant.
///
/// A counter advances by `step` every frame; the triangle slides along X on
/// a sine of the counter and spins about Y and Z by the counter itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    counter: f32,
    step: f32,
}

impl Animation {
    /// Start at zero, advancing by `step` per frame.
    #[must_use]
    pub fn new(step: f32) -> Self {
        Self { counter: 0.0, step }
    }

    /// Advance one frame and write the new pose into `transform`.
    pub fn advance(&mut self, transform: &mut Transform) {
        self.counter += self.step;
        transform.position.x = self.counter.sin();
        transform.rotation = Vec3::new(0.0, self.counter, self.counter);
    }

    /// Current counter value.
    #[must_use]
    pub fn counter(&self) -> f32 {
        self.counter
    }
}

/// One shader, one mesh, and optionally a texture and an animated transform.
pub struct Scene<B: Backend> {
    program: ShaderProgram<B>,
    mesh: Mesh<B>,
    texture: Option<Texture<B>>,
    transform: Option<(Transform, Animation)>,
    clear_color: [f32; 4],
}

impl<B: Backend> Scene<B> {
    /// Load the variant's shaders (and texture, if any) and upload the
    /// triangle.
    ///
    /// # Errors
    ///
    /// Any error from creating the program, mesh or texture.
    pub fn new(ctx: &mut Context<B>, config: &DemoConfig) -> Result<Self> {
        let variant = config.variant;
        let layout = variant.layout();

        let program = ShaderProgram::from_base_path(ctx, &config.shader_base_path, layout)
            .inspect_err(|err| {
                log::error!(
                    "Unable to build shader {}: {err}",
                    config.shader_base_path.display()
                );
            })?;
        let mesh = Mesh::new(ctx, &triangle(), layout)?;

        let texture = if variant.is_textured() {
            let texture = Texture::from_path(ctx, &config.texture_path).inspect_err(|_| {
                log::error!("Failed to load texture: {}", config.texture_path.display());
            })?;
            Some(texture)
        } else {
            None
        };

        let transform = variant
            .is_animated()
            .then(|| (Transform::default(), Animation::new(config.animation_step)));

        log::info!("Scene ready: {variant:?}, {} vertices", mesh.draw_count());
        Ok(Self {
            program,
            mesh,
            texture,
            transform,
            clear_color: config.clear_color,
        })
    }

    /// The current model transform, for animated scenes.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref().map(|(transform, _)| transform)
    }

    /// Clear, bind, update uniforms and draw one frame.
    ///
    /// # Errors
    ///
    /// Propagates texture binding errors.
    pub fn render(&mut self, ctx: &mut Context<B>) -> Result<()> {
        ctx.clear(self.clear_color);

        self.program.bind(ctx);
        if let Some(texture) = &self.texture {
            texture.bind(ctx, TEXTURE_UNIT)?;
        }
        if let Some((transform, animation)) = &mut self.transform {
            animation.advance(transform);
            self.program.update(ctx, transform);
        }
        self.mesh.draw(ctx);
        Ok(())
    }
}

impl<B: Backend> fmt::Debug for Scene<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("program", &self.program)
            .field("mesh", &self.mesh)
            .field("texture", &self.texture)
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}
