//! A minimal OpenGL demo built on [glow].
//!
//! The crate opens a window, compiles a vertex/fragment shader pair loaded
//! from disk, uploads a single triangle and, depending on the [`Variant`],
//! samples a texture and animates a model matrix. The pieces are small owning
//! wrappers around GL objects:
//!
//! - [`ShaderProgram`]: two compiled stages and the linked program, plus the
//!   `transform` uniform location.
//! - [`Mesh`]: a vertex array with one tightly packed buffer per attribute.
//! - [`Texture`]: an RGBA8 2D texture with repeat wrapping and linear
//!   filtering.
//! - [`Transform`]: position/rotation/scale composed into a model matrix.
//!
//! Every wrapper releases its GL objects on drop, including when construction
//! fails halfway through, and reports failures through [`Error`].
//!
//! # Binding state
//!
//! OpenGL keeps one implicit "currently bound" object per binding point. Here
//! that state is owned by [`Context`]: anything that binds or draws takes
//! `&mut Context`, resource creation included, so the order of binds and
//! draws is the order of the borrows. Uploading a texture leaves the active
//! texture unit holding whatever it held before.
//!
//! # Backends
//!
//! Wrappers are generic over [`Backend`], the subset of GL they call.
//! [`GlowBackend`] drives a real context; the unit tests drive a recording
//! backend instead, so the whole data path runs without a GPU.
//!
//! [glow]: https://docs.rs/glow

pub mod app;
mod backend;
mod config;
mod context;
mod error;
mod mesh;
mod scene;
mod shaders;
mod texture;
mod transform;

#[cfg(test)]
mod test_support;

pub use backend::{Backend, GlowBackend};
pub use config::{DemoConfig, Variant};
pub use context::Context;
pub use error::{Error, Result};
pub use mesh::{Mesh, Vertex, VertexAttribute, VertexLayout};
pub use scene::{triangle, Animation, Scene};
pub use shaders::{
    load_source, load_source_lossy, ShaderProgram, ShaderStage, INFO_LOG_CAPACITY,
    TRANSFORM_UNIFORM,
};
pub use texture::{Texture, TextureImage, MAX_TEXTURE_UNIT};
pub use transform::Transform;

pub use glam;
