//! Shader source loading and the linked program wrapper.
//!
//! A program is built from a base path: `<base>.vs` holds the vertex stage and
//! `<base>.fs` the fragment stage. Attribute locations are bound by name
//! before linking, from the [`VertexLayout`] the program will be drawn with.
//!
//! # Uniforms
//!
//! | Name        | Type   | Description                                  |
//! |-------------|--------|----------------------------------------------|
//! | `transform` | `mat4` | Model matrix; optional, only some shaders use it |

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::backend::Backend;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::mesh::VertexLayout;
use crate::transform::Transform;

/// Driver info logs are truncated to this many bytes.
pub const INFO_LOG_CAPACITY: usize = 1024;

/// Name of the model-matrix uniform.
pub const TRANSFORM_UNIFORM: &str = "transform";

/// Programmable pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    /// Per-vertex stage.
    Vertex,
    /// Per-fragment stage.
    Fragment,
}

impl ShaderStage {
    /// Both stages, in attach order.
    pub const ALL: [Self; 2] = [Self::Vertex, Self::Fragment];

    /// File extension holding this stage's source.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Vertex => "vs",
            Self::Fragment => "fs",
        }
    }

    /// GL shader type constant.
    #[must_use]
    pub fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    /// `<base>.<extension>` for this stage.
    #[must_use]
    pub fn source_path(self, base: &Path) -> PathBuf {
        let mut path = base.as_os_str().to_owned();
        path.push(".");
        path.push(self.extension());
        PathBuf::from(path)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// Read a shader source file line by line.
///
/// Every line, including the last, is followed by exactly one `\n` in the
/// result. Line terminators in the file (`\n` or `\r\n`) are normalised.
///
/// # Errors
///
/// [`Error::NotFound`] if `path` does not exist, [`Error::Io`] for any other
/// read failure.
pub fn load_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::from_io(path, e))?;

    let mut output = String::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::from_io(path, e))?;
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}

/// Like [`load_source`], but a missing or unreadable file logs
/// `Unable to load shader: <path>` and yields an empty string.
///
/// The empty source then fails at compile time with the driver's message.
pub fn load_source_lossy(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    load_source(path).unwrap_or_else(|err| {
        log::error!("Unable to load shader: {} ({err})", path.display());
        String::new()
    })
}

/// Cap a driver info log at [`INFO_LOG_CAPACITY`] bytes without splitting a
/// UTF-8 sequence.
pub(crate) fn truncate_info_log(mut log: String) -> String {
    if log.len() > INFO_LOG_CAPACITY {
        let mut end = INFO_LOG_CAPACITY;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    log
}

/// Uniform locations resolved once after linking.
#[derive(Debug)]
struct ProgramUniforms<L> {
    /// `transform`, absent when the shaders don't declare or use it.
    transform: Option<L>,
}

/// A linked vertex + fragment program.
///
/// Owns both stage objects and the program object. Dropping it detaches and
/// deletes the stages, then deletes the program.
pub struct ShaderProgram<B: Backend> {
    backend: Rc<B>,
    program: B::Program,
    /// Compiled stages in [`ShaderStage::ALL`] order; filled as they compile.
    stages: Vec<B::Shader>,
    uniforms: ProgramUniforms<B::UniformLocation>,
    layout: VertexLayout,
}

impl<B: Backend> ShaderProgram<B> {
    /// Load `<base>.vs` and `<base>.fs` and build a program from them.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] / [`Error::Io`] if either file can't be read,
    /// otherwise whatever [`from_sources`](Self::from_sources) returns.
    pub fn from_base_path(
        ctx: &mut Context<B>,
        base: impl AsRef<Path>,
        layout: VertexLayout,
    ) -> Result<Self> {
        let base = base.as_ref();
        let vertex = load_source(ShaderStage::Vertex.source_path(base))?;
        let fragment = load_source(ShaderStage::Fragment.source_path(base))?;
        log::debug!("Loaded shader sources for {}", base.display());
        Self::from_sources(ctx, &vertex, &fragment, layout)
    }

    /// Compile, attach, bind attribute locations, link and validate.
    ///
    /// Every GL object created before a failure is released before the error
    /// is returned.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the driver refuses an object,
    /// [`Error::CompileFailed`], [`Error::LinkFailed`] or
    /// [`Error::ValidateFailed`] with the driver's info log.
    pub fn from_sources(
        ctx: &mut Context<B>,
        vertex_src: &str,
        fragment_src: &str,
        layout: VertexLayout,
    ) -> Result<Self> {
        let backend = ctx.share_backend();
        let program = backend
            .create_program()
            .map_err(Error::allocation("program"))?;

        // From here on, dropping `this` releases whatever has been created.
        let mut this = Self {
            backend,
            program,
            stages: Vec::with_capacity(ShaderStage::ALL.len()),
            uniforms: ProgramUniforms { transform: None },
            layout,
        };

        for (stage, source) in ShaderStage::ALL.into_iter().zip([vertex_src, fragment_src]) {
            let shader = compile_shader(&*this.backend, stage, source)?;
            this.backend.attach_shader(program, shader);
            this.stages.push(shader);
        }

        for attribute in layout.attributes() {
            this.backend
                .bind_attrib_location(program, attribute.slot, attribute.name);
        }

        let gl = &*this.backend;
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = truncate_info_log(gl.get_program_info_log(program));
            return Err(Error::LinkFailed { log });
        }

        gl.validate_program(program);
        if !gl.get_program_validate_status(program) {
            let log = truncate_info_log(gl.get_program_info_log(program));
            return Err(Error::ValidateFailed { log });
        }

        this.uniforms.transform = gl.get_uniform_location(program, TRANSFORM_UNIFORM);
        log::debug!(
            "Linked program {program:?} ({layout:?}, transform uniform: {})",
            this.uniforms.transform.is_some()
        );

        Ok(this)
    }

    /// Vertex layout the attribute locations were bound for.
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Whether the linked program exposes the `transform` uniform.
    pub fn has_transform_uniform(&self) -> bool {
        self.uniforms.transform.is_some()
    }

    /// Make this the current program for subsequent draws.
    pub fn bind(&self, ctx: &mut Context<B>) {
        ctx.backend().use_program(Some(self.program));
    }

    /// Make this program current and upload `transform`'s model matrix to the
    /// `transform` uniform. Without that uniform only the bind happens.
    pub fn update(&self, ctx: &mut Context<B>, transform: &Transform) {
        self.bind(ctx);
        if let Some(location) = &self.uniforms.transform {
            let model = transform.model().to_cols_array();
            ctx.backend().uniform_matrix_4_f32_slice(location, &model);
        }
    }
}

impl<B: Backend> fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("stages", &self.stages)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        for shader in self.stages.drain(..) {
            self.backend.detach_shader(self.program, shader);
            self.backend.delete_shader(shader);
        }
        self.backend.delete_program(self.program);
        log::debug!("Deleted program {:?}", self.program);
    }
}

/// Compile a single shader stage from source.
///
/// The shader object is deleted again if compilation fails.
fn compile_shader<B: Backend>(gl: &B, stage: ShaderStage, source: &str) -> Result<B::Shader> {
    let shader = gl
        .create_shader(stage.gl_type())
        .map_err(Error::allocation("shader"))?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.get_shader_compile_status(shader) {
        let log = truncate_info_log(gl.get_shader_info_log(shader));
        gl.delete_shader(shader);
        return Err(Error::CompileFailed { stage, log });
    }

    Ok(shader)
}
