//! The subset of OpenGL the resource wrappers issue.
//!
//! [`Backend`] mirrors the [`glow::HasContext`] calls used by this crate, with
//! glow's naming and argument order, so the wrappers read exactly like raw
//! glow code. [`GlowBackend`] forwards to a real context; tests substitute a
//! backend that records every call instead of talking to a GPU.

use std::fmt;

use glow::{HasContext, PixelUnpackData};

#[cfg(test)]
pub(crate) mod recording;

/// OpenGL entry points used by the shader, mesh and texture wrappers.
///
/// Object handles are associated types so that each implementation can pick
/// its own representation (glow's native handles, plain integers in tests).
/// Creation calls return the loader's error string, like glow does.
pub trait Backend {
    /// Shader stage object.
    type Shader: Copy + fmt::Debug;
    /// Linked program object.
    type Program: Copy + fmt::Debug;
    /// Buffer object.
    type Buffer: Copy + fmt::Debug;
    /// Vertex array object.
    type VertexArray: Copy + fmt::Debug;
    /// Texture object.
    type Texture: Copy + PartialEq + fmt::Debug;
    /// Resolved uniform location.
    type UniformLocation: fmt::Debug;

    /// `glCreateShader`.
    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String>;
    /// `glShaderSource` with a single source string.
    fn shader_source(&self, shader: Self::Shader, source: &str);
    /// `glCompileShader`.
    fn compile_shader(&self, shader: Self::Shader);
    /// `GL_COMPILE_STATUS` of a shader.
    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    /// `glGetShaderInfoLog`.
    fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    /// `glDeleteShader`.
    fn delete_shader(&self, shader: Self::Shader);

    /// `glCreateProgram`.
    fn create_program(&self) -> Result<Self::Program, String>;
    /// `glAttachShader`.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// `glDetachShader`.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// `glBindAttribLocation`.
    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str);
    /// `glLinkProgram`.
    fn link_program(&self, program: Self::Program);
    /// `GL_LINK_STATUS` of a program.
    fn get_program_link_status(&self, program: Self::Program) -> bool;
    /// `glValidateProgram`.
    fn validate_program(&self, program: Self::Program);
    /// `GL_VALIDATE_STATUS` of a program.
    fn get_program_validate_status(&self, program: Self::Program) -> bool;
    /// `glGetProgramInfoLog`.
    fn get_program_info_log(&self, program: Self::Program) -> String;
    /// `glGetUniformLocation`; `None` when the uniform is absent or unused.
    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    /// `glUseProgram`.
    fn use_program(&self, program: Option<Self::Program>);
    /// `glUniformMatrix4fv` for one column-major matrix.
    fn uniform_matrix_4_f32_slice(&self, location: &Self::UniformLocation, value: &[f32; 16]);
    /// `glDeleteProgram`.
    fn delete_program(&self, program: Self::Program);

    /// `glGenVertexArrays` for a single array.
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    /// `glBindVertexArray`.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// `glDeleteVertexArrays` for a single array.
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    /// `glGenBuffers` for a single buffer.
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// `glBindBuffer`.
    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    /// `glBufferData` from a byte slice.
    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    /// `glEnableVertexAttribArray`.
    fn enable_vertex_attrib_array(&self, index: u32);
    /// `glVertexAttribPointer` for float attributes.
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    /// `glDrawArrays`.
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    /// `glDeleteBuffers` for a single buffer.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// `glGenTextures` for a single texture.
    fn create_texture(&self) -> Result<Self::Texture, String>;
    /// `glActiveTexture`.
    fn active_texture(&self, unit: u32);
    /// `glBindTexture`.
    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>);
    /// `glTexParameteri`.
    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32);
    /// `glTexImage2D` with `GL_RGBA` / `GL_UNSIGNED_BYTE` pixel data.
    fn tex_image_2d_rgba8(&self, target: u32, width: i32, height: i32, pixels: &[u8]);
    /// `glDeleteTextures` for a single texture.
    fn delete_texture(&self, texture: Self::Texture);

    /// `glViewport`.
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// `glClearColor`.
    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32);
    /// `glClear`.
    fn clear(&self, mask: u32);
}

/// GL internal format for RGBA8 textures, pre-cast to the `i32` that
/// `tex_image_2d` expects.
#[expect(clippy::cast_possible_wrap)]
const RGBA8_INTERNAL_FORMAT: i32 = glow::RGBA8 as i32;

/// [`Backend`] over a live [`glow::Context`].
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    /// Wrap a loaded glow context.
    ///
    /// # Safety
    ///
    /// The GL context `gl` was loaded from must be current on the calling
    /// thread for the whole lifetime of the returned backend, and of every
    /// resource created through it.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Version string reported by the driver.
    pub fn version_string(&self) -> String {
        // SAFETY: context is current per `new`'s contract.
        unsafe { self.gl.get_parameter_string(glow::VERSION) }
    }
}

impl fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowBackend").finish_non_exhaustive()
    }
}

// Every method below forwards to glow. The context is current for the life of
// the backend, which is the only requirement glow's `unsafe` calls carry.
impl Backend for GlowBackend {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(shader_type) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn bind_attrib_location(&self, program: Self::Program, index: u32, name: &str) {
        unsafe { self.gl.bind_attrib_location(program, index, name) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn get_program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn validate_program(&self, program: Self::Program) {
        unsafe { self.gl.validate_program(program) }
    }

    fn get_program_validate_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_validate_status(program) }
    }

    fn get_program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn uniform_matrix_4_f32_slice(&self, location: &Self::UniformLocation, value: &[f32; 16]) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(location), false, value) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.gl.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(target, buffer) }
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(target, data, usage) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, data_type, normalized, stride, offset);
        }
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { self.gl.create_texture() }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(unit) }
    }

    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>) {
        unsafe { self.gl.bind_texture(target, texture) }
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(target, parameter, value) }
    }

    fn tex_image_2d_rgba8(&self, target: u32, width: i32, height: i32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_image_2d(
                target,
                0,
                RGBA8_INTERNAL_FORMAT,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        unsafe { self.gl.clear_color(red, green, blue, alpha) }
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) }
    }
}
