//! Call-recording [`Backend`] for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use super::Backend;

/// One recorded GL call. Handles are plain integers allocated from a shared
/// counter, so every object created during a test has a distinct id.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    CreateShader { id: u32, shader_type: u32 },
    ShaderSource { shader: u32, source: String },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    BindAttribLocation { program: u32, index: u32, name: String },
    LinkProgram(u32),
    ValidateProgram(u32),
    UseProgram(Option<u32>),
    UniformMatrix4 { location: u32, value: [f32; 16] },
    DeleteProgram(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    BindBuffer { target: u32, buffer: Option<u32> },
    BufferData { target: u32, data: Vec<u8>, usage: u32 },
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, data_type: u32, stride: i32, offset: i32 },
    DrawArrays { mode: u32, first: i32, count: i32 },
    DeleteBuffer(u32),
    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture { target: u32, texture: Option<u32> },
    TexParameter { target: u32, parameter: u32, value: i32 },
    TexImage2d { target: u32, width: i32, height: i32, len: usize },
    DeleteTexture(u32),
    Viewport { width: i32, height: i32 },
    ClearColor([f32; 4]),
    Clear(u32),
}

/// Backend that records calls and reports configurable statuses.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    pub(crate) calls: RefCell<Vec<Call>>,
    pub(crate) next_id: Cell<u32>,
    /// Shader sources containing this marker fail to compile.
    pub fail_compile_marker: Option<&'static str>,
    pub fail_link: bool,
    pub fail_validate: bool,
    /// Creation of this object kind (`"buffer"`, `"texture"`, ...) fails.
    pub fail_create: Option<&'static str>,
    pub info_log: String,
    /// Uniform names the linked program reports as active.
    pub uniforms: HashSet<&'static str>,
    pub(crate) sources: RefCell<Vec<(u32, String)>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            fail_compile_marker: None,
            fail_link: false,
            fail_validate: false,
            fail_create: None,
            info_log: String::new(),
            uniforms: HashSet::from(["transform"]),
            sources: RefCell::new(Vec::new()),
        }
    }
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    /// Number of objects created minus number deleted.
    pub fn live_objects(&self) -> isize {
        let calls = self.calls.borrow();
        let created = calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::CreateShader { .. }
                        | Call::CreateProgram(_)
                        | Call::CreateVertexArray(_)
                        | Call::CreateBuffer(_)
                        | Call::CreateTexture(_)
                )
            })
            .count();
        let deleted = calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::DeleteShader(_)
                        | Call::DeleteProgram(_)
                        | Call::DeleteVertexArray(_)
                        | Call::DeleteBuffer(_)
                        | Call::DeleteTexture(_)
                )
            })
            .count();
        created.cast_signed() - deleted.cast_signed()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self, what: &'static str) -> Result<u32, String> {
        if self.fail_create == Some(what) {
            return Err(format!("out of {what} names"));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(id)
    }
}

impl Backend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        let id = self.allocate("shader")?;
        self.record(Call::CreateShader { id, shader_type });
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.sources.borrow_mut().push((shader, source.to_owned()));
        self.record(Call::ShaderSource {
            shader,
            source: source.to_owned(),
        });
    }

    fn compile_shader(&self, shader: u32) {
        self.record(Call::CompileShader(shader));
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        let Some(marker) = self.fail_compile_marker else {
            return true;
        };
        !self
            .sources
            .borrow()
            .iter()
            .any(|(id, source)| *id == shader && source.contains(marker))
    }

    fn get_shader_info_log(&self, _shader: u32) -> String {
        self.info_log.clone()
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let id = self.allocate("program")?;
        self.record(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(Call::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(Call::DetachShader { program, shader });
    }

    fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        self.record(Call::BindAttribLocation {
            program,
            index,
            name: name.to_owned(),
        });
    }

    fn link_program(&self, program: u32) {
        self.record(Call::LinkProgram(program));
    }

    fn get_program_link_status(&self, _program: u32) -> bool {
        !self.fail_link
    }

    fn validate_program(&self, program: u32) {
        self.record(Call::ValidateProgram(program));
    }

    fn get_program_validate_status(&self, _program: u32) -> bool {
        !self.fail_validate
    }

    fn get_program_info_log(&self, _program: u32) -> String {
        self.info_log.clone()
    }

    fn get_uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
        // Locations are just a stable function of the name.
        self.uniforms
            .contains(name)
            .then(|| name.bytes().map(u32::from).sum())
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_matrix_4_f32_slice(&self, location: &u32, value: &[f32; 16]) {
        self.record(Call::UniformMatrix4 {
            location: *location,
            value: *value,
        });
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let id = self.allocate("vertex array")?;
        self.record(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record(Call::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let id = self.allocate("buffer")?;
        self.record(Call::CreateBuffer(id));
        Ok(id)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        self.record(Call::BindBuffer { target, buffer });
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        self.record(Call::BufferData {
            target,
            data: data.to_vec(),
            usage,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(Call::VertexAttribPointer {
            index,
            size,
            data_type,
            stride,
            offset,
        });
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(Call::DrawArrays { mode, first, count });
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(Call::DeleteBuffer(buffer));
    }

    fn create_texture(&self) -> Result<u32, String> {
        let id = self.allocate("texture")?;
        self.record(Call::CreateTexture(id));
        Ok(id)
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<u32>) {
        self.record(Call::BindTexture { target, texture });
    }

    fn tex_parameter_i32(&self, target: u32, parameter: u32, value: i32) {
        self.record(Call::TexParameter {
            target,
            parameter,
            value,
        });
    }

    fn tex_image_2d_rgba8(&self, target: u32, width: i32, height: i32, pixels: &[u8]) {
        self.record(Call::TexImage2d {
            target,
            width,
            height,
            len: pixels.len(),
        });
    }

    fn delete_texture(&self, texture: u32) {
        self.record(Call::DeleteTexture(texture));
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.record(Call::Viewport { width, height });
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(Call::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self, mask: u32) {
        self.record(Call::Clear(mask));
    }
}
