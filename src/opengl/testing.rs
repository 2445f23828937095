//! Recording stand-in for a real driver.
//!
//! Shader "compilation" succeeds when the source declares `void main`; a program links
//! when every attached stage compiled. Uniform locations are handed out in declaration
//! order from `uniform <type> <name>;` lines, and unknown names resolve to `-1` just like
//! a real driver. Uniform writes land in the program currently in use.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CStr;
use std::rc::Rc;

use super::backend::GlBackend;
use super::shaders::{ProgramValidation, ShaderKind, UniformKind};
use super::types::{
    BufferTarget, BufferUsage, ElementsMode, GlResult, IndexType, TextureParameter,
    VertexAttribute,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateShader(ShaderKind, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),
    Uniform(i32, UniformKind),
    GenVertexArray(u32),
    BindVertexArray(u32),
    DeleteVertexArray(u32),
    GenBuffer(u32),
    BindBuffer(BufferTarget, u32),
    BufferData(BufferTarget, Vec<u8>, BufferUsage),
    DeleteBuffer(u32),
    VertexAttribPointer(VertexAttribute, i32),
    EnableVertexAttribArray(u32),
    GenTexture(u32),
    ActiveTexture(u32),
    BindTexture(u32),
    TexParameter(TextureParameter),
    TexImage(u32, u32, usize),
    GenerateMipmap,
    DeleteTexture(u32),
    Viewport(i32, i32, i32, i32),
    ClearColor(f32, f32, f32, f32),
    Clear,
    DrawArrays(ElementsMode, i32, i32),
    DrawElements(ElementsMode, i32, IndexType, usize),
}

#[derive(Debug, Default)]
struct MockShader {
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    uniforms: Vec<String>,
    values: HashMap<i32, UniformKind>,
    log: String,
}

#[derive(Debug, Default)]
struct Recorder {
    next_id: u32,
    calls: Vec<Call>,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    current_program: u32,
}

impl Recorder {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingGl {
    inner: Rc<RefCell<Recorder>>,
}

impl RecordingGl {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    pub(crate) fn is_linked(&self, program: u32) -> bool {
        self.inner
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|program| program.linked)
    }

    pub(crate) fn uniform_value(&self, program: u32, name: &str) -> Option<UniformKind> {
        let recorder = self.inner.borrow();
        let program = recorder.programs.get(&program)?;
        let location = program.uniforms.iter().position(|uniform| uniform == name)?;
        program.values.get(&(location as i32)).copied()
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.inner.borrow().shaders.len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.inner.borrow().programs.len()
    }

    fn record(&self, call: Call) {
        self.inner.borrow_mut().calls.push(call);
    }
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("uniform"), Some(_), Some(name)) => Some(name.trim_end_matches(';').to_owned()),
            _ => None,
        }
    })
}

impl GlBackend for RecordingGl {
    fn create_shader(&self, kind: ShaderKind) -> GlResult<u32> {
        let mut recorder = self.inner.borrow_mut();
        let id = recorder.allocate();
        recorder.shaders.insert(id, MockShader::default());
        recorder.calls.push(Call::CreateShader(kind, id));
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &CStr) -> GlResult<()> {
        let mut recorder = self.inner.borrow_mut();
        let shader = recorder
            .shaders
            .get_mut(&shader)
            .ok_or(glcore::GLCoreError::InvalidValue("Unknown shader"))?;
        shader.source = source.to_string_lossy().into_owned();
        Ok(())
    }

    fn compile_shader(&self, shader: u32) -> GlResult<()> {
        let mut recorder = self.inner.borrow_mut();
        let entry = recorder
            .shaders
            .get_mut(&shader)
            .ok_or(glcore::GLCoreError::InvalidValue("Unknown shader"))?;
        entry.compiled = entry.source.contains("void main");
        recorder.calls.push(Call::CompileShader(shader));
        Ok(())
    }

    fn delete_shader(&self, shader: u32) -> GlResult<()> {
        self.inner.borrow_mut().shaders.remove(&shader);
        self.record(Call::DeleteShader(shader));
        Ok(())
    }

    fn create_program(&self) -> GlResult<u32> {
        let mut recorder = self.inner.borrow_mut();
        let id = recorder.allocate();
        recorder.programs.insert(id, MockProgram::default());
        recorder.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) -> GlResult<()> {
        let mut recorder = self.inner.borrow_mut();
        if let Some(entry) = recorder.programs.get_mut(&program) {
            entry.attached.push(shader);
        }
        recorder.calls.push(Call::AttachShader(program, shader));
        Ok(())
    }

    fn detach_shader(&self, program: u32, shader: u32) -> GlResult<()> {
        let mut recorder = self.inner.borrow_mut();
        if let Some(entry) = recorder.programs.get_mut(&program) {
            entry.attached.retain(|attached| *attached != shader);
        }
        recorder.calls.push(Call::DetachShader(program, shader));
        Ok(())
    }

    fn link_program(&self, program: u32) -> GlResult<()> {
        let mut recorder = self.inner.borrow_mut();
        let Recorder {
            shaders, programs, ..
        } = &mut *recorder;
        let entry = programs
            .get_mut(&program)
            .ok_or(glcore::GLCoreError::InvalidValue("Unknown program"))?;
        let stages: Vec<&MockShader> = entry
            .attached
            .iter()
            .filter_map(|shader| shaders.get(shader))
            .collect();
        entry.linked = stages.len() == 2 && stages.iter().all(|stage| stage.compiled);
        entry.uniforms = stages
            .iter()
            .flat_map(|stage| declared_uniforms(&stage.source))
            .collect();
        entry.log = match entry.linked {
            true => String::new(),
            false => "error: linking with uncompiled/unspecialized shader".to_owned(),
        };
        recorder.calls.push(Call::LinkProgram(program));
        Ok(())
    }

    fn use_program(&self, program: u32) -> GlResult<()> {
        let mut recorder = self.inner.borrow_mut();
        recorder.current_program = program;
        recorder.calls.push(Call::UseProgram(program));
        Ok(())
    }

    fn delete_program(&self, program: u32) -> GlResult<()> {
        self.inner.borrow_mut().programs.remove(&program);
        self.record(Call::DeleteProgram(program));
        Ok(())
    }

    fn object_status(&self, object: u32, validation: ProgramValidation) -> GlResult<bool> {
        let recorder = self.inner.borrow();
        Ok(match validation.is_program() {
            true => recorder.programs.get(&object).is_some_and(|p| p.linked),
            false => recorder.shaders.get(&object).is_some_and(|s| s.compiled),
        })
    }

    fn info_log(&self, object: u32, validation: ProgramValidation) -> GlResult<String> {
        let recorder = self.inner.borrow();
        Ok(match validation.is_program() {
            true => recorder
                .programs
                .get(&object)
                .map(|program| program.log.clone())
                .unwrap_or_default(),
            false => match recorder.shaders.get(&object) {
                Some(shader) if !shader.compiled => {
                    "0:1(1): error: function `main' is not defined".to_owned()
                }
                _ => String::new(),
            },
        })
    }

    fn uniform_location(&self, program: u32, name: &CStr) -> GlResult<i32> {
        let recorder = self.inner.borrow();
        let name = name.to_string_lossy();
        Ok(recorder
            .programs
            .get(&program)
            .filter(|program| program.linked)
            .and_then(|program| program.uniforms.iter().position(|uniform| *uniform == name))
            .map_or(-1, |location| location as i32))
    }

    fn uniform(&self, location: i32, value: UniformKind) -> GlResult<()> {
        let mut recorder = self.inner.borrow_mut();
        let current = recorder.current_program;
        if location >= 0 {
            if let Some(program) = recorder.programs.get_mut(&current) {
                program.values.insert(location, value);
            }
        }
        recorder.calls.push(Call::Uniform(location, value));
        Ok(())
    }

    fn gen_vertex_array(&self) -> GlResult<u32> {
        let mut recorder = self.inner.borrow_mut();
        let id = recorder.allocate();
        recorder.calls.push(Call::GenVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: u32) -> GlResult<()> {
        self.record(Call::BindVertexArray(vertex_array));
        Ok(())
    }

    fn delete_vertex_array(&self, vertex_array: u32) -> GlResult<()> {
        self.record(Call::DeleteVertexArray(vertex_array));
        Ok(())
    }

    fn gen_buffer(&self) -> GlResult<u32> {
        let mut recorder = self.inner.borrow_mut();
        let id = recorder.allocate();
        recorder.calls.push(Call::GenBuffer(id));
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: u32) -> GlResult<()> {
        self.record(Call::BindBuffer(target, buffer));
        Ok(())
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> GlResult<()> {
        self.record(Call::BufferData(target, data.to_vec(), usage));
        Ok(())
    }

    fn delete_buffer(&self, buffer: u32) -> GlResult<()> {
        self.record(Call::DeleteBuffer(buffer));
        Ok(())
    }

    fn vertex_attrib_pointer(&self, attribute: VertexAttribute, stride: i32) -> GlResult<()> {
        self.record(Call::VertexAttribPointer(attribute, stride));
        Ok(())
    }

    fn enable_vertex_attrib_array(&self, location: u32) -> GlResult<()> {
        self.record(Call::EnableVertexAttribArray(location));
        Ok(())
    }

    fn gen_texture(&self) -> GlResult<u32> {
        let mut recorder = self.inner.borrow_mut();
        let id = recorder.allocate();
        recorder.calls.push(Call::GenTexture(id));
        Ok(id)
    }

    fn active_texture(&self, unit: u32) -> GlResult<()> {
        self.record(Call::ActiveTexture(unit));
        Ok(())
    }

    fn bind_texture(&self, texture: u32) -> GlResult<()> {
        self.record(Call::BindTexture(texture));
        Ok(())
    }

    fn tex_parameter(&self, parameter: TextureParameter) -> GlResult<()> {
        self.record(Call::TexParameter(parameter));
        Ok(())
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> GlResult<()> {
        self.record(Call::TexImage(width, height, pixels.len()));
        Ok(())
    }

    fn generate_mipmap(&self) -> GlResult<()> {
        self.record(Call::GenerateMipmap);
        Ok(())
    }

    fn delete_texture(&self, texture: u32) -> GlResult<()> {
        self.record(Call::DeleteTexture(texture));
        Ok(())
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> GlResult<()> {
        self.record(Call::Viewport(x, y, width, height));
        Ok(())
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> GlResult<()> {
        self.record(Call::ClearColor(r, g, b, a));
        Ok(())
    }

    fn clear(&self) -> GlResult<()> {
        self.record(Call::Clear);
        Ok(())
    }

    fn draw_arrays(&self, mode: ElementsMode, first: i32, count: i32) -> GlResult<()> {
        self.record(Call::DrawArrays(mode, first, count));
        Ok(())
    }

    fn draw_elements(
        &self,
        mode: ElementsMode,
        count: i32,
        index_type: IndexType,
        offset: usize,
    ) -> GlResult<()> {
        self.record(Call::DrawElements(mode, count, index_type, offset));
        Ok(())
    }
}
