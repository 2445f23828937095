use std::ffi::{CStr, c_void};
use std::fmt::Debug;

use glcore::{GL_1_0_g, GL_1_1_g, GL_1_3_g, GL_1_5_g, GL_2_0_g, GL_3_0_g, GLCore};

use super::shaders::{ProgramValidation, ShaderKind, UniformKind};
use super::types::{
    BufferTarget, BufferUsage, ElementsMode, GlResult, IndexType, TextureParameter,
    VertexAttribute,
};

/// Upper bound on the bytes fetched from a shader or program info log.
pub const INFO_LOG_CAPACITY: usize = 512;

/// Every OpenGL entry point the renderer touches.
///
/// Object names are the raw `u32` handles handed out by the driver. Ownership of those
/// handles lives in [`super::objects`] and [`super::shaders`]; the backend itself only
/// forwards calls. Textures always target `GL_TEXTURE_2D`.
pub trait GlBackend: Clone + Debug {
    fn create_shader(&self, kind: ShaderKind) -> GlResult<u32>;
    fn shader_source(&self, shader: u32, source: &CStr) -> GlResult<()>;
    fn compile_shader(&self, shader: u32) -> GlResult<()>;
    fn delete_shader(&self, shader: u32) -> GlResult<()>;

    fn create_program(&self) -> GlResult<u32>;
    fn attach_shader(&self, program: u32, shader: u32) -> GlResult<()>;
    fn detach_shader(&self, program: u32, shader: u32) -> GlResult<()>;
    fn link_program(&self, program: u32) -> GlResult<()>;
    fn use_program(&self, program: u32) -> GlResult<()>;
    fn delete_program(&self, program: u32) -> GlResult<()>;

    /// Compile or link status of a shader or program object.
    fn object_status(&self, object: u32, validation: ProgramValidation) -> GlResult<bool>;
    /// Info log of a shader or program object, at most [`INFO_LOG_CAPACITY`] bytes.
    fn info_log(&self, object: u32, validation: ProgramValidation) -> GlResult<String>;

    fn uniform_location(&self, program: u32, name: &CStr) -> GlResult<i32>;
    fn uniform(&self, location: i32, value: UniformKind) -> GlResult<()>;

    fn gen_vertex_array(&self) -> GlResult<u32>;
    fn bind_vertex_array(&self, vertex_array: u32) -> GlResult<()>;
    fn delete_vertex_array(&self, vertex_array: u32) -> GlResult<()>;

    fn gen_buffer(&self) -> GlResult<u32>;
    fn bind_buffer(&self, target: BufferTarget, buffer: u32) -> GlResult<()>;
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> GlResult<()>;
    fn delete_buffer(&self, buffer: u32) -> GlResult<()>;

    fn vertex_attrib_pointer(&self, attribute: VertexAttribute, stride: i32) -> GlResult<()>;
    fn enable_vertex_attrib_array(&self, location: u32) -> GlResult<()>;

    fn gen_texture(&self) -> GlResult<u32>;
    fn active_texture(&self, unit: u32) -> GlResult<()>;
    fn bind_texture(&self, texture: u32) -> GlResult<()>;
    fn tex_parameter(&self, parameter: TextureParameter) -> GlResult<()>;
    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> GlResult<()>;
    fn generate_mipmap(&self) -> GlResult<()>;
    fn delete_texture(&self, texture: u32) -> GlResult<()>;

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> GlResult<()>;
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> GlResult<()>;
    /// Clears the colour and depth buffers.
    fn clear(&self) -> GlResult<()>;

    fn draw_arrays(&self, mode: ElementsMode, first: i32, count: i32) -> GlResult<()>;
    fn draw_elements(
        &self,
        mode: ElementsMode,
        count: i32,
        index_type: IndexType,
        offset: usize,
    ) -> GlResult<()>;
}

impl GlBackend for GLCore {
    fn create_shader(&self, kind: ShaderKind) -> GlResult<u32> {
        self.glCreateShader(kind.kind())
    }

    fn shader_source(&self, shader: u32, source: &CStr) -> GlResult<()> {
        let shader_sources = [source.as_ptr()];
        self.glShaderSource(shader, 1, shader_sources.as_ptr(), std::ptr::null())
    }

    fn compile_shader(&self, shader: u32) -> GlResult<()> {
        self.glCompileShader(shader)
    }

    fn delete_shader(&self, shader: u32) -> GlResult<()> {
        self.glDeleteShader(shader)
    }

    fn create_program(&self) -> GlResult<u32> {
        self.glCreateProgram()
    }

    fn attach_shader(&self, program: u32, shader: u32) -> GlResult<()> {
        self.glAttachShader(program, shader)
    }

    fn detach_shader(&self, program: u32, shader: u32) -> GlResult<()> {
        self.glDetachShader(program, shader)
    }

    fn link_program(&self, program: u32) -> GlResult<()> {
        self.glLinkProgram(program)
    }

    fn use_program(&self, program: u32) -> GlResult<()> {
        self.glUseProgram(program)
    }

    fn delete_program(&self, program: u32) -> GlResult<()> {
        self.glDeleteProgram(program)
    }

    fn object_status(&self, object: u32, validation: ProgramValidation) -> GlResult<bool> {
        let mut status = 0;
        match validation.is_program() {
            true => self.glGetProgramiv(object, validation.pname(), &mut status)?,
            false => self.glGetShaderiv(object, validation.pname(), &mut status)?,
        }
        Ok(status != 0)
    }

    fn info_log(&self, object: u32, validation: ProgramValidation) -> GlResult<String> {
        let mut log: [glcore::GLchar; INFO_LOG_CAPACITY] = [0; INFO_LOG_CAPACITY];
        let mut written = 0;
        match validation.is_program() {
            true => self.glGetProgramInfoLog(
                object,
                INFO_LOG_CAPACITY as i32,
                &mut written,
                log.as_mut_ptr(),
            )?,
            false => self.glGetShaderInfoLog(
                object,
                INFO_LOG_CAPACITY as i32,
                &mut written,
                log.as_mut_ptr(),
            )?,
        }
        let bytes: Vec<u8> = log
            .into_iter()
            .take(written.max(0) as usize)
            .map(|byte| byte as u8)
            .collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn uniform_location(&self, program: u32, name: &CStr) -> GlResult<i32> {
        self.glGetUniformLocation(program, name.as_ptr())
    }

    fn uniform(&self, location: i32, value: UniformKind) -> GlResult<()> {
        match value {
            UniformKind::Uniform1f(v0) => self.glUniform1f(location, v0),
            UniformKind::Uniform4f(v0, v1, v2, v3) => self.glUniform4f(location, v0, v1, v2, v3),
            UniformKind::Uniform1i(v0) => self.glUniform1i(location, v0),
        }
    }

    fn gen_vertex_array(&self) -> GlResult<u32> {
        let mut vertex_array = 0;
        self.glGenVertexArrays(1, &mut vertex_array)?;
        Ok(vertex_array)
    }

    fn bind_vertex_array(&self, vertex_array: u32) -> GlResult<()> {
        self.glBindVertexArray(vertex_array)
    }

    fn delete_vertex_array(&self, vertex_array: u32) -> GlResult<()> {
        self.glDeleteVertexArrays(1, [vertex_array].as_ptr())
    }

    fn gen_buffer(&self) -> GlResult<u32> {
        let mut buffer = 0;
        self.glGenBuffers(1, &mut buffer)?;
        Ok(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: u32) -> GlResult<()> {
        self.glBindBuffer(target.into_opengl_target(), buffer)
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> GlResult<()> {
        self.glBufferData(
            target.into_opengl_target(),
            data.len(),
            data.as_ptr() as *const c_void,
            usage.into_opengl_usage(),
        )
    }

    fn delete_buffer(&self, buffer: u32) -> GlResult<()> {
        self.glDeleteBuffers(1, [buffer].as_ptr())
    }

    fn vertex_attrib_pointer(&self, attribute: VertexAttribute, stride: i32) -> GlResult<()> {
        self.glVertexAttribPointer(
            attribute.location,
            attribute.components,
            glcore::GL_FLOAT,
            glcore::GL_FALSE as u8,
            stride,
            attribute.offset as *const c_void,
        )
    }

    fn enable_vertex_attrib_array(&self, location: u32) -> GlResult<()> {
        self.glEnableVertexAttribArray(location)
    }

    fn gen_texture(&self) -> GlResult<u32> {
        let mut texture = 0;
        self.glGenTextures(1, &mut texture)?;
        Ok(texture)
    }

    fn active_texture(&self, unit: u32) -> GlResult<()> {
        self.glActiveTexture(glcore::GL_TEXTURE0 + unit)
    }

    fn bind_texture(&self, texture: u32) -> GlResult<()> {
        self.glBindTexture(glcore::GL_TEXTURE_2D, texture)
    }

    fn tex_parameter(&self, parameter: TextureParameter) -> GlResult<()> {
        let (pname, param) = parameter.into_opengl_pair();
        self.glTexParameteri(glcore::GL_TEXTURE_2D, pname, param)
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) -> GlResult<()> {
        self.glTexImage2D(
            glcore::GL_TEXTURE_2D,
            0,
            glcore::GL_RGBA as i32,
            width as i32,
            height as i32,
            0,
            glcore::GL_RGBA,
            glcore::GL_UNSIGNED_BYTE,
            pixels.as_ptr() as *const c_void,
        )
    }

    fn generate_mipmap(&self) -> GlResult<()> {
        self.glGenerateMipmap(glcore::GL_TEXTURE_2D)
    }

    fn delete_texture(&self, texture: u32) -> GlResult<()> {
        self.glDeleteTextures(1, [texture].as_ptr())
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> GlResult<()> {
        self.glViewport(x, y, width, height)
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> GlResult<()> {
        self.glClearColor(r, g, b, a)
    }

    fn clear(&self) -> GlResult<()> {
        self.glClear(glcore::GL_COLOR_BUFFER_BIT | glcore::GL_DEPTH_BUFFER_BIT)
    }

    fn draw_arrays(&self, mode: ElementsMode, first: i32, count: i32) -> GlResult<()> {
        self.glDrawArrays(mode.into_opengl_mode(), first, count)
    }

    fn draw_elements(
        &self,
        mode: ElementsMode,
        count: i32,
        index_type: IndexType,
        offset: usize,
    ) -> GlResult<()> {
        self.glDrawElements(
            mode.into_opengl_mode(),
            count,
            index_type.into_opengl_type(),
            offset as *const c_void,
        )
    }
}
