use std::ffi::CString;
use std::io;
use std::path::{Path, PathBuf};

use glcore::GLCoreError;
use tracing::{debug, error, warn};

use super::backend::GlBackend;
use super::types::GlResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramValidation {
    Vertex,
    Fragment,
    Linking,
}

impl ProgramValidation {
    fn label(self) -> &'static str {
        match self {
            ProgramValidation::Vertex => "compiling vertex",
            ProgramValidation::Fragment => "compiling fragment",
            ProgramValidation::Linking => "linking shaders",
        }
    }

    pub fn pname(self) -> u32 {
        match self.is_program() {
            true => glcore::GL_LINK_STATUS,
            false => glcore::GL_COMPILE_STATUS,
        }
    }

    pub fn is_program(self) -> bool {
        match self {
            ProgramValidation::Vertex => false,
            ProgramValidation::Fragment => false,
            ProgramValidation::Linking => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub fn kind(self) -> u32 {
        match self {
            ShaderKind::Vertex => glcore::GL_VERTEX_SHADER,
            ShaderKind::Fragment => glcore::GL_FRAGMENT_SHADER,
        }
    }

    /// Stage marker used in diagnostic tags.
    pub fn tag(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "VERTEX",
            ShaderKind::Fragment => "FRAGMENT",
        }
    }
}

impl From<ShaderKind> for ProgramValidation {
    fn from(value: ShaderKind) -> Self {
        match value {
            ShaderKind::Vertex => ProgramValidation::Vertex,
            ShaderKind::Fragment => ProgramValidation::Fragment,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
    #[error("ERROR::SHADER::FILE_NOT_SUCCESSFULLY_READ {}: {}", .path.display(), .source)]
    Read {
        kind: ShaderKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ERROR::SHADER::{}::INVALID_SOURCE: source contains a nul byte", .kind.tag())]
    InteriorNul { kind: ShaderKind },
    #[error("ERROR::SHADER::{}::COMPILATION_FAILED\n{}", .kind.tag(), .log)]
    Compile { kind: ShaderKind, log: String },
    #[error("ERROR::SHADER::LINKING_FAILED\n{log}")]
    Link { log: String },
    #[error("OpenGL call failed: {0:?}")]
    OpenGL(GLCoreError),
}

impl From<GLCoreError> for ShaderError {
    fn from(value: GLCoreError) -> Self {
        ShaderError::OpenGL(value)
    }
}

impl ShaderError {
    /// Stage the failure belongs to, `None` for link and driver failures.
    pub fn kind(&self) -> Option<ShaderKind> {
        match self {
            ShaderError::Read { kind, .. }
            | ShaderError::InteriorNul { kind }
            | ShaderError::Compile { kind, .. } => Some(*kind),
            ShaderError::Link { .. } | ShaderError::OpenGL(_) => None,
        }
    }
}

fn read_source(kind: ShaderKind, path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn validate_shader_step<B: GlBackend>(
    gl: &B,
    shader_or_program: u32,
    validate_type: ProgramValidation,
) -> Result<(), ShaderError> {
    let succeeded = gl.object_status(shader_or_program, validate_type)?;
    let log = gl.info_log(shader_or_program, validate_type)?;

    if succeeded {
        if !log.trim().is_empty() {
            debug!("{} reported: {}", validate_type.label(), log.trim_end());
        }
        return Ok(());
    }
    Err(match validate_type {
        ProgramValidation::Vertex => ShaderError::Compile {
            kind: ShaderKind::Vertex,
            log,
        },
        ProgramValidation::Fragment => ShaderError::Compile {
            kind: ShaderKind::Fragment,
            log,
        },
        ProgramValidation::Linking => ShaderError::Link { log },
    })
}

/// A single compiled stage. The shader object is deleted when this is dropped.
#[derive(Debug)]
pub struct Shader<B: GlBackend> {
    shader_id: u32,
    kind: ShaderKind,
    gl: B,
}

impl<B: GlBackend> Shader<B> {
    /// Submits `source` and compiles it without checking the compile status.
    pub fn compile(gl: B, kind: ShaderKind, source: &str) -> Result<Shader<B>, ShaderError> {
        let cstr_source =
            CString::new(source).map_err(|_| ShaderError::InteriorNul { kind })?;
        let shader_id = gl.create_shader(kind)?;
        let shader = Shader {
            shader_id,
            kind,
            gl,
        };
        shader.gl.shader_source(shader.shader_id, &cstr_source)?;
        shader.gl.compile_shader(shader.shader_id)?;
        Ok(shader)
    }

    pub fn load_shader(gl: B, kind: ShaderKind, source: &str) -> Result<Shader<B>, ShaderError> {
        let shader = Self::compile(gl, kind, source)?;
        shader.validate()?;
        Ok(shader)
    }

    pub fn load_shader_from_file<P: AsRef<Path>>(
        gl: B,
        kind: ShaderKind,
        path: P,
    ) -> Result<Shader<B>, ShaderError> {
        let source = read_source(kind, path.as_ref())?;
        Self::load_shader(gl, kind, &source)
    }

    pub fn validate(&self) -> Result<(), ShaderError> {
        validate_shader_step(&self.gl, self.shader_id, self.kind.into())
    }

}

impl<B: GlBackend> Drop for Shader<B> {
    fn drop(&mut self) {
        if let Err(err) = self.gl.delete_shader(self.shader_id) {
            warn!("failed to delete {:?} shader {}: {err:?}", self.kind, self.shader_id);
        }
    }
}

#[derive(Debug)]
pub struct ShaderBundle<B: GlBackend> {
    vertex: Shader<B>,
    fragment: Shader<B>,
}

impl<B: GlBackend> ShaderBundle<B> {
    pub fn new(vertex: Shader<B>, fragment: Shader<B>) -> GlResult<ShaderBundle<B>> {
        if !matches!(vertex.kind, ShaderKind::Vertex) {
            return Err(GLCoreError::InvalidValue(
                "Passed vertex shader is not a vertex shader",
            ));
        }
        if !matches!(fragment.kind, ShaderKind::Fragment) {
            return Err(GLCoreError::InvalidValue(
                "Passed fragment shader is not a fragment shader",
            ));
        }
        Ok(ShaderBundle { vertex, fragment })
    }

    pub fn new_from_sources(
        gl: B,
        vertex: &str,
        fragment: &str,
    ) -> Result<ShaderBundle<B>, ShaderError> {
        Ok(ShaderBundle {
            vertex: Shader::load_shader(gl.clone(), ShaderKind::Vertex, vertex)?,
            fragment: Shader::load_shader(gl, ShaderKind::Fragment, fragment)?,
        })
    }

    pub fn new_from_files<P0: AsRef<Path>, P1: AsRef<Path>>(
        gl: B,
        vertex: P0,
        fragment: P1,
    ) -> Result<ShaderBundle<B>, ShaderError> {
        Ok(ShaderBundle {
            vertex: Shader::load_shader_from_file(gl.clone(), ShaderKind::Vertex, vertex)?,
            fragment: Shader::load_shader_from_file(gl, ShaderKind::Fragment, fragment)?,
        })
    }

    /// Attaches both stages, links, and detaches them again. The stage objects are
    /// deleted once this returns, whatever the link status was.
    pub fn link_unchecked(self) -> GlResult<ShaderProgram<B>> {
        let gl = self.vertex.gl.clone();
        let program = ShaderProgram {
            program: gl.create_program()?,
            gl,
        };
        program.gl.attach_shader(program.program, self.vertex.shader_id)?;
        program.gl.attach_shader(program.program, self.fragment.shader_id)?;
        program.gl.link_program(program.program)?;

        program.gl.detach_shader(program.program, self.vertex.shader_id)?;
        program.gl.detach_shader(program.program, self.fragment.shader_id)?;
        Ok(program)
    }

    pub fn link(self) -> Result<ShaderProgram<B>, ShaderError> {
        let program = self.link_unchecked()?;
        validate_shader_step(&program.gl, program.program, ProgramValidation::Linking)?;
        Ok(program)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformKind {
    Uniform1f(f32),
    Uniform4f(f32, f32, f32, f32),
    Uniform1i(i32),
}

/// Result of the lenient build: a program that may be unusable, plus everything that
/// went wrong on the way.
#[derive(Debug)]
#[must_use]
pub struct ProgramBuild<B: GlBackend> {
    pub program: ShaderProgram<B>,
    pub diagnostics: Vec<ShaderError>,
}

impl<B: GlBackend> ProgramBuild<B> {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_result(mut self) -> Result<ShaderProgram<B>, ShaderError> {
        match self.diagnostics.is_empty() {
            true => Ok(self.program),
            false => Err(self.diagnostics.remove(0)),
        }
    }
}

/// A linked program object. Deleted when dropped.
#[derive(Debug)]
pub struct ShaderProgram<B: GlBackend> {
    program: u32,
    gl: B,
}

impl<B: GlBackend> ShaderProgram<B> {
    /// Reads, compiles and links both stages, stopping at the first failure.
    pub fn from_files<P0: AsRef<Path>, P1: AsRef<Path>>(
        gl: B,
        vertex: P0,
        fragment: P1,
    ) -> Result<ShaderProgram<B>, ShaderError> {
        ShaderBundle::new_from_files(gl, vertex, fragment)?.link()
    }

    pub fn from_sources(
        gl: B,
        vertex: &str,
        fragment: &str,
    ) -> Result<ShaderProgram<B>, ShaderError> {
        ShaderBundle::new_from_sources(gl, vertex, fragment)?.link()
    }

    /// Always produces a program. If either file can't be read, both stages are built
    /// from empty sources. Read, compile and link failures are logged and collected
    /// instead of aborting.
    ///
    /// Only a failing driver call ends the build early.
    pub fn from_files_lenient<P0: AsRef<Path>, P1: AsRef<Path>>(
        gl: B,
        vertex: P0,
        fragment: P1,
    ) -> Result<ProgramBuild<B>, ShaderError> {
        let mut diagnostics = Vec::new();
        let sources = read_source(ShaderKind::Vertex, vertex.as_ref()).and_then(|vertex_code| {
            Ok((vertex_code, read_source(ShaderKind::Fragment, fragment.as_ref())?))
        });
        // Both stages get empty sources as soon as either file fails to read
        let (vertex, fragment) = sources.unwrap_or_else(|err| {
            diagnostics.push(err);
            (String::new(), String::new())
        });

        let build = Self::from_sources_lenient_inner(gl, &vertex, &fragment, diagnostics)?;
        build.diagnostics.iter().for_each(|diagnostic| error!("{diagnostic}"));
        Ok(build)
    }

    pub fn from_sources_lenient(
        gl: B,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramBuild<B>, ShaderError> {
        let build = Self::from_sources_lenient_inner(gl, vertex, fragment, Vec::new())?;
        build.diagnostics.iter().for_each(|diagnostic| error!("{diagnostic}"));
        Ok(build)
    }

    fn from_sources_lenient_inner(
        gl: B,
        vertex: &str,
        fragment: &str,
        mut diagnostics: Vec<ShaderError>,
    ) -> Result<ProgramBuild<B>, ShaderError> {
        let mut compile_stage = |kind, source: &str| -> Result<Shader<B>, ShaderError> {
            let shader = match Shader::compile(gl.clone(), kind, source) {
                Err(err @ ShaderError::InteriorNul { .. }) => {
                    diagnostics.push(err);
                    Shader::compile(gl.clone(), kind, "")?
                }
                other => other?,
            };
            if let Err(err) = shader.validate() {
                check_driver_error(err, &mut diagnostics)?;
            }
            Ok(shader)
        };
        let vertex = compile_stage(ShaderKind::Vertex, vertex)?;
        let fragment = compile_stage(ShaderKind::Fragment, fragment)?;

        let program = ShaderBundle::new(vertex, fragment)?.link_unchecked()?;
        if let Err(err) =
            validate_shader_step(&program.gl, program.program, ProgramValidation::Linking)
        {
            check_driver_error(err, &mut diagnostics)?;
        }

        Ok(ProgramBuild {
            program,
            diagnostics,
        })
    }

    pub fn use_program(&self) -> GlResult<()> {
        self.gl.use_program(self.program)
    }

    pub fn id(&self) -> u32 {
        self.program
    }

    /// Looks up `name` on every call. Unknown names resolve to `-1`, which the driver
    /// silently ignores. The value lands in whichever program is currently in use.
    pub fn set_uniform(&self, name: &str, uniform: UniformKind) -> GlResult<()> {
        let variable = CString::new(name)
            .map_err(|_| GLCoreError::InvalidValue("Uniform name contains a nul byte"))?;
        let location = self.gl.uniform_location(self.program, &variable)?;
        self.gl.uniform(location, uniform)
    }

    pub fn set_bool(&self, name: &str, value: bool) -> GlResult<()> {
        self.set_uniform(name, UniformKind::Uniform1i(value as i32))
    }

    pub fn set_int(&self, name: &str, value: i32) -> GlResult<()> {
        self.set_uniform(name, UniformKind::Uniform1i(value))
    }

    pub fn set_float(&self, name: &str, value: f32) -> GlResult<()> {
        self.set_uniform(name, UniformKind::Uniform1f(value))
    }

    pub fn set_vec4(&self, name: &str, value: [f32; 4]) -> GlResult<()> {
        let [x, y, z, w] = value;
        self.set_uniform(name, UniformKind::Uniform4f(x, y, z, w))
    }
}

impl<B: GlBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        if let Err(err) = self.gl.delete_program(self.program) {
            warn!("failed to delete shader program {}: {err:?}", self.program);
        }
    }
}

/// Keeps compile/link diagnostics, lets driver failures through.
fn check_driver_error(
    err: ShaderError,
    diagnostics: &mut Vec<ShaderError>,
) -> Result<(), ShaderError> {
    match err {
        ShaderError::OpenGL(_) => Err(err),
        diagnostic => {
            diagnostics.push(diagnostic);
            Ok(())
        }
    }
}
