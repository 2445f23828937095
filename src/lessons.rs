//! The five tutorial steps, from an empty window up to a textured quad.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::opengl::backend::GlBackend;
use crate::opengl::highlevel::{Mesh, SimpleGL};
use crate::opengl::objects::Texture;
use crate::opengl::shaders::ShaderProgram;
use crate::opengl::texture::TextureImage;
use crate::opengl::types::{ElementsMode, PositionVertex, TexturedVertex};

pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

pub const TRIANGLE_VERTICES: [PositionVertex; 3] = [
    PositionVertex::new(-0.5, -0.5, 0.0),
    PositionVertex::new(0.5, -0.5, 0.0),
    PositionVertex::new(0.0, 0.5, 0.0),
];

/// Corners in the order top right, bottom right, bottom left, top left.
pub const QUAD_VERTICES: [PositionVertex; 4] = [
    PositionVertex::new(0.5, 0.5, 0.0),
    PositionVertex::new(0.5, -0.5, 0.0),
    PositionVertex::new(-0.5, -0.5, 0.0),
    PositionVertex::new(-0.5, 0.5, 0.0),
];

/// Two triangles sharing the 1-3 diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

pub const TEXTURED_QUAD_VERTICES: [TexturedVertex; 4] = [
    TexturedVertex {
        position: [0.5, 0.5, 0.0],
        color: [1.0, 0.0, 0.0],
        tex_coord: [1.0, 1.0],
    },
    TexturedVertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0],
        tex_coord: [1.0, 0.0],
    },
    TexturedVertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0],
        tex_coord: [0.0, 0.0],
    },
    TexturedVertex {
        position: [-0.5, 0.5, 0.0],
        color: [1.0, 1.0, 0.0],
        tex_coord: [0.0, 1.0],
    },
];

pub const TEXTURE_FILE: &str = "textures/wooden_container.png";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lesson {
    /// Only clears the window.
    Window,
    Triangle,
    /// Triangle whose colour comes from a time-driven uniform.
    UniformColor,
    IndexedQuad,
    #[default]
    TexturedQuad,
}

impl Lesson {
    pub const ALL: [Lesson; 5] = [
        Lesson::Window,
        Lesson::Triangle,
        Lesson::UniformColor,
        Lesson::IndexedQuad,
        Lesson::TexturedQuad,
    ];

    fn shader_names(self) -> Option<(&'static str, &'static str)> {
        match self {
            Lesson::Window => None,
            Lesson::Triangle | Lesson::IndexedQuad => Some(("flat.vert", "flat.frag")),
            Lesson::UniformColor => Some(("flat.vert", "uniform_color.frag")),
            Lesson::TexturedQuad => Some(("textured.vert", "textured.frag")),
        }
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lesson::Window => "window",
            Lesson::Triangle => "triangle",
            Lesson::UniformColor => "uniform",
            Lesson::IndexedQuad => "quad",
            Lesson::TexturedQuad => "texture",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown lesson {0:?}, expected 1-5 or one of window, triangle, uniform, quad, texture")]
pub struct UnknownLesson(String);

impl FromStr for Lesson {
    type Err = UnknownLesson;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(number) = s.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|index| Lesson::ALL.get(index).copied())
                .ok_or(UnknownLesson(s));
        }
        Lesson::ALL
            .into_iter()
            .find(|lesson| lesson.to_string() == s)
            .ok_or(UnknownLesson(s))
    }
}

/// GPU state for one lesson, released when dropped.
#[derive(Debug)]
pub struct Scene<B: GlBackend> {
    lesson: Lesson,
    program: Option<ShaderProgram<B>>,
    mesh: Option<Mesh<B>>,
    texture: Option<Texture<B>>,
}

impl<B: GlBackend> Scene<B> {
    pub fn build(gl: &SimpleGL<B>, lesson: Lesson, config: &Config) -> Result<Scene<B>> {
        info!("setting up lesson {lesson}");
        let program = match lesson.shader_names() {
            Some((vertex, fragment)) => Some(load_program(
                gl,
                &config.shader_dir.join(vertex),
                &config.shader_dir.join(fragment),
                config.lenient_shaders,
            )?),
            None => None,
        };

        let mesh = match lesson {
            Lesson::Window => None,
            Lesson::Triangle | Lesson::UniformColor => {
                Some(gl.upload_mesh(ElementsMode::Triangles, &TRIANGLE_VERTICES)?)
            }
            Lesson::IndexedQuad => Some(gl.upload_indexed_mesh(
                ElementsMode::Triangles,
                &QUAD_VERTICES,
                &QUAD_INDICES,
            )?),
            Lesson::TexturedQuad => Some(gl.upload_indexed_mesh(
                ElementsMode::Triangles,
                &TEXTURED_QUAD_VERTICES,
                &QUAD_INDICES,
            )?),
        };

        let texture = match lesson {
            Lesson::TexturedQuad => {
                let image = load_texture_image(&config.asset_dir.join(TEXTURE_FILE));
                Some(gl.upload_texture(&image)?)
            }
            _ => None,
        };

        // Samplers and other constant uniforms only need setting once
        if let (Lesson::TexturedQuad, Some(program)) = (lesson, &program) {
            program.use_program()?;
            program.set_int("surface", 0)?;
        }

        Ok(Scene {
            lesson,
            program,
            mesh,
            texture,
        })
    }

    pub fn lesson(&self) -> Lesson {
        self.lesson
    }

    /// Renders one frame. `elapsed` drives the animated uniforms.
    pub fn draw(&self, gl: &SimpleGL<B>, elapsed: Duration) -> Result<()> {
        let [r, g, b, a] = CLEAR_COLOR;
        gl.clear(r, g, b, a)?;

        let (Some(program), Some(mesh)) = (&self.program, &self.mesh) else {
            return Ok(());
        };
        if let Some(texture) = &self.texture {
            texture.bind_to_unit(0)?;
        }
        program.use_program()?;

        let seconds = elapsed.as_secs_f32();
        match self.lesson {
            Lesson::UniformColor => {
                program.set_vec4("tint", [0.0, pulse(seconds), 0.0, 1.0])?;
            }
            Lesson::TexturedQuad => {
                program.set_bool("tint_with_vertex_color", (seconds as u64) % 4 < 2)?;
                program.set_float("brightness", 0.75 + 0.25 * pulse(seconds))?;
            }
            _ => {}
        }

        gl.draw(mesh)?;
        Ok(())
    }
}

/// Oscillates between 0 and 1.
pub fn pulse(seconds: f32) -> f32 {
    seconds.sin() / 2.0 + 0.5
}

fn load_program<B: GlBackend>(
    gl: &SimpleGL<B>,
    vertex: &Path,
    fragment: &Path,
    lenient: bool,
) -> Result<ShaderProgram<B>> {
    if !lenient {
        return Ok(gl.new_shader_program_from_files(vertex, fragment)?);
    }
    let build = gl.new_shader_program_lenient(vertex, fragment)?;
    if !build.is_clean() {
        warn!(
            "continuing with a shader program that has {} problem(s)",
            build.diagnostics.len()
        );
    }
    Ok(build.program)
}

fn load_texture_image(path: &Path) -> TextureImage {
    TextureImage::load(path, true).unwrap_or_else(|err| {
        warn!("Failed to load texture {}: {err}", path.display());
        TextureImage::checkerboard(64, 8)
    })
}
