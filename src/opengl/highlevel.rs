use std::path::Path;

use glcore::GLCoreError;

use super::backend::GlBackend;
use super::objects::{Buffer, Texture, VertexArray};
use super::shaders::{ProgramBuild, ShaderError, ShaderProgram};
use super::texture::TextureImage;
use super::types::{
    BufferTarget, BufferUsage, ElementsMode, GlResult, IndexType, IndicesBackend,
    TextureFilter, TextureParameter, TextureWrap, Vertex,
};

/// Geometry living on the GPU: a VAO with its vertex buffer and optional element buffer.
#[derive(Debug)]
pub struct Mesh<B: GlBackend> {
    mode: ElementsMode,
    vertex_count: i32,
    indices: Option<(IndexType, i32)>,
    // Declared before the buffers so the VAO goes first on drop.
    vertex_array: VertexArray<B>,
    _vertex_buffer: Buffer<B>,
    _index_buffer: Option<Buffer<B>>,
}

impl<B: GlBackend> Mesh<B> {
    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> Option<i32> {
        self.indices.map(|(_, count)| count)
    }
}

#[derive(Debug, Clone)]
pub struct SimpleGL<B: GlBackend> {
    core: B,
}

impl<B: GlBackend> SimpleGL<B> {
    pub fn new(core: B) -> SimpleGL<B> {
        SimpleGL { core }
    }

    pub fn core(&self) -> &B {
        &self.core
    }

    pub fn new_shader_program_from_files<P0: AsRef<Path>, P1: AsRef<Path>>(
        &self,
        vertex: P0,
        fragment: P1,
    ) -> Result<ShaderProgram<B>, ShaderError> {
        ShaderProgram::from_files(self.core.clone(), vertex, fragment)
    }

    pub fn new_shader_program_lenient<P0: AsRef<Path>, P1: AsRef<Path>>(
        &self,
        vertex: P0,
        fragment: P1,
    ) -> Result<ProgramBuild<B>, ShaderError> {
        ShaderProgram::from_files_lenient(self.core.clone(), vertex, fragment)
    }

    pub fn clear(&self, r: f32, g: f32, b: f32, a: f32) -> GlResult<()> {
        self.core.clear_color(r, g, b, a)?;
        self.core.clear()
    }

    pub fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> GlResult<()> {
        self.core.viewport(x, y, width, height)
    }

    /// Keeps the viewport covering the whole framebuffer after a resize.
    pub fn framebuffer_resized(&self, width: u32, height: u32) -> GlResult<()> {
        self.viewport(0, 0, width as i32, height as i32)
    }

    pub fn upload_mesh<V: Vertex>(&self, mode: ElementsMode, vertices: &[V]) -> GlResult<Mesh<B>> {
        self.upload_mesh_inner::<V, u32>(mode, vertices, None)
    }

    pub fn upload_indexed_mesh<V: Vertex, I: IndicesBackend>(
        &self,
        mode: ElementsMode,
        vertices: &[V],
        indices: &[I],
    ) -> GlResult<Mesh<B>> {
        if indices.is_empty() {
            return Err(GLCoreError::InvalidValue("Index list cannot be zero sized"));
        }
        self.upload_mesh_inner(mode, vertices, Some(indices))
    }

    fn upload_mesh_inner<V: Vertex, I: IndicesBackend>(
        &self,
        mode: ElementsMode,
        vertices: &[V],
        indices: Option<&[I]>,
    ) -> GlResult<Mesh<B>> {
        if vertices.is_empty() {
            return Err(GLCoreError::InvalidValue(
                "Polygon vector cannot be zero sized",
            ));
        }

        // The VAO captures the element buffer binding and the attribute layout
        let vertex_array = VertexArray::new(self.core.clone())?;
        vertex_array.bind()?;

        let vertex_buffer = Buffer::with_data(
            self.core.clone(),
            BufferTarget::Array,
            bytemuck::cast_slice(vertices),
            BufferUsage::StaticDraw,
        )?;
        let index_buffer = indices
            .map(|indices| {
                Buffer::with_data(
                    self.core.clone(),
                    BufferTarget::ElementArray,
                    bytemuck::cast_slice(indices),
                    BufferUsage::StaticDraw,
                )
            })
            .transpose()?;

        for attribute in V::ATTRIBUTES {
            self.core.vertex_attrib_pointer(*attribute, V::stride())?;
            self.core.enable_vertex_attrib_array(attribute.location)?;
        }

        self.core.bind_buffer(BufferTarget::Array, 0)?;
        vertex_array.unbind()?;

        Ok(Mesh {
            mode,
            vertex_count: vertices.len() as i32,
            indices: indices.map(|indices| (I::INDEX_TYPE, indices.len() as i32)),
            vertex_array,
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
        })
    }

    pub fn draw(&self, mesh: &Mesh<B>) -> GlResult<()> {
        mesh.vertex_array.bind()?;
        match mesh.indices {
            Some((index_type, count)) => {
                self.core.draw_elements(mesh.mode, count, index_type, 0)?
            }
            None => self.core.draw_arrays(mesh.mode, 0, mesh.vertex_count)?,
        }
        mesh.vertex_array.unbind()
    }

    /// Uploads `image` with repeat wrapping and trilinear minification, then builds the
    /// mipmap chain. The texture is left bound.
    pub fn upload_texture(&self, image: &TextureImage) -> GlResult<Texture<B>> {
        let texture = Texture::new(self.core.clone())?;
        self.core.bind_texture(texture.id())?;
        for parameter in [
            TextureParameter::WrapS(TextureWrap::Repeat),
            TextureParameter::WrapT(TextureWrap::Repeat),
            TextureParameter::MinFilter(TextureFilter::LinearMipmapLinear),
            TextureParameter::MagFilter(TextureFilter::Linear),
        ] {
            self.core.tex_parameter(parameter)?;
        }
        self.core
            .tex_image_rgba(image.width(), image.height(), image.pixels())?;
        self.core.generate_mipmap()?;
        Ok(texture)
    }
}
