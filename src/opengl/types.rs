use bytemuck::{Pod, Zeroable};
use glcore::GLCoreError;

pub type GlResult<T> = Result<T, GLCoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementsMode {
    Triangles,
}

impl ElementsMode {
    pub fn into_opengl_mode(self) -> u32 {
        match self {
            ElementsMode::Triangles => glcore::GL_TRIANGLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

impl BufferTarget {
    pub fn into_opengl_target(self) -> u32 {
        match self {
            BufferTarget::Array => glcore::GL_ARRAY_BUFFER,
            BufferTarget::ElementArray => glcore::GL_ELEMENT_ARRAY_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw,
}

impl BufferUsage {
    pub fn into_opengl_usage(self) -> u32 {
        match self {
            BufferUsage::StaticDraw => glcore::GL_STATIC_DRAW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
}

impl IndexType {
    pub fn into_opengl_type(self) -> u32 {
        match self {
            IndexType::UnsignedByte => glcore::GL_UNSIGNED_BYTE,
            IndexType::UnsignedShort => glcore::GL_UNSIGNED_SHORT,
            IndexType::UnsignedInt => glcore::GL_UNSIGNED_INT,
        }
    }
}

/// Integer types that can back an element buffer.
pub trait IndicesBackend: Pod {
    const INDEX_TYPE: IndexType;
}

impl IndicesBackend for u8 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedByte;
}

impl IndicesBackend for u16 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedShort;
}

impl IndicesBackend for u32 {
    const INDEX_TYPE: IndexType = IndexType::UnsignedInt;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Linear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParameter {
    WrapS(TextureWrap),
    WrapT(TextureWrap),
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
}

impl TextureParameter {
    /// `(pname, param)` pair for `glTexParameteri`
    pub fn into_opengl_pair(self) -> (u32, i32) {
        let wrap = |wrap: TextureWrap| match wrap {
            TextureWrap::Repeat => glcore::GL_REPEAT as i32,
        };
        let filter = |filter: TextureFilter| match filter {
            TextureFilter::Linear => glcore::GL_LINEAR as i32,
            TextureFilter::LinearMipmapLinear => glcore::GL_LINEAR_MIPMAP_LINEAR as i32,
        };
        match self {
            TextureParameter::WrapS(w) => (glcore::GL_TEXTURE_WRAP_S, wrap(w)),
            TextureParameter::WrapT(w) => (glcore::GL_TEXTURE_WRAP_T, wrap(w)),
            TextureParameter::MinFilter(f) => (glcore::GL_TEXTURE_MIN_FILTER, filter(f)),
            TextureParameter::MagFilter(f) => (glcore::GL_TEXTURE_MAG_FILTER, filter(f)),
        }
    }
}

/// One `glVertexAttribPointer` entry, offsets and sizes in bytes/floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: i32,
    pub offset: usize,
}

/// A plain vertex struct that knows how its fields map onto shader attribute locations.
pub trait Vertex: Pod {
    const ATTRIBUTES: &'static [VertexAttribute];

    fn stride() -> i32 {
        std::mem::size_of::<Self>() as i32
    }
}

macro_rules! vertex_layout {
    ($name:ident { $($location:literal => $field:ident: [f32; $components:literal]),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
        #[repr(C)]
        pub struct $name {
            $(pub $field: [f32; $components],)+
        }

        impl Vertex for $name {
            const ATTRIBUTES: &'static [VertexAttribute] = &[
                $(
                    VertexAttribute {
                        location: $location,
                        components: $components,
                        offset: std::mem::offset_of!($name, $field),
                    },
                )+
            ];
        }
    };
}

vertex_layout!(PositionVertex { 0 => position: [f32; 3] });
vertex_layout!(TexturedVertex {
    0 => position: [f32; 3],
    1 => color: [f32; 3],
    2 => tex_coord: [f32; 2],
});

impl PositionVertex {
    pub const fn new(x: f32, y: f32, z: f32) -> PositionVertex {
        PositionVertex {
            position: [x, y, z],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textured_vertex_layout_is_interleaved() {
        assert_eq!(TexturedVertex::stride(), 8 * 4);
        let offsets: Vec<_> = TexturedVertex::ATTRIBUTES
            .iter()
            .map(|attribute| (attribute.location, attribute.components, attribute.offset))
            .collect();
        assert_eq!(offsets, vec![(0, 3, 0), (1, 3, 12), (2, 2, 24)]);
    }

    #[test]
    fn position_vertex_has_single_attribute() {
        assert_eq!(PositionVertex::stride(), 12);
        assert_eq!(PositionVertex::ATTRIBUTES.len(), 1);
    }
}
