use tracing::warn;

use super::backend::GlBackend;
use super::types::{BufferTarget, BufferUsage, GlResult};

macro_rules! owned_object {
    ($(#[$meta:meta])* $name:ident, $gen:ident, $delete:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name<B: GlBackend> {
            id: u32,
            gl: B,
        }

        impl<B: GlBackend> $name<B> {
            pub fn new(gl: B) -> GlResult<$name<B>> {
                let id = gl.$gen()?;
                Ok($name { id, gl })
            }

            pub fn id(&self) -> u32 {
                self.id
            }
        }

        impl<B: GlBackend> Drop for $name<B> {
            fn drop(&mut self) {
                if let Err(err) = self.gl.$delete(self.id) {
                    warn!("failed to delete {} {}: {err:?}", stringify!($name), self.id);
                }
            }
        }
    };
}

owned_object!(
    /// A vertex array object, recording buffer bindings and attribute layout.
    VertexArray,
    gen_vertex_array,
    delete_vertex_array
);
owned_object!(Buffer, gen_buffer, delete_buffer);
owned_object!(
    /// A 2D texture object.
    Texture,
    gen_texture,
    delete_texture
);

impl<B: GlBackend> VertexArray<B> {
    pub fn bind(&self) -> GlResult<()> {
        self.gl.bind_vertex_array(self.id)
    }

    pub fn unbind(&self) -> GlResult<()> {
        self.gl.bind_vertex_array(0)
    }
}

impl<B: GlBackend> Buffer<B> {
    /// Creates a buffer, binds it to `target` and fills it. The buffer stays bound.
    pub fn with_data(
        gl: B,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> GlResult<Buffer<B>> {
        let buffer = Buffer::new(gl)?;
        buffer.gl.bind_buffer(target, buffer.id)?;
        buffer.gl.buffer_data(target, data, usage)?;
        Ok(buffer)
    }
}

impl<B: GlBackend> Texture<B> {
    pub fn bind_to_unit(&self, unit: u32) -> GlResult<()> {
        self.gl.active_texture(unit)?;
        self.gl.bind_texture(self.id)
    }
}
