pub mod backend;
pub mod highlevel;
pub mod objects;
pub mod shaders;
pub mod texture;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
