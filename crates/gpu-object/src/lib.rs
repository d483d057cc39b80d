//! GPU object model for tensor compute graphs
//!
//! This crate describes GPU-bound memory (textures and buffers) used as operands
//! by compute shaders: how each object is accessed, what element type it stores,
//! how large it is, and whether it owns its data inline or refers to an object
//! defined elsewhere. It also provides the size arithmetic for the vec4-packed
//! layout and maps descriptors onto wgpu resource descriptors.
//!
//! Nothing here talks to a GPU device. Objects are plain values that a shader
//! compiler later binds and a runtime later allocates.

mod error;
mod factory;
mod object;
mod size;
mod types;

pub mod manifest;
pub mod wgpu_desc;

pub use error::ObjectError;
pub use factory::*;
pub use object::{AccessType, INVALID_OBJECT_REF, Object, ObjectData, ObjectPayload, ObjectRef, ObjectSize, ObjectType};
pub use size::{OBJECT_DATA_ALIGNMENT, align_by, byte_size_of, checked_byte_size_of, checked_element_count, element_count, pack_aligned};
pub use types::{Bhwc, DataType, Uint2, Uint3};
