//! Constructors for common object shapes
//!
//! Readonly constructors pack a flat `f32` slice into 16-byte aligned inline
//! data, zero-padded up to the object's byte footprint when the declared size
//! is larger than the data. Reference constructors describe an object owned by an external
//! registry and carry no data.

use crate::size::pack_object_data;
use crate::{AccessType, Bhwc, DataType, INVALID_OBJECT_REF, Object, ObjectPayload, ObjectRef, ObjectSize, ObjectType, Uint3};

/// Builds an object that references an externally created object
///
/// # Arguments
/// * `id` - Registry key of the referenced object
/// * `size` - Size in vec4 elements, 1D, 2D or 3D
/// * `access` - How the consuming shader uses the object
pub fn make_reference(id: ObjectRef, size: impl Into<ObjectSize>, access: AccessType) -> Object {
    if id == INVALID_OBJECT_REF {
        tracing::warn!("building an object reference with the reserved invalid id");
    }
    let size = size.into();
    tracing::trace!(id, ?size, ?access, "object reference");

    Object {
        access,
        data_type: DataType::Float32,
        object_type: ObjectType::Unknown,
        binding: None,
        size,
        object: ObjectPayload::Ref(id),
    }
}

fn make_readonly(object_type: ObjectType, size: ObjectSize, data: &[f32]) -> Object {
    Object {
        access: AccessType::Read,
        data_type: DataType::Float32,
        object_type,
        binding: None,
        object: ObjectPayload::Data(pack_object_data(data, DataType::Float32, &size)),
        size,
    }
}

/// Number of vec4 elements needed to hold `len` scalars
fn vec4_count(len: usize) -> u32 {
    u32::try_from(len.div_ceil(4)).unwrap_or(u32::MAX)
}

/// Builds a readonly constant object whose storage kind is left to the compiler
pub fn make_readonly_object(size: impl Into<ObjectSize>, data: &[f32]) -> Object {
    make_readonly(ObjectType::Unknown, size.into(), data)
}

/// Builds a readonly constant texture
pub fn make_readonly_texture(size: impl Into<ObjectSize>, data: &[f32]) -> Object {
    make_readonly(ObjectType::Texture, size.into(), data)
}

/// Builds a readonly constant buffer
pub fn make_readonly_buffer(size: impl Into<ObjectSize>, data: &[f32]) -> Object {
    make_readonly(ObjectType::Buffer, size.into(), data)
}

/// Builds a readonly constant object sized to `ceil(data.len() / 4)` vec4 elements
pub fn make_readonly_object_from(data: &[f32]) -> Object {
    make_readonly_object(vec4_count(data.len()), data)
}

/// Builds a readonly constant texture sized to `ceil(data.len() / 4)` vec4 elements
pub fn make_readonly_texture_from(data: &[f32]) -> Object {
    make_readonly_texture(vec4_count(data.len()), data)
}

/// Builds a readonly constant buffer sized to `ceil(data.len() / 4)` vec4 elements
pub fn make_readonly_buffer_from(data: &[f32]) -> Object {
    make_readonly_buffer(vec4_count(data.len()), data)
}

/// Maps a tensor shape onto the PHWC4 extent
///
/// Channels are grouped into vec4 slices and the batch is folded into depth:
/// x = width, y = height, z = batch * ceil(channels / 4). Depth saturates at
/// `u32::MAX`.
pub fn tensor_layout_size(shape: &Bhwc) -> Uint3 {
    Uint3::new(shape.w, shape.h, shape.b.saturating_mul(shape.packed_channels()))
}

/// Builds a read-write reference to a PHWC4 tensor allocated elsewhere
pub fn make_packed_tensor_reference(id: ObjectRef, shape: &Bhwc) -> Object {
    make_reference(id, tensor_layout_size(shape), AccessType::ReadWrite)
}
