//! Size arithmetic for vec4-packed objects
//!
//! Every element of an object is stored as a 4-component vector regardless of
//! the tensor's true channel count, so byte sizes are always
//! `size_of(data_type) * 4 * element_count`.

use crate::{DataType, Object, ObjectData, ObjectError, ObjectSize};

/// Number of scalar lanes in one packed element
const VEC4_LANES: u64 = 4;

/// Byte alignment applied to inline object data
pub const OBJECT_DATA_ALIGNMENT: usize = 16;

/// Rounds `n` up to the next multiple of `alignment`
///
/// # Panics
/// Panics if `alignment` is zero.
pub const fn align_by(n: usize, alignment: usize) -> usize {
    n.div_ceil(alignment) * alignment
}

/// Returns the number of vec4 elements an object of this size holds
///
/// The product is computed in u64 and saturates at `u64::MAX`, which only a
/// 3D extent close to `u32::MAX` on every axis can reach.
pub fn element_count(size: &ObjectSize) -> u64 {
    checked_element_count(size).unwrap_or(u64::MAX)
}

/// Returns the number of vec4 elements, or `None` if it overflows u64
pub fn checked_element_count(size: &ObjectSize) -> Option<u64> {
    match *size {
        ObjectSize::Linear(n) => Some(n as u64),
        ObjectSize::Extent2(s) => (s.x as u64).checked_mul(s.y as u64),
        ObjectSize::Extent3(s) => (s.x as u64).checked_mul(s.y as u64)?.checked_mul(s.z as u64),
    }
}

/// Returns the byte footprint of an object, saturating at `u64::MAX`
pub fn byte_size_of(object: &Object) -> u64 {
    checked_byte_size_of(object).unwrap_or(u64::MAX)
}

/// Returns the byte footprint of an object
///
/// # Errors
/// [`ObjectError::SizeOverflow`] if the footprint does not fit in a u64
pub fn checked_byte_size_of(object: &Object) -> Result<u64, ObjectError> {
    checked_footprint(object.data_type, &object.size).ok_or(ObjectError::SizeOverflow)
}

fn checked_footprint(data_type: DataType, size: &ObjectSize) -> Option<u64> {
    (data_type.size_of() as u64).checked_mul(VEC4_LANES)?.checked_mul(checked_element_count(size)?)
}

/// Copies a slice into an owned byte buffer padded to `alignment`
///
/// Padding bytes are zero. Consumers should treat them as unspecified.
///
/// # Panics
/// Panics if `alignment` is zero.
pub fn pack_aligned<T: bytemuck::Pod>(data: &[T], alignment: usize) -> ObjectData {
    pack_padded(data, alignment, 0)
}

/// Like [`pack_aligned`], but the buffer is at least `min_len` bytes long
/// before alignment
pub(crate) fn pack_padded<T: bytemuck::Pod>(data: &[T], alignment: usize, min_len: usize) -> ObjectData {
    let src: &[u8] = bytemuck::cast_slice(data);
    let mut bytes = vec![0u8; align_by(src.len().max(min_len), alignment)];
    bytes[..src.len()].copy_from_slice(src);
    tracing::trace!(len = src.len(), padded = bytes.len(), "packed inline object data");
    ObjectData::from(bytes)
}

/// Packs inline data for an object of `data_type` and `size`
///
/// The buffer covers the object's byte footprint even when `data` is shorter,
/// so uploading the footprint never reads past the inline bytes. Footprints
/// that do not fit in memory are not padded.
pub(crate) fn pack_object_data<T: bytemuck::Pod>(data: &[T], data_type: DataType, size: &ObjectSize) -> ObjectData {
    let footprint = checked_footprint(data_type, size).and_then(|bytes| usize::try_from(bytes).ok()).unwrap_or(0);
    pack_padded(data, OBJECT_DATA_ALIGNMENT, footprint)
}

/// Byte footprint of an object as a buffer length
pub(crate) fn footprint_len(object: &Object) -> Result<usize, ObjectError> {
    usize::try_from(checked_byte_size_of(object)?).map_err(|_| ObjectError::SizeOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessType, make_readonly_object_from, make_reference};

    #[test]
    fn test_element_count_per_shape() {
        assert_eq!(element_count(&ObjectSize::from(0u32)), 0);
        assert_eq!(element_count(&ObjectSize::from(17u32)), 17);
        assert_eq!(element_count(&ObjectSize::from((3u32, 5u32))), 15);
        assert_eq!(element_count(&ObjectSize::from((3u32, 5u32, 7u32))), 105);
        assert_eq!(element_count(&ObjectSize::from((3u32, 0u32, 7u32))), 0);
    }

    #[test]
    fn test_element_count_does_not_wrap() {
        let size = ObjectSize::from((u32::MAX, u32::MAX));
        assert_eq!(element_count(&size), u32::MAX as u64 * u32::MAX as u64);

        let huge = ObjectSize::from((u32::MAX, u32::MAX, u32::MAX));
        assert_eq!(checked_element_count(&huge), None);
        assert_eq!(element_count(&huge), u64::MAX);
    }

    #[test]
    fn test_byte_size_for_every_data_type() {
        let data_types = [
            DataType::Unknown,
            DataType::Float16,
            DataType::Float32,
            DataType::Float64,
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::Uint8,
            DataType::Uint16,
            DataType::Uint32,
            DataType::Uint64,
            DataType::Bool,
        ];

        for data_type in data_types {
            let mut object = make_reference(0, (4u32, 3u32, 2u32), AccessType::ReadWrite);
            object.data_type = data_type;
            assert_eq!(byte_size_of(&object), data_type.size_of() as u64 * 4 * 24, "{data_type:?}");
        }
    }

    #[test]
    fn test_checked_byte_size_overflow() {
        let mut object = make_reference(0, (u32::MAX, u32::MAX), AccessType::Read);
        object.data_type = DataType::Float64;

        assert_eq!(checked_byte_size_of(&object), Err(ObjectError::SizeOverflow));
        assert_eq!(byte_size_of(&object), u64::MAX);
    }

    #[test]
    fn test_byte_size_of_inline_object() {
        let object = make_readonly_object_from(&[0.5; 10]);
        // ceil(10 / 4) = 3 vec4 elements of f32
        assert_eq!(byte_size_of(&object), 48);
    }

    #[test]
    fn test_align_by() {
        assert_eq!(align_by(0, 16), 0);
        assert_eq!(align_by(1, 16), 16);
        assert_eq!(align_by(16, 16), 16);
        assert_eq!(align_by(17, 16), 32);
        assert_eq!(align_by(7, 4), 8);
    }

    #[test]
    fn test_pack_aligned_lengths() {
        for n in 0..40 {
            let data = vec![1.0f32; n];
            let packed = pack_aligned(&data, OBJECT_DATA_ALIGNMENT);
            assert_eq!(packed.len() % OBJECT_DATA_ALIGNMENT, 0);
            assert!(packed.len() >= n * 4);
            assert!(packed.len() < n * 4 + OBJECT_DATA_ALIGNMENT);
        }
    }

    #[test]
    fn test_pack_padded_covers_min_len() {
        let packed = pack_padded(&[1.0f32], OBJECT_DATA_ALIGNMENT, 40);
        assert_eq!(packed.len(), 48);
        assert_eq!(&packed[..4], bytemuck::bytes_of(&1.0f32));
        assert!(packed[4..].iter().all(|&b| b == 0));

        // A shorter minimum never truncates the data
        assert_eq!(pack_padded(&[1.0f32; 8], OBJECT_DATA_ALIGNMENT, 4).len(), 32);
    }

    #[test]
    fn test_pack_object_data_covers_footprint() {
        let size = ObjectSize::Linear(4);
        let packed = pack_object_data(&[1.0f32], DataType::Float32, &size);
        assert_eq!(packed.len(), 64);

        // Footprint of 4 bytes, still padded to the inline alignment
        let packed = pack_object_data(&[1i8, 2, 3], DataType::Int8, &ObjectSize::Linear(1));
        assert_eq!(packed.len(), 16);
        assert_eq!(&packed[..3], &[1, 2, 3]);

        let huge = ObjectSize::from((u32::MAX, u32::MAX, u32::MAX));
        assert_eq!(pack_object_data(&[1.0f32], DataType::Float32, &huge).len(), 16);
    }

    #[test]
    #[should_panic]
    fn test_align_by_zero_alignment_panics() {
        let alignment = std::hint::black_box(0);
        align_by(3, alignment);
    }

    #[test]
    fn test_pack_aligned_preserves_bytes() {
        let data = [1u16, 2, 3];
        let packed = pack_aligned(&data, 8);
        assert_eq!(packed.len(), 8);
        assert_eq!(&packed[..6], bytemuck::cast_slice::<u16, u8>(&data));
    }
}
