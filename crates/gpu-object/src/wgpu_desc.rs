//! Mapping of object descriptors onto wgpu resource descriptors
//!
//! These functions only build descriptor structs. Creating the actual buffers,
//! textures and bind group layouts is left to whoever owns the `wgpu::Device`.

use crate::size::footprint_len;
use crate::{AccessType, DataType, Object, ObjectError, ObjectSize, ObjectType, checked_byte_size_of};

/// Converts an object size into a texture extent
///
/// A linear size becomes a single row, a 2D size a single layer.
pub fn extent(size: &ObjectSize) -> wgpu::Extent3d {
    let (width, height, depth_or_array_layers) = match *size {
        ObjectSize::Linear(n) => (n, 1, 1),
        ObjectSize::Extent2(s) => (s.x, s.y, 1),
        ObjectSize::Extent3(s) => (s.x, s.y, s.z),
    };
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers,
    }
}

/// Texture dimension used to store an object of this size
pub fn texture_dimension(size: &ObjectSize) -> wgpu::TextureDimension {
    match size {
        ObjectSize::Extent3(_) => wgpu::TextureDimension::D3,
        ObjectSize::Linear(_) | ObjectSize::Extent2(_) => wgpu::TextureDimension::D2,
    }
}

fn view_dimension(size: &ObjectSize) -> wgpu::TextureViewDimension {
    match size {
        ObjectSize::Extent3(_) => wgpu::TextureViewDimension::D3,
        ObjectSize::Linear(_) | ObjectSize::Extent2(_) => wgpu::TextureViewDimension::D2,
    }
}

/// Returns the 4-component texture format storing one element of `data_type`
///
/// 64-bit types, booleans and `Unknown` have no vec4 texture format.
pub fn texture_format(data_type: DataType) -> Option<wgpu::TextureFormat> {
    match data_type {
        DataType::Float16 => Some(wgpu::TextureFormat::Rgba16Float),
        DataType::Float32 => Some(wgpu::TextureFormat::Rgba32Float),
        DataType::Int8 => Some(wgpu::TextureFormat::Rgba8Sint),
        DataType::Int16 => Some(wgpu::TextureFormat::Rgba16Sint),
        DataType::Int32 => Some(wgpu::TextureFormat::Rgba32Sint),
        DataType::Uint8 => Some(wgpu::TextureFormat::Rgba8Uint),
        DataType::Uint16 => Some(wgpu::TextureFormat::Rgba16Uint),
        DataType::Uint32 => Some(wgpu::TextureFormat::Rgba32Uint),
        DataType::Unknown | DataType::Float64 | DataType::Int64 | DataType::Uint64 | DataType::Bool => None,
    }
}

fn sample_type(data_type: DataType) -> wgpu::TextureSampleType {
    if data_type.is_float() {
        wgpu::TextureSampleType::Float { filterable: false }
    } else if data_type.is_signed_int() {
        wgpu::TextureSampleType::Sint
    } else {
        wgpu::TextureSampleType::Uint
    }
}

/// Storage texture access matching the object's access type
pub fn storage_access(access: AccessType) -> wgpu::StorageTextureAccess {
    match access {
        AccessType::Read => wgpu::StorageTextureAccess::ReadOnly,
        AccessType::Write => wgpu::StorageTextureAccess::WriteOnly,
        AccessType::ReadWrite => wgpu::StorageTextureAccess::ReadWrite,
    }
}

/// Buffer usages needed for an object with the given access
///
/// Readable objects are uploaded, writable objects are read back.
pub fn buffer_usages(access: AccessType) -> wgpu::BufferUsages {
    match access {
        AccessType::Read => wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        AccessType::Write => wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        AccessType::ReadWrite => wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
    }
}

/// Texture usages needed for an object with the given access
pub fn texture_usages(access: AccessType) -> wgpu::TextureUsages {
    match access {
        AccessType::Read => wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        AccessType::Write => wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
        AccessType::ReadWrite => {
            wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST
        }
    }
}

/// Builds the bind group layout entry type for an object
///
/// Readonly textures are bound as sampled textures, every other texture as a
/// storage texture. Buffers are always storage buffers.
///
/// # Errors
/// * [`ObjectError::UnresolvedObjectType`] if the object type is still `Unknown`
/// * [`ObjectError::UnsupportedDataType`] if a texture's data type has no vec4 format
pub fn binding_type(object: &Object) -> Result<wgpu::BindingType, ObjectError> {
    match object.object_type {
        ObjectType::Unknown => Err(ObjectError::UnresolvedObjectType),
        ObjectType::Buffer => Ok(wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage {
                read_only: object.access == AccessType::Read,
            },
            has_dynamic_offset: false,
            min_binding_size: None,
        }),
        ObjectType::Texture if object.access == AccessType::Read => Ok(wgpu::BindingType::Texture {
            sample_type: sample_type(object.data_type),
            view_dimension: view_dimension(&object.size),
            multisampled: false,
        }),
        ObjectType::Texture => Ok(wgpu::BindingType::StorageTexture {
            access: storage_access(object.access),
            format: texture_format(object.data_type).ok_or(ObjectError::UnsupportedDataType(object.data_type))?,
            view_dimension: view_dimension(&object.size),
        }),
    }
}

/// Builds the descriptor of an uninitialized buffer holding the object
///
/// # Errors
/// [`ObjectError::SizeOverflow`] if the byte size does not fit in a u64
pub fn buffer_descriptor<'a>(object: &Object, label: Option<&'a str>) -> Result<wgpu::BufferDescriptor<'a>, ObjectError> {
    Ok(wgpu::BufferDescriptor {
        label,
        size: checked_byte_size_of(object)?,
        usage: buffer_usages(object.access),
        mapped_at_creation: false,
    })
}

/// Builds the descriptor of a buffer initialized with the object's inline data
///
/// `contents` spans exactly the object's byte footprint, so the buffer has the
/// same size as one built from [`buffer_descriptor`]. Inline padding past the
/// footprint is not uploaded. Returns `Ok(None)` for references, which carry
/// no data.
///
/// # Errors
/// * [`ObjectError::SizeOverflow`] if the footprint is not addressable
/// * [`ObjectError::InlineDataTooShort`] if the inline data is shorter than the footprint
pub fn buffer_init_descriptor<'a>(object: &'a Object, label: Option<&'a str>) -> Result<Option<wgpu::util::BufferInitDescriptor<'a>>, ObjectError> {
    let Some(data) = object.get_inline_data() else {
        return Ok(None);
    };

    let required = footprint_len(object)?;
    let contents = data.get(..required).ok_or(ObjectError::InlineDataTooShort { len: data.len(), required })?;

    Ok(Some(wgpu::util::BufferInitDescriptor {
        label,
        contents,
        usage: buffer_usages(object.access),
    }))
}

/// Builds the descriptor of a texture holding the object
///
/// # Errors
/// [`ObjectError::UnsupportedDataType`] if the data type has no vec4 format
pub fn texture_descriptor<'a>(object: &Object, label: Option<&'a str>) -> Result<wgpu::TextureDescriptor<'a>, ObjectError> {
    let format = texture_format(object.data_type).ok_or(ObjectError::UnsupportedDataType(object.data_type))?;

    Ok(wgpu::TextureDescriptor {
        label,
        size: extent(&object.size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: texture_dimension(&object.size),
        format,
        usage: texture_usages(object.access),
        view_formats: &[],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bhwc, Uint2, make_packed_tensor_reference, make_readonly_buffer, make_readonly_buffer_from, make_readonly_texture, make_reference};

    #[test]
    fn test_extent_per_shape() {
        assert_eq!(extent(&ObjectSize::Linear(7)), wgpu::Extent3d { width: 7, height: 1, depth_or_array_layers: 1 });
        assert_eq!(extent(&ObjectSize::Extent2(Uint2::new(3, 4))), wgpu::Extent3d { width: 3, height: 4, depth_or_array_layers: 1 });

        let phwc4 = make_packed_tensor_reference(0, &Bhwc::new(2, 3, 5, 10));
        assert_eq!(extent(&phwc4.size), wgpu::Extent3d { width: 5, height: 3, depth_or_array_layers: 6 });
        assert_eq!(texture_dimension(&phwc4.size), wgpu::TextureDimension::D3);
    }

    #[test]
    fn test_texture_formats() {
        assert_eq!(texture_format(DataType::Float32), Some(wgpu::TextureFormat::Rgba32Float));
        assert_eq!(texture_format(DataType::Float16), Some(wgpu::TextureFormat::Rgba16Float));
        assert_eq!(texture_format(DataType::Uint8), Some(wgpu::TextureFormat::Rgba8Uint));
        assert_eq!(texture_format(DataType::Int32), Some(wgpu::TextureFormat::Rgba32Sint));
        assert_eq!(texture_format(DataType::Float64), None);
        assert_eq!(texture_format(DataType::Unknown), None);
    }

    #[test]
    fn test_binding_type_requires_resolved_object_type() {
        let object = make_reference(1, 4u32, AccessType::Read);
        assert_eq!(binding_type(&object), Err(ObjectError::UnresolvedObjectType));
    }

    #[test]
    fn test_binding_type_for_buffers() {
        let object = make_readonly_buffer_from(&[1.0; 4]);
        assert_eq!(
            binding_type(&object),
            Ok(wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            })
        );

        let mut output = make_reference(2, 4u32, AccessType::Write);
        output.object_type = ObjectType::Buffer;
        assert!(matches!(
            binding_type(&output),
            Ok(wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                ..
            })
        ));
    }

    #[test]
    fn test_binding_type_for_textures() {
        let input = make_readonly_texture(Uint2::new(2, 2), &[0.0; 16]);
        assert_eq!(
            binding_type(&input),
            Ok(wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            })
        );

        let mut tensor = make_packed_tensor_reference(3, &Bhwc::new(1, 8, 8, 8));
        tensor.object_type = ObjectType::Texture;
        assert_eq!(
            binding_type(&tensor),
            Ok(wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::ReadWrite,
                format: wgpu::TextureFormat::Rgba32Float,
                view_dimension: wgpu::TextureViewDimension::D3,
            })
        );

        tensor.data_type = DataType::Int64;
        assert_eq!(binding_type(&tensor), Err(ObjectError::UnsupportedDataType(DataType::Int64)));
    }

    #[test]
    fn test_buffer_descriptors() {
        let object = make_readonly_buffer_from(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let desc = buffer_descriptor(&object, Some("weights")).unwrap();
        assert_eq!(desc.label, Some("weights"));
        assert_eq!(desc.size, 32);
        assert_eq!(desc.usage, wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST);
        assert!(!desc.mapped_at_creation);

        let init = buffer_init_descriptor(&object, None).unwrap().unwrap();
        assert_eq!(init.contents.len(), 32);
        assert_eq!(init.contents, object.get_inline_data().unwrap());

        let reference = make_reference(1, 2u32, AccessType::ReadWrite);
        assert_eq!(buffer_init_descriptor(&reference, None).map(|init| init.is_none()), Ok(true));
    }

    #[test]
    fn test_buffer_init_matches_buffer_descriptor_size() {
        let objects = [
            make_readonly_buffer(4u32, &[1.0]),
            make_readonly_buffer((2u32, 3u32), &[1.0, 2.0, 3.0]),
            make_readonly_buffer_from(&[1.0; 7]),
        ];

        for object in &objects {
            let desc = buffer_descriptor(object, None).unwrap();
            let init = buffer_init_descriptor(object, None).unwrap().unwrap();
            assert_eq!(init.contents.len() as u64, desc.size);
        }

        let padded = buffer_init_descriptor(&objects[0], None).unwrap().unwrap();
        assert_eq!(&padded.contents[..4], bytemuck::bytes_of(&1.0f32));
        assert!(padded.contents[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_buffer_init_trims_padding_past_footprint() {
        let mut object = make_readonly_buffer_from(&[1.0, 2.0, 3.0, 4.0]);
        object.data_type = DataType::Int8;

        let init = buffer_init_descriptor(&object, None).unwrap().unwrap();
        assert_eq!(init.contents.len(), 4);
    }

    #[test]
    fn test_buffer_init_rejects_short_inline_data() {
        let mut object = make_readonly_buffer_from(&[1.0; 4]);
        object.size = ObjectSize::Linear(3);

        assert_eq!(
            buffer_init_descriptor(&object, None).map(|init| init.is_some()),
            Err(ObjectError::InlineDataTooShort { len: 16, required: 48 })
        );
    }

    #[test]
    fn test_texture_descriptor() {
        let object = make_packed_tensor_reference(4, &Bhwc::new(1, 16, 32, 3));

        let desc = texture_descriptor(&object, Some("activations")).unwrap();
        assert_eq!(desc.size, wgpu::Extent3d { width: 32, height: 16, depth_or_array_layers: 1 });
        assert_eq!(desc.dimension, wgpu::TextureDimension::D3);
        assert_eq!(desc.format, wgpu::TextureFormat::Rgba32Float);
        assert!(desc.usage.contains(wgpu::TextureUsages::STORAGE_BINDING));
        assert!(desc.usage.contains(wgpu::TextureUsages::COPY_SRC));
    }

    #[test]
    fn test_usages_per_access() {
        assert!(!buffer_usages(AccessType::Read).contains(wgpu::BufferUsages::COPY_SRC));
        assert!(!buffer_usages(AccessType::Write).contains(wgpu::BufferUsages::COPY_DST));
        assert!(buffer_usages(AccessType::ReadWrite).contains(wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST));
        assert!(!texture_usages(AccessType::Read).contains(wgpu::TextureUsages::STORAGE_BINDING));
        assert_eq!(storage_access(AccessType::Write), wgpu::StorageTextureAccess::WriteOnly);
    }
}
