//! Object manifest parser
//!
//! A manifest is a YAML document listing named objects. Each entry either
//! carries inline float data or references an externally allocated object,
//! optionally described by a tensor shape packed in PHWC4 layout.
//!
//! ```yaml
//! objects:
//!   - name: weights
//!     object_type: buffer
//!     data: [1.0, 2.0, 3.0, 4.0, 5.0]
//!   - name: activations
//!     reference: 7
//!     shape: { b: 1, h: 8, w: 8, c: 16 }
//! ```

use crate::size::pack_object_data;
use crate::{
    AccessType, Bhwc, DataType, INVALID_OBJECT_REF, OBJECT_DATA_ALIGNMENT, Object, ObjectData, ObjectPayload, ObjectRef, ObjectSize, ObjectType, Uint2, Uint3, align_by, element_count,
    make_packed_tensor_reference, make_reference,
};
use serde::Deserialize;
use std::collections::HashSet;

/// Errors raised while loading or validating a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Yaml(#[from] serde_norway::Error),
    #[error("manifest declares no objects")]
    EmptyManifest,
    #[error("object name {0:?} is declared more than once")]
    DuplicateName(String),
    #[error("object {0:?} has neither data nor reference")]
    MissingPayload(String),
    #[error("object {0:?} has both data and reference")]
    ConflictingPayload(String),
    #[error("object {0:?} references the reserved invalid id")]
    InvalidReference(String),
    #[error("object {0:?} declares both size and shape")]
    ConflictingSize(String),
    #[error("reference {0:?} needs a size or a shape")]
    MissingSize(String),
    #[error("object {0:?} has inline data, shape is only valid for references")]
    ShapeWithData(String),
    #[error("object {name:?} size must have 1 to 3 dimensions, got {dims}")]
    InvalidSize { name: String, dims: usize },
    #[error("object {0:?} has inline data but no data type")]
    UntypedData(String),
    #[error("object {name:?} holds {capacity} floats but declares {len}")]
    DataExceedsSize { name: String, capacity: u64, len: usize },
}

/// Object size as written in a manifest: a scalar or a list of 2 or 3 extents
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Linear(u32),
    Dims(Vec<u32>),
}

impl SizeSpec {
    fn to_object_size(&self, name: &str) -> Result<ObjectSize, ManifestError> {
        match self {
            Self::Linear(n) => Ok(ObjectSize::Linear(*n)),
            Self::Dims(dims) => match dims.as_slice() {
                [n] => Ok(ObjectSize::Linear(*n)),
                [x, y] => Ok(ObjectSize::Extent2(Uint2::new(*x, *y))),
                [x, y, z] => Ok(ObjectSize::Extent3(Uint3::new(*x, *y, *z))),
                _ => Err(ManifestError::InvalidSize {
                    name: name.to_string(),
                    dims: dims.len(),
                }),
            },
        }
    }
}

/// A single object entry of a manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectSpec {
    /// Unique name of the object within the manifest
    pub name: String,
    /// Defaults to `read` for data objects and `read_write` for references
    #[serde(default)]
    pub access: Option<AccessType>,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub object_type: ObjectType,
    #[serde(default)]
    pub size: Option<SizeSpec>,
    /// Tensor shape, laid out as PHWC4 (references only)
    #[serde(default)]
    pub shape: Option<Bhwc>,
    #[serde(default)]
    pub data: Option<Vec<f32>>,
    #[serde(default)]
    pub reference: Option<ObjectRef>,
}

/// An object compiled from a manifest, together with its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedObject {
    pub name: String,
    pub object: Object,
}

/// Raw manifest as parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectManifest {
    pub objects: Vec<ObjectSpec>,
}

impl ObjectManifest {
    /// Parses a manifest from YAML content
    pub fn from_yaml(yaml_content: &str) -> Result<Self, ManifestError> {
        Ok(serde_norway::from_str(yaml_content)?)
    }

    /// Parses a manifest from a YAML file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Checks the manifest for structural errors without building objects
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.objects.is_empty() {
            return Err(ManifestError::EmptyManifest);
        }

        let mut names = HashSet::new();
        for spec in &self.objects {
            if !names.insert(spec.name.as_str()) {
                return Err(ManifestError::DuplicateName(spec.name.clone()));
            }
            spec.validate()?;
        }

        Ok(())
    }

    /// Validates the manifest and builds its objects in declaration order
    pub fn compile(&self) -> Result<Vec<NamedObject>, ManifestError> {
        self.validate()?;

        let objects = self
            .objects
            .iter()
            .map(|spec| {
                Ok(NamedObject {
                    name: spec.name.clone(),
                    object: spec.build()?,
                })
            })
            .collect::<Result<Vec<_>, ManifestError>>()?;

        tracing::debug!(count = objects.len(), "compiled object manifest");
        Ok(objects)
    }
}

impl ObjectSpec {
    fn validate(&self) -> Result<(), ManifestError> {
        let name = || self.name.clone();

        if self.size.is_some() && self.shape.is_some() {
            return Err(ManifestError::ConflictingSize(name()));
        }

        let size = self.size.as_ref().map(|size| size.to_object_size(&self.name)).transpose()?;

        match (&self.data, self.reference) {
            (None, None) => Err(ManifestError::MissingPayload(name())),
            (Some(_), Some(_)) => Err(ManifestError::ConflictingPayload(name())),
            (Some(_), None) if self.shape.is_some() => Err(ManifestError::ShapeWithData(name())),
            (Some(_), None) if self.data_type == DataType::Unknown => Err(ManifestError::UntypedData(name())),
            (Some(data), None) => {
                if let Some(size) = size {
                    let capacity = element_count(&size).saturating_mul(4);
                    if data.len() as u64 > capacity {
                        return Err(ManifestError::DataExceedsSize {
                            name: name(),
                            capacity,
                            len: data.len(),
                        });
                    }
                }
                Ok(())
            }
            (None, Some(id)) if id == INVALID_OBJECT_REF => Err(ManifestError::InvalidReference(name())),
            (None, Some(_)) if size.is_none() && self.shape.is_none() => Err(ManifestError::MissingSize(name())),
            (None, Some(_)) => Ok(()),
        }
    }

    /// Builds the object; assumes `validate` has passed
    fn build(&self) -> Result<Object, ManifestError> {
        let size = self.size.as_ref().map(|size| size.to_object_size(&self.name)).transpose()?;

        let mut object = match (&self.data, self.reference, self.shape, size) {
            (Some(_), _, _, _) if self.data_type == DataType::Unknown => return Err(ManifestError::UntypedData(self.name.clone())),
            (Some(data), _, _, size) => {
                let size = size.unwrap_or_else(|| ObjectSize::Linear(inferred_elements(data.len(), self.data_type)));
                Object {
                    access: AccessType::Read,
                    data_type: self.data_type,
                    object_type: self.object_type,
                    binding: None,
                    object: ObjectPayload::Data(repack(data, self.data_type, &size)),
                    size,
                }
            }
            (None, Some(id), Some(shape), _) => make_packed_tensor_reference(id, &shape),
            (None, Some(id), None, Some(size)) => make_reference(id, size, AccessType::ReadWrite),
            (None, Some(_), None, None) => return Err(ManifestError::MissingSize(self.name.clone())),
            (None, None, _, _) => return Err(ManifestError::MissingPayload(self.name.clone())),
        };

        if let Some(access) = self.access {
            object.access = access;
        }
        object.object_type = self.object_type;
        object.data_type = self.data_type;

        Ok(object)
    }
}

/// Number of vec4 elements whose footprint holds `len` scalars of `data_type`
/// and is a multiple of the inline data alignment
///
/// For `Float32` this is `ceil(len / 4)`. Other types round up to whole
/// 16-byte blocks so the inline data and the footprint have the same length.
fn inferred_elements(len: usize, data_type: DataType) -> u32 {
    let width = data_type.size_of().max(1);
    let bytes = align_by(len.saturating_mul(width), OBJECT_DATA_ALIGNMENT);
    u32::try_from(bytes.div_ceil(width * 4)).unwrap_or(u32::MAX)
}

/// Converts float data into the byte representation of `data_type`, padded
/// to the footprint of an object of `size`
///
/// Values are converted with Rust's `as` casts, which saturate for integers.
/// Booleans are true for any non-zero value.
fn repack(data: &[f32], data_type: DataType, size: &ObjectSize) -> ObjectData {
    fn pack<T: bytemuck::Pod>(data: &[f32], data_type: DataType, size: &ObjectSize, convert: impl Fn(f32) -> T) -> ObjectData {
        pack_object_data(&data.iter().map(|&v| convert(v)).collect::<Vec<_>>(), data_type, size)
    }

    match data_type {
        DataType::Float16 => pack(data, data_type, size, half::f16::from_f32),
        DataType::Float64 => pack(data, data_type, size, |v| v as f64),
        DataType::Int8 => pack(data, data_type, size, |v| v as i8),
        DataType::Int16 => pack(data, data_type, size, |v| v as i16),
        DataType::Int32 => pack(data, data_type, size, |v| v as i32),
        DataType::Int64 => pack(data, data_type, size, |v| v as i64),
        DataType::Uint8 => pack(data, data_type, size, |v| v as u8),
        DataType::Uint16 => pack(data, data_type, size, |v| v as u16),
        DataType::Uint32 => pack(data, data_type, size, |v| v as u32),
        DataType::Uint64 => pack(data, data_type, size, |v| v as u64),
        DataType::Bool => pack(data, data_type, size, |v| u8::from(v != 0.0)),
        DataType::Float32 | DataType::Unknown => pack_object_data(data, data_type, size),
    }
}
