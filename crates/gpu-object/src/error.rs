//! Error types for object descriptors

use crate::DataType;

/// Errors raised when an object descriptor is bound or mapped onto GPU resources
///
/// Building and inspecting objects never fails; these errors only come from
/// binding assignment, checked size arithmetic and wgpu descriptor mapping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// Element count or byte size does not fit in a u64
    #[error("object size overflows u64")]
    SizeOverflow,
    /// The compiler has not assigned a binding slot yet
    #[error("object has no binding slot assigned")]
    UnassignedBinding,
    /// A binding slot may only be assigned once
    #[error("object is already bound to slot {current}, cannot rebind to {requested}")]
    BindingAlreadyAssigned {
        /// Slot the object is bound to
        current: u32,
        /// Slot that was requested
        requested: u32,
    },
    /// The object type is still `Unknown` and must be resolved first
    #[error("object type is unresolved (neither texture nor buffer)")]
    UnresolvedObjectType,
    /// The element type has no vec4 texture format
    #[error("data type {0:?} has no vec4 texture format")]
    UnsupportedDataType(DataType),
    /// The inline data does not cover the object's byte footprint
    #[error("object holds {len} inline bytes but its footprint is {required} bytes")]
    InlineDataTooShort {
        /// Inline data length
        len: usize,
        /// Byte footprint of the object
        required: usize,
    },
}
