//! Object descriptors
//!
//! An [`Object`] is the logical description of a GPU buffer or texture operand.
//! Its payload is either inline bytes the object owns or a symbolic reference
//! to an object defined elsewhere. The two are alternatives of one enum, so an
//! object can never be both at once.

use crate::{DataType, ObjectError, Uint2, Uint3};
use serde::{Deserialize, Serialize};

/// How a shader stage may use an object
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    #[default]
    Read,
    Write,
    ReadWrite,
}

/// Physical storage kind an object should be bound to
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Let the compiler choose between texture and buffer
    #[default]
    Unknown,
    Texture,
    Buffer,
}

/// Inline object bytes
pub type ObjectData = bytes::Bytes;

/// Key identifying an object owned by an external registry
pub type ObjectRef = u32;

/// Reserved id meaning "no reference"
///
/// Every component resolving object references must treat this value as the
/// absence of a reference, never as a valid id.
pub const INVALID_OBJECT_REF: ObjectRef = ObjectRef::MAX;

/// Physical dimensions of an object, counted in vec4 elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectSize {
    Linear(u32),
    Extent2(Uint2),
    Extent3(Uint3),
}

impl From<u32> for ObjectSize {
    fn from(size: u32) -> Self {
        Self::Linear(size)
    }
}

impl From<Uint2> for ObjectSize {
    fn from(size: Uint2) -> Self {
        Self::Extent2(size)
    }
}

impl From<Uint3> for ObjectSize {
    fn from(size: Uint3) -> Self {
        Self::Extent3(size)
    }
}

impl From<(u32, u32)> for ObjectSize {
    fn from((x, y): (u32, u32)) -> Self {
        Self::Extent2(Uint2::new(x, y))
    }
}

impl From<(u32, u32, u32)> for ObjectSize {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        Self::Extent3(Uint3::new(x, y, z))
    }
}

/// Contents of an object: owned bytes or a forward reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectPayload {
    Data(ObjectData),
    Ref(ObjectRef),
}

/// A reference to, or a predefined constant of, a GPU buffer or texture
///
/// Producers set every field except `binding`, which stays `None` until the
/// shader compiler assigns a slot with [`Object::assign_binding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub access: AccessType,
    pub data_type: DataType,
    pub object_type: ObjectType,
    /// Binding slot assigned by the compiler
    pub binding: Option<u32>,
    pub size: ObjectSize,
    pub object: ObjectPayload,
}

impl Object {
    /// Returns true if the object refers to an externally defined object
    pub fn is_reference(&self) -> bool {
        matches!(self.object, ObjectPayload::Ref(_))
    }

    /// Returns the referenced id, or [`INVALID_OBJECT_REF`] for inline objects
    pub fn get_reference(&self) -> ObjectRef {
        self.reference().unwrap_or(INVALID_OBJECT_REF)
    }

    /// Returns the referenced id if the object is a reference
    pub fn reference(&self) -> Option<ObjectRef> {
        match self.object {
            ObjectPayload::Ref(id) => Some(id),
            ObjectPayload::Data(_) => None,
        }
    }

    /// Borrows the inline bytes if the object owns its data
    pub fn get_inline_data(&self) -> Option<&[u8]> {
        match &self.object {
            ObjectPayload::Data(data) => Some(&data[..]),
            ObjectPayload::Ref(_) => None,
        }
    }

    /// Assigns the binding slot
    ///
    /// A slot can be assigned once. Assigning the same slot again is accepted;
    /// assigning a different one fails.
    pub fn assign_binding(&mut self, slot: u32) -> Result<(), ObjectError> {
        match self.binding {
            Some(current) if current != slot => Err(ObjectError::BindingAlreadyAssigned { current, requested: slot }),
            _ => {
                self.binding = Some(slot);
                Ok(())
            }
        }
    }

    /// Returns the assigned binding slot
    pub fn binding_slot(&self) -> Result<u32, ObjectError> {
        self.binding.ok_or(ObjectError::UnassignedBinding)
    }
}
