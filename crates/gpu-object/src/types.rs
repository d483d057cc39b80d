//! Element data types and small vector/shape types shared by object descriptors

use serde::{Deserialize, Serialize};

/// Scalar type of each value stored in an object
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Unknown,
    Float16,
    #[default]
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
}

impl DataType {
    /// Returns the size of one scalar of this type in bytes
    ///
    /// `Unknown` has no size and reports 0.
    pub const fn size_of(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Int8 | Self::Uint8 | Self::Bool => 1,
            Self::Float16 | Self::Int16 | Self::Uint16 => 2,
            Self::Float32 | Self::Int32 | Self::Uint32 => 4,
            Self::Float64 | Self::Int64 | Self::Uint64 => 8,
        }
    }

    /// Returns true for floating-point element types
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }

    /// Returns true for signed integer element types
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }
}

/// Two-dimensional extent in elements
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Deserialize, Serialize)]
pub struct Uint2 {
    pub x: u32,
    pub y: u32,
}

impl Uint2 {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Three-dimensional extent in elements
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Deserialize, Serialize)]
pub struct Uint3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Uint3 {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Logical tensor shape in batch, height, width, channels order
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Bhwc {
    pub b: u32,
    pub h: u32,
    pub w: u32,
    pub c: u32,
}

impl Bhwc {
    pub const fn new(b: u32, h: u32, w: u32, c: u32) -> Self {
        Self { b, h, w, c }
    }

    /// Number of vec4 groups needed to hold the channels
    pub const fn packed_channels(&self) -> u32 {
        self.c.div_ceil(4)
    }

    /// Total number of logical scalars in the tensor, saturating at `u64::MAX`
    pub fn element_count(&self) -> u64 {
        [self.b, self.h, self.w, self.c].into_iter().fold(1u64, |acc, d| acc.saturating_mul(d as u64))
    }
}
