/// The scalar representations a PCD field can be stored with.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ScalarType {
    /// `TYPE I`, `SIZE 1`
    Int8,
    /// `TYPE I`, `SIZE 2`
    Int16,
    /// `TYPE I`, `SIZE 4`
    Int32,
    /// `TYPE U`, `SIZE 1`
    UInt8,
    /// `TYPE U`, `SIZE 2`
    UInt16,
    /// `TYPE U`, `SIZE 4`
    UInt32,
    /// `TYPE F`, `SIZE 4`
    Float32,
    /// `TYPE F`, `SIZE 8`
    Float64,
}

impl ScalarType {
    /// Resolve a PCD `(TYPE, SIZE)` pair into a scalar type.
    ///
    /// Returns `None` for combinations without a defined representation,
    /// e.g. `F 2` or `U 8`.
    pub fn from_tag(type_tag: char, byte_size: usize) -> Option<Self> {
        match (type_tag, byte_size) {
            ('F', 4) => Some(Self::Float32),
            ('F', 8) => Some(Self::Float64),
            ('U', 1) => Some(Self::UInt8),
            ('U', 2) => Some(Self::UInt16),
            ('U', 4) => Some(Self::UInt32),
            ('I', 1) => Some(Self::Int8),
            ('I', 2) => Some(Self::Int16),
            ('I', 4) => Some(Self::Int32),
            _ => None,
        }
    }

    /// The size in bytes of one element.
    pub fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Whether the type is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Decode one little-endian element.
    ///
    /// PRECONDITION: `bytes` holds exactly [`ScalarType::size`] bytes.
    pub(crate) fn read_le(&self, bytes: &[u8]) -> Scalar {
        match self {
            Self::Int8 => Scalar::Int8(i8::from_le_bytes(le_bytes(bytes))),
            Self::Int16 => Scalar::Int16(i16::from_le_bytes(le_bytes(bytes))),
            Self::Int32 => Scalar::Int32(i32::from_le_bytes(le_bytes(bytes))),
            Self::UInt8 => Scalar::UInt8(u8::from_le_bytes(le_bytes(bytes))),
            Self::UInt16 => Scalar::UInt16(u16::from_le_bytes(le_bytes(bytes))),
            Self::UInt32 => Scalar::UInt32(u32::from_le_bytes(le_bytes(bytes))),
            Self::Float32 => Scalar::Float32(f32::from_le_bytes(le_bytes(bytes))),
            Self::Float64 => Scalar::Float64(f64::from_le_bytes(le_bytes(bytes))),
        }
    }
}

#[inline]
fn le_bytes<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// A single typed value of a point record.
///
/// Equality on floating point variants compares bit patterns, so a value
/// always equals itself after a decode/encode cycle, NaN payloads included.
#[derive(Debug, Clone, Copy)]
pub enum Scalar {
    /// Signed 8-bit integer.
    Int8(i8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// 32-bit float.
    Float32(f32),
    /// 64-bit float.
    Float64(f64),
}

impl Scalar {
    /// The type of the value.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Int8(_) => ScalarType::Int8,
            Self::Int16(_) => ScalarType::Int16,
            Self::Int32(_) => ScalarType::Int32,
            Self::UInt8(_) => ScalarType::UInt8,
            Self::UInt16(_) => ScalarType::UInt16,
            Self::UInt32(_) => ScalarType::UInt32,
            Self::Float32(_) => ScalarType::Float32,
            Self::Float64(_) => ScalarType::Float64,
        }
    }

    /// The value widened to `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int8(v) => v as f64,
            Self::Int16(v) => v as f64,
            Self::Int32(v) => v as f64,
            Self::UInt8(v) => v as f64,
            Self::UInt16(v) => v as f64,
            Self::UInt32(v) => v as f64,
            Self::Float32(v) => v as f64,
            Self::Float64(v) => v,
        }
    }

    /// Replace a floating point value, keeping its width.
    ///
    /// Returns `false` and leaves the value untouched for integer variants.
    pub fn set_float(&mut self, value: f64) -> bool {
        match self {
            Self::Float32(v) => *v = value as f32,
            Self::Float64(v) => *v = value,
            _ => return false,
        }
        true
    }

    /// Append the little-endian encoding of the value to `out`.
    pub(crate) fn write_le(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Int8(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::UInt8(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Self::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int8(a), Self::Int8(b)) => a == b,
            (Self::Int16(a), Self::Int16(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::UInt8(a), Self::UInt8(b)) => a == b,
            (Self::UInt16(a), Self::UInt16(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::Float32(a), Self::Float32(b)) => a.to_bits() == b.to_bits(),
            (Self::Float64(a), Self::Float64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Scalar {}
