//! NumPy element type descriptors (`descr` field)

use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    #[must_use]
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

/// Parsed `descr` string such as `<f8` or `|u1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dtype {
    pub element: ElementType,
    pub order: ByteOrder,
}

impl ElementType {
    #[inline(always)]
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    fn kind(&self) -> char {
        match self {
            Self::Bool => 'b',
            Self::I8 | Self::I16 | Self::I32 | Self::I64 => 'i',
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => 'u',
            Self::F32 | Self::F64 => 'f',
        }
    }

    fn from_kind_and_size(kind: char, size: usize) -> Option<Self> {
        Some(match (kind, size) {
            ('b', 1) => Self::Bool,
            ('i', 1) => Self::I8,
            ('u', 1) => Self::U8,
            ('i', 2) => Self::I16,
            ('u', 2) => Self::U16,
            ('i', 4) => Self::I32,
            ('u', 4) => Self::U32,
            ('f', 4) => Self::F32,
            ('i', 8) => Self::I64,
            ('u', 8) => Self::U64,
            ('f', 8) => Self::F64,
            _ => return None,
        })
    }
}

impl FromStr for Dtype {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let order = match chars.next().ok_or(())? {
            '<' | '|' => ByteOrder::Little,
            '>' => ByteOrder::Big,
            '=' => ByteOrder::native(),
            _ => return Err(()),
        };
        let kind = chars.next().ok_or(())?;
        let size: usize = chars.as_str().parse().map_err(|_| ())?;
        let element = ElementType::from_kind_and_size(kind, size).ok_or(())?;

        // Single-byte types carry no byte order
        let order = if element.size() == 1 { ByteOrder::Little } else { order };
        Ok(Self { element, order })
    }
}

impl Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let order = match (self.element.size(), self.order) {
            (1, _) => '|',
            (_, ByteOrder::Little) => '<',
            (_, ByteOrder::Big) => '>',
        };
        write!(f, "{order}{}{}", self.element.kind(), self.element.size())
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::U8 => "uint8",
            Self::I16 => "int16",
            Self::U16 => "uint16",
            Self::I32 => "int32",
            Self::U32 => "uint32",
            Self::I64 => "int64",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
        };
        write!(f, "{name}")
    }
}
