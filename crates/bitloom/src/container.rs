//! The fixed-width unsigned integer that holds a packed value.

/// Storage width of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageWidth {
    U8,
    U16,
    U32,
    U64,
}

impl StorageWidth {
    /// Width in bits.
    pub fn bits(self) -> u32 {
        match self {
            StorageWidth::U8 => 8,
            StorageWidth::U16 => 16,
            StorageWidth::U32 => 32,
            StorageWidth::U64 => 64,
        }
    }

    /// Largest value the container can hold.
    pub fn max(self) -> u64 {
        crate::bits::width_max(self.bits())
    }

    /// Parses a Rust unsigned type name (`u8`, `u16`, `u32`, `u64`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "u8" => Some(StorageWidth::U8),
            "u16" => Some(StorageWidth::U16),
            "u32" => Some(StorageWidth::U32),
            "u64" => Some(StorageWidth::U64),
            _ => None,
        }
    }
}

/// Direction in which field offsets are assigned.
///
/// `LsbFirst` gives the first declared field the lowest bits; `MsbFirst`
/// gives it the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitOrder {
    #[default]
    LsbFirst,
    MsbFirst,
}

/// Visibility requested by the declaration surface. Carried as metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Crate,
    Private,
}

/// Container descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub storage: StorageWidth,
    pub order: BitOrder,
    pub visibility: Visibility,
}

impl Container {
    /// Creates a public, LSB-first container.
    pub fn new(name: impl Into<String>, storage: StorageWidth) -> Self {
        Container {
            name: name.into(),
            storage,
            order: BitOrder::default(),
            visibility: Visibility::default(),
        }
    }

    pub fn with_order(mut self, order: BitOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.storage.bits()
    }
}
