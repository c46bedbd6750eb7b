//! Flash chip type definitions

/// Width of the Block Protect field in status register 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpWidth {
    /// BP0..BP2, followed by TB and SEC
    Three,
    /// BP0..BP3, followed by TB (no SEC bit)
    Four,
}

impl BpWidth {
    /// Map a raw BP bit count to a supported width
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// Number of BP bits
    pub const fn bits(self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Largest BP value the field can hold
    pub const fn max_bp(self) -> u8 {
        (1 << self.bits()) - 1
    }
}

/// Flash chip definition
///
/// Geometry is stored as power-of-two shift counts and expanded with left
/// shifts on demand, which keeps the table small and the products exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipDescriptor {
    /// JEDEC device ID (second and third bytes of RDID response)
    pub id: u16,
    /// Chip model name (e.g., "W25Q128_V")
    pub name: &'static str,
    /// log2 of the page size
    pub page_size_shift: u8,
    /// log2 of pages per sector
    pub pages_per_sector_shift: u8,
    /// log2 of sectors per block
    pub sectors_per_block_shift: u8,
    /// log2 of the number of blocks
    pub blocks_shift: u8,
    /// log2 of the smallest protectable unit
    pub protection_granularity_shift: u8,
    /// Number of BP bits (0 when block protection is not supported)
    pub bp_bits: u8,
}

impl ChipDescriptor {
    /// Descriptor for a part without block protection support
    pub const fn new(
        id: u16,
        name: &'static str,
        page_size_shift: u8,
        pages_per_sector_shift: u8,
        sectors_per_block_shift: u8,
        blocks_shift: u8,
    ) -> Self {
        Self {
            id,
            name,
            page_size_shift,
            pages_per_sector_shift,
            sectors_per_block_shift,
            blocks_shift,
            protection_granularity_shift: 0,
            bp_bits: 0,
        }
    }

    /// Add block protection parameters
    pub const fn with_protection(mut self, granularity_shift: u8, bp_bits: u8) -> Self {
        self.protection_granularity_shift = granularity_shift;
        self.bp_bits = bp_bits;
        self
    }

    /// Page size in bytes
    pub const fn page_size(&self) -> u32 {
        1 << self.page_size_shift
    }

    /// Sector (smallest erase unit) size in bytes
    pub const fn sector_size(&self) -> u32 {
        self.page_size() << self.pages_per_sector_shift
    }

    /// Block size in bytes
    pub const fn block_size(&self) -> u32 {
        self.sector_size() << self.sectors_per_block_shift
    }

    /// Total flash size in bytes
    pub const fn total_size(&self) -> u32 {
        self.block_size() << self.blocks_shift
    }

    /// Smallest protectable unit in bytes
    pub const fn protection_granularity(&self) -> u32 {
        1 << self.protection_granularity_shift
    }

    /// Block Protect field layout, if the part supports protection
    pub const fn bp_width(&self) -> Option<BpWidth> {
        BpWidth::from_bits(self.bp_bits)
    }
}

impl core::fmt::Display for ChipDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (ID {:04x}, {} KiB)", self.name, self.id, self.total_size() / 1024)
    }
}

/// JEDEC manufacturer ID for Winbond
pub const WINBOND_MANUFACTURER: u8 = 0xEF;
