use std::fmt::Display;

/// A 32-bit memory address as produced by an address source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address(u32);
impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
impl From<u32> for Address {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}
impl Address {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
    pub const fn bits(self) -> u32 {
        self.0
    }
    /// Address with the within-line offset discarded.
    pub const fn block_number(self, byte_offset_bits: u32) -> u32 {
        self.0 >> byte_offset_bits
    }
    pub const fn line_offset(self, byte_offset_bits: u32) -> u32 {
        self.0 & low_mask(byte_offset_bits)
    }
    pub const fn decode(self, byte_offset_bits: u32, set_index_bits: u32) -> DecodedAddress {
        decode(self.0, byte_offset_bits, set_index_bits)
    }
}

/// The fields of an address that take part in a lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecodedAddress {
    pub tag: u32,
    pub set_index: usize,
}

impl DecodedAddress {
    /// Rebuilds the first byte address of the block, i.e. the original
    /// address with its offset bits cleared.
    pub const fn block_address(self, byte_offset_bits: u32, set_index_bits: u32) -> Address {
        let block = shl(self.tag, set_index_bits) | self.set_index as u32;
        Address(shl(block, byte_offset_bits))
    }
}

/// Splits `address` into its tag and set index. The low `byte_offset_bits`
/// bits never influence the result.
pub const fn decode(address: u32, byte_offset_bits: u32, set_index_bits: u32) -> DecodedAddress {
    let block = shr(address, byte_offset_bits);
    DecodedAddress {
        tag: shr(block, set_index_bits),
        set_index: (block & low_mask(set_index_bits)) as usize,
    }
}

const fn low_mask(bits: u32) -> u32 {
    if bits >= u32::BITS {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

// shifting by the full width yields zero instead of overflowing
const fn shr(value: u32, bits: u32) -> u32 {
    if bits >= u32::BITS {
        0
    } else {
        value >> bits
    }
}

const fn shl(value: u32, bits: u32) -> u32 {
    if bits >= u32::BITS {
        0
    } else {
        value << bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_splits_fields() {
        // 128-byte lines, 128 sets
        let d = decode(0x0001_2345, 7, 7);
        assert_eq!(d.set_index, (0x0001_2345 >> 7) & 127);
        assert_eq!(d.tag, 0x0001_2345 >> 14);
    }

    #[test]
    fn offset_bits_are_ignored() {
        for offset in 0..128 {
            assert_eq!(decode(0x4000 + offset, 7, 7), decode(0x4000, 7, 7));
        }
        assert_ne!(decode(0x4000, 7, 7), decode(0x4080, 7, 7));
    }

    #[test]
    fn block_address_clears_offset() {
        let addr = Address::from_bits(0xdead_beef);
        let d = addr.decode(6, 8);
        assert_eq!(d.block_address(6, 8).bits(), 0xdead_beef & !63);
        assert_eq!(addr.line_offset(6), 0xdead_beef & 63);
        assert_eq!(addr.block_number(6), 0xdead_beef >> 6);
    }

    #[test]
    fn single_set_has_no_index_bits() {
        let d = decode(0xffff_ffff, 4, 0);
        assert_eq!(d.set_index, 0);
        assert_eq!(d.tag, 0x0fff_ffff);
        assert_eq!(d.block_address(4, 0).bits(), 0xffff_fff0);
    }

    #[test]
    fn display_is_zero_padded_hex() {
        assert_eq!(Address::from_bits(0x1f).to_string(), "0x0000001f");
    }
}
