use std::{
    fmt::Display,
    ops::{Index, IndexMut},
};

use log::{debug, info, trace};
use serde::Serialize;

use crate::{
    addr::{Address, DecodedAddress},
    error::ConfigurationError,
};

/// Capacity used by [`SetAssociativeCache::new`].
pub const DEFAULT_CAPACITY: u32 = 64 * 1024;

/// Validated cache dimensions together with the address bit widths derived
/// from them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Geometry {
    capacity: u32,
    line_size: u32,
    ways: u32,
    total_lines: u32,
    num_sets: u32,
    byte_offset_bits: u32,
    set_index_bits: u32,
}

impl Geometry {
    pub fn new(capacity: u32, line_size: u32, ways: u32) -> Result<Self, ConfigurationError> {
        if capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if line_size == 0 {
            return Err(ConfigurationError::ZeroLineSize);
        }
        if ways == 0 {
            return Err(ConfigurationError::ZeroWays);
        }
        if !line_size.is_power_of_two() {
            return Err(ConfigurationError::LineSizeNotPowerOfTwo { line_size });
        }
        if line_size > capacity {
            return Err(ConfigurationError::LineSizeExceedsCapacity {
                line_size,
                capacity,
            });
        }
        if capacity % line_size != 0 {
            return Err(ConfigurationError::CapacityNotMultipleOfLineSize {
                capacity,
                line_size,
            });
        }

        let total_lines = capacity / line_size;
        if total_lines % ways != 0 {
            return Err(ConfigurationError::WaysDoNotDivideLines { ways, total_lines });
        }

        let num_sets = total_lines / ways;
        if !num_sets.is_power_of_two() {
            return Err(ConfigurationError::SetCountNotPowerOfTwo { num_sets });
        }

        Ok(Self {
            capacity,
            line_size,
            ways,
            total_lines,
            num_sets,
            byte_offset_bits: line_size.trailing_zeros(),
            set_index_bits: num_sets.trailing_zeros(),
        })
    }

    pub const fn capacity(&self) -> u32 {
        self.capacity
    }
    pub const fn line_size(&self) -> u32 {
        self.line_size
    }
    pub const fn ways(&self) -> u32 {
        self.ways
    }
    pub const fn total_lines(&self) -> u32 {
        self.total_lines
    }
    pub const fn num_sets(&self) -> u32 {
        self.num_sets
    }
    pub const fn byte_offset_bits(&self) -> u32 {
        self.byte_offset_bits
    }
    pub const fn set_index_bits(&self) -> u32 {
        self.set_index_bits
    }

    pub const fn decode(&self, address: Address) -> DecodedAddress {
        address.decode(self.byte_offset_bits, self.set_index_bits)
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} B capacity, {} B lines, {}-way, {} sets",
            self.capacity, self.line_size, self.ways, self.num_sets
        )
    }
}

/// Outcome of a single lookup. Cold and conflict misses are not told apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AccessResult {
    Miss,
    Hit,
}

impl AccessResult {
    pub const fn is_hit(self) -> bool {
        matches!(self, AccessResult::Hit)
    }
}

impl Display for AccessResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessResult::Hit => f.write_str("Hit"),
            AccessResult::Miss => f.write_str("Miss"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheLine {
    valid: bool,
    tag: u32,
    counter: u32,
}

impl CacheLine {
    pub const fn invalid() -> Self {
        Self {
            valid: false,
            tag: 0,
            counter: 0,
        }
    }
    pub const fn is_valid(&self) -> bool {
        self.valid
    }
    pub const fn tag(&self) -> u32 {
        self.tag
    }
    /// Access frequency since the line was installed.
    pub const fn counter(&self) -> u32 {
        self.counter
    }
    const fn holds(&self, tag: u32) -> bool {
        self.valid && self.tag == tag
    }
    fn mark_accessed(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }
    // frequency history of the previous occupant is dropped
    fn install(&mut self, tag: u32) {
        self.valid = true;
        self.tag = tag;
        self.counter = 1;
    }
}

/// The ways of one set, in way order.
#[derive(Clone, Debug)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
}

impl CacheSet {
    fn empty(ways: usize) -> Self {
        Self {
            lines: vec![CacheLine::invalid(); ways],
        }
    }
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }
    pub fn ways(&self) -> usize {
        self.lines.len()
    }
    pub fn has_entry(&self) -> bool {
        self.lines.iter().any(|l| l.valid)
    }
    pub fn valid_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.valid).count()
    }
    /// Way holding `tag`, first match wins.
    pub fn find(&self, tag: u32) -> Option<usize> {
        self.lines.iter().position(|l| l.holds(tag))
    }
    /// Way that the next install overwrites: the lowest invalid way if there
    /// is one, otherwise the lowest-indexed way among those with the smallest
    /// counter.
    pub fn victim(&self) -> usize {
        if let Some(free) = self.lines.iter().position(|l| !l.valid) {
            return free;
        }

        let mut k = 0;
        for i in 1..self.lines.len() {
            // strict comparison keeps the first minimum
            if self.lines[i].counter < self.lines[k].counter {
                k = i;
            }
        }
        k
    }
    fn invalidate(&mut self) {
        self.lines.fill(CacheLine::invalid());
    }
}

impl Index<usize> for CacheSet {
    type Output = CacheLine;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lines[index]
    }
}
impl IndexMut<usize> for CacheSet {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.lines[index]
    }
}

/// Set-associative cache model with least-frequently-used replacement.
///
/// Only block presence is tracked, no data. Every [`lookup`] mutates exactly
/// one line: a counter increment on a hit, an install on a miss.
///
/// [`lookup`]: SetAssociativeCache::lookup
#[derive(Clone, Debug)]
pub struct SetAssociativeCache {
    geometry: Geometry,
    sets: Vec<CacheSet>,
    fills: u64,
    evictions: u64,
}

impl SetAssociativeCache {
    /// Cache of [`DEFAULT_CAPACITY`] bytes.
    pub fn new(line_size: u32, ways: u32) -> Result<Self, ConfigurationError> {
        Self::with_capacity(DEFAULT_CAPACITY, line_size, ways)
    }

    pub fn with_capacity(
        capacity: u32,
        line_size: u32,
        ways: u32,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::with_geometry(Geometry::new(capacity, line_size, ways)?))
    }

    pub fn with_geometry(geometry: Geometry) -> Self {
        info!("Building cache: {geometry}");
        let sets = (0..geometry.num_sets)
            .map(|_| CacheSet::empty(geometry.ways as usize))
            .collect();
        Self {
            geometry,
            sets,
            fills: 0,
            evictions: 0,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn set(&self, index: usize) -> &CacheSet {
        &self.sets[index]
    }

    pub fn sets(&self) -> impl Iterator<Item = &CacheSet> {
        self.sets.iter()
    }

    /// Looks `address` up, counting the access on a hit and installing the
    /// block on a miss.
    pub fn lookup(&mut self, address: impl Into<Address>) -> AccessResult {
        let address = address.into();
        let DecodedAddress { tag, set_index } = self.geometry.decode(address);
        let set = &mut self.sets[set_index];

        if let Some(way) = set.find(tag) {
            set[way].mark_accessed();
            trace!("{address} hit in set {set_index} way {way}");
            return AccessResult::Hit;
        }

        let way = set.victim();
        if set[way].valid {
            let evicted = DecodedAddress {
                tag: set[way].tag,
                set_index,
            }
            .block_address(self.geometry.byte_offset_bits, self.geometry.set_index_bits);
            debug!(
                "Evicting {evicted} (counter {}) from set {set_index} way {way} for {address}",
                set[way].counter
            );
            self.evictions += 1;
        } else {
            self.fills += 1;
        }
        set[way].install(tag);
        trace!("{address} miss, installed in set {set_index} way {way}");

        AccessResult::Miss
    }

    /// Whether the block of `address` is resident. Does not count as an access.
    pub fn contains(&self, address: impl Into<Address>) -> bool {
        let DecodedAddress { tag, set_index } = self.geometry.decode(address.into());
        self.sets[set_index].find(tag).is_some()
    }

    /// Block-aligned address held by a line with `tag` in `set_index`.
    pub fn block_address(&self, set_index: usize, tag: u32) -> Address {
        DecodedAddress { tag, set_index }
            .block_address(self.geometry.byte_offset_bits, self.geometry.set_index_bits)
    }

    pub fn resident_lines(&self) -> usize {
        self.sets.iter().map(CacheSet::valid_lines).sum()
    }

    /// Misses that installed into a previously invalid way.
    pub fn fills(&self) -> u64 {
        self.fills
    }

    /// Misses that replaced a resident line.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn reset(&mut self) {
        debug!("Invalidating all cache lines");
        for set in self.sets.iter_mut() {
            set.invalidate();
        }
        self.fills = 0;
        self.evictions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with_counters(counters: &[u32]) -> CacheSet {
        let mut set = CacheSet::empty(counters.len());
        for (way, &c) in counters.iter().enumerate() {
            set[way] = CacheLine {
                valid: true,
                tag: way as u32,
                counter: c,
            };
        }
        set
    }

    #[test]
    fn geometry_derives_bit_widths() {
        let g = Geometry::new(DEFAULT_CAPACITY, 128, 4).unwrap();
        assert_eq!(g.total_lines(), 512);
        assert_eq!(g.num_sets(), 128);
        assert_eq!(g.byte_offset_bits(), 7);
        assert_eq!(g.set_index_bits(), 7);
        assert_eq!(g.num_sets() * g.ways(), g.total_lines());
    }

    #[test]
    fn geometry_rejects_bad_parameters() {
        use ConfigurationError::*;

        assert_eq!(Geometry::new(0, 64, 4), Err(ZeroCapacity));
        assert_eq!(Geometry::new(1024, 0, 4), Err(ZeroLineSize));
        assert_eq!(Geometry::new(1024, 64, 0), Err(ZeroWays));
        assert_eq!(
            Geometry::new(1024, 48, 4),
            Err(LineSizeNotPowerOfTwo { line_size: 48 })
        );
        assert_eq!(
            Geometry::new(1024, 2048, 1),
            Err(LineSizeExceedsCapacity {
                line_size: 2048,
                capacity: 1024
            })
        );
        assert_eq!(
            Geometry::new(1000, 64, 1),
            Err(CapacityNotMultipleOfLineSize {
                capacity: 1000,
                line_size: 64
            })
        );
        assert_eq!(
            Geometry::new(1024, 64, 3),
            Err(WaysDoNotDivideLines {
                ways: 3,
                total_lines: 16
            })
        );
        assert_eq!(
            Geometry::new(768, 64, 2),
            Err(SetCountNotPowerOfTwo { num_sets: 6 })
        );
    }

    #[test]
    fn fully_associative_geometry() {
        let g = Geometry::new(1024, 64, 16).unwrap();
        assert_eq!(g.num_sets(), 1);
        assert_eq!(g.set_index_bits(), 0);
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = SetAssociativeCache::new(64, 8).unwrap();
        assert_eq!(cache.sets().count(), 128);
        assert!(cache
            .sets()
            .flat_map(|s| s.lines())
            .all(|l| *l == CacheLine::invalid()));
        assert_eq!(cache.resident_lines(), 0);
    }

    #[test]
    fn victim_prefers_lowest_invalid_way() {
        let mut set = set_with_counters(&[5, 1, 7, 2]);
        set[2] = CacheLine::invalid();
        set[3] = CacheLine::invalid();
        assert_eq!(set.victim(), 2);
    }

    #[test]
    fn victim_is_first_minimum() {
        assert_eq!(set_with_counters(&[3, 1, 2, 1]).victim(), 1);
        assert_eq!(set_with_counters(&[4, 4, 4, 4]).victim(), 0);
        assert_eq!(set_with_counters(&[9, 8, 7, 6]).victim(), 3);
    }

    #[test]
    fn hit_increments_counter_only() {
        let mut cache = SetAssociativeCache::new(128, 4).unwrap();
        assert_eq!(cache.lookup(0x40u32), AccessResult::Miss);
        assert_eq!(cache.lookup(0x7fu32), AccessResult::Hit);
        assert_eq!(cache.lookup(0x00u32), AccessResult::Hit);
        let line = cache.set(0)[0];
        assert!(line.is_valid());
        assert_eq!(line.tag(), 0);
        assert_eq!(line.counter(), 3);
        assert_eq!(cache.resident_lines(), 1);
    }

    #[test]
    fn eviction_resets_counter() {
        // 2 ways, 1 set
        let mut cache = SetAssociativeCache::with_capacity(256, 128, 2).unwrap();
        cache.lookup(0u32);
        cache.lookup(0u32);
        cache.lookup(0u32);
        cache.lookup(128u32);
        assert_eq!(cache.lookup(256u32), AccessResult::Miss);

        let set = cache.set(0);
        assert_eq!(set[0].tag(), 0);
        assert_eq!(set[0].counter(), 3);
        assert_eq!(set[1].tag(), 2);
        assert_eq!(set[1].counter(), 1);
        assert_eq!(cache.fills(), 2);
        assert_eq!(cache.evictions(), 1);
        assert!(!cache.contains(128u32));
    }

    #[test]
    fn contains_does_not_count_as_access() {
        let mut cache = SetAssociativeCache::new(64, 2).unwrap();
        cache.lookup(0x1000u32);
        assert!(cache.contains(0x1004u32));
        assert!(!cache.contains(0x2000u32));
        let DecodedAddress { tag, set_index } = cache.geometry().decode(Address::from_bits(0x1000));
        let way = cache.set(set_index).find(tag).unwrap();
        assert_eq!(cache.set(set_index)[way].counter(), 1);
    }

    #[test]
    fn block_address_inverts_decode() {
        let cache = SetAssociativeCache::new(32, 4).unwrap();
        let addr = Address::from_bits(0x0123_4567);
        let d = cache.geometry().decode(addr);
        assert_eq!(cache.block_address(d.set_index, d.tag).bits(), 0x0123_4560);
    }

    #[test]
    fn reset_invalidates_everything() {
        let mut cache = SetAssociativeCache::new(64, 1).unwrap();
        for a in (0..DEFAULT_CAPACITY * 2).step_by(64) {
            cache.lookup(a);
        }
        assert_eq!(cache.resident_lines(), 1024);
        assert_eq!(cache.evictions(), 1024);
        cache.reset();
        assert_eq!(cache.resident_lines(), 0);
        assert_eq!(cache.fills(), 0);
        assert_eq!(cache.evictions(), 0);
        assert_eq!(cache.lookup(0u32), AccessResult::Miss);
    }
}
