use log::info;

use crate::{
    addr::Address,
    cache::{AccessResult, SetAssociativeCache},
    generator::AddressSource,
    stat::CacheStats,
};

/// Fixed-length run of a cache against an address source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Simulation {
    iterations: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITERATIONS)
    }
}

impl Simulation {
    pub const DEFAULT_ITERATIONS: u64 = 1_000_000;

    pub const fn new(iterations: u64) -> Self {
        Self { iterations }
    }

    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Draws one address and looks it up.
    pub fn step<S: AddressSource + ?Sized>(
        cache: &mut SetAssociativeCache,
        source: &mut S,
    ) -> (Address, AccessResult) {
        let address = Address::from_bits(source.next_address());
        (address, cache.lookup(address))
    }

    /// Feeds exactly `iterations` addresses through `cache`, handing every
    /// access to `observer`, and returns the tally.
    pub fn run<S, O>(
        &self,
        cache: &mut SetAssociativeCache,
        source: &mut S,
        mut observer: O,
    ) -> CacheStats
    where
        S: AddressSource + ?Sized,
        O: FnMut(Address, AccessResult),
    {
        info!("Running {} accesses", self.iterations);
        let mut stats = CacheStats::new();

        for _ in 0..self.iterations {
            let (address, result) = Self::step(cache, source);
            stats.record(result);
            observer(address, result);
        }

        info!(
            "Finished: {} hits, {} misses, {} evictions",
            stats.hits,
            stats.misses,
            cache.evictions()
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Sequential, Strided};

    #[test]
    fn sequential_4k_hits_after_first_touch() {
        // 4 KiB fits entirely, so only the first byte of each line misses
        let mut cache = SetAssociativeCache::new(128, 4).unwrap();
        let stats = Simulation::new(100_000).run(&mut cache, &mut Sequential::new(4096), |_, _| {});
        assert_eq!(stats.total(), 100_000);
        assert_eq!(stats.misses, 4096 / 128);
        assert_eq!(cache.evictions(), 0);
    }

    #[test]
    fn observer_sees_every_access() {
        let mut cache = SetAssociativeCache::new(64, 2).unwrap();
        let mut seen = Vec::new();
        let stats = Simulation::new(6).run(&mut cache, &mut Strided::new(32, 1 << 20), |a, r| {
            seen.push((a.bits(), r))
        });

        use AccessResult::*;
        assert_eq!(
            seen,
            [(32, Miss), (64, Miss), (96, Hit), (128, Miss), (160, Hit), (192, Miss)]
        );
        assert_eq!(stats, CacheStats { hits: 2, misses: 4 });
    }

    #[test]
    fn zero_iterations() {
        let mut cache = SetAssociativeCache::new(64, 2).unwrap();
        let stats = Simulation::new(0).run(&mut cache, &mut Sequential::new(16), |_, _| {
            panic!("no accesses expected")
        });
        assert_eq!(stats.total(), 0);
        assert_eq!(cache.resident_lines(), 0);
    }
}
