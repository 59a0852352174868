//! Address sources that drive a simulation.
//!
//! Each generator owns its cursor or random state, so two instances built with
//! the same parameters yield the same sequence.

use clap::ValueEnum;

/// Size of the simulated main memory.
pub const DRAM_SIZE: u32 = 64 * 1024 * 1024;

/// Produces one address per call.
pub trait AddressSource {
    fn next_address(&mut self) -> u32;
}

/// Source backed by a closure, see [`from_fn`].
pub struct FromFn<F>(F);

/// Wraps a closure returning one address per call.
pub fn from_fn<F: FnMut() -> u32>(f: F) -> FromFn<F> {
    FromFn(f)
}

impl<F: FnMut() -> u32> AddressSource for FromFn<F> {
    fn next_address(&mut self) -> u32 {
        (self.0)()
    }
}

impl<S: AddressSource + ?Sized> AddressSource for Box<S> {
    fn next_address(&mut self) -> u32 {
        (**self).next_address()
    }
}

/// Marsaglia multiply-with-carry generator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mwc {
    w: u32,
    z: u32,
}

impl Mwc {
    pub const DEFAULT_W: u32 = 0xABAB_AB55;
    pub const DEFAULT_Z: u32 = 0x0508_0902;

    /// Seeds that would make a half stick at zero fall back to the defaults.
    pub const fn new(w: u32, z: u32) -> Self {
        let w = if w == 0 || w == 0x464f_ffff { Self::DEFAULT_W } else { w };
        let z = if z == 0 || z == 0x9068_ffff { Self::DEFAULT_Z } else { z };
        Self { w, z }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.z = 36969u32
            .wrapping_mul(self.z & 0xffff)
            .wrapping_add(self.z >> 16);
        self.w = 18000u32
            .wrapping_mul(self.w & 0xffff)
            .wrapping_add(self.w >> 16);
        (self.z << 16).wrapping_add(self.w)
    }
}

impl Default for Mwc {
    fn default() -> Self {
        Self::new(Self::DEFAULT_W, Self::DEFAULT_Z)
    }
}

/// Counter stepping by one byte, wrapping at `range`.
#[derive(Clone, Debug)]
pub struct Sequential {
    next: u32,
    range: u32,
}

impl Sequential {
    pub const fn new(range: u32) -> Self {
        Self { next: 0, range }
    }
}

impl AddressSource for Sequential {
    fn next_address(&mut self) -> u32 {
        let addr = wrap(self.next, self.range);
        self.next = self.next.wrapping_add(1);
        addr
    }
}

/// Uniformly distributed addresses below `range`.
#[derive(Clone, Debug)]
pub struct UniformRandom {
    rng: Mwc,
    range: u32,
}

impl UniformRandom {
    pub fn new(range: u32) -> Self {
        Self::with_rng(Mwc::default(), range)
    }
    pub const fn with_rng(rng: Mwc, range: u32) -> Self {
        Self { rng, range }
    }
}

impl AddressSource for UniformRandom {
    fn next_address(&mut self) -> u32 {
        wrap(self.rng.next_u32(), self.range)
    }
}

/// Counter advanced by `stride` before every access, wrapping at `range`.
/// The first address is therefore `stride`, not zero.
#[derive(Clone, Debug)]
pub struct Strided {
    cursor: u32,
    stride: u32,
    range: u32,
}

impl Strided {
    pub const fn new(stride: u32, range: u32) -> Self {
        Self {
            cursor: 0,
            stride,
            range,
        }
    }
}

impl AddressSource for Strided {
    fn next_address(&mut self) -> u32 {
        self.cursor = self.cursor.wrapping_add(self.stride);
        wrap(self.cursor, self.range)
    }
}

// a zero range spans the whole address space
fn wrap(addr: u32, range: u32) -> u32 {
    addr.checked_rem(range).unwrap_or(addr)
}

/// The stock access patterns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    /// Every byte of main memory in order
    #[value(name = "mem-gen1", alias = "sequential-dram")]
    SequentialDram,
    /// Random bytes within the first 24 KiB
    #[value(name = "mem-gen2", alias = "random-24k")]
    RandomSmall,
    /// Random bytes anywhere in main memory
    #[value(name = "mem-gen3", alias = "random-dram")]
    RandomDram,
    /// Every byte of the first 4 KiB, repeatedly
    #[value(name = "mem-gen4", alias = "sequential-4k")]
    Sequential4K,
    /// Every byte of the first 64 KiB, repeatedly
    #[value(name = "mem-gen5", alias = "sequential-64k")]
    Sequential64K,
    /// Fixed stride through the first 256 KiB
    #[value(name = "mem-gen6", alias = "strided-256k")]
    Strided256K,
}

impl Pattern {
    pub const DEFAULT_STRIDE: u32 = 32;

    /// Fresh source for this pattern. `stride` only affects
    /// [`Pattern::Strided256K`].
    pub fn source(self, stride: u32) -> Box<dyn AddressSource> {
        match self {
            Pattern::SequentialDram => Box::new(Sequential::new(DRAM_SIZE)),
            Pattern::RandomSmall => Box::new(UniformRandom::new(24 * 1024)),
            Pattern::RandomDram => Box::new(UniformRandom::new(DRAM_SIZE)),
            Pattern::Sequential4K => Box::new(Sequential::new(4 * 1024)),
            Pattern::Sequential64K => Box::new(Sequential::new(64 * 1024)),
            Pattern::Strided256K => Box::new(Strided::new(stride, 256 * 1024)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::SequentialDram => "mem-gen1",
            Pattern::RandomSmall => "mem-gen2",
            Pattern::RandomDram => "mem-gen3",
            Pattern::Sequential4K => "mem-gen4",
            Pattern::Sequential64K => "mem-gen5",
            Pattern::Strided256K => "mem-gen6",
        }
    }
}
