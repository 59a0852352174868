/// Rejected cache geometry. Raised only while building a cache; a cache that
/// was built successfully never fails a lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("line size must be positive")]
    ZeroLineSize,

    #[error("number of ways must be positive")]
    ZeroWays,

    #[error("cache capacity must be positive")]
    ZeroCapacity,

    #[error("line size {line_size} is not a power of two")]
    LineSizeNotPowerOfTwo { line_size: u32 },

    #[error("line size {line_size} exceeds the cache capacity of {capacity} bytes")]
    LineSizeExceedsCapacity { line_size: u32, capacity: u32 },

    #[error("capacity {capacity} is not a multiple of the line size {line_size}")]
    CapacityNotMultipleOfLineSize { capacity: u32, line_size: u32 },

    #[error("{ways} ways do not evenly divide {total_lines} cache lines")]
    WaysDoNotDivideLines { ways: u32, total_lines: u32 },

    #[error("{num_sets} sets cannot be indexed by address bits (not a power of two)")]
    SetCountNotPowerOfTwo { num_sets: u32 },
}
