//! Set-associative cache simulator.
//!
//! A [`SetAssociativeCache`] is driven by an [`AddressSource`] and classifies
//! each access as a hit or a miss, replacing lines by least-frequent use.
//! Only block presence is modelled, never data.

pub mod addr;
pub mod cache;
pub mod cli;
pub mod draw;
pub mod error;
pub mod generator;
pub mod logging;
pub mod sim;
pub mod stat;

pub use addr::{decode, Address, DecodedAddress};
pub use cache::{AccessResult, CacheLine, CacheSet, Geometry, SetAssociativeCache, DEFAULT_CAPACITY};
pub use error::ConfigurationError;
pub use generator::{AddressSource, Pattern};
pub use sim::Simulation;
pub use stat::CacheStats;
