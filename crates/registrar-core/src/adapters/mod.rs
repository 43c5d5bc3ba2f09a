//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports.

pub mod clock;
pub mod in_memory_registrar;

pub use clock::{FixedClock, SystemClock};
pub use in_memory_registrar::{InMemoryRegistrar, DEFAULT_RENT_PER_SECOND};
