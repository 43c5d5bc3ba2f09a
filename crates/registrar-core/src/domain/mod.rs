//! # Domain Layer (Inner Hexagon)
//!
//! Pure registration logic: lifecycle classification, premium pricing,
//! commitment hashing, baskets, and the registration flow state machine.
//! NO I/O, NO async.

pub mod basket;
pub mod commitment;
pub mod flow;
pub mod lifecycle;
pub mod premium;
pub mod value_objects;

pub use basket::*;
pub use commitment::*;
pub use flow::*;
pub use lifecycle::*;
pub use premium::*;
pub use value_objects::*;
