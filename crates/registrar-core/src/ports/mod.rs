//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `RegistrarApi`, `BalanceGate`
//! - **Driven Ports (Outbound)**: `RegistrarClient`, `TimeSource`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
