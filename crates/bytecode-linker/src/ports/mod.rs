//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the linking domain and the outside world.
//!
//! - **Driving Port (Inbound)**: `LinkingApi`
//! - **Driven Port (Outbound)**: `ContractProvider`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
