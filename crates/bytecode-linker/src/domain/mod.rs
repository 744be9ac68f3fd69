//! # Domain Layer (Inner Hexagon)
//!
//! Pure linking logic: placeholder scanning, patching, attr-dict validation
//! and the contract type lifecycle.
//! NO I/O, NO async.
//!
//! - All types here are pure domain concepts.
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod attr_dict;
pub mod config;
pub mod contract_type;
pub mod invariants;
pub mod link_reference;
pub mod patcher;
pub mod scanner;
pub mod services;
pub mod value_objects;

pub use attr_dict::*;
pub use config::*;
pub use contract_type::*;
pub use invariants::*;
pub use link_reference::*;
pub use patcher::*;
pub use scanner::*;
pub use services::*;
pub use value_objects::*;
