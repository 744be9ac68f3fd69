//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the linker to the documents it reads and the chain it
//! deploys to.
//!
//! - `manifest` / `compiler_output` build contract types from JSON documents
//! - `provider` implements the outbound `ContractProvider` port in memory

pub mod compiler_output;
pub mod manifest;
pub mod provider;

pub use compiler_output::*;
pub use manifest::*;
pub use provider::*;
