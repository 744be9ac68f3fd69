//! # Bytecode Linker Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # Load → link → deploy/attach flows through the public API
//! │   ├── linking_flows.rs
//! │   └── manifest_flows.rs
//! │
//! └── adversarial/      # Malformed descriptors and hostile link inputs
//!     └── malformed_inputs.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p linker-tests
//! cargo test -p linker-tests integration::
//! cargo test -p linker-tests adversarial::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod adversarial;
pub mod integration;
