//! End-to-end flows through the public API.

pub mod linking_flows;
pub mod manifest_flows;
