//! Hostile and malformed inputs.

pub mod malformed_inputs;
