//! Shared request extractors.

pub mod validate;
