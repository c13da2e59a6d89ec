//! Linguistic processing utilities.
//!
//! This crate splits text into pieces a speech synthesizer can accept. The
//! [`segment`] module finds sentence and clause boundaries, and the [`chunk`]
//! module packs those pieces into byte-bounded [`Chunk`]s.

pub mod chunk;
pub mod segment;

pub use crate::chunk::*;
pub use crate::segment::*;
