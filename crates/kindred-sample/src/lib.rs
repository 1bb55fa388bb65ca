//! # Kindred Sample Library
//!
//! A small application on top of `kindred-framework`: a mixin implemented by
//! several kinds, an owner kind reaching them through typed references, and a
//! kind whose lifecycle is observed by signal receivers.

pub mod clients;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod receivers;
