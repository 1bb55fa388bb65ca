//! # Sample Schema
//!
//! - [`mixin`]: `example.mixin`, its implementers and the `test.model` owner.
//! - [`signaling`]: `test_signals.signaling_model`, observed by
//!   [`receivers`](crate::receivers).

pub mod mixin;
pub mod signaling;

pub use mixin::*;
pub use signaling::*;

use kindred_framework::{Registry, SetupError};

/// Builds the registry holding every sample kind.
pub fn schema() -> Result<Registry, SetupError> {
    let mut builder = Registry::builder();
    mixin::register(&mut builder);
    signaling::register(&mut builder);
    builder.build()
}
