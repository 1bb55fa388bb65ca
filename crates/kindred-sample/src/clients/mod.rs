//! Typed clients of the sample kinds.

pub mod signaling_client;
pub mod test_model_client;

pub use signaling_client::SignalingClient;
pub use test_model_client::TestModelClient;
