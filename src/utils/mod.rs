pub mod canonical;
pub mod codec;

pub use canonical::{canonical_string, signable_message};
