//! RapidAPI "Real Estate 101" listings client.

pub mod client;
mod error;
mod retry;
pub mod search_url;

pub use client::ListingsClient;
pub use error::ListingsError;
pub use search_url::{build_search_url, encode_component};
