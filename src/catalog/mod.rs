//! Movie catalog adapter
//!
//! Thin typed client over the external movie-metadata API. One call
//! per metadata need; successful responses are cached with a TTL so
//! repeated lookups stay off the provider.

mod client;

pub use client::CatalogClient;
