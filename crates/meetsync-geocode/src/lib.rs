pub mod cache;
pub mod client;
pub mod error;

pub use cache::GeocodeCache;
pub use client::NominatimClient;
pub use error::GeocodeError;
