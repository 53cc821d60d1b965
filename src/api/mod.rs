//! Upstream API access.
//!
//! Endpoint set construction, loosely typed wire shapes, and the HTTP
//! client used to query them.

pub mod client;
pub mod endpoints;
pub mod raw;

pub use client::{ApiError, ListingClient};
pub use endpoints::{EndpointSet, ListingEndpoint, ListingKind};
pub use raw::RawRecord;
