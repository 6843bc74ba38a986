//! Server module for exposing listings over HTTP
//!
//! [`ServerBuilder`] collects listings into a [`ListingRegistry`] and
//! produces an axum router with one query route and one count route per
//! collection.

pub mod builder;
pub mod registry;
pub mod router;

pub use builder::ServerBuilder;
pub use registry::{ListingEndpoint, ListingRegistry};
pub use router::build_listing_routes;
