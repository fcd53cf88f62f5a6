//! Data model for intermodal routing
//!
//! Contains the street network used for the access and egress legs and the
//! transit network bridged to it.

// Re-export of main modules
pub mod streets;
pub mod transit;
pub mod transit_model;

// Re-export of the main model structure
pub use transit_model::TransitModel;

// Re-export of basic types for convenience
pub use streets::components::{Profile, StreetEdge, StreetNode};
pub use streets::network::StreetGraph;
pub use streets::point::GraphPoint;
pub use transit::data::TransitData;
pub use transit::types::{Connection, Stop, StopId, StopIndex, TripId};
