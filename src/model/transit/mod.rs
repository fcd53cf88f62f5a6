//! Transit network data model

pub mod data;
pub mod types;

pub use data::TransitData;
pub use types::{Connection, Stop, StopId, StopIndex, TripId};
