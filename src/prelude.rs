pub use crate::{DEFAULT_ACCESS_BUDGET, DEFAULT_SEARCH_HORIZON, MAX_CANDIDATE_STOPS};

// Re-export key components
pub use crate::error::Error;
pub use crate::model::{
    Connection, GraphPoint, Profile, Stop, StopId, StreetGraph, TransitData, TransitModel,
};
pub use crate::routing::assembler::{IntermodalOptions, try_calculate_intermodal};
pub use crate::routing::route::{Route, RouteStop};
pub use crate::search::reachability::{AccessPath, StopReachabilitySearch};
pub use crate::search::{CancelToken, bounded_search};

// Core scalar types
pub use crate::Cost; // seconds
pub use crate::Time; // seconds since midnight
