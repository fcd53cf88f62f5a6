//! Door-to-door multimodal routing.
//!
//! The crate bridges two routing domains: a weighted street graph for the
//! access and egress legs, and a transit connection table for the journey in
//! between. The bridge has two halves: a [`StopReachabilitySearch`] that
//! discovers transit stops around a point while a single bounded street
//! search is in flight, and an assembler ([`try_calculate_intermodal`]) that
//! feeds the discovered stops into an earliest-arrival connection scan and
//! stitches the three legs into one continuous route.

pub mod csa;
pub mod error;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod search;
pub mod tiles;

pub use error::Error;
pub use model::{
    Connection, GraphPoint, Profile, Stop, StopId, StreetGraph, TransitData, TransitModel,
};
pub use routing::assembler::{IntermodalOptions, try_calculate_intermodal};
pub use routing::route::{Route, RouteStop};
pub use search::CancelToken;
pub use search::reachability::{AccessPath, StopReachabilitySearch};

/// Travel cost on the street network, in seconds.
pub type Cost = u32;

/// Time of day, in seconds since midnight of the service day.
pub type Time = u32;

/// Zoom level of the tiles used for lazy stop discovery.
pub const STOP_TILE_ZOOM: u32 = 14;

/// Cap on candidate access/egress stops collected per side of a request.
pub const MAX_CANDIDATE_STOPS: usize = 5;

/// Default street-search budget for stop discovery, in seconds.
pub const DEFAULT_ACCESS_BUDGET: Cost = 3600;

/// Default departure window length handed to the connection scan.
pub const DEFAULT_SEARCH_HORIZON: Time = 86400;
