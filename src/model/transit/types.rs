//! Basic transit types

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Time;

/// Dense index of a stop inside one [`super::TransitData`] snapshot
pub type StopIndex = usize;

/// Dense index of a trip inside one [`super::TransitData`] snapshot
pub type TripId = usize;

/// Opaque composite key of a transit stop, stable across data snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StopId {
    /// Id of the tile the stop was loaded from
    pub tile: u32,
    /// Id of the stop within its tile
    pub local: u32,
}

/// A transit stop
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub geometry: Point<f64>,
}

/// One elementary vehicle movement between two consecutive stops of a trip.
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    pub trip: TripId,
    pub from_stop: StopIndex,
    pub to_stop: StopIndex,
    pub departure: Time,
    pub arrival: Time,
}
