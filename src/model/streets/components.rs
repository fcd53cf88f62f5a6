//! Street network components - nodes, edges and travel profiles

use geo::{LineString, Point};

use crate::Cost;

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Traversal time in seconds
    pub weight: Cost,
    /// Optional geometry for visualization
    pub geometry: LineString<f64>,
}

impl StreetEdge {
    pub fn travel_time(&self) -> Cost {
        self.weight
    }
}

/// Access/egress travel profile used to derive edge weights
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub name: &'static str,
    /// Speed in meters per second
    pub speed: f64,
}

impl Profile {
    pub fn walking() -> Self {
        Self {
            name: "walking",
            speed: 1.4,
        }
    }

    pub fn cycling() -> Self {
        Self {
            name: "cycling",
            speed: 4.2,
        }
    }
}
