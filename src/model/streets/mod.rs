//! Street network model for walk and bike legs

pub mod components;
pub mod network;
pub mod point;

pub use components::{Profile, StreetEdge, StreetNode};
pub use network::StreetGraph;
pub use point::GraphPoint;
