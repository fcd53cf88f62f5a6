//! A location resolved onto the street graph

use geo::Point;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::network::StreetGraph;
use crate::{Cost, Error};

/// A coordinate snapped onto a street edge.
///
/// The point can enter the graph through either endpoint of its edge; the
/// entry cost for each side follows from the offset fraction and the edge
/// weight. Walk and bike edges carry the same weight in both directions, so
/// the entry costs hold for forward and backward searches alike.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPoint {
    /// Edge the point lies on
    pub edge: EdgeIndex,
    /// Offset along the edge, 0.0 at the edge source and 1.0 at its target
    pub fraction: f64,
    /// Projected coordinates of the point
    pub geometry: Point<f64>,
}

impl GraphPoint {
    /// The two directional access vertices with their entry costs.
    ///
    /// # Errors
    ///
    /// `Error::InternalInconsistency` if the referenced edge is gone, which
    /// can only happen when a point outlives the graph it was resolved on.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn access_vertices(&self, graph: &StreetGraph) -> Result<[(NodeIndex, Cost); 2], Error> {
        let (a, b) = graph
            .graph
            .edge_endpoints(self.edge)
            .ok_or(Error::InternalInconsistency(
                "graph point references a missing edge",
            ))?;
        let weight = f64::from(graph.edge_weight(self.edge));

        let to_a = (self.fraction * weight).round() as Cost;
        let to_b = ((1.0 - self.fraction) * weight).round() as Cost;
        Ok([(a, to_a), (b, to_b)])
    }

    /// Travel cost to another point on the same edge, `None` otherwise.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cost_along_edge(&self, other: &GraphPoint, graph: &StreetGraph) -> Option<Cost> {
        if self.edge != other.edge {
            return None;
        }
        let weight = f64::from(graph.edge_weight(self.edge));
        Some(((self.fraction - other.fraction).abs() * weight).round() as Cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_costs_split_the_edge_weight() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Point::new(0.0, 0.0));
        let b = graph.add_node(Point::new(0.01, 0.0));
        let edge = graph.add_edge(a, b, 1000);

        let point = GraphPoint {
            edge,
            fraction: 0.25,
            geometry: Point::new(0.0025, 0.0),
        };

        let [(va, ca), (vb, cb)] = point.access_vertices(&graph).unwrap();
        assert_eq!((va, ca), (a, 250));
        assert_eq!((vb, cb), (b, 750));
    }

    #[test]
    fn same_edge_cost_uses_the_fraction_difference() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Point::new(0.0, 0.0));
        let b = graph.add_node(Point::new(0.01, 0.0));
        let edge = graph.add_edge(a, b, 1000);

        let near = GraphPoint {
            edge,
            fraction: 0.2,
            geometry: Point::new(0.002, 0.0),
        };
        let far = GraphPoint {
            edge,
            fraction: 0.7,
            geometry: Point::new(0.007, 0.0),
        };

        assert_eq!(near.cost_along_edge(&far, &graph), Some(500));

        let other_edge = graph.add_edge(a, b, 500);
        let elsewhere = GraphPoint {
            edge: other_edge,
            fraction: 0.0,
            geometry: Point::new(0.0, 0.0),
        };
        assert_eq!(near.cost_along_edge(&elsewhere, &graph), None);
    }
}
