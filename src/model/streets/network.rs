//! Street graph with spatial resolution of arbitrary coordinates

use geo::{Distance, Haversine, LineString, Point};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::{GeomWithData, Line};

use super::components::{Profile, StreetEdge, StreetNode};
use super::point::GraphPoint;
use crate::{Cost, Error};

/// Coordinates further than this from any street edge fail to resolve.
const SNAP_RADIUS_M: f64 = 500.0;

type IndexedEdge = GeomWithData<Line<[f64; 2]>, EdgeIndex>;

/// Street network for access and egress legs.
///
/// Walk and bike edges are traversable in both directions, so the graph is
/// undirected. The spatial index over edge segments must be rebuilt with
/// [`StreetGraph::build_index`] after the last edge is added; resolution
/// fails on a graph whose index is stale or empty.
#[derive(Debug, Clone, Default)]
pub struct StreetGraph {
    pub graph: UnGraph<StreetNode, StreetEdge>,
    edge_index: RTree<IndexedEdge>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, geometry: Point<f64>) -> NodeIndex {
        self.graph.add_node(StreetNode { geometry })
    }

    /// Adds an edge with an explicit traversal time.
    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, weight: Cost) -> EdgeIndex {
        let geometry = LineString::from(vec![self.node_point(a), self.node_point(b)]);
        self.graph.add_edge(a, b, StreetEdge { weight, geometry })
    }

    /// Adds an edge weighted by great-circle length and profile speed.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn add_street(&mut self, a: NodeIndex, b: NodeIndex, profile: &Profile) -> EdgeIndex {
        let length = Haversine.distance(self.node_point(a), self.node_point(b));
        let weight = (length / profile.speed).round().max(1.0) as Cost;
        self.add_edge(a, b, weight)
    }

    pub fn node_point(&self, node: NodeIndex) -> Point<f64> {
        self.graph[node].geometry
    }

    pub fn edge_weight(&self, edge: EdgeIndex) -> Cost {
        self.graph[edge].weight
    }

    /// Rebuilds the spatial index over edge segments.
    pub fn build_index(&mut self) {
        let segments: Vec<IndexedEdge> = self
            .graph
            .edge_references()
            .map(|edge| {
                let from = self.graph[edge.source()].geometry;
                let to = self.graph[edge.target()].geometry;
                GeomWithData::new(
                    Line::new([from.x(), from.y()], [to.x(), to.y()]),
                    edge.id(),
                )
            })
            .collect();
        self.edge_index = RTree::bulk_load(segments);
    }

    /// Resolves a coordinate onto the nearest street edge.
    ///
    /// # Errors
    ///
    /// `Error::ResolutionFailure` when the graph has no indexed edges or the
    /// nearest edge is further than the snap radius.
    pub fn resolve_point(&self, point: Point<f64>) -> Result<GraphPoint, Error> {
        let nearest = self
            .edge_index
            .nearest_neighbor(&[point.x(), point.y()])
            .ok_or(Error::ResolutionFailure)?;

        let segment = nearest.geom();
        let (fraction, projected) = project_onto(segment.from, segment.to, point);
        if Haversine.distance(point, projected) > SNAP_RADIUS_M {
            return Err(Error::ResolutionFailure);
        }

        Ok(GraphPoint {
            edge: nearest.data,
            fraction,
            geometry: projected,
        })
    }
}

/// Projects a point onto a segment, returning the offset fraction along it.
///
/// The fraction is computed on raw coordinates, which is accurate enough at
/// street-segment scale.
fn project_onto(from: [f64; 2], to: [f64; 2], point: Point<f64>) -> (f64, Point<f64>) {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let len_sq = dx * dx + dy * dy;

    let fraction = if len_sq == 0.0 {
        0.0
    } else {
        (((point.x() - from[0]) * dx + (point.y() - from[1]) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let projected = Point::new(from[0] + fraction * dx, from[1] + fraction * dy);
    (fraction, projected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_edge_graph() -> (StreetGraph, NodeIndex, NodeIndex, NodeIndex) {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Point::new(0.0, 0.0));
        let b = graph.add_node(Point::new(0.01, 0.0));
        let c = graph.add_node(Point::new(0.02, 0.0));
        graph.add_edge(a, b, 600);
        graph.add_edge(b, c, 600);
        graph.build_index();
        (graph, a, b, c)
    }

    #[test]
    fn resolves_onto_the_nearest_edge_with_a_fraction() {
        let (graph, a, b, _) = two_edge_graph();

        let resolved = graph
            .resolve_point(Point::new(0.0025, 0.0001))
            .expect("point next to an edge must resolve");

        assert_eq!(graph.graph.edge_endpoints(resolved.edge), Some((a, b)));
        assert!((resolved.fraction - 0.25).abs() < 1e-6);
        assert!((resolved.geometry.x() - 0.0025).abs() < 1e-9);
    }

    #[test]
    fn far_away_points_fail_to_resolve() {
        let (graph, ..) = two_edge_graph();

        let result = graph.resolve_point(Point::new(1.0, 1.0));
        assert!(matches!(result, Err(Error::ResolutionFailure)));
    }

    #[test]
    fn empty_graph_fails_to_resolve() {
        let graph = StreetGraph::new();
        let result = graph.resolve_point(Point::new(0.0, 0.0));
        assert!(matches!(result, Err(Error::ResolutionFailure)));
    }

    #[test]
    fn street_weight_follows_profile_speed() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Point::new(0.0, 0.0));
        let b = graph.add_node(Point::new(0.01, 0.0));

        let walk = graph.add_street(a, b, &Profile::walking());
        let bike = graph.add_street(a, b, &Profile::cycling());

        assert!(graph.edge_weight(walk) > graph.edge_weight(bike));
    }
}
