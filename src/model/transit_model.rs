//! Combined street + transit model handed to the routing layer

use geo::{ConvexHull, Intersects, MultiPoint};
use log::info;

use super::streets::network::StreetGraph;
use super::transit::data::TransitData;

/// The two read-only data stores a routing request works against.
///
/// Both sides are immutable once assembled, so a model can be shared freely
/// between concurrent requests.
#[derive(Debug, Clone)]
pub struct TransitModel {
    pub street_graph: StreetGraph,
    pub transit_data: TransitData,
}

impl TransitModel {
    pub fn new(mut street_graph: StreetGraph, transit_data: TransitData) -> Self {
        street_graph.build_index();
        validate_graph_transit_overlap(&street_graph, &transit_data);

        info!(
            "Transit model assembled: {} street nodes, {} stops, {} connections",
            street_graph.graph.node_count(),
            transit_data.stops().len(),
            transit_data.connections().len()
        );

        Self {
            street_graph,
            transit_data,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn validate_graph_transit_overlap(streets: &StreetGraph, transit: &TransitData) {
    let graph_nodes: MultiPoint = streets
        .graph
        .node_weights()
        .map(|node| node.geometry)
        .collect();
    let graph_hull = graph_nodes.convex_hull();

    let stops_outside_hull = transit
        .stops()
        .iter()
        .filter(|stop| !stop.geometry.intersects(&graph_hull))
        .count();

    let total_stops = transit.stops().len();
    if stops_outside_hull > 0 && total_stops > 0 {
        let percentage = (stops_outside_hull as f64 / total_stops as f64) * 100.0;
        log::warn!(
            "{stops_outside_hull} of {total_stops} transit stops ({percentage:.1}%) are outside \
        the street network coverage area. These stops may be unreachable as access or egress \
        stops."
        );
    }
}
