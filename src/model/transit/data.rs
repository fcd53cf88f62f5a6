//! Transit data snapshot and the spatial stop index over it

use geo::Rect;
use hashbrown::HashMap;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use super::types::{Connection, Stop, StopId, StopIndex};
use crate::Error;

type IndexedStop = GeomWithData<[f64; 2], StopIndex>;

/// Immutable transit network snapshot.
///
/// Connections are kept sorted by departure time, which is what the
/// connection scan relies on. Stops are addressed either by their stable
/// [`StopId`] or by their dense index within this snapshot.
#[derive(Debug, Clone)]
pub struct TransitData {
    stops: Vec<Stop>,
    stop_lookup: HashMap<StopId, StopIndex>,
    connections: Vec<Connection>,
    trip_count: usize,
    stop_tree: RTree<IndexedStop>,
}

impl TransitData {
    /// Builds a snapshot from stops and connections.
    ///
    /// # Errors
    ///
    /// `Error::InvalidData` on duplicate stop ids, connections referencing
    /// unknown stops, or connections that arrive before they depart.
    pub fn new(stops: Vec<Stop>, mut connections: Vec<Connection>) -> Result<Self, Error> {
        let mut stop_lookup = HashMap::with_capacity(stops.len());
        for (idx, stop) in stops.iter().enumerate() {
            if stop_lookup.insert(stop.id, idx).is_some() {
                return Err(Error::InvalidData(format!(
                    "duplicate stop id {:?}",
                    stop.id
                )));
            }
        }

        let mut trip_count = 0;
        for connection in &connections {
            if connection.from_stop >= stops.len() || connection.to_stop >= stops.len() {
                return Err(Error::InvalidData(format!(
                    "connection references unknown stop: {connection:?}"
                )));
            }
            if connection.arrival < connection.departure {
                return Err(Error::InvalidData(format!(
                    "connection arrives before it departs: {connection:?}"
                )));
            }
            trip_count = trip_count.max(connection.trip + 1);
        }
        connections.sort_by_key(|c| (c.departure, c.arrival, c.trip));

        let stop_tree = RTree::bulk_load(
            stops
                .iter()
                .enumerate()
                .map(|(idx, stop)| GeomWithData::new([stop.geometry.x(), stop.geometry.y()], idx))
                .collect(),
        );

        Ok(Self {
            stops,
            stop_lookup,
            connections,
            trip_count,
            stop_tree,
        })
    }

    /// Stops located inside the given bounding box.
    pub fn stops_in_box(&self, bounds: &Rect<f64>) -> impl Iterator<Item = &Stop> {
        let envelope = AABB::from_corners(
            [bounds.min().x, bounds.min().y],
            [bounds.max().x, bounds.max().y],
        );
        self.stop_tree
            .locate_in_envelope(&envelope)
            .map(|indexed| &self.stops[indexed.data])
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop(&self, idx: StopIndex) -> &Stop {
        &self.stops[idx]
    }

    pub fn index_of(&self, id: &StopId) -> Option<StopIndex> {
        self.stop_lookup.get(id).copied()
    }

    /// Connections sorted by departure time.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn trip_count(&self) -> usize {
        self.trip_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, Point};

    fn stop(tile: u32, local: u32, lon: f64, lat: f64) -> Stop {
        Stop {
            id: StopId { tile, local },
            name: format!("stop-{tile}-{local}"),
            geometry: Point::new(lon, lat),
        }
    }

    #[test]
    fn connections_come_out_sorted_by_departure() {
        let stops = vec![stop(1, 0, 0.0, 0.0), stop(1, 1, 0.01, 0.0)];
        let connections = vec![
            Connection {
                trip: 1,
                from_stop: 0,
                to_stop: 1,
                departure: 900,
                arrival: 1000,
            },
            Connection {
                trip: 0,
                from_stop: 0,
                to_stop: 1,
                departure: 300,
                arrival: 400,
            },
        ];

        let data = TransitData::new(stops, connections).unwrap();
        let departures: Vec<_> = data.connections().iter().map(|c| c.departure).collect();
        assert_eq!(departures, vec![300, 900]);
        assert_eq!(data.trip_count(), 2);
    }

    #[test]
    fn rejects_bad_connections_and_duplicate_ids() {
        let stops = vec![stop(1, 0, 0.0, 0.0)];
        let out_of_range = vec![Connection {
            trip: 0,
            from_stop: 0,
            to_stop: 7,
            departure: 0,
            arrival: 60,
        }];
        assert!(TransitData::new(stops.clone(), out_of_range).is_err());

        let time_travel = vec![Connection {
            trip: 0,
            from_stop: 0,
            to_stop: 0,
            departure: 120,
            arrival: 60,
        }];
        assert!(TransitData::new(stops.clone(), time_travel).is_err());

        let duplicated = vec![stop(1, 0, 0.0, 0.0), stop(1, 0, 0.01, 0.0)];
        assert!(TransitData::new(duplicated, vec![]).is_err());
    }

    #[test]
    fn box_query_returns_only_contained_stops() {
        let stops = vec![
            stop(1, 0, 0.001, 0.001),
            stop(1, 1, 0.002, 0.002),
            stop(2, 0, 1.0, 1.0),
        ];
        let data = TransitData::new(stops, vec![]).unwrap();

        let bounds = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.01, y: 0.01 });
        let mut found: Vec<_> = data.stops_in_box(&bounds).map(|s| s.id).collect();
        found.sort();

        assert_eq!(
            found,
            vec![StopId { tile: 1, local: 0 }, StopId { tile: 1, local: 1 }]
        );
    }
}
