//! Stop discovery around a resolved point
//!
//! Wraps the bounded expansion with lazy, demand-driven stop loading: every
//! settled vertex resolves its geographic tile and the first touch of a tile
//! pulls that tile's stops out of the spatial index, snaps them onto the
//! street graph and registers them on their edges. Settling an edge that
//! carries stop links reports those stops to the caller, first report wins.
//! Tile lookups are therefore bounded by the tiles the expansion actually
//! touches, not by the region.

use std::ops::ControlFlow;

use geo::{Coord, Point};
use hashbrown::{HashMap, HashSet};
use log::{debug, trace};
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::CancelToken;
use super::bounded::{SearchSpace, bounded_search};
use crate::model::{GraphPoint, StopId, TransitModel};
use crate::tiles::Tile;
use crate::{Cost, Error, STOP_TILE_ZOOM};

/// A stop resolved onto a street edge during lazy loading.
///
/// Several stops may share one edge; links are kept in discovery order.
#[derive(Debug, Clone)]
struct StopLink {
    stop: StopId,
    point: GraphPoint,
}

/// Best report recorded for a discovered stop.
#[derive(Debug, Clone, Copy)]
pub struct ReachedStop {
    pub cost: Cost,
    /// Settled vertex the report was produced through
    pub vertex: NodeIndex,
}

/// Walking (or cycling) path between the search point and a stop.
///
/// Coordinates always run from the search point towards the stop, also for
/// backward searches; egress legs are reversed by the assembler.
#[derive(Debug, Clone)]
pub struct AccessPath {
    coords: Vec<Coord<f64>>,
    cost: Cost,
}

impl AccessPath {
    fn new(coords: Vec<Coord<f64>>, cost: Cost) -> Self {
        Self { coords, cost }
    }

    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<Coord<f64>> {
        self.coords
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }
}

/// Discovers every transit stop reachable from a resolved point within a
/// cost budget, recording the best path to each.
///
/// One instance owns one search run: its tile set, stop links and results
/// are exclusive to it, so independent searches can run on separate threads
/// against the same shared model.
pub struct StopReachabilitySearch<'a> {
    model: &'a TransitModel,
    origin: GraphPoint,
    max: Cost,
    backward: bool,
    loaded_tiles: HashSet<u64>,
    stop_links: HashMap<EdgeIndex, Vec<StopLink>>,
    resolved: HashMap<StopId, GraphPoint>,
    reached: HashMap<StopId, ReachedStop>,
    space: Option<SearchSpace>,
}

impl<'a> StopReachabilitySearch<'a> {
    pub fn new(model: &'a TransitModel, origin: GraphPoint, max: Cost, backward: bool) -> Self {
        Self {
            model,
            origin,
            max,
            backward,
            loaded_tiles: HashSet::new(),
            stop_links: HashMap::new(),
            resolved: HashMap::new(),
            reached: HashMap::new(),
            space: None,
        }
    }

    /// Runs the search, reporting each discovered stop once through
    /// `on_stop`. The callback may return `ControlFlow::Break` to cap the
    /// result set; paths to stops reported so far stay available.
    ///
    /// # Errors
    ///
    /// `Error::Cancelled` when the token fires mid-run.
    pub fn run<F>(&mut self, cancel: &CancelToken, mut on_stop: F) -> Result<(), Error>
    where
        F: FnMut(StopId, Cost) -> ControlFlow<()>,
    {
        let model = self.model;
        let origin = self.origin.clone();
        let max = self.max;

        load_stops_around(
            model,
            &mut self.loaded_tiles,
            &mut self.stop_links,
            &mut self.resolved,
            origin.geometry,
        );

        // Stops sharing the origin's edge are never produced by an edge
        // settlement; report them up front, cheapest first.
        if let Some(links) = self.stop_links.get(&origin.edge) {
            let mut direct: Vec<(StopId, Cost, NodeIndex)> = links
                .iter()
                .filter_map(|link| {
                    let cost = origin.cost_along_edge(&link.point, &model.street_graph)?;
                    let nearest = link
                        .point
                        .access_vertices(&model.street_graph)
                        .ok()?
                        .into_iter()
                        .min_by_key(|&(_, entry)| entry)?;
                    (cost <= max).then_some((link.stop, cost, nearest.0))
                })
                .collect();
            direct.sort_by_key(|&(stop, cost, _)| (cost, stop));

            for (stop, cost, vertex) in direct {
                self.reached.insert(stop, ReachedStop { cost, vertex });
                if on_stop(stop, cost).is_break() {
                    self.space = Some(SearchSpace::default());
                    return Ok(());
                }
            }
        }

        let sources = origin.access_vertices(&model.street_graph)?;

        let loaded_tiles = &mut self.loaded_tiles;
        let stop_links = &mut self.stop_links;
        let resolved = &mut self.resolved;
        let reached = &mut self.reached;

        let space = bounded_search(
            &model.street_graph,
            &sources,
            max,
            self.backward,
            cancel,
            |space, id| {
                let record = *space.record(id);

                let at = model.street_graph.node_point(record.vertex);
                load_stops_around(model, loaded_tiles, stop_links, resolved, at);

                // A settled vertex without an originating edge is a source
                let Some(edge) = record.edge else {
                    return ControlFlow::Continue(());
                };
                let Some(links) = stop_links.get(&edge) else {
                    return ControlFlow::Continue(());
                };

                // The settled edge is fully costed: the vertex just settled
                // on one side, its predecessor on the other. Each linked
                // stop enters through the cheaper of the two.
                let mut found: Vec<(StopId, Cost, NodeIndex)> = Vec::new();
                for link in links {
                    if reached.contains_key(&link.stop) {
                        continue;
                    }
                    let Ok(access) = link.point.access_vertices(&model.street_graph) else {
                        continue;
                    };
                    let best = access
                        .into_iter()
                        .filter_map(|(endpoint, entry)| {
                            space
                                .visit(endpoint)
                                .map(|visit| (visit.cost.saturating_add(entry), endpoint))
                        })
                        .min();
                    if let Some((cost, endpoint)) = best {
                        found.push((link.stop, cost, endpoint));
                    }
                }

                // One settlement can surface several stops; keep the report
                // stream cost-ordered within it.
                found.sort_by_key(|&(stop, cost, _)| (cost, stop));
                for (stop, cost, vertex) in found {
                    reached.insert(stop, ReachedStop { cost, vertex });
                    if on_stop(stop, cost).is_break() {
                        return ControlFlow::Break(());
                    }
                }
                ControlFlow::Continue(())
            },
        )?;

        debug!(
            "stop search settled {} vertices over {} tiles, reached {} stops",
            space.len(),
            self.loaded_tiles.len(),
            self.reached.len()
        );
        self.space = Some(space);
        Ok(())
    }

    /// Stops discovered by this run with their reported costs.
    pub fn reached(&self) -> &HashMap<StopId, ReachedStop> {
        &self.reached
    }

    pub fn origin(&self) -> &GraphPoint {
        &self.origin
    }

    pub fn backward(&self) -> bool {
        self.backward
    }

    /// Best path from the search point to a discovered stop.
    ///
    /// Returns `Ok(None)` for stops this run never reported. Both endpoints
    /// of the stop's edge are considered and the cheaper settled side wins,
    /// so the returned path can beat the first-reported cost.
    ///
    /// # Errors
    ///
    /// `Error::InternalInconsistency` when a reported stop's path cannot be
    /// rebuilt; that is a bookkeeping bug, not an expected outcome.
    pub fn path_to(&self, stop: &StopId) -> Result<Option<(AccessPath, GraphPoint)>, Error> {
        if !self.reached.contains_key(stop) {
            return Ok(None);
        }
        let point = self
            .resolved
            .get(stop)
            .ok_or(Error::InternalInconsistency(
                "reached stop was never resolved",
            ))?;
        let graph = &self.model.street_graph;

        // On the origin's own edge the path never leaves the edge.
        if point.edge == self.origin.edge {
            let cost =
                self.origin
                    .cost_along_edge(point, graph)
                    .ok_or(Error::InternalInconsistency(
                        "same-edge stop without a same-edge cost",
                    ))?;
            let coords = vec![self.origin.geometry.into(), point.geometry.into()];
            return Ok(Some((AccessPath::new(coords, cost), point.clone())));
        }

        let space = self.space.as_ref().ok_or(Error::InternalInconsistency(
            "path requested before the search ran",
        ))?;

        let mut best: Option<(Cost, NodeIndex)> = None;
        for (endpoint, entry) in point.access_vertices(graph)? {
            if let Some(visit) = space.visit(endpoint) {
                let total = visit.cost.saturating_add(entry);
                if best.is_none_or(|(known, _)| total < known) {
                    best = Some((total, endpoint));
                }
            }
        }
        let Some((cost, endpoint)) = best else {
            return Err(Error::InternalInconsistency(
                "no settled access vertex for a reached stop",
            ));
        };

        let vertices = space.unwind(endpoint).ok_or(Error::InternalInconsistency(
            "settled vertex lost its path",
        ))?;
        let mut coords = Vec::with_capacity(vertices.len() + 2);
        coords.push(self.origin.geometry.into());
        coords.extend(vertices.into_iter().map(|v| Coord::from(graph.node_point(v))));
        coords.push(point.geometry.into());
        // The origin or the stop may project exactly onto a path vertex
        coords.dedup();

        Ok(Some((AccessPath::new(coords, cost), point.clone())))
    }
}

/// Loads and links the stops of the tile containing `around`, once.
fn load_stops_around(
    model: &TransitModel,
    loaded_tiles: &mut HashSet<u64>,
    stop_links: &mut HashMap<EdgeIndex, Vec<StopLink>>,
    resolved: &mut HashMap<StopId, GraphPoint>,
    around: Point<f64>,
) {
    let tile = Tile::containing(around.x(), around.y(), STOP_TILE_ZOOM);
    if !loaded_tiles.insert(tile.id()) {
        return;
    }

    for stop in model.transit_data.stops_in_box(&tile.bounds()) {
        if resolved.contains_key(&stop.id) {
            continue;
        }
        let point = match model.street_graph.resolve_point(stop.geometry) {
            Ok(point) => point,
            Err(_) => {
                trace!("stop {:?} has no nearby street edge, skipping", stop.id);
                continue;
            }
        };
        resolved.insert(stop.id, point.clone());
        stop_links.entry(point.edge).or_default().push(StopLink {
            stop: stop.id,
            point,
        });
    }
}
