//! Intermodal journey assembly
//!
//! Bridges the two search domains: runs a forward and a backward
//! stop-reachability search, hands the discovered boundary stops to the
//! connection scan and stitches the access path, the transit journey and the
//! egress path into one continuous route.

use std::ops::ControlFlow;

use geo::Point;
use hashbrown::HashSet;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::csa::{Journey, earliest_arrival_scan};
use crate::model::{GraphPoint, StopId, TransitModel};
use crate::routing::route::{Route, RouteStop};
use crate::search::CancelToken;
use crate::search::reachability::StopReachabilitySearch;
use crate::{
    Cost, DEFAULT_ACCESS_BUDGET, DEFAULT_SEARCH_HORIZON, Error, MAX_CANDIDATE_STOPS, Time,
};

/// Tuning knobs of one intermodal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntermodalOptions {
    /// Departure time, seconds since midnight of the service day
    pub departure: Time,
    /// Length of the departure window handed to the connection scan
    pub horizon: Time,
    /// Street-search budget per access/egress leg, seconds
    pub access_budget: Cost,
    /// Minimum time needed to change trips at a stop
    pub min_transfer_time: Time,
    /// Cap on candidate stops collected per side
    pub max_candidate_stops: usize,
}

impl Default for IntermodalOptions {
    fn default() -> Self {
        Self {
            departure: 0,
            horizon: DEFAULT_SEARCH_HORIZON,
            access_budget: DEFAULT_ACCESS_BUDGET,
            min_transfer_time: 120,
            max_candidate_stops: MAX_CANDIDATE_STOPS,
        }
    }
}

/// Calculates one door-to-door route.
///
/// The forward and backward stop searches are independent and run in
/// parallel; each request owns its own search state, so concurrent requests
/// share nothing but the immutable model.
///
/// # Errors
///
/// `Error::ResolutionFailure` when origin or destination cannot be placed on
/// the street network, `Error::NoSourceStop` / `Error::NoTargetStop` when a
/// side discovers no stop within the budget, `Error::NoJourneyFound` when
/// the connection scan comes up empty, `Error::Cancelled` on cancellation.
/// All of these represent absence of a route, not malformed input.
pub fn try_calculate_intermodal(
    model: &TransitModel,
    origin: Point<f64>,
    destination: Point<f64>,
    options: &IntermodalOptions,
    cancel: &CancelToken,
) -> Result<Route, Error> {
    let origin_point = model.street_graph.resolve_point(origin)?;
    let destination_point = model.street_graph.resolve_point(destination)?;

    let (forward, backward) = rayon::join(
        || collect_stops(model, origin_point.clone(), options, false, cancel),
        || collect_stops(model, destination_point.clone(), options, true, cancel),
    );
    let (source_search, sources) = forward?;
    let (target_search, targets) = backward?;

    if sources.is_empty() {
        return Err(Error::NoSourceStop);
    }
    if targets.is_empty() {
        return Err(Error::NoTargetStop);
    }
    debug!(
        "discovered {} access and {} egress stop candidates",
        sources.len(),
        targets.len()
    );

    let data = &model.transit_data;

    // Relative street costs become absolute boundary times on the access
    // side; egress costs stay relative and bias the exit choice.
    let mut access = Vec::with_capacity(sources.len());
    for &(stop, cost) in &sources {
        let idx = data.index_of(&stop).ok_or(Error::InternalInconsistency(
            "discovered stop missing from the transit snapshot",
        ))?;
        access.push((idx, options.departure.saturating_add(cost)));
    }
    let mut egress = Vec::with_capacity(targets.len());
    for &(stop, cost) in &targets {
        let idx = data.index_of(&stop).ok_or(Error::InternalInconsistency(
            "discovered stop missing from the transit snapshot",
        ))?;
        egress.push((idx, cost));
    }

    let window = (
        options.departure,
        options.departure.saturating_add(options.horizon),
    );
    let journey = earliest_arrival_scan(
        data,
        &access,
        &egress,
        window,
        options.min_transfer_time,
        cancel,
    )?
    .ok_or(Error::NoJourneyFound)?;

    assemble(model, &source_search, &target_search, &journey)
}

/// Runs one stop-reachability search, collecting up to the candidate cap.
///
/// Stops are deduplicated by id here as well; the search already reports
/// each id once per run, but the assembler guards against duplicates anyway.
fn collect_stops<'m>(
    model: &'m TransitModel,
    start: GraphPoint,
    options: &IntermodalOptions,
    backward: bool,
    cancel: &CancelToken,
) -> Result<(StopReachabilitySearch<'m>, Vec<(StopId, Cost)>), Error> {
    let mut search =
        StopReachabilitySearch::new(model, start, options.access_budget, backward);
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let cap = options.max_candidate_stops;

    search.run(cancel, |stop, cost| {
        if seen.insert(stop) {
            found.push((stop, cost));
        }
        if found.len() >= cap {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    Ok((search, found))
}

/// Stitches the three legs around the journey the scan actually chose.
fn assemble(
    model: &TransitModel,
    source_search: &StopReachabilitySearch<'_>,
    target_search: &StopReachabilitySearch<'_>,
    journey: &Journey,
) -> Result<Route, Error> {
    let data = &model.transit_data;

    // The chain runs destination-first; reverse it into chronological order
    let mut visits = Vec::with_capacity(journey.len());
    let mut node = Some(journey.head.as_ref());
    while let Some(current) = node {
        visits.push((current.stop, current.arrival));
        node = current.prev.as_deref();
    }
    visits.reverse();

    let access_id = data.stop(journey.access_stop).id;
    let egress_id = data.stop(journey.egress_stop).id;

    // The scan picks its own entry and exit stops, which need not be the
    // first-discovered ones; fetch their paths explicitly.
    let (access_path, access_anchor) =
        source_search
            .path_to(&access_id)?
            .ok_or(Error::InternalInconsistency(
                "selected access stop was never discovered",
            ))?;
    let (egress_path, egress_anchor) =
        target_search
            .path_to(&egress_id)?
            .ok_or(Error::InternalInconsistency(
                "selected egress stop was never discovered",
            ))?;

    let access_route = Route {
        shape: access_path.into_coords(),
        stops: vec![],
    };

    // Transit shape anchored on the access/egress graph points so the seams
    // line up exactly with the street legs
    let last = visits.len() - 1;
    let mut transit_shape = Vec::with_capacity(visits.len());
    let mut transit_stops = Vec::with_capacity(visits.len());
    for (i, &(stop_idx, arrival)) in visits.iter().enumerate() {
        let stop = data.stop(stop_idx);
        let coord = if i == 0 {
            access_anchor.geometry.into()
        } else if i == last {
            egress_anchor.geometry.into()
        } else {
            stop.geometry.into()
        };
        transit_shape.push(coord);
        transit_stops.push(RouteStop {
            shape_index: i,
            stop: stop.id,
            name: stop.name.clone(),
            arrival,
        });
    }
    let transit_route = Route {
        shape: transit_shape,
        stops: transit_stops,
    };

    // The backward search computed this path towards the destination point;
    // reverse it before concatenation
    let mut egress_coords = egress_path.into_coords();
    egress_coords.reverse();
    let egress_route = Route {
        shape: egress_coords,
        stops: vec![],
    };

    let route = access_route.concatenate(transit_route).concatenate(egress_route);

    info!(
        "assembled intermodal route: {} shape points, {} stops, boards {:?} alights {:?}",
        route.shape.len(),
        route.stops.len(),
        access_id,
        egress_id
    );
    Ok(route)
}
