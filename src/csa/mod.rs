//! Earliest-arrival connection scan
//!
//! One linear pass over the connection table, sorted by departure time,
//! relaxing earliest arrivals per stop. Boundary conditions come from the
//! stop-reachability searches: access stops carry absolute earliest boarding
//! times, egress stops carry the remaining cost to the destination. The
//! result is a reverse-linked chain of stop visits, discovered backward from
//! the destination; callers reverse it into chronological order.

use fixedbitset::FixedBitSet;
use log::debug;

use crate::model::{StopIndex, TransitData, TripId};
use crate::search::CancelToken;
use crate::{Error, Time};

/// How many connections to scan between cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// One visit of the journey chain.
///
/// `prev` points towards the access stop; the head of the chain is the
/// egress stop. `trip` is the trip whose connection produced this visit,
/// `None` only on the chain's terminal node (the boarding stop itself).
#[derive(Debug, Clone)]
pub struct JourneyNode {
    pub stop: StopIndex,
    pub arrival: Time,
    pub trip: Option<TripId>,
    pub prev: Option<Box<JourneyNode>>,
}

/// An earliest-arrival journey through the transit network.
#[derive(Debug, Clone)]
pub struct Journey {
    /// Final stop visit; follow `prev` links back to the boarding stop
    pub head: Box<JourneyNode>,
    pub access_stop: StopIndex,
    pub egress_stop: StopIndex,
    /// Departure of the first connection boarded
    pub departure: Time,
    /// Arrival at the egress stop, before the egress leg
    pub arrival: Time,
}

impl Journey {
    /// Number of stop visits in the chain, boarding stop included.
    pub fn len(&self) -> usize {
        let mut len = 1;
        let mut node = self.head.as_ref();
        while let Some(prev) = node.prev.as_deref() {
            len += 1;
            node = prev;
        }
        len
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Scans for the earliest-arrival journey between two stop sets.
///
/// `access` pairs a stop with the absolute earliest time boarding can start
/// there; `egress` pairs a stop with the remaining cost from it to the
/// destination, which biases the choice of egress stop. Only connections
/// departing inside `window` are considered. A journey must board at least
/// one connection; `Ok(None)` means no feasible journey exists.
///
/// Street boarding times and transit arrivals are tracked separately:
/// boarding straight off the street never needs transfer slack, even when
/// some connection reaches the same stop earlier, while changing trips
/// always does.
///
/// # Errors
///
/// `Error::Cancelled` when the token fires mid-scan.
pub fn earliest_arrival_scan(
    data: &TransitData,
    access: &[(StopIndex, Time)],
    egress: &[(StopIndex, Time)],
    window: (Time, Time),
    min_transfer_time: Time,
    cancel: &CancelToken,
) -> Result<Option<Journey>, Error> {
    let stop_count = data.stops().len();
    let (window_start, window_end) = window;

    // Earliest slack-free boarding time per stop, from the street side only
    let mut street = vec![Time::MAX; stop_count];
    for &(stop, at) in access {
        if stop < stop_count && at < street[stop] {
            street[stop] = at;
        }
    }

    // Earliest arrival per stop by connection, the connection that achieved
    // it, and the connection each trip was entered through
    let mut tau = vec![Time::MAX; stop_count];
    let mut in_connection: Vec<Option<usize>> = vec![None; stop_count];
    let mut trip_enter: Vec<Option<usize>> = vec![None; data.trip_count()];
    let mut trip_reachable = FixedBitSet::with_capacity(data.trip_count());

    let connections = data.connections();
    let first = connections.partition_point(|c| c.departure < window_start);

    for (offset, connection) in connections[first..].iter().enumerate() {
        if connection.departure > window_end {
            break;
        }
        if offset % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let on_board = trip_reachable.contains(connection.trip);
        let from_street = street[connection.from_stop] <= connection.departure;
        let from_transit = tau[connection.from_stop] != Time::MAX
            && tau[connection.from_stop].saturating_add(min_transfer_time)
                <= connection.departure;
        if !(on_board || from_street || from_transit) {
            continue;
        }

        if !on_board {
            trip_reachable.insert(connection.trip);
            trip_enter[connection.trip] = Some(first + offset);
        }
        if connection.arrival < tau[connection.to_stop] {
            tau[connection.to_stop] = connection.arrival;
            in_connection[connection.to_stop] = Some(first + offset);
        }
    }

    // Best egress stop by arrival plus remaining cost; ties broken by stop
    // index for determinism. Stops never improved by a connection are not
    // journeys, they are just the access set echoed back.
    let best_egress = egress
        .iter()
        .filter(|&&(stop, _)| stop < stop_count && in_connection[stop].is_some())
        .map(|&(stop, cost)| (tau[stop].saturating_add(cost), stop))
        .min();

    let Some((_, egress_stop)) = best_egress else {
        debug!("connection scan found no feasible journey");
        return Ok(None);
    };

    Ok(Some(reconstruct(
        data,
        &street,
        &tau,
        &in_connection,
        &trip_enter,
        egress_stop,
    )?))
}

/// Builds the reverse-linked chain from the winning egress stop.
///
/// Walks back one ridden trip leg at a time: from the connection that
/// produced a stop's arrival down to the connection the trip was entered
/// through. A leg whose entry stop allows slack-free street boarding ends
/// the chain there; otherwise the walk continues through the connection
/// that reached the entry stop.
fn reconstruct(
    data: &TransitData,
    street: &[Time],
    tau: &[Time],
    in_connection: &[Option<usize>],
    trip_enter: &[Option<usize>],
    egress_stop: StopIndex,
) -> Result<Journey, Error> {
    let connections = data.connections();

    let mut visits: Vec<(StopIndex, Time, Option<TripId>)> = Vec::new();
    let mut leg = in_connection[egress_stop];
    let (access_stop, departure) = loop {
        let idx = leg.ok_or(Error::InternalInconsistency(
            "journey stop without an incoming connection",
        ))?;
        let alight = connections[idx];
        let enter_idx = trip_enter[alight.trip].ok_or(Error::InternalInconsistency(
            "ridden trip was never entered",
        ))?;
        if enter_idx > idx {
            return Err(Error::InternalInconsistency(
                "trip entered after its alighting connection",
            ));
        }

        // Egress-first: every stop this leg rode through, latest first
        for i in (enter_idx..=idx).rev() {
            let connection = connections[i];
            if connection.trip != alight.trip {
                continue;
            }
            visits.push((connection.to_stop, connection.arrival, Some(connection.trip)));
        }
        if visits.len() > connections.len() + 1 {
            return Err(Error::InternalInconsistency(
                "journey chain longer than the connection table",
            ));
        }

        let enter = connections[enter_idx];
        if street[enter.from_stop] <= enter.departure {
            visits.push((enter.from_stop, street[enter.from_stop], None));
            break (enter.from_stop, enter.departure);
        }
        leg = in_connection[enter.from_stop];
    };

    let arrival = tau[egress_stop];

    // visits run egress -> access; fold them up from the access side so the
    // head ends up at the egress stop with prev links running backward
    let mut head: Option<Box<JourneyNode>> = None;
    for &(stop, at, trip) in visits.iter().rev() {
        head = Some(Box::new(JourneyNode {
            stop,
            arrival: at,
            trip,
            prev: head,
        }));
    }

    Ok(Journey {
        head: head.ok_or(Error::InternalInconsistency("empty journey chain"))?,
        access_stop,
        egress_stop,
        departure,
        arrival,
    })
}
