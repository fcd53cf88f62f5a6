//! The assembled door-to-door route

use geo::Coord;
use serde::Serialize;

use crate::Time;
use crate::model::StopId;

/// A named waypoint of a route, tagged with its position in the shape.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStop {
    pub shape_index: usize,
    pub stop: StopId,
    pub name: String,
    /// Arrival at the stop, seconds since midnight of the service day
    pub arrival: Time,
}

/// One continuous route: an ordered coordinate shape plus the stops visited
/// along it, in chronological order.
#[derive(Debug, Clone, Default)]
pub struct Route {
    pub shape: Vec<Coord<f64>>,
    pub stops: Vec<RouteStop>,
}

impl Route {
    /// Appends another route onto the end of this one.
    ///
    /// When the seam coordinates coincide the duplicate point is dropped. A
    /// stop sitting exactly on the seam keeps the later leg's metadata.
    pub fn concatenate(mut self, other: Route) -> Route {
        if self.shape.is_empty() {
            return other;
        }

        let dedup = other.shape.first() == self.shape.last();
        let skip = usize::from(dedup);
        let offset = self.shape.len() - skip;

        self.shape.extend(other.shape.into_iter().skip(skip));

        for mut stop in other.stops {
            stop.shape_index += offset;
            if let Some(last) = self.stops.last()
                && last.shape_index == stop.shape_index
            {
                self.stops.pop();
            }
            self.stops.push(stop);
        }
        self
    }

    /// A route is contiguous when no consecutive shape points repeat and all
    /// stop indices point into the shape.
    pub fn is_contiguous(&self) -> bool {
        self.shape.windows(2).all(|pair| pair[0] != pair[1])
            && self.stops.iter().all(|s| s.shape_index < self.shape.len())
    }
}
