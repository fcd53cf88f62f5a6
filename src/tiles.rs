//! Slippy-map tile math for lazy stop discovery.
//!
//! Stop loading is driven by the tiles the street search actually touches,
//! all at one fixed zoom level ([`crate::STOP_TILE_ZOOM`]). A tile only needs
//! a stable id to key the loaded-set and a bounding box to query the stop
//! index with.

use std::f64::consts::PI;

use geo::{Coord, Rect};

/// A web-mercator tile at a fixed zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub zoom: u32,
}

impl Tile {
    /// Tile containing the given WGS84 coordinate.
    pub fn containing(lon: f64, lat: f64, zoom: u32) -> Self {
        let n = f64::from(1u32 << zoom);
        let x = ((lon + 180.0) / 360.0 * n).floor();
        let lat_rad = lat.to_radians();
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self {
            x: (x.clamp(0.0, n - 1.0)) as u32,
            y: (y.clamp(0.0, n - 1.0)) as u32,
            zoom,
        }
    }

    /// Stable id, unique within one zoom level.
    pub fn id(&self) -> u64 {
        u64::from(self.y) * u64::from(1u32 << self.zoom) + u64::from(self.x)
    }

    /// Geographic bounds of the tile.
    pub fn bounds(&self) -> Rect<f64> {
        let n = f64::from(1u32 << self.zoom);
        let lon = |x: f64| x / n * 360.0 - 180.0;
        let lat = |y: f64| (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();

        let left = lon(f64::from(self.x));
        let right = lon(f64::from(self.x) + 1.0);
        let top = lat(f64::from(self.y));
        let bottom = lat(f64::from(self.y) + 1.0);

        Rect::new(
            Coord { x: left, y: bottom },
            Coord { x: right, y: top },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::STOP_TILE_ZOOM;

    #[test]
    fn bounds_contain_the_original_point() {
        let (lon, lat) = (4.351, 50.846);
        let tile = Tile::containing(lon, lat, STOP_TILE_ZOOM);
        let bounds = tile.bounds();

        assert!(bounds.min().x <= lon && lon <= bounds.max().x);
        assert!(bounds.min().y <= lat && lat <= bounds.max().y);
    }

    #[test]
    fn nearby_points_share_a_tile_and_distant_ones_do_not() {
        let a = Tile::containing(4.3510, 50.8460, STOP_TILE_ZOOM);
        let b = Tile::containing(4.3511, 50.8461, STOP_TILE_ZOOM);
        let c = Tile::containing(4.60, 50.60, STOP_TILE_ZOOM);

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn ids_are_distinct_for_neighbouring_tiles() {
        let tile = Tile::containing(0.0, 0.0, STOP_TILE_ZOOM);
        let east = Tile {
            x: tile.x + 1,
            ..tile
        };
        let south = Tile {
            y: tile.y + 1,
            ..tile
        };

        assert_ne!(tile.id(), east.id());
        assert_ne!(tile.id(), south.id());
        assert_ne!(east.id(), south.id());
    }
}
