//! `GeoJSON` rendering of an assembled route

use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::Value;

use super::route::Route;
use crate::Error;

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

impl Route {
    /// Renders the route as a `FeatureCollection`: one `LineString` for the
    /// shape plus a `Point` feature per visited stop.
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut features = Vec::with_capacity(self.stops.len() + 1);

        let shape: LineString = self.shape.clone().into();
        let mut properties = JsonObject::new();
        properties.insert("kind".to_string(), Value::from("shape"));
        properties.insert("stop_count".to_string(), Value::from(self.stops.len()));
        features.push(feature(Geometry::new((&shape).into()), properties));

        for stop in &self.stops {
            let location = Point::from(self.shape[stop.shape_index]);
            let mut properties = JsonObject::new();
            properties.insert("kind".to_string(), Value::from("stop"));
            properties.insert("name".to_string(), Value::from(stop.name.clone()));
            properties.insert("tile".to_string(), Value::from(stop.stop.tile));
            properties.insert("local".to_string(), Value::from(stop.stop.local));
            properties.insert("shape_index".to_string(), Value::from(stop.shape_index));
            properties.insert("arrival".to_string(), Value::from(stop.arrival));
            features.push(feature(Geometry::new((&location).into()), properties));
        }

        FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        }
    }

    /// Serialized `FeatureCollection`.
    ///
    /// # Errors
    ///
    /// `Error::Serialization` when the collection cannot be rendered.
    pub fn to_geojson_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_geojson())?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::route::RouteStop;
    use super::*;
    use crate::model::StopId;
    use geo::Coord;

    #[test]
    fn renders_shape_and_stop_features() {
        let route = Route {
            shape: vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 2.0, y: 0.0 },
            ],
            stops: vec![RouteStop {
                shape_index: 1,
                stop: StopId { tile: 1, local: 2 },
                name: "midpoint".to_string(),
                arrival: 1200,
            }],
        };

        let collection = route.to_geojson();
        assert_eq!(collection.features.len(), 2);
        assert!(collection.features.iter().all(|f| f.geometry.is_some()));

        let rendered = route.to_geojson_string().unwrap();
        assert!(rendered.contains("\"midpoint\""));
        assert!(rendered.contains("\"arrival\":1200"));
    }
}
