use geo::Geometry;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Attribute key carrying a height plateau's elevation.
pub const ELEVATION_KEY: &str = "elevation";

/// Insertion-ordered attribute bag (serde_json is built with `preserve_order`).
pub type AttributeBag = Map<String, Value>;

/// A geometry plus its named attributes, the unit exchanged between every stage.
///
/// `geometry` is `None` for GeoJSON features whose geometry is `null`; such
/// features never survive the polygon filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub attributes: AttributeBag,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>, attributes: AttributeBag) -> Self {
        Feature {
            geometry: Some(geometry),
            attributes,
        }
    }

    pub fn without_attributes(geometry: Geometry<f64>) -> Self {
        Feature::new(geometry, AttributeBag::new())
    }

    /// Name of the geometry kind, `"Null"` when the geometry is missing.
    pub fn geometry_kind(&self) -> &'static str {
        match &self.geometry {
            None => "Null",
            Some(Geometry::Point(_)) => "Point",
            Some(Geometry::Line(_)) => "Line",
            Some(Geometry::LineString(_)) => "LineString",
            Some(Geometry::Polygon(_)) => "Polygon",
            Some(Geometry::MultiPoint(_)) => "MultiPoint",
            Some(Geometry::MultiLineString(_)) => "MultiLineString",
            Some(Geometry::MultiPolygon(_)) => "MultiPolygon",
            Some(Geometry::GeometryCollection(_)) => "GeometryCollection",
            Some(Geometry::Rect(_)) => "Rect",
            Some(Geometry::Triangle(_)) => "Triangle",
        }
    }

    /// Optional lookup: `Ok(None)` when `key` is absent or `null`.
    pub fn attribute<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| Error::AttributeType {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    /// Value under `key` as `T`, or `T::default()` when the key is absent.
    ///
    /// Example: `plateau.attribute_or_default::<f64>("elevation")` is `0.0`
    /// for a plateau without an elevation.
    pub fn attribute_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.attribute(key)?.unwrap_or_default())
    }

    pub fn elevation(&self) -> Result<Option<f64>> {
        self.attribute(ELEVATION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Point};
    use serde_json::json;

    fn plateau(attributes: Value) -> Feature {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => AttributeBag::new(),
        };
        Feature::new(Geometry::Polygon(square), attributes)
    }

    #[test]
    fn reads_present_elevation() {
        let feature = plateau(json!({ "elevation": 12.5, "name": "north" }));
        let elevation: f64 = feature.attribute_or_default(ELEVATION_KEY).expect("numeric elevation");
        assert_eq!(elevation, 12.5);
        assert_eq!(feature.elevation().expect("numeric elevation"), Some(12.5));
    }

    #[test]
    fn integer_elevation_reads_as_float() {
        let feature = plateau(json!({ "elevation": 5 }));
        assert_eq!(feature.elevation().expect("numeric elevation"), Some(5.0));
    }

    #[test]
    fn absent_or_null_attribute_defaults() {
        let feature = plateau(json!({ "name": "south", "elevation": null }));
        let elevation: f64 = feature.attribute_or_default(ELEVATION_KEY).expect("absent is not an error");
        assert_eq!(elevation, 0.0);

        let missing: Option<String> = feature.attribute("owner").expect("absent is not an error");
        assert!(missing.is_none());
    }

    #[test]
    fn wrong_type_is_an_error() {
        let feature = plateau(json!({ "elevation": "tall" }));
        let err = feature.attribute_or_default::<f64>(ELEVATION_KEY).unwrap_err();
        assert!(matches!(err, Error::AttributeType { ref key, .. } if key == ELEVATION_KEY));
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let feature = plateau(json!({ "zeta": 1, "alpha": 2, "mid": 3 }));
        let keys: Vec<&str> = feature.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn geometry_kind_names() {
        assert_eq!(plateau(json!({})).geometry_kind(), "Polygon");
        let point = Feature::without_attributes(Geometry::Point(Point::new(1.0, 2.0)));
        assert_eq!(point.geometry_kind(), "Point");
        let null = Feature { geometry: None, attributes: AttributeBag::new() };
        assert_eq!(null.geometry_kind(), "Null");
    }
}
