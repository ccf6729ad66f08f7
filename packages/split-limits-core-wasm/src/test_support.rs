// Fixtures shared by the unit tests.

use geo::{polygon, Area, BooleanOps, Geometry, MultiPolygon, Polygon};
use serde_json::Value;

use crate::feature::{AttributeBag, Feature, ELEVATION_KEY};

const AREA_EPS: f64 = 1e-9;

pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    polygon![
        (x: min_x, y: min_y),
        (x: max_x, y: min_y),
        (x: max_x, y: max_y),
        (x: min_x, y: max_y),
    ]
}

pub fn limit(polygon: Polygon<f64>) -> Feature {
    Feature::without_attributes(Geometry::Polygon(polygon))
}

pub fn plateau(polygon: Polygon<f64>, elevation: f64) -> Feature {
    let mut attributes = AttributeBag::new();
    attributes.insert(ELEVATION_KEY.to_string(), Value::from(elevation));
    Feature::new(Geometry::Polygon(polygon), attributes)
}

pub fn plateau_without_elevation(polygon: Polygon<f64>) -> Feature {
    Feature::without_attributes(Geometry::Polygon(polygon))
}

pub fn as_multi(geometry: &Geometry<f64>) -> MultiPolygon<f64> {
    match geometry {
        Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon.clone()]),
        Geometry::MultiPolygon(multi) => multi.clone(),
        other => panic!("not an areal geometry: {:?}", other),
    }
}

/// Area of `a` lying outside `b`.
pub fn area_outside(a: &Geometry<f64>, b: &Geometry<f64>) -> f64 {
    as_multi(a).difference(&as_multi(b)).unsigned_area()
}

pub fn overlap_area(a: &Geometry<f64>, b: &Geometry<f64>) -> f64 {
    as_multi(a).intersection(&as_multi(b)).unsigned_area()
}

/// Geometric equality up to floating point noise.
pub fn same_region(a: &Geometry<f64>, b: &Geometry<f64>) -> bool {
    area_outside(a, b) < AREA_EPS && area_outside(b, a) < AREA_EPS
}
