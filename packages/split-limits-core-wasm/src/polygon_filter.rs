// Polygon extraction and the validity gate run before and after splitting.

use geo::{Area, Geometry, Validation};
use serde::Serialize;
use std::fmt;

use crate::feature::Feature;

/// First reason a polygon list failed the validity gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "camelCase")]
pub enum Invalidity {
    Empty,
    NullGeometry { index: usize },
    NotPolygonal { index: usize, kind: &'static str },
    Invalid { index: usize },
    /// Collinear or empty rings: the kernel accepts them but they enclose nothing.
    ZeroArea { index: usize },
}

impl fmt::Display for Invalidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalidity::Empty => write!(f, "no polygons"),
            Invalidity::NullGeometry { index } => write!(f, "feature {} has no geometry", index),
            Invalidity::NotPolygonal { index, kind } => {
                write!(f, "feature {} is a {}, not a polygon", index, kind)
            }
            Invalidity::Invalid { index } => write!(f, "polygon {} is not a valid geometry", index),
            Invalidity::ZeroArea { index } => write!(f, "polygon {} has no area", index),
        }
    }
}

/// Keep, in input order, the features whose geometry is a simple polygon.
/// Everything else (null geometry included) is dropped without complaint.
pub fn filter_polygons(features: &[Feature]) -> Vec<Feature> {
    features
        .iter()
        .filter(|feature| matches!(feature.geometry, Some(Geometry::Polygon(_))))
        .cloned()
        .collect()
}

/// Check a polygon list and report why it is unusable, if it is.
///
/// Multi-part geometries are accepted because a split fragment can be one;
/// input lists never contain them after `filter_polygons`.
pub fn check_polygons(polygons: &[Feature]) -> Result<(), Invalidity> {
    if polygons.is_empty() {
        return Err(Invalidity::Empty);
    }

    for (index, feature) in polygons.iter().enumerate() {
        let (valid, area) = match &feature.geometry {
            None => return Err(Invalidity::NullGeometry { index }),
            Some(Geometry::Polygon(polygon)) => (polygon.is_valid(), polygon.unsigned_area()),
            Some(Geometry::MultiPolygon(multi)) => (multi.is_valid(), multi.unsigned_area()),
            Some(_) => {
                return Err(Invalidity::NotPolygonal {
                    index,
                    kind: feature.geometry_kind(),
                })
            }
        };
        if !valid {
            return Err(Invalidity::Invalid { index });
        }
        if area <= 0.0 {
            return Err(Invalidity::ZeroArea { index });
        }
    }

    Ok(())
}

/// Boolean gate: non-empty, no null geometry, every polygon valid with non-zero area.
pub fn is_valid_non_empty(polygons: &[Feature]) -> bool {
    check_polygons(polygons).is_ok()
}
