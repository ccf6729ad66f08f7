// GeoJSON reading and writing for feature collections.
//
// Only the parts of RFC 7946 the splitter needs: 2D positions (extra
// ordinates are dropped), all seven geometry types, null geometries and
// free-form properties. Foreign members such as "id", "bbox" or "crs" are
// ignored on input and not written on output.

use geo::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::feature::{AttributeBag, Feature};

type Position = Vec<f64>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection { features: Vec<RawFeature> },
    Feature(RawFeature),
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<AttributeBag>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<RawGeometry> },
}

#[derive(Serialize)]
struct OutputCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<OutputFeature<'a>>,
}

#[derive(Serialize)]
struct OutputFeature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Option<RawGeometry>,
    properties: &'a AttributeBag,
}

/// Decode a FeatureCollection (or a single Feature) into features.
///
/// `what` names the input in error messages, e.g. "building limits".
pub fn decode_feature_collection(geojson: &str, what: &str) -> Result<Vec<Feature>> {
    if geojson.trim().is_empty() {
        return Err(Error::EmptyInput(what.to_string()));
    }

    let document: Document =
        serde_json::from_str(geojson).map_err(|e| Error::Decode(format!("{}: {}", what, e)))?;

    let raw_features = match document {
        Document::FeatureCollection { features } => features,
        Document::Feature(feature) => vec![feature],
    };

    raw_features
        .into_iter()
        .enumerate()
        .map(|(index, raw)| -> Result<Feature> {
            let geometry = raw
                .geometry
                .map(to_geometry)
                .transpose()
                .map_err(|message| Error::Decode(format!("{} feature {}: {}", what, index, message)))?;
            Ok(Feature {
                geometry,
                attributes: raw.properties.unwrap_or_default(),
            })
        })
        .collect()
}

/// Encode features as a FeatureCollection string.
pub fn encode_feature_collection(features: &[Feature]) -> Result<String> {
    let collection = OutputCollection {
        kind: "FeatureCollection",
        features: features
            .iter()
            .map(|feature| OutputFeature {
                kind: "Feature",
                geometry: feature.geometry.as_ref().map(from_geometry),
                properties: &feature.attributes,
            })
            .collect(),
    };
    Ok(serde_json::to_string(&collection)?)
}

fn to_coord(position: &[f64]) -> std::result::Result<Coord<f64>, String> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(format!("position needs two ordinates, got {}", position.len())),
    }
}

fn to_line_string(positions: &[Position]) -> std::result::Result<LineString<f64>, String> {
    positions
        .iter()
        .map(|p| to_coord(p))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn to_polygon(rings: &[Vec<Position>]) -> std::result::Result<Polygon<f64>, String> {
    let mut rings = rings.iter().map(|ring| to_line_string(ring));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => LineString::new(Vec::new()),
    };
    let interiors = rings.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn to_geometry(raw: RawGeometry) -> std::result::Result<Geometry<f64>, String> {
    let geometry = match raw {
        RawGeometry::Point { coordinates } => Geometry::Point(Point(to_coord(&coordinates)?)),
        RawGeometry::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
            coordinates
                .iter()
                .map(|p| to_coord(p).map(Point))
                .collect::<std::result::Result<Vec<_>, _>>()?,
        )),
        RawGeometry::LineString { coordinates } => Geometry::LineString(to_line_string(&coordinates)?),
        RawGeometry::MultiLineString { coordinates } => Geometry::MultiLineString(MultiLineString::new(
            coordinates
                .iter()
                .map(|line| to_line_string(line))
                .collect::<std::result::Result<Vec<_>, _>>()?,
        )),
        RawGeometry::Polygon { coordinates } => Geometry::Polygon(to_polygon(&coordinates)?),
        RawGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(MultiPolygon::new(
            coordinates
                .iter()
                .map(|rings| to_polygon(rings))
                .collect::<std::result::Result<Vec<_>, _>>()?,
        )),
        RawGeometry::GeometryCollection { geometries } => Geometry::GeometryCollection(GeometryCollection::new_from(
            geometries
                .into_iter()
                .map(to_geometry)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        )),
    };
    Ok(geometry)
}

fn position(coord: &Coord<f64>) -> Position {
    vec![coord.x, coord.y]
}

fn ring_positions(ring: &LineString<f64>) -> Vec<Position> {
    ring.coords().map(position).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_positions)
        .collect()
}

fn from_geometry(geometry: &Geometry<f64>) -> RawGeometry {
    match geometry {
        Geometry::Point(point) => RawGeometry::Point { coordinates: position(&point.0) },
        Geometry::Line(line) => RawGeometry::LineString {
            coordinates: vec![position(&line.start), position(&line.end)],
        },
        Geometry::LineString(line) => RawGeometry::LineString { coordinates: ring_positions(line) },
        Geometry::Polygon(polygon) => RawGeometry::Polygon { coordinates: polygon_rings(polygon) },
        Geometry::MultiPoint(points) => RawGeometry::MultiPoint {
            coordinates: points.0.iter().map(|p| position(&p.0)).collect(),
        },
        Geometry::MultiLineString(lines) => RawGeometry::MultiLineString {
            coordinates: lines.0.iter().map(ring_positions).collect(),
        },
        Geometry::MultiPolygon(polygons) => RawGeometry::MultiPolygon {
            coordinates: polygons.0.iter().map(polygon_rings).collect(),
        },
        Geometry::GeometryCollection(collection) => RawGeometry::GeometryCollection {
            geometries: collection.0.iter().map(from_geometry).collect(),
        },
        Geometry::Rect(rect) => RawGeometry::Polygon { coordinates: polygon_rings(&rect.to_polygon()) },
        Geometry::Triangle(triangle) => RawGeometry::Polygon {
            coordinates: polygon_rings(&triangle.to_polygon()),
        },
    }
}
