//! Browser/node tests for the exported functions. Run with `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use split_limits_core_wasm::{get_last_split_stats, split_building_limits_geojson, validate_polygons_geojson};
use wasm_bindgen_test::*;

const BUILDING_LIMITS: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]] },
        "properties": {}
    }]
}"#;

const HEIGHT_PLATEAUS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[-1, -1], [5, -1], [5, 11], [-1, 11], [-1, -1]]] },
            "properties": { "elevation": 5 }
        },
        {
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[5, -1], [11, -1], [11, 11], [5, 11], [5, -1]]] },
            "properties": { "elevation": 10 }
        }
    ]
}"#;

#[wasm_bindgen_test]
fn split_resolves_with_completed_outcome() {
    let result = split_building_limits_geojson(BUILDING_LIMITS, HEIGHT_PLATEAUS, "").expect("split");
    let outcome: serde_json::Value = serde_wasm_bindgen::from_value(result).expect("outcome object");

    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["stats"]["fragments"], 2);

    let geojson = outcome["geojson"].as_str().expect("geojson text");
    let split_limits: serde_json::Value = serde_json::from_str(geojson).expect("valid geojson");
    assert_eq!(split_limits["features"].as_array().map(|f| f.len()), Some(2));

    let stats = get_last_split_stats().expect("stats");
    assert!(!stats.is_null());
}

#[wasm_bindgen_test]
fn bad_options_reject() {
    assert!(split_building_limits_geojson(BUILDING_LIMITS, HEIGHT_PLATEAUS, r#"{ "workerThreads": 0 }"#).is_err());
}

#[wasm_bindgen_test]
fn gate_is_exposed() {
    assert_eq!(validate_polygons_geojson(BUILDING_LIMITS).expect("decode"), true);
    assert!(validate_polygons_geojson("").is_err());
}
