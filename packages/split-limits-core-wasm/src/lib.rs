use wasm_bindgen::prelude::*;
use serde_wasm_bindgen::to_value;

// Create a console module for logging
pub mod console;
// Import our error types
pub mod error;
// Import our feature model
pub mod feature;
// Import our GeoJSON reader/writer
pub mod geojson;
// Import our split options
pub mod options;
// Import the overlay splitter
pub mod overlay;
// Import the driver that chains decoding, gating, splitting and encoding
pub mod pipeline;
// Import our polygon filter and validity gate
pub mod polygon_filter;
// Import our module state management
mod module_state;
mod timing;
#[cfg(test)]
mod test_support;

pub use error::Error;
pub use feature::{AttributeBag, Feature, ELEVATION_KEY};
pub use options::{MissingElevationPolicy, OutputValidityPolicy, SplitOptions};
pub use overlay::{split_building_limits, split_building_limits_with_stats, SplitStats};
pub use pipeline::{run_pipeline, AbortReason, PipelineOutcome};
pub use polygon_filter::{check_polygons, filter_polygons, is_valid_non_empty, Invalidity};

use module_state::ModuleState;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macros from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => ($crate::console::warn(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("WASM module initialized successfully");
    });
}

fn to_js_error(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Split the building limits by the height plateaus.
///
/// Both inputs are GeoJSON FeatureCollection strings; `options_json` may be
/// empty. Resolves to `{ status: "completed", geojson, stats }` or
/// `{ status: "aborted", reason, stats }`; decode errors and geometry kernel
/// faults reject with a message.
#[wasm_bindgen]
pub fn split_building_limits_geojson(
    building_limits_geojson: &str,
    height_plateaus_geojson: &str,
    options_json: &str,
) -> Result<JsValue, JsValue> {
    let options = SplitOptions::from_json(options_json).map_err(to_js_error)?;

    let outcome = run_pipeline(building_limits_geojson, height_plateaus_geojson, &options).map_err(|err| {
        console_warn!("Splitting building limits failed: {}", err);
        to_js_error(err)
    })?;

    Ok(to_value(&outcome)?)
}

// Run the validity gate on one collection without splitting anything
#[wasm_bindgen]
pub fn validate_polygons_geojson(geojson: &str) -> Result<bool, JsValue> {
    let features = crate::geojson::decode_feature_collection(geojson, "input").map_err(to_js_error)?;
    Ok(is_valid_non_empty(&filter_polygons(&features)))
}

// Stats of the last split, or null if nothing has been split yet
#[wasm_bindgen]
pub fn get_last_split_stats() -> Result<JsValue, JsValue> {
    match ModuleState::with(|state| state.last_split.clone()) {
        Some(stats) => Ok(to_value(&stats)?),
        None => Ok(JsValue::NULL),
    }
}

// Get information about WASM module capabilities
#[wasm_bindgen]
pub fn get_wasm_info() -> String {
    let worker_threads = rayon::current_num_threads();
    let splits_run = ModuleState::with(|state| state.splits_run);

    serde_json::to_string(&serde_json::json!({
        "parallel_processing": worker_threads > 1,
        "worker_threads": worker_threads,
        "logical_cpus": num_cpus::get(),
        "splits_run": splits_run,
        "missing_elevation_policies": ["defaultZero", "omit"],
        "output_validity_policies": ["blockPersistence", "warnOnly"]
    }))
    .unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::get_wasm_info;

    #[test]
    fn wasm_info_describes_the_pool() {
        let info: serde_json::Value = serde_json::from_str(&get_wasm_info()).expect("info is json");
        assert!(info["worker_threads"].as_u64().expect("thread count") >= 1);
        assert!(info["logical_cpus"].as_u64().expect("cpu count") >= 1);
        assert_eq!(info["missing_elevation_policies"][0], "defaultZero");
    }
}
