// Decode → filter → gate → split → gate → encode.
//
// Invalid input and (by default) invalid output are not errors: the run is
// aborted with a reason and nothing is encoded. Decode failures and geometry
// kernel faults are errors.

use serde::Serialize;
use std::fmt;

use crate::error::Result;
use crate::geojson::{decode_feature_collection, encode_feature_collection};
use crate::module_state::ModuleState;
use crate::options::{OutputValidityPolicy, SplitOptions};
use crate::overlay::{split_building_limits_with_stats, SplitStats};
use crate::polygon_filter::{check_polygons, filter_polygons, Invalidity};
use crate::{console_log, console_warn};

pub const BUILDING_LIMITS: &str = "building limits";
pub const HEIGHT_PLATEAUS: &str = "height plateaus";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AbortReason {
    InvalidInput {
        collection: &'static str,
        invalidity: Invalidity,
    },
    InvalidOutput {
        invalidity: Invalidity,
    },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::InvalidInput { collection, invalidity } => {
                write!(f, "invalid input in {}: {}", collection, invalidity)
            }
            AbortReason::InvalidOutput { invalidity } => write!(f, "invalid split result: {}", invalidity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PipelineOutcome {
    Completed {
        geojson: String,
        stats: SplitStats,
    },
    Aborted {
        reason: AbortReason,
        /// Present when the split itself ran.
        stats: Option<SplitStats>,
    },
}

/// Split the building limits in one GeoJSON document by the height plateaus in another.
pub fn run_pipeline(
    building_limits_geojson: &str,
    height_plateaus_geojson: &str,
    options: &SplitOptions,
) -> Result<PipelineOutcome> {
    let building_features = decode_feature_collection(building_limits_geojson, BUILDING_LIMITS)?;
    let plateau_features = decode_feature_collection(height_plateaus_geojson, HEIGHT_PLATEAUS)?;

    let building_limits = filter_polygons(&building_features);
    console_log!(
        "Found {} polygons among {} {} features",
        building_limits.len(),
        building_features.len(),
        BUILDING_LIMITS
    );
    if let Err(invalidity) = check_polygons(&building_limits) {
        return Ok(abort_on_input(BUILDING_LIMITS, invalidity));
    }

    let height_plateaus = filter_polygons(&plateau_features);
    console_log!(
        "Found {} polygons among {} {} features",
        height_plateaus.len(),
        plateau_features.len(),
        HEIGHT_PLATEAUS
    );
    if let Err(invalidity) = check_polygons(&height_plateaus) {
        return Ok(abort_on_input(HEIGHT_PLATEAUS, invalidity));
    }

    let (split_limits, stats) = split_building_limits_with_stats(&building_limits, &height_plateaus, options)?;
    ModuleState::with_mut(|state| state.record_split(stats.clone()));

    if let Err(invalidity) = check_polygons(&split_limits) {
        let reason = AbortReason::InvalidOutput { invalidity };
        match options.output_validity {
            OutputValidityPolicy::BlockPersistence => {
                console_warn!("{}, output will not be encoded", reason);
                return Ok(PipelineOutcome::Aborted {
                    reason,
                    stats: Some(stats),
                });
            }
            OutputValidityPolicy::WarnOnly => {
                console_warn!("{}, encoding it anyway", reason);
            }
        }
    }

    let geojson = encode_feature_collection(&split_limits)?;
    console_log!("Encoded {} split limits ({} bytes)", split_limits.len(), geojson.len());

    Ok(PipelineOutcome::Completed { geojson, stats })
}

fn abort_on_input(collection: &'static str, invalidity: Invalidity) -> PipelineOutcome {
    let reason = AbortReason::InvalidInput { collection, invalidity };
    console_warn!("{}, nothing will be split", reason);
    PipelineOutcome::Aborted { reason, stats: None }
}
