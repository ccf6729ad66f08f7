// Splits building limits by height plateaus.
//
// Building limits are spread over a rayon pool; each worker walks every
// plateau for its building limit and keeps its fragments locally. The local
// lists are merged once after the parallel phase, so nothing is shared
// between workers while they run.

use geo::{Area, BooleanOps, BoundingRect, Geometry, Intersects, MultiPolygon, Polygon, Rect};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::feature::{AttributeBag, Feature, ELEVATION_KEY};
use crate::options::{MissingElevationPolicy, SplitOptions};
use crate::timing::Stopwatch;
use crate::{console_log, console_warn};

// Pairwise intersection used by the splitter; swapped out in tests
type Kernel = fn(&Polygon<f64>, &Polygon<f64>) -> MultiPolygon<f64>;

/// Counters describing one split run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitStats {
    pub building_limits: usize,
    pub height_plateaus: usize,
    /// Pairs handed to the geometry kernel.
    pub pairs_evaluated: usize,
    /// Pairs skipped because their bounding rectangles are disjoint.
    pub pairs_skipped: usize,
    pub empty_intersections: usize,
    pub fragments: usize,
    pub worker_threads: usize,
    pub elapsed_ms: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct PairCounts {
    evaluated: usize,
    skipped: usize,
    empty: usize,
}

impl PairCounts {
    fn merge(self, other: PairCounts) -> PairCounts {
        PairCounts {
            evaluated: self.evaluated + other.evaluated,
            skipped: self.skipped + other.skipped,
            empty: self.empty + other.empty,
        }
    }
}

/// Intersect every building limit with every height plateau.
///
/// Both lists must already have passed the validity gate; they are not
/// checked again here. Each non-empty intersection becomes one fragment
/// carrying the plateau's elevation. Output order is unspecified.
///
/// A fault inside the geometry kernel aborts the whole split.
pub fn split_building_limits(
    building_limits: &[Feature],
    height_plateaus: &[Feature],
    options: &SplitOptions,
) -> Result<Vec<Feature>> {
    split_building_limits_with_stats(building_limits, height_plateaus, options)
        .map(|(fragments, _)| fragments)
}

pub fn split_building_limits_with_stats(
    building_limits: &[Feature],
    height_plateaus: &[Feature],
    options: &SplitOptions,
) -> Result<(Vec<Feature>, SplitStats)> {
    options.validate()?;
    let watch = Stopwatch::start();

    console_log!(
        "Splitting {} building limits according to {} height plateaus",
        building_limits.len(),
        height_plateaus.len()
    );

    // A dedicated pool can fail to start where threads are unavailable (plain wasm32)
    let pool = options.worker_threads.and_then(|threads| {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                console_warn!("Could not start {} worker threads ({}), using the global pool", threads, e);
                None
            }
        }
    });

    let (fragments, counts) = match &pool {
        Some(pool) => {
            pool.install(|| split_in_parallel(building_limits, height_plateaus, options, kernel_intersection))?
        }
        None => split_in_parallel(building_limits, height_plateaus, options, kernel_intersection)?,
    };

    let worker_threads = pool
        .as_ref()
        .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads());

    let stats = SplitStats {
        building_limits: building_limits.len(),
        height_plateaus: height_plateaus.len(),
        pairs_evaluated: counts.evaluated,
        pairs_skipped: counts.skipped,
        empty_intersections: counts.empty,
        fragments: fragments.len(),
        worker_threads,
        elapsed_ms: watch.elapsed_ms(),
    };

    console_log!(
        "Split produced {} fragments from {} kernel intersections ({} pairs skipped) in {:.1} ms",
        stats.fragments,
        stats.pairs_evaluated,
        stats.pairs_skipped,
        stats.elapsed_ms
    );

    Ok((fragments, stats))
}

fn split_in_parallel(
    building_limits: &[Feature],
    height_plateaus: &[Feature],
    options: &SplitOptions,
    kernel: Kernel,
) -> Result<(Vec<Feature>, PairCounts)> {
    let per_limit: Vec<(Vec<Feature>, PairCounts)> = building_limits
        .par_iter()
        .enumerate()
        .map(|(index, building_limit)| split_one_limit(index, building_limit, height_plateaus, options, kernel))
        .collect::<Result<Vec<_>>>()?;

    let mut fragments = Vec::new();
    let mut counts = PairCounts::default();
    for (local_fragments, local_counts) in per_limit {
        fragments.extend(local_fragments);
        counts = counts.merge(local_counts);
    }

    Ok((fragments, counts))
}

// Sequential walk over all plateaus for a single building limit
fn split_one_limit(
    limit_index: usize,
    building_limit: &Feature,
    height_plateaus: &[Feature],
    options: &SplitOptions,
    kernel: Kernel,
) -> Result<(Vec<Feature>, PairCounts)> {
    let mut fragments = Vec::new();
    let mut counts = PairCounts::default();

    let Some(Geometry::Polygon(limit)) = &building_limit.geometry else {
        return Ok((fragments, counts));
    };
    let limit_envelope = limit.bounding_rect();

    for (plateau_index, plateau) in height_plateaus.iter().enumerate() {
        let Some(Geometry::Polygon(plateau_polygon)) = &plateau.geometry else {
            continue;
        };

        if options.envelope_precheck
            && !envelopes_intersect(limit_envelope, plateau_polygon.bounding_rect())
        {
            counts.skipped += 1;
            continue;
        }

        counts.evaluated += 1;
        let overlap = intersect(kernel, limit, plateau_polygon).map_err(|message| Error::KernelFault {
            building_limit: limit_index,
            height_plateau: plateau_index,
            message,
        })?;

        let Some(geometry) = fragment_geometry(overlap) else {
            counts.empty += 1;
            continue;
        };

        let attributes = fragment_attributes(plateau, options.missing_elevation)?;
        fragments.push(Feature::new(geometry, attributes));
    }

    Ok((fragments, counts))
}

fn envelopes_intersect(a: Option<Rect<f64>>, b: Option<Rect<f64>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.intersects(&b),
        // An empty polygon has no envelope and overlaps nothing
        _ => false,
    }
}

fn kernel_intersection(a: &Polygon<f64>, b: &Polygon<f64>) -> MultiPolygon<f64> {
    a.intersection(b)
}

fn intersect(kernel: Kernel, a: &Polygon<f64>, b: &Polygon<f64>) -> std::result::Result<MultiPolygon<f64>, String> {
    panic::catch_unwind(AssertUnwindSafe(|| kernel(a, b)))
        .map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic in geometry kernel".to_string()
    }
}

// Zero-area parts are what the kernel leaves behind for edge and point contacts
fn fragment_geometry(overlap: MultiPolygon<f64>) -> Option<Geometry<f64>> {
    let mut parts: Vec<Polygon<f64>> = overlap
        .0
        .into_iter()
        .filter(|part| part.unsigned_area() > 0.0)
        .collect();

    match parts.len() {
        0 => None,
        1 => parts.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(MultiPolygon::new(parts))),
    }
}

// The plateau's number is copied as is, so integer elevations stay integers
fn fragment_attributes(plateau: &Feature, policy: MissingElevationPolicy) -> Result<AttributeBag> {
    let elevation = match plateau.attributes.get(ELEVATION_KEY) {
        Some(value @ Value::Number(_)) => Some(value.clone()),
        None | Some(Value::Null) => match policy {
            MissingElevationPolicy::DefaultZero => Some(Value::from(0)),
            MissingElevationPolicy::Omit => None,
        },
        Some(other) => {
            return Err(Error::AttributeType {
                key: ELEVATION_KEY.to_string(),
                message: format!("expected a number, got {}", other),
            })
        }
    };

    let mut attributes = AttributeBag::new();
    if let Some(elevation) = elevation {
        attributes.insert(ELEVATION_KEY.to_string(), elevation);
    }
    Ok(attributes)
}
