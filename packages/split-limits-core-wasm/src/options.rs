use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a fragment gets when its height plateau carries no elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingElevationPolicy {
    /// Write an elevation of `0`.
    #[default]
    DefaultZero,
    /// Leave the fragment without an elevation attribute.
    Omit,
}

/// What the pipeline does when the split result fails the validity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputValidityPolicy {
    /// Abort without encoding, the same as for invalid input.
    #[default]
    BlockPersistence,
    /// Log a warning and encode anyway.
    WarnOnly,
}

// Options passed from JavaScript as a JSON string; every key is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitOptions {
    pub missing_elevation: MissingElevationPolicy,
    pub output_validity: OutputValidityPolicy,
    /// `None` runs on rayon's global pool.
    pub worker_threads: Option<usize>,
    /// Skip kernel calls for pairs whose bounding rectangles are disjoint.
    pub envelope_precheck: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            missing_elevation: MissingElevationPolicy::default(),
            output_validity: OutputValidityPolicy::default(),
            worker_threads: None,
            envelope_precheck: true,
        }
    }
}

impl SplitOptions {
    /// Parse options JSON. Blank input gives the defaults.
    pub fn from_json(options_json: &str) -> Result<Self> {
        if options_json.trim().is_empty() {
            return Ok(SplitOptions::default());
        }
        let options: SplitOptions =
            serde_json::from_str(options_json).map_err(|e| Error::Options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(Error::Options("workerThreads must be at least 1".to_string()));
        }
        Ok(())
    }
}
