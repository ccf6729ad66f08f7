// Error types shared by the codec, the splitter and the pipeline driver.
//
// Invalid input polygons are not errors: the validity gate reports them as a
// boolean and the pipeline turns that into an aborted outcome.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} is empty")]
    EmptyInput(String),

    #[error("Failed to decode GeoJSON: {0}")]
    Decode(String),

    #[error("Failed to encode GeoJSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid split options: {0}")]
    Options(String),

    #[error("Attribute '{key}' has an unexpected type: {message}")]
    AttributeType { key: String, message: String },

    #[error(
        "Geometry kernel fault intersecting building limit {building_limit} with height plateau {height_plateau}: {message}"
    )]
    KernelFault {
        building_limit: usize,
        height_plateau: usize,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
