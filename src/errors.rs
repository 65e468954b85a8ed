use thiserror::Error;

#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid window geometry: {width}x{height}")]
    InvalidGeometry { width: i32, height: i32 },

    #[error("Screenshot too small for border extraction: {width}x{height} (inset {inset} px, strip {strip} px)")]
    RegionTooSmall {
        width: u32,
        height: u32,
        inset: u32,
        strip: u32,
    },

    #[error("No signature match (best score {best_score:.1})")]
    NoSignatureMatch { best_score: f64 },

    #[error("Ambiguous match between candidates: {candidates:?}")]
    AmbiguousMatch { candidates: Vec<String> },

    #[error("Window error: {0}")]
    Window(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type PilotResult<T> = Result<T, PilotError>;
