use thiserror::Error;

#[derive(Debug, Error)]
pub enum SliceError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Object not found: '{0}'")]
    ObjectNotFound(String),
    #[error("Cap failure: could not fill boundary loop, {reason}")]
    CapFailure{reason:String},
    #[error("Extrude failure: {reason}")]
    ExtrudeFailure{reason:String},
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SliceError {
    pub fn cap<T:Into<String>>(reason:T) -> Self {
        SliceError::CapFailure{ reason:reason.into() }
    }
    pub fn extrude<T:Into<String>>(reason:T) -> Self {
        SliceError::ExtrudeFailure{ reason:reason.into() }
    }
    /// Geometric failures are confined to a single slice, everything else aborts the run.
    pub fn is_per_slice(&self) -> bool {
        matches!(self, SliceError::CapFailure{..} | SliceError::ExtrudeFailure{..})
    }
}
