use maxminddb::MaxMindDBError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoError {
    /// The database could not be parsed, the error is shared by every caller of a lazy database
    #[error("geo-IP database could not be loaded: {0}")]
    Load(Arc<MaxMindDBError>),
    #[error(transparent)]
    Lookup(MaxMindDBError),
    #[error("IP not found")]
    NotFound,
}

impl GeoError {
    pub(crate) fn load(error: MaxMindDBError) -> Self {
        Self::Load(Arc::new(error))
    }
}

impl From<MaxMindDBError> for GeoError {
    fn from(error: MaxMindDBError) -> Self {
        match error {
            MaxMindDBError::AddressNotFoundError(_) => Self::NotFound,
            error => Self::Lookup(error),
        }
    }
}
