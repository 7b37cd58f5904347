use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    /// Field configuration could not be turned into a supplier.
    #[error("invalid spec: {0}")]
    Spec(String),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Coordinates outside the domain of a grid conversion.
    #[error("out of range: {0}")]
    OutOfRange(String),
    #[error("no point found inside polygon {polygon} after {attempts} attempts")]
    ConstraintUnsatisfiable { polygon: usize, attempts: u64 },
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl GeoError {
    pub fn spec(message: impl Into<String>) -> Self {
        Self::Spec(message.into())
    }

    /// True for failures raised while configuring a supplier.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Spec(_) | Self::InvalidGeometry(_))
    }
}

pub type GeoResult<T> = Result<T, GeoError>;
