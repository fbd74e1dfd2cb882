use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("travelers must be a whole number greater than zero (got '{0}')")]
    InvalidTravelers(String),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => *field,
            Self::InvalidTravelers(_) => "travelers",
        }
    }
}
