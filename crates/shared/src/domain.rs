use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const EXPORT_FILE_PREFIX: &str = "travel_plan_";
// Leaves room for the prefix, a collision suffix and the extension under the
// common 255-byte file name limit.
const MAX_FILE_STEM_BYTES: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripForm {
    pub source: String,
    pub destination: String,
    pub dates: String,
    pub travelers: String,
    pub interests: String,
}

/// A validated trip. Only [`validate_trip`] builds one, so holders can rely on
/// every text field being non-empty and `travelers` being positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub source: String,
    pub destination: String,
    pub dates: String,
    pub travelers: u32,
    pub interests: String,
}

impl TripRequest {
    pub fn export_file_name(&self, extension: &str) -> String {
        let stem = sanitize_file_component(&self.destination);
        format!("{EXPORT_FILE_PREFIX}{stem}.{extension}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryResult {
    pub raw_text: String,
}

impl ItineraryResult {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }
}

pub fn validate_trip(form: &TripForm) -> Result<TripRequest, ValidationError> {
    let source = required("source", &form.source)?;
    let destination = required("destination", &form.destination)?;
    let dates = required("dates", &form.dates)?;
    let travelers = parse_travelers(&form.travelers)?;
    let interests = required("interests", &form.interests)?;

    Ok(TripRequest {
        source,
        destination,
        dates,
        travelers,
        interests,
    })
}

pub fn is_valid(form: &TripForm) -> bool {
    validate_trip(form).is_ok()
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

fn parse_travelers(raw: &str) -> Result<u32, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(count) if count > 0 => {
            u32::try_from(count).map_err(|_| ValidationError::InvalidTravelers(raw.to_string()))
        }
        _ => Err(ValidationError::InvalidTravelers(raw.to_string())),
    }
}

fn sanitize_file_component(raw: &str) -> String {
    let mut cleaned: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.len() > MAX_FILE_STEM_BYTES {
        let mut end = MAX_FILE_STEM_BYTES;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }

    if cleaned.is_empty() {
        "trip".to_string()
    } else {
        cleaned
    }
}
