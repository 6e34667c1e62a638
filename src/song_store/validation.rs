//! Validation of client supplied song content.
//!
//! Request bodies arrive as loosely typed JSON; these functions turn them into
//! [`NewSong`] / [`SongPatch`] values whose fields are trimmed and non-blank.

use super::models::{NewSong, SongField, SongPatch};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more of the four content fields is absent, null or blank.
    MissingFields,
    NotAString { field: &'static str },
    EmptyField { field: &'static str },
    /// An update carried none of the writable fields.
    NoValidFields,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields => {
                write!(f, "title, artist, album, genre are required")
            }
            ValidationError::NotAString { field } => {
                write!(f, "Field '{}' must be a string", field)
            }
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' is required but was empty", field)
            }
            ValidationError::NoValidFields => write!(f, "No valid fields to update"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn as_object(body: &Value) -> Option<&Map<String, Value>> {
    body.as_object()
}

/// Reads `field` as a trimmed, non-blank string.
/// Returns `Ok(None)` when the field is absent, null or blank.
fn read_text_field(
    object: &Map<String, Value>,
    field: SongField,
) -> ValidationResult<Option<String>> {
    match object.get(field.name()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(ValidationError::NotAString {
            field: field.name(),
        }),
    }
}

/// Validate the body of a create request.
pub fn validate_new_song(body: &Value) -> ValidationResult<NewSong> {
    let object = as_object(body).ok_or(ValidationError::MissingFields)?;

    let mut values = Vec::with_capacity(SongField::ALL.len());
    for field in SongField::ALL {
        values.push(read_text_field(object, field)?);
    }

    match <[Option<String>; 4]>::try_from(values) {
        Ok([Some(title), Some(artist), Some(album), Some(genre)]) => Ok(NewSong {
            title,
            artist,
            album,
            genre,
        }),
        _ => Err(ValidationError::MissingFields),
    }
}

/// Validate the body of a partial update.
///
/// Keys other than the four content fields are dropped. A writable key whose
/// value is blank is rejected rather than ignored.
pub fn validate_song_patch(body: &Value) -> ValidationResult<SongPatch> {
    let object = match as_object(body) {
        Some(object) => object,
        None => return Err(ValidationError::NoValidFields),
    };

    let mut patch = SongPatch::default();
    let mut seen_any = false;
    for field in SongField::ALL {
        if !object.contains_key(field.name()) {
            continue;
        }
        seen_any = true;
        match read_text_field(object, field)? {
            Some(value) => patch.set(field, value),
            None => {
                return Err(ValidationError::EmptyField {
                    field: field.name(),
                })
            }
        }
    }

    if !seen_any {
        return Err(ValidationError::NoValidFields);
    }
    Ok(patch)
}
