//! The draft payload assembled while an interaction runs.
//!
//! The controller is the only mutator: form-field intents and media-pick
//! results land here, and `Confirm` serializes the draft into the record
//! handed to the persistence seam.

use std::collections::BTreeMap;
use std::fmt;

use bridge::MediaRef;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field of a [`TripDraft`] addressable from form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    /// Trip title.
    Title,
    /// Trip description.
    Description,
    /// First day of the trip.
    StartDate,
    /// Last day of the trip.
    EndDate,
    /// Cover image; set by the media picker, not by text input.
    Cover,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftField::Title => "title",
            DraftField::Description => "description",
            DraftField::StartDate => "start_date",
            DraftField::EndDate => "end_date",
            DraftField::Cover => "cover",
        };
        f.write_str(name)
    }
}

/// Error applying a raw form value to a draft field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftFieldError {
    /// The value could not be parsed for the field.
    #[error("invalid value for {field}: `{value}`")]
    InvalidValue {
        /// The field being set.
        field: DraftField,
        /// The rejected raw value.
        value: String,
    },

    /// The field is not settable from text input.
    #[error("{0} is not a text field")]
    NotTextual(DraftField),
}

/// Draft journal entry built up across phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDraft {
    /// Trip title.
    pub title: Option<String>,
    /// Trip description.
    pub description: Option<String>,
    /// Selected cover image.
    pub cover: Option<MediaRef>,
    /// First day of the trip.
    pub start_date: Option<NaiveDate>,
    /// Last day of the trip.
    pub end_date: Option<NaiveDate>,
    /// Secondary-mode flags toggled during the flow (e.g. camera facing).
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl TripDraft {
    /// Create an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a raw form value to `field`. Dates parse as `YYYY-MM-DD`;
    /// empty or whitespace text clears the field.
    pub fn apply_field(
        &mut self,
        field: DraftField,
        value: &str,
    ) -> std::result::Result<(), DraftFieldError> {
        let trimmed = value.trim();
        match field {
            DraftField::Title => {
                self.title = (!trimmed.is_empty()).then(|| trimmed.to_string());
                Ok(())
            }
            DraftField::Description => {
                self.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
                Ok(())
            }
            DraftField::StartDate => {
                self.start_date = Some(parse_date(field, trimmed)?);
                Ok(())
            }
            DraftField::EndDate => {
                self.end_date = Some(parse_date(field, trimmed)?);
                Ok(())
            }
            DraftField::Cover => Err(DraftFieldError::NotTextual(field)),
        }
    }

    /// Fields from `required` that are still missing.
    pub fn missing(&self, required: &[DraftField]) -> Vec<DraftField> {
        required
            .iter()
            .copied()
            .filter(|field| match field {
                DraftField::Title => self.title.is_none(),
                DraftField::Description => self.description.is_none(),
                DraftField::StartDate => self.start_date.is_none(),
                DraftField::EndDate => self.end_date.is_none(),
                DraftField::Cover => self.cover.is_none(),
            })
            .collect()
    }

    /// Toggle a named boolean flag, returning the new value.
    pub fn toggle_flag(&mut self, name: &str) -> bool {
        let flag = self.flags.entry(name.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// The record handed to the persistence seam.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "description": self.description,
            "cover": self.cover,
            "start_date": self.start_date.map(|d| d.to_string()),
            "end_date": self.end_date.map(|d| d.to_string()),
            "flags": self.flags,
        })
    }
}

fn parse_date(field: DraftField, value: &str) -> std::result::Result<NaiveDate, DraftFieldError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DraftFieldError::InvalidValue {
        field,
        value: value.to_string(),
    })
}
