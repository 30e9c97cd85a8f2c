//! Register / edit sample form.
//!
//! SYSTEM CONTEXT
//! ==============
//! Inputs arrive as raw text. Required fields are checked in the order the
//! form shows them, optional ones are dropped from the payload when blank,
//! and the result is sent as a create or an update depending on whether the
//! form was opened on an existing sample.
//!
//! DATES
//! =====
//! The collection time is entered as `YYYY-MM-DDTHH:MM` (read as UTC) or a
//! full RFC 3339 timestamp; the expiration date as `YYYY-MM-DD` (midnight
//! UTC) or RFC 3339. Both are sent as RFC 3339 UTC.

#[cfg(test)]
#[path = "sample_form_test.rs"]
mod sample_form_test;

use serde_json::{Map, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use validator::Validate;

use crate::error::{ApiError, ValidationError};
use crate::net::client::ApiClient;

pub const CREATE_FAILED_MESSAGE: &str = "Failed to register sample";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update sample";

const MINUTE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

const REQUIRED_ORDER: [&str; 4] = ["barcode", "patient_code", "sample_type_id", "collection_datetime"];

#[derive(Clone, Debug, Default, PartialEq, Validate)]
pub struct SampleForm {
    /// Set when editing; selects update over create.
    pub sample_id: Option<String>,
    #[validate(length(min = 1, message = "Barcode is required"))]
    pub barcode: String,
    #[validate(length(min = 1, message = "Patient code is required"))]
    pub patient_code: String,
    pub request_code: String,
    #[validate(length(min = 1, message = "Sample type is required"))]
    pub sample_type_id: String,
    pub volume_ml: String,
    #[validate(length(min = 1, message = "Collection date/time is required"))]
    pub collection_datetime: String,
    pub expiration_date: String,
    pub notes: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SampleFormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{fallback}: {source}")]
    Api {
        #[source]
        source: ApiError,
        fallback: &'static str,
    },
}

impl SampleFormError {
    /// Text to show at the top of the form.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(error) => error.message.clone(),
            Self::Api { source, fallback } => source.user_message(fallback),
        }
    }
}

impl SampleForm {
    /// Blank form with the collection time preset to now.
    #[must_use]
    pub fn new() -> Self {
        Self { collection_datetime: minute_input(Utc::now()), ..Self::default() }
    }

    /// Form prefilled from a sample as returned by `GET /samples/:id`.
    #[must_use]
    pub fn edit(sample: &Value) -> Self {
        let text = |key: &str| sample.get(key).and_then(Value::as_str).unwrap_or_default().to_owned();
        let sample_type_id = sample
            .get("sampleTypeId")
            .and_then(Value::as_str)
            .or_else(|| sample.pointer("/sampleType/id").and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned();
        let volume_ml = sample.get("volumeMl").and_then(Value::as_f64).map(|v| v.to_string()).unwrap_or_default();
        let collection = text("collectionDatetime");
        let expiration = text("expirationDate");

        Self {
            sample_id: sample.get("id").and_then(Value::as_str).map(str::to_owned),
            barcode: text("barcode"),
            patient_code: text("patientCode"),
            request_code: text("requestCode"),
            sample_type_id,
            volume_ml,
            collection_datetime: DateTime::parse_from_rfc3339(&collection)
                .map(|at| minute_input(at.with_timezone(&Utc)))
                .unwrap_or(collection),
            expiration_date: DateTime::parse_from_rfc3339(&expiration)
                .map(|at| at.with_timezone(&Utc).date_naive().to_string())
                .unwrap_or(expiration),
            notes: text("notes"),
        }
    }

    #[must_use]
    pub fn is_update(&self) -> bool {
        self.sample_id.is_some()
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the first failing required field in form order, or a parse
    /// failure for the volume or either date.
    pub fn to_payload(&self) -> Result<Value, ValidationError> {
        let form = self.trimmed();
        form.validate().map_err(|errors| ValidationError::first_of(&errors, &REQUIRED_ORDER))?;

        let mut payload = Map::new();
        payload.insert("barcode".into(), form.barcode.into());
        payload.insert("patientCode".into(), form.patient_code.into());
        payload.insert("sampleTypeId".into(), form.sample_type_id.into());
        payload.insert("collectionDatetime".into(), parse_datetime(&form.collection_datetime)?.into());

        if !form.request_code.is_empty() {
            payload.insert("requestCode".into(), form.request_code.into());
        }
        if !form.volume_ml.is_empty() {
            payload.insert("volumeMl".into(), parse_volume(&form.volume_ml)?.into());
        }
        if !form.expiration_date.is_empty() {
            payload.insert("expirationDate".into(), parse_date(&form.expiration_date)?.into());
        }
        if !form.notes.is_empty() {
            payload.insert("notes".into(), form.notes.into());
        }
        Ok(Value::Object(payload))
    }

    /// Validate, then create or update the sample. Returns the server's body.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call, or the API error
    /// paired with the create/update fallback message.
    pub async fn submit(&self, api: &ApiClient) -> Result<Value, SampleFormError> {
        let payload = self.to_payload()?;
        let (result, fallback) = match &self.sample_id {
            Some(id) => (api.samples().update(id, &payload).await, UPDATE_FAILED_MESSAGE),
            None => (api.samples().create(&payload).await, CREATE_FAILED_MESSAGE),
        };
        let response = result.map_err(|source| SampleFormError::Api { source, fallback })?;
        tracing::info!(sample_id = ?self.sample_id, barcode = %payload["barcode"], "sample saved");
        Ok(response.body)
    }

    fn trimmed(&self) -> Self {
        Self {
            sample_id: self.sample_id.clone(),
            barcode: self.barcode.trim().to_owned(),
            patient_code: self.patient_code.trim().to_owned(),
            request_code: self.request_code.trim().to_owned(),
            sample_type_id: self.sample_type_id.trim().to_owned(),
            volume_ml: self.volume_ml.trim().to_owned(),
            collection_datetime: self.collection_datetime.trim().to_owned(),
            expiration_date: self.expiration_date.trim().to_owned(),
            notes: self.notes.trim().to_owned(),
        }
    }
}

fn minute_input(at: DateTime<Utc>) -> String {
    at.format(MINUTE_INPUT_FORMAT).to_string()
}

fn rfc3339_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|at| at.with_timezone(&Utc))
}

fn parse_datetime(raw: &str) -> Result<String, ValidationError> {
    parse_rfc3339(raw)
        .or_else(|| NaiveDateTime::parse_from_str(raw, MINUTE_INPUT_FORMAT).ok().map(|at| at.and_utc()))
        .map(rfc3339_utc)
        .ok_or_else(|| ValidationError::new("collection_datetime", "Collection date/time is invalid"))
}

fn parse_date(raw: &str) -> Result<String, ValidationError> {
    parse_rfc3339(raw)
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_INPUT_FORMAT).ok().map(|date| date.and_time(NaiveTime::MIN).and_utc())
        })
        .map(rfc3339_utc)
        .ok_or_else(|| ValidationError::new("expiration_date", "Expiration date is invalid"))
}

fn parse_volume(raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>()
        .ok()
        .filter(|volume| volume.is_finite())
        .ok_or_else(|| ValidationError::new("volume_ml", "Volume must be a number"))
}
