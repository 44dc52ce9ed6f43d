//! Optional narrative augmentation (an LLM-backed cabin announcement).
//!
//! The engines always produce a deterministic narrative; an augmenter may
//! replace it, and any failure falls back to that narrative.
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoTicket;

const DEFAULT_DEPARTURE: &str = "Taipei";
const DEFAULT_FLIGHT_HOURS: &str = "8";
const DEFAULT_WAKE_TIME: &str = "08:00";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementType {
    #[default]
    Boarding,
    Landing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRequest {
    pub announcement_type: AnnouncementType,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnnouncementError {
    #[error("announcement request is missing a city")]
    MissingCity,
    #[error("announcement request is missing a country")]
    MissingCountry,
}

impl AnnouncementRequest {
    /// Landing announcement for the destination of a geo ticket.
    #[must_use]
    pub fn landing(ticket: &GeoTicket, wake_time: Option<&str>) -> Self {
        Self {
            announcement_type: AnnouncementType::Landing,
            city: Some(ticket.to_city.clone()),
            country: Some(ticket.to_country.clone()),
            current_location: Some(ticket.from_city.clone()),
            wake_time: wake_time.map(str::to_string),
            ..Self::default()
        }
    }

    /// Boarding announcement for a geo ticket.
    #[must_use]
    pub fn boarding(ticket: &GeoTicket) -> Self {
        Self {
            announcement_type: AnnouncementType::Boarding,
            ..Self::landing(ticket, None)
        }
    }

    /// Reject requests without a destination city and country.
    ///
    /// # Errors
    ///
    /// Returns which required field is blank or absent.
    pub fn validate(&self) -> Result<(), AnnouncementError> {
        if is_blank(self.city.as_deref()) {
            return Err(AnnouncementError::MissingCity);
        }
        if is_blank(self.country.as_deref()) {
            return Err(AnnouncementError::MissingCountry);
        }
        Ok(())
    }

    /// Prompt text for a language model, with the usual defaults filled in.
    #[must_use]
    pub fn prompt(&self) -> String {
        let city = self.city.as_deref().unwrap_or_default();
        let country = self.country.as_deref().unwrap_or_default();
        match self.announcement_type {
            AnnouncementType::Boarding => format!(
                "Write a playful boarding announcement for Wake Up Airlines, under 100 words. \
                 Departure: {}. Destination: {city} ({country}). Flight time: {} hours. \
                 Mention one local fact and a gentle sleep reminder.",
                self.current_location.as_deref().unwrap_or(DEFAULT_DEPARTURE),
                self.flight_time.as_deref().unwrap_or(DEFAULT_FLIGHT_HOURS),
            ),
            AnnouncementType::Landing => format!(
                "Write a playful landing announcement for Wake Up Airlines, under 80 words. \
                 Destination: {city} ({country}). Local time: {}. \
                 Mention one local fact and remind passengers to confirm their landing.",
                self.wake_time.as_deref().unwrap_or(DEFAULT_WAKE_TIME),
            ),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementResponse {
    pub announcement: String,
}

/// Backend that turns a request into announcement text.
pub trait NarrativeAugmenter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    fn augment(&self, request: &AnnouncementRequest) -> Result<AnnouncementResponse, Self::Error>;
}

/// Augmented text when available, otherwise `fallback`.
pub fn announce<A: NarrativeAugmenter>(
    augmenter: Option<&A>,
    request: &AnnouncementRequest,
    fallback: &str,
) -> String {
    let Some(augmenter) = augmenter else {
        return fallback.to_string();
    };
    if let Err(err) = request.validate() {
        warn!("not augmenting narrative: {err}");
        return fallback.to_string();
    }
    match augmenter.augment(request) {
        Ok(response) if !response.announcement.trim().is_empty() => {
            debug!("narrative augmented for {:?}", request.city);
            response.announcement.trim().to_string()
        }
        Ok(_) => {
            warn!("augmenter returned an empty announcement");
            fallback.to_string()
        }
        Err(err) => {
            warn!("narrative augmentation failed: {err}");
            fallback.to_string()
        }
    }
}
