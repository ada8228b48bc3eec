//! Catalog
//!
//! Read-only rows from the storefront backend: events, ticket tiers, hotels and
//! the event-with-hotel package view. Rows are validated once on load.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod query;
pub mod rows;

pub use query::{EventQuery, EventSort, Page};
pub use rows::{EventHotelRow, EventRow, HotelRow, TicketTierRow};

/// Catalog loading and validation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// File extension is neither JSON nor YAML
    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    /// Two rows share an event id
    #[error("duplicate event: {0}")]
    DuplicateEvent(String),

    /// Two rows share a hotel id
    #[error("duplicate hotel: {0}")]
    DuplicateHotel(String),

    /// Two tiers of one event share a type
    #[error("duplicate ticket tier {tier_type} for event {event_id}")]
    DuplicateTier {
        /// Event the tiers are sold for
        event_id: String,
        /// Shared tier type
        tier_type: String,
    },

    /// A row references an event that does not exist
    #[error("{row} row references unknown event {event_id}")]
    UnknownEvent {
        /// Kind of row holding the reference
        row: &'static str,
        /// Referenced event id
        event_id: String,
    },

    /// A package row references a hotel that does not exist
    #[error("package row references unknown hotel {0}")]
    UnknownHotel(String),

    /// A price column is negative
    #[error("negative price in {0}")]
    NegativePrice(String),
}

/// Raw catalog document, as returned by the backend or stored as a fixture.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    /// Event rows
    #[serde(default)]
    pub events: Vec<EventRow>,

    /// Ticket tier rows
    #[serde(default)]
    pub ticket_tiers: Vec<TicketTierRow>,

    /// Hotel rows
    #[serde(default)]
    pub hotels: Vec<HotelRow>,

    /// Event-with-hotel package rows
    #[serde(default)]
    pub event_hotels: Vec<EventHotelRow>,
}

/// A hotel offered with an event.
#[derive(Debug, Clone, Copy)]
pub struct PackageHotel<'a> {
    /// Hotel details
    pub hotel: &'a HotelRow,

    /// Package details
    pub package: &'a EventHotelRow,
}

/// Validated, indexed catalog.
#[derive(Debug)]
pub struct Catalog {
    data: CatalogData,
    event_keys: FxHashMap<String, usize>,
    hotel_keys: FxHashMap<String, usize>,
}

impl Catalog {
    /// Validate and index catalog rows.
    ///
    /// Package rows asking for zero nights are defaulted to one night.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for duplicate ids or tiers, dangling references
    /// or negative prices.
    pub fn from_data(mut data: CatalogData) -> Result<Self, CatalogError> {
        let mut event_keys = FxHashMap::default();

        for (idx, event) in data.events.iter().enumerate() {
            if event_keys.insert(event.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateEvent(event.id.clone()));
            }

            if event.price_from.is_some_and(|price| price < Decimal::ZERO) {
                return Err(CatalogError::NegativePrice(format!("event {}", event.id)));
            }
        }

        let mut hotel_keys = FxHashMap::default();

        for (idx, hotel) in data.hotels.iter().enumerate() {
            if hotel_keys.insert(hotel.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateHotel(hotel.id.clone()));
            }

            if hotel.price_per_night < Decimal::ZERO {
                return Err(CatalogError::NegativePrice(format!("hotel {}", hotel.id)));
            }
        }

        let mut tier_keys = FxHashSet::default();

        for tier in &data.ticket_tiers {
            if !event_keys.contains_key(&tier.event_id) {
                return Err(CatalogError::UnknownEvent {
                    row: "ticket tier",
                    event_id: tier.event_id.clone(),
                });
            }

            if !tier_keys.insert((tier.event_id.as_str(), tier.tier_type.as_str())) {
                return Err(CatalogError::DuplicateTier {
                    event_id: tier.event_id.clone(),
                    tier_type: tier.tier_type.clone(),
                });
            }

            if tier.price < Decimal::ZERO || tier.fees < Decimal::ZERO {
                return Err(CatalogError::NegativePrice(format!(
                    "ticket tier {} of event {}",
                    tier.tier_type, tier.event_id
                )));
            }
        }

        for package in &mut data.event_hotels {
            if !event_keys.contains_key(&package.event_id) {
                return Err(CatalogError::UnknownEvent {
                    row: "package",
                    event_id: package.event_id.clone(),
                });
            }

            if !hotel_keys.contains_key(&package.hotel_id) {
                return Err(CatalogError::UnknownHotel(package.hotel_id.clone()));
            }

            package.default_nights = package.default_nights.max(1);
        }

        debug!(
            events = data.events.len(),
            tiers = data.ticket_tiers.len(),
            hotels = data.hotels.len(),
            packages = data.event_hotels.len(),
            "loaded catalog"
        );

        Ok(Self {
            data,
            event_keys,
            hotel_keys,
        })
    }

    /// Parse a catalog from backend JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_data(serde_json::from_str(json)?)
    }

    /// Parse a catalog from a YAML fixture.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the YAML is malformed or fails validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::from_data(serde_norway::from_str(yaml)?)
    }

    /// Load a catalog file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read, has an unknown
    /// extension, or fails to parse or validate.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Self::from_json_str(&fs::read_to_string(path)?),
            "yml" | "yaml" => Self::from_yaml_str(&fs::read_to_string(path)?),
            _ => Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Get an event by id.
    pub fn event(&self, id: &str) -> Option<&EventRow> {
        self.event_keys
            .get(id)
            .and_then(|idx| self.data.events.get(*idx))
    }

    /// Get a hotel by id.
    pub fn hotel(&self, id: &str) -> Option<&HotelRow> {
        self.hotel_keys
            .get(id)
            .and_then(|idx| self.data.hotels.get(*idx))
    }

    /// All events in catalog order.
    pub fn all_events(&self) -> &[EventRow] {
        &self.data.events
    }

    /// Ticket tiers of an event, in catalog order.
    pub fn tiers_for(&self, event_id: &str) -> Vec<&TicketTierRow> {
        self.data
            .ticket_tiers
            .iter()
            .filter(|tier| tier.event_id == event_id)
            .collect()
    }

    /// Hotels packaged with an event, nearest first.
    ///
    /// Packages without a distance come last.
    pub fn hotels_for(&self, event_id: &str) -> Vec<PackageHotel<'_>> {
        let mut hotels: Vec<PackageHotel<'_>> = self
            .data
            .event_hotels
            .iter()
            .filter(|package| package.event_id == event_id)
            .filter_map(|package| {
                self.hotel(&package.hotel_id)
                    .map(|hotel| PackageHotel { hotel, package })
            })
            .collect();

        hotels.sort_by(|a, b| match (a.package.distance_km, b.package.distance_km) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        hotels
    }

    /// Filter, sort and paginate the events.
    pub fn events(&self, query: &EventQuery) -> Page<&EventRow> {
        let mut matching: Vec<&EventRow> = self
            .data
            .events
            .iter()
            .filter(|event| query.matches(event))
            .collect();

        matching.sort_by(|a, b| query.compare(a, b));

        Page::paginate(matching, query.page, query.per_page)
    }
}
