//! Catalog Rows
//!
//! Typed shapes of the rows the storefront backend returns. Optional columns
//! are defaulted here, once, so the rest of the crate never re-checks them.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::cart::{EventMeta, HotelSelection, HotelSelectionError, TicketLine};

/// Event Row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    /// Event id
    pub id: String,

    /// Event name
    pub name: String,

    /// Day the event takes place
    pub date: Date,

    /// Venue name
    #[serde(default, deserialize_with = "null_as_default")]
    pub venue_name: String,

    /// Venue city
    #[serde(default, deserialize_with = "null_as_default")]
    pub venue_city: String,

    /// Music genre
    #[serde(default)]
    pub genre: Option<String>,

    /// Card image reference
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    /// Long description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Cheapest ticket price, aggregated by the backend view
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price_from: Option<Decimal>,

    /// Names of the performing artists
    #[serde(default, deserialize_with = "null_as_default")]
    pub attractions: Vec<String>,
}

impl EventRow {
    /// Cart metadata for this event.
    pub fn meta(&self) -> EventMeta {
        EventMeta {
            event_name: self.name.clone(),
            event_date: self.date.to_string(),
            venue_name: self.venue_name.clone(),
            venue_city: self.venue_city.clone(),
        }
    }
}

/// Ticket Tier Row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTierRow {
    /// Event this tier is sold for
    pub event_id: String,

    /// Tier name, unique per event
    #[serde(rename = "type")]
    pub tier_type: String,

    /// Face value
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Booking fees per ticket
    #[serde(default, with = "rust_decimal::serde::float")]
    pub fees: Decimal,

    /// Whether tickets are still on sale
    #[serde(default = "default_available")]
    pub available: bool,
}

impl TicketTierRow {
    /// A cart line for `quantity` tickets of this tier.
    pub fn line(&self, quantity: u32) -> TicketLine {
        TicketLine::new(self.tier_type.clone(), self.price, self.fees, quantity)
    }
}

/// Hotel Row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRow {
    /// Hotel id
    pub id: String,

    /// Hotel name
    pub name: String,

    /// City the hotel is in
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,

    /// Price of one night
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_night: Decimal,

    /// Star rating
    #[serde(default)]
    pub stars: Option<u8>,

    /// Image reference
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    /// Long description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// External link the user is sent to for the actual booking
    #[serde(default)]
    pub booking_url: Option<String>,
}

impl HotelRow {
    /// A cart hotel selection of `nights` nights in this hotel.
    ///
    /// # Errors
    ///
    /// Returns a [`HotelSelectionError`] if `nights` is zero or the total overflows.
    pub fn selection(&self, nights: u32) -> Result<HotelSelection, HotelSelectionError> {
        Ok(
            HotelSelection::new(self.id.clone(), self.name.clone(), nights, self.price_per_night)?
                .with_image(self.image.clone())
                .with_description(self.description.clone()),
        )
    }
}

/// Event-with-hotel package row, pre-joined by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHotelRow {
    /// Event id
    pub event_id: String,

    /// Hotel id
    pub hotel_id: String,

    /// Distance between hotel and venue
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub distance_km: Option<Decimal>,

    /// Nights the package suggests
    #[serde(default = "default_nights")]
    pub default_nights: u32,
}

fn default_available() -> bool {
    true
}

fn default_nights() -> u32 {
    1
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn event_row_defaults_missing_and_null_columns() -> TestResult {
        let row: EventRow = serde_json::from_str(
            r#"{"id":"ev1","name":"Summer Sound","date":"2026-07-01","image":null}"#,
        )?;

        assert_eq!(row.date, date(2026, 7, 1));
        assert_eq!(row.image, "");
        assert_eq!(row.price_from, None);
        assert!(row.attractions.is_empty());

        Ok(())
    }

    #[test]
    fn event_meta_uses_iso_date() -> TestResult {
        let row: EventRow = serde_json::from_str(
            r#"{"id":"ev1","name":"Summer Sound","date":"2026-07-01","venueName":"Arena Norte","venueCity":"Bilbao"}"#,
        )?;

        let meta = row.meta();

        assert_eq!(meta.event_date, "2026-07-01");
        assert_eq!(meta.venue_city, "Bilbao");

        Ok(())
    }

    #[test]
    fn tier_row_defaults_fees_and_availability() -> TestResult {
        let row: TicketTierRow =
            serde_json::from_str(r#"{"eventId":"ev1","type":"GA","price":45.5}"#)?;

        assert_eq!(row.fees, Decimal::ZERO);
        assert!(row.available);
        assert_eq!(row.line(2).subtotal()?, Decimal::new(91, 0));

        Ok(())
    }

    #[test]
    fn hotel_row_builds_selection() -> TestResult {
        let row: HotelRow = serde_json::from_str(
            r#"{"id":"h1","name":"Hotel Arena","pricePerNight":100,"image":"arena.jpg"}"#,
        )?;

        let selection = row.selection(2)?;

        assert_eq!(selection.total_price(), Decimal::new(200, 0));
        assert_eq!(selection.image(), "arena.jpg");

        Ok(())
    }

    #[test]
    fn package_row_defaults_to_one_night() -> TestResult {
        let row: EventHotelRow = serde_json::from_str(r#"{"eventId":"ev1","hotelId":"h1"}"#)?;

        assert_eq!(row.default_nights, 1);
        assert_eq!(row.distance_km, None);

        Ok(())
    }
}
