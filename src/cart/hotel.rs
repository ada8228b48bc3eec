//! Hotel Selections

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::{PricingError, line_subtotal};

/// Errors raised while building a hotel selection.
#[derive(Debug, Error, PartialEq)]
pub enum HotelSelectionError {
    /// A stay must last at least one night.
    #[error("a hotel stay must be at least one night")]
    ZeroNights,

    /// The nightly price is negative.
    #[error("price per night {0} must not be negative")]
    NegativePrice(Decimal),

    /// Check-out does not fall after check-in, or the dates disagree with the
    /// number of nights.
    #[error("check-out {check_out} must be after check-in {check_in}")]
    InvalidStay {
        /// Requested check-in date
        check_in: Date,
        /// Requested check-out date
        check_out: Date,
    },

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A priced, night-quantified selection of one hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSelection {
    hotel_id: String,

    hotel_name: String,

    nights: u32,

    #[serde(with = "rust_decimal::serde::float")]
    price_per_night: Decimal,

    /// Stored alongside the nightly price so the persisted record carries the quote.
    #[serde(with = "rust_decimal::serde::float")]
    total_price: Decimal,

    #[serde(default)]
    image: String,

    #[serde(default)]
    description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    check_in: Option<Date>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    check_out: Option<Date>,
}

impl HotelSelection {
    /// Creates a selection for `nights` nights at `price_per_night`.
    ///
    /// # Errors
    ///
    /// - [`HotelSelectionError::ZeroNights`]: `nights` is zero.
    /// - [`HotelSelectionError::NegativePrice`]: `price_per_night` is below zero.
    /// - [`HotelSelectionError::Pricing`]: the total overflowed.
    pub fn new(
        hotel_id: impl Into<String>,
        hotel_name: impl Into<String>,
        nights: u32,
        price_per_night: Decimal,
    ) -> Result<Self, HotelSelectionError> {
        if nights == 0 {
            return Err(HotelSelectionError::ZeroNights);
        }

        if price_per_night < Decimal::ZERO {
            return Err(HotelSelectionError::NegativePrice(price_per_night));
        }

        Ok(Self {
            hotel_id: hotel_id.into(),
            hotel_name: hotel_name.into(),
            nights,
            price_per_night,
            total_price: line_subtotal(price_per_night, Decimal::ZERO, nights)?,
            image: String::new(),
            description: String::new(),
            check_in: None,
            check_out: None,
        })
    }

    /// Creates a selection covering the nights between `check_in` and `check_out`.
    ///
    /// # Errors
    ///
    /// - [`HotelSelectionError::InvalidStay`]: check-out is not after check-in.
    /// - [`HotelSelectionError::NegativePrice`]: `price_per_night` is below zero.
    /// - [`HotelSelectionError::Pricing`]: the total overflowed.
    pub fn for_stay(
        hotel_id: impl Into<String>,
        hotel_name: impl Into<String>,
        check_in: Date,
        check_out: Date,
        price_per_night: Decimal,
    ) -> Result<Self, HotelSelectionError> {
        let nights = stay_nights(check_in, check_out).ok_or(HotelSelectionError::InvalidStay {
            check_in,
            check_out,
        })?;

        let mut selection = Self::new(hotel_id, hotel_name, nights, price_per_night)?;

        selection.check_in = Some(check_in);
        selection.check_out = Some(check_out);

        Ok(selection)
    }

    /// Checks a selection read back from storage.
    ///
    /// The stay total is recomputed from the nightly price, so a stored total
    /// never disagrees with the nights.
    ///
    /// # Errors
    ///
    /// - [`HotelSelectionError::ZeroNights`]: no nights are booked.
    /// - [`HotelSelectionError::NegativePrice`]: the nightly price is below zero.
    /// - [`HotelSelectionError::InvalidStay`]: the dates do not span the nights.
    /// - [`HotelSelectionError::Pricing`]: the total overflowed.
    pub fn validated(mut self) -> Result<Self, HotelSelectionError> {
        if self.nights == 0 {
            return Err(HotelSelectionError::ZeroNights);
        }

        if self.price_per_night < Decimal::ZERO {
            return Err(HotelSelectionError::NegativePrice(self.price_per_night));
        }

        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out)
            && stay_nights(check_in, check_out) != Some(self.nights)
        {
            return Err(HotelSelectionError::InvalidStay {
                check_in,
                check_out,
            });
        }

        self.total_price = line_subtotal(self.price_per_night, Decimal::ZERO, self.nights)?;

        Ok(self)
    }

    /// Sets the hotel image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Sets the hotel description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Hotel identifier.
    pub fn hotel_id(&self) -> &str {
        &self.hotel_id
    }

    /// Hotel display name.
    pub fn hotel_name(&self) -> &str {
        &self.hotel_name
    }

    /// Number of nights booked.
    pub fn nights(&self) -> u32 {
        self.nights
    }

    /// Price of one night.
    pub fn price_per_night(&self) -> Decimal {
        self.price_per_night
    }

    /// Price of the whole stay.
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Hotel image reference.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Hotel description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check-in date, when the stay was built from dates.
    pub fn check_in(&self) -> Option<Date> {
        self.check_in
    }

    /// Check-out date, when the stay was built from dates.
    pub fn check_out(&self) -> Option<Date> {
        self.check_out
    }
}

/// Nights between two days, `None` unless check-out is after check-in.
fn stay_nights(check_in: Date, check_out: Date) -> Option<u32> {
    check_in
        .until(check_out)
        .ok()
        .and_then(|span| u32::try_from(span.get_days()).ok())
        .filter(|nights| *nights > 0)
}
