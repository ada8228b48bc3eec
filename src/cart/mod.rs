//! Cart
//!
//! The quote-in-progress for one event: ticket lines plus at most one hotel
//! selection. [`Cart`] only holds the data and its totals; the shared,
//! persisted instance is owned by [`CartStore`](crate::store::CartStore).

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::{PricingError, total_price};

pub mod hotel;
pub mod tickets;

pub use hotel::{HotelSelection, HotelSelectionError};
pub use tickets::{TicketLine, TicketLines, normalize_lines};

/// A stored cart that cannot be trusted.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A ticket line carries a negative price or fee.
    #[error("ticket line {0} has a negative price")]
    NegativeTicketPrice(String),

    /// The hotel selection is inconsistent.
    #[error(transparent)]
    Hotel(#[from] HotelSelectionError),
}

/// Display metadata of the event a cart belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Event name
    pub event_name: String,

    /// Event date, as shown to the user
    pub event_date: String,

    /// Venue name
    pub venue_name: String,

    /// Venue city
    pub venue_city: String,
}

/// Cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    event_id: String,

    #[serde(flatten)]
    event: EventMeta,

    #[serde(default)]
    ticket_lines: TicketLines,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    hotel_selection: Option<HotelSelection>,
}

impl Cart {
    /// Create a cart for an event with the given ticket lines.
    ///
    /// Lines are normalised with [`normalize_lines`].
    pub fn new(
        event_id: impl Into<String>,
        event: EventMeta,
        ticket_lines: impl IntoIterator<Item = TicketLine>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event,
            ticket_lines: normalize_lines(ticket_lines),
            hotel_selection: None,
        }
    }

    /// Checks a cart read back from storage.
    ///
    /// Lines are normalised the same way [`Cart::new`] does it and the hotel
    /// total is recomputed.
    ///
    /// # Errors
    ///
    /// - [`CartError::NegativeTicketPrice`]: a line has a negative price or fee.
    /// - [`CartError::Hotel`]: the hotel selection is invalid.
    pub fn validated(mut self) -> Result<Self, CartError> {
        if let Some(line) = self
            .ticket_lines
            .iter()
            .find(|line| line.unit_price() < Decimal::ZERO || line.unit_fees() < Decimal::ZERO)
        {
            return Err(CartError::NegativeTicketPrice(
                line.ticket_type().to_string(),
            ));
        }

        self.hotel_selection = self
            .hotel_selection
            .map(HotelSelection::validated)
            .transpose()?;

        self.ticket_lines = normalize_lines(std::mem::take(&mut self.ticket_lines));

        Ok(self)
    }

    /// Identifier of the event this cart belongs to.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Event display metadata.
    pub fn event(&self) -> &EventMeta {
        &self.event
    }

    /// Ticket lines in selection order.
    pub fn ticket_lines(&self) -> &[TicketLine] {
        &self.ticket_lines
    }

    /// Get a ticket line by type.
    pub fn ticket_line(&self, ticket_type: &str) -> Option<&TicketLine> {
        self.ticket_lines
            .iter()
            .find(|line| line.ticket_type() == ticket_type)
    }

    /// The hotel selection, if any.
    pub fn hotel_selection(&self) -> Option<&HotelSelection> {
        self.hotel_selection.as_ref()
    }

    /// Replace the hotel selection, returning the previous one.
    pub fn set_hotel_selection(
        &mut self,
        hotel: Option<HotelSelection>,
    ) -> Option<HotelSelection> {
        std::mem::replace(&mut self.hotel_selection, hotel)
    }

    /// Remove the ticket line with the given type.
    ///
    /// Returns the removed line, if there was one.
    pub fn remove_ticket_line(&mut self, ticket_type: &str) -> Option<TicketLine> {
        let idx = self
            .ticket_lines
            .iter()
            .position(|line| line.ticket_type() == ticket_type)?;

        Some(self.ticket_lines.remove(idx))
    }

    /// Whether the cart holds neither tickets nor a hotel.
    pub fn is_empty(&self) -> bool {
        self.ticket_lines.is_empty() && self.hotel_selection.is_none()
    }

    /// Total number of tickets across all lines.
    pub fn ticket_count(&self) -> u32 {
        self.ticket_lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity()))
    }

    /// Ticket lines plus the hotel stay, in the given currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if an amount overflows or cannot be represented in the currency.
    pub fn total_price(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, PricingError> {
        let tickets = self.ticket_lines.iter().map(TicketLine::subtotal);
        let hotel = self
            .hotel_selection
            .iter()
            .map(|hotel| Ok(hotel.total_price()));

        total_price(tickets.chain(hotel), currency)
    }
}
