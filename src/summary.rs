//! Cart Summary
//!
//! Terminal rendering of a cart quote.

use std::io;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{PricingError, to_money},
};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Output could not be written.
    #[error("failed to write summary")]
    IO,
}

/// Table view of one cart.
#[derive(Debug, Clone, Copy)]
pub struct CartSummary<'a> {
    cart: &'a Cart,
    currency: &'static Currency,
}

impl<'a> CartSummary<'a> {
    /// Summarise `cart` with prices in `currency`.
    pub fn new(cart: &'a Cart, currency: &'static Currency) -> Self {
        Self { cart, currency }
    }

    /// Writes the summary table and total.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if a price cannot be formatted or the output fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let event = self.cart.event();

        writeln!(
            out,
            "{} · {} · {}, {}",
            event.event_name, event.event_date, event.venue_name, event.venue_city
        )
        .map_err(|_err| SummaryError::IO)?;

        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit", "Fees", "Subtotal"]);

        for line in self.cart.ticket_lines() {
            builder.push_record([
                line.ticket_type().to_string(),
                line.quantity().to_string(),
                self.format(line.unit_price())?,
                self.format(line.unit_fees())?,
                self.format(line.subtotal()?)?,
            ]);
        }

        if let Some(hotel) = self.cart.hotel_selection() {
            builder.push_record([
                format!("Hotel: {}", hotel.hotel_name()),
                format!("{} nights", hotel.nights()),
                self.format(hotel.price_per_night())?,
                String::new(),
                self.format(hotel.total_price())?,
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..5), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| SummaryError::IO)?;

        writeln!(
            out,
            "Total: {} ({} tickets)",
            self.cart.total_price(self.currency)?,
            self.cart.ticket_count()
        )
        .map_err(|_err| SummaryError::IO)
    }

    fn format(&self, amount: Decimal) -> Result<String, SummaryError> {
        Ok(to_money(amount, self.currency)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use crate::cart::{EventMeta, HotelSelection, TicketLine};

    use super::*;

    #[test]
    fn write_to_renders_lines_hotel_and_total() -> TestResult {
        let mut cart = Cart::new(
            "ev1",
            EventMeta {
                event_name: "Summer Sound".to_string(),
                event_date: "2026-07-01".to_string(),
                venue_name: "Arena Norte".to_string(),
                venue_city: "Bilbao".to_string(),
            },
            [TicketLine::new(
                "GA",
                Decimal::new(50, 0),
                Decimal::new(5, 0),
                2,
            )],
        );
        cart.set_hotel_selection(Some(HotelSelection::new(
            "h1",
            "Hotel Arena",
            3,
            Decimal::new(100, 0),
        )?));

        let mut out = Vec::new();
        CartSummary::new(&cart, EUR).write_to(&mut out)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Summer Sound"), "missing event name");
        assert!(rendered.contains("GA"), "missing ticket line");
        assert!(rendered.contains("Hotel: Hotel Arena"), "missing hotel row");
        assert!(rendered.contains("3 nights"), "missing nights");
        assert!(rendered.contains("(2 tickets)"), "missing ticket count");

        Ok(())
    }
}
