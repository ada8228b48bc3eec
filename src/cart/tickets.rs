//! Ticket Lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::pricing::{PricingError, line_subtotal};

/// Ticket lines held by a cart, usually only a handful of tiers.
pub type TicketLines = SmallVec<[TicketLine; 4]>;

/// A priced, quantified selection of one ticket type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLine {
    #[serde(rename = "type")]
    ticket_type: String,

    #[serde(with = "rust_decimal::serde::float")]
    unit_price: Decimal,

    #[serde(with = "rust_decimal::serde::float", default)]
    unit_fees: Decimal,

    quantity: u32,
}

impl TicketLine {
    /// Creates a new ticket line.
    pub fn new(
        ticket_type: impl Into<String>,
        unit_price: Decimal,
        unit_fees: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            ticket_type: ticket_type.into(),
            unit_price,
            unit_fees,
            quantity,
        }
    }

    /// Ticket type, unique within a cart.
    pub fn ticket_type(&self) -> &str {
        &self.ticket_type
    }

    /// Face value of one ticket.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Booking fees charged per ticket.
    pub fn unit_fees(&self) -> Decimal {
        self.unit_fees
    }

    /// Number of tickets.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `(unit price + unit fees) × quantity`
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the calculation overflows.
    pub fn subtotal(&self) -> Result<Decimal, PricingError> {
        line_subtotal(self.unit_price, self.unit_fees, self.quantity)
    }
}

/// Collapses raw selections into cart lines.
///
/// Lines with no tickets are dropped. Lines sharing a type merge into the first
/// one seen, which keeps its price and fees.
pub fn normalize_lines(lines: impl IntoIterator<Item = TicketLine>) -> TicketLines {
    let mut normalized = TicketLines::new();

    for line in lines.into_iter().filter(|line| line.quantity > 0) {
        match normalized
            .iter_mut()
            .find(|existing| existing.ticket_type == line.ticket_type)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => normalized.push(line),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn line(ticket_type: &str, price: i64, quantity: u32) -> TicketLine {
        TicketLine::new(ticket_type, Decimal::new(price, 0), Decimal::new(5, 0), quantity)
    }

    #[test]
    fn subtotal_adds_fees_per_ticket() -> TestResult {
        assert_eq!(line("GA", 50, 2).subtotal()?, Decimal::new(110, 0));

        Ok(())
    }

    #[test]
    fn normalize_drops_empty_lines() {
        let lines = normalize_lines([line("GA", 50, 0), line("VIP", 120, 1)]);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(TicketLine::ticket_type), Some("VIP"));
    }

    #[test]
    fn normalize_merges_duplicate_types_into_first() {
        let lines = normalize_lines([line("GA", 50, 2), line("VIP", 120, 1), line("GA", 60, 3)]);

        let summary: Vec<(&str, u32, Decimal)> = lines
            .iter()
            .map(|l| (l.ticket_type(), l.quantity(), l.unit_price()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("GA", 5, Decimal::new(50, 0)),
                ("VIP", 1, Decimal::new(120, 0)),
            ]
        );
    }

    #[test]
    fn serializes_type_field_in_camel_case() -> TestResult {
        let json = serde_json::to_value(line("GA", 50, 2))?;

        assert_eq!(
            json,
            serde_json::json!({
                "type": "GA",
                "unitPrice": 50.0,
                "unitFees": 5.0,
                "quantity": 2
            })
        );

        Ok(())
    }

    #[test]
    fn missing_fees_default_to_zero() -> TestResult {
        let line: TicketLine =
            serde_json::from_str(r#"{"type":"GA","unitPrice":49.5,"quantity":1}"#)?;

        assert_eq!(line.unit_fees(), Decimal::ZERO);
        assert_eq!(line.unit_price(), Decimal::new(495, 1));

        Ok(())
    }
}
