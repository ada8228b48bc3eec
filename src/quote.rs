//! Package Quotes
//!
//! The live quote shown on an event page while the user picks tickets and a
//! hotel. Nothing here is persisted until [`QuoteBuilder::commit`] hands the
//! selection to the shared cart.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{HotelSelection, HotelSelectionError, TicketLine},
    catalog::{Catalog, EventRow, PackageHotel, TicketTierRow},
    pricing::{PricingError, line_subtotal, per_person, to_money},
    storage::KeyValueStorage,
    store::{CartStore, CartStoreError},
};

/// Errors raised while building a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The catalog has no such event
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// The event sells no tier with this name
    #[error("unknown ticket tier: {0}")]
    UnknownTier(String),

    /// The tier is sold out
    #[error("ticket tier {0} is not available")]
    TierUnavailable(String),

    /// The hotel is not packaged with the event
    #[error("hotel {0} is not offered with this event")]
    UnknownHotel(String),

    /// A hotel stay needs at least one night
    #[error("a hotel stay must be at least one night")]
    ZeroNights,

    /// Wrapped hotel selection error
    #[error(transparent)]
    Hotel(#[from] HotelSelectionError),

    /// Wrapped pricing error
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped cart store error
    #[error(transparent)]
    Cart(#[from] CartStoreError),
}

/// Priced summary of a ticket and hotel selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageQuote<'a> {
    /// Tickets including fees
    pub tickets_subtotal: Money<'a, Currency>,

    /// Hotel nights
    pub hotel_subtotal: Money<'a, Currency>,

    /// Tickets plus hotel
    pub total: Money<'a, Currency>,

    /// Number of people covered, one per ticket
    pub attendees: u32,

    /// Total divided between attendees, zero without attendees
    pub per_person: Money<'a, Currency>,
}

#[derive(Debug, Clone, Copy)]
struct HotelChoice<'c> {
    package: PackageHotel<'c>,
    nights: u32,
}

/// Page-local selection of ticket quantities and one hotel for an event.
#[derive(Debug)]
pub struct QuoteBuilder<'c> {
    event: &'c EventRow,
    tiers: Vec<&'c TicketTierRow>,
    hotels: Vec<PackageHotel<'c>>,
    quantities: FxHashMap<String, u32>,
    hotel: Option<HotelChoice<'c>>,
    currency: &'static Currency,
}

impl<'c> QuoteBuilder<'c> {
    /// Start an empty selection for an event of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::UnknownEvent`] if the catalog has no such event.
    pub fn new(
        catalog: &'c Catalog,
        event_id: &str,
        currency: &'static Currency,
    ) -> Result<Self, QuoteError> {
        let event = catalog
            .event(event_id)
            .ok_or_else(|| QuoteError::UnknownEvent(event_id.to_string()))?;

        Ok(Self {
            event,
            tiers: catalog.tiers_for(event_id),
            hotels: catalog.hotels_for(event_id),
            quantities: FxHashMap::default(),
            hotel: None,
            currency,
        })
    }

    /// The event being quoted.
    pub fn event(&self) -> &'c EventRow {
        self.event
    }

    /// Ticket tiers on offer.
    pub fn tiers(&self) -> &[&'c TicketTierRow] {
        &self.tiers
    }

    /// Hotels on offer, nearest first.
    pub fn hotels(&self) -> &[PackageHotel<'c>] {
        &self.hotels
    }

    /// Select `quantity` tickets of a tier; zero deselects it.
    ///
    /// # Errors
    ///
    /// - [`QuoteError::UnknownTier`]: the event has no such tier.
    /// - [`QuoteError::TierUnavailable`]: the tier is no longer on sale.
    pub fn set_quantity(&mut self, tier_type: &str, quantity: u32) -> Result<(), QuoteError> {
        let tier = self
            .tier(tier_type)
            .ok_or_else(|| QuoteError::UnknownTier(tier_type.to_string()))?;

        if quantity == 0 {
            self.quantities.remove(tier_type);
            return Ok(());
        }

        if !tier.available {
            return Err(QuoteError::TierUnavailable(tier_type.to_string()));
        }

        self.quantities.insert(tier_type.to_string(), quantity);

        Ok(())
    }

    /// Selected quantity of a tier.
    pub fn quantity(&self, tier_type: &str) -> u32 {
        self.quantities.get(tier_type).copied().unwrap_or(0)
    }

    /// Choose a packaged hotel for `nights` nights.
    ///
    /// # Errors
    ///
    /// - [`QuoteError::UnknownHotel`]: the hotel is not packaged with the event.
    /// - [`QuoteError::ZeroNights`]: `nights` is zero.
    pub fn choose_hotel(&mut self, hotel_id: &str, nights: u32) -> Result<(), QuoteError> {
        let package = self
            .hotels
            .iter()
            .find(|package| package.hotel.id == hotel_id)
            .copied()
            .ok_or_else(|| QuoteError::UnknownHotel(hotel_id.to_string()))?;

        if nights == 0 {
            return Err(QuoteError::ZeroNights);
        }

        self.hotel = Some(HotelChoice { package, nights });

        Ok(())
    }

    /// Choose a packaged hotel for its suggested number of nights.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::UnknownHotel`] if the hotel is not packaged with the event.
    pub fn choose_hotel_default_nights(&mut self, hotel_id: &str) -> Result<(), QuoteError> {
        let nights = self
            .hotels
            .iter()
            .find(|package| package.hotel.id == hotel_id)
            .map(|package| package.package.default_nights)
            .ok_or_else(|| QuoteError::UnknownHotel(hotel_id.to_string()))?;

        self.choose_hotel(hotel_id, nights)
    }

    /// Drop the hotel choice.
    pub fn clear_hotel(&mut self) {
        self.hotel = None;
    }

    /// Selected tickets as cart lines, in tier order.
    pub fn ticket_lines(&self) -> Vec<TicketLine> {
        self.tiers
            .iter()
            .filter_map(|tier| {
                self.quantities
                    .get(&tier.tier_type)
                    .map(|quantity| tier.line(*quantity))
            })
            .collect()
    }

    /// The hotel choice as a cart selection.
    ///
    /// # Errors
    ///
    /// Returns a [`HotelSelectionError`] if the stay total overflows.
    pub fn hotel_selection(&self) -> Result<Option<HotelSelection>, HotelSelectionError> {
        self.hotel
            .map(|choice| choice.package.hotel.selection(choice.nights))
            .transpose()
    }

    /// Price the current selection.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if an amount overflows or cannot be represented in the currency.
    pub fn quote(&self) -> Result<PackageQuote<'static>, PricingError> {
        let tickets = self
            .ticket_lines()
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| {
                acc.checked_add(line.subtotal()?)
                    .ok_or(PricingError::Overflow)
            })?;

        let hotel = match self.hotel {
            Some(choice) => line_subtotal(
                choice.package.hotel.price_per_night,
                Decimal::ZERO,
                choice.nights,
            )?,
            None => Decimal::ZERO,
        };

        let total = tickets.checked_add(hotel).ok_or(PricingError::Overflow)?;

        let attendees = self
            .quantities
            .values()
            .fold(0_u32, |acc, quantity| acc.saturating_add(*quantity));

        Ok(PackageQuote {
            tickets_subtotal: to_money(tickets, self.currency)?,
            hotel_subtotal: to_money(hotel, self.currency)?,
            total: to_money(total, self.currency)?,
            attendees,
            per_person: per_person(total, attendees, self.currency)?,
        })
    }

    /// Put the selection in the shared cart.
    ///
    /// Tickets replace the cart; a chosen hotel is then attached to it.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] if the hotel cannot be priced or the cart cannot be persisted.
    pub fn commit<S: KeyValueStorage>(&self, store: &mut CartStore<S>) -> Result<(), QuoteError> {
        let hotel = self.hotel_selection()?;

        store.set_tickets(&self.event.id, self.event.meta(), self.ticket_lines())?;

        if let Some(hotel) = hotel {
            store.set_hotel(&self.event.id, hotel)?;
        }

        Ok(())
    }

    fn tier(&self, tier_type: &str) -> Option<&'c TicketTierRow> {
        self.tiers
            .iter()
            .find(|tier| tier.tier_type == tier_type)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use crate::{
        storage::MemoryStorage,
        store::{CartOptions, CartStore},
    };

    use super::*;

    const CATALOG: &str = r#"{
        "events": [
            {"id": "ev1", "name": "Summer Sound", "date": "2026-07-01", "venueName": "Arena Norte", "venueCity": "Bilbao"}
        ],
        "ticketTiers": [
            {"eventId": "ev1", "type": "GA", "price": 50, "fees": 5},
            {"eventId": "ev1", "type": "VIP", "price": 120, "fees": 10},
            {"eventId": "ev1", "type": "Backstage", "price": 300, "available": false}
        ],
        "hotels": [
            {"id": "h1", "name": "Hotel Arena", "pricePerNight": 100}
        ],
        "eventHotels": [
            {"eventId": "ev1", "hotelId": "h1", "defaultNights": 2}
        ]
    }"#;

    #[test]
    fn empty_selection_quotes_zero_without_dividing() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;

        let quote = builder.quote()?;

        assert_eq!(quote.total, Money::from_minor(0, EUR));
        assert_eq!(quote.attendees, 0);
        assert_eq!(quote.per_person, Money::from_minor(0, EUR));

        Ok(())
    }

    #[test]
    fn hotel_only_selection_has_zero_per_person() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;

        builder.choose_hotel("h1", 3)?;

        let quote = builder.quote()?;

        assert_eq!(quote.total, Money::from_minor(30_000, EUR));
        assert_eq!(quote.per_person, Money::from_minor(0, EUR));

        Ok(())
    }

    #[test]
    fn quote_splits_package_between_attendees() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;

        builder.set_quantity("GA", 2)?;
        builder.choose_hotel("h1", 3)?;

        let quote = builder.quote()?;

        assert_eq!(quote.tickets_subtotal, Money::from_minor(11_000, EUR));
        assert_eq!(quote.hotel_subtotal, Money::from_minor(30_000, EUR));
        assert_eq!(quote.total, Money::from_minor(41_000, EUR));
        assert_eq!(quote.attendees, 2);
        assert_eq!(quote.per_person, Money::from_minor(20_500, EUR));

        Ok(())
    }

    #[test]
    fn zero_quantity_deselects_tier() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;

        builder.set_quantity("VIP", 2)?;
        builder.set_quantity("VIP", 0)?;

        assert_eq!(builder.quantity("VIP"), 0);
        assert!(builder.ticket_lines().is_empty());

        Ok(())
    }

    #[test]
    fn unknown_and_unavailable_tiers_are_rejected() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;

        assert!(matches!(
            builder.set_quantity("Pit", 1),
            Err(QuoteError::UnknownTier(tier)) if tier == "Pit"
        ));
        assert!(matches!(
            builder.set_quantity("Backstage", 1),
            Err(QuoteError::TierUnavailable(_))
        ));

        Ok(())
    }

    #[test]
    fn hotel_choice_is_validated() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;

        assert!(matches!(
            builder.choose_hotel("h9", 1),
            Err(QuoteError::UnknownHotel(_))
        ));
        assert!(matches!(
            builder.choose_hotel("h1", 0),
            Err(QuoteError::ZeroNights)
        ));

        builder.choose_hotel_default_nights("h1")?;

        assert_eq!(
            builder.hotel_selection()?.map(|hotel| hotel.nights()),
            Some(2)
        );

        Ok(())
    }

    #[test]
    fn ticket_lines_follow_tier_order() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;

        builder.set_quantity("VIP", 1)?;
        builder.set_quantity("GA", 3)?;

        let types: Vec<String> = builder
            .ticket_lines()
            .iter()
            .map(|line| line.ticket_type().to_string())
            .collect();

        assert_eq!(types, vec!["GA".to_string(), "VIP".to_string()]);

        Ok(())
    }

    #[test]
    fn commit_fills_the_cart() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;
        let mut store = CartStore::load(MemoryStorage::new(), CartOptions::default());

        builder.set_quantity("GA", 2)?;
        builder.choose_hotel("h1", 3)?;
        builder.commit(&mut store)?;

        let cart = store.cart().ok_or("cart should exist")?;

        assert_eq!(cart.event_id(), "ev1");
        assert_eq!(cart.event().venue_name, "Arena Norte");
        assert_eq!(store.total_price()?, builder.quote()?.total);

        Ok(())
    }

    #[test]
    fn committed_cart_total_matches_sub_cent_quote() -> TestResult {
        let catalog = Catalog::from_json_str(
            r#"{
                "events": [{"id": "ev1", "name": "Small Print", "date": "2026-07-01"}],
                "ticketTiers": [
                    {"eventId": "ev1", "type": "Early", "price": 0.125},
                    {"eventId": "ev1", "type": "Late", "price": 0.125}
                ]
            }"#,
        )?;
        let mut builder = QuoteBuilder::new(&catalog, "ev1", EUR)?;
        let mut store = CartStore::load(MemoryStorage::new(), CartOptions::default());

        builder.set_quantity("Early", 1)?;
        builder.set_quantity("Late", 1)?;
        builder.commit(&mut store)?;

        let quote = builder.quote()?;

        assert_eq!(quote.total, Money::from_minor(25, EUR));
        assert_eq!(store.total_price()?, quote.total);

        Ok(())
    }

    #[test]
    fn unknown_event_is_rejected() -> TestResult {
        let catalog = Catalog::from_json_str(CATALOG)?;

        assert!(matches!(
            QuoteBuilder::new(&catalog, "ev9", EUR),
            Err(QuoteError::UnknownEvent(_))
        ));

        Ok(())
    }
}
