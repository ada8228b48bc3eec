//! Cart Store
//!
//! [`CartStore`] owns the single live [`Cart`] and keeps it in durable storage.
//! Build it once at the application root and hand it to whatever needs to read
//! or change the current quote.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{Cart, EventMeta, HotelSelection, TicketLine},
    pricing::{DEFAULT_CURRENCY, PricingError},
    storage::{KeyValueStorage, StorageError},
};

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Errors raised while persisting the cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What happens to a hotel selection when tickets for another event replace the cart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HotelCarryOver {
    /// Keep the hotel, whichever event the new tickets are for.
    #[default]
    Keep,

    /// Drop the hotel when the event changes.
    DropOnEventSwitch,
}

/// Options for a [`CartStore`].
#[derive(Clone, Copy, Debug)]
pub struct CartOptions {
    /// Currency all cart prices are in.
    pub currency: &'static Currency,

    /// Hotel handling when the cart switches event.
    pub hotel_carry_over: HotelCarryOver,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY,
            hotel_carry_over: HotelCarryOver::default(),
        }
    }
}

/// The shared, persisted cart.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStorage> {
    storage: S,
    cart: Option<Cart>,
    options: CartOptions,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Restore the cart from `storage`.
    ///
    /// Never fails: unreadable, malformed or invalid data starts an empty cart
    /// and is overwritten by the next change. Duplicate or empty ticket lines in
    /// a stored cart are normalised.
    #[tracing::instrument(name = "cart.store.load", skip_all)]
    pub fn load(storage: S, options: CartOptions) -> Self {
        let cart = match storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => match cart.validated() {
                    Ok(cart) => {
                        debug!(event_id = cart.event_id(), "restored cart");
                        Some(cart)
                    }
                    Err(error) => {
                        warn!(%error, "discarding invalid stored cart");
                        None
                    }
                },
                Err(error) => {
                    warn!(%error, "discarding malformed stored cart");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                warn!(%error, "failed to read stored cart");
                None
            }
        };

        Self {
            storage,
            cart,
            options,
        }
    }

    /// The current cart, if any.
    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Check if there is no cart.
    pub fn is_empty(&self) -> bool {
        self.cart.is_none()
    }

    /// Currency of all totals.
    pub fn currency(&self) -> &'static Currency {
        self.options.currency
    }

    /// Options the store was loaded with.
    pub fn options(&self) -> CartOptions {
        self.options
    }

    /// Give back the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Replace the cart with tickets for `event_id`.
    ///
    /// An existing hotel selection is kept or dropped according to
    /// [`CartOptions::hotel_carry_over`].
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the cart cannot be persisted.
    #[tracing::instrument(
        name = "cart.store.set_tickets",
        skip(self, event, ticket_lines),
        err
    )]
    pub fn set_tickets(
        &mut self,
        event_id: &str,
        event: EventMeta,
        ticket_lines: impl IntoIterator<Item = TicketLine>,
    ) -> Result<(), CartStoreError> {
        let previous = self.cart.take();

        let mut cart = Cart::new(event_id, event, ticket_lines);

        let hotel = previous.and_then(|mut previous| {
            let switched = previous.event_id() != event_id;

            if switched && self.options.hotel_carry_over == HotelCarryOver::DropOnEventSwitch {
                debug!(
                    previous_event_id = previous.event_id(),
                    "dropping hotel on event switch"
                );
                return None;
            }

            previous.set_hotel_selection(None)
        });

        cart.set_hotel_selection(hotel);

        info!(
            lines = cart.ticket_lines().len(),
            tickets = cart.ticket_count(),
            "set cart tickets"
        );

        self.cart = Some(cart);

        self.persist()
    }

    /// Attach a hotel to the cart of `event_id`.
    ///
    /// Does nothing when there is no cart or it belongs to another event.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the cart cannot be persisted.
    #[tracing::instrument(
        name = "cart.store.set_hotel",
        skip(self, hotel),
        fields(hotel_id = hotel.hotel_id()),
        err
    )]
    pub fn set_hotel(
        &mut self,
        event_id: &str,
        hotel: HotelSelection,
    ) -> Result<(), CartStoreError> {
        let Some(cart) = self
            .cart
            .as_mut()
            .filter(|cart| cart.event_id() == event_id)
        else {
            debug!("ignoring hotel for an event without a cart");
            return Ok(());
        };

        cart.set_hotel_selection(Some(hotel));

        self.persist()
    }

    /// Remove the ticket line of `ticket_type`.
    ///
    /// The cart goes away once it has no lines and no hotel. A cart holding only
    /// a hotel is kept.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the cart cannot be persisted.
    #[tracing::instrument(name = "cart.store.remove_ticket_line", skip(self), err)]
    pub fn remove_ticket_line(&mut self, ticket_type: &str) -> Result<(), CartStoreError> {
        let Some(cart) = self.cart.as_mut() else {
            return Ok(());
        };

        if cart.remove_ticket_line(ticket_type).is_none() {
            debug!("no ticket line of this type");
        }

        if cart.is_empty() {
            self.cart = None;
        }

        self.persist()
    }

    /// Remove the hotel selection.
    ///
    /// The cart goes away when no ticket lines are left.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the cart cannot be persisted.
    #[tracing::instrument(name = "cart.store.remove_hotel", skip(self), err)]
    pub fn remove_hotel(&mut self) -> Result<(), CartStoreError> {
        let Some(cart) = self.cart.as_mut() else {
            return Ok(());
        };

        cart.set_hotel_selection(None);

        if cart.ticket_lines().is_empty() {
            self.cart = None;
        }

        self.persist()
    }

    /// Drop the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the stored cart cannot be removed.
    #[tracing::instrument(name = "cart.store.clear", skip(self), err)]
    pub fn clear(&mut self) -> Result<(), CartStoreError> {
        self.cart = None;

        self.persist()
    }

    /// Tickets plus hotel, zero without a cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if an amount overflows or cannot be represented in the currency.
    pub fn total_price(&self) -> Result<Money<'static, Currency>, PricingError> {
        match &self.cart {
            Some(cart) => cart.total_price(self.options.currency),
            None => Ok(Money::from_minor(0, self.options.currency)),
        }
    }

    /// Number of tickets in the cart, zero without a cart.
    pub fn total_ticket_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, Cart::ticket_count)
    }

    fn persist(&mut self) -> Result<(), CartStoreError> {
        match &self.cart {
            Some(cart) => {
                let raw = serde_json::to_string(cart)?;
                self.storage.set(CART_STORAGE_KEY, &raw)?;
            }
            None => self.storage.remove(CART_STORAGE_KEY)?,
        }

        Ok(())
    }
}
