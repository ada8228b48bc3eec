//! Stagepass prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, EventMeta, HotelSelection, HotelSelectionError, TicketLine},
    catalog::{
        Catalog, CatalogError, EventHotelRow, EventQuery, EventRow, EventSort, HotelRow,
        PackageHotel, Page, TicketTierRow,
    },
    favorites::{FavoritesError, FavoritesStore},
    pricing::PricingError,
    quote::{PackageQuote, QuoteBuilder, QuoteError},
    storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError},
    store::{CartOptions, CartStore, CartStoreError, HotelCarryOver},
    summary::{CartSummary, SummaryError},
};
