//! Integration tests for quoting packages from the bundled catalog fixture.

use std::path::PathBuf;

use rusty_money::{Money, iso::EUR};
use stagepass::prelude::*;
use tempfile::tempdir;
use testresult::TestResult;

fn fixture_catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_path(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog.yml"))
}

#[test]
fn fixture_catalog_loads() -> TestResult {
    let catalog = fixture_catalog()?;

    assert_eq!(catalog.all_events().len(), 4);

    let acoustic = catalog
        .event("acoustic-sessions-2026")
        .ok_or("missing acoustic sessions")?;

    assert_eq!(acoustic.image, "");
    assert_eq!(acoustic.price_from, None);
    assert!(acoustic.attractions.is_empty());

    Ok(())
}

#[test]
fn packaged_hotels_are_nearest_first() -> TestResult {
    let catalog = fixture_catalog()?;

    let hotels: Vec<&str> = catalog
        .hotels_for("summer-sound-2026")
        .iter()
        .map(|package| package.hotel.id.as_str())
        .collect();

    assert_eq!(hotels, vec!["hotel-ria", "casco-viejo-inn"]);

    Ok(())
}

#[test]
fn event_listing_filters_by_city_and_sorts_by_price() -> TestResult {
    let catalog = fixture_catalog()?;

    let page = catalog.events(&EventQuery {
        city: Some("bilbao".to_string()),
        sort: EventSort::PriceAsc,
        ..EventQuery::default()
    });

    let ids: Vec<&str> = page.items().iter().map(|event| event.id.as_str()).collect();

    assert_eq!(ids, vec!["summer-sound-2026", "acoustic-sessions-2026"]);
    assert_eq!(page.total_items(), 2);
    assert!(!page.has_next());

    Ok(())
}

#[test]
fn package_quote_splits_tickets_and_hotel_per_person() -> TestResult {
    let catalog = fixture_catalog()?;
    let mut builder = QuoteBuilder::new(&catalog, "summer-sound-2026", EUR)?;

    builder.set_quantity("General Admission", 2)?;
    builder.choose_hotel("hotel-ria", 3)?;

    let quote = builder.quote()?;

    assert_eq!(quote.tickets_subtotal, Money::from_minor(11_000, EUR));
    assert_eq!(quote.hotel_subtotal, Money::from_minor(30_000, EUR));
    assert_eq!(quote.total, Money::from_minor(41_000, EUR));
    assert_eq!(quote.per_person, Money::from_minor(20_500, EUR));

    Ok(())
}

#[test]
fn default_nights_come_from_the_package() -> TestResult {
    let catalog = fixture_catalog()?;
    let mut builder = QuoteBuilder::new(&catalog, "summer-sound-2026", EUR)?;

    builder.choose_hotel_default_nights("casco-viejo-inn")?;

    let hotel = builder.hotel_selection()?.ok_or("hotel should be chosen")?;

    assert_eq!(hotel.nights(), 3);
    assert_eq!(hotel.total_price(), rust_decimal::Decimal::new(204, 0));

    Ok(())
}

#[test]
fn sold_out_tier_cannot_be_selected() -> TestResult {
    let catalog = fixture_catalog()?;
    let mut builder = QuoteBuilder::new(&catalog, "summer-sound-2026", EUR)?;

    assert!(matches!(
        builder.set_quantity("Backstage", 1),
        Err(QuoteError::TierUnavailable(_))
    ));

    Ok(())
}

#[test]
fn hotel_from_another_event_is_rejected() -> TestResult {
    let catalog = fixture_catalog()?;
    let mut builder = QuoteBuilder::new(&catalog, "jazz-nights-2026", EUR)?;

    assert!(matches!(
        builder.choose_hotel("hotel-ria", 2),
        Err(QuoteError::UnknownHotel(_))
    ));

    Ok(())
}

#[test]
fn committed_quote_lands_in_persisted_cart() -> TestResult {
    let catalog = fixture_catalog()?;
    let dir = tempdir()?;

    let mut builder = QuoteBuilder::new(&catalog, "summer-sound-2026", EUR)?;
    builder.set_quantity("General Admission", 2)?;
    builder.set_quantity("VIP", 1)?;
    builder.choose_hotel("hotel-ria", 2)?;

    let mut store = CartStore::load(FileStorage::open(dir.path())?, CartOptions::default());
    builder.commit(&mut store)?;

    let store = CartStore::load(FileStorage::open(dir.path())?, CartOptions::default());
    let cart = store.cart().ok_or("cart should be stored")?;

    assert_eq!(cart.event_id(), "summer-sound-2026");
    assert_eq!(cart.event().event_name, "Summer Sound Festival");
    assert_eq!(cart.event().event_date, "2026-07-03");
    assert_eq!(store.total_ticket_count(), 3);
    // 2 x (50 + 5) + 1 x (120 + 10) + 2 x 100
    assert_eq!(store.total_price()?, Money::from_minor(44_000, EUR));

    Ok(())
}
