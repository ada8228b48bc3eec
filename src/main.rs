//! Stagepass CLI
//!
//! Drives the storefront cart against a file-backed store and a catalog file.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use jiff::civil::Date;
use rust_decimal::Decimal;
use stagepass::{
    config::StorefrontConfig,
    observability,
    prelude::*,
    pricing::to_money,
};
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Parser)]
#[command(name = "stagepass", about = "Stagepass storefront cart", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the current cart
    Show,

    /// List catalog events
    Events(EventsArgs),

    /// Replace the cart with tickets for an event
    AddTickets(TicketsArgs),

    /// Attach a hotel packaged with the cart's event
    AddHotel(HotelArgs),

    /// Remove the ticket line of a type
    RemoveTicket {
        /// Ticket type to remove
        ticket_type: String,
    },

    /// Remove the hotel from the cart
    RemoveHotel,

    /// Empty the cart
    Clear,

    /// Price tickets and a hotel for an event without touching the cart
    Quote(QuoteArgs),

    /// Toggle an event as favourite
    Favorite {
        /// Event id
        event_id: String,
    },
}

#[derive(Debug, Args)]
struct EventsArgs {
    /// Free text search over names, venues and artists
    #[arg(short, long)]
    search: Option<String>,

    /// Only events in this city
    #[arg(long)]
    city: Option<String>,

    /// Only events of this genre
    #[arg(long)]
    genre: Option<String>,

    /// Only events on or after this day
    #[arg(long)]
    from: Option<Date>,

    /// Only events on or before this day
    #[arg(long)]
    until: Option<Date>,

    /// Listing order
    #[arg(long, value_enum, default_value_t = EventSort::Date)]
    sort: EventSort,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Events per page
    #[arg(long, default_value_t = stagepass::catalog::query::DEFAULT_PER_PAGE)]
    per_page: usize,

    /// Only show favourite events
    #[arg(long)]
    favorites: bool,
}

#[derive(Debug, Args)]
struct TicketsArgs {
    /// Event id
    event_id: String,

    /// Tickets as TYPE=QUANTITY, repeatable
    #[arg(short, long = "ticket", value_parser = parse_ticket, required = true)]
    tickets: Vec<(String, u32)>,
}

#[derive(Debug, Args)]
struct HotelArgs {
    /// Event id the cart belongs to
    event_id: String,

    /// Hotel id
    hotel_id: String,

    /// Nights to stay; defaults to the package suggestion
    #[arg(short, long, conflicts_with_all = ["check_in", "check_out"])]
    nights: Option<u32>,

    /// Check-in day
    #[arg(long, requires = "check_out")]
    check_in: Option<Date>,

    /// Check-out day
    #[arg(long, requires = "check_in")]
    check_out: Option<Date>,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Event id
    event_id: String,

    /// Tickets as TYPE=QUANTITY, repeatable
    #[arg(short, long = "ticket", value_parser = parse_ticket)]
    tickets: Vec<(String, u32)>,

    /// Hotel id
    #[arg(long)]
    hotel: Option<String>,

    /// Nights to stay; defaults to the package suggestion
    #[arg(short, long, requires = "hotel")]
    nights: Option<u32>,

    /// Put the quoted selection in the cart
    #[arg(long)]
    commit: bool,
}

fn parse_ticket(raw: &str) -> Result<(String, u32), String> {
    let (ticket_type, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=QUANTITY, got {raw}"))?;

    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid quantity in {raw}: {err}"))?;

    let ticket_type = ticket_type.trim();

    if ticket_type.is_empty() {
        return Err(format!("missing ticket type in {raw}"));
    }

    Ok((ticket_type.to_string(), quantity))
}

/// Stagepass CLI
#[expect(clippy::print_stderr, reason = "last-resort error reporting")]
pub fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        eprintln!("{error}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config;
    let options = config.cart_options()?;
    let storage = FileStorage::open(&config.storage_dir)
        .with_context(|| format!("opening storage {}", config.storage_dir.display()))?;

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Show => {
            let store = CartStore::load(storage, options);
            show_cart(&mut out, &store)
        }
        Commands::Events(args) => {
            let catalog = load_catalog(&config)?;
            let favorites = FavoritesStore::load(storage);
            list_events(&mut out, &catalog, &favorites, &args, options.currency)
        }
        Commands::AddTickets(args) => {
            let catalog = load_catalog(&config)?;
            let mut store = CartStore::load(storage, options);
            let mut builder = QuoteBuilder::new(&catalog, &args.event_id, options.currency)?;

            for (ticket_type, quantity) in &args.tickets {
                builder.set_quantity(ticket_type, *quantity)?;
            }

            let event = builder.event();
            store.set_tickets(&event.id, event.meta(), builder.ticket_lines())?;

            show_cart(&mut out, &store)
        }
        Commands::AddHotel(args) => {
            let catalog = load_catalog(&config)?;
            let mut store = CartStore::load(storage, options);
            let hotel = hotel_selection(&catalog, &args)?;

            if store.cart().is_none_or(|cart| cart.event_id() != args.event_id) {
                bail!("the cart holds no tickets for event {}", args.event_id);
            }

            store.set_hotel(&args.event_id, hotel)?;

            show_cart(&mut out, &store)
        }
        Commands::RemoveTicket { ticket_type } => {
            let mut store = CartStore::load(storage, options);
            store.remove_ticket_line(&ticket_type)?;
            show_cart(&mut out, &store)
        }
        Commands::RemoveHotel => {
            let mut store = CartStore::load(storage, options);
            store.remove_hotel()?;
            show_cart(&mut out, &store)
        }
        Commands::Clear => {
            let mut store = CartStore::load(storage, options);
            store.clear()?;
            show_cart(&mut out, &store)
        }
        Commands::Quote(args) => {
            let catalog = load_catalog(&config)?;
            quote(&mut out, &catalog, storage, options, &args)
        }
        Commands::Favorite { event_id } => {
            let catalog = load_catalog(&config)?;

            if catalog.event(&event_id).is_none() {
                bail!("unknown event: {event_id}");
            }

            let mut favorites = FavoritesStore::load(storage);
            let state = if favorites.toggle(&event_id)? {
                "added to"
            } else {
                "removed from"
            };

            writeln!(out, "{event_id} {state} favourites")?;

            Ok(())
        }
    }
}

fn load_catalog(config: &StorefrontConfig) -> Result<Catalog> {
    Catalog::from_path(&config.catalog)
        .with_context(|| format!("loading catalog {}", config.catalog.display()))
}

fn show_cart<S: KeyValueStorage>(out: &mut impl Write, store: &CartStore<S>) -> Result<()> {
    match store.cart() {
        Some(cart) => CartSummary::new(cart, store.currency()).write_to(out)?,
        None => writeln!(out, "The cart is empty.")?,
    }

    Ok(())
}

fn hotel_selection(catalog: &Catalog, args: &HotelArgs) -> Result<HotelSelection> {
    let package = catalog
        .hotels_for(&args.event_id)
        .into_iter()
        .find(|package| package.hotel.id == args.hotel_id)
        .ok_or_else(|| {
            anyhow!(
                "hotel {} is not offered with event {}",
                args.hotel_id,
                args.event_id
            )
        })?;

    let hotel = package.hotel;

    let selection = match (args.check_in, args.check_out) {
        (Some(check_in), Some(check_out)) => HotelSelection::for_stay(
            hotel.id.clone(),
            hotel.name.clone(),
            check_in,
            check_out,
            hotel.price_per_night,
        )?
        .with_image(hotel.image.clone())
        .with_description(hotel.description.clone()),
        _ => hotel.selection(args.nights.unwrap_or(package.package.default_nights))?,
    };

    Ok(selection)
}

fn list_events<S: KeyValueStorage>(
    out: &mut impl Write,
    catalog: &Catalog,
    favorites: &FavoritesStore<S>,
    args: &EventsArgs,
    currency: &'static rusty_money::iso::Currency,
) -> Result<()> {
    let query = EventQuery {
        search: args.search.clone(),
        city: args.city.clone(),
        genre: args.genre.clone(),
        from: args.from,
        until: args.until,
        sort: args.sort,
        page: args.page,
        per_page: args.per_page,
    };

    let page = if args.favorites {
        let mut matching: Vec<&EventRow> = catalog
            .all_events()
            .iter()
            .filter(|event| favorites.is_favorite(&event.id) && query.matches(event))
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));
        Page::paginate(matching, query.page, query.per_page)
    } else {
        catalog.events(&query)
    };

    let mut builder = Builder::default();
    builder.push_record(["", "Id", "Date", "Event", "Venue", "From"]);

    for event in page.items() {
        let price = event
            .price_from
            .map(|price: Decimal| to_money(price, currency).map(|money| money.to_string()))
            .transpose()?
            .unwrap_or_default();

        builder.push_record([
            if favorites.is_favorite(&event.id) { "★" } else { "" }.to_string(),
            event.id.clone(),
            event.date.to_string(),
            event.name.clone(),
            format!("{}, {}", event.venue_name, event.venue_city),
            price,
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    writeln!(out, "{table}")?;
    writeln!(
        out,
        "Page {} of {} ({} events)",
        page.page(),
        page.total_pages().max(1),
        page.total_items()
    )?;

    Ok(())
}

fn quote(
    out: &mut impl Write,
    catalog: &Catalog,
    storage: FileStorage,
    options: CartOptions,
    args: &QuoteArgs,
) -> Result<()> {
    let mut builder = QuoteBuilder::new(catalog, &args.event_id, options.currency)?;

    for (ticket_type, quantity) in &args.tickets {
        builder.set_quantity(ticket_type, *quantity)?;
    }

    match (&args.hotel, args.nights) {
        (Some(hotel_id), Some(nights)) => builder.choose_hotel(hotel_id, nights)?,
        (Some(hotel_id), None) => builder.choose_hotel_default_nights(hotel_id)?,
        (None, _) => {}
    }

    let quote = builder.quote()?;

    writeln!(out, "Tickets:    {}", quote.tickets_subtotal)?;
    writeln!(out, "Hotel:      {}", quote.hotel_subtotal)?;
    writeln!(out, "Total:      {}", quote.total)?;
    writeln!(
        out,
        "Per person: {} ({} attendees)",
        quote.per_person, quote.attendees
    )?;

    if let Some(url) = builder
        .hotels()
        .iter()
        .find(|package| args.hotel.as_deref() == Some(package.hotel.id.as_str()))
        .and_then(|package| package.hotel.booking_url.as_deref())
    {
        writeln!(out, "Book the hotel at: {url}")?;
    }

    if args.commit {
        let mut store = CartStore::load(storage, options);
        builder.commit(&mut store)?;
        show_cart(out, &store)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ticket_accepts_type_and_quantity() {
        assert_eq!(parse_ticket("GA=2"), Ok(("GA".to_string(), 2)));
        assert_eq!(parse_ticket(" VIP = 1 "), Ok(("VIP".to_string(), 1)));
    }

    #[test]
    fn parse_ticket_rejects_malformed_input() {
        assert!(parse_ticket("GA").is_err());
        assert!(parse_ticket("GA=two").is_err());
        assert!(parse_ticket("=2").is_err());
    }

    #[test]
    fn cli_parses_quote_command() {
        let cli = Cli::try_parse_from([
            "stagepass",
            "quote",
            "ev1",
            "-t",
            "GA=2",
            "--hotel",
            "h1",
            "-n",
            "3",
        ]);

        assert!(
            matches!(
                cli,
                Ok(Cli { command: Commands::Quote(QuoteArgs { ref tickets, nights: Some(3), .. }), .. })
                    if tickets.len() == 1
            ),
            "unexpected parse result: {cli:?}"
        );
    }
}
