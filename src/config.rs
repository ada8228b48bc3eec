//! Storefront configuration

use std::path::PathBuf;

use clap::Args;

use crate::{
    pricing::{PricingError, parse_currency},
    store::{CartOptions, HotelCarryOver},
};

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Settings shared by every storefront command.
#[derive(Debug, Clone, Args)]
pub struct StorefrontConfig {
    /// Directory holding the persisted cart and favourites
    #[arg(long, env = "STAGEPASS_STORAGE_DIR", default_value = ".stagepass", global = true)]
    pub storage_dir: PathBuf,

    /// Catalog file with events, tiers and hotels (JSON or YAML)
    #[arg(long, env = "STAGEPASS_CATALOG", default_value = "fixtures/catalog.yml", global = true)]
    pub catalog: PathBuf,

    /// Currency all prices are in (EUR, GBP, USD)
    #[arg(long, env = "STAGEPASS_CURRENCY", default_value = "EUR", global = true)]
    pub currency: String,

    /// What happens to a hotel when tickets for another event replace the cart
    #[arg(long, env = "STAGEPASS_HOTEL_CARRY_OVER", value_enum, default_value_t = HotelCarryOver::Keep, global = true)]
    pub hotel_carry_over: HotelCarryOver,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Cart options described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::UnknownCurrency`] if the currency is not supported.
    pub fn cart_options(&self) -> Result<CartOptions, PricingError> {
        Ok(CartOptions {
            currency: parse_currency(&self.currency)?,
            hotel_carry_over: self.hotel_carry_over,
        })
    }
}
