//! Tally CLI Config

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Where state and seed catalogs live.
#[derive(Debug, Args)]
pub struct StateConfig {
    /// JSON state file, created from the seed catalog when absent
    #[arg(long, env = "TALLY_STATE", default_value = "tally.json", global = true)]
    pub state: PathBuf,

    /// Fixture directory containing `catalog/<name>.yml`
    #[arg(long, env = "TALLY_FIXTURES", default_value = "fixtures", global = true)]
    pub fixtures: PathBuf,

    /// Seed catalog name
    #[arg(long, default_value = "default", global = true)]
    pub catalog: String,
}

#[derive(Debug, Parser)]
#[command(name = "tally", about = "Shopping cart pricing", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub state: StateConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a fresh state file from the seed catalog
    Init {
        /// Replace an existing state file
        #[arg(long)]
        force: bool,
    },

    /// List products with remaining stock
    Products {
        /// Case-insensitive filter on name or description
        #[arg(long)]
        search: Option<String>,
    },

    /// Show the cart and its totals
    Cart,

    /// Add one unit of a product to the cart
    Add {
        /// Product id
        id: String,
    },

    /// Set a line's quantity; zero or below removes it
    Update {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a product's line from the cart
    Remove {
        /// Product id
        id: String,
    },

    /// List coupons
    Coupons,

    /// Select a coupon
    Apply {
        /// Coupon code
        code: String,
    },

    /// Deselect the current coupon
    Unapply,

    /// Add a coupon to the catalog
    CouponAdd {
        /// Display name
        name: String,

        /// Unique code
        code: String,

        /// Discount kind
        #[arg(value_enum)]
        kind: DiscountKind,

        /// Amount in minor units, or a whole percentage
        value: u64,
    },

    /// Remove a coupon from the catalog
    CouponDelete {
        /// Coupon code
        code: String,
    },

    /// Complete the order and empty the cart
    Checkout,
}

/// Coupon discount kind on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DiscountKind {
    /// Fixed amount off
    Amount,

    /// Whole percentage off
    Percentage,
}
