//! Tally CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::Parser;
use jiff::Timestamp;
use tally::{
    coupons::{Coupon, CouponCode, CouponDiscount, CouponError},
    fixtures::{Catalog, FixtureError},
    products::{ProductId, search},
    receipt::{self, ReceiptError},
    session::{Session, SessionError},
    store::{self, StoreError},
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::util::TryInitError;

use crate::config::{Cli, Commands, DiscountKind, StateConfig};

mod config;
mod observability;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to load seed catalog: {0}")]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to install logger: {0}")]
    Logging(#[from] TryInitError),

    #[error("State file {0} already exists; pass --force to replace it")]
    AlreadyInitialised(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _written = writeln!(io::stderr(), "{error}");

            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    observability::init(&cli.logging)?;

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Init { force } => init(&cli.state, force, &mut out),
        Commands::Products { search: term } => {
            let session = open(&cli.state)?;
            let products = search(session.products(), term.as_deref().unwrap_or_default());

            receipt::write_products(&mut out, &session, &products)?;

            Ok(())
        }
        Commands::Cart => {
            receipt::write_cart(&mut out, &open(&cli.state)?)?;

            Ok(())
        }
        Commands::Add { id } => mutate(&cli.state, &mut out, |session| {
            session.add_to_cart(&ProductId::new(id))
        }),
        Commands::Update { id, quantity } => mutate(&cli.state, &mut out, |session| {
            session.update_quantity(&ProductId::new(id), quantity)
        }),
        Commands::Remove { id } => mutate(&cli.state, &mut out, |session| {
            Ok(session.remove_from_cart(&ProductId::new(id)))
        }),
        Commands::Coupons => {
            receipt::write_coupons(&mut out, &open(&cli.state)?)?;

            Ok(())
        }
        Commands::Apply { code } => mutate(&cli.state, &mut out, |session| {
            session.apply_coupon(&CouponCode::new(code))
        }),
        Commands::Unapply => mutate(&cli.state, &mut out, |session| Ok(session.clear_coupon())),
        Commands::CouponAdd {
            name,
            code,
            kind,
            value,
        } => {
            let discount = match kind {
                DiscountKind::Amount => CouponDiscount::Amount(value),
                DiscountKind::Percentage => CouponDiscount::percentage(value)?,
            };

            let session = open(&cli.state)?.add_coupon(Coupon::new(name, code, discount))?;

            store::save(&cli.state.state, &session)?;
            receipt::write_coupons(&mut out, &session)?;

            Ok(())
        }
        Commands::CouponDelete { code } => {
            let session = open(&cli.state)?.delete_coupon(&CouponCode::new(code));

            store::save(&cli.state.state, &session)?;
            receipt::write_coupons(&mut out, &session)?;

            Ok(())
        }
        Commands::Checkout => checkout(&cli.state, &mut out),
    }
}

fn init(config: &StateConfig, force: bool, out: &mut impl Write) -> Result<(), CliError> {
    if !force && config.state.exists() {
        return Err(CliError::AlreadyInitialised(
            config.state.display().to_string(),
        ));
    }

    let session = Catalog::load(&config.fixtures, &config.catalog)?.into_session();

    store::save(&config.state, &session)?;

    info!(state = %config.state.display(), catalog = %config.catalog, "state initialised");

    writeln!(
        out,
        "Initialised {} with {} products and {} coupons",
        config.state.display(),
        session.products().len(),
        session.coupons().len()
    )?;

    Ok(())
}

/// Load the state file, seeding it from the catalog on first use.
fn open(config: &StateConfig) -> Result<Session, CliError> {
    if let Some(session) = store::load(&config.state)? {
        return Ok(session);
    }

    info!(catalog = %config.catalog, "no state file, seeding from catalog");

    Ok(Catalog::load(&config.fixtures, &config.catalog)?.into_session())
}

fn mutate(
    config: &StateConfig,
    out: &mut impl Write,
    change: impl FnOnce(&Session) -> Result<Session, SessionError>,
) -> Result<(), CliError> {
    let session = change(&open(config)?)?;

    store::save(&config.state, &session)?;
    receipt::write_cart(out, &session)?;

    Ok(())
}

fn checkout(config: &StateConfig, out: &mut impl Write) -> Result<(), CliError> {
    let session = open(config)?;

    if session.cart().is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    let (session, order) = session.complete_order(Timestamp::now())?;

    store::save(&config.state, &session)?;
    receipt::write_order(out, &order)?;

    Ok(())
}
