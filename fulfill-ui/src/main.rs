use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use fulfill_core::calculations::{
    FreeShippingCalculator, FreeShippingInput, PickPackCalculator, PickPackInput,
    ReceivingCalculator, ReceivingInput, StandardFulfillmentCalculator, StandardFulfillmentInput,
    StorageCalculator, StorageInput,
};
use fulfill_core::models::{PackagingType, RateCard, ReceivingType, StorageType};
use fulfill_ui::app::{self, AppServices};
use fulfill_ui::models::Report;
use fulfill_ui::settings::{DEFAULT_SETTINGS_FILE, Settings};
use fulfill_ui::state::CalculatorStore;
use fulfill_ui::{csv_loader, logging, run_gui};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// 3PL fulfillment pricing calculators.
///
/// Without a subcommand the desktop app opens. The quote subcommands price
/// one calculator against the configured rate card and print the breakdown.
#[derive(Debug, Parser)]
#[command(name = "fulfill", version)]
struct Cli {
    /// Settings file. A missing file means defaults.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Database backend, overriding the settings file.
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string, e.g. `fulfillment.db` or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Rate card to price against.
    #[arg(long)]
    rate_card: Option<String>,

    /// Log level or full `EnvFilter` directive.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the desktop app (default).
    Gui,
    /// Print the active rate card.
    Rates,
    /// Quote inbound receiving.
    Receiving(ReceivingArgs),
    /// Quote pallet storage.
    Storage(StorageArgs),
    /// Quote per-order pick & pack.
    PickPack(PickPackArgs),
    /// Quote the all-in monthly standard fulfillment cost.
    Standard(StandardArgs),
    /// Find a free shipping threshold.
    FreeShipping(FreeShippingArgs),
}

#[derive(Debug, Args)]
struct ReceivingArgs {
    #[arg(long, default_value_t = 0)]
    pallets: u32,
    #[arg(long, default_value_t = 0)]
    cartons: u32,
    #[arg(long, default_value_t = 0)]
    units: u32,
    /// Book a receiving appointment.
    #[arg(long)]
    appointment: bool,
    /// standard, expedited or weekend.
    #[arg(long = "type", default_value = "standard", value_parser = parse_receiving_type)]
    receiving_type: ReceivingType,
}

#[derive(Debug, Args)]
struct StorageArgs {
    #[arg(long, default_value_t = 1)]
    positions: u32,
    /// Months in storage.
    #[arg(long, default_value_t = 1)]
    months: u32,
    #[arg(long, default_value_t = 1)]
    skus: u32,
    /// standard, climate-controlled or hazmat.
    #[arg(long = "type", default_value = "standard", value_parser = parse_storage_type)]
    storage_type: StorageType,
}

#[derive(Debug, Args)]
struct PickPackArgs {
    #[arg(long, default_value_t = 100)]
    orders: u32,
    #[arg(long, default_value = "1.5")]
    items: Decimal,
    /// poly-mailer, small-box, medium-box or large-box.
    #[arg(long, default_value = "poly-mailer", value_parser = parse_packaging_type)]
    packaging: PackagingType,
    #[arg(long)]
    special_handling: bool,
}

#[derive(Debug, Args)]
struct StandardArgs {
    /// Monthly inventory volume in cubic feet.
    #[arg(long, default_value = "100")]
    inventory: Decimal,
    #[arg(long, default_value_t = 500)]
    orders: u32,
    /// Average order weight in pounds.
    #[arg(long, default_value = "2")]
    weight: Decimal,
}

#[derive(Debug, Args)]
struct FreeShippingArgs {
    /// Product catalog CSV (`name,price,cost,sales_volume`). Enables the
    /// weighted multi-product analysis.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Single product price, ignored with --catalog.
    #[arg(long, default_value = "0")]
    price: Decimal,
    /// Single product cost, ignored with --catalog.
    #[arg(long, default_value = "0")]
    cost: Decimal,
    /// Average shipping cost per order.
    #[arg(long)]
    shipping: Decimal,
    /// Average order value.
    #[arg(long)]
    aov: Decimal,
    #[arg(long, default_value = "20")]
    target_margin: Decimal,
    #[arg(long, default_value = "2.5")]
    conversion: Decimal,
    /// Expected conversion lift in percent.
    #[arg(long, default_value = "15")]
    lift: Decimal,
    #[arg(long, default_value = "8")]
    shipping_share: Decimal,
}

fn parse_receiving_type(s: &str) -> Result<ReceivingType, String> {
    ReceivingType::parse(s).ok_or_else(|| format!("unknown receiving type '{s}'"))
}

fn parse_storage_type(s: &str) -> Result<StorageType, String> {
    StorageType::parse(s).ok_or_else(|| format!("unknown storage type '{s}'"))
}

fn parse_packaging_type(s: &str) -> Result<PackagingType, String> {
    PackagingType::parse(s).ok_or_else(|| format!("unknown packaging type '{s}'"))
}

impl Cli {
    /// Command-line flags win over the settings file.
    fn apply_overrides(
        &self,
        settings: &mut Settings,
    ) {
        if let Some(backend) = &self.backend {
            settings.db.backend = backend.clone();
        }
        if let Some(db) = &self.db {
            settings.db.connection_string = db.clone();
        }
        if let Some(card) = &self.rate_card {
            settings.rate_card = card.clone();
        }
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
    }
}

// ─── quotes ──────────────────────────────────────────────────────────────────

fn quote(
    command: Command,
    card: &RateCard,
) -> anyhow::Result<Report> {
    let report = match command {
        Command::Gui => anyhow::bail!("the desktop app is not a quote"),
        Command::Rates => Report::rate_card(card),
        Command::Receiving(args) => {
            let input = ReceivingInput {
                pallets: args.pallets,
                cartons: args.cartons,
                units: args.units,
                appointment_required: args.appointment,
                receiving_type: args.receiving_type,
            };
            let result = ReceivingCalculator::new(&card.receiving)
                .calculate(&input)
                .context("invalid receiving input")?;
            Report::receiving(&input, &result, &card.receiving)
        }
        Command::Storage(args) => {
            let input = StorageInput {
                pallet_positions: args.positions,
                storage_duration: args.months,
                sku_count: args.skus,
                storage_type: args.storage_type,
            };
            let result = StorageCalculator::new(&card.storage)
                .calculate(&input)
                .context("invalid storage input")?;
            Report::storage(&input, &result, &card.storage)
        }
        Command::PickPack(args) => {
            let input = PickPackInput {
                monthly_order_volume: args.orders,
                items_per_order: args.items,
                packaging_type: args.packaging,
                special_handling: args.special_handling,
            };
            let result = PickPackCalculator::new(&card.pick_pack)
                .calculate(&input)
                .context("invalid pick & pack input")?;
            Report::pick_pack(&input, &result, &card.pick_pack)
        }
        Command::Standard(args) => {
            let input = StandardFulfillmentInput {
                monthly_inventory_volume: args.inventory,
                monthly_order_volume: args.orders,
                average_order_weight: args.weight,
            };
            let result = StandardFulfillmentCalculator::new(&card.standard)
                .calculate(&input)
                .context("invalid standard fulfillment input")?;
            Report::standard_fulfillment(&input, &result, &card.standard)
        }
        Command::FreeShipping(args) => {
            let input = free_shipping_input(args)?;
            let result = FreeShippingCalculator::new()
                .calculate(&input)
                .context("invalid free shipping input")?;
            Report::free_shipping(&input, &result)
        }
    };
    Ok(report)
}

fn free_shipping_input(args: FreeShippingArgs) -> anyhow::Result<FreeShippingInput> {
    let mut input = FreeShippingInput {
        average_shipping_cost: args.shipping,
        target_profit_margin: args.target_margin,
        current_conversion_rate: args.conversion,
        estimated_conversion_increase: args.lift,
        average_order_value: args.aov,
        shipping_as_percent_of_revenue: args.shipping_share,
        ..FreeShippingInput::default()
    };

    match &args.catalog {
        Some(path) => {
            input.products = csv_loader::load_from_file(path)?;
            input.use_multiple_products = true;
        }
        None => {
            if let Some(product) = input.products.first_mut() {
                product.price = args.price;
                product.cost = args.cost;
            }
        }
    }
    Ok(input)
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)?;
    cli.apply_overrides(&mut settings);
    logging::init_logging(&settings.logging)?;
    debug!(?settings, "settings resolved");

    // gpui owns the main thread; persistence runs on this runtime.
    let runtime = tokio::runtime::Runtime::new().context("cannot start tokio runtime")?;
    let repo = runtime.block_on(app::connect(&settings.db))?;
    let card = runtime.block_on(app::load_rate_card(repo.as_ref(), &settings.rate_card))?;

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => {
            let store =
                runtime.block_on(CalculatorStore::load(repo.as_ref(), card.standard.clone()))?;
            let services = AppServices::new(repo, runtime.handle().clone(), card);
            info!("starting desktop app");
            run_gui(services.clone(), store);
            runtime.block_on(services.flush());
        }
        command => {
            let report = quote(command, &card)?;
            println!("{report}");
        }
    }
    Ok(())
}
