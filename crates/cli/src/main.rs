//! Clementine CLI - command-line storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! clem products list --page 2
//! clem products show 3
//!
//! # Manage the cart
//! clem cart add 3 --quantity 2
//! clem cart set 3 5
//! clem cart show
//!
//! # Check out and inspect orders
//! clem checkout
//! clem orders list
//!
//! # Account and session
//! clem account register -n "Ada" -e ada@example.com -a "1 Loop Way" -p pass
//! clem account login -e ada@example.com -p pass
//! ```
//!
//! Configuration comes from the environment (see `STORE_API_BASE_URL`
//! and friends in `clementine-client`).

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

use clementine_client::config::StoreConfig;
use clementine_client::state::Storefront;

mod commands;

#[derive(Parser)]
#[command(name = "clem")]
#[command(author, version, about = "Clementine command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart's contents
    Checkout,
    /// Inspect order history
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage the account and session
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List a page of the catalog
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Page size (defaults to the configured page size)
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Show one product
    Show {
        /// Product ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        id: i64,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: i64,
    },
    /// Set a line's quantity directly (0 removes the line)
    Set {
        /// Product ID
        id: i64,

        /// New quantity
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Show one order with its products and total
    Show {
        /// Order ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register a new account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Shipping address
        #[arg(short, long)]
        address: String,
    },
    /// Log in
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in profile and order stats
    Me,
    /// Update the logged-in profile
    Update {
        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New email address
        #[arg(short, long)]
        email: Option<String>,

        /// New shipping address
        #[arg(short, long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env()?;
    let store = Storefront::new(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List { page, per_page } => {
                commands::products::list(&store, page, per_page).await?;
            }
            ProductAction::Show { id } => commands::products::show(&store, id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store),
            CartAction::Add { id, quantity } => commands::cart::add(&store, id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(&store, id),
            CartAction::Set { id, quantity } => commands::cart::set(&store, id, quantity),
            CartAction::Clear => commands::cart::clear(&store),
        },
        Commands::Checkout => commands::orders::checkout(&store).await?,
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&store).await?,
            OrderAction::Show { id } => commands::orders::show(&store, id).await?,
        },
        Commands::Account { action } => match action {
            AccountAction::Register {
                name,
                email,
                password,
                address,
            } => commands::account::register(&store, name, &email, password, address).await?,
            AccountAction::Login { email, password } => {
                commands::account::login(&store, &email, password).await?;
            }
            AccountAction::Logout => commands::account::logout(&store).await,
            AccountAction::Me => commands::account::me(&store).await?,
            AccountAction::Update {
                name,
                email,
                address,
            } => commands::account::update(&store, name, email.as_deref(), address).await?,
        },
    }

    Ok(())
}
