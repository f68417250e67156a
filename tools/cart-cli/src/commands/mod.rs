//! CLI command implementations.

pub mod cart;
pub mod config;

use clap::{Args, Subcommand};
use turbo_cart::ProductId;

/// Arguments for the `add` and `remove` commands.
#[derive(Args)]
pub struct ProductArgs {
    /// Product ID
    pub product_id: ProductId,
}

/// Arguments for the `update` command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Product ID
    pub product_id: ProductId,

    /// New quantity; zero or less leaves the cart unchanged
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,
}

/// Arguments for the `config` command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new config file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}
