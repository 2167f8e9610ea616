use clap::{Parser, Subcommand};
use presswork_app::{config::LoggingConfig, observability};

mod quote;
mod signature;

#[derive(Debug, Parser)]
#[command(name = "presswork", about = "Presswork CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a product line and show the order totals it would produce
    Quote(quote::QuoteArgs),

    /// Check a payment provider signature
    VerifySignature(signature::VerifySignatureArgs),
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), String> {
        observability::init(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Quote(args) => quote::run(args),
            Commands::VerifySignature(args) => signature::run(&args),
        }
    }
}
