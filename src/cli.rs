use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "treatbot")]
#[command(author, version, about = "Telegram bot running a trick-or-treat code giveaway", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (webhook mode unless --polling is given)
    Run {
        /// Use long polling instead of the webhook (local development)
        #[arg(long)]
        polling: bool,
    },

    /// Load the codes file into an empty code pool and exit
    Seed {
        /// Path to the CSV file (defaults to CODES_CSV)
        #[arg(short, long)]
        csv: Option<String>,
    },

    /// Print the code pool status and exit
    Status,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
