use clap::{Args, Parser, Subcommand};
use flight_edit::Flight;

#[derive(Debug, Parser)]
#[command(name = "flight-edit")]
#[command(about = "Edit and save flight records")]
pub struct Cli {
    /// Log debug output, including settled form values
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a flight into the form and save it
    Save {
        #[command(flatten)]
        flight: FlightArgs,
        /// Save to a local in-memory store instead of the flight API
        #[arg(long)]
        dev: bool,
    },
    /// Report per-field validity without saving
    Validate {
        #[command(flatten)]
        flight: FlightArgs,
    },
    /// Print config path and create default file if missing
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct FlightArgs {
    #[arg(long, default_value_t = 0)]
    pub id: i64,
    #[arg(long, default_value = "")]
    pub from: String,
    #[arg(long, default_value = "")]
    pub to: String,
    /// Encoded timestamp, e.g. 2024-03-01T08:15:00.0000000+01:00
    #[arg(long, default_value = "")]
    pub date: String,
}

impl From<FlightArgs> for Flight {
    fn from(args: FlightArgs) -> Self {
        Flight::new(args.id, args.from, args.to, args.date)
    }
}
