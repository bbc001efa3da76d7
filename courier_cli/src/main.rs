use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::optimize::OptimizeArgs;

mod optimize;
mod parsers;
mod summary;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, env = "COURIER_DEBUG")]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plans in-house and public routes for a dispatch input file
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
    /// Prints the JSON schema of the dispatch input
    Schema {
        /// Print the schema of the produced plan instead
        #[arg(long)]
        plan: bool,
    },
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Optimize { args } => optimize::run(args)?,
        Commands::Schema { plan } => {
            let schema = if plan {
                courier_optimizer::json::schema::generate_plan_json_schema()?
            } else {
                courier_optimizer::json::schema::generate_json_schema()?
            };
            println!("{schema}");
        }
    }

    Ok(())
}
