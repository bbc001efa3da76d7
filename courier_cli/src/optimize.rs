use std::{fs::File, io::BufWriter, path::PathBuf};

use clap::Args;
use jiff::SignedDuration;
use courier_optimizer::{
    dispatch::optimizer::{DispatchParams, Optimizer},
    json::{plan::JsonDispatchPlan, types::DispatchInput},
    problem::{kmh::Kmh, vehicle_profile::VehicleProfile},
    routing::solver_params::{SolverParams, Termination, Threads},
};
use tracing::info;

use crate::{parsers, summary};

#[derive(Args)]
pub struct OptimizeArgs {
    /// Dispatch input JSON file
    #[arg(short, long, env = "COURIER_INPUT")]
    input: PathBuf,

    /// Where to write the plan, stdout when missing
    #[arg(short, long, env = "COURIER_OUTPUT")]
    output: Option<PathBuf>,

    /// Fail when an input entry cannot be matched
    #[arg(long, env = "COURIER_STRICT")]
    strict: bool,

    /// Budget of a single route generation (e.g., "5s", "PT1M", "30")
    #[arg(short, long, value_parser = parsers::parse_duration, default_value = "5s", env = "COURIER_TIMEOUT")]
    timeout: SignedDuration,

    #[arg(long, default_value_t = 10_000, env = "COURIER_MAX_ITERATIONS")]
    max_iterations: usize,

    /// Solver threads, all available cores when missing
    #[arg(short = 'j', long, env = "COURIER_THREADS")]
    threads: Option<usize>,

    /// Time spent at every stop
    #[arg(long, value_parser = parsers::parse_duration, default_value = "30m", env = "COURIER_SERVICE_TIME")]
    service_time: SignedDuration,

    #[arg(long, default_value_t = 30, env = "COURIER_PUBLIC_CAPACITY")]
    public_capacity: u32,

    /// km/h
    #[arg(long, default_value_t = 30.0, env = "COURIER_PUBLIC_SPEED")]
    public_speed: f64,
}

impl OptimizeArgs {
    fn params(&self) -> Result<DispatchParams, anyhow::Error> {
        let public_speed = Kmh::new(self.public_speed);
        if !public_speed.is_valid() {
            anyhow::bail!("public speed must be positive, got {}", self.public_speed);
        }

        if self.service_time.is_negative() || self.service_time > SignedDuration::from_hours(24) {
            anyhow::bail!("service time must lie within a day, got {}", self.service_time);
        }

        Ok(DispatchParams {
            service_time: self.service_time,
            public_profile: VehicleProfile::new(self.public_capacity, public_speed),
            strict: self.strict,
            solver: SolverParams {
                termination: Termination {
                    max_duration: self.timeout,
                    max_iterations: self.max_iterations,
                },
                threads: match self.threads {
                    Some(1) => Threads::Single,
                    Some(threads) => Threads::Multi(threads),
                    None => Threads::Auto,
                },
            },
        })
    }
}

pub fn run(args: OptimizeArgs) -> Result<(), anyhow::Error> {
    info!("Optimizing {:?}", args.input);

    let params = args.params()?;
    let input = DispatchInput::from_file(&args.input)?;

    info!(
        drivers = input.drivers.len(),
        records = input.num_records(),
        "Loaded dispatch input"
    );

    let optimizer = Optimizer::new(params.clone())?;
    let plan = optimizer.run_input(&input)?;
    let json = JsonDispatchPlan::from_plan(&plan, params.service_time);

    eprintln!("{}", summary::routes_table(&json));

    match &args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &json)?;
            info!("Plan written to {:?}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&json)?),
    }

    Ok(())
}
