mod os_signal_termination;
mod result;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use os_signal_termination::OsSignal;
use result::RotaResult;
use rota_core::convert_case::Case;
use rota_core::engine::SolveParameters;
use rota_core::statistics::statistic_logging::configure_statistic_logging;
use rota_solver::config::RotaConfig;
use rota_solver::instance::Instance;
use rota_solver::scheduler::Scheduler;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about
)]
struct Args {
    /// The instance to schedule, as a TOML file with the staff, the shifts, the calendar and the
    /// requests.
    ///
    /// When no instance is given, the built-in roster of 20 staff and 12 shifts over 31 days is
    /// scheduled.
    #[clap(verbatim_doc_comment)]
    instance_path: Option<PathBuf>,

    /// A TOML file which overrides the priorities, the fairness weight and the parameters of the
    /// rules. Rules can be switched off with `enabled = false`.
    #[arg(short = 'c', long = "config", verbatim_doc_comment)]
    config_path: Option<PathBuf>,

    /// The time limit in milliseconds.
    ///
    /// When the limit is reached, the best schedule found so far is reported.
    ///
    /// Possible values: u64
    #[arg(short = 't', long = "time-limit", verbatim_doc_comment)]
    time_limit: Option<u64>,

    /// The number of search workers which run in parallel.
    ///
    /// Possible values: usize
    #[arg(long = "workers", default_value_t = 1, verbatim_doc_comment)]
    workers: usize,

    /// The seed of the random generators of the workers.
    ///
    /// Possible values: u64
    #[arg(short = 'r', long = "random-seed", default_value_t = 42, verbatim_doc_comment)]
    random_seed: u64,

    /// Enables log message output from the solver.
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,

    /// Enables logging of statistics from the solver.
    #[arg(short = 's', long = "log-statistics", verbatim_doc_comment)]
    log_statistics: bool,
}

fn configure_logging(verbose: bool, log_statistics: bool) {
    if log_statistics {
        configure_statistic_logging("%% stat:", None, Some(Case::Camel), None);
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| writeln!(buf, "% {}", record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> RotaResult<()> {
    let args = Args::parse();
    configure_logging(args.verbose, args.log_statistics);

    if rota_core::asserts::ROTA_ASSERT_LEVEL_DEFINITION >= rota_core::asserts::ROTA_ASSERT_MODERATE
    {
        warn!(
            "Potential performance degradation: the Rota assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.",
            rota_core::asserts::ROTA_ASSERT_LEVEL_DEFINITION
        );
    };

    let instance = match &args.instance_path {
        Some(path) => Instance::from_toml_file(path)?,
        None => {
            info!("No instance given, scheduling the default roster");
            Instance::default_roster()
        }
    };
    let config = match &args.config_path {
        Some(path) => RotaConfig::from_toml_file(path)?,
        None => RotaConfig::default(),
    };

    let parameters = SolveParameters {
        time_limit: args.time_limit.map(Duration::from_millis),
        workers: args.workers.max(1),
        random_seed: args.random_seed,
        ..SolveParameters::default()
    };
    if parameters.time_limit.is_none() {
        info!("No time limit given, searching until the schedule is proven optimal");
    }

    let scheduler = Scheduler::new(instance, &config)?;
    let rota = scheduler.solve(parameters, OsSignal::install())?;
    let instance = scheduler.instance();

    println!("{}", rota.schedule.roster(instance));
    println!("{}", rota.schedule.summary(instance));
    println!("Penalties:\n{}", rota.report);
    println!("Status: {}", rota.status);
    Ok(())
}
