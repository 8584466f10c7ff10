//! hermes-build CLI - Windows build orchestration for Hermes

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hermes_build::builder::{BuildContext, SystemRunner, ToolchainLocator};
use hermes_build::core::options::{resolve, OptionError};
use hermes_build::ops;
use hermes_build::util::config::{global_config_path, load_config, project_config_path};
use hermes_build::util::process::ProcessError;
use hermes_build::util::shell::Shell;

mod cli;

use cli::Cli;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "HERMES_BUILD_LOG";

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(e.kind()));
        }
    };
    init_logging(cli.verbose, cli.quiet);
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    if let Err(e) = run(&cli, &shell) {
        std::process::exit(report(&e, &shell));
    }
}

/// Help and version requests succeed; every usage error exits with 1.
fn usage_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "hermes_build=debug"
    } else if quiet {
        "hermes_build=warn"
    } else {
        "hermes_build=info"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Print `err` and pick the exit code.
fn report(err: &anyhow::Error, shell: &Shell) -> i32 {
    if let Some(invalid) = err.downcast_ref::<OptionError>() {
        eprintln!("{}", invalid);
        return 1;
    }
    shell.error(format!("{:#}", err));
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ProcessError>())
        .map_or(1, ProcessError::exit_code)
}

fn run(cli: &Cli, shell: &Shell) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let options = resolve(cli.raw_options(), &cwd)?;

    let config = load_config(
        global_config_path().as_deref(),
        &project_config_path(&options.sources_path),
    );
    let locator = ToolchainLocator::new(config.toolchain.vswhere.clone(), config.vs_version());
    let runner = SystemRunner::new(locator);
    let ctx = BuildContext::new(&options, &config, &runner, shell);

    ops::hermes_build(&ctx)?;
    Ok(())
}
