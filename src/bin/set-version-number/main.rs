//! set-version-number - publish pipeline versions to Azure Pipelines
//!
//! Reads `MustPublish`, `Build_SourceBranch`, `Build_BuildNumber` and
//! `Build_SourceVersion`, then prints the logging commands that set the
//! `semanticVersion` and `fileVersion` output variables.

use tracing_subscriber::EnvFilter;

use hermes_build::ops::ci_version::{
    compute_version, pipeline_commands, pipeline_error, CiEnvironment, CiVersionError,
};

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "HERMES_BUILD_LOG";

fn main() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("hermes_build=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run() {
        println!("{}", pipeline_error(&e));
        std::process::exit(1);
    }
}

fn run() -> Result<(), CiVersionError> {
    let env = CiEnvironment::from_lookup(|name| std::env::var(name).ok())?;
    tracing::debug!("Build number {}", env.build_number);
    println!("MustPublish: {}", env.must_publish);

    let version = compute_version(&env)?;
    println!("Semantic Version: {}", version.semantic_version);
    println!("Windows File Version: {}", version.file_version);

    for line in pipeline_commands(&version, env.must_publish) {
        println!("{}", line);
    }
    Ok(())
}
