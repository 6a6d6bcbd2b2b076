use agent_stream::cli::{handle_query_command, parse_args, version_string, CliCommand, USAGE};

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Log to stderr so printed events stay clean on stdout.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let args = match parse_args(std::env::args()) {
        CliCommand::Version => {
            println!("{}", version_string());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(reason) => {
            eprintln!("Error: {}\n\n{}", reason, USAGE);
            std::process::exit(2);
        }
        CliCommand::Query(args) => args,
    };

    color_eyre::install()?;
    init_logging();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(handle_query_command(args))
}
