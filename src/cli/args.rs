//! Command-line argument parsing for agent-stream.
//!
//! ```text
//! agent-stream [--url URL] [--session ID] <query...>
//! agent-stream --version
//! agent-stream --help
//! ```

/// Arguments of a query run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryArgs {
    /// Backend address overriding the configured one
    pub url: Option<String>,
    /// Existing session to continue; a new one is created when absent
    pub session: Option<String>,
    /// Query text, the remaining words joined by spaces
    pub query: String,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Stream a query (default)
    Query(QueryArgs),
    /// The arguments could not be understood
    Invalid(String),
}

/// Usage text printed by `--help` and on invalid arguments.
pub const USAGE: &str = "\
Usage: agent-stream [--url URL] [--session ID] <query...>

Options:
  --url URL       Backend address (default: $AGENT_STREAM_URL or http://localhost:5001)
  --session ID    Continue an existing session instead of creating one
  -h, --help      Show this help
  -V, --version   Show version";

/// Parse command-line arguments and return the appropriate command.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Examples
///
/// ```
/// use agent_stream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["agent-stream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut url = None;
    let mut session = None;
    let mut words: Vec<String> = Vec::new();
    let mut only_words = false;

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        if only_words {
            words.push(arg);
            continue;
        }
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--" => only_words = true,
            "--url" | "--session" => {
                let Some(value) = args.next() else {
                    return CliCommand::Invalid(format!("{} requires a value", arg));
                };
                if arg == "--url" {
                    url = Some(value);
                } else {
                    session = Some(value);
                }
            }
            _ if arg.starts_with("--url=") => url = Some(arg["--url=".len()..].to_string()),
            _ if arg.starts_with("--session=") => {
                session = Some(arg["--session=".len()..].to_string())
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return CliCommand::Invalid(format!("unknown option '{}'", arg))
            }
            _ => words.push(arg),
        }
    }

    let query = words.join(" ");
    if query.trim().is_empty() {
        return CliCommand::Invalid("missing query".to_string());
    }
    if session.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return CliCommand::Invalid("--session must not be empty".to_string());
    }

    CliCommand::Query(QueryArgs {
        url,
        session,
        query,
    })
}
