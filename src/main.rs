//! Syncrets - copy secrets between Vault backends and JSON files.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use syncrets::cli::output;
use syncrets::cli::{execute, Cli, LogFormat};
use syncrets::error::{AuthError, ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("SYNCRETS_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("syncrets=debug")
        } else {
            EnvFilter::new("syncrets=warn")
        }
    });

    let layer = match cli.log_format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

fn hint(e: &Error) -> Option<&'static str> {
    match e {
        Error::Config(ConfigError::UnknownAlias(_)) => {
            Some("add a [vault.<alias>] table with a url to syncrets.toml")
        }
        Error::Config(ConfigError::MissingPublicKey(_)) => {
            Some("set ejson.public_key in syncrets.toml")
        }
        Error::Config(ConfigError::UnknownAuthMethod { .. }) => {
            Some("supported auth methods: token, userpass")
        }
        Error::Auth(AuthError::Prompt(_)) => {
            Some("run syncrets auth from a terminal, or set VAULT_TOKEN")
        }
        Error::Incomplete { .. } => Some("run with --verbose for details"),
        _ => None,
    }
}
