//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], [`health`], or [`backend`].
//! Each handler lives in its own submodule.

pub mod backend;
pub mod health;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::KeygateError;

pub async fn dispatch(cli: Cli) -> Result<(), KeygateError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        Some(Commands::Backend(args)) => backend::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  keygate v{version} \u{2014} header-augmenting reverse proxy gateway\n\n  \
         No command provided. To get started:\n\n    \
         keygate run                   Start the gateway (auto-detects ./keygate.yaml)\n    \
         keygate run -c routes.yaml    Start with a specific config file\n    \
         keygate validate routes.yaml  Check a config file\n    \
         keygate --help                See all commands and options\n"
    );
}
