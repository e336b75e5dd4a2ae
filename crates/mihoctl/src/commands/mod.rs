//! Command handlers, one module per command family.

pub mod config_cmd;
pub mod connections;
pub mod proxies;
pub mod rules;
pub mod status;

use mihoctl_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a daemon-facing command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::List { group } => proxies::list(controller, group.as_deref(), global).await,
        Command::Select { group, proxy } => {
            proxies::select(controller, &group, &proxy, global).await
        }
        Command::Test(args) => proxies::test(controller, args, global).await,
        Command::TestGroup(args) => proxies::test_group(controller, args, global).await,
        Command::Connections => connections::list(controller, global).await,
        Command::Close(args) => connections::close(controller, args, global).await,
        Command::Rules => rules::list(controller, global).await,
        Command::Status => status::show(controller, global).await,
        // Handled in main before a controller exists.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
