//! Command handlers.

pub mod config_cmd;
pub mod list;
pub mod query;
pub mod watch;

use std::sync::Arc;

use postline_config::JsonFileStore;
use postline_core::{Controller, NotificationSink};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a command that needs a controller.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => list::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Query(args) => query::handle(args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not use a controller".into(),
        }),
    }
}

/// Build a controller for the resolved endpoint, persisting the search
/// query to the configured state file.
pub(crate) fn open_controller(
    global: &GlobalOpts,
    notifier: Arc<dyn NotificationSink>,
) -> Result<Controller, CliError> {
    let controller_config = config::build_controller_config(global)?;
    let store = Arc::new(JsonFileStore::new(config::state_path(global)));
    tracing::debug!(
        endpoint = %controller_config.endpoint,
        state = %store.path().display(),
        "opening controller"
    );
    Ok(Controller::for_endpoint(controller_config, store, notifier)?)
}
