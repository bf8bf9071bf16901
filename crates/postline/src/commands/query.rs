//! `postline query`: direct access to the persisted search query.
//!
//! Works on the state file alone; no fetch is made.

use serde::Serialize;

use postline_config::JsonFileStore;
use postline_core::{SEARCH_KEY, SearchStore};

use crate::cli::{GlobalOpts, QueryArgs, QueryCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct PersistedQuery {
    query: Option<String>,
}

pub async fn handle(args: QueryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = JsonFileStore::new(config::state_path(global));

    match args.command {
        QueryCommand::Show => {
            let view = PersistedQuery {
                query: store.get(SEARCH_KEY).await?,
            };
            let out = output::render_single(
                global.output_format(),
                &view,
                |v| Ok(v.query.clone().unwrap_or_else(|| "(none)".into())),
                |v| v.query.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
        }
        QueryCommand::Set { text } => {
            store.set(SEARCH_KEY, &text).await?;
            tracing::info!(path = %store.path().display(), "query saved");
        }
        QueryCommand::Clear => {
            store.set(SEARCH_KEY, "").await?;
            tracing::info!(path = %store.path().display(), "query cleared");
        }
    }
    Ok(())
}
