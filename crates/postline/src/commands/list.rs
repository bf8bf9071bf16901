//! `postline list`: one fetch, one rendered view.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use postline_core::{ChannelNotifier, Controller, ControllerState, FetchStatus, RefreshTrigger};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat};
use crate::commands::open_controller;
use crate::error::CliError;
use crate::output::{self, DEFAULT_BODY_WIDTH};

pub async fn handle(args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Nobody subscribes: a failure surfaces as the command's error instead.
    let controller = open_controller(global, Arc::new(ChannelNotifier::new()))?;

    let spinner = spinner(global.quiet);
    spinner.set_message(format!("Fetching {}", controller.config().endpoint));
    let result = run(&controller, &args).await;
    spinner.finish_and_clear();
    controller.shutdown().await;

    let status = result?;
    let state = controller.state();
    if let Some(kind) = status.error_kind() {
        return Err(CliError::from_fetch(
            &controller.config().endpoint,
            state.error.as_ref(),
            kind,
        ));
    }

    let out = output::render_records(
        global.output_format(),
        state.filtered.as_slice(),
        DEFAULT_BODY_WIDTH,
    )?;
    output::print_output(&out, global.quiet);
    if !global.quiet && matches!(global.output_format(), OutputFormat::Table) {
        eprintln!("{}", summary(&state));
    }
    Ok(())
}

async fn run(controller: &Controller, args: &ListArgs) -> Result<FetchStatus, CliError> {
    let mut status = controller.start().await?;

    if let Some(ref query) = args.query {
        controller.set_query(query.clone())?;
        controller.flush_query().await?;
    }
    if args.pull {
        status = controller.refresh(RefreshTrigger::UserPull).await;
    }
    Ok(status)
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn summary(state: &ControllerState) -> String {
    let mut line = format!(
        "{} of {} records",
        state.filtered.len(),
        state.collection.len()
    );
    if !state.query.is_empty() {
        line.push_str(&format!(" matching \"{}\"", state.query));
    }
    line
}
