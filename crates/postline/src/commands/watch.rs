//! `postline watch`: interactive line-mode session.
//!
//! Every stdin line replaces the search query. `:r` pulls a refresh in the
//! background, `:q` (or EOF / Ctrl-C) commits any pending edit and exits.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use postline_core::{
    Controller, ControllerState, FetchStatus, RecordSnapshot, RefreshTrigger, StateStream,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::commands::open_controller;
use crate::error::CliError;
use crate::notify::TerminalNotifier;
use crate::output;

enum Input {
    Query(String),
    Refresh,
    Quit,
}

fn parse_line(line: &str) -> Input {
    match line.trim() {
        ":q" | ":quit" => Input::Quit,
        ":r" | ":refresh" => Input::Refresh,
        _ => Input::Query(line.trim_end_matches(['\r', '\n']).to_owned()),
    }
}

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());
    let controller = open_controller(global, Arc::new(TerminalNotifier::new(color)))?;

    let view = WatchView {
        format: global.output_format(),
        body_width: args.body_width,
        quiet: global.quiet,
        color,
        last: None,
    };
    let cancel = CancellationToken::new();
    let renderer = tokio::spawn(render_loop(controller.subscribe(), view, cancel.clone()));

    if !global.quiet {
        eprintln!("Type to search. :r refreshes, :q quits.");
    }

    let result = input_loop(&controller).await;

    controller.shutdown().await;
    cancel.cancel();
    let _ = renderer.await;
    result
}

async fn input_loop(controller: &Controller) -> Result<(), CliError> {
    controller.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Input::Quit => break,
                    Input::Refresh => {
                        tokio::spawn(controller.refresh(RefreshTrigger::UserPull));
                    }
                    Input::Query(query) => controller.set_query(query)?,
                }
            }
        }
    }

    controller.flush_query().await?;
    Ok(())
}

// ── Rendering ────────────────────────────────────────────────────────

/// Renders the filtered view whenever the status or the visible
/// records change. Query-only edits render nothing until committed.
struct WatchView {
    format: OutputFormat,
    body_width: usize,
    quiet: bool,
    color: bool,
    last: Option<(FetchStatus, RecordSnapshot)>,
}

impl WatchView {
    fn render_if_changed(&mut self, state: &ControllerState) {
        if let Some((status, ref filtered)) = self.last {
            if status == state.status && Arc::ptr_eq(filtered, &state.filtered) {
                return;
            }
        }
        self.last = Some((state.status, Arc::clone(&state.filtered)));
        self.render(state);
    }

    fn render(&self, state: &ControllerState) {
        if !self.quiet {
            eprintln!("{}", self.status_line(state));
        }
        if !state.has_collection() {
            return;
        }
        match output::render_records(self.format, state.filtered.as_slice(), self.body_width) {
            Ok(out) => output::print_output(&out, self.quiet),
            Err(e) => eprintln!("render failed: {e}"),
        }
    }

    fn status_line(&self, state: &ControllerState) -> String {
        let mut line = format!(
            "── {} · {} of {} records",
            state.status.label(),
            state.filtered.len(),
            state.collection.len()
        );
        if !state.query.is_empty() {
            line.push_str(&format!(" · \"{}\"", state.query));
        }
        if let Some(at) = state.last_fetched_at {
            let age = (Utc::now() - at).to_std().unwrap_or_default();
            let age = Duration::from_secs(age.as_secs());
            line.push_str(&format!(" · fetched {} ago", humantime::format_duration(age)));
        }
        if self.color {
            match state.status {
                FetchStatus::Failed(_) => line.red().to_string(),
                FetchStatus::Succeeded => line.green().to_string(),
                _ => line.dimmed().to_string(),
            }
        } else {
            line
        }
    }
}

async fn render_loop(mut stream: StateStream, mut view: WatchView, cancel: CancellationToken) {
    view.render_if_changed(stream.current());

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            next = stream.changed() => match next {
                Some(state) => view.render_if_changed(&state),
                None => break,
            },
        }
    }

    view.render_if_changed(&stream.latest());
}
