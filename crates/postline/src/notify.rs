//! Failure notifications as coloured stderr lines.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use postline_core::{ErrorKind, Notification, NotificationSink};

pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn format(&self, n: &Notification) -> String {
        if !self.color {
            return format!("! {}: {}", n.title, n.detail);
        }
        let marker = match n.kind {
            ErrorKind::Offline => "!".yellow().bold().to_string(),
            ErrorKind::ServerError(_) | ErrorKind::NetworkError => "!".red().bold().to_string(),
        };
        format!("{marker} {}: {}", n.title.bold(), n.detail.dimmed())
    }
}

impl NotificationSink for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let line = self.format(&notification);
        let _ = writeln!(io::stderr().lock(), "{line}");
    }
}
