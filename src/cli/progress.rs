//! CLI progress callback with a percentage bar and styled output

use crate::cli::style::{Stream, Stylize, bang, check, cross, hyperlink_url, progress_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use qpr_contrib::contribute::{BatchStatus, Phase, ProgressCallback};
use qpr_contrib::error::Error;
use qpr_contrib::types::PullRequest;

/// CLI progress callback
///
/// Draws a percentage bar on stderr when it is a terminal; lines are printed
/// above the bar so they survive redraws.
pub struct CliProgress {
    bar: Option<ProgressBar>,
}

impl CliProgress {
    /// Progress with a bar, if the terminal can show one
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(progress_style());
        Self {
            bar: (!bar.is_hidden()).then_some(bar),
        }
    }

    /// Progress that only prints lines
    pub const fn plain() -> Self {
        Self { bar: None }
    }

    /// Remove the bar once the run is over
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn line(&self, text: String) {
        match &self.bar {
            Some(bar) => bar.println(text),
            None => println!("{text}"),
        }
    }

    fn status(&self, text: String) {
        if let Some(bar) = &self.bar {
            bar.set_message(text);
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        self.status(phase.to_string());
        if phase != Phase::Complete {
            self.line(format!("{}...", phase.to_string().emphasis()));
        }
    }

    async fn on_percent(&self, percent: u8) {
        if let Some(bar) = &self.bar {
            bar.set_position(u64::from(percent));
        }
    }

    async fn on_batch(&self, index: usize, total: usize, status: BatchStatus) {
        let label = format!("batch {}/{total}", index + 1);
        match &status {
            BatchStatus::Started => self.status(format!("Sending {label}")),
            BatchStatus::Success => {
                self.line(format!("  {} Uploaded {}", check(), label.accent()));
            }
            BatchStatus::Failed(msg) => {
                self.line(format!(
                    "  {} {} {}",
                    cross(),
                    label.accent().for_stderr(),
                    msg.error()
                ));
            }
        }
    }

    async fn on_file_uploaded(&self, path: &str, uploaded: usize, total: usize) {
        self.line(format!(
            "  {} {} {}",
            check(),
            path,
            format!("({uploaded}/{total})").muted()
        ));
    }

    async fn on_pr_created(&self, pr: &PullRequest) {
        let pr_num = format!("#{}", pr.number);
        self.line(format!("  {} Opened PR {}", check(), pr_num.accent()));
        self.line(format!("    {}", hyperlink_url(Stream::Stdout, &pr.html_url)));
    }

    async fn on_error(&self, err: &Error) {
        let text = format!("{} {}: {}", bang(), "error".error(), err.user_message());
        match &self.bar {
            Some(bar) => bar.println(text),
            None => eprintln!("{text}"),
        }
    }

    async fn on_message(&self, message: &str) {
        self.line(message.to_string());
    }
}
