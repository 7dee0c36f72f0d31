//! Reporter: projects snapshots onto a live display

use crate::Snapshot;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt::Write as _;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const STARTING_MESSAGE: &str = "Starting attack...";
pub const RUNNING_MESSAGE: &str = "Attack continues...";
pub const FINISHED_MESSAGE: &str = "Attack finished.";

/// Render a snapshot as one `T: <target>, R: <requests>, E: <errors>` line
/// per target, sorted by target
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut block = String::new();
    for (target, counts) in snapshot.sorted() {
        let _ = writeln!(block, "T: {}, R: {}, E: {}", target, counts.requests, counts.errors);
    }
    block
}

/// Display surface driven by the [`Reporter`]
pub trait ReportSink: Send {
    /// Called once before any snapshot
    fn started(&mut self);

    /// Replace the displayed block with `block`, rendered from `snapshot`
    fn update(&mut self, snapshot: &Snapshot, block: &str);

    /// Called once after the snapshot stream closed
    fn finished(&mut self);
}

/// Consumes snapshots until the stream closes.
///
/// Performs no aggregation of its own.
pub struct Reporter<S> {
    snapshots: mpsc::Receiver<Snapshot>,
    sink: S,
    cancel: CancellationToken,
}

impl<S: ReportSink> Reporter<S> {
    pub fn new(snapshots: mpsc::Receiver<Snapshot>, sink: S, cancel: CancellationToken) -> Self {
        Self {
            snapshots,
            sink,
            cancel,
        }
    }

    /// Run until the snapshot stream closes and hand the sink back
    pub async fn run(mut self) -> S {
        self.sink.started();

        loop {
            tokio::select! {
                biased;
                snapshot = self.snapshots.recv() => match snapshot {
                    Some(snapshot) => self.show(&snapshot),
                    None => break,
                },
                _ = self.cancel.cancelled() => {
                    // Shutdown observed; render whatever the aggregator still flushes
                    while let Some(snapshot) = self.snapshots.recv().await {
                        self.show(&snapshot);
                    }
                    break;
                }
            }
        }

        self.sink.finished();
        info!("Reporter stopped");
        self.sink
    }

    fn show(&mut self, snapshot: &Snapshot) {
        let block = render_snapshot(snapshot);
        self.sink.update(snapshot, &block);
    }
}

/// Spinner with the latest table redrawn in place underneath.
///
/// Draws on stdout; stderr belongs to the log output.
pub struct TerminalSink {
    spinner: Option<ProgressBar>,
    draw_target: Option<ProgressDrawTarget>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stdout())
    }

    pub fn with_draw_target(draw_target: ProgressDrawTarget) -> Self {
        Self {
            spinner: None,
            draw_target: Some(draw_target),
        }
    }

    /// Table block currently shown under the spinner
    pub fn message(&self) -> Option<String> {
        self.spinner.as_ref().map(|spinner| spinner.message())
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for TerminalSink {
    fn started(&mut self) {
        let draw_target = self
            .draw_target
            .take()
            .unwrap_or_else(ProgressDrawTarget::stdout);
        let spinner = ProgressBar::with_draw_target(None, draw_target);
        let style = ProgressStyle::with_template("{spinner:.green} {prefix}\n{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_prefix(STARTING_MESSAGE);
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    fn update(&mut self, snapshot: &Snapshot, block: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_prefix(format!(
                "{} window #{} closed {}",
                RUNNING_MESSAGE,
                snapshot.window(),
                snapshot.closed_at().format("%H:%M:%S")
            ));
            spinner.set_message(block.trim_end().to_string());
        }
    }

    fn finished(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            // Leave the last table on screen
            spinner.finish();
        }
        println!("{}", FINISHED_MESSAGE);
    }
}

/// Appends every block to a writer; for pipes and log capture
pub struct PlainSink<W> {
    out: W,
}

impl PlainSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> PlainSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to write report");
        }
    }
}

impl<W: Write + Send> ReportSink for PlainSink<W> {
    fn started(&mut self) {
        self.emit(&format!("{}\n", STARTING_MESSAGE));
    }

    fn update(&mut self, snapshot: &Snapshot, block: &str) {
        let header = format!(
            "-- window #{} ({}){}\n",
            snapshot.window(),
            snapshot.closed_at().to_rfc3339(),
            if snapshot.is_final() { " final" } else { "" }
        );
        self.emit(&header);
        self.emit(block);
    }

    fn finished(&mut self) {
        self.emit(&format!("{}\n", FINISHED_MESSAGE));
    }
}
