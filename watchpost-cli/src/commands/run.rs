//! `watchpost run` command handler

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use watchpost_core::config::WatchpostConfig;
use watchpost_core::types::RunOutcome;
use watchpost_triage::TriagePipelineBuilder;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::logging;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Loads configuration, builds the triage pipeline and performs a single
/// fetch / classify / escalate / notify cycle. Ctrl-C cancels the run:
/// an in-flight source fetch aborts, in-flight enrichments degrade to
/// raw-description alerts.
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    log_level_override: Option<&str>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let mut config = WatchpostConfig::load(config_path)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    if let Some(level) = log_level_override {
        config.general.log_level = level.to_owned();
    }
    if args.no_escalation {
        config.escalation.enabled = false;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        config.escalation.max_concurrency = max_concurrency;
    }
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    logging::init_tracing(&config.general)?;
    watchpost_core::metrics::describe_all();

    info!(config = %config_path.display(), "starting triage run");

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling run");
            signal_cancel.cancel();
        }
    });
    if let Some(secs) = args.timeout_secs {
        let deadline_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
            tracing::warn!(secs, "run deadline reached, cancelling");
            deadline_cancel.cancel();
        });
    }

    let pipeline = TriagePipelineBuilder::from_config(&config)?
        .cancellation(cancel)
        .build()?;

    let outcome = pipeline.run().await?;
    writer.render(&RunReport::from(outcome))?;

    Ok(())
}

/// Triage run result report.
#[derive(Serialize)]
pub struct RunReport {
    /// Short outcome label ("clean" or "anomalies_handled").
    pub outcome: String,
    /// Number of anomalies that produced an alert.
    pub anomalies_handled: usize,
}

impl From<RunOutcome> for RunReport {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Clean => Self {
                outcome: "clean".to_owned(),
                anomalies_handled: 0,
            },
            RunOutcome::AnomaliesHandled(count) => Self {
                outcome: "anomalies_handled".to_owned(),
                anomalies_handled: count,
            },
        }
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Triage Run Complete")?;
        if self.anomalies_handled == 0 {
            writeln!(w, "  Result: {}", "CLEAN".green().bold())?;
        } else {
            writeln!(
                w,
                "  Result: {} ({} alerts sent)",
                "ANOMALIES DETECTED".red().bold(),
                self.anomalies_handled
            )?;
        }
        Ok(())
    }
}
