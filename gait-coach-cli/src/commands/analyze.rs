use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use futures::future::join_all;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gait_coach::models::{AnalysisReport, AnalysisStatus, AnalysisTask, Evaluation, SummaryRecord};
use gait_coach::services::{AnalysisTaskService, JsonLinesSink, JsonLinesSource, MetricsSink};

use crate::config::Config;

#[derive(Args)]
pub struct AnalyzeCommand {
    /// Pose landmark files, one JSON frame per line
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the row and summary files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write per-frame rows
    #[arg(long, overrides_with = "no_rows")]
    rows: bool,

    /// Only write the summary
    #[arg(long, overrides_with = "rows")]
    no_rows: bool,

    /// Seconds to wait for each video
    #[arg(long, default_value = "600")]
    timeout: u64,
}

impl AnalyzeCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        check_output_names(&self.inputs)?;

        let config = Config::load(config_path)?;
        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output.directory.clone());
        let write_rows = if self.rows {
            true
        } else if self.no_rows {
            false
        } else {
            config.output.write_rows
        };

        fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let service = AnalysisTaskService::new(config.analysis.clone())?;
        let timeout = Duration::from_secs(self.timeout);

        let mut submitted = Vec::new();
        let mut failures = 0usize;
        for input in &self.inputs {
            match JsonLinesSource::open(input) {
                Ok(source) => {
                    let id = service.submit(input.display().to_string(), Box::new(source)).await;
                    submitted.push((input.clone(), id));
                }
                Err(e) => {
                    eprintln!("{} {}: {}", "✗".red(), input.display(), e);
                    failures += 1;
                }
            }
        }

        let finished = join_all(
            submitted
                .iter()
                .map(|(_, id)| service.wait(*id, timeout)),
        )
        .await;

        for ((input, _), task) in submitted.iter().zip(finished) {
            let outcome = task.and_then(|task| {
                report_task(&task, input, &output_dir, write_rows, config.output.pretty)
            });
            if let Err(e) = outcome {
                eprintln!("{} {}: {:#}", "✗".red(), input.display(), e);
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(anyhow!(
                "{} of {} videos failed",
                failures,
                self.inputs.len()
            ));
        }

        Ok(())
    }
}

fn report_task(
    task: &AnalysisTask,
    input: &Path,
    output_dir: &Path,
    write_rows: bool,
    pretty: bool,
) -> Result<()> {
    let report = match (task.status, &task.report) {
        (AnalysisStatus::Completed, Some(report)) => report,
        _ => {
            return Err(anyhow!(
                "{}",
                task.error_message
                    .clone()
                    .unwrap_or_else(|| format!("task ended as {}", task.status))
            ))
        }
    };

    let stem = output_stem(input);

    if write_rows {
        let rows_path = output_dir.join(format!("{}.rows.jsonl", stem));
        write_rows_file(&rows_path, report)?;
    }

    println!();
    println!("{}", input.display().to_string().bold());
    println!("────────────────────────────────");

    match &report.summary {
        Some(summary) => {
            let summary_path = output_dir.join(format!("{}.summary.json", stem));
            write_summary_file(&summary_path, summary, pretty)?;
            print_summary(summary, report);
            println!();
            println!("Summary written to {}", summary_path.display());
        }
        None => {
            println!(
                "{} No summary available: none of {} frames could be analyzed",
                "!".yellow(),
                report.frames_seen
            );
        }
    }

    Ok(())
}

/// Base name of the files written for `input`
fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("video")
        .to_string()
}

/// Reject inputs whose reports would overwrite each other
fn check_output_names(inputs: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    for input in inputs {
        if let Some(previous) = seen.insert(output_stem(input), input) {
            return Err(anyhow!(
                "{} and {} would both write {}.summary.json; rename one of them",
                previous.display(),
                input.display(),
                output_stem(input)
            ));
        }
    }
    Ok(())
}

fn write_rows_file(path: &Path, report: &AnalysisReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut sink = JsonLinesSink::new(BufWriter::new(file));
    for row in &report.rows {
        sink.emit_row(row)?;
    }
    sink.flush()?;
    Ok(())
}

fn write_summary_file(path: &Path, summary: &SummaryRecord, pretty: bool) -> Result<()> {
    let contents = if pretty {
        serde_json::to_string_pretty(summary)
    } else {
        serde_json::to_string(summary)
    }
    .context("Failed to serialize summary")?;

    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn label(evaluation: Evaluation) -> ColoredString {
    let text = evaluation.to_string();
    match evaluation {
        Evaluation::Good => text.green(),
        Evaluation::Satisfactory => text.yellow(),
        Evaluation::ShouldImprove => text.red(),
    }
}

fn print_summary(summary: &SummaryRecord, report: &AnalysisReport) {
    println!(
        "Frames:       {} scored, {} skipped",
        summary.total_frames, report.frames_skipped
    );
    println!("Gait cycles:  {}", summary.cycle_count);
    println!();

    let metrics = [
        ("Trunk lean", summary.trunk_lean_percentage, summary.trunk_lean_res),
        ("Front knee", summary.front_knee_percentage, summary.front_knee_res),
        ("Back knee", summary.back_knee_percentage, summary.back_knee_res),
        ("Front hip", summary.hip_percentage, summary.hip_res),
        ("Angle score", summary.angle_score, summary.angle_res),
        ("Overall", summary.overall_score, summary.overall_res),
    ];
    for (name, value, evaluation) in metrics {
        println!("{:<13} {:>6.1}%  {}", name, value, label(evaluation));
    }

    println!();
    println!(
        "{} {} ({:.1}%)  {} {} ({:.1}%)  {} {} ({:.1}%)",
        label(Evaluation::Good),
        summary.good_score,
        summary.good_percentage,
        label(Evaluation::Satisfactory),
        summary.satisfactory_score,
        summary.satisfactory_percentage,
        label(Evaluation::ShouldImprove),
        summary.should_improve_score,
        summary.should_improve_percentage,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(Path::new("runs/easy.jsonl")), "easy");
        assert_eq!(output_stem(Path::new("tempo")), "tempo");
    }

    #[test]
    fn test_duplicate_output_names_are_rejected() {
        let inputs = vec![PathBuf::from("a/run.jsonl"), PathBuf::from("b/run.jsonl")];
        let err = check_output_names(&inputs).unwrap_err();
        assert!(err.to_string().contains("run.summary.json"));

        let distinct = vec![PathBuf::from("a/run.jsonl"), PathBuf::from("a/walk.jsonl")];
        assert!(check_output_names(&distinct).is_ok());
    }
}
