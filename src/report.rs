//! Run report emission.
//!
//! Two sinks, both append-only: a human-readable section per run and an
//! optional single-line JSON record for downstream tooling. Times are printed
//! as whole seconds plus the microsecond remainder.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::config::RunConfig;
use crate::pool::StageThreads;
use crate::train::FitReport;
use crate::{Error, Result};

fn secs(d: Duration) -> String {
    format!("{}.{:06}", d.as_secs(), d.subsec_micros())
}

/// Append a human-readable run summary to `path`.
pub fn append_text(path: &Path, cfg: &RunConfig, report: &FitReport) -> Result<()> {
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    let t = &report.timing;
    let total = t.total();

    writeln!(f, "==================== run ====================")?;
    writeln!(f, "layers          : {:?}", cfg.layer_sizes)?;
    writeln!(f, "epochs          : {}", cfg.epochs)?;
    writeln!(f, "learning rate   : {}", cfg.learning_rate)?;
    writeln!(f, "mini-batch size : {}", cfg.mini_batch_size)?;
    writeln!(
        f,
        "accuracy        : {}/{}",
        report.best_correct, report.test_len
    )?;
    writeln!(f, "------------------- threads -----------------")?;
    writeln!(f, "forward         : {}", cfg.threads.forward)?;
    writeln!(f, "delta           : {}", cfg.threads.delta)?;
    writeln!(f, "backprop        : {}", cfg.threads.backprop)?;
    writeln!(f, "bias            : {}", cfg.threads.bias)?;
    writeln!(f, "weight          : {}", cfg.threads.weight)?;
    writeln!(f, "-------------------- time -------------------")?;
    writeln!(
        f,
        "forward         : {} s wall, {} s cpu",
        secs(t.forward.wall),
        secs(t.forward.cpu)
    )?;
    writeln!(
        f,
        "backward        : {} s wall, {} s cpu",
        secs(t.backward.wall),
        secs(t.backward.cpu)
    )?;
    writeln!(
        f,
        "update          : {} s wall, {} s cpu",
        secs(t.update.wall),
        secs(t.update.cpu)
    )?;
    writeln!(
        f,
        "total           : {} s wall, {} s cpu",
        secs(total.wall),
        secs(total.cpu)
    )?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ReportRecord<'a> {
    layer_sizes: &'a [usize],
    epochs: usize,
    learning_rate: f64,
    mini_batch_size: usize,
    threads: StageThreads,
    best_correct: usize,
    test_len: usize,
    forward_wall_secs: f64,
    forward_cpu_secs: f64,
    backward_wall_secs: f64,
    backward_cpu_secs: f64,
    update_wall_secs: f64,
    update_cpu_secs: f64,
    total_wall_secs: f64,
    total_cpu_secs: f64,
}

/// Append one JSON record (plus newline) to `path`.
pub fn append_json(path: &Path, cfg: &RunConfig, report: &FitReport) -> Result<()> {
    let t = &report.timing;
    let total = t.total();
    let record = ReportRecord {
        layer_sizes: &cfg.layer_sizes,
        epochs: cfg.epochs,
        learning_rate: cfg.learning_rate,
        mini_batch_size: cfg.mini_batch_size,
        threads: cfg.threads,
        best_correct: report.best_correct,
        test_len: report.test_len,
        forward_wall_secs: t.forward.wall.as_secs_f64(),
        forward_cpu_secs: t.forward.cpu.as_secs_f64(),
        backward_wall_secs: t.backward.wall.as_secs_f64(),
        backward_cpu_secs: t.backward.cpu.as_secs_f64(),
        update_wall_secs: t.update.wall.as_secs_f64(),
        update_cpu_secs: t.update.cpu.as_secs_f64(),
        total_wall_secs: total.wall.as_secs_f64(),
        total_cpu_secs: total.cpu.as_secs_f64(),
    };

    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    serde_json::to_writer(&mut f, &record)
        .map_err(|e| Error::InvalidData(format!("could not encode report record: {e}")))?;
    writeln!(f)?;
    Ok(())
}
