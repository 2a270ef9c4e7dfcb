use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use arrhythmia_rs::pipeline::defaults::{load_onset_table, BeatTable, Hdf5RecordReader};
use arrhythmia_rs::{
    build_report, diagnose, fuse_scores, read_manifest, write_beat_artifact,
    write_event_artifact, AnalysisConfig, AnalysisError, BatchPipelineBuilder,
    ExtractionConfig, FiducialSource, ScoreAccumulator, CANONICAL_CLASS_NAMES,
};

/// Record names are processed in bounded chunks so progress stays visible
/// and aggregate memory stays proportional to one chunk of segments.
const RECORD_CHUNK: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Beat-centered extraction with template scoring.
    Extract,
    /// Event-onset window extraction (no scoring).
    Events,
    /// Fuse two classifier score matrices into the diagnosis report.
    Analyze,
}

#[derive(Debug, Parser)]
#[command(name = "batch_report")]
#[command(about = "Batch ECG segment extraction, template scoring, and statistical diagnosis")]
struct Args {
    #[arg(long, value_enum)]
    mode: Mode,
    /// UTF-8 manifest, one record name per line (extract/events modes).
    #[arg(long, env = "ARRHYTHMIA_MANIFEST")]
    manifest: Option<PathBuf>,
    /// Directory of per-record HDF5 containers (extract/events modes).
    #[arg(long, env = "ARRHYTHMIA_RECORDS_DIR")]
    records_dir: Option<PathBuf>,
    /// Template library container (extract mode; omit to skip scoring).
    #[arg(long, env = "ARRHYTHMIA_TEMPLATES")]
    templates: Option<PathBuf>,
    /// JSON table of precomputed beat indices per record (extract mode).
    #[arg(long)]
    beats: Option<PathBuf>,
    /// JSON table of event-onset seconds per record (events mode).
    #[arg(long)]
    onsets: Option<PathBuf>,
    /// Arrhythmia classifier output matrix (analyze mode).
    #[arg(long)]
    arr_scores: Option<PathBuf>,
    /// Binary classifier output matrix (analyze mode).
    #[arg(long)]
    bin_scores: Option<PathBuf>,
    /// Optional JSON array of heart-rate samples for the rate flags.
    #[arg(long)]
    rates: Option<PathBuf>,
    #[arg(long, env = "ARRHYTHMIA_OUT")]
    out: PathBuf,
    #[arg(long, default_value_t = ExtractionConfig::DEFAULT_TARGET_RATE_HZ)]
    fs_target: f64,
    #[arg(long, default_value_t = ExtractionConfig::DEFAULT_PRE_SEC)]
    pre_sec: f64,
    #[arg(long, default_value_t = ExtractionConfig::DEFAULT_POST_SEC)]
    post_sec: f64,
    #[arg(long, default_value_t = 0)]
    channel: usize,
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_CONFIDENCE_LEVEL)]
    confidence: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        tracing::error!(error = %err, "run failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AnalysisError> {
    match args.mode {
        Mode::Extract => run_extraction(args, false),
        Mode::Events => run_extraction(args, true),
        Mode::Analyze => run_analysis(args),
    }
}

fn run_extraction(args: Args, events: bool) -> Result<(), AnalysisError> {
    let manifest = require(&args.manifest, "--manifest")?;
    let records_dir = require(&args.records_dir, "--records-dir")?;
    let names = read_manifest(manifest)?;
    tracing::info!(records = names.len(), "manifest loaded");

    let fiducials = if events {
        let onsets = require(&args.onsets, "--onsets")?;
        FiducialSource::OnsetSeconds(load_onset_table(onsets)?)
    } else {
        let beats = require(&args.beats, "--beats")?;
        FiducialSource::Detector(Box::new(BeatTable::from_json_file(beats)?))
    };

    let config = ExtractionConfig {
        fs_target_hz: args.fs_target,
        pre_sec: args.pre_sec,
        post_sec: args.post_sec,
        channel_index: args.channel,
    };
    let segment_len = config.target_len();

    let mut builder = BatchPipelineBuilder::new(config)
        .with_reader(Box::new(Hdf5RecordReader::new(records_dir)))
        .with_fiducial_source(fiducials);
    if let Some(templates) = &args.templates {
        builder = builder.with_template_library_path(templates);
    }
    let pipeline = builder.build()?;

    let bar = progress_bar(names.len() as u64, "records");
    let mut segments = Vec::new();
    let mut failed = 0usize;
    for chunk in names.chunks(RECORD_CHUNK) {
        let output = pipeline.run(chunk);
        failed += output.records_failed;
        segments.extend(output.segments);
        bar.inc(chunk.len() as u64);
    }
    bar.finish_and_clear();

    if events {
        write_event_artifact(&args.out, &segments)?;
    } else {
        write_beat_artifact(&args.out, &segments, segment_len)?;
    }
    tracing::info!(
        segments = segments.len(),
        failed_records = failed,
        out = %args.out.display(),
        "extraction run complete"
    );
    Ok(())
}

fn run_analysis(args: Args) -> Result<(), AnalysisError> {
    let arr_path = require(&args.arr_scores, "--arr-scores")?;
    let bin_path = require(&args.bin_scores, "--bin-scores")?;
    let config = AnalysisConfig {
        batch_size: args.batch_size,
        confidence_level: args.confidence,
    };
    config.validate()?;

    let arrhythmia_rows = read_score_matrix(arr_path)?;
    let binary_rows = read_score_matrix(bin_path)?;
    let fused = fuse_scores(&arrhythmia_rows, &binary_rows)?;

    let bar = progress_bar(fused.len() as u64, "rows");
    let mut accumulator = ScoreAccumulator::new();
    for chunk in fused.chunks(config.batch_size) {
        accumulator.accumulate(chunk)?;
        bar.inc(chunk.len() as u64);
    }
    bar.finish_and_clear();

    if accumulator.class_count() != CANONICAL_CLASS_NAMES.len() {
        return Err(AnalysisError::InvalidInput {
            message: format!(
                "fused width {} does not match the canonical class set ({})",
                accumulator.class_count(),
                CANONICAL_CLASS_NAMES.len()
            ),
        });
    }

    let stats = accumulator.finalize(config.confidence_level)?;
    let predicted = accumulator.predicted_classes();
    let rates = args.rates.as_deref().map(load_rate_series).transpose()?;
    let diagnosis = diagnose(&predicted, &CANONICAL_CLASS_NAMES, rates.as_deref());
    let report = build_report(&stats, diagnosis, &CANONICAL_CLASS_NAMES);

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| AnalysisError::Json {
            context: "encoding analysis report",
            source: e,
        })?;
    fs::write(&args.out, json).map_err(|e| AnalysisError::Io {
        context: "writing analysis report",
        source: e,
    })?;
    tracing::info!(rows = stats.row_count, out = %args.out.display(), "analysis run complete");
    Ok(())
}

/// Classifier output container: one 2-D `scores` dataset, rows = samples.
fn read_score_matrix(path: &Path) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let file = hdf5::File::open(path).map_err(|e| AnalysisError::Hdf5 {
        context: "opening score matrix",
        message: e.to_string(),
    })?;
    let dataset = file.dataset("scores").map_err(|e| AnalysisError::Hdf5 {
        context: "reading score matrix",
        message: e.to_string(),
    })?;
    let shape = dataset.shape();
    if shape.len() != 2 {
        return Err(AnalysisError::InvalidInput {
            message: format!("score matrix must be 2-D, got shape {shape:?}"),
        });
    }
    let raw: Vec<f32> = dataset.read_raw().map_err(|e| AnalysisError::Hdf5 {
        context: "reading score matrix",
        message: e.to_string(),
    })?;
    Ok(raw.chunks(shape[1].max(1)).map(<[f32]>::to_vec).collect())
}

fn load_rate_series(path: &Path) -> Result<Vec<f32>, AnalysisError> {
    let data = fs::read_to_string(path).map_err(|e| AnalysisError::Io {
        context: "reading rate series",
        source: e,
    })?;
    serde_json::from_str(&data).map_err(|e| AnalysisError::Json {
        context: "parsing rate series",
        source: e,
    })
}

fn require<'a>(value: &'a Option<PathBuf>, flag: &str) -> Result<&'a PathBuf, AnalysisError> {
    value.as_ref().ok_or_else(|| AnalysisError::InvalidInput {
        message: format!("{flag} is required for this mode"),
    })
}

fn progress_bar(len: u64, unit: &str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template(&format!(
            "{{bar:40}} {{pos}}/{{len}} {unit} [{{elapsed_precise}}]"
        ))
        .expect("valid progress template"),
    );
    bar
}
