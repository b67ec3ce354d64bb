//! Features CLI - Inspect Example / SequenceExample records stored as JSON.

use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use feature_util::prelude::*;

/// A record loaded from disk.
enum Record {
    Example(Example),
    Sequence(SequenceExample),
}

impl Record {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Example(_) => "Example",
            Self::Sequence(_) => "SequenceExample",
        }
    }

    /// The flat features map: `Example.features` or `SequenceExample.context`.
    fn features(&self) -> Option<&Features> {
        match self {
            Self::Example(example) => get_features(example),
            Self::Sequence(seq) => context(seq),
        }
    }
}

#[derive(Serialize)]
struct FeatureSummary<'a> {
    key: &'a str,
    kind: Option<&'static str>,
    count: usize,
}

impl<'a> FeatureSummary<'a> {
    fn new(key: &'a str, feature: &Feature) -> Self {
        Self {
            key,
            kind: FeatureKind::of(feature).map(FeatureKind::name),
            count: num_values(feature),
        }
    }
}

struct Options {
    json: bool,
    log_level: &'static str,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("features");

    // Parse global flags
    let mut opts = Options { json: false, log_level: "info" };
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => opts.log_level = "debug",
            "-vv" | "--trace" => opts.log_level = "trace",
            "-q" | "--quiet" => opts.log_level = "error",
            "--json" => opts.json = true,
            "-V" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            _ => filtered_args.push(arg),
        }
    }

    init_tracing(opts.log_level);

    if filtered_args.is_empty() {
        print_usage(prog);
        return ExitCode::SUCCESS;
    }

    let result = match filtered_args.as_slice() {
        ["info" | "i", path] => cmd_info(path, &opts),
        ["get" | "g", path, key] => cmd_get(path, key, None, &opts),
        ["get" | "g", path, key, kind] => cmd_get(path, key, Some(*kind), &opts),
        ["lists" | "l", path] => cmd_lists(path, &opts),
        ["help" | "h" | "-h" | "--help"] => {
            print_usage(prog);
            Ok(())
        }
        [path] if Path::new(path).exists() => cmd_info(path, &opts),
        [cmd, ..] => {
            eprintln!("Unknown command or wrong arguments: {}", cmd);
            print_usage(prog);
            return ExitCode::FAILURE;
        }
        [] => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage(prog: &str) {
    println!("Features CLI - Inspect Example / SequenceExample records (JSON)");
    println!();
    println!("Usage: {} [options] <command> <record.json> [key] [kind]", prog);
    println!();
    println!("Commands:");
    println!("  i, info <file>        Show every feature with its kind and value count");
    println!("  g, get <file> <key> [kind]");
    println!("                        Print the values of one feature (context for sequences),");
    println!("                        optionally read as int64_list, float_list or bytes_list");
    println!("  l, lists <file>       Show the feature lists of a SequenceExample");
    println!("  h, help               Show this help");
    println!();
    println!("Options:");
    println!("  --json          Machine-readable output");
    println!("  -v, --verbose   Debug output");
    println!("  -vv, --trace    Trace output (very verbose)");
    println!("  -q, --quiet     Errors only");
    println!("  -V, --version   Show version");
    println!();
    println!("RUST_LOG overrides the log level flags.");
}

fn print_version() {
    println!(
        "features {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("FEATURE_UTIL_BUILD_DATE")
    );
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load a record, telling the two shapes apart by their top-level fields.
fn load_record(path: &str) -> anyhow::Result<Record> {
    tracing::info!("Opening record: {}", path);
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path))?;

    let is_sequence = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("context") || obj.contains_key("feature_lists"));

    let record = if is_sequence {
        Record::Sequence(serde_json::from_value(value).context("Invalid SequenceExample")?)
    } else {
        Record::Example(serde_json::from_value(value).context("Invalid Example")?)
    };
    tracing::debug!("Loaded {}", record.type_name());
    Ok(record)
}

fn sorted_features(features: Option<&Features>) -> Vec<(&str, &Feature)> {
    let mut entries: Vec<(&str, &Feature)> = features
        .map(|f| f.feature.iter().map(|(k, v)| (k.as_str(), v)).collect())
        .unwrap_or_default();
    entries.sort_by_key(|(key, _)| *key);
    entries
}

fn cmd_info(path: &str, opts: &Options) -> anyhow::Result<()> {
    let record = load_record(path)?;
    let features = sorted_features(record.features());
    let lists = match &record {
        Record::Sequence(seq) => sorted_lists(seq),
        Record::Example(_) => Vec::new(),
    };

    if opts.json {
        let summaries: Vec<FeatureSummary> =
            features.iter().map(|(key, f)| FeatureSummary::new(key, f)).collect();
        let steps: Vec<serde_json::Value> = lists
            .iter()
            .map(|(key, steps)| serde_json::json!({ "key": key, "steps": steps.len() }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "record": path,
                "type": record.type_name(),
                "features": summaries,
                "feature_lists": steps,
            }))?
        );
        return Ok(());
    }

    println!("Record: {}", path);
    println!("Type:   {}", record.type_name());
    println!();
    let label = match record {
        Record::Example(_) => "Features",
        Record::Sequence(_) => "Context features",
    };
    println!("{}: {}", label, features.len());
    for (key, feature) in &features {
        println!("  {:<24} {:<12} {}", key, kind_label(feature), num_values(feature));
    }
    if !lists.is_empty() {
        println!();
        println!("Feature lists: {}", lists.len());
        for (key, steps) in &lists {
            println!("  {:<24} {} steps", key, steps.len());
        }
    }
    Ok(())
}

fn cmd_get(path: &str, key: &str, kind: Option<&str>, opts: &Options) -> anyhow::Result<()> {
    let requested = match kind {
        Some(name) => match FeatureKind::from_name(name) {
            Some(kind) => Some(kind),
            None => bail!("Unknown feature kind: {} (expected int64_list, float_list or bytes_list)", name),
        },
        None => None,
    };

    let record = load_record(path)?;
    let features = record
        .features()
        .ok_or_else(|| Error::not_found(key))?;
    let feature = get_feature(key, features)?;
    let kind = requested.or(FeatureKind::of(feature));

    if opts.json {
        let json = feature_json(key, feature, kind).with_context(|| format!("Failed to read '{}'", key))?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        let values = format_values(feature, kind).with_context(|| format!("Failed to read '{}'", key))?;
        println!("{} ({}): {}", key, kind.map_or("(unset)", FeatureKind::name), values);
    }
    Ok(())
}

fn cmd_lists(path: &str, opts: &Options) -> anyhow::Result<()> {
    let Record::Sequence(seq) = load_record(path)? else {
        bail!("{} is an Example, not a SequenceExample", path);
    };
    let lists = sorted_lists(&seq);

    if opts.json {
        let mut out = Vec::with_capacity(lists.len());
        for (key, steps) in &lists {
            let steps: Vec<FeatureSummary> = steps.iter().map(|s| FeatureSummary::new(key, s)).collect();
            out.push(serde_json::json!({ "key": key, "steps": steps }));
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Feature lists: {}", lists.len());
    for (key, steps) in &lists {
        println!("  {} ({} steps)", key, steps.len());
        for (i, step) in steps.iter().enumerate() {
            println!("    [{}] {}: {}", i, kind_label(step), format_values(step, FeatureKind::of(step))?);
        }
    }
    Ok(())
}

fn sorted_lists(seq: &SequenceExample) -> Vec<(&str, &[Feature])> {
    let mut keys: Vec<&str> = seq
        .feature_lists()
        .map(|lists| lists.feature_list.keys().map(String::as_str).collect())
        .unwrap_or_default();
    keys.sort_unstable();
    keys.into_iter()
        .filter_map(|key| get_feature_list(key, seq).ok().map(|steps| (key, steps)))
        .collect()
}

fn kind_label(feature: &Feature) -> &'static str {
    FeatureKind::of(feature).map_or("(unset)", FeatureKind::name)
}

/// Render values read as `kind` for terminal output.
///
/// Byte strings print as quoted text with non-UTF-8 bytes replaced; `--json`
/// output keeps the raw bytes.
fn format_values(feature: &Feature, kind: Option<FeatureKind>) -> feature_util::Result<String> {
    let parts: Vec<String> = match kind {
        Some(FeatureKind::Int64) => feature_values::<i64>(feature)?.iter().map(i64::to_string).collect(),
        Some(FeatureKind::Float) => feature_values::<f32>(feature)?.iter().map(f32::to_string).collect(),
        Some(FeatureKind::Bytes) => feature_values::<Vec<u8>>(feature)?
            .iter()
            .map(|b| format!("{:?}", String::from_utf8_lossy(b)))
            .collect(),
        None => Vec::new(),
    };
    Ok(format!("[{}]", parts.join(", ")))
}

/// Values read as `kind`. Byte strings are arrays of byte values, the same
/// shape as `bytes_list` in the record JSON.
fn feature_json(key: &str, feature: &Feature, kind: Option<FeatureKind>) -> feature_util::Result<serde_json::Value> {
    let values = match kind {
        Some(FeatureKind::Int64) => serde_json::json!(feature_values::<i64>(feature)?),
        Some(FeatureKind::Float) => serde_json::json!(feature_values::<f32>(feature)?),
        Some(FeatureKind::Bytes) => serde_json::json!(feature_values::<Vec<u8>>(feature)?),
        None => serde_json::json!([]),
    };
    Ok(serde_json::json!({
        "key": key,
        "kind": kind.map(FeatureKind::name),
        "values": values,
    }))
}
