// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! bundle-inspect - Inspect state bundle snapshots
//!
//! Usage:
//!   bundle-inspect state.snap
//!   bundle-inspect state.snap --format json
//!   bundle-inspect state.snap --verify
//!   bundle-inspect payload.bin --raw

use anyhow::Context;
use clap::Parser;
use colored::*;
use serde_json::{json, Value};
use state_bundle::{
    codec, snapshot, BundleConfig, BundleValue, DecodeLimits, OpaqueRef, OpaqueRegistry,
    RawOpaque, StateBundle,
};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "bundle-inspect")]
#[command(about = "Inspect, verify and dump state bundle snapshot files")]
#[command(version)]
struct Args {
    /// Snapshot file (or bare bundle stream with --raw)
    file: PathBuf,

    /// Output format: pretty, json
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Only check the envelope and decode; print a one-line verdict
    #[arg(long)]
    verify: bool,

    /// Input is a bare bundle stream without snapshot envelope
    #[arg(long)]
    raw: bool,

    /// TOML configuration (decode limits, diagnostics)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = args.log_level.parse().unwrap_or(tracing::Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .init();

    if !args.file.exists() {
        anyhow::bail!("Input file not found: {}", args.file.display());
    }

    let config = match &args.config {
        Some(path) => BundleConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BundleConfig::default(),
    };
    config.apply();
    let limits = DecodeLimits::from(&config.decode);

    let bundle = load(&args, &limits)?;
    info!(
        "Loaded {} ({} top-level entries)",
        args.file.display(),
        bundle.len()
    );

    if args.verify {
        println!(
            "{} {} ({} entries)",
            "OK".green().bold(),
            args.file.display(),
            bundle.len()
        );
        return Ok(());
    }

    match args.format {
        OutputFormat::Pretty => print_pretty(&bundle, 0),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&bundle_to_json(&bundle))?)
        }
    }
    Ok(())
}

/// Opaque bodies are kept undecoded so any snapshot can be inspected.
fn load(args: &Args, limits: &DecodeLimits) -> anyhow::Result<StateBundle> {
    let registry = OpaqueRegistry::with_raw_fallback();
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    debug!("Read {} bytes", bytes.len());

    let bundle = if args.raw {
        codec::decode_with_limits(&bytes, &registry, limits)
    } else {
        snapshot::from_bytes(&bytes, &registry, limits)
    };
    bundle.with_context(|| format!("decoding {}", args.file.display()))
}

fn print_pretty(bundle: &StateBundle, depth: usize) {
    let indent = "  ".repeat(depth);
    if depth == 0 {
        println!("{} {} entries", ">>>".green().bold(), bundle.len());
    }
    for (key, value) in bundle.iter() {
        let tag = format!("{:<20}", value.tag().name());
        match value {
            BundleValue::Bundle(Some(nested)) => {
                println!(
                    "{}{} {} ({} entries)",
                    indent,
                    key.cyan().bold(),
                    tag.yellow(),
                    nested.len()
                );
                print_pretty(nested, depth + 1);
            }
            _ => println!(
                "{}{} {} {}",
                indent,
                key.cyan().bold(),
                tag.yellow(),
                render_value(value)
            ),
        }
    }
}

fn render_value(value: &BundleValue) -> String {
    match value {
        BundleValue::Opaque(Some(o)) | BundleValue::Serializable(Some(o)) => describe_opaque(o),
        BundleValue::OpaqueList(Some(items)) => format!(
            "[{}]",
            items
                .iter()
                .map(describe_opaque)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        BundleValue::SparseOpaqueArray(Some(map)) => format!(
            "{{{}}}",
            map.iter()
                .map(|(i, o)| format!("{}={}", i, describe_opaque(o)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        other if other.is_null() => "<null>".dimmed().to_string(),
        other => other.to_string(),
    }
}

fn describe_opaque(value: &OpaqueRef) -> String {
    match opaque_body_len(value) {
        Some(len) => format!("{} ({} bytes)", value.type_name(), len),
        None => value.type_name().to_string(),
    }
}

fn opaque_body_len(value: &OpaqueRef) -> Option<usize> {
    state_bundle::opaque::downcast_opaque::<RawOpaque>(value).map(|raw| raw.body().len())
}

fn opaque_to_json(value: &OpaqueRef) -> Value {
    json!({
        "type_name": value.type_name(),
        "bytes": opaque_body_len(value),
    })
}

fn bundle_to_json(bundle: &StateBundle) -> Value {
    Value::Array(
        bundle
            .iter()
            .map(|(key, value)| {
                json!({
                    "key": key,
                    "tag": value.tag().name(),
                    "wire": value.tag().to_wire(),
                    "value": value_to_json(value),
                })
            })
            .collect(),
    )
}

fn value_to_json(value: &BundleValue) -> Value {
    match value {
        BundleValue::Boolean(v) => json!(v),
        BundleValue::Byte(v) => json!(v),
        BundleValue::Char(v) => json!(v.to_string()),
        BundleValue::Short(v) => json!(v),
        BundleValue::Int(v) => json!(v),
        BundleValue::Long(v) => json!(v),
        BundleValue::Float(v) => Value::from(f64::from(*v)),
        BundleValue::Double(v) => Value::from(*v),
        BundleValue::String(v) | BundleValue::CharSequence(v) => json!(v),
        BundleValue::Serializable(v) | BundleValue::Opaque(v) => {
            v.as_ref().map_or(Value::Null, opaque_to_json)
        }
        BundleValue::IntegerList(v) | BundleValue::IntArray(v) => json!(v),
        BundleValue::StringList(v) | BundleValue::CharSequenceList(v) => json!(v),
        BundleValue::BooleanArray(v) => json!(v),
        BundleValue::ByteArray(v) => json!(v),
        BundleValue::ShortArray(v) => json!(v),
        BundleValue::CharArray(v) => json!(v
            .as_ref()
            .map(|chars| chars.iter().map(char::to_string).collect::<Vec<_>>())),
        BundleValue::LongArray(v) => json!(v),
        BundleValue::FloatArray(v) => v.as_ref().map_or(Value::Null, |items| {
            Value::Array(items.iter().map(|x| Value::from(f64::from(*x))).collect())
        }),
        BundleValue::DoubleArray(v) => v.as_ref().map_or(Value::Null, |items| {
            Value::Array(items.iter().map(|x| Value::from(*x)).collect())
        }),
        BundleValue::Bundle(v) => v.as_ref().map_or(Value::Null, bundle_to_json),
        BundleValue::OpaqueList(v) => v.as_ref().map_or(Value::Null, |items| {
            Value::Array(items.iter().map(opaque_to_json).collect())
        }),
        BundleValue::SparseOpaqueArray(v) => v.as_ref().map_or(Value::Null, |map| {
            Value::Object(
                map.iter()
                    .map(|(i, o)| (i.to_string(), opaque_to_json(o)))
                    .collect(),
            )
        }),
    }
}
