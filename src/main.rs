//! Matchgate admin entrypoint.
//!
//! Operates on the cutover and metrics documents under `MATCHGATE_DATA_DIR`,
//! the same files the production router reads on every request.

use std::sync::Arc;

use anyhow::{Context, bail};
use serde::Serialize;
use serde_json::json;

use matchgate::config::Config;
use matchgate::cutover::{CutoverConfig, CutoverManager};
use matchgate::learning::LearningCache;
use matchgate::metrics::{MetricsSnapshot, ProductionMetrics};
use matchgate::store::JsonFileStore;

const USAGE: &str = "usage: matchgate <command>

commands:
  status                  show the cutover policy
  enable                  enable the cutover (percentage unchanged)
  disable                 route everything to legacy
  set-percentage <0-100>  set the share of inputs routed to the authority
  rollback <reason>       disable, zero the percentage and record why
  stats                   authority vs legacy statistics
  criteria                rollout gate with per-check detail
  reset-metrics           clear all metrics (start of a new tier)
  decay-learning <days>   halve usage counts of learning entries idle that long";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = Config::from_env()?;
    config.validate()?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    let cutover = CutoverManager::new(Arc::new(JsonFileStore::<CutoverConfig>::new(
        config.cutover_path(),
    )))
    .with_sticky_key(config.sticky_key);
    let metrics = ProductionMetrics::new(Arc::new(JsonFileStore::<MetricsSnapshot>::new(
        config.metrics_path(),
    )));

    match command.as_str() {
        "status" => print_status(&cutover.config()),
        "enable" => print_status(&cutover.enable()?),
        "disable" => print_status(&cutover.disable()?),
        "set-percentage" => {
            let raw = args.get(1).context("set-percentage needs a value")?;
            let percentage: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("'{raw}' is not a number"))?;
            print_status(&cutover.set_rollout_percentage(percentage)?)
        }
        "rollback" => {
            let reason = args[1..].join(" ");
            if reason.trim().is_empty() {
                bail!("rollback needs a reason");
            }
            let entry = cutover.emergency_rollback(reason.trim())?;
            print_json(&entry)
        }
        "stats" => print_json(&metrics.get_stats()),
        "criteria" => print_json(&metrics.rollout_criteria()),
        "reset-metrics" => {
            metrics.reset()?;
            print_json(&json!({ "reset": true }))
        }
        "decay-learning" => {
            let raw = args.get(1).context("decay-learning needs a number of days")?;
            let days: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("'{raw}' is not a number of days"))?;
            if days <= 0 {
                bail!("decay-learning needs a positive number of days");
            }

            let path = config.learning_path();
            let cache = LearningCache::load(&path)?;
            let decayed = cache.decay(chrono::Duration::days(days));
            cache.persist(&path)?;
            print_json(&json!({ "decayed": decayed, "entries": cache.len() }))
        }
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

fn print_status(config: &CutoverConfig) -> anyhow::Result<()> {
    print_json(&json!({
        "status": config.status().to_string(),
        "config": config,
    }))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
