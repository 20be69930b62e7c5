use std::{
    env,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use tokio::sync::watch;

use clinic_grid::{
    feed::{ingest::ingest_json, DayLoader, DayRequest, DaySnapshot, ScheduleSource, StaticSource, StoreSource},
    storage::{Config, ScheduleStore},
    ui::render_day_grid,
};

use crate::sample_schedule::sample_day;

const USAGE: &str =
    "Usage: clinic-grid [--day YYYY/MM/DD] [--therapist ID]... [--snapshot FILE.json] [--sample] [--json]";

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Store,
    Snapshot(PathBuf),
    Sample,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    /// `None` when `--day` was not given.
    pub day: Option<NaiveDate>,
    pub therapists: Vec<String>,
    pub source: DataSource,
    pub json: bool,
}

pub enum CliMode {
    Run(CliOptions),
    Help,
}

pub fn parse_cli_mode<I: IntoIterator<Item = String>>(args: I) -> Result<CliMode> {
    let mut options = CliOptions {
        day: None,
        therapists: Vec::new(),
        source: DataSource::Store,
        json: false,
    };
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--day" => {
                let value = args.next().context("--day needs a date")?;
                let day = NaiveDate::parse_from_str(&value, "%Y/%m/%d")
                    .with_context(|| format!("Invalid date '{}'. Use YYYY/MM/DD.", value))?;
                options.day = Some(day);
            }
            "--therapist" => {
                let value = args.next().context("--therapist needs an id")?;
                options.therapists.push(value);
            }
            "--snapshot" => {
                let value = args.next().context("--snapshot needs a file")?;
                options.source = DataSource::Snapshot(PathBuf::from(value));
            }
            "--sample" => options.source = DataSource::Sample,
            "--json" => options.json = true,
            "--help" => return Ok(CliMode::Help),
            _ => bail!("Unknown argument: {}", arg),
        }
    }

    Ok(CliMode::Run(options))
}

pub fn print_usage() {
    println!("{}", USAGE);
}

pub async fn run(options: CliOptions) -> Result<()> {
    let config = Config::load_or_create().context("Failed to load configuration")?;

    let output = match &options.source {
        DataSource::Store => {
            let store = ScheduleStore::open(&config.storage.database)
                .with_context(|| format!("Failed to open {}", config.storage.database.display()))?;
            let everyone = store.list_resources()?;
            let source = StoreSource::new(Arc::new(Mutex::new(store)));
            render(source, resolve_day(options.day, None), &everyone, &options, &config).await?
        }
        DataSource::Snapshot(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let report = ingest_json(&content)?;
            if !report.rejected.is_empty() {
                eprintln!("Skipped {} unreadable record(s)", report.rejected.len());
            }
            let day = resolve_day(options.day, report.day);
            let everyone = report.snapshot.resources.clone();
            render(StaticSource::new(report.snapshot), day, &everyone, &options, &config).await?
        }
        DataSource::Sample => {
            let day = resolve_day(options.day, None);
            let snapshot: DaySnapshot = sample_day(day);
            let everyone = snapshot.resources.clone();
            render(StaticSource::new(snapshot), day, &everyone, &options, &config).await?
        }
    };

    if options.json {
        println!("{}", output);
        Ok(())
    } else {
        display_with_pager(&output)
    }
}

async fn render<S: ScheduleSource>(
    source: S,
    day: NaiveDate,
    everyone: &[clinic_grid::Resource],
    options: &CliOptions,
    config: &Config,
) -> Result<String> {
    let request = DayRequest::new(day, selected_therapists(options, config, everyone));
    let (_selection, receiver) = watch::channel(request);
    let loader = DayLoader::new(source, config.grid.clone(), receiver);

    let Some(model) = loader.load().await? else {
        bail!("Selection changed while loading");
    };

    if options.json {
        Ok(serde_json::to_string_pretty(&model)?)
    } else {
        Ok(render_day_grid(&model, &config.display.time_format))
    }
}

/// An explicit `--day` wins, then the day a snapshot file names, then today.
fn resolve_day(requested: Option<NaiveDate>, snapshot_day: Option<NaiveDate>) -> NaiveDate {
    requested
        .or(snapshot_day)
        .unwrap_or_else(|| Local::now().date_naive())
}

/// Command line wins, then the configured default, then every known therapist.
fn selected_therapists(options: &CliOptions, config: &Config, everyone: &[clinic_grid::Resource]) -> Vec<String> {
    if !options.therapists.is_empty() {
        options.therapists.clone()
    } else if !config.display.therapists.is_empty() {
        config.display.therapists.clone()
    } else {
        everyone.iter().map(|r| r.id.clone()).collect()
    }
}

fn display_with_pager(text: &str) -> Result<()> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            println!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd)
        .args(&args)
        .stdin(Stdio::piped())
        .spawn()
    {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            println!("{text}");
        }
    }

    Ok(())
}
