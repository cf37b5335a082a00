use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tokio::fs::DirBuilder;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, CONFIG_PATH},
    fetcher::{ChromeProvider, RankingFetcher},
    present::{build_team_chart, head_to_head, Artifact, OutputFormat},
    roster::{load_roster, RosterSource},
    standings::{aggregate, AggregateOptions, LeagueFilter},
};

mod config;
mod fetcher;
mod page_scrapers;
mod present;
mod roster;
mod standings;

/// Scrapes event rankings and charts the points of every team in the roster.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// League to chart, or ALL. Overrides `aggregate.league` in config.toml
    #[arg(long)]
    league: Option<LeagueFilter>,
}


async fn write_artifact(directory: &Path, artifact: &Artifact) -> anyhow::Result<()> {
    let path = directory.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(CONFIG_PATH)?;
    if let Some(league) = cli.league {
        config.aggregate.league = league;
    }

    let roster = load_roster(&RosterSource::from_path(config.roster_path.as_deref()))
        .context("Could not load the team roster")?;

    let urls = config.urls.clone();
    let selectors = config.scraper.clone();
    let ready_timeout = config.fetch.ready_timeout();
    let provider = ChromeProvider::new(config.fetch.chrome_path.clone(), config.fetch.navigation_timeout());
    let rankings = tokio_rayon::spawn(move || {
        let fetcher = RankingFetcher::new(provider, &selectors, ready_timeout)?;
        anyhow::Ok(fetcher.fetch(&urls))
    })
    .await
    .context("Invalid [scraper] selectors in config.toml")?;

    if rankings.is_empty() {
        warn!("No ranking rows were fetched, every member will show zero points");
    }

    let standings = aggregate(&roster, &rankings, &config.aggregate);
    let chart = if standings.is_empty() {
        warn!("No roster members in league {}, skipping the team chart", config.aggregate.league);
        None
    } else {
        Some(build_team_chart(&standings))
    };

    let comparison = config.comparison.as_ref().and_then(|comparison| {
        let options = AggregateOptions { league: comparison.league.clone(), ..config.aggregate.clone() };
        let league_standings = aggregate(&roster, &rankings, &options);
        if let Some(total) = league_standings.team(&comparison.reference_team) {
            info!("{} has {} points in league {}", total.team, total.points, comparison.league);
        }
        match head_to_head(&league_standings, &comparison.reference_team) {
            Ok(result) => Some(result),
            Err(skipped) => {
                warn!("Skipping the head-to-head comparison: {skipped}");
                None
            }
        }
    });

    let directory = &config.output.directory;
    DirBuilder::new()
        .recursive(true)
        .create(directory)
        .await
        .with_context(|| format!("Failed to create {}. Do we have permissions?", directory.display()))?;

    for format in &config.output.formats {
        let renderer = format.renderer(&config.output.chart);
        let artifacts = chart
            .iter()
            .map(|chart| renderer.render_team_chart(chart))
            .chain(comparison.iter().map(|comparison| renderer.render_comparison(comparison)));

        for artifact in artifacts {
            let artifact = match artifact {
                Ok(artifact) => artifact,
                Err(e) => {
                    error!("Failed to render {format:?} output: {e}");
                    continue;
                }
            };
            if *format == OutputFormat::Table {
                println!("{}", String::from_utf8_lossy(&artifact.contents));
            }
            write_artifact(directory, &artifact).await?;
        }
    }

    println!("Charts completed successfully!");
    Ok(())
}
