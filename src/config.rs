use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use url::Url;
use validator::{Validate, ValidationError};

use crate::{
    page_scrapers::RankingSelectors,
    present::{ChartStyle, OutputFormat},
    standings::{AggregateOptions, LeagueFilter},
};

pub(crate) const CONFIG_PATH: &str = "config.toml";


fn default_ready_timeout_secs() -> u64 {
    10
}


fn default_navigation_timeout_secs() -> u64 {
    30
}


fn default_output_directory() -> PathBuf {
    PathBuf::from("charts")
}


fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Svg]
}


#[derive(Debug, Clone, Deserialize, Validate)]
pub(crate) struct FetchConfig {
    /// How long to wait for the ranking tab to become active on each page
    #[serde(default = "default_ready_timeout_secs")]
    #[validate(range(min = 1, max = 120))]
    pub(crate) ready_timeout_secs: u64,
    #[serde(default = "default_navigation_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub(crate) navigation_timeout_secs: u64,
    /// Uses the Chrome found on the system when unset
    #[serde(default)]
    pub(crate) chrome_path: Option<PathBuf>,
}


impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            ready_timeout_secs: default_ready_timeout_secs(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            chrome_path: None,
        }
    }
}


impl FetchConfig {
    pub(crate) fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub(crate) fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}


#[derive(Debug, Clone, Deserialize, Validate)]
pub(crate) struct ComparisonConfig {
    #[validate(length(min = 1))]
    pub(crate) reference_team: String,
    #[serde(default)]
    pub(crate) league: LeagueFilter,
}


#[derive(Debug, Clone, Deserialize, Validate)]
pub(crate) struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub(crate) directory: PathBuf,
    #[serde(default = "default_formats")]
    #[validate(length(min = 1))]
    pub(crate) formats: Vec<OutputFormat>,
    #[serde(default)]
    #[validate]
    pub(crate) chart: ChartStyle,
}


impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: default_output_directory(), formats: default_formats(), chart: ChartStyle::default() }
    }
}


fn validate_multipliers(config: &Config) -> Result<(), ValidationError> {
    if config.aggregate.multipliers.values().all(|factor| factor.is_finite() && *factor >= 0.0) {
        Ok(())
    } else {
        Err(ValidationError::new("multiplier_must_be_finite_and_non_negative"))
    }
}


#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_multipliers"))]
pub(crate) struct Config {
    /// Leaderboard pages, fetched in this order
    #[validate(length(min = 1))]
    pub(crate) urls: Vec<Url>,
    /// CSV roster; the compiled in roster is used when unset
    #[serde(default)]
    pub(crate) roster_path: Option<PathBuf>,
    #[serde(default)]
    #[validate]
    pub(crate) fetch: FetchConfig,
    #[serde(default)]
    pub(crate) scraper: RankingSelectors,
    #[serde(default)]
    pub(crate) aggregate: AggregateOptions,
    #[serde(default)]
    #[validate]
    pub(crate) comparison: Option<ComparisonConfig>,
    #[serde(default)]
    #[validate]
    pub(crate) output: OutputConfig,
}


impl Config {
    pub(crate) fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}. Is it in the working directory?", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub(crate) fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"urls = ["https://mixch.tv/live/event/19704#ranking"]"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();
        assert_eq!(config.urls.len(), 1);
        assert_eq!(config.urls[0].fragment(), Some("ranking"));
        assert!(config.roster_path.is_none());
        assert_eq!(config.fetch.ready_timeout(), Duration::from_secs(10));
        assert_eq!(config.fetch.navigation_timeout(), Duration::from_secs(30));
        assert_eq!(config.scraper.row, "ul.list li");
        assert_eq!(config.aggregate.league, LeagueFilter::All);
        assert!(config.aggregate.multipliers.is_empty());
        assert!(config.comparison.is_none());
        assert_eq!(config.output.directory, PathBuf::from("charts"));
        assert_eq!(config.output.formats, [OutputFormat::Svg]);
        assert_eq!(config.output.chart.width, 1200);
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
urls = ["https://mixch.tv/live/event/19704#ranking", "https://mixch.tv/live/event/19705#ranking"]
roster_path = "roster.csv"

[fetch]
ready_timeout_secs = 5

[scraper]
points = "span.num"

[aggregate]
league = "Z1"
multipliers = { inest = 1.25 }

[comparison]
reference_team = "メロディーアロウ"
league = "Z2"

[output]
directory = "out"
formats = ["png", "table"]
chart = { title = "Points", width = 800 }
"#,
        )
        .unwrap();

        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.roster_path, Some(PathBuf::from("roster.csv")));
        assert_eq!(config.fetch.ready_timeout_secs, 5);
        assert_eq!(config.fetch.navigation_timeout_secs, 30);
        assert_eq!(config.scraper.points, "span.num");
        assert_eq!(config.scraper.row, "ul.list li");
        assert_eq!(config.aggregate.league, LeagueFilter::Only("Z1".into()));
        assert_eq!(config.aggregate.multipliers.get("inest"), Some(&1.25));
        let comparison = config.comparison.unwrap();
        assert_eq!(comparison.reference_team, "メロディーアロウ");
        assert_eq!(comparison.league, LeagueFilter::Only("Z2".into()));
        assert_eq!(config.output.formats, [OutputFormat::Png, OutputFormat::Table]);
        assert_eq!(config.output.chart.title, "Points");
        assert_eq!(config.output.chart.width, 800);
        assert_eq!(config.output.chart.height, 900);
    }

    #[test]
    fn requires_urls() {
        assert!(Config::from_toml("").is_err());
        assert!(Config::from_toml("urls = []").is_err());
        assert!(Config::from_toml(r#"urls = ["not a url"]"#).is_err());
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let text = format!("{MINIMAL}\n[fetch]\nready_timeout_secs = 0\n");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn rejects_negative_multiplier() {
        let text = format!("{MINIMAL}\n[aggregate]\nmultipliers = {{ inest = -1.0 }}\n");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn rejects_non_finite_multiplier() {
        let text = format!("{MINIMAL}\n[aggregate]\nmultipliers = {{ inest = nan }}\n");
        assert!(Config::from_toml(&text).is_err());
        let text = format!("{MINIMAL}\n[aggregate]\nmultipliers = {{ inest = 0.0, policy = 2.5 }}\n");
        assert_eq!(Config::from_toml(&text).unwrap().aggregate.multipliers.len(), 2);
    }

    #[test]
    fn rejects_empty_formats() {
        let text = format!("{MINIMAL}\n[output]\nformats = []\n");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn rejects_empty_reference_team() {
        let text = format!("{MINIMAL}\n[comparison]\nreference_team = \"\"\n");
        assert!(Config::from_toml(&text).is_err());
    }

    #[test]
    fn rejects_tiny_chart() {
        let text = format!("{MINIMAL}\n[output.chart]\nheight = 10\n");
        assert!(Config::from_toml(&text).is_err());
    }
}
