use std::{cmp::Reverse, collections::BTreeMap, convert::Infallible, fmt, str::FromStr};

use fxhash::FxHashMap;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use tracing::debug;

use crate::{page_scrapers::RankEntry, roster::Roster};


/// Which league takes part in aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub(crate) enum LeagueFilter {
    #[default]
    All,
    Only(String),
}


impl LeagueFilter {
    pub(crate) fn admits(&self, league: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == league,
        }
    }
}


impl From<String> for LeagueFilter {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(value)
        }
    }
}


impl FromStr for LeagueFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.to_string().into())
    }
}


impl fmt::Display for LeagueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Only(league) => f.write_str(league),
        }
    }
}


#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AggregateOptions {
    pub(crate) league: LeagueFilter,
    /// Team name to point factor. Teams not listed keep their raw points.
    pub(crate) multipliers: BTreeMap<String, f64>,
}


impl AggregateOptions {
    fn multiplier(&self, team: &str) -> f64 {
        self.multipliers.get(team).copied().unwrap_or(1.0)
    }
}


#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TeamTotal {
    pub(crate) team: String,
    pub(crate) points: f64,
}


#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MemberTotal {
    pub(crate) team: String,
    pub(crate) member: String,
    pub(crate) points: f64,
}


/// Team totals, highest first, and the per member breakdown behind them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Standings {
    pub(crate) teams: Vec<TeamTotal>,
    pub(crate) members: Vec<MemberTotal>,
}


impl Standings {
    pub(crate) fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub(crate) fn team(&self, team: &str) -> Option<&TeamTotal> {
        self.teams.iter().find(|total| total.team == team)
    }

    pub(crate) fn members_of<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a MemberTotal> + 'a {
        self.members.iter().filter(move |member| member.team == team)
    }
}


/// Left joins the roster against scraped rankings and totals points per team and member.
///
/// Every roster member admitted by the league filter contributes exactly one member
/// row, with zero points when no ranking row carries their user id. A user id seen on
/// several pages contributes the sum. Ranking rows for unknown ids are ignored.
pub(crate) fn aggregate(roster: &Roster, rankings: &[RankEntry], options: &AggregateOptions) -> Standings {
    let mut scraped: FxHashMap<&str, u64> = FxHashMap::default();
    for entry in rankings {
        let points = scraped.entry(entry.user_id.as_str()).or_default();
        *points = points.saturating_add(entry.points);
    }

    let mut teams: BTreeMap<&str, f64> = BTreeMap::new();
    let mut members: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    let mut matched = 0usize;

    for entry in roster.entries().iter().filter(|entry| options.league.admits(&entry.league)) {
        let raw = match scraped.get(entry.user_id.as_str()) {
            Some(&points) => {
                matched += 1;
                points
            }
            None => 0,
        };
        let points = raw as f64 * options.multiplier(&entry.team_name);

        *teams.entry(entry.team_name.as_str()).or_default() += points;
        *members.entry((entry.team_name.as_str(), entry.member_name.as_str())).or_default() += points;
    }
    debug!("Matched {matched} roster members against {} ranking rows", rankings.len());

    let mut teams: Vec<TeamTotal> = teams
        .into_iter()
        .map(|(team, points)| TeamTotal { team: team.to_string(), points })
        .collect();
    // stable, so equal totals stay in name order
    teams.sort_by_key(|total| Reverse(OrderedFloat(total.points)));

    let members = members
        .into_iter()
        .map(|((team, member), points)| MemberTotal { team: team.to_string(), member: member.to_string(), points })
        .collect();

    Standings { teams, members }
}
