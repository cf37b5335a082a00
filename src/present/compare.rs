use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::standings::{MemberTotal, Standings, TeamTotal};

/// Pairings shown in a head-to-head
pub(crate) const MAX_ROWS: usize = 5;


/// Result of one pairing, seen from the left team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Win,
    Lose,
    Tie,
}


impl Outcome {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Lose => "LOSE",
            Self::Tie => "TIE",
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Contender {
    pub(crate) member: String,
    pub(crate) points: u64,
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComparisonRow {
    /// 1 based
    pub(crate) rank: usize,
    pub(crate) left: Option<Contender>,
    pub(crate) right: Option<Contender>,
    /// `None` unless both sides have a member at this rank
    pub(crate) outcome: Option<Outcome>,
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Comparison {
    pub(crate) left_team: String,
    pub(crate) right_team: String,
    pub(crate) rows: Vec<ComparisonRow>,
    pub(crate) left_wins: usize,
    pub(crate) right_wins: usize,
}


#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ComparisonSkipped {
    #[error("team {0:?} has no members in this league")]
    ReferenceMissing(String),
    #[error("no other team to compare {0:?} against")]
    NoOpponent(String),
}


fn ranked<'a>(members: impl IntoIterator<Item = &'a MemberTotal>) -> Vec<Contender> {
    let mut members: Vec<&MemberTotal> = members.into_iter().collect();
    members.sort_by_key(|member| Reverse(OrderedFloat(member.points)));
    members
        .into_iter()
        .map(|member| Contender { member: member.member.clone(), points: member.points.trunc() as u64 })
        .collect()
}


/// Pairs the two teams' members rank by rank, best first, and scores each pairing.
pub(crate) fn compare<'a>(
    left: impl IntoIterator<Item = &'a MemberTotal>,
    right: impl IntoIterator<Item = &'a MemberTotal>,
    left_team: &str,
    right_team: &str,
) -> Comparison {
    let left = ranked(left);
    let right = ranked(right);
    let rows_wanted = MAX_ROWS.min(left.len().max(right.len()));

    let mut comparison = Comparison {
        left_team: left_team.to_string(),
        right_team: right_team.to_string(),
        rows: Vec::with_capacity(rows_wanted),
        left_wins: 0,
        right_wins: 0,
    };

    for i in 0..rows_wanted {
        let l = left.get(i).cloned();
        let r = right.get(i).cloned();
        let outcome = match (&l, &r) {
            (Some(l), Some(r)) if l.points > r.points => Some(Outcome::Win),
            (Some(l), Some(r)) if l.points < r.points => Some(Outcome::Lose),
            (Some(_), Some(_)) => Some(Outcome::Tie),
            _ => None,
        };
        match outcome {
            Some(Outcome::Win) => comparison.left_wins += 1,
            Some(Outcome::Lose) => comparison.right_wins += 1,
            _ => {}
        }
        comparison.rows.push(ComparisonRow { rank: i + 1, left: l, right: r, outcome });
    }

    comparison
}


/// The team `reference` is measured against: the leader, or the runner-up when
/// `reference` itself leads. `teams` must already be in standings order.
pub(crate) fn select_opponent<'a>(teams: &'a [TeamTotal], reference: &str) -> Result<&'a TeamTotal, ComparisonSkipped> {
    if !teams.iter().any(|team| team.team == reference) {
        return Err(ComparisonSkipped::ReferenceMissing(reference.to_string()));
    }
    teams
        .iter()
        .find(|team| team.team != reference)
        .ok_or_else(|| ComparisonSkipped::NoOpponent(reference.to_string()))
}


/// Compares `reference` against its selected opponent within `standings`.
pub(crate) fn head_to_head(standings: &Standings, reference: &str) -> Result<Comparison, ComparisonSkipped> {
    let opponent = select_opponent(&standings.teams, reference)?;
    Ok(compare(
        standings.members_of(reference),
        standings.members_of(&opponent.team),
        reference,
        &opponent.team,
    ))
}
