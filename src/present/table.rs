use tabled::{Table, Tabled};

use super::{
    chart::{group_thousands, TeamChart},
    compare::{Comparison, Contender},
};


#[derive(Debug, Tabled)]
struct StandingRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Points")]
    points: String,
    #[tabled(rename = "Members")]
    members: String,
}


#[derive(Debug, Tabled)]
struct PairingRow {
    #[tabled(rename = "#")]
    rank: usize,
    left: String,
    left_points: String,
    #[tabled(rename = "Result")]
    result: String,
    right: String,
    right_points: String,
}


fn contender_cells(contender: Option<&Contender>) -> (String, String) {
    match contender {
        Some(c) if c.points > 0 => (c.member.clone(), group_thousands(c.points)),
        Some(c) => (c.member.clone(), String::new()),
        None => (String::new(), String::new()),
    }
}


/// Team standings, one line per bar, members listed top contribution first.
pub(crate) fn standings_table(chart: &TeamChart) -> String {
    let rows: Vec<StandingRow> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| StandingRow {
            rank: i + 1,
            team: bar.team.clone(),
            points: group_thousands(bar.total.max(0.0) as u64),
            members: bar.segments.iter().map(|segment| segment.label()).collect::<Vec<_>>().join(", "),
        })
        .collect();
    Table::new(&rows).to_string()
}


/// Head-to-head pairings followed by the overall score.
pub(crate) fn comparison_table(comparison: &Comparison) -> String {
    let rows: Vec<PairingRow> = comparison
        .rows
        .iter()
        .map(|row| {
            let (left, left_points) = contender_cells(row.left.as_ref());
            let (right, right_points) = contender_cells(row.right.as_ref());
            PairingRow {
                rank: row.rank,
                left,
                left_points,
                result: row.outcome.map(|outcome| outcome.as_str().to_string()).unwrap_or_default(),
                right,
                right_points,
            }
        })
        .collect();

    format!(
        "{} vs {}\n{}\n{} {} - {} {}\n",
        comparison.left_team,
        comparison.right_team,
        Table::new(&rows),
        comparison.left_team,
        comparison.left_wins,
        comparison.right_wins,
        comparison.right_team,
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::{
        chart::{Rgba, Segment, TeamBar},
        compare::{ComparisonRow, Outcome},
    };

    fn segment(member: &str, points: f64) -> Segment {
        Segment { member: member.into(), points, color: Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 } }
    }

    #[test]
    fn standings_lists_teams_in_order() {
        let chart = TeamChart {
            bars: vec![
                TeamBar { team: "beta".into(), total: 12500.0, segments: vec![segment("b1", 12000.0), segment("b2", 500.0)] },
                TeamBar { team: "alpha".into(), total: 0.0, segments: vec![] },
            ],
        };
        let table = standings_table(&chart);
        assert!(table.contains("Rank"));
        assert!(table.contains("Members"));
        assert!(table.contains("12,500"));
        assert!(table.contains("b1 (12000), b2 (500)"));
        assert!(table.find("beta").unwrap() < table.find("alpha").unwrap());
    }

    #[test]
    fn comparison_has_score_line() {
        let comparison = Comparison {
            left_team: "A".into(),
            right_team: "B".into(),
            rows: vec![
                ComparisonRow {
                    rank: 1,
                    left: Some(Contender { member: "a1".into(), points: 1500 }),
                    right: Some(Contender { member: "b1".into(), points: 0 }),
                    outcome: Some(Outcome::Win),
                },
                ComparisonRow {
                    rank: 2,
                    left: Some(Contender { member: "a2".into(), points: 10 }),
                    right: None,
                    outcome: None,
                },
            ],
            left_wins: 1,
            right_wins: 0,
        };
        let table = comparison_table(&comparison);
        assert!(table.starts_with("A vs B\n"));
        assert!(table.contains("1,500"));
        assert!(table.contains("WIN"));
        assert!(table.contains("b1"));
        assert!(table.trim_end().ends_with("A 1 - 0 B"));
    }
}
