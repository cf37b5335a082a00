use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use plotters::prelude::{ColorMap, RGBAColor, ViridisRGB};

use crate::standings::{MemberTotal, Standings};

/// Team hues are spread over this part of the colormap.
const HUE_SPAN: f64 = 0.9;
/// Blend factor of the lightest segment in a stack
const MAX_BLEND: f64 = 0.5;


/// A color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rgba {
    pub(crate) r: f64,
    pub(crate) g: f64,
    pub(crate) b: f64,
    pub(crate) a: f64,
}


impl Rgba {
    /// Moves every channel towards white by `factor`, leaving alpha alone.
    pub(crate) fn lighten(self, factor: f64) -> Self {
        let blend = |c: f64| c + (1.0 - c) * factor;
        Self { r: blend(self.r), g: blend(self.g), b: blend(self.b), a: self.a }
    }

    pub(crate) fn to_plotters(self) -> RGBAColor {
        RGBAColor(channel(self.r), channel(self.g), channel(self.b), self.a)
    }
}


fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}


/// `0.5 * rank / (n - 1)`, or zero for a single member.
pub(crate) fn blend_factor(rank: usize, members: usize) -> f64 {
    if members <= 1 {
        0.0
    } else {
        MAX_BLEND * rank as f64 / (members - 1) as f64
    }
}


/// Evenly spaced viridis colors, one per team.
pub(crate) fn team_base_colors(teams: usize) -> Vec<Rgba> {
    (0..teams)
        .map(|i| {
            let position = if teams <= 1 { 0.0 } else { HUE_SPAN * i as f64 / (teams - 1) as f64 };
            let color = ViridisRGB.get_color(position as f32);
            Rgba {
                r: color.0 as f64 / 255.0,
                g: color.1 as f64 / 255.0,
                b: color.2 as f64 / 255.0,
                a: 1.0,
            }
        })
        .collect()
}


#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment {
    pub(crate) member: String,
    pub(crate) points: f64,
    pub(crate) color: Rgba,
}


impl Segment {
    pub(crate) fn label(&self) -> String {
        format!("{} ({})", self.member, self.points.trunc() as u64)
    }
}


#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TeamBar {
    pub(crate) team: String,
    pub(crate) total: f64,
    /// Bottom to top, largest contribution first
    pub(crate) segments: Vec<Segment>,
}


/// Everything needed to draw the stacked team chart, independent of the backend.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TeamChart {
    pub(crate) bars: Vec<TeamBar>,
}


impl TeamChart {
    pub(crate) fn max_total(&self) -> f64 {
        self.bars.iter().map(|bar| bar.total).fold(0.0, f64::max)
    }

    /// Every drawn segment in drawing order
    pub(crate) fn legend(&self) -> impl Iterator<Item = &Segment> {
        self.bars.iter().flat_map(|bar| bar.segments.iter())
    }
}


/// Lays out one bar per team in standings order with members stacked largest first.
///
/// Members without points keep their rank but get no segment.
pub(crate) fn build_team_chart(standings: &Standings) -> TeamChart {
    let colors = team_base_colors(standings.teams.len());
    let bars = standings
        .teams
        .iter()
        .zip(colors)
        .map(|(team, base)| {
            let mut members: Vec<&MemberTotal> = standings.members_of(&team.team).collect();
            members.sort_by_key(|member| Reverse(OrderedFloat(member.points)));

            let count = members.len();
            let segments = members
                .into_iter()
                .enumerate()
                .filter(|(_, member)| member.points != 0.0)
                .map(|(rank, member)| Segment {
                    member: member.member.clone(),
                    points: member.points,
                    color: base.lighten(blend_factor(rank, count)),
                })
                .collect();

            TeamBar { team: team.team.clone(), total: team.points, segments }
        })
        .collect();

    TeamChart { bars }
}


/// Formats with `,` between groups of three digits.
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::{MemberTotal, TeamTotal};

    fn member(team: &str, member: &str, points: f64) -> MemberTotal {
        MemberTotal { team: team.into(), member: member.into(), points }
    }

    fn standings() -> Standings {
        Standings {
            teams: vec![
                TeamTotal { team: "beta".into(), points: 900.0 },
                TeamTotal { team: "alpha".into(), points: 600.0 },
            ],
            members: vec![
                member("alpha", "a1", 100.0),
                member("alpha", "a2", 500.0),
                member("beta", "b1", 0.0),
                member("beta", "b2", 200.0),
                member("beta", "b3", 700.0),
                member("beta", "b4", 0.0),
            ],
        }
    }

    #[test]
    fn bars_follow_standings_order() {
        let chart = build_team_chart(&standings());
        let teams: Vec<_> = chart.bars.iter().map(|bar| bar.team.as_str()).collect();
        assert_eq!(teams, ["beta", "alpha"]);
        assert_eq!(chart.max_total(), 900.0);
    }

    #[test]
    fn segments_stack_largest_first_and_skip_zero() {
        let chart = build_team_chart(&standings());
        let beta: Vec<_> = chart.bars[0].segments.iter().map(|s| (s.member.as_str(), s.points)).collect();
        assert_eq!(beta, [("b3", 700.0), ("b2", 200.0)]);
        let legend: Vec<_> = chart.legend().map(Segment::label).collect();
        assert_eq!(legend, ["b3 (700)", "b2 (200)", "a2 (500)", "a1 (100)"]);
    }

    #[test]
    fn rank_counts_zero_point_members() {
        let chart = build_team_chart(&standings());
        let base = team_base_colors(2)[0];
        // b2 is rank 1 of 4
        assert_eq!(chart.bars[0].segments[1].color, base.lighten(0.5 / 3.0));
    }

    #[test]
    fn lightening_is_monotonic_from_base() {
        let base = Rgba { r: 0.267, g: 0.005, b: 0.329, a: 0.8 };
        let n = 6;
        let shades: Vec<_> = (0..n).map(|rank| base.lighten(blend_factor(rank, n))).collect();
        assert_eq!(shades[0], base);
        for pair in shades.windows(2) {
            assert!(pair[1].r >= pair[0].r && pair[1].g >= pair[0].g && pair[1].b >= pair[0].b);
            assert_eq!(pair[1].a, base.a);
        }
        let last = shades[n - 1];
        assert!((last.r - (0.267 + 0.733 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn blend_factor_bounds() {
        assert_eq!(blend_factor(0, 1), 0.0);
        assert_eq!(blend_factor(0, 0), 0.0);
        assert_eq!(blend_factor(0, 5), 0.0);
        assert_eq!(blend_factor(4, 5), 0.5);
        assert_eq!(blend_factor(2, 5), 0.25);
    }

    #[test]
    fn team_hues_are_distinct() {
        let colors = team_base_colors(9);
        assert_eq!(colors.len(), 9);
        for pair in colors.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(team_base_colors(1).len(), 1);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
