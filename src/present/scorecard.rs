use super::{
    chart::group_thousands,
    compare::{Comparison, ComparisonRow, Contender, Outcome},
};

const WIDTH: u32 = 800;
const ROW_HEIGHT: u32 = 50;
const HEADER_HEIGHT: u32 = 60;
const FOOTER_HEIGHT: u32 = 40;
const FONT: &str = "'Helvetica Neue', Arial, sans-serif";

const LEFT_COLOR: &str = "#3D5A80";
const RIGHT_COLOR: &str = "#E07A5F";
const WIN_COLOR: &str = "#81B29A";
const LOSE_COLOR: &str = "#E07A5F";
const NEUTRAL_COLOR: &str = "#95a5a6";


fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}


fn outcome_color(outcome: Option<Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::Win) => WIN_COLOR,
        Some(Outcome::Lose) => LOSE_COLOR,
        _ => NEUTRAL_COLOR,
    }
}


/// `"1. name"` and thousands grouped points, blank for a missing member or zero points.
fn cells(rank: usize, contender: Option<&Contender>) -> (String, String) {
    match contender {
        Some(c) => {
            let points = if c.points == 0 { String::new() } else { group_thousands(c.points) };
            (format!("{rank}. {}", escape(&c.member)), points)
        }
        None => (String::new(), String::new()),
    }
}


/// Renders the head-to-head as a standalone SVG scorecard.
pub(crate) fn comparison_svg(comparison: &Comparison) -> String {
    let height = HEADER_HEIGHT + 10 + ROW_HEIGHT * comparison.rows.len() as u32 + FOOTER_HEIGHT;
    let mut svg = String::new();

    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {height}" width="{WIDTH}" height="{height}">
  <rect width="{WIDTH}" height="{height}" fill="#f8f9fa" rx="10" ry="10" />
  <rect x="100" y="10" width="250" height="50" rx="8" ry="8" fill="{LEFT_COLOR}" />
  <text x="225" y="42" font-family="{FONT}" font-size="18" font-weight="bold" text-anchor="middle" fill="#ffffff">{left}</text>
  <rect x="450" y="10" width="250" height="50" rx="8" ry="8" fill="{RIGHT_COLOR}" />
  <text x="575" y="42" font-family="{FONT}" font-size="18" font-weight="bold" text-anchor="middle" fill="#ffffff">{right}</text>
  <rect x="350" y="10" width="100" height="50" rx="8" ry="8" fill="{LEFT_COLOR}" opacity="0.2" />
  <text x="400" y="42" font-family="{FONT}" font-size="16" font-weight="bold" text-anchor="middle" fill="#333">結果</text>
"##,
        left = escape(&comparison.left_team),
        right = escape(&comparison.right_team),
    ));

    let mut y = HEADER_HEIGHT + 10;
    for row in &comparison.rows {
        write_row(&mut svg, row, y);
        y += ROW_HEIGHT;
    }

    svg.push_str(&format!(
        r##"  <text x="400" y="{score_y}" font-family="{FONT}" font-size="16" font-weight="bold" text-anchor="middle" fill="#333">{left_wins} - {right_wins}</text>
</svg>
"##,
        score_y = y + 25,
        left_wins = comparison.left_wins,
        right_wins = comparison.right_wins,
    ));
    svg
}


fn write_row(svg: &mut String, row: &ComparisonRow, y: u32) {
    let (left_name, left_points) = cells(row.rank, row.left.as_ref());
    let (right_name, right_points) = cells(row.rank, row.right.as_ref());
    let result = row.outcome.map(Outcome::as_str).unwrap_or("");
    let text_y = y + 30;

    svg.push_str(&format!(
        r##"  <rect x="100" y="{y}" width="250" height="50" rx="5" ry="5" fill="#ffffff" stroke="#ddd" stroke-width="1" />
  <text x="110" y="{text_y}" font-family="{FONT}" font-size="14" fill="#333">{left_name}</text>
  <text x="320" y="{text_y}" font-family="{FONT}" font-size="14" text-anchor="end" fill="#333">{left_points}</text>
  <rect x="350" y="{y}" width="100" height="50" rx="5" ry="5" fill="{color}" stroke="#ddd" stroke-width="1" />
  <text x="400" y="{text_y}" font-family="{FONT}" font-size="14" font-weight="bold" text-anchor="middle" fill="#ffffff">{result}</text>
  <rect x="450" y="{y}" width="250" height="50" rx="5" ry="5" fill="#ffffff" stroke="#ddd" stroke-width="1" />
  <text x="460" y="{text_y}" font-family="{FONT}" font-size="14" fill="#333">{right_name}</text>
  <text x="690" y="{text_y}" font-family="{FONT}" font-size="14" text-anchor="end" fill="#333">{right_points}</text>
"##,
        color = outcome_color(row.outcome),
    ));
}


#[cfg(test)]
mod tests {
    use super::*;

    fn contender(member: &str, points: u64) -> Option<Contender> {
        Some(Contender { member: member.into(), points })
    }

    fn comparison() -> Comparison {
        Comparison {
            left_team: "メロディーアロウ".into(),
            right_team: "Lilly & Co".into(),
            rows: vec![
                ComparisonRow { rank: 1, left: contender("a", 12345), right: contender("b", 600), outcome: Some(Outcome::Win) },
                ComparisonRow { rank: 2, left: contender("c", 0), right: None, outcome: None },
            ],
            left_wins: 1,
            right_wins: 0,
        }
    }

    #[test]
    fn scorecard_lists_rows_and_score() {
        let svg = comparison_svg(&comparison());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(">メロディーアロウ</text>"));
        assert!(svg.contains(">1. a</text>"));
        assert!(svg.contains(">12,345</text>"));
        assert!(svg.contains(">WIN</text>"));
        assert!(svg.contains(&format!("fill=\"{WIN_COLOR}\"")));
        assert!(svg.contains(">1 - 0</text>"));
        assert!(svg.contains(r#"viewBox="0 0 800 210""#));
    }

    #[test]
    fn blank_cells_for_zero_and_missing() {
        let svg = comparison_svg(&comparison());
        assert!(svg.contains(">2. c</text>"));
        assert!(!svg.contains(">0</text>"));
        assert!(svg.contains(&format!("fill=\"{NEUTRAL_COLOR}\"")));
    }

    #[test]
    fn names_are_escaped() {
        let svg = comparison_svg(&comparison());
        assert!(svg.contains(">Lilly &amp; Co</text>"));
        assert_eq!(escape("<a href='x'>"), "&lt;a href=&#39;x&#39;&gt;");
    }
}
