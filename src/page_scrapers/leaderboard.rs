use scraper::{ElementRef, Html};

use super::{CompiledSelectors, RankEntry};

/// User id recorded for rows without a usable profile link
pub(crate) const MISSING_USER_ID: &str = "N/A";


pub(super) fn extract_rows(document: &Html, selectors: &CompiledSelectors) -> Vec<RankEntry> {
    document
        .select(&selectors.row)
        .map(|row| extract_row(row, selectors))
        .collect()
}


fn extract_row(row: ElementRef, selectors: &CompiledSelectors) -> RankEntry {
    let user_id = row
        .select(&selectors.user_link)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(user_id_from_href)
        .unwrap_or_else(|| MISSING_USER_ID.to_string());

    let points = row
        .select(&selectors.points)
        .next()
        .map(|node| node.text().collect::<String>())
        .map(|text| parse_points(&text))
        .unwrap_or(0);

    RankEntry::new(user_id, points)
}


/// The last `/` separated segment of a profile link, kept verbatim.
pub(crate) fn user_id_from_href(href: &str) -> String {
    href.rsplit('/').next().unwrap_or(href).to_string()
}


/// Parses comma grouped digits. Anything that is not a non-negative integer counts as zero.
pub(crate) fn parse_points(text: &str) -> u64 {
    text.trim().replace(',', "").parse().unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_trailing_segment() {
        assert_eq!(user_id_from_href("/u/17816674"), "17816674");
        assert_eq!(user_id_from_href("https://mixch.tv/u/00123"), "00123");
        assert_eq!(user_id_from_href("17816674"), "17816674");
        assert_eq!(user_id_from_href("/u/"), "");
    }

    #[test]
    fn points_strip_grouping() {
        assert_eq!(parse_points("1,234"), 1234);
        assert_eq!(parse_points("  9,876,543 "), 9876543);
        assert_eq!(parse_points("0"), 0);
    }

    #[test]
    fn bad_points_become_zero() {
        assert_eq!(parse_points(""), 0);
        assert_eq!(parse_points("abc"), 0);
        assert_eq!(parse_points("-5"), 0);
        assert_eq!(parse_points("12.5"), 0);
    }
}
