//! Remote stats sections and which of them the latest-post card needs.

use std::fmt;

/// A remote endpoint the fetch service knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    /// The site's most recent published post, without its view count.
    InsightsLatestPostSummary,
    /// The all-time view count of a single post.
    InsightsLatestPostViews,
    /// Today's site-wide totals.
    InsightsToday,
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionId::InsightsLatestPostSummary => "insights-latest-post-summary",
            SectionId::InsightsLatestPostViews => "insights-latest-post-views",
            SectionId::InsightsToday => "insights-today",
        };
        f.write_str(name)
    }
}

/// Sections requested when a card cycle starts.
///
/// The views section is not listed: it is only requested once the summary
/// shows it is missing.
pub const LATEST_POST_SECTIONS: &[SectionId] = &[SectionId::InsightsLatestPostSummary];

/// Cheap pre-check used before any state is inspected.
pub fn concerns_latest_post(section: SectionId) -> bool {
    matches!(
        section,
        SectionId::InsightsLatestPostSummary | SectionId::InsightsLatestPostViews
    )
}
