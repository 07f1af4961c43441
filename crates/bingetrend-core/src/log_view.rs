//! In-memory search and filtering over a buffered set of log entries.
//!
//! The viewer only borrows the entries it is given; filtering never changes
//! the buffer a batch row owns.

use crate::types::{LogEntry, LogLevel};

/// Categories the agent is known to emit. Others are still accepted.
pub const KNOWN_CATEGORIES: [&str; 8] = [
    "AGENT", "ANALYSIS", "SEARCH", "ANALYZE", "VALIDATE", "MATCH", "RESULT", "ERROR",
];

/// Search text plus optional level and category filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Case-insensitive substring matched against message and category.
    pub search: Option<String>,
    pub level: Option<LogLevel>,
    /// Exact category match (case-insensitive).
    pub category: Option<String>,
}

impl LogFilter {
    /// Builds a filter from user text, where `ALL` or blank means "no filter".
    ///
    /// # Errors
    ///
    /// Returns a message when `level` is neither `ALL` nor a known level.
    pub fn from_args(
        search: Option<&str>,
        level: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, String> {
        let unless_all = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("ALL"))
                .map(str::to_string)
        };

        let level = unless_all(level)
            .map(|l| l.parse::<LogLevel>())
            .transpose()?;

        Ok(Self {
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            level,
            category: unless_all(category),
        })
    }

    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            if !entry.message.to_lowercase().contains(&needle)
                && !entry.category.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.level.is_some_and(|level| entry.level != level) {
            return false;
        }
        if let Some(category) = &self.category {
            if !entry.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        true
    }

    /// Entries passing the filter, in buffer order.
    #[must_use]
    pub fn apply<'a>(&self, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Renders entries as `[HH:MM:SS] LEVEL CATEGORY: message` lines.
#[must_use]
pub fn export_text<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    entries
        .into_iter()
        .map(|e| {
            format!(
                "[{}] {} {}: {}",
                e.time_of_day(),
                e.level,
                e.category,
                e.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, category: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: "2024-03-01T10:00:00Z".to_string(),
            level,
            category: category.to_string(),
            message: message.to_string(),
            data: None,
        }
    }

    fn sample() -> Vec<LogEntry> {
        vec![
            entry(LogLevel::Info, "AGENT", "Starting analysis"),
            entry(LogLevel::Debug, "SEARCH", "Querying web for Dune"),
            entry(LogLevel::Warn, "MATCH", "Low confidence match"),
            entry(LogLevel::Error, "ERROR", "Search timeout"),
        ]
    }

    #[test]
    fn default_filter_passes_everything() {
        let logs = sample();
        assert_eq!(LogFilter::default().apply(&logs).len(), 4);
    }

    #[test]
    fn search_matches_message_or_category_case_insensitively() {
        let logs = sample();
        let filter = LogFilter::from_args(Some("dune"), None, None).unwrap();
        let hits = filter.apply(&logs);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "SEARCH");

        let filter = LogFilter::from_args(Some("match"), None, None).unwrap();
        assert_eq!(filter.apply(&logs).len(), 1);
    }

    #[test]
    fn level_and_category_filters_combine() {
        let logs = sample();
        let filter = LogFilter::from_args(None, Some("error"), Some("error")).unwrap();
        let hits = filter.apply(&logs);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].message, "Search timeout");

        let filter = LogFilter::from_args(None, Some("INFO"), Some("MATCH")).unwrap();
        assert!(filter.apply(&logs).is_empty());
    }

    #[test]
    fn all_means_no_filter() {
        let filter = LogFilter::from_args(Some("  "), Some("ALL"), Some("all")).unwrap();
        assert_eq!(filter, LogFilter::default());
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(LogFilter::from_args(None, Some("LOUD"), None).is_err());
    }

    #[test]
    fn filtering_does_not_touch_the_buffer() {
        let logs = sample();
        let filter = LogFilter::from_args(None, Some("WARN"), None).unwrap();
        let _ = filter.apply(&logs);
        assert_eq!(logs.len(), 4);
    }

    #[test]
    fn export_renders_one_line_per_entry() {
        let logs = sample();
        let text = export_text(&logs[..2]);
        assert_eq!(
            text,
            "[10:00:00] INFO AGENT: Starting analysis\n[10:00:00] DEBUG SEARCH: Querying web for Dune"
        );
    }
}
