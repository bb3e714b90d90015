/// Relative duration phrases for timing lines
use chrono::{DateTime, Utc};
use chrono_humanize::{Accuracy, HumanTime, Tense};

/// Turns a pair of timestamps into a display phrase such as "2 minutes"
pub trait DurationFormatter: Send + Sync {
    fn relative(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> String;
}

/// Rough English phrasing from `chrono-humanize`, without "ago"/"in"
#[derive(Debug, Default, Clone, Copy)]
pub struct HumanizedFormatter;

impl HumanizedFormatter {
    pub fn phrase(&self, span: chrono::Duration) -> String {
        HumanTime::from(span).to_text_en(Accuracy::Rough, Tense::Present)
    }
}

impl DurationFormatter for HumanizedFormatter {
    fn relative(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> String {
        self.phrase(now - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn span(d: Duration) -> String {
        let start = Utc::now();
        HumanizedFormatter.relative(start, start + d)
    }

    #[test]
    fn test_minutes_and_longer() {
        assert_eq!(span(Duration::minutes(2)), "2 minutes");
        assert_eq!(span(Duration::hours(5)), "5 hours");
        assert_eq!(span(Duration::days(3)), "3 days");
    }

    #[test]
    fn test_no_tense_suffix() {
        let phrase = span(Duration::minutes(10));
        assert!(!phrase.ends_with("ago"));
        assert!(!phrase.starts_with("in "));
    }

    #[test]
    fn test_direction_ignored() {
        let now = Utc::now();
        let earlier = now - Duration::minutes(2);
        assert_eq!(HumanizedFormatter.relative(now, earlier), "2 minutes");
    }
}
