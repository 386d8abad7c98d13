//! Spoken-duration estimation from text.

use super::Segment;

/// Average speaking rate: 150 words per minute (2.5 words/second).
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Estimated seconds to speak one segment.
///
/// Each turn is counted as its words plus one beat for the turn boundary,
/// at 2.5 words/second, rounded up: `"Hi there!"` estimates as
/// `ceil(3 / 2.5) = 2` seconds.
pub fn estimate_segment_duration(segment: &Segment) -> u64 {
    let tokens = segment.word_count() as u64 + 1;
    // ceil(tokens / 2.5) in integer arithmetic
    (tokens * 2).div_ceil(5)
}

/// Estimated seconds to speak the whole script (sum of per-segment
/// estimates, never fewer).
pub fn estimate_script_duration(segments: &[Segment]) -> u64 {
    segments.iter().map(estimate_segment_duration).sum()
}

/// Render seconds as `m:ss`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Segment {
        Segment::from_source("Host", text, 1)
    }

    #[test]
    fn per_segment_estimate_rounds_up() {
        assert_eq!(estimate_segment_duration(&segment("Hello.")), 1);
        assert_eq!(estimate_segment_duration(&segment("Hi there!")), 2);
        assert_eq!(estimate_segment_duration(&segment("one two three four five six")), 3);
    }

    #[test]
    fn script_estimate_sums_segments() {
        let segments = vec![segment("Hello."), segment("Hi there!")];
        assert_eq!(estimate_script_duration(&segments), 3);
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(3), "0:03");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(600), "10:00");
    }
}
