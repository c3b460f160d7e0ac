use crate::shared::constants::{HIGH_BAND_THRESHOLD, MID_BAND_THRESHOLD};

/// Score returned by the scoring service for one submission.
///
/// Values are carried exactly as received; formatting for display happens
/// in the helpers below, never on the stored fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub name: String,
    pub score: f64,
    /// 0–100.
    pub smile_percentage: f64,
    pub image_url: String,
}

impl ScoreResult {
    pub fn band(&self) -> SmileBand {
        SmileBand::from_percentage(self.smile_percentage)
    }

    /// Smile percentage rendered with two decimals, e.g. `85.00%`.
    pub fn smile_label(&self) -> String {
        format_smile_percentage(self.smile_percentage)
    }

    pub fn score_label(&self) -> String {
        format_score(self.score)
    }
}

/// Colour band for the smile indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmileBand {
    High,
    Mid,
    Low,
}

impl SmileBand {
    /// `> 80` is high, `50..=80` is mid, anything else is low.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > HIGH_BAND_THRESHOLD {
            SmileBand::High
        } else if percentage >= MID_BAND_THRESHOLD {
            SmileBand::Mid
        } else {
            SmileBand::Low
        }
    }
}

impl std::fmt::Display for SmileBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmileBand::High => write!(f, "high"),
            SmileBand::Mid => write!(f, "mid"),
            SmileBand::Low => write!(f, "low"),
        }
    }
}

pub fn format_smile_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Whole scores print without a fractional part (`42`, not `42.0`).
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{score:.0}")
    } else {
        format!("{score}")
    }
}

/// Fraction of the smile bar to fill, clamped to `0.0..=1.0`.
pub fn bar_fill(percentage: f64) -> f32 {
    (percentage / 100.0).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::high(85.0, SmileBand::High)]
    #[case::mid(65.0, SmileBand::Mid)]
    #[case::low(30.0, SmileBand::Low)]
    #[case::eighty_is_mid(80.0, SmileBand::Mid)]
    #[case::just_above_eighty(80.01, SmileBand::High)]
    #[case::fifty_is_mid(50.0, SmileBand::Mid)]
    #[case::just_below_fifty(49.99, SmileBand::Low)]
    #[case::zero(0.0, SmileBand::Low)]
    #[case::hundred(100.0, SmileBand::High)]
    fn test_band_thresholds(#[case] percentage: f64, #[case] expected: SmileBand) {
        assert_eq!(SmileBand::from_percentage(percentage), expected);
    }

    #[rstest]
    #[case(85.0, "85.00%")]
    #[case(72.3456, "72.35%")]
    #[case(0.0, "0.00%")]
    #[case(100.0, "100.00%")]
    fn test_format_smile_percentage(#[case] percentage: f64, #[case] expected: &str) {
        assert_eq!(format_smile_percentage(percentage), expected);
    }

    #[rstest]
    #[case(42.0, "42")]
    #[case(0.0, "0")]
    #[case(87.5, "87.5")]
    fn test_format_score(#[case] score: f64, #[case] expected: &str) {
        assert_eq!(format_score(score), expected);
    }

    #[test]
    fn test_bar_fill_clamps() {
        assert_relative_eq!(bar_fill(85.0), 0.85);
        assert_relative_eq!(bar_fill(-5.0), 0.0);
        assert_relative_eq!(bar_fill(140.0), 1.0);
    }

    #[test]
    fn test_result_labels() {
        let result = ScoreResult {
            name: "Alice".into(),
            score: 91.0,
            smile_percentage: 85.0,
            image_url: "https://cdn.example.com/a.jpg".into(),
        };
        assert_eq!(result.band(), SmileBand::High);
        assert_eq!(result.smile_label(), "85.00%");
        assert_eq!(result.score_label(), "91");
        assert_eq!(result.band().to_string(), "high");
    }
}
