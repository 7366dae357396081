//! Pass/fail evaluation of a THD measurement against a threshold.

use crate::thd::MISMATCH_RATIO;
use serde::Serialize;
use std::fmt;

/// Outcome of comparing a measurement with its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Distortion at or below the threshold.
    Pass,
    /// Distortion above the threshold, or no usable tone.
    Fail,
}

impl Verdict {
    /// True for [`Verdict::Pass`].
    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail => f.write_str("FAIL"),
        }
    }
}

/// A verdict together with the measurement it was based on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    /// Pass or fail.
    pub verdict: Verdict,
    /// Measured energy ratio.
    pub ratio: f32,
    /// Measured THD in percent.
    pub thd_percent: f32,
    /// Threshold the measurement was held to, in percent.
    pub threshold_percent: f32,
}

/// Compare a THD ratio with a threshold given in percent.
///
/// A ratio at or above [`MISMATCH_RATIO`] always fails, whatever the
/// threshold, since it marks a capture without the expected tone. NaN fails.
pub fn evaluate(ratio: f32, threshold_percent: f32) -> Evaluation {
    let thd_percent = ratio * 100.0;
    let pass = ratio < MISMATCH_RATIO && thd_percent <= threshold_percent;

    Evaluation {
        verdict: if pass { Verdict::Pass } else { Verdict::Fail },
        ratio,
        thd_percent,
        threshold_percent,
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} thd={:.3}% threshold={:.3}%",
            self.verdict, self.thd_percent, self.threshold_percent
        )
    }
}
