//! Threshold-based diagnostic heuristics over recent readings.
//!
//! Both diagnostic endpoints share one evaluator parameterized by a
//! [`DiagnosticProfile`]: how many recent readings to inspect, how the
//! high-temperature and fault counts are compared against their limits,
//! and whether an empty window is itself an error. The profiles must stay
//! separate: their comparison modes (inclusive vs strict) and
//! empty-window handling are externally observable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Temperature at or above which a reading counts as a high-temperature
/// flag. Shared by both profiles.
pub const HIGH_TEMP_THRESHOLD: f64 = 80.0;

/// Case-insensitive substring marking a fault status.
const FAULT_MARKER: &str = "fault";

pub const NORMAL_ADVICE: &str = "Device is operating normally.";

#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("No readings found for this device")]
    NoReadings,
}

/// One reading as the evaluator sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingSample {
    pub status: String,
    pub temperature: f64,
    pub timestamp: String,
}

/// How a flag count is compared against its limit.
#[derive(Debug, Clone, Copy)]
pub enum CountRule {
    AtLeast(usize),
    MoreThan(usize),
}

impl CountRule {
    pub fn is_met(self, count: usize) -> bool {
        match self {
            CountRule::AtLeast(limit) => count >= limit,
            CountRule::MoreThan(limit) => count > limit,
        }
    }
}

/// Parameters distinguishing the two diagnostic endpoints.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticProfile {
    /// Number of most-recent readings inspected.
    pub window: u32,
    pub high_temp_rule: CountRule,
    pub fault_rule: CountRule,
    /// When set, a device with no readings is an error rather than an
    /// all-clear.
    pub require_readings: bool,
    pub high_temp_advice: &'static str,
    pub fault_advice: &'static str,
}

impl DiagnosticProfile {
    /// Profile behind `GET /devices/{id}/diagnostics`: five readings,
    /// inclusive thresholds, empty window is a valid all-clear.
    pub fn standard() -> Self {
        Self {
            window: 5,
            high_temp_rule: CountRule::AtLeast(3),
            fault_rule: CountRule::AtLeast(2),
            require_readings: false,
            high_temp_advice:
                "High temperature detected in multiple readings. Recommend checking HVAC system.",
            fault_advice:
                "Frequent fault status reported. Consider inspecting the device.",
        }
    }

    /// Profile behind `GET /ai/diagnose/{id}`: ten readings, strictly
    /// greater comparisons, and no data at all is reported instead of
    /// "normal".
    pub fn extended() -> Self {
        Self {
            window: 10,
            high_temp_rule: CountRule::MoreThan(3),
            fault_rule: CountRule::MoreThan(2),
            require_readings: true,
            high_temp_advice:
                "High temperature detected. Suggest checking cooling system and ventilation.",
            fault_advice:
                "Multiple fault statuses detected. Recommend inspecting device hardware.",
        }
    }
}

/// Evaluator output, shaped by each endpoint into its response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub readings_considered: usize,
    pub high_temp_count: usize,
    pub fault_count: usize,
    pub recommendation: &'static str,
}

/// Run one profile over a window of readings (most recent first).
///
/// The high-temperature branch is checked before the fault branch; only
/// one recommendation is ever returned.
pub fn evaluate(
    profile: &DiagnosticProfile,
    readings: &[ReadingSample],
) -> Result<DiagnosticReport, DiagnosticsError> {
    if profile.require_readings && readings.is_empty() {
        return Err(DiagnosticsError::NoReadings);
    }

    let high_temp_count = readings
        .iter()
        .filter(|r| r.temperature >= HIGH_TEMP_THRESHOLD)
        .count();
    let fault_count = readings
        .iter()
        .filter(|r| r.status.to_lowercase().contains(FAULT_MARKER))
        .count();

    let recommendation = if profile.high_temp_rule.is_met(high_temp_count) {
        profile.high_temp_advice
    } else if profile.fault_rule.is_met(fault_count) {
        profile.fault_advice
    } else {
        NORMAL_ADVICE
    };

    Ok(DiagnosticReport {
        readings_considered: readings.len(),
        high_temp_count,
        fault_count,
        recommendation,
    })
}
