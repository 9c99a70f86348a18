//! Acceptance gate over baseline and improved metrics.

use crate::metrics::{Metric, MetricSet};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Gate parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    /// Primary metrics that must strictly improve.
    #[serde(default = "default_min_improved")]
    pub min_improved: usize,
    /// Largest tolerated drop, in percentage points.
    #[serde(default = "default_max_regression_pct")]
    pub max_regression_pct: f64,
    /// Regressions kept in a persisted report.
    #[serde(default = "default_regression_report_cap")]
    pub regression_report_cap: usize,
}

fn default_min_improved() -> usize {
    2
}

fn default_max_regression_pct() -> f64 {
    2.0
}

fn default_regression_report_cap() -> usize {
    20
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_improved: default_min_improved(),
            max_regression_pct: default_max_regression_pct(),
            regression_report_cap: default_regression_report_cap(),
        }
    }
}

/// Change in one primary metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub metric: Metric,
    pub label: String,
    pub baseline: f64,
    pub improved: f64,
    pub delta: f64,
}

impl MetricDelta {
    pub fn between(metric: Metric, baseline: &MetricSet, improved: &MetricSet) -> Self {
        let (b, i) = (baseline.get(metric), improved.get(metric));
        Self {
            metric,
            label: metric.label().to_string(),
            baseline: b,
            improved: i,
            delta: i - b,
        }
    }
}

/// Outcome of comparing two metric sets.
#[derive(Clone, Debug, PartialEq)]
pub struct GateDecision {
    pub deltas: Vec<MetricDelta>,
    pub improved_count: usize,
    /// Gate A: enough metrics improved.
    pub majority_improved: bool,
    /// Gate B: no metric dropped past the threshold.
    pub no_severe_regression: bool,
    pub passed: bool,
    pub messages: Vec<String>,
}

/// Accept-or-reject decision for a retrained model. Pure: it reads two
/// metric sets and mutates nothing.
#[derive(Clone, Debug, Default)]
pub struct ImprovementGate {
    thresholds: GateThresholds,
}

impl ImprovementGate {
    pub fn new(thresholds: GateThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &GateThresholds {
        &self.thresholds
    }

    pub fn compare(&self, baseline: &MetricSet, improved: &MetricSet) -> GateDecision {
        let deltas: Vec<MetricDelta> = Metric::PRIMARY
            .iter()
            .map(|&m| MetricDelta::between(m, baseline, improved))
            .collect();

        let mut messages = Vec::new();
        let mut improved_count = 0;
        let mut severe = false;
        for d in &deltas {
            if d.delta > 0.0 {
                improved_count += 1;
            }
            if d.delta < -self.thresholds.max_regression_pct {
                severe = true;
                messages.push(format!(
                    "REGRESSION: {} dropped {:.1}% (> {}% threshold)",
                    d.label,
                    d.delta.abs(),
                    self.thresholds.max_regression_pct
                ));
            }
        }

        let total = deltas.len();
        let majority_improved = improved_count >= self.thresholds.min_improved;
        if majority_improved {
            messages.push(format!(
                "PASS: {}/{} metrics improved (need >= {})",
                improved_count, total, self.thresholds.min_improved
            ));
        } else {
            messages.push(format!(
                "FAIL: Only {}/{} metrics improved (need >= {})",
                improved_count, total, self.thresholds.min_improved
            ));
        }
        if severe {
            messages.push(format!(
                "FAIL: Regression exceeds {}% threshold",
                self.thresholds.max_regression_pct
            ));
        } else {
            messages.push(format!(
                "PASS: No metric regressed > {}%",
                self.thresholds.max_regression_pct
            ));
        }

        let passed = majority_improved && !severe;
        info!(improved_count, severe, passed, "improvement gate evaluated");
        GateDecision {
            deltas,
            improved_count,
            majority_improved,
            no_severe_regression: !severe,
            passed,
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(assembled: f64, verified: f64, witness: f64) -> MetricSet {
        MetricSet {
            assembled_pct: assembled,
            verified_pct: verified,
            witness_pass_pct: witness,
            ..Default::default()
        }
    }

    #[test]
    fn two_of_three_improved_passes() {
        let decision =
            ImprovementGate::default().compare(&metrics(80.0, 70.0, 60.0), &metrics(85.0, 69.0, 65.0));
        assert_eq!(decision.improved_count, 2);
        assert!(decision.majority_improved);
        assert!(decision.no_severe_regression);
        assert!(decision.passed);
        let deltas: Vec<f64> = decision.deltas.iter().map(|d| d.delta).collect();
        assert_eq!(deltas, [5.0, -1.0, 5.0]);
        assert_eq!(
            decision.messages,
            vec![
                "PASS: 2/3 metrics improved (need >= 2)".to_string(),
                "PASS: No metric regressed > 2%".to_string(),
            ]
        );
    }

    #[test]
    fn severe_drop_fails() {
        let decision =
            ImprovementGate::default().compare(&metrics(80.0, 70.0, 60.0), &metrics(80.0, 70.0, 55.0));
        assert_eq!(decision.improved_count, 0);
        assert!(!decision.passed);
        assert_eq!(
            decision.messages,
            vec![
                "REGRESSION: Witness pass dropped 5.0% (> 2% threshold)".to_string(),
                "FAIL: Only 0/3 metrics improved (need >= 2)".to_string(),
                "FAIL: Regression exceeds 2% threshold".to_string(),
            ]
        );
    }

    #[test]
    fn drop_at_threshold_is_tolerated() {
        let decision =
            ImprovementGate::default().compare(&metrics(80.0, 70.0, 60.0), &metrics(82.0, 72.0, 58.0));
        assert!(decision.no_severe_regression);
        assert!(decision.passed);
    }

    #[test]
    fn improvement_with_severe_drop_still_fails() {
        let decision =
            ImprovementGate::default().compare(&metrics(80.0, 70.0, 60.0), &metrics(90.0, 80.0, 50.0));
        assert!(decision.majority_improved);
        assert!(!decision.no_severe_regression);
        assert!(!decision.passed);
    }

    #[test]
    fn unchanged_metrics_fail_majority() {
        let m = metrics(80.0, 70.0, 60.0);
        let decision = ImprovementGate::default().compare(&m, &m);
        assert!(!decision.majority_improved);
        assert!(decision.deltas.iter().all(|d| d.delta == 0.0));
    }

    #[test]
    fn custom_thresholds() {
        let gate = ImprovementGate::new(GateThresholds {
            min_improved: 1,
            max_regression_pct: 10.0,
            ..Default::default()
        });
        let decision = gate.compare(&metrics(80.0, 70.0, 60.0), &metrics(81.0, 65.0, 55.0));
        assert!(decision.passed);
        assert_eq!(decision.messages[0], "PASS: 1/3 metrics improved (need >= 1)");
    }
}
