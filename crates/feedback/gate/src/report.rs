use crate::gate::{GateDecision, MetricDelta};
use crate::metrics::MetricSet;
use crate::regression::{Regression, RegressionScan};
use nolang_feedback_types::now_timestamp;
use serde::{Deserialize, Serialize};

/// Regressions shown when rendering a report for the terminal.
const PRINTED_REGRESSIONS: usize = 10;

/// Persisted result of one feedback cycle's gate check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementReport {
    pub timestamp: String,
    pub cycle: u32,
    pub baseline: MetricSet,
    pub improved: MetricSet,
    pub deltas: Vec<MetricDelta>,
    pub majority_improved: bool,
    pub no_severe_regression: bool,
    pub gate_passed: bool,
    pub gate_messages: Vec<String>,
    /// Uncapped number of regressions found.
    pub regression_count: usize,
    /// At most `cap` regressions.
    pub regressions: Vec<Regression>,
}

impl ImprovementReport {
    pub fn new(
        cycle: u32,
        baseline: MetricSet,
        improved: MetricSet,
        decision: GateDecision,
        scan: Option<RegressionScan>,
        cap: usize,
    ) -> Self {
        let (regression_count, regressions) = match scan {
            Some(scan) => {
                let count = scan.count();
                (count, scan.regressions.into_iter().take(cap).collect())
            }
            None => (0, Vec::new()),
        };
        Self {
            timestamp: now_timestamp(),
            cycle,
            baseline,
            improved,
            deltas: decision.deltas,
            majority_improved: decision.majority_improved,
            no_severe_regression: decision.no_severe_regression,
            gate_passed: decision.passed,
            gate_messages: decision.messages,
            regression_count,
            regressions,
        }
    }

    /// Terminal rendering: metric table, gate messages, first regressions.
    pub fn render(&self) -> Vec<String> {
        let rule = "-".repeat(54);
        let mut lines = vec![
            "=".repeat(70),
            format!("IMPROVEMENT REPORT (Cycle {})", self.cycle),
            "=".repeat(70),
            String::new(),
            format!("{:<22} {:>10} {:>10} {:>10}", "Metric", "Baseline", "Improved", "Delta"),
            rule.clone(),
        ];
        for d in &self.deltas {
            let sign = if d.delta >= 0.0 { "+" } else { "" };
            lines.push(format!(
                "  {:<20} {:>8.1}%  {:>8.1}%  {}{:>7.1}%",
                d.label, d.baseline, d.improved, sign, d.delta
            ));
        }

        lines.push(String::new());
        lines.push("Gates".to_string());
        lines.push(rule.clone());
        lines.extend(self.gate_messages.iter().map(|m| format!("  {}", m)));
        lines.push(String::new());
        lines.push(format!(
            "  Overall: {}",
            if self.gate_passed { "PASS" } else { "FAIL" }
        ));

        if self.regression_count > 0 {
            lines.push(String::new());
            lines.push(format!("Regressions ({} examples):", self.regression_count));
            lines.push(rule);
            for reg in self.regressions.iter().take(PRINTED_REGRESSIONS) {
                lines.push(format!("  {}", reg.key.chars().take(60).collect::<String>()));
                if !reg.improved_errors.is_empty() {
                    let shown: Vec<&str> = reg
                        .improved_errors
                        .iter()
                        .take(2)
                        .map(String::as_str)
                        .collect();
                    lines.push(format!("    Errors: {}", shown.join("; ")));
                }
            }
            if self.regression_count > PRINTED_REGRESSIONS {
                lines.push(format!(
                    "  ... and {} more",
                    self.regression_count - PRINTED_REGRESSIONS
                ));
            }
        }
        lines.push("=".repeat(70));
        lines
    }
}
