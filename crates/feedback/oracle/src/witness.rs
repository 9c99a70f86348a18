use crate::oracle::WitnessRun;

/// Pass count derived from a witness run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessTally {
    pub total: usize,
    pub ok: usize,
    /// Set when the marker scan disagrees with the exit status.
    pub anomaly: Option<String>,
}

impl WitnessTally {
    /// Tally `total` vectors against a run.
    ///
    /// Exit 0 means every vector passed. Otherwise at least one failed, so the
    /// scanned `PASS` count is capped at `total - 1`; a scan above that cap is
    /// reported as an anomaly rather than trusted.
    pub fn from_run(total: usize, run: &WitnessRun) -> Self {
        if run.all_passed {
            return Self {
                total,
                ok: total,
                anomaly: None,
            };
        }

        let markers = count_pass_markers(&run.stdout);
        let ceiling = total.saturating_sub(1);
        let anomaly = (markers > ceiling).then(|| {
            format!(
                "witness run failed but output shows {} pass markers for {} vectors",
                markers, total
            )
        });
        Self {
            total,
            ok: markers.min(ceiling),
            anomaly,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.ok == self.total
    }
}

/// Lines whose text contains `PASS`, case-insensitively.
pub fn count_pass_markers(stdout: &str) -> usize {
    stdout
        .lines()
        .filter(|line| line.to_ascii_uppercase().contains("PASS"))
        .count()
}
