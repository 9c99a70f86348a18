use serde::{Deserialize, Serialize};

/// One witness test vector, forwarded to the oracle untouched.
pub type Witness = serde_json::Value;

/// Outcome of validating one candidate program.
///
/// Immutable once built. The builder enforces that nothing past assembly can
/// be recorded for a candidate that never assembled, so
/// `fully_valid() ⇒ assembled() ∧ verified()` holds for every value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ValidationRecord", into = "ValidationRecord")]
pub struct ValidationResult {
    final_text: String,
    hash_patched: bool,
    assembled: bool,
    verified: bool,
    witnesses_total: usize,
    witnesses_ok: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    pub fn builder(final_text: impl Into<String>) -> ValidationResultBuilder {
        ValidationResultBuilder {
            inner: ValidationResult {
                final_text: final_text.into(),
                hash_patched: false,
                assembled: false,
                verified: false,
                witnesses_total: 0,
                witnesses_ok: 0,
                errors: Vec::new(),
                warnings: Vec::new(),
            },
        }
    }

    /// Text that was (or would have been) handed to the assembler.
    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    pub fn hash_patched(&self) -> bool {
        self.hash_patched
    }

    pub fn assembled(&self) -> bool {
        self.assembled
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn witnesses_total(&self) -> usize {
        self.witnesses_total
    }

    pub fn witnesses_ok(&self) -> usize {
        self.witnesses_ok
    }

    /// True only when witnesses were run and every one passed.
    pub fn witnesses_passed(&self) -> bool {
        self.witnesses_total > 0 && self.witnesses_ok == self.witnesses_total
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Data-quality signals that did not affect validity.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn fully_valid(&self) -> bool {
        self.assembled && self.verified
    }
}

/// Accumulates pipeline progress into a [`ValidationResult`].
#[derive(Debug)]
pub struct ValidationResultBuilder {
    inner: ValidationResult,
}

impl ValidationResultBuilder {
    pub fn final_text(mut self, text: impl Into<String>) -> Self {
        self.inner.final_text = text.into();
        self
    }

    pub fn hash_patched(mut self, patched: bool) -> Self {
        self.inner.hash_patched = patched;
        self
    }

    pub fn assembled(mut self, assembled: bool) -> Self {
        self.inner.assembled = assembled;
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.inner.verified = verified;
        self
    }

    /// Record a witness run. `ok` is clamped to `total`.
    pub fn witnesses(mut self, total: usize, ok: usize) -> Self {
        self.inner.witnesses_total = total;
        self.inner.witnesses_ok = ok.min(total);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.inner.errors.push(message.into());
        self
    }

    pub fn warning(mut self, message: impl Into<String>) -> Self {
        self.inner.warnings.push(message.into());
        self
    }

    pub fn build(self) -> ValidationResult {
        let mut result = self.inner;
        if !result.assembled {
            result.verified = false;
            result.witnesses_total = 0;
            result.witnesses_ok = 0;
        }
        result
    }
}

/// Wire form. Accepts the legacy snake_case names written by older tooling.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ValidationRecord {
    #[serde(alias = "assembly", alias = "final_text")]
    final_text: String,
    #[serde(alias = "hash_patched")]
    hash_patched: bool,
    assembled: bool,
    verified: bool,
    #[serde(alias = "witnesses_total")]
    witnesses_total: usize,
    #[serde(alias = "witnesses_ok")]
    witnesses_ok: usize,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    // Derived; written for readers, ignored on input.
    #[serde(skip_deserializing)]
    witnesses_passed: bool,
    #[serde(skip_deserializing)]
    fully_valid: bool,
}

impl From<ValidationRecord> for ValidationResult {
    fn from(record: ValidationRecord) -> Self {
        let builder = ValidationResult::builder(record.final_text)
            .hash_patched(record.hash_patched)
            .assembled(record.assembled)
            .verified(record.verified)
            .witnesses(record.witnesses_total, record.witnesses_ok);
        let builder = record.errors.into_iter().fold(builder, |b, e| b.error(e));
        record
            .warnings
            .into_iter()
            .fold(builder, |b, w| b.warning(w))
            .build()
    }
}

impl From<ValidationResult> for ValidationRecord {
    fn from(result: ValidationResult) -> Self {
        Self {
            witnesses_passed: result.witnesses_passed(),
            fully_valid: result.fully_valid(),
            final_text: result.final_text,
            hash_patched: result.hash_patched,
            assembled: result.assembled,
            verified: result.verified,
            witnesses_total: result.witnesses_total,
            witnesses_ok: result.witnesses_ok,
            errors: result.errors,
            warnings: result.warnings,
        }
    }
}
