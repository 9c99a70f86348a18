use crate::error::LayerError;
use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};

/// Pipeline stage at which a defect becomes detectable.
///
/// Ordered by severity of detection: a syntax error hides everything after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FailureLayer {
    /// L1: the assembler rejected the text.
    Syntax = 1,
    /// L2: the verifier rejected the binary.
    Verification = 2,
    /// L3: at least one witness vector failed.
    Witness = 3,
    /// L4: structurally valid, rejected by a human reviewer.
    Semantic = 4,
}

impl FailureLayer {
    pub const ALL: [FailureLayer; 4] = [
        FailureLayer::Syntax,
        FailureLayer::Verification,
        FailureLayer::Witness,
        FailureLayer::Semantic,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Syntax => "Syntax",
            Self::Verification => "Verification",
            Self::Witness => "Witness",
            Self::Semantic => "Semantic",
        }
    }

    /// Layers 1-3 are detectable by the toolchain alone.
    pub fn is_structural(self) -> bool {
        self < Self::Semantic
    }
}

impl TryFrom<u8> for FailureLayer {
    type Error = LayerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Syntax),
            2 => Ok(Self::Verification),
            3 => Ok(Self::Witness),
            4 => Ok(Self::Semantic),
            other => Err(LayerError::OutOfRange(other)),
        }
    }
}

impl From<FailureLayer> for u8 {
    fn from(layer: FailureLayer) -> Self {
        layer.number()
    }
}

impl std::fmt::Display for FailureLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Layer {} ({})", self.number(), self.label())
    }
}

/// A defect the toolchain can detect on its own (layers 1-3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuralFault {
    AssemblySyntax,
    Verification,
    WitnessMismatch,
}

impl StructuralFault {
    pub fn layer(self) -> FailureLayer {
        match self {
            Self::AssemblySyntax => FailureLayer::Syntax,
            Self::Verification => FailureLayer::Verification,
            Self::WitnessMismatch => FailureLayer::Witness,
        }
    }
}

/// What a human rejection was about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    /// The program does not do what the intent asks.
    #[default]
    Program,
    /// The program is fine, its generated description is not.
    Description,
}

/// A layer-4 failure.
///
/// Only obtainable from a [`StructuralPass`], so a semantic rejection can never
/// be recorded for a candidate that failed assembly, verification or witnesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SemanticFault {
    concern: Concern,
}

impl SemanticFault {
    pub fn concern(&self) -> Concern {
        self.concern
    }
}

/// Witness that a validation result cleared every structural check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructuralPass {
    _sealed: (),
}

impl StructuralPass {
    /// Run the structural decision order over a validation result.
    ///
    /// Not assembled → L1; not verified → L2; witnesses supplied and not all
    /// passed → L3; otherwise a pass.
    pub fn check(result: &ValidationResult) -> Result<Self, StructuralFault> {
        if !result.assembled() {
            return Err(StructuralFault::AssemblySyntax);
        }
        if !result.verified() {
            return Err(StructuralFault::Verification);
        }
        if result.witnesses_total() > 0 && !result.witnesses_passed() {
            return Err(StructuralFault::WitnessMismatch);
        }
        Ok(Self { _sealed: () })
    }

    /// Turn a structural pass into a semantic rejection.
    pub fn reject(self, concern: Concern) -> SemanticFault {
        SemanticFault { concern }
    }
}

/// Concrete failure type. The layer is a function of the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Structural(StructuralFault),
    Semantic(SemanticFault),
}

impl FailureKind {
    pub fn layer(&self) -> FailureLayer {
        match self {
            Self::Structural(fault) => fault.layer(),
            Self::Semantic(_) => FailureLayer::Semantic,
        }
    }

    /// Persisted `failureType` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural(StructuralFault::AssemblySyntax) => "assembly_syntax",
            Self::Structural(StructuralFault::Verification) => "verification",
            Self::Structural(StructuralFault::WitnessMismatch) => "witness_mismatch",
            Self::Semantic(SemanticFault {
                concern: Concern::Program,
            }) => "semantic_mismatch",
            Self::Semantic(SemanticFault {
                concern: Concern::Description,
            }) => "description_mismatch",
        }
    }

    pub fn is_description_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Semantic(SemanticFault {
                concern: Concern::Description
            })
        )
    }

    /// Decode a persisted `(failureLayer, failureType)` pair.
    ///
    /// Persisted records are trusted to have been classified upstream; the
    /// only check is that the layer agrees with the type.
    pub fn from_persisted(layer: u8, failure_type: &str) -> Result<Self, LayerError> {
        let declared = FailureLayer::try_from(layer)?;
        let kind = match failure_type {
            "assembly_syntax" => Self::Structural(StructuralFault::AssemblySyntax),
            "verification" => Self::Structural(StructuralFault::Verification),
            "witness_mismatch" => Self::Structural(StructuralFault::WitnessMismatch),
            "semantic_mismatch" => Self::Semantic(SemanticFault {
                concern: Concern::Program,
            }),
            "description_mismatch" => Self::Semantic(SemanticFault {
                concern: Concern::Description,
            }),
            other => return Err(LayerError::UnknownType(other.to_string())),
        };
        if kind.layer() != declared {
            return Err(LayerError::Inconsistent {
                failure_type: failure_type.to_string(),
                expected: kind.layer().number(),
                found: layer,
            });
        }
        Ok(kind)
    }
}

impl From<StructuralFault> for FailureKind {
    fn from(fault: StructuralFault) -> Self {
        Self::Structural(fault)
    }
}

impl From<SemanticFault> for FailureKind {
    fn from(fault: SemanticFault) -> Self {
        Self::Semantic(fault)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
