//! # Core Domain Entities
//!
//! The batch/pair vocabulary of the pipeline.
//!
//! ## Clusters
//!
//! - **Batch**: `BatchId`, `BatchLineItem`
//! - **Allocation**: `AllocatedPair`
//! - **Routing**: `QuestionnaireType`, `PackCode`, `Supplier`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EntityError;

/// Required length of a populated unique access code.
pub const UAC_LENGTH: usize = 16;

/// Globally unique identifier for one batch invocation.
///
/// Minted once per run and stamped on every allocation request, every
/// confirmation event and every fetched pair. Without it, confirmations
/// from concurrent unrelated batches would be indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Mint a fresh batch identifier.
    #[must_use]
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (e.g. one supplied on the command line).
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from the hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::InvalidBatchId` if the input is not a UUID.
    pub fn parse(input: &str) -> Result<Self, EntityError> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| EntityError::InvalidBatchId(input.to_string()))
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-character questionnaire type code.
///
/// QIDs begin with their questionnaire type, which is how the store query
/// scopes a fetch to one type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionnaireType(String);

impl QuestionnaireType {
    /// Validate and wrap a questionnaire type code.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::InvalidQuestionnaireType` unless the code is
    /// exactly two ASCII digits.
    pub fn new(code: &str) -> Result<Self, EntityError> {
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(code.to_string()))
        } else {
            Err(EntityError::InvalidQuestionnaireType(code.to_string()))
        }
    }

    /// The raw two-character code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a QID belongs to this questionnaire type (prefix match).
    #[must_use]
    pub fn matches_qid(&self, qid: &str) -> bool {
        qid.starts_with(self.0.as_str())
    }
}

impl std::fmt::Display for QuestionnaireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies the physical/print product variant (language, region,
/// delivery mode). Classification into row variants is catalog data, not
/// logic on this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackCode(String);

impl PackCode {
    /// Wrap a pack code string.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.to_string())
    }

    /// The raw pack code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The print supplier a batch is destined for.
///
/// Suppliers are catalog keys (column template, key material, transfer
/// directory), so this stays an open string rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Supplier(String);

impl Supplier {
    /// Wrap a supplier identifier, normalized to uppercase.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_ascii_uppercase())
    }

    /// The normalized supplier identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Supplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (questionnaire type, pack code, quantity) row of the batch
/// configuration. Immutable once loaded; configuration order determines
/// output file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLineItem {
    /// Questionnaire type the allocator mints pairs for.
    pub questionnaire_type: QuestionnaireType,
    /// Product pack code of the print output.
    pub pack_code: PackCode,
    /// Exact number of UAC/QID pairs required.
    pub quantity: u32,
}

impl BatchLineItem {
    /// Construct a line item.
    ///
    /// # Errors
    ///
    /// Returns `EntityError::ZeroQuantity` for a zero quantity.
    pub fn new(
        questionnaire_type: QuestionnaireType,
        pack_code: PackCode,
        quantity: u32,
    ) -> Result<Self, EntityError> {
        if quantity == 0 {
            return Err(EntityError::ZeroQuantity {
                pack_code: pack_code.to_string(),
            });
        }
        Ok(Self {
            questionnaire_type,
            pack_code,
            quantity,
        })
    }
}

/// A UAC/QID pair as returned by the store.
///
/// Created by the allocator, consumed read-only by this pipeline, never
/// mutated by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedPair {
    /// Unique access code; 16 characters when populated.
    pub uac: String,
    /// Questionnaire identifier; begins with the questionnaire type.
    pub qid: String,
    /// The batch this pair was allocated under.
    pub batch_id: BatchId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_roundtrip() {
        let id = BatchId::mint();
        let parsed = BatchId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_batch_id_rejects_garbage() {
        assert!(matches!(
            BatchId::parse("not-a-uuid"),
            Err(EntityError::InvalidBatchId(_))
        ));
    }

    #[test]
    fn test_questionnaire_type_validation() {
        assert!(QuestionnaireType::new("01").is_ok());
        assert!(QuestionnaireType::new("1").is_err());
        assert!(QuestionnaireType::new("011").is_err());
        assert!(QuestionnaireType::new("ab").is_err());
    }

    #[test]
    fn test_questionnaire_type_matches_qid() {
        let qtype = QuestionnaireType::new("01").unwrap();
        assert!(qtype.matches_qid("0123456789"));
        assert!(!qtype.matches_qid("0223456789"));
    }

    #[test]
    fn test_supplier_normalizes_case() {
        assert_eq!(Supplier::new("qm").as_str(), "QM");
    }

    #[test]
    fn test_line_item_rejects_zero_quantity() {
        let qtype = QuestionnaireType::new("01").unwrap();
        let result = BatchLineItem::new(qtype, PackCode::new("D_FD_H1"), 0);
        assert!(matches!(result, Err(EntityError::ZeroQuantity { .. })));
    }

    #[test]
    fn test_batch_id_serde_transparent() {
        let id = BatchId::mint();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
