//! # File Assembler
//!
//! Streams built rows into a delimited text buffer and enforces the
//! exact-quantity invariant.
//!
//! This is the single most important correctness gate in the system: a
//! wrong count requested, a lost message or a race with another batch all
//! surface here, and must fail the batch before the output leaves it.

use crate::domain::catalog::{RowVariant, SupplierTemplate};
use crate::domain::row::build_row;
use crate::errors::PrintFileError;
use crate::ports::outbound::StoreError;
use shared_types::{AllocatedPair, BatchLineItem};

/// Field delimiter within a print row.
pub const FIELD_DELIMITER: char = '|';

/// Physical line terminator, fixed by the supplier contract.
pub const LINE_TERMINATOR: &str = "\r\n";

/// An assembled (still unencrypted) print-file buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledFile {
    /// Delimited row data, one physical line per pair, no header.
    pub bytes: Vec<u8>,
    /// Number of rows written.
    pub rows: u32,
}

/// Assemble the print-file buffer for one line item.
///
/// Consumes the pair sequence exactly once. After exhausting it, the row
/// count is compared against the configured quantity: under-count and
/// over-count are both fatal, and the caller aborts the whole batch rather
/// than delivering a partial or incorrect file.
///
/// # Errors
///
/// - [`PrintFileError::QuantityMismatch`] when the row count differs from
///   the line item quantity.
/// - [`PrintFileError::Store`] when the pair sequence yields a store error.
pub fn assemble<I>(
    pairs: I,
    line_item: &BatchLineItem,
    template: &SupplierTemplate,
    variant: RowVariant,
) -> Result<AssembledFile, PrintFileError>
where
    I: IntoIterator<Item = Result<AllocatedPair, StoreError>>,
{
    let mut buffer = String::new();
    let mut rows = 0u32;

    for pair in pairs {
        let pair = pair?;
        let row = build_row(&pair, line_item, template, variant);
        buffer.push_str(&row.to_line(FIELD_DELIMITER));
        buffer.push_str(LINE_TERMINATOR);
        rows += 1;
    }

    if rows != line_item.quantity {
        return Err(PrintFileError::QuantityMismatch {
            expected: line_item.quantity,
            found: rows,
            questionnaire_type: line_item.questionnaire_type.to_string(),
        });
    }

    Ok(AssembledFile {
        bytes: buffer.into_bytes(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::supplier_template;
    use shared_types::{BatchId, PackCode, QuestionnaireType, Supplier};

    fn line_item(quantity: u32) -> BatchLineItem {
        BatchLineItem::new(
            QuestionnaireType::new("01").unwrap(),
            PackCode::new("D_FD_H1"),
            quantity,
        )
        .unwrap()
    }

    fn pairs(count: usize) -> Vec<Result<AllocatedPair, StoreError>> {
        let batch_id = BatchId::mint();
        (0..count)
            .map(|n| {
                Ok(AllocatedPair {
                    uac: format!("UAC{n:013}"),
                    qid: format!("01{n:08}"),
                    batch_id,
                })
            })
            .collect()
    }

    #[test]
    fn test_assemble_exact_quantity() {
        let template = supplier_template(&Supplier::new("QM")).unwrap();
        let assembled = assemble(pairs(2), &line_item(2), template, RowVariant::Standard).unwrap();

        assert_eq!(assembled.rows, 2);
        let text = String::from_utf8(assembled.bytes).unwrap();
        assert_eq!(text.matches("\r\n").count(), 2);
        assert!(text.ends_with("\r\n"));
        assert!(!text.starts_with("UAC|")); // no header row
    }

    #[test]
    fn test_under_count_raises_mismatch() {
        let template = supplier_template(&Supplier::new("QM")).unwrap();
        let result = assemble(pairs(2), &line_item(10), template, RowVariant::Standard);

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            PrintFileError::QuantityMismatch {
                expected: 10,
                found: 2,
                ..
            }
        ));
        assert!(err
            .to_string()
            .contains("expected = 10, found = 2, questionnaire type = 01"));
    }

    #[test]
    fn test_over_count_raises_mismatch() {
        let template = supplier_template(&Supplier::new("QM")).unwrap();
        let result = assemble(pairs(3), &line_item(2), template, RowVariant::Standard);

        assert!(matches!(
            result,
            Err(PrintFileError::QuantityMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_store_error_propagates() {
        let template = supplier_template(&Supplier::new("QM")).unwrap();
        let failing = vec![Err(StoreError::Query("connection reset".to_string()))];
        let result = assemble(failing, &line_item(1), template, RowVariant::Standard);

        assert!(matches!(result, Err(PrintFileError::Store(_))));
    }

    #[test]
    fn test_no_identifier_rows_have_empty_uac_field() {
        let template = supplier_template(&Supplier::new("QM")).unwrap();
        let item = BatchLineItem::new(
            QuestionnaireType::new("01").unwrap(),
            PackCode::new("D_CCS_CH1"),
            2,
        )
        .unwrap();

        let assembled = assemble(pairs(2), &item, template, RowVariant::NoIdentifier).unwrap();
        let text = String::from_utf8(assembled.bytes).unwrap();
        for line in text.lines() {
            assert!(line.starts_with('|'), "UAC field should be empty: {line}");
            assert!(line.contains("D_CCS_CH1"));
        }
    }
}
