//! # Batch Configuration Parser
//!
//! Parses the tabular batch specification into an ordered sequence of
//! [`BatchLineItem`]s. One row per line item:
//!
//! ```text
//! Questionnaire type,Pack code,Quantity
//! 01,D_FD_H1,2500
//! 01,D_FD_H2,300
//! ```
//!
//! Order is preserved: it determines output file ordering, not correctness.

use crate::entities::{BatchLineItem, PackCode, QuestionnaireType};
use crate::errors::ConfigError;

/// Expected header row of a batch configuration file.
pub const CONFIG_HEADER: &str = "Questionnaire type,Pack code,Quantity";

/// Parse a batch configuration document.
///
/// Blank lines are skipped; field values are trimmed. A trailing newline is
/// tolerated.
///
/// # Errors
///
/// Returns a [`ConfigError`] for a missing/malformed header, a row without
/// exactly three columns, a non-numeric or zero quantity, or an invalid
/// questionnaire type. An empty document (header only) is also an error:
/// a batch with nothing to print is operator error, not a no-op.
pub fn parse_batch_config(input: &str) -> Result<Vec<BatchLineItem>, ConfigError> {
    let mut lines = input.lines().enumerate();

    let (_, header) = lines.next().ok_or(ConfigError::Empty)?;
    if header.trim() != CONFIG_HEADER {
        return Err(ConfigError::MalformedHeader {
            expected: CONFIG_HEADER.to_string(),
            found: header.trim().to_string(),
        });
    }

    let mut items = Vec::new();
    for (index, raw) in lines {
        let line = index + 1; // 1-based for operator-facing messages
        if raw.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [qtype, pack_code, quantity] = fields.as_slice() else {
            return Err(ConfigError::MalformedRow {
                line,
                content: raw.to_string(),
            });
        };

        let quantity: u32 = quantity.parse().map_err(|_| ConfigError::InvalidQuantity {
            line,
            value: (*quantity).to_string(),
        })?;

        let questionnaire_type = QuestionnaireType::new(qtype)
            .map_err(|source| ConfigError::InvalidValue { line, source })?;

        let item = BatchLineItem::new(questionnaire_type, PackCode::new(pack_code), quantity)
            .map_err(|source| ConfigError::InvalidValue { line, source })?;
        items.push(item);
    }

    if items.is_empty() {
        return Err(ConfigError::Empty);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "Questionnaire type,Pack code,Quantity\n01,D_FD_H1,2\n01,D_FD_H2,1\n";

    #[test]
    fn test_parse_valid_config() {
        let items = parse_batch_config(VALID).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].pack_code.as_str(), "D_FD_H1");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].quantity, 1);
    }

    #[test]
    fn test_parse_preserves_order() {
        let input = "Questionnaire type,Pack code,Quantity\n02,D_CCS_CH1,5\n01,D_FD_H1,3\n";
        let items = parse_batch_config(input).unwrap();
        assert_eq!(items[0].pack_code.as_str(), "D_CCS_CH1");
        assert_eq!(items[1].pack_code.as_str(), "D_FD_H1");
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let input = "Questionnaire type,Pack code,Quantity\n\n01,D_FD_H1,2\n\n";
        let items = parse_batch_config(input).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_reject_bad_header() {
        let input = "Type,Pack,Qty\n01,D_FD_H1,2\n";
        assert!(matches!(
            parse_batch_config(input),
            Err(ConfigError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_reject_missing_column() {
        let input = "Questionnaire type,Pack code,Quantity\n01,D_FD_H1\n";
        assert!(matches!(
            parse_batch_config(input),
            Err(ConfigError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_reject_non_numeric_quantity() {
        let input = "Questionnaire type,Pack code,Quantity\n01,D_FD_H1,lots\n";
        assert!(matches!(
            parse_batch_config(input),
            Err(ConfigError::InvalidQuantity { line: 2, .. })
        ));
    }

    #[test]
    fn test_reject_zero_quantity() {
        let input = "Questionnaire type,Pack code,Quantity\n01,D_FD_H1,0\n";
        assert!(matches!(
            parse_batch_config(input),
            Err(ConfigError::InvalidValue { line: 2, .. })
        ));
    }

    #[test]
    fn test_reject_header_only() {
        assert!(matches!(
            parse_batch_config("Questionnaire type,Pack code,Quantity\n"),
            Err(ConfigError::Empty)
        ));
    }
}
