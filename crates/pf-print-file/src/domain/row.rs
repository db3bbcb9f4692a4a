//! # Print Row Building
//!
//! Maps one allocated pair plus line-item metadata into the supplier's
//! ordered column layout.

use crate::domain::catalog::{RowVariant, SupplierTemplate};
use shared_types::{AllocatedPair, BatchLineItem};

/// Template column populated with the unique access code.
pub const COL_UAC: &str = "UAC";

/// Template column populated with the questionnaire identifier.
pub const COL_QUESTIONNAIRE_ID: &str = "QUESTIONNAIRE_ID";

/// Template column populated with the product pack code.
pub const COL_PRODUCTPACK_CODE: &str = "PRODUCTPACK_CODE";

/// One output row, positional per the supplier template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRow {
    values: Vec<String>,
}

impl PrintRow {
    /// The positional field values.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Render as one delimited physical line (no terminator).
    #[must_use]
    pub fn to_line(&self, delimiter: char) -> String {
        self.values.join(&delimiter.to_string())
    }
}

/// Build one print row from a pair and its owning line item.
///
/// Standard rows populate UAC, QID and pack code; no-identifier rows leave
/// the UAC column intentionally empty. All other template columns are
/// emitted empty.
#[must_use]
pub fn build_row(
    pair: &AllocatedPair,
    line_item: &BatchLineItem,
    template: &SupplierTemplate,
    variant: RowVariant,
) -> PrintRow {
    let values = template
        .columns
        .iter()
        .map(|&column| match column {
            COL_UAC if variant == RowVariant::Standard => pair.uac.clone(),
            COL_QUESTIONNAIRE_ID => pair.qid.clone(),
            COL_PRODUCTPACK_CODE => line_item.pack_code.to_string(),
            _ => String::new(),
        })
        .collect();

    PrintRow { values }
}
