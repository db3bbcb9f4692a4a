//! # Product Catalog
//!
//! Static lookup tables driving the pipeline: pack-code classification and
//! per-supplier column templates.
//!
//! Classification is data, not branching logic: adding a pack code or a
//! supplier means adding a table entry, never touching row-building or
//! pipeline code.

use shared_types::{PackCode, Supplier};

/// Which row shape a pack code produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVariant {
    /// UAC, QID and pack code populated.
    Standard,
    /// Unaddressed/interviewer-managed packs: the UAC field is
    /// intentionally left empty (the identifier is mailed separately or
    /// not at all); QID and pack code populated.
    NoIdentifier,
}

/// One catalog row: everything the pipeline knows about a pack code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackCodeEntry {
    /// The product pack code.
    pub code: &'static str,
    /// Human description carried into the manifest.
    pub description: &'static str,
    /// Dataset tag carried into the manifest.
    pub dataset: &'static str,
    /// Row shape for this pack code.
    pub variant: RowVariant,
}

/// The supported pack codes.
pub const PACK_CODE_CATALOG: &[PackCodeEntry] = &[
    PackCodeEntry {
        code: "D_FD_H1",
        description: "Household Questionnaire pack for England",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_H2",
        description: "Household Questionnaire pack for Wales (English)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_H2W",
        description: "Household Questionnaire pack for Wales (Welsh)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_H4",
        description: "Household Questionnaire pack for Northern Ireland (English)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_HC1",
        description: "Continuation Questionnaire pack for England",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_HC2",
        description: "Continuation Questionnaire pack for Wales (English)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_HC2W",
        description: "Continuation Questionnaire pack for Wales (Welsh)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_HC4",
        description: "Continuation Questionnaire pack for Northern Ireland (English)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_I1",
        description: "Individual Questionnaire pack for England",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_I2",
        description: "Individual Questionnaire pack for Wales (English)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_I2W",
        description: "Individual Questionnaire pack for Wales (Welsh)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FD_I4",
        description: "Individual Questionnaire pack for Northern Ireland (English)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_CCS_CH1",
        description: "CCS Interviewer Household Questionnaire for England and Wales",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_CCS_CH2W",
        description: "CCS Interviewer Household Questionnaire for Wales (Welsh)",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_CCS_CHP1",
        description: "CCS Postback Questionnaire for England and Wales (English)",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_CCS_CHP2W",
        description: "CCS Postback Questionnaire for Wales (Welsh)",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_CCS_CCP1",
        description: "CCS Postback Continuation Questionnaire for England & Wales",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_CCS_CCP2W",
        description: "CCS Postback Continuation Questionnaire for Wales (Welsh)",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_CCS_CCE1",
        description: "CCS Interviewer CE Manager for England & Wales (English)",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_CCS_CCE2W",
        description: "CCS Interviewer CE Manager for Wales (Welsh)",
        dataset: "QM3.1",
        variant: RowVariant::NoIdentifier,
    },
    PackCodeEntry {
        code: "D_FDCE_H1U",
        description: "Household Questionnaire for England (UNADDRESSED)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FDCE_H2U",
        description: "Household Questionnaire for Wales (UNADDRESSED)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FDCE_I1U",
        description: "Individual Questionnaire for England (UNADDRESSED)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_FDCE_I2U",
        description: "Individual Questionnaire for Wales (UNADDRESSED)",
        dataset: "QM3.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_CE1U_ICLCR1",
        description: "CE1 Packs (Hand Delivery) Unaddressed England",
        dataset: "PPD1.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_CE1U_ICLCR2B",
        description: "CE1 Packs (Hand Delivery) Unaddressed Wales",
        dataset: "PPD1.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_ICU_ICLR1",
        description: "ICL with UAC Individual (Hand Delivery) Unaddressed England",
        dataset: "PPD1.1",
        variant: RowVariant::Standard,
    },
    PackCodeEntry {
        code: "D_ICU_ICLR2B",
        description: "ICL with UAC Individual (Hand Delivery) Unaddressed Wales",
        dataset: "PPD1.1",
        variant: RowVariant::Standard,
    },
];

/// An ordered column template for one supplier's print files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplierTemplate {
    /// Supplier identifier (uppercase).
    pub supplier: &'static str,
    /// Ordered column names; unpopulated columns are emitted empty.
    pub columns: &'static [&'static str],
}

/// Questionnaire-manager supplier column order.
const QM_COLUMNS: &[&str] = &[
    "UAC",
    "QUESTIONNAIRE_ID",
    "WALES_UAC",
    "WALES_QUESTIONNAIRE_ID",
    "TITLE",
    "COORDINATOR_ID",
    "FORENAME",
    "SURNAME",
    "ADDRESS_LINE1",
    "ADDRESS_LINE2",
    "ADDRESS_LINE3",
    "TOWN_NAME",
    "POSTCODE",
    "PRODUCTPACK_CODE",
];

/// Postal-print-operator supplier column order.
const PPO_COLUMNS: &[&str] = &[
    "UAC",
    "CASE_REF",
    "TITLE",
    "FORENAME",
    "SURNAME",
    "ADDRESS_LINE1",
    "ADDRESS_LINE2",
    "ADDRESS_LINE3",
    "TOWN_NAME",
    "POSTCODE",
    "PRODUCTPACK_CODE",
    "QUESTIONNAIRE_ID",
    "ORGANISATION_NAME",
    "COORDINATOR_ID",
    "OFFICER_ID",
];

/// The supported suppliers.
pub const SUPPLIER_TEMPLATES: &[SupplierTemplate] = &[
    SupplierTemplate {
        supplier: "QM",
        columns: QM_COLUMNS,
    },
    SupplierTemplate {
        supplier: "PPO",
        columns: PPO_COLUMNS,
    },
];

/// Look up the catalog entry for a pack code.
#[must_use]
pub fn pack_code_entry(pack_code: &PackCode) -> Option<&'static PackCodeEntry> {
    PACK_CODE_CATALOG
        .iter()
        .find(|entry| entry.code == pack_code.as_str())
}

/// Look up the column template for a supplier.
#[must_use]
pub fn supplier_template(supplier: &Supplier) -> Option<&'static SupplierTemplate> {
    SUPPLIER_TEMPLATES
        .iter()
        .find(|template| template.supplier == supplier.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_pack_code_lookup() {
        let entry = pack_code_entry(&PackCode::new("D_FD_H1")).unwrap();
        assert_eq!(entry.variant, RowVariant::Standard);
        assert_eq!(entry.dataset, "QM3.1");
        assert_eq!(entry.description, "Household Questionnaire pack for England");
    }

    #[test]
    fn test_ccs_pack_codes_are_no_identifier() {
        for entry in PACK_CODE_CATALOG {
            if entry.code.starts_with("D_CCS") {
                assert_eq!(
                    entry.variant,
                    RowVariant::NoIdentifier,
                    "{} should omit the UAC",
                    entry.code
                );
            }
        }
    }

    #[test]
    fn test_unknown_pack_code() {
        assert!(pack_code_entry(&PackCode::new("D_NOPE")).is_none());
    }

    #[test]
    fn test_supplier_templates() {
        let qm = supplier_template(&Supplier::new("QM")).unwrap();
        assert_eq!(qm.columns.len(), 14);
        assert_eq!(qm.columns[0], "UAC");
        assert_eq!(qm.columns[13], "PRODUCTPACK_CODE");

        let ppo = supplier_template(&Supplier::new("ppo")).unwrap();
        assert_eq!(ppo.columns.len(), 15);

        assert!(supplier_template(&Supplier::new("XX")).is_none());
    }

    #[test]
    fn test_catalog_has_no_duplicate_codes() {
        for (i, a) in PACK_CODE_CATALOG.iter().enumerate() {
            for b in &PACK_CODE_CATALOG[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
