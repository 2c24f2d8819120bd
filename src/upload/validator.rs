use crate::upload::types::{RawRow, UploadTypeDescriptor, ValidationOutcome};

/// Required labels absent from the first row, in descriptor order.
///
/// Only the first row is inspected. Rows after it are assumed to share its
/// columns, so a later row that lacks a column still passes.
pub fn missing_columns(rows: &[RawRow], descriptor: &UploadTypeDescriptor) -> Vec<String> {
    let first = rows.first();
    descriptor
        .required_labels()
        .filter(|label| !first.map(|row| row.contains_label(label)).unwrap_or(false))
        .map(String::from)
        .collect()
}

pub fn validate(rows: Vec<RawRow>, descriptor: &UploadTypeDescriptor) -> ValidationOutcome {
    let missing = missing_columns(&rows, descriptor);
    if missing.is_empty() {
        ValidationOutcome::Valid(rows)
    } else {
        ValidationOutcome::Invalid(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::registry::SchemaRegistry;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    fn payment_row() -> RawRow {
        row(&[
            ("Customer ID", "C-1"),
            ("Pay Mode", "Cash"),
            ("Pay Type", "Renewal"),
            ("Pay Amount", "100"),
        ])
    }

    #[test]
    fn first_row_with_all_labels_is_valid() {
        let registry = SchemaRegistry::builtin();
        let d = registry.descriptor_for("bulk_payment").unwrap();
        let rows = vec![payment_row(), payment_row()];
        assert_eq!(validate(rows.clone(), d), ValidationOutcome::Valid(rows));
    }

    #[test]
    fn values_do_not_matter_only_labels() {
        let registry = SchemaRegistry::builtin();
        let d = registry.descriptor_for("bulk_payment").unwrap();
        let rows = vec![row(&[
            ("Customer ID", ""),
            ("Pay Mode", ""),
            ("Pay Type", ""),
            ("Pay Amount", ""),
        ])];
        assert!(validate(rows, d).is_valid());
    }

    #[test]
    fn reports_exactly_the_missing_labels() {
        let registry = SchemaRegistry::builtin();
        let d = registry.descriptor_for("bulk_payment").unwrap();
        let rows = vec![row(&[("Customer ID", "C-1"), ("Pay Type", "x"), ("Extra", "y")])];
        assert_eq!(
            validate(rows, d),
            ValidationOutcome::Invalid(vec!["Pay Mode".into(), "Pay Amount".into()])
        );
    }

    #[test]
    fn labels_are_case_sensitive() {
        let registry = SchemaRegistry::builtin();
        let d = registry.descriptor_for("bulk_payment").unwrap();
        let first = row(&[
            ("Customer ID", "C-1"),
            ("Pay Mode", "Cash"),
            ("Pay Type", "Renewal"),
            ("pay amount", "100"),
        ]);
        assert_eq!(missing_columns(&[first], d), ["Pay Amount"]);
    }

    #[test]
    fn later_rows_are_not_checked() {
        let registry = SchemaRegistry::builtin();
        let d = registry.descriptor_for("bulk_payment").unwrap();
        let rows = vec![payment_row(), row(&[("Customer ID", "C-2")])];
        assert!(validate(rows, d).is_valid());
    }

    #[test]
    fn no_rows_means_everything_is_missing() {
        let registry = SchemaRegistry::builtin();
        let d = registry.descriptor_for("bulk_payment").unwrap();
        assert_eq!(missing_columns(&[], d).len(), 4);
    }

    #[test]
    fn validate_is_repeatable() {
        let registry = SchemaRegistry::builtin();
        let d = registry.descriptor_for("bulk_add_plan").unwrap();
        let rows = vec![payment_row()];
        assert_eq!(validate(rows.clone(), d), validate(rows, d));
    }
}
