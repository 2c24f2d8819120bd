use crate::error::{Result, UploadError};
use crate::upload::types::{ColumnDescriptor, UploadTypeDescriptor};
use std::collections::HashSet;

/// Upload types known to this desk, built once at start-up and passed around
/// by reference.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    descriptors: Vec<UploadTypeDescriptor>,
}

impl SchemaRegistry {
    pub fn new(descriptors: Vec<UploadTypeDescriptor>) -> Result<Self> {
        let mut seen_keys = HashSet::new();
        for descriptor in &descriptors {
            if !seen_keys.insert(descriptor.key.as_str()) {
                return Err(UploadError::Config(format!(
                    "upload type '{}' is defined twice",
                    descriptor.key
                )));
            }
            if descriptor.columns.is_empty() {
                return Err(UploadError::Config(format!(
                    "upload type '{}' has no columns",
                    descriptor.key
                )));
            }

            let mut seen_labels = HashSet::new();
            for column in &descriptor.columns {
                if !seen_labels.insert(column.label.as_str()) {
                    return Err(UploadError::Config(format!(
                        "upload type '{}' lists column '{}' twice",
                        descriptor.key, column.label
                    )));
                }
            }
        }

        Ok(Self { descriptors })
    }

    pub fn builtin() -> Self {
        Self {
            descriptors: builtin_descriptors(),
        }
    }

    pub fn descriptor_for(&self, key: &str) -> Result<&UploadTypeDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.key == key)
            .ok_or_else(|| UploadError::UnknownUploadType(key.to_string()))
    }

    pub fn descriptors(&self) -> &[UploadTypeDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn descriptor(key: &str, label: &str, columns: &[(&str, &str)]) -> UploadTypeDescriptor {
    UploadTypeDescriptor {
        key: key.to_string(),
        label: label.to_string(),
        template: format!("{}.csv", key),
        columns: columns
            .iter()
            .map(|(label, key)| ColumnDescriptor::new(label, key))
            .collect(),
    }
}

fn builtin_descriptors() -> Vec<UploadTypeDescriptor> {
    vec![
        descriptor(
            "bulk_payment",
            "Bulk Payment",
            &[
                ("Customer ID", "customer_id"),
                ("Pay Mode", "pay_mode"),
                ("Pay Type", "pay_type"),
                ("Pay Amount", "pay_amount"),
            ],
        ),
        descriptor(
            "bulk_add_plan",
            "Bulk Add Plan",
            &[
                ("Customer ID", "customer_id"),
                ("Smart Card Number", "smart_card_number"),
                ("Plan Code", "plan_code"),
                ("Start Date", "start_date"),
            ],
        ),
        descriptor(
            "bulk_remove_plan",
            "Bulk Remove Plan",
            &[
                ("Customer ID", "customer_id"),
                ("Smart Card Number", "smart_card_number"),
                ("Plan Code", "plan_code"),
                ("Reason", "reason"),
            ],
        ),
        descriptor(
            "bulk_device_pairing",
            "Bulk Device Pairing",
            &[
                ("Smart Card Number", "smart_card_number"),
                ("STB Serial Number", "stb_serial_number"),
                ("Warehouse Code", "warehouse_code"),
            ],
        ),
        descriptor(
            "bulk_customer_registration",
            "Bulk Customer Registration",
            &[
                ("First Name", "first_name"),
                ("Last Name", "last_name"),
                ("Mobile Number", "mobile_number"),
                ("Email", "email"),
                ("Region", "region"),
            ],
        ),
    ]
}
