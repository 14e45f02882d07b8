//! Field-presence rules for table inference

use crate::types::{Record, Table};

/// A single inference rule: every listed field must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRule {
    /// Table the rule routes to
    pub table: Table,
    /// Fields that must all be present as keys
    pub required_fields: &'static [&'static str],
}

impl TableRule {
    /// Check whether a record carries every required field.
    ///
    /// Presence is key presence: a field set to null still counts.
    pub fn matches(&self, record: &Record) -> bool {
        self.required_fields
            .iter()
            .all(|field| record.contains_key(*field))
    }
}

/// Inference rules in priority order
pub const TABLE_RULES: [TableRule; 5] = [
    TableRule {
        table: Table::Professionals,
        required_fields: &["displayName", "category"],
    },
    TableRule {
        table: Table::Reviews,
        required_fields: &["professionalId", "rating"],
    },
    TableRule {
        table: Table::Stories,
        required_fields: &["elements", "backgroundColor"],
    },
    TableRule {
        table: Table::Users,
        required_fields: &["openId", "userType"],
    },
    TableRule {
        table: Table::Categories,
        required_fields: &["name", "icon", "displayOrder"],
    },
];

/// Infer the destination table from a file's first record
pub fn infer_table(record: &Record) -> Option<Table> {
    TABLE_RULES
        .iter()
        .find(|rule| rule.matches(record))
        .map(|rule| rule.table)
}
