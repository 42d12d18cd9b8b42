use crate::form::FormState;
use crate::store::Cell;
use crate::types::{StaffKind, Variant};
use crate::validate::format_name;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One submission as an ordered list of `(column, value)` pairs. The store
/// is written positionally, so the order here is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRow {
    columns: Vec<(String, Cell)>,
    fixed: usize,
}

impl SubmissionRow {
    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn values(&self) -> Vec<Cell> {
        self.columns.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.columns.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of leading columns that every variant shares (timestamp
    /// through the salary fields). The tail depends on the variant and on
    /// roster sizes.
    pub fn fixed_column_count(&self) -> usize {
        self.fixed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn push(&mut self, key: impl Into<String>, value: impl Into<Cell>) {
        self.columns.push((key.into(), value.into()));
    }
}

pub fn flatten(form: &FormState, variant: Variant, now: DateTime<Utc>) -> SubmissionRow {
    let mut row = SubmissionRow {
        columns: Vec::new(),
        fixed: 0,
    };
    let info = &form.school_info;

    row.push(TIMESTAMP_COLUMN, now.format(TIMESTAMP_FORMAT).to_string());
    row.push("Zone", info.zone.clone().unwrap_or_default());
    row.push("Region", info.region.clone().unwrap_or_default());
    row.push("Division", info.division.clone().unwrap_or_default());
    row.push("School Name", format_name(&info.school_name));
    row.push("Head Teacher", format_name(&info.head_teacher));
    row.push("Phone", info.phone.as_str());
    row.push("WhatsApp", info.whatsapp.as_str());

    for (level, record) in form.class_data.iter() {
        row.push(format!("{level} Males"), record.males);
        row.push(format!("{level} Females"), record.females);
        row.push(format!("{level} Tuition"), record.tuition);
    }

    for (_, label, value) in form.financial_data.fields() {
        row.push(label, value);
    }
    row.fixed = row.columns.len();

    match variant {
        Variant::ThreePage => {
            row.push("Teaching Staff Count", form.teaching_staff.count);
            row.push("Non-Teaching Staff Count", form.non_teaching_staff.count);
            row.push("Committee Member Count", form.committee.count);
        }
        Variant::TwoPage => {
            for (i, member) in form.committee.members.iter().enumerate() {
                let n = i + 1;
                row.push(format!("Committee Member {n} Name"), format_name(&member.name));
                row.push(format!("Committee Member {n} Contact"), member.contact.trim());
            }
            for kind in [StaffKind::Teaching, StaffKind::NonTeaching] {
                let prefix = kind.column_label();
                for (i, member) in form.roster(kind).members.iter().enumerate() {
                    let n = i + 1;
                    row.push(format!("{prefix} {n} Name"), format_name(&member.name));
                    row.push(
                        format!("{prefix} {n} Gender"),
                        member.gender.map(|g| g.as_str()).unwrap_or(""),
                    );
                    row.push(
                        format!("{prefix} {n} Education"),
                        member.education.map(|e| e.as_str()).unwrap_or(""),
                    );
                }
            }
        }
    }

    row
}
