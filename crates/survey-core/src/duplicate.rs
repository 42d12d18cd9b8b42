//! Advisory duplicate check against rows already in the store.
//!
//! A school counts as already submitted when head teacher, phone, WhatsApp,
//! region and division all match one existing row. The check is a full scan
//! with no lock, so two sessions racing can both pass.

use crate::error::Result;
use crate::form::SchoolInfo;
use crate::store::{Record, SheetStore};
use crate::validate::format_name;

pub fn is_duplicate(store: &dyn SheetStore, info: &SchoolInfo) -> Result<bool> {
    let records = store.read_all_records()?;
    let candidate = Candidate::from_info(info);
    let found = records.iter().any(|r| candidate.matches(r));
    if found {
        tracing::info!(
            head_teacher = %candidate.head_teacher,
            region = %candidate.region,
            "duplicate submission detected"
        );
    }
    Ok(found)
}

struct Candidate {
    head_teacher: String,
    phone: String,
    whatsapp: String,
    region: String,
    division: String,
}

impl Candidate {
    fn from_info(info: &SchoolInfo) -> Self {
        Self {
            head_teacher: format_name(&info.head_teacher),
            phone: info.phone.trim().to_string(),
            whatsapp: info.whatsapp.trim().to_string(),
            region: info.region.as_deref().unwrap_or("").trim().to_string(),
            division: info.division.as_deref().unwrap_or("").trim().to_string(),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        let field = |key: &str| record.get(key).map(|v| v.trim()).unwrap_or("");
        field("Head Teacher") == self.head_teacher
            && field("Phone") == self.phone
            && field("WhatsApp") == self.whatsapp
            && field("Region") == self.region
            && field("Division") == self.division
    }
}
