use crate::types::{ClassLevel, Education, Gender, StaffKind, MAX_COMMITTEE, MAX_STAFF};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// SchoolInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolInfo {
    pub zone: Option<String>,
    pub region: Option<String>,
    pub division: Option<String>,
    pub school_name: String,
    pub head_teacher: String,
    pub phone: String,
    pub whatsapp: String,
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassRecord {
    pub males: u32,
    pub females: u32,
    /// Termly tuition in whole cedis.
    pub tuition: u64,
}

impl ClassRecord {
    pub fn is_blank(&self) -> bool {
        self.males == 0 && self.females == 0 && self.tuition == 0
    }
}

/// Pupil numbers for every grade level. Always holds all twelve levels;
/// levels missing from deserialized input are seeded at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ClassLevel, ClassRecord>",
    into = "BTreeMap<ClassLevel, ClassRecord>"
)]
pub struct ClassTable {
    records: BTreeMap<ClassLevel, ClassRecord>,
}

impl Default for ClassTable {
    fn default() -> Self {
        let records = ClassLevel::all()
            .iter()
            .map(|&level| (level, ClassRecord::default()))
            .collect();
        Self { records }
    }
}

impl From<BTreeMap<ClassLevel, ClassRecord>> for ClassTable {
    fn from(partial: BTreeMap<ClassLevel, ClassRecord>) -> Self {
        let mut table = ClassTable::default();
        table.records.extend(partial);
        table
    }
}

impl From<ClassTable> for BTreeMap<ClassLevel, ClassRecord> {
    fn from(table: ClassTable) -> Self {
        table.records
    }
}

impl ClassTable {
    pub fn get(&self, level: ClassLevel) -> ClassRecord {
        self.records.get(&level).copied().unwrap_or_default()
    }

    pub fn set(&mut self, level: ClassLevel, record: ClassRecord) {
        self.records.insert(level, record);
    }

    /// Records in grade order, Creche first.
    pub fn iter(&self) -> impl Iterator<Item = (ClassLevel, ClassRecord)> + '_ {
        self.records.iter().map(|(&level, &record)| (level, record))
    }

    pub fn total_pupils(&self) -> u64 {
        self.records
            .values()
            .map(|r| u64::from(r.males) + u64::from(r.females))
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Staff and committee
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffMember {
    pub name: String,
    pub gender: Option<Gender>,
    pub education: Option<Education>,
}

impl StaffMember {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.gender.is_some() && self.education.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffRoster {
    pub count: u32,
    pub members: Vec<StaffMember>,
}

impl StaffRoster {
    /// Resize the member list to `count`, keeping existing entries.
    pub fn resize(&mut self, count: u32) {
        self.count = count;
        self.members.resize(count as usize, StaffMember::default());
    }

    pub fn limit() -> u32 {
        MAX_STAFF
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitteeMember {
    pub name: String,
    pub contact: String,
}

impl CommitteeMember {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.contact.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitteeRoster {
    pub count: u32,
    pub members: Vec<CommitteeMember>,
}

impl CommitteeRoster {
    pub fn resize(&mut self, count: u32) {
        self.count = count;
        self.members.resize(count as usize, CommitteeMember::default());
    }

    pub fn limit() -> u32 {
        MAX_COMMITTEE
    }
}

// ---------------------------------------------------------------------------
// FinancialSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialSummary {
    pub admission_fees: u64,
    pub canteen_fees: u64,
    pub stationary_fees: u64,
    pub head_salary: u64,
    pub lowest_teacher_salary: u64,
    pub highest_teacher_salary: u64,
}

impl FinancialSummary {
    /// `(field key, column label, value)` in display order.
    pub fn fields(&self) -> [(&'static str, &'static str, u64); 6] {
        [
            ("admission_fees", "Admission Fees", self.admission_fees),
            ("canteen_fees", "Canteen Fees", self.canteen_fees),
            ("stationary_fees", "Stationary Fees", self.stationary_fees),
            ("head_salary", "Head Teacher Salary", self.head_salary),
            (
                "lowest_teacher_salary",
                "Lowest Teacher Salary",
                self.lowest_teacher_salary,
            ),
            (
                "highest_teacher_salary",
                "Highest Teacher Salary",
                self.highest_teacher_salary,
            ),
        ]
    }
}

// ---------------------------------------------------------------------------
// FormState
// ---------------------------------------------------------------------------

/// Everything entered during one form session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub school_info: SchoolInfo,
    pub class_data: ClassTable,
    pub financial_data: FinancialSummary,
    pub teaching_staff: StaffRoster,
    pub non_teaching_staff: StaffRoster,
    pub committee: CommitteeRoster,
}

impl FormState {
    pub fn roster(&self, kind: StaffKind) -> &StaffRoster {
        match kind {
            StaffKind::Teaching => &self.teaching_staff,
            StaffKind::NonTeaching => &self.non_teaching_staff,
        }
    }

    pub fn roster_mut(&mut self, kind: StaffKind) -> &mut StaffRoster {
        match kind {
            StaffKind::Teaching => &mut self.teaching_staff,
            StaffKind::NonTeaching => &mut self.non_teaching_staff,
        }
    }

    /// Read a form saved as YAML (the CLI's offline entry format).
    pub fn from_yaml(data: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }
}

/// Per-section validity flags, refreshed whenever a validator runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionValidity {
    pub basic_info: bool,
    pub pupils: bool,
    pub financial: bool,
    pub staff: bool,
}
