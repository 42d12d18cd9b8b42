use crate::error::SurveyError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ClassLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassLevel {
    #[serde(rename = "Creche/Nursery")]
    Creche,
    #[serde(rename = "K.G 1")]
    Kg1,
    #[serde(rename = "K.G 2")]
    Kg2,
    #[serde(rename = "Class 1")]
    Class1,
    #[serde(rename = "Class 2")]
    Class2,
    #[serde(rename = "Class 3")]
    Class3,
    #[serde(rename = "Class 4")]
    Class4,
    #[serde(rename = "Class 5")]
    Class5,
    #[serde(rename = "Class 6")]
    Class6,
    #[serde(rename = "JHS 1")]
    Jhs1,
    #[serde(rename = "JHS 2")]
    Jhs2,
    #[serde(rename = "JHS 3")]
    Jhs3,
}

impl ClassLevel {
    pub fn all() -> &'static [ClassLevel] {
        &[
            ClassLevel::Creche,
            ClassLevel::Kg1,
            ClassLevel::Kg2,
            ClassLevel::Class1,
            ClassLevel::Class2,
            ClassLevel::Class3,
            ClassLevel::Class4,
            ClassLevel::Class5,
            ClassLevel::Class6,
            ClassLevel::Jhs1,
            ClassLevel::Jhs2,
            ClassLevel::Jhs3,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ClassLevel::Creche => "Creche/Nursery",
            ClassLevel::Kg1 => "K.G 1",
            ClassLevel::Kg2 => "K.G 2",
            ClassLevel::Class1 => "Class 1",
            ClassLevel::Class2 => "Class 2",
            ClassLevel::Class3 => "Class 3",
            ClassLevel::Class4 => "Class 4",
            ClassLevel::Class5 => "Class 5",
            ClassLevel::Class6 => "Class 6",
            ClassLevel::Jhs1 => "JHS 1",
            ClassLevel::Jhs2 => "JHS 2",
            ClassLevel::Jhs3 => "JHS 3",
        }
    }
}

impl fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ClassLevel {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClassLevel::all()
            .iter()
            .copied()
            .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SurveyError::InvalidConfig(format!("unknown class level '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Education
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Education {
    #[serde(rename = "PhD")]
    Phd,
    Masters,
    Bachelor,
    #[serde(rename = "HND")]
    Hnd,
    Diploma,
    #[serde(rename = "WASSCE")]
    Wassce,
    #[serde(rename = "SSCE")]
    Ssce,
    #[serde(rename = "O'Level")]
    OLevel,
    #[serde(rename = "A'Level")]
    ALevel,
    Certificate,
    #[serde(rename = "JHS")]
    Jhs,
    #[serde(rename = "No School")]
    NoSchool,
}

impl Education {
    pub fn as_str(self) -> &'static str {
        match self {
            Education::Phd => "PhD",
            Education::Masters => "Masters",
            Education::Bachelor => "Bachelor",
            Education::Hnd => "HND",
            Education::Diploma => "Diploma",
            Education::Wassce => "WASSCE",
            Education::Ssce => "SSCE",
            Education::OLevel => "O'Level",
            Education::ALevel => "A'Level",
            Education::Certificate => "Certificate",
            Education::Jhs => "JHS",
            Education::NoSchool => "No School",
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StaffKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffKind {
    Teaching,
    NonTeaching,
}

pub const MAX_STAFF: u32 = 50;
pub const MAX_COMMITTEE: u32 = 20;

impl StaffKind {
    /// Education levels offered in the dropdown for this kind of staff.
    pub fn education_options(self) -> &'static [Education] {
        match self {
            StaffKind::Teaching => &[
                Education::Hnd,
                Education::Diploma,
                Education::Masters,
                Education::Phd,
                Education::Bachelor,
                Education::Wassce,
                Education::Ssce,
                Education::OLevel,
                Education::ALevel,
            ],
            StaffKind::NonTeaching => &[
                Education::Bachelor,
                Education::Hnd,
                Education::Diploma,
                Education::Wassce,
                Education::Ssce,
                Education::OLevel,
                Education::ALevel,
                Education::Certificate,
                Education::Jhs,
                Education::NoSchool,
            ],
        }
    }

    pub fn allows(self, education: Education) -> bool {
        self.education_options().contains(&education)
    }

    /// Column prefix used by the flattener.
    pub fn column_label(self) -> &'static str {
        match self {
            StaffKind::Teaching => "Teaching Staff",
            StaffKind::NonTeaching => "Non-Teaching Staff",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StaffKind::Teaching => "teaching",
            StaffKind::NonTeaching => "non_teaching",
        }
    }
}

impl fmt::Display for StaffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// A bordered group of inputs on a wizard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    BasicInfo,
    TeachingStaff,
    NonTeachingStaff,
    Pupils,
    Financial,
    Committee,
    StaffCounts,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::BasicInfo => "basic_info",
            Section::TeachingStaff => "teaching_staff",
            Section::NonTeachingStaff => "non_teaching_staff",
            Section::Pupils => "pupils",
            Section::Financial => "financial",
            Section::Committee => "committee",
            Section::StaffCounts => "staff_counts",
        }
    }

    pub fn for_staff(kind: StaffKind) -> Section {
        match kind {
            StaffKind::Teaching => Section::TeachingStaff,
            StaffKind::NonTeaching => Section::NonTeachingStaff,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Page layout of the wizard. Both layouts have been deployed, and they
/// flatten into different column tails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Basic info + teaching staff, then everything else with full
    /// staff and committee detail lists.
    TwoPage,
    /// Basic info, pupils, then financial data with bare staff counts.
    #[default]
    ThreePage,
}

impl Variant {
    pub fn pages(self) -> &'static [&'static [Section]] {
        match self {
            Variant::TwoPage => &[
                &[Section::BasicInfo, Section::TeachingStaff],
                &[
                    Section::NonTeachingStaff,
                    Section::Pupils,
                    Section::Financial,
                    Section::Committee,
                ],
            ],
            Variant::ThreePage => &[
                &[Section::BasicInfo],
                &[Section::Pupils],
                &[Section::Financial, Section::StaffCounts],
            ],
        }
    }

    pub fn page_count(self) -> usize {
        self.pages().len()
    }

    /// Sections on a 1-based page number; empty when out of range.
    pub fn sections(self, page: usize) -> &'static [Section] {
        page.checked_sub(1)
            .and_then(|i| self.pages().get(i).copied())
            .unwrap_or(&[])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::TwoPage => "two_page",
            Variant::ThreePage => "three_page",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two_page" | "two-page" => Ok(Variant::TwoPage),
            "three_page" | "three-page" => Ok(Variant::ThreePage),
            _ => Err(SurveyError::InvalidConfig(format!(
                "unknown form variant '{s}'"
            ))),
        }
    }
}
