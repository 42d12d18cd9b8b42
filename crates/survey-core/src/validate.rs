use crate::duplicate;
use crate::error::{FieldIssue, Result, ValidationFailure};
use crate::form::{ClassTable, CommitteeRoster, FinancialSummary, FormState, SchoolInfo, StaffRoster};
use crate::store::SheetStore;
use crate::types::{StaffKind, Variant};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const PHONE_NOTICE: &str = "Must be 10 digits";
pub const DUPLICATE_MESSAGE: &str =
    "This school has already been submitted (same head teacher, contacts, region and division)";

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Accept 0 as a real amount for fees and salaries instead of
    /// treating it as "not entered".
    #[serde(default)]
    pub allow_zero_financial: bool,
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").unwrap())
}

/// True iff `number` is exactly ten ASCII digits.
pub fn validate_phone(number: &str) -> bool {
    phone_re().is_match(number)
}

/// Inline notice for a phone field: only shown once something was typed.
pub fn phone_notice(field: &str, number: &str) -> Option<FieldIssue> {
    if !number.is_empty() && !validate_phone(number) {
        Some(FieldIssue::new(field, PHONE_NOTICE))
    } else {
        None
    }
}

/// Capitalize each whitespace-separated word: "aMA  mensah" → "Ama Mensah".
pub fn format_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Basic info
// ---------------------------------------------------------------------------

/// Required-field and format checks, stopping at the first failure.
pub fn check_basic_fields(info: &SchoolInfo) -> std::result::Result<(), ValidationFailure> {
    let blank = |v: Option<&str>| v.map(str::trim).unwrap_or("").is_empty();

    let required: [(&str, &str, bool); 7] = [
        ("zone", "Zone", blank(info.zone.as_deref())),
        ("region", "Region", blank(info.region.as_deref())),
        ("division", "Division", blank(info.division.as_deref())),
        ("school_name", "Name of School", blank(Some(info.school_name.as_str()))),
        ("head_teacher", "Name of Head Teacher", blank(Some(info.head_teacher.as_str()))),
        ("phone", "Phone Number of Head Teacher", blank(Some(info.phone.as_str()))),
        ("whatsapp", "WhatsApp Number of Head Teacher", blank(Some(info.whatsapp.as_str()))),
    ];
    if let Some((field, label, _)) = required.iter().find(|(_, _, missing)| *missing) {
        return Err(ValidationFailure::single(*field, format!("{label} is required")));
    }

    if !validate_phone(&info.phone) {
        return Err(ValidationFailure::single(
            "phone",
            "Valid 10-digit phone number required for Head Teacher",
        ));
    }
    if !validate_phone(&info.whatsapp) {
        return Err(ValidationFailure::single(
            "whatsapp",
            "Valid 10-digit WhatsApp number required for Head Teacher",
        ));
    }
    Ok(())
}

/// Full basic-info gate: field checks, then the duplicate lookup against the
/// store. Store failures surface as errors, not validation failures.
pub fn validate_basic_info(info: &SchoolInfo, store: &dyn SheetStore) -> Result<()> {
    check_basic_fields(info)?;
    if duplicate::is_duplicate(store, info)? {
        return Err(ValidationFailure::single("head_teacher", DUPLICATE_MESSAGE).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pupils
// ---------------------------------------------------------------------------

/// Every grade level needs at least one non-zero value. All incomplete
/// levels are reported.
pub fn validate_pupil_data(classes: &ClassTable) -> std::result::Result<(), ValidationFailure> {
    let issues: Vec<FieldIssue> = classes
        .iter()
        .filter(|(_, record)| record.is_blank())
        .map(|(level, _)| {
            FieldIssue::new(
                format!("class_data.{}", level.label()),
                format!("{level}: enter the number of males, females or the tuition fee"),
            )
        })
        .collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { issues })
    }
}

// ---------------------------------------------------------------------------
// Financial
// ---------------------------------------------------------------------------

/// Under default rules a zero amount counts as "not entered", so a school
/// that genuinely charges nothing cannot pass. See `ValidationRules`.
pub fn validate_financial_data(
    financial: &FinancialSummary,
    rules: &ValidationRules,
) -> std::result::Result<(), ValidationFailure> {
    if rules.allow_zero_financial {
        return Ok(());
    }
    let issues: Vec<FieldIssue> = financial
        .fields()
        .iter()
        .filter(|(_, _, value)| *value == 0)
        .map(|(key, label, _)| {
            FieldIssue::new(
                format!("financial_data.{key}"),
                format!("{label} is required"),
            )
        })
        .collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { issues })
    }
}

// ---------------------------------------------------------------------------
// Staff
// ---------------------------------------------------------------------------

pub fn validate_staff_counts(form: &FormState) -> std::result::Result<(), ValidationFailure> {
    let counts = [
        ("teaching_staff.count", "Number of teaching staff", form.teaching_staff.count),
        (
            "non_teaching_staff.count",
            "Number of non-teaching staff",
            form.non_teaching_staff.count,
        ),
        ("committee.count", "Number of committee members", form.committee.count),
    ];
    let issues: Vec<FieldIssue> = counts
        .iter()
        .filter(|(_, _, count)| *count == 0)
        .map(|(field, label, _)| FieldIssue::new(*field, format!("{label} must be greater than zero")))
        .collect();
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { issues })
    }
}

pub fn validate_staff_roster(
    kind: StaffKind,
    roster: &StaffRoster,
) -> std::result::Result<(), ValidationFailure> {
    let prefix = format!("{}_staff", kind.as_str());
    let mut issues = Vec::new();

    if roster.count > StaffRoster::limit() {
        issues.push(FieldIssue::new(
            format!("{prefix}.count"),
            format!("At most {} staff can be listed", StaffRoster::limit()),
        ));
    }
    if roster.members.len() != roster.count as usize {
        issues.push(FieldIssue::new(
            format!("{prefix}.count"),
            format!(
                "{} staff declared but {} listed",
                roster.count,
                roster.members.len()
            ),
        ));
    }
    for (i, member) in roster.members.iter().enumerate() {
        let n = i + 1;
        if !member.is_complete() {
            issues.push(FieldIssue::new(
                format!("{prefix}.{n}"),
                format!("{} member #{n}: name, gender and education are required", kind.column_label()),
            ));
        } else if let Some(education) = member.education {
            if !kind.allows(education) {
                issues.push(FieldIssue::new(
                    format!("{prefix}.{n}.education"),
                    format!("{education} is not an option for {} staff", kind.as_str().replace('_', "-")),
                ));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { issues })
    }
}

pub fn validate_committee(roster: &CommitteeRoster) -> std::result::Result<(), ValidationFailure> {
    let mut issues = Vec::new();
    if roster.count > CommitteeRoster::limit() {
        issues.push(FieldIssue::new(
            "committee.count",
            format!("At most {} committee members can be listed", CommitteeRoster::limit()),
        ));
    }
    if roster.members.len() != roster.count as usize {
        issues.push(FieldIssue::new(
            "committee.count",
            format!(
                "{} committee members declared but {} listed",
                roster.count,
                roster.members.len()
            ),
        ));
    }
    for (i, member) in roster.members.iter().enumerate() {
        if !member.is_complete() {
            let n = i + 1;
            issues.push(FieldIssue::new(
                format!("committee.{n}"),
                format!("Committee member #{n}: name and contact are required"),
            ));
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { issues })
    }
}

/// Detail-list checks for every roster shown by the two-page layout.
pub fn validate_rosters(form: &FormState) -> std::result::Result<(), ValidationFailure> {
    let mut issues = Vec::new();
    for result in [
        validate_staff_roster(StaffKind::Teaching, &form.teaching_staff),
        validate_staff_roster(StaffKind::NonTeaching, &form.non_teaching_staff),
        validate_committee(&form.committee),
    ] {
        if let Err(failure) = result {
            issues.extend(failure.issues);
        }
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure { issues })
    }
}

// ---------------------------------------------------------------------------
// Whole form
// ---------------------------------------------------------------------------

/// Every validator the variant's submit button depends on, in page order.
/// Stops at the first failing section.
pub fn validate_for_submit(
    form: &FormState,
    variant: Variant,
    rules: &ValidationRules,
    store: &dyn SheetStore,
) -> Result<()> {
    validate_basic_info(&form.school_info, store)?;
    validate_pupil_data(&form.class_data)?;
    validate_financial_data(&form.financial_data, rules)?;
    match variant {
        Variant::ThreePage => validate_staff_counts(form)?,
        Variant::TwoPage => validate_rosters(form)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ClassRecord, CommitteeMember, StaffMember};
    use crate::store::MemorySheet;
    use crate::types::{ClassLevel, Education, Gender};

    pub(crate) fn complete_info() -> SchoolInfo {
        SchoolInfo {
            zone: Some("Accra".into()),
            region: Some("Tema".into()),
            division: Some("Community 1".into()),
            school_name: "deeper life basic".into(),
            head_teacher: "kwame  asante".into(),
            phone: "0551234567".into(),
            whatsapp: "0241234567".into(),
        }
    }

    #[test]
    fn ten_digit_strings_are_valid_phones() {
        for n in ["0551234567", "0000000000", "9999999999"] {
            assert!(validate_phone(n), "expected valid: {n}");
        }
    }

    #[test]
    fn other_strings_are_invalid_phones() {
        for n in [
            "",
            "055123456",
            "05512345678",
            "055123456a",
            "055 123 456",
            "+233551234",
            "٠٥٥١٢٣٤٥٦٧",
            "0551234567\n",
        ] {
            assert!(!validate_phone(n), "expected invalid: {n:?}");
        }
    }

    #[test]
    fn phone_notice_only_for_typed_values() {
        assert!(phone_notice("phone", "").is_none());
        assert!(phone_notice("phone", "0551234567").is_none());
        let notice = phone_notice("phone", "055123456").unwrap();
        assert_eq!(notice.message, "Must be 10 digits");
    }

    #[test]
    fn format_name_capitalizes_words() {
        assert_eq!(format_name("kwame  ASANTE"), "Kwame Asante");
        assert_eq!(format_name("  ama "), "Ama");
        assert_eq!(format_name(""), "");
        assert_eq!(format_name("o'neil mensah-bonsu"), "O'neil Mensah-bonsu");
    }

    #[test]
    fn basic_fields_short_circuit_on_first_missing() {
        let mut info = complete_info();
        info.region = None;
        info.phone = String::new();
        let failure = check_basic_fields(&info).unwrap_err();
        assert_eq!(failure.issues.len(), 1);
        assert_eq!(failure.issues[0].field, "region");
        assert_eq!(failure.issues[0].message, "Region is required");
    }

    #[test]
    fn basic_fields_reject_bad_whatsapp() {
        let mut info = complete_info();
        info.whatsapp = "024123".into();
        let failure = check_basic_fields(&info).unwrap_err();
        assert_eq!(failure.issues[0].field, "whatsapp");
        assert!(failure.issues[0].message.contains("WhatsApp"));
    }

    #[test]
    fn basic_info_passes_on_empty_store() {
        let store = MemorySheet::new();
        validate_basic_info(&complete_info(), &store).unwrap();
    }

    #[test]
    fn pupil_data_flags_every_blank_level() {
        let mut classes = ClassTable::default();
        let failure = validate_pupil_data(&classes).unwrap_err();
        assert_eq!(failure.issues.len(), 12);

        for &level in ClassLevel::all() {
            classes.set(
                level,
                ClassRecord {
                    males: 1,
                    ..Default::default()
                },
            );
        }
        classes.set(ClassLevel::Jhs2, ClassRecord::default());
        let failure = validate_pupil_data(&classes).unwrap_err();
        assert_eq!(failure.issues.len(), 1);
        assert!(failure.issues[0].message.starts_with("JHS 2"));

        classes.set(
            ClassLevel::Jhs2,
            ClassRecord {
                tuition: 300,
                ..Default::default()
            },
        );
        validate_pupil_data(&classes).unwrap();
    }

    #[test]
    fn zero_admission_fee_is_rejected_by_default() {
        let financial = FinancialSummary {
            admission_fees: 0,
            canteen_fees: 5,
            stationary_fees: 20,
            head_salary: 2500,
            lowest_teacher_salary: 900,
            highest_teacher_salary: 1500,
        };
        let failure = validate_financial_data(&financial, &ValidationRules::default()).unwrap_err();
        assert_eq!(failure.issues.len(), 1);
        assert_eq!(failure.issues[0].field, "financial_data.admission_fees");

        let relaxed = ValidationRules {
            allow_zero_financial: true,
        };
        validate_financial_data(&financial, &relaxed).unwrap();
    }

    #[test]
    fn staff_counts_must_be_non_zero() {
        let mut form = FormState::default();
        form.teaching_staff.count = 4;
        let failure = validate_staff_counts(&form).unwrap_err();
        assert_eq!(failure.issues.len(), 2);
        form.non_teaching_staff.count = 1;
        form.committee.count = 3;
        validate_staff_counts(&form).unwrap();
    }

    #[test]
    fn roster_requires_complete_members() {
        let mut roster = StaffRoster::default();
        roster.resize(2);
        roster.members[0] = StaffMember {
            name: "Ama".into(),
            gender: Some(Gender::Female),
            education: Some(Education::Masters),
        };
        let failure = validate_staff_roster(StaffKind::Teaching, &roster).unwrap_err();
        assert_eq!(failure.issues.len(), 1);
        assert_eq!(failure.issues[0].field, "teaching_staff.2");
    }

    #[test]
    fn roster_rejects_education_outside_kind() {
        let mut roster = StaffRoster::default();
        roster.resize(1);
        roster.members[0] = StaffMember {
            name: "Yaw".into(),
            gender: Some(Gender::Male),
            education: Some(Education::Phd),
        };
        let failure = validate_staff_roster(StaffKind::NonTeaching, &roster).unwrap_err();
        assert!(failure.issues[0].message.contains("PhD"));
    }

    #[test]
    fn committee_count_limit() {
        let mut roster = CommitteeRoster::default();
        roster.resize(21);
        for m in roster.members.iter_mut() {
            *m = CommitteeMember {
                name: "Esi".into(),
                contact: "0201234567".into(),
            };
        }
        let failure = validate_committee(&roster).unwrap_err();
        assert!(failure.issues[0].message.contains("At most 20"));
    }
}
