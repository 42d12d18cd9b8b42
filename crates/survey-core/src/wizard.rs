//! The form wizard as a pure state machine.
//!
//! A session is a [`WizardState`]. Every user action arrives as an
//! [`Event`], and [`transition`] returns the next state together with an
//! [`Outcome`] describing what happened. The input state is never mutated,
//! so a caller that gets an `Err` back simply keeps what it had.
//!
//! Edits are only accepted for sections shown on the current page. `Next`
//! is gated by the validators of the page being left, `Previous` is not
//! gated at all, and `Submit` is only offered on the last page.

use crate::catalog::LocationCatalog;
use crate::error::{FieldIssue, Result, SurveyError, ValidationFailure};
use crate::form::{
    ClassRecord, CommitteeMember, CommitteeRoster, FinancialSummary, FormState, SectionValidity,
    StaffMember, StaffRoster,
};
use crate::store::SheetStore;
use crate::submit::{submit, SubmissionReceipt};
use crate::types::{ClassLevel, Section, StaffKind, Variant};
use crate::validate::{
    format_name, phone_notice, validate_basic_info, validate_committee, validate_financial_data,
    validate_pupil_data, validate_staff_counts, validate_staff_roster, ValidationRules,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub variant: Variant,
    /// 1-based page number.
    pub current_page: usize,
    pub form: FormState,
    pub validity: SectionValidity,
}

impl WizardState {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            current_page: 1,
            form: FormState::default(),
            validity: SectionValidity::default(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.variant.page_count()
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page >= self.page_count()
    }

    /// Sections rendered on the current page.
    pub fn sections(&self) -> &'static [Section] {
        self.variant.sections(self.current_page)
    }

    pub fn shows(&self, section: Section) -> bool {
        self.sections().contains(&section)
    }

    fn invalid(&self, reason: impl Into<String>) -> SurveyError {
        SurveyError::InvalidEvent {
            page: self.current_page,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Events and outcomes
// ---------------------------------------------------------------------------

/// One user action. Roster and committee indices are 1-based, matching the
/// numbering shown next to each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SetZone {
        zone: Option<String>,
    },
    SetRegion {
        region: Option<String>,
    },
    SetDivision {
        division: Option<String>,
    },
    SetSchoolName {
        name: String,
    },
    SetHeadTeacher {
        name: String,
    },
    SetPhone {
        phone: String,
    },
    SetWhatsapp {
        whatsapp: String,
    },
    SetClass {
        level: ClassLevel,
        record: ClassRecord,
    },
    SetFinancial {
        financial: FinancialSummary,
    },
    SetStaffCount {
        kind: StaffKind,
        count: u32,
    },
    SetStaffMember {
        kind: StaffKind,
        index: usize,
        member: StaffMember,
    },
    SetCommitteeCount {
        count: u32,
    },
    SetCommitteeMember {
        index: usize,
        member: CommitteeMember,
    },
    Next,
    Previous,
    Submit,
}

impl Event {
    /// The section an edit belongs to under `variant`, or `None` for
    /// navigation events.
    pub fn section(&self, variant: Variant) -> Option<Section> {
        let section = match self {
            Event::SetZone { .. }
            | Event::SetRegion { .. }
            | Event::SetDivision { .. }
            | Event::SetSchoolName { .. }
            | Event::SetHeadTeacher { .. }
            | Event::SetPhone { .. }
            | Event::SetWhatsapp { .. } => Section::BasicInfo,
            Event::SetClass { .. } => Section::Pupils,
            Event::SetFinancial { .. } => Section::Financial,
            Event::SetStaffCount { kind, .. } => match variant {
                Variant::TwoPage => Section::for_staff(*kind),
                Variant::ThreePage => Section::StaffCounts,
            },
            Event::SetStaffMember { kind, .. } => Section::for_staff(*kind),
            Event::SetCommitteeCount { .. } => match variant {
                Variant::TwoPage => Section::Committee,
                Variant::ThreePage => Section::StaffCounts,
            },
            Event::SetCommitteeMember { .. } => Section::Committee,
            Event::Next | Event::Previous | Event::Submit => return None,
        };
        Some(section)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// An edit was applied. Notices are inline hints that do not block.
    Updated { notices: Vec<FieldIssue> },
    Moved { from: usize, to: usize },
    /// Validation failed; the state is unchanged.
    Rejected { issues: Vec<FieldIssue> },
    /// The row was written and the session starts over.
    Submitted { receipt: SubmissionReceipt },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub state: WizardState,
    pub outcome: Outcome,
}

/// Everything outside the session that a transition may consult.
pub struct Env<'a> {
    pub catalog: &'a LocationCatalog,
    pub store: &'a dyn SheetStore,
    pub rules: ValidationRules,
    pub now: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// transition
// ---------------------------------------------------------------------------

pub fn transition(state: &WizardState, event: Event, env: &Env<'_>) -> Result<Step> {
    if let Some(section) = event.section(state.variant) {
        if !state.shows(section) {
            return Err(state.invalid(format!(
                "{section} is not shown on page {} of the {} form",
                state.current_page, state.variant
            )));
        }
        return apply_edit(state, event, env);
    }

    match event {
        Event::Next => next(state, env),
        Event::Previous => {
            let mut next = state.clone();
            let from = state.current_page;
            next.current_page = from.saturating_sub(1).max(1);
            let to = next.current_page;
            Ok(Step {
                state: next,
                outcome: Outcome::Moved { from, to },
            })
        }
        Event::Submit => submit_form(state, env),
        _ => Err(state.invalid("unhandled event")),
    }
}

fn unchanged(state: &WizardState, issues: Vec<FieldIssue>) -> Step {
    Step {
        state: state.clone(),
        outcome: Outcome::Rejected { issues },
    }
}

fn updated(state: WizardState, notices: Vec<FieldIssue>) -> Result<Step> {
    Ok(Step {
        state,
        outcome: Outcome::Updated { notices },
    })
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

fn apply_edit(state: &WizardState, event: Event, env: &Env<'_>) -> Result<Step> {
    let mut next = state.clone();
    let info = &mut next.form.school_info;

    match event {
        Event::SetZone { zone } => {
            let zone = non_blank(zone);
            if let Some(z) = &zone {
                if !env.catalog.has_zone(z) {
                    return Ok(unchanged(
                        state,
                        vec![FieldIssue::new("zone", format!("'{z}' is not a known zone"))],
                    ));
                }
            }
            if info.zone != zone {
                info.region = None;
                info.division = None;
            }
            info.zone = zone;
        }
        Event::SetRegion { region } => {
            let region = non_blank(region);
            if let Some(r) = &region {
                let Some(zone) = info.zone.as_deref() else {
                    return Ok(unchanged(
                        state,
                        vec![FieldIssue::new("region", "Select a zone first")],
                    ));
                };
                if !env.catalog.has_region(zone, r) {
                    return Ok(unchanged(
                        state,
                        vec![FieldIssue::new(
                            "region",
                            format!("'{r}' is not a region of zone '{zone}'"),
                        )],
                    ));
                }
            }
            if info.region != region {
                info.division = None;
            }
            info.region = region;
        }
        Event::SetDivision { division } => {
            let division = non_blank(division);
            if let Some(d) = &division {
                let Some(region) = info.region.as_deref() else {
                    return Ok(unchanged(
                        state,
                        vec![FieldIssue::new("division", "Select a region first")],
                    ));
                };
                if !env.catalog.has_division(region, d) {
                    return Ok(unchanged(
                        state,
                        vec![FieldIssue::new(
                            "division",
                            format!("'{d}' is not a division of region '{region}'"),
                        )],
                    ));
                }
            }
            info.division = division;
        }
        Event::SetSchoolName { name } => info.school_name = name.trim().to_string(),
        Event::SetHeadTeacher { name } => info.head_teacher = name.trim().to_string(),
        Event::SetPhone { phone } => {
            info.phone = phone.trim().to_string();
            let notices = phone_notice("phone", &info.phone).into_iter().collect();
            return updated(next, notices);
        }
        Event::SetWhatsapp { whatsapp } => {
            info.whatsapp = whatsapp.trim().to_string();
            let notices = phone_notice("whatsapp", &info.whatsapp).into_iter().collect();
            return updated(next, notices);
        }
        Event::SetClass { level, record } => next.form.class_data.set(level, record),
        Event::SetFinancial { financial } => next.form.financial_data = financial,
        Event::SetStaffCount { kind, count } => {
            if count > StaffRoster::limit() {
                return Ok(unchanged(
                    state,
                    vec![FieldIssue::new(
                        format!("{}_staff.count", kind.as_str()),
                        format!("At most {} staff can be listed", StaffRoster::limit()),
                    )],
                ));
            }
            let roster = next.form.roster_mut(kind);
            match state.variant {
                Variant::TwoPage => roster.resize(count),
                Variant::ThreePage => roster.count = count,
            }
        }
        Event::SetStaffMember {
            kind,
            index,
            member,
        } => {
            let roster = next.form.roster_mut(kind);
            let Some(slot) = slot(&mut roster.members, index) else {
                return Err(state.invalid(format!(
                    "{kind} staff member #{index} does not exist (count is {})",
                    roster.count
                )));
            };
            *slot = StaffMember {
                name: member.name.trim().to_string(),
                ..member
            };
        }
        Event::SetCommitteeCount { count } => {
            if count > CommitteeRoster::limit() {
                return Ok(unchanged(
                    state,
                    vec![FieldIssue::new(
                        "committee.count",
                        format!(
                            "At most {} committee members can be listed",
                            CommitteeRoster::limit()
                        ),
                    )],
                ));
            }
            match state.variant {
                Variant::TwoPage => next.form.committee.resize(count),
                Variant::ThreePage => next.form.committee.count = count,
            }
        }
        Event::SetCommitteeMember { index, member } => {
            let committee = &mut next.form.committee;
            let Some(slot) = slot(&mut committee.members, index) else {
                return Err(state.invalid(format!(
                    "committee member #{index} does not exist (count is {})",
                    committee.count
                )));
            };
            *slot = CommitteeMember {
                name: format_name(&member.name),
                contact: member.contact.trim().to_string(),
            };
        }
        Event::Next | Event::Previous | Event::Submit => {
            return Err(state.invalid("navigation is not an edit"));
        }
    }

    updated(next, Vec::new())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn slot<T>(items: &mut [T], index: usize) -> Option<&mut T> {
    index.checked_sub(1).and_then(|i| items.get_mut(i))
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Run the validators for one section. Validation failures come back as
/// `Some(failure)`; store errors from the duplicate lookup propagate.
fn check_section(
    section: Section,
    form: &FormState,
    env: &Env<'_>,
) -> Result<Option<ValidationFailure>> {
    let result = match section {
        Section::BasicInfo => match validate_basic_info(&form.school_info, env.store) {
            Ok(()) => Ok(()),
            Err(SurveyError::Validation(failure)) => Err(failure),
            Err(other) => return Err(other),
        },
        Section::TeachingStaff => validate_staff_roster(StaffKind::Teaching, &form.teaching_staff),
        Section::NonTeachingStaff => {
            validate_staff_roster(StaffKind::NonTeaching, &form.non_teaching_staff)
        }
        Section::Pupils => validate_pupil_data(&form.class_data),
        Section::Financial => validate_financial_data(&form.financial_data, &env.rules),
        Section::Committee => validate_committee(&form.committee),
        Section::StaffCounts => validate_staff_counts(form),
    };
    Ok(result.err())
}

fn mark_valid(validity: &mut SectionValidity, section: Section) {
    match section {
        Section::BasicInfo => validity.basic_info = true,
        Section::Pupils => validity.pupils = true,
        Section::Financial => validity.financial = true,
        Section::TeachingStaff
        | Section::NonTeachingStaff
        | Section::Committee
        | Section::StaffCounts => validity.staff = true,
    }
}

fn next(state: &WizardState, env: &Env<'_>) -> Result<Step> {
    if state.is_last_page() {
        return Err(state.invalid("already on the last page; submit instead"));
    }

    let mut issues = Vec::new();
    let mut next = state.clone();
    for &section in state.sections() {
        match check_section(section, &state.form, env)? {
            Some(failure) => issues.extend(failure.issues),
            None => mark_valid(&mut next.validity, section),
        }
    }
    if !issues.is_empty() {
        tracing::debug!(page = state.current_page, issues = issues.len(), "next rejected");
        return Ok(unchanged(state, issues));
    }

    let from = state.current_page;
    next.current_page = from + 1;
    Ok(Step {
        state: next,
        outcome: Outcome::Moved {
            from,
            to: from + 1,
        },
    })
}

fn submit_form(state: &WizardState, env: &Env<'_>) -> Result<Step> {
    if !state.is_last_page() {
        return Err(state.invalid(format!(
            "submit is only available on page {}",
            state.page_count()
        )));
    }

    match submit(&state.form, state.variant, &env.rules, env.store, env.now) {
        Ok(receipt) => Ok(Step {
            state: WizardState::new(state.variant),
            outcome: Outcome::Submitted { receipt },
        }),
        Err(SurveyError::Validation(failure)) => Ok(unchanged(state, failure.issues)),
        Err(e) => Err(e),
    }
}
