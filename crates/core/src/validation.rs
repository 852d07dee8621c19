//! Schema validator for activity records.
//!
//! Each rule is applied independently per field, then the end-after-start
//! cross-check runs on whatever parsed. The validator either returns the
//! normalized typed record or the full list of field violations -- it never
//! stops at the first failure, so a client can fix a form in one pass.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::activity::{
    ActivityCategory, ActivityDraft, ActivityPatch, ActivityUpdate, NewActivity, WorkMode,
};

/// `YYYY-MM-DD`
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// 24-hour `HH:mm`
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid regex"));

/// Length bounds, in characters: (min, max).
const AUTHOR_LEN: (usize, usize) = (3, 100);
const TITLE_LEN: (usize, usize) = (3, 100);
const LOCATION_LEN: (usize, usize) = (2, 100);
const DESCRIPTION_MAX: usize = 255;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Failure modes of [`validate_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The submitted sequence was empty.
    Empty,
    /// The item at `index` (0-based) failed validation. Earlier items are
    /// discarded; bulk creation is all-or-nothing.
    Item {
        index: usize,
        violations: Vec<FieldViolation>,
    },
}

/// Validate a complete create candidate, returning the normalized record.
pub fn validate_draft(draft: &ActivityDraft) -> Result<NewActivity, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    let author = required_string(
        "author",
        draft.author.as_deref(),
        AUTHOR_LEN,
        &mut violations,
    );
    let title = required_string("title", draft.title.as_deref(), TITLE_LEN, &mut violations);
    let location = required_string(
        "location",
        draft.location.as_deref(),
        LOCATION_LEN,
        &mut violations,
    );
    let date = required_date("date", draft.date.as_deref(), &mut violations);
    let category = required_category(draft.category.as_deref(), &mut violations);
    let work_mode = required_work_mode(draft.work_mode.as_deref(), &mut violations);
    let start_time = required_time("start_time", draft.start_time.as_deref(), &mut violations);
    let end_time = required_time("end_time", draft.end_time.as_deref(), &mut violations);
    let description = optional_description(draft.description.as_deref(), &mut violations);

    if let (Some(start), Some(end)) = (start_time, end_time) {
        check_time_order(start, end, &mut violations);
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    // Unwraps are safe: every None pushed a violation above.
    Ok(NewActivity {
        author: author.expect("validated"),
        date: date.expect("validated"),
        title: title.expect("validated"),
        category: category.expect("validated"),
        start_time: start_time.expect("validated"),
        end_time: end_time.expect("validated"),
        work_mode: work_mode.expect("validated"),
        location: location.expect("validated"),
        description,
        proof: draft.proof.clone(),
    })
}

/// Validate a partial update candidate.
///
/// Every rule from [`validate_draft`] applies to whichever fields are set.
/// The end-after-start cross-check runs only when the patch carries both
/// times; a patch touching a single time field is accepted as-is.
pub fn validate_patch(patch: &ActivityPatch) -> Result<ActivityUpdate, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    let mut update = ActivityUpdate::default();

    if let Some(author) = patch.author.as_deref() {
        update.author = check_length("author", author, AUTHOR_LEN, &mut violations);
    }
    if let Some(title) = patch.title.as_deref() {
        update.title = check_length("title", title, TITLE_LEN, &mut violations);
    }
    if let Some(location) = patch.location.as_deref() {
        update.location = check_length("location", location, LOCATION_LEN, &mut violations);
    }
    if let Some(date) = patch.date.as_deref() {
        update.date = parse_date("date", date, &mut violations);
    }
    if let Some(category) = patch.category.as_deref() {
        update.category = parse_category(category, &mut violations);
    }
    if let Some(work_mode) = patch.work_mode.as_deref() {
        update.work_mode = parse_work_mode(work_mode, &mut violations);
    }
    if let Some(start) = patch.start_time.as_deref() {
        update.start_time = parse_time("start_time", start, &mut violations);
    }
    if let Some(end) = patch.end_time.as_deref() {
        update.end_time = parse_time("end_time", end, &mut violations);
    }
    if patch.description.is_some() {
        update.description = optional_description(patch.description.as_deref(), &mut violations);
    }
    update.proof = patch.proof.clone();

    if let (Some(start), Some(end)) = (update.start_time, update.end_time) {
        check_time_order(start, end, &mut violations);
    }

    if violations.is_empty() {
        Ok(update)
    } else {
        Err(violations)
    }
}

/// Validate an ordered sequence of create candidates.
///
/// An empty sequence is a failure in itself. Items are validated in order;
/// the first failing item aborts the batch with its 0-based index.
pub fn validate_batch(drafts: &[ActivityDraft]) -> Result<Vec<NewActivity>, BatchError> {
    if drafts.is_empty() {
        return Err(BatchError::Empty);
    }

    let mut validated = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.iter().enumerate() {
        match validate_draft(draft) {
            Ok(activity) => validated.push(activity),
            Err(violations) => return Err(BatchError::Item { index, violations }),
        }
    }
    Ok(validated)
}

// ---------------------------------------------------------------------------
// Per-field rules
// ---------------------------------------------------------------------------

fn required_string(
    field: &str,
    value: Option<&str>,
    bounds: (usize, usize),
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value {
        None => {
            violations.push(FieldViolation::new(field, format!("{field} is required")));
            None
        }
        Some(s) => check_length(field, s, bounds, violations),
    }
}

fn check_length(
    field: &str,
    value: &str,
    (min, max): (usize, usize),
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let len = value.chars().count();
    if len < min || len > max {
        violations.push(FieldViolation::new(
            field,
            format!("{field} must be between {min} and {max} characters"),
        ));
        None
    } else {
        Some(value.to_string())
    }
}

fn required_date(
    field: &str,
    value: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<NaiveDate> {
    match value {
        None => {
            violations.push(FieldViolation::new(field, format!("{field} is required")));
            None
        }
        Some(s) => parse_date(field, s, violations),
    }
}

fn parse_date(field: &str, value: &str, violations: &mut Vec<FieldViolation>) -> Option<NaiveDate> {
    if !DATE_RE.is_match(value) {
        violations.push(FieldViolation::new(
            field,
            format!("{field} must match YYYY-MM-DD"),
        ));
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            violations.push(FieldViolation::new(
                field,
                format!("{field} is not a valid calendar date"),
            ));
            None
        }
    }
}

fn required_time(
    field: &str,
    value: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<NaiveTime> {
    match value {
        None => {
            violations.push(FieldViolation::new(field, format!("{field} is required")));
            None
        }
        Some(s) => parse_time(field, s, violations),
    }
}

fn parse_time(field: &str, value: &str, violations: &mut Vec<FieldViolation>) -> Option<NaiveTime> {
    if !TIME_RE.is_match(value) {
        violations.push(FieldViolation::new(
            field,
            format!("{field} must match HH:mm (24-hour)"),
        ));
        return None;
    }
    // The regex guarantees the parse succeeds.
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

fn required_category(
    value: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<ActivityCategory> {
    match value {
        None => {
            violations.push(FieldViolation::new("category", "category is required"));
            None
        }
        Some(s) => parse_category(s, violations),
    }
}

fn parse_category(value: &str, violations: &mut Vec<FieldViolation>) -> Option<ActivityCategory> {
    match ActivityCategory::from_str(value) {
        Ok(category) => Some(category),
        Err(()) => {
            let allowed = ActivityCategory::ALL.map(|c| c.as_str()).join(", ");
            violations.push(FieldViolation::new(
                "category",
                format!("category must be one of: {allowed}"),
            ));
            None
        }
    }
}

fn required_work_mode(
    value: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<WorkMode> {
    match value {
        None => {
            violations.push(FieldViolation::new("work_mode", "work_mode is required"));
            None
        }
        Some(s) => parse_work_mode(s, violations),
    }
}

fn parse_work_mode(value: &str, violations: &mut Vec<FieldViolation>) -> Option<WorkMode> {
    match WorkMode::from_str(value) {
        Ok(mode) => Some(mode),
        Err(()) => {
            let allowed = WorkMode::ALL.map(|m| m.as_str()).join(", ");
            violations.push(FieldViolation::new(
                "work_mode",
                format!("work_mode must be one of: {allowed}"),
            ));
            None
        }
    }
}

fn optional_description(
    value: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let value = value?;
    if value.chars().count() > DESCRIPTION_MAX {
        violations.push(FieldViolation::new(
            "description",
            format!("description must be at most {DESCRIPTION_MAX} characters"),
        ));
        None
    } else {
        Some(value.to_string())
    }
}

/// End must be strictly after start. No overnight spans: both times are
/// wall-clock values on the same day. The violation is attached to
/// `end_time`, matching where the form shows it.
fn check_time_order(start: NaiveTime, end: NaiveTime, violations: &mut Vec<FieldViolation>) {
    if end <= start {
        violations.push(FieldViolation::new(
            "end_time",
            "end_time must be after start_time",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> ActivityDraft {
        ActivityDraft {
            author: Some("susilo".into()),
            date: Some("2025-03-14".into()),
            title: Some("Weekly sync".into()),
            category: Some("general-activity".into()),
            start_time: Some("08:00".into()),
            end_time: Some("10:00".into()),
            work_mode: Some("online".into()),
            location: Some("HQ".into()),
            description: None,
            proof: None,
        }
    }

    #[test]
    fn accepts_valid_draft() {
        let record = validate_draft(&valid_draft()).expect("draft should validate");
        assert_eq!(record.author, "susilo");
        assert_eq!(record.category, ActivityCategory::GeneralActivity);
        assert_eq!(record.start_time.format("%H:%M").to_string(), "08:00");
        assert_eq!(record.description, None);
    }

    #[test]
    fn rejects_end_before_start_on_end_time_field() {
        let draft = ActivityDraft {
            start_time: Some("09:00".into()),
            end_time: Some("08:00".into()),
            ..valid_draft()
        };
        let violations = validate_draft(&draft).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "end_time");
    }

    #[test]
    fn rejects_equal_start_and_end() {
        let draft = ActivityDraft {
            start_time: Some("09:00".into()),
            end_time: Some("09:00".into()),
            ..valid_draft()
        };
        let violations = validate_draft(&draft).unwrap_err();
        assert!(violations.iter().any(|v| v.field == "end_time"));
    }

    #[test]
    fn accepts_same_hour_later_minute() {
        let draft = ActivityDraft {
            start_time: Some("09:00".into()),
            end_time: Some("09:01".into()),
            ..valid_draft()
        };
        assert!(validate_draft(&draft).is_ok());
    }

    #[test]
    fn reports_exactly_one_message_per_missing_field() {
        let violations = validate_draft(&ActivityDraft::default()).unwrap_err();
        // Eight required fields, description and proof optional.
        assert_eq!(violations.len(), 8);
        for field in [
            "author",
            "date",
            "title",
            "category",
            "start_time",
            "end_time",
            "work_mode",
            "location",
        ] {
            let count = violations.iter().filter(|v| v.field == field).count();
            assert_eq!(count, 1, "expected one violation for {field}");
        }
    }

    #[test]
    fn rejects_bad_time_format() {
        for bad in ["24:00", "9:00", "09:60", "09-00", "morning"] {
            let draft = ActivityDraft {
                start_time: Some(bad.into()),
                ..valid_draft()
            };
            let violations = validate_draft(&draft).unwrap_err();
            assert!(
                violations.iter().any(|v| v.field == "start_time"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_date() {
        for bad in ["14-03-2025", "2025/03/14", "today"] {
            let draft = ActivityDraft {
                date: Some(bad.into()),
                ..valid_draft()
            };
            let violations = validate_draft(&draft).unwrap_err();
            assert!(violations.iter().any(|v| v.field == "date"));
        }
        // Pattern-valid but not a real date.
        let draft = ActivityDraft {
            date: Some("2025-02-30".into()),
            ..valid_draft()
        };
        let violations = validate_draft(&draft).unwrap_err();
        assert!(violations.iter().any(|v| v.field == "date"));
    }

    #[test]
    fn rejects_out_of_bounds_lengths() {
        let draft = ActivityDraft {
            author: Some("ab".into()),
            location: Some("x".into()),
            description: Some("d".repeat(256)),
            ..valid_draft()
        };
        let violations = validate_draft(&draft).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"author"));
        assert!(fields.contains(&"location"));
        assert!(fields.contains(&"description"));
    }

    #[test]
    fn rejects_unknown_enum_members() {
        let draft = ActivityDraft {
            category: Some("meeting".into()),
            work_mode: Some("remote".into()),
            ..valid_draft()
        };
        let violations = validate_draft(&draft).unwrap_err();
        assert!(violations.iter().any(|v| v.field == "category"));
        assert!(violations.iter().any(|v| v.field == "work_mode"));
    }

    #[test]
    fn patch_with_single_time_skips_ordering_check() {
        let patch = ActivityPatch {
            end_time: Some("07:00".into()),
            ..Default::default()
        };
        let update = validate_patch(&patch).expect("single time should pass");
        assert!(update.start_time.is_none());
        assert!(update.end_time.is_some());
    }

    #[test]
    fn patch_with_both_times_rechecks_ordering() {
        let patch = ActivityPatch {
            start_time: Some("10:00".into()),
            end_time: Some("09:00".into()),
            ..Default::default()
        };
        let violations = validate_patch(&patch).unwrap_err();
        assert_eq!(violations[0].field, "end_time");
    }

    #[test]
    fn empty_batch_is_a_failure() {
        assert_eq!(validate_batch(&[]), Err(BatchError::Empty));
    }

    #[test]
    fn batch_reports_first_failing_index() {
        let bad = ActivityDraft {
            start_time: Some("09:00".into()),
            end_time: Some("08:00".into()),
            ..valid_draft()
        };
        let drafts = vec![valid_draft(), valid_draft(), valid_draft(), bad];
        match validate_batch(&drafts) {
            Err(BatchError::Item { index, violations }) => {
                assert_eq!(index, 3);
                assert_eq!(violations[0].field, "end_time");
            }
            other => panic!("expected item failure, got {other:?}"),
        }
    }
}
