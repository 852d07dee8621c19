//! Activity record types.
//!
//! The API accepts an all-string [`ActivityDraft`] (form fields or JSON),
//! which the validator normalizes into a typed [`NewActivity`]. Updates go
//! through the same split: [`ActivityPatch`] in, [`ActivityUpdate`] out.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Closed set of activity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityCategory {
    GeneralActivity,
    OfficialReport,
    ExamReport,
}

impl ActivityCategory {
    /// All members, in declaration order. Used for error messages.
    pub const ALL: [ActivityCategory; 3] = [
        ActivityCategory::GeneralActivity,
        ActivityCategory::OfficialReport,
        ActivityCategory::ExamReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::GeneralActivity => "general-activity",
            ActivityCategory::OfficialReport => "official-report",
            ActivityCategory::ExamReport => "exam-report",
        }
    }
}

impl FromStr for ActivityCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general-activity" => Ok(ActivityCategory::GeneralActivity),
            "official-report" => Ok(ActivityCategory::OfficialReport),
            "exam-report" => Ok(ActivityCategory::ExamReport),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of work modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkMode {
    Online,
    Hybrid,
    Offline,
}

impl WorkMode {
    pub const ALL: [WorkMode; 3] = [WorkMode::Online, WorkMode::Hybrid, WorkMode::Offline];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Online => "online",
            WorkMode::Hybrid => "hybrid",
            WorkMode::Offline => "offline",
        }
    }
}

impl FromStr for WorkMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(WorkMode::Online),
            "hybrid" => Ok(WorkMode::Hybrid),
            "offline" => Ok(WorkMode::Offline),
            _ => Err(()),
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw candidate for a new activity, exactly as submitted by the client.
///
/// Every field is a string; nothing is trusted until
/// [`crate::validation::validate_draft`] has run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityDraft {
    pub author: Option<String>,
    pub date: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub work_mode: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub proof: Option<String>,
}

/// A fully validated, normalized activity ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub author: String,
    pub date: NaiveDate,
    pub title: String,
    pub category: ActivityCategory,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub work_mode: WorkMode,
    pub location: String,
    pub description: Option<String>,
    pub proof: Option<String>,
}

/// Raw candidate for a partial update. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityPatch {
    pub author: Option<String>,
    pub date: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub work_mode: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub proof: Option<String>,
}

impl ActivityPatch {
    /// True when no field is set, which makes an update a no-op.
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.date.is_none()
            && self.title.is_none()
            && self.category.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.work_mode.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.proof.is_none()
    }
}

/// A validated partial update. Unset fields are left untouched by the
/// repository (COALESCE semantics).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityUpdate {
    pub author: Option<String>,
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub category: Option<ActivityCategory>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub work_mode: Option<WorkMode>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub proof: Option<String>,
}
