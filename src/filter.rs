use chrono::{DateTime, NaiveDate};

use crate::models::{Internship, ModerationStatus};

/// One picker entry whose stored value differs from its display label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PickerOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// Vocabulary offered by the filter bar and the posting forms. Values are
/// what the backend stores; labels are display-only.
pub const INDUSTRIES: &[&str] = &[
    "Information Technology",
    "Engineering",
    "Finance",
    "Marketing",
    "Healthcare",
    "Education",
    "Business",
    "Technology",
];

pub const LOCATIONS: &[&str] = &[
    "Abu dhabi",
    "Dubai",
    "Sharjah",
    "Alain",
    "Ajman",
    "RAK",
    "Fujairah",
    "UAQ",
    "Remote (UAE)",
];

pub const WORK_MODES: &[PickerOption] = &[
    PickerOption {
        label: "On-site",
        value: "Onsite",
    },
    PickerOption {
        label: "Remote",
        value: "Remote",
    },
    PickerOption {
        label: "Hybrid",
        value: "Hybrid",
    },
];

pub const JOB_TYPES: &[&str] = &["Internship", "Part-time", "Full-time", "Traineeship"];

/// Duration values are the bare month counts the duration criterion matches
/// by substring.
pub const DURATIONS: &[PickerOption] = &[
    PickerOption {
        label: "1 month",
        value: "1",
    },
    PickerOption {
        label: "2 months",
        value: "2",
    },
    PickerOption {
        label: "3 months",
        value: "3",
    },
    PickerOption {
        label: "4 months",
        value: "4",
    },
    PickerOption {
        label: "6 months",
        value: "6",
    },
    PickerOption {
        label: "12 months",
        value: "12",
    },
];

pub const PAYMENT_TYPES: &[&str] = &["Paid", "Unpaid", "Stipend"];

/// Salary picker entries; values are the band ids [`SalaryBand::parse`]
/// understands.
pub const SALARY_BANDS: &[PickerOption] = &[
    PickerOption {
        label: "Unpaid",
        value: "unpaid",
    },
    PickerOption {
        label: "1000 - 2000 AED",
        value: "1000-2000",
    },
    PickerOption {
        label: "2000 - 4000 AED",
        value: "2000-4000",
    },
    PickerOption {
        label: "4000+ AED",
        value: "4000plus",
    },
];

/// View-state for the listing screen's filter bar. Empty string (or the
/// `"All"` sentinel the selects emit) means a field imposes no constraint;
/// all set fields combine with AND semantics. Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    pub industry: String,
    pub location: String,
    pub work_mode: String,
    pub job_type: String,
    pub duration: String,
    /// One of the salary band ids, e.g. `"1000-2000"`.
    pub salary: String,
    /// Minimum start date, `YYYY-MM-DD`.
    pub start_date: String,
}

/// The five mutually exclusive salary buckets offered by the filter bar.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SalaryBand {
    Unpaid,
    Aed1000To2000,
    Aed2000To4000,
    Above4000,
}

impl SalaryBand {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "unpaid" => Some(SalaryBand::Unpaid),
            "1000-2000" => Some(SalaryBand::Aed1000To2000),
            "2000-4000" => Some(SalaryBand::Aed2000To4000),
            "4000plus" => Some(SalaryBand::Above4000),
            _ => None,
        }
    }

    /// Bucket a raw salary value. `"Unpaid"` is matched exactly; anything
    /// else must parse as a number. Values below 1000 fall outside every
    /// band, as does a non-numeric value.
    pub fn classify(raw: &str) -> Option<Self> {
        if raw == "Unpaid" {
            return Some(SalaryBand::Unpaid);
        }
        let amount: f64 = raw.trim().parse().ok()?;
        if amount > 4000.0 {
            Some(SalaryBand::Above4000)
        } else if amount > 2000.0 {
            Some(SalaryBand::Aed2000To4000)
        } else if amount >= 1000.0 {
            Some(SalaryBand::Aed1000To2000)
        } else {
            None
        }
    }
}

/// Narrow `internships` to the approved records matching `criteria`.
/// Pure and idempotent; safe to call on every re-render.
pub fn apply(internships: &[Internship], criteria: &FilterCriteria) -> Vec<Internship> {
    internships
        .iter()
        .filter(|internship| publicly_visible(internship) && passes(internship, criteria))
        .cloned()
        .collect()
}

/// Pending and rejected postings are never shown to the general audience,
/// regardless of what the filter bar says.
pub fn publicly_visible(internship: &Internship) -> bool {
    match internship.status {
        None => true,
        Some(status) => status == ModerationStatus::Approved,
    }
}

/// The filter predicate proper, one clause per criteria field.
pub fn passes(internship: &Internship, criteria: &FilterCriteria) -> bool {
    if !matches_field(&criteria.industry, internship.industry.as_deref()) {
        return false;
    }
    if !matches_field(&criteria.location, internship.location.as_deref()) {
        return false;
    }
    if !matches_field(&criteria.work_mode, internship.work_mode.as_deref()) {
        return false;
    }
    if !matches_field(&criteria.job_type, internship.job_type.as_deref()) {
        return false;
    }

    // Loose on purpose: the stored value may be "3 months" while the filter
    // bar emits "3".
    if !is_unset(&criteria.duration) {
        let duration = internship.duration.as_deref().unwrap_or("");
        if !duration.contains(&criteria.duration) {
            return false;
        }
    }

    if !is_unset(&criteria.salary) {
        if let Some(wanted) = SalaryBand::parse(&criteria.salary) {
            let raw = internship
                .salary
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(internship.payment_type.as_deref())
                .unwrap_or("");
            if SalaryBand::classify(raw) != Some(wanted) {
                return false;
            }
        }
        // An unrecognised band id imposes no constraint.
    }

    if !is_unset(&criteria.start_date) {
        if let (Some(start), Some(minimum)) = (
            internship.start_date.as_deref().and_then(parse_date),
            parse_date(&criteria.start_date),
        ) {
            if start < minimum {
                return false;
            }
        }
        // Unparsable dates on either side never exclude a record.
    }

    true
}

fn is_unset(value: &str) -> bool {
    value.is_empty() || value == "All"
}

fn matches_field(wanted: &str, actual: Option<&str>) -> bool {
    if is_unset(wanted) {
        return true;
    }
    let actual = actual.unwrap_or("");
    actual.trim().eq_ignore_ascii_case(wanted.trim())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
