//! The fixed report template: which headings exist and how each is parsed.
//!
//! The upstream AI call is prompted (see [`crate::prompts`]) to emit a fixed
//! set of `## <title>` sections. This module is the single table that maps
//! each title to a [`ReportField`] of [`crate::report::StructuredReport`] and
//! to the parser that reads it. The assembler walks [`SECTIONS`] in order;
//! adding a section means adding one row here and one field on the report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One field of [`crate::report::StructuredReport`].
///
/// Serialised in camelCase so it lines up with the JSON field names the
/// renderer consumes (`fullName`, `revolvingAccounts`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportField {
    FullName,
    ReportDate,
    Scores,
    Summary,
    RevolvingAccounts,
    RevolvingStats,
    ScoreImprovementTips,
    Alerts,
    InstallmentAccounts,
}

impl ReportField {
    /// Every field, in report order.
    pub const ALL: [ReportField; 9] = [
        ReportField::FullName,
        ReportField::ReportDate,
        ReportField::Scores,
        ReportField::Summary,
        ReportField::RevolvingAccounts,
        ReportField::RevolvingStats,
        ReportField::ScoreImprovementTips,
        ReportField::Alerts,
        ReportField::InstallmentAccounts,
    ];

    /// The JSON name of the field.
    pub fn json_name(self) -> &'static str {
        match self {
            ReportField::FullName => "fullName",
            ReportField::ReportDate => "reportDate",
            ReportField::Scores => "scores",
            ReportField::Summary => "summary",
            ReportField::RevolvingAccounts => "revolvingAccounts",
            ReportField::RevolvingStats => "revolvingStats",
            ReportField::ScoreImprovementTips => "scoreImprovementTips",
            ReportField::Alerts => "alerts",
            ReportField::InstallmentAccounts => "installmentAccounts",
        }
    }

    /// How the field's content is read.
    pub fn content_kind(self) -> ContentKind {
        match self {
            ReportField::FullName | ReportField::ReportDate => ContentKind::Scalar,
            ReportField::ScoreImprovementTips | ReportField::Alerts => ContentKind::Bullets,
            _ => ContentKind::Table,
        }
    }

    /// The section spec for heading-scoped fields; `None` for scalars.
    pub fn section(self) -> Option<&'static SectionSpec> {
        SECTIONS.iter().find(|s| s.field == self)
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}

/// Which parser reads a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A `Label: value` line anywhere in the document.
    Scalar,
    /// A pipe-delimited table under a heading.
    Table,
    /// Hyphen bullets under a heading.
    Bullets,
}

/// One row of the report template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub field: ReportField,
    /// Heading text without the `#` prefix, e.g. `"Credit Scores"`.
    pub title: &'static str,
    pub content: ContentKind,
}

impl SectionSpec {
    /// The literal heading marker searched for by
    /// [`crate::config::HeadingStrategy::FirstOccurrence`], e.g. `"## Credit Scores"`.
    pub fn marker(&self) -> String {
        format!("## {}", self.title)
    }
}

/// Heading-scoped sections, in the order they appear in the template.
pub const SECTIONS: [SectionSpec; 7] = [
    SectionSpec {
        field: ReportField::Scores,
        title: "Credit Scores",
        content: ContentKind::Table,
    },
    SectionSpec {
        field: ReportField::Summary,
        title: "Account Summary",
        content: ContentKind::Table,
    },
    SectionSpec {
        field: ReportField::RevolvingAccounts,
        title: "Open Revolving Accounts",
        content: ContentKind::Table,
    },
    SectionSpec {
        field: ReportField::RevolvingStats,
        title: "Summary Stats",
        content: ContentKind::Table,
    },
    SectionSpec {
        field: ReportField::ScoreImprovementTips,
        title: "Estimated FICO Score Increase",
        content: ContentKind::Bullets,
    },
    SectionSpec {
        field: ReportField::Alerts,
        title: "Flags or Alerts",
        content: ContentKind::Bullets,
    },
    SectionSpec {
        field: ReportField::InstallmentAccounts,
        title: "Non-Revolving Installment Accounts",
        content: ContentKind::Table,
    },
];

/// Label text for the two scalar fields.
pub const FULL_NAME_LABEL: &str = "Full Name";
pub const REPORT_DATE_LABEL: &str = "Report Date";
