//! Output types: the structured report and the extraction envelope around it.

use crate::config::DEFAULT_SENTINEL;
use crate::error::SectionIssue;
use crate::pipeline::table::Row;
use crate::sections::ReportField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a field's value came from the document or is a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Heading or label located and at least one item extracted.
    Found,
    /// Heading located but nothing could be parsed from its body.
    Empty,
    /// Heading or label absent; the field holds its default.
    Missing,
}

impl Presence {
    pub fn is_missing(self) -> bool {
        self == Presence::Missing
    }
}

/// The normalized record handed to the PDF renderer.
///
/// Every field is always populated: a section that was not found leaves an
/// empty list, a label that was not found leaves the sentinel string.
/// [`StructuredReport::presence`] says which of those happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub full_name: String,
    pub report_date: String,
    /// "Credit Scores" table.
    pub scores: Vec<Row>,
    /// "Account Summary" table.
    pub summary: Vec<Row>,
    /// "Open Revolving Accounts" table.
    pub revolving_accounts: Vec<Row>,
    /// "Summary Stats" table.
    pub revolving_stats: Vec<Row>,
    /// "Estimated FICO Score Increase" bullets.
    pub score_improvement_tips: Vec<String>,
    /// "Flags or Alerts" bullets.
    pub alerts: Vec<String>,
    /// "Non-Revolving Installment Accounts" table.
    pub installment_accounts: Vec<Row>,
    /// One entry per [`ReportField`], always complete.
    pub presence: BTreeMap<ReportField, Presence>,
}

impl Default for StructuredReport {
    fn default() -> Self {
        Self::empty(DEFAULT_SENTINEL)
    }
}

impl StructuredReport {
    /// A report with every field defaulted and marked [`Presence::Missing`].
    pub fn empty(sentinel: &str) -> Self {
        Self {
            full_name: sentinel.to_string(),
            report_date: sentinel.to_string(),
            scores: Vec::new(),
            summary: Vec::new(),
            revolving_accounts: Vec::new(),
            revolving_stats: Vec::new(),
            score_improvement_tips: Vec::new(),
            alerts: Vec::new(),
            installment_accounts: Vec::new(),
            presence: ReportField::ALL
                .iter()
                .map(|&f| (f, Presence::Missing))
                .collect(),
        }
    }

    pub fn presence_of(&self, field: ReportField) -> Presence {
        self.presence
            .get(&field)
            .copied()
            .unwrap_or(Presence::Missing)
    }

    /// Fields that fell back to their default.
    pub fn missing_fields(&self) -> Vec<ReportField> {
        ReportField::ALL
            .into_iter()
            .filter(|&f| self.presence_of(f).is_missing())
            .collect()
    }

    /// The table stored for `field`, or `None` if `field` is not a table.
    pub fn table(&self, field: ReportField) -> Option<&[Row]> {
        let rows = match field {
            ReportField::Scores => &self.scores,
            ReportField::Summary => &self.summary,
            ReportField::RevolvingAccounts => &self.revolving_accounts,
            ReportField::RevolvingStats => &self.revolving_stats,
            ReportField::InstallmentAccounts => &self.installment_accounts,
            _ => return None,
        };
        Some(rows)
    }

    /// The bullet list stored for `field`, or `None` if `field` is not a list.
    pub fn bullets(&self, field: ReportField) -> Option<&[String]> {
        match field {
            ReportField::ScoreImprovementTips => Some(&self.score_improvement_tips),
            ReportField::Alerts => Some(&self.alerts),
            _ => None,
        }
    }

    pub(crate) fn table_mut(&mut self, field: ReportField) -> Option<&mut Vec<Row>> {
        match field {
            ReportField::Scores => Some(&mut self.scores),
            ReportField::Summary => Some(&mut self.summary),
            ReportField::RevolvingAccounts => Some(&mut self.revolving_accounts),
            ReportField::RevolvingStats => Some(&mut self.revolving_stats),
            ReportField::InstallmentAccounts => Some(&mut self.installment_accounts),
            _ => None,
        }
    }

    pub(crate) fn bullets_mut(&mut self, field: ReportField) -> Option<&mut Vec<String>> {
        match field {
            ReportField::ScoreImprovementTips => Some(&mut self.score_improvement_tips),
            ReportField::Alerts => Some(&mut self.alerts),
            _ => None,
        }
    }

    pub(crate) fn scalar_mut(&mut self, field: ReportField) -> Option<&mut String> {
        match field {
            ReportField::FullName => Some(&mut self.full_name),
            ReportField::ReportDate => Some(&mut self.report_date),
            _ => None,
        }
    }
}

/// Everything produced by one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub report: StructuredReport,
    /// Non-fatal findings, in template order.
    pub issues: Vec<SectionIssue>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// `true` when no field fell back to its default.
    pub fn is_complete(&self) -> bool {
        self.stats.missing_fields == 0
    }
}

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Size of the raw input in bytes.
    pub input_bytes: usize,
    pub found_fields: usize,
    pub empty_fields: usize,
    pub missing_fields: usize,
    pub issue_count: usize,
    /// Wall-clock extraction time in microseconds.
    pub duration_us: u64,
}
