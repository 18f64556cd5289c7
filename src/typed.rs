//! Fixed-width named records for each report table.
//!
//! [`StructuredReport`] keeps tables as string grids because that is what the
//! renderer draws. Code that wants to *reason* about the data (sort accounts
//! by balance, pick the lowest bureau score) converts to a [`TypedReport`]
//! instead, where every row is a named struct and any row of the wrong width
//! is set aside as a [`RowShapeError`] rather than silently misaligned.

use crate::error::RowShapeError;
use crate::pipeline::table::Row;
use crate::report::{Presence, StructuredReport};
use crate::sections::ReportField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A table row with a fixed set of named columns.
pub trait TableRecord: Sized {
    /// Type name used in error messages.
    const NAME: &'static str;
    /// Column headers, in order. The row width must equal `COLUMNS.len()`.
    const COLUMNS: &'static [&'static str];

    /// Build a record from the cells of data row `row`.
    fn from_cells(row: usize, cells: &[String]) -> Result<Self, RowShapeError>;
}

fn take_cells<const N: usize>(
    record: &str,
    row: usize,
    cells: &[String],
) -> Result<[String; N], RowShapeError> {
    <[String; N]>::try_from(cells.to_vec()).map_err(|cells| RowShapeError {
        record: record.to_string(),
        row,
        expected: N,
        found: cells.len(),
        cells,
    })
}

/// One bureau score from "Credit Scores".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub bureau: String,
    pub score: String,
    pub range: String,
}

impl ScoreRow {
    /// The score as a number, ignoring anything after the leading digits
    /// (`"720 (Good)"` → 720).
    pub fn numeric_score(&self) -> Option<u16> {
        let digits: String = self
            .score
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

impl TableRecord for ScoreRow {
    const NAME: &'static str = "ScoreRow";
    const COLUMNS: &'static [&'static str] = &["Bureau", "Score", "Range"];

    fn from_cells(row: usize, cells: &[String]) -> Result<Self, RowShapeError> {
        let [bureau, score, range] = take_cells::<3>(Self::NAME, row, cells)?;
        Ok(Self {
            bureau,
            score,
            range,
        })
    }
}

/// One metric from "Account Summary".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummaryRow {
    pub metric: String,
    pub value: String,
}

impl TableRecord for AccountSummaryRow {
    const NAME: &'static str = "AccountSummaryRow";
    const COLUMNS: &'static [&'static str] = &["Metric", "Value"];

    fn from_cells(row: usize, cells: &[String]) -> Result<Self, RowShapeError> {
        let [metric, value] = take_cells::<2>(Self::NAME, row, cells)?;
        Ok(Self { metric, value })
    }
}

/// One card or line of credit from "Open Revolving Accounts".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevolvingAccountRow {
    pub creditor: String,
    pub balance: String,
    pub credit_limit: String,
    pub utilization: String,
    pub status: String,
    pub opened: String,
}

impl TableRecord for RevolvingAccountRow {
    const NAME: &'static str = "RevolvingAccountRow";
    const COLUMNS: &'static [&'static str] = &[
        "Creditor",
        "Balance",
        "Credit Limit",
        "Utilization",
        "Status",
        "Opened",
    ];

    fn from_cells(row: usize, cells: &[String]) -> Result<Self, RowShapeError> {
        let [creditor, balance, credit_limit, utilization, status, opened] =
            take_cells::<6>(Self::NAME, row, cells)?;
        Ok(Self {
            creditor,
            balance,
            credit_limit,
            utilization,
            status,
            opened,
        })
    }
}

/// One metric from "Summary Stats".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatRow {
    pub metric: String,
    pub value: String,
}

impl TableRecord for SummaryStatRow {
    const NAME: &'static str = "SummaryStatRow";
    const COLUMNS: &'static [&'static str] = &["Metric", "Value"];

    fn from_cells(row: usize, cells: &[String]) -> Result<Self, RowShapeError> {
        let [metric, value] = take_cells::<2>(Self::NAME, row, cells)?;
        Ok(Self { metric, value })
    }
}

/// One loan from "Non-Revolving Installment Accounts".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentAccountRow {
    pub lender: String,
    pub loan_type: String,
    pub balance: String,
    pub monthly_payment: String,
    pub status: String,
    pub opened: String,
}

impl TableRecord for InstallmentAccountRow {
    const NAME: &'static str = "InstallmentAccountRow";
    const COLUMNS: &'static [&'static str] = &[
        "Lender",
        "Loan Type",
        "Balance",
        "Monthly Payment",
        "Status",
        "Opened",
    ];

    fn from_cells(row: usize, cells: &[String]) -> Result<Self, RowShapeError> {
        let [lender, loan_type, balance, monthly_payment, status, opened] =
            take_cells::<6>(Self::NAME, row, cells)?;
        Ok(Self {
            lender,
            loan_type,
            balance,
            monthly_payment,
            status,
            opened,
        })
    }
}

/// A table converted to records; rows of the wrong width are kept aside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedTable<T> {
    pub rows: Vec<T>,
    pub rejected: Vec<RowShapeError>,
}

impl<T> Default for TypedTable<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T: TableRecord> TypedTable<T> {
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut table = Self::default();
        for (i, cells) in rows.iter().enumerate() {
            match T::from_cells(i, cells) {
                Ok(record) => table.rows.push(record),
                Err(e) => table.rejected.push(e),
            }
        }
        table
    }

    /// `true` when every row fit the record.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// [`StructuredReport`] with every table as named records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedReport {
    pub full_name: String,
    pub report_date: String,
    pub scores: TypedTable<ScoreRow>,
    pub summary: TypedTable<AccountSummaryRow>,
    pub revolving_accounts: TypedTable<RevolvingAccountRow>,
    pub revolving_stats: TypedTable<SummaryStatRow>,
    pub score_improvement_tips: Vec<String>,
    pub alerts: Vec<String>,
    pub installment_accounts: TypedTable<InstallmentAccountRow>,
    pub presence: BTreeMap<ReportField, Presence>,
}

impl TypedReport {
    /// Every rejected row across all tables.
    pub fn rejected_rows(&self) -> Vec<&RowShapeError> {
        self.scores
            .rejected
            .iter()
            .chain(&self.summary.rejected)
            .chain(&self.revolving_accounts.rejected)
            .chain(&self.revolving_stats.rejected)
            .chain(&self.installment_accounts.rejected)
            .collect()
    }
}

impl StructuredReport {
    /// Convert every table to its named record type.
    pub fn to_typed(&self) -> TypedReport {
        TypedReport {
            full_name: self.full_name.clone(),
            report_date: self.report_date.clone(),
            scores: TypedTable::from_rows(&self.scores),
            summary: TypedTable::from_rows(&self.summary),
            revolving_accounts: TypedTable::from_rows(&self.revolving_accounts),
            revolving_stats: TypedTable::from_rows(&self.revolving_stats),
            score_improvement_tips: self.score_improvement_tips.clone(),
            alerts: self.alerts.clone(),
            installment_accounts: TypedTable::from_rows(&self.installment_accounts),
            presence: self.presence.clone(),
        }
    }
}
