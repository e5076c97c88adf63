//! Tabular data-quality profiling for uploaded product datasets.
//!
//! [`analyze`] is a pure function of the table's contents: identical input
//! yields an identical [`DataProfile`] and rendered report, so re-running it
//! is always safe. No I/O happens here beyond the optional CSV constructor.

use std::collections::HashMap;
use std::io::Read;

use serde::Serialize;

use crate::types::AssistantError;

/// Accepted headers for the mandatory identifier column, case-insensitive.
pub const IDENTIFIER_ALIASES: &[&str] = &["sku", "product_id", "id", "item_id"];

/// Accepted headers for the mandatory product-name column, case-insensitive.
pub const NAME_ALIASES: &[&str] = &["product_name", "name", "title"];

/// Cell values treated as missing, case-insensitive, after trimming.
/// Mirrors what pandas-style CSV readers treat as NA.
const MISSING_TOKENS: &[&str] = &["null", "n/a", "na", "none", "nan"];

/// A parsed row/column dataset with named columns.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table, padding short rows so every row matches the header
    /// width. A table with no columns is a parse error.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, AssistantError> {
        if columns.is_empty() {
            return Err(AssistantError::FileParse(
                "table has no columns".to_string(),
            ));
        }
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Ok(Self { columns, rows })
    }

    /// Parses CSV input; the first record is the header.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AssistantError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()
            .map_err(|err| AssistantError::FileParse(err.to_string()))?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|err| AssistantError::FileParse(err.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Three-level fitness verdict for product-information use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Readiness {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// A column with at least one missing cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnGap {
    pub column: String,
    pub missing: usize,
    pub total: usize,
}

/// Structured data-quality findings for one uploaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataProfile {
    pub verdict: Readiness,
    pub critical_issues: Vec<String>,
    pub completeness: Vec<ColumnGap>,
    pub duplicate_identifiers: usize,
    pub identifier_column: Option<String>,
    pub name_column: Option<String>,
    pub row_count: usize,
}

impl DataProfile {
    /// Renders the findings as the text report embedded into prompts.
    /// Begins with the verdict heading; section order is fixed.
    pub fn render(&self) -> String {
        let mut out = format!("Data readiness: {}\n", self.verdict);
        out.push_str(&format!("Rows analyzed: {}\n", self.row_count));

        out.push_str("\nCritical issues:\n");
        if self.critical_issues.is_empty() {
            out.push_str("- none\n");
        } else {
            for issue in &self.critical_issues {
                out.push_str(&format!("- {issue}\n"));
            }
        }

        out.push_str("\nCompleteness:\n");
        if self.completeness.is_empty() {
            out.push_str("- no missing values detected\n");
        } else {
            for gap in &self.completeness {
                out.push_str(&format!(
                    "- {}: {} of {} rows missing\n",
                    gap.column, gap.missing, gap.total
                ));
            }
        }

        out.push_str("\nUniqueness:\n");
        match (&self.identifier_column, self.duplicate_identifiers) {
            (Some(column), 0) => {
                out.push_str(&format!("- all values in '{column}' are unique\n"));
            }
            (Some(column), duplicates) => {
                out.push_str(&format!(
                    "- {duplicates} duplicate identifier value(s) in '{column}'\n"
                ));
            }
            (None, _) => {
                out.push_str("- not checked: no identifier column resolved\n");
            }
        }

        out
    }
}

fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
}

fn resolve_column(columns: &[String], aliases: &[&str]) -> Option<usize> {
    // Alias order is the priority order: 'sku' beats a generic 'id'.
    aliases.iter().find_map(|alias| {
        columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(alias))
    })
}

/// Computes the data-quality profile for a table.
///
/// Verdict ladder: any missing mandatory column or duplicate identifiers →
/// `Low`; otherwise any column with missing cells → `Medium`; otherwise
/// `High`.
pub fn analyze(table: &Table) -> DataProfile {
    let total = table.rows.len();
    let mut critical_issues = Vec::new();

    let identifier_position = resolve_column(&table.columns, IDENTIFIER_ALIASES);
    if identifier_position.is_none() {
        critical_issues.push(format!(
            "missing mandatory identifier column (expected one of: {})",
            IDENTIFIER_ALIASES.join(", ")
        ));
    }
    let name_position = resolve_column(&table.columns, NAME_ALIASES);
    if name_position.is_none() {
        critical_issues.push(format!(
            "missing mandatory product name column (expected one of: {})",
            NAME_ALIASES.join(", ")
        ));
    }

    let completeness: Vec<ColumnGap> = table
        .columns
        .iter()
        .enumerate()
        .filter_map(|(position, column)| {
            let missing = table
                .rows
                .iter()
                .filter(|row| is_missing(&row[position]))
                .count();
            (missing > 0).then(|| ColumnGap {
                column: column.clone(),
                missing,
                total,
            })
        })
        .collect();

    let duplicate_identifiers = identifier_position
        .map(|position| {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for row in &table.rows {
                let cell = row[position].trim();
                if !is_missing(cell) {
                    *seen.entry(cell).or_insert(0) += 1;
                }
            }
            seen.values().filter(|count| **count > 1).map(|count| count - 1).sum()
        })
        .unwrap_or(0);

    let verdict = if !critical_issues.is_empty() || duplicate_identifiers > 0 {
        Readiness::Low
    } else if !completeness.is_empty() {
        Readiness::Medium
    } else {
        Readiness::High
    };

    DataProfile {
        verdict,
        critical_issues,
        completeness,
        duplicate_identifiers,
        identifier_column: identifier_position.map(|p| table.columns[p].clone()),
        name_column: name_position.map(|p| table.columns[p].clone()),
        row_count: total,
    }
}
