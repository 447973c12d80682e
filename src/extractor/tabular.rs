//! Extraction from delimited tabular data.
//!
//! Operates on the first candidate document whose content parses as a
//! delimited table with a header row. Supports direct lookups ("how many
//! employees in Sales") and superlative/total aggregates ("which
//! department has the most employees").

use crate::models::{AnswerResult, Document, ExtractorKind};

use super::Extractor;

const CONFIDENCE_DIRECT: f32 = 0.9;
const CONFIDENCE_AGGREGATE: f32 = 0.85;

const MAX_KEYWORDS: &[&str] = &["most", "highest", "largest", "biggest", "maximum"];
const MIN_KEYWORDS: &[&str] = &["least", "lowest", "smallest", "fewest", "minimum"];
const SUM_KEYWORDS: &[&str] = &["total", "sum", "combined", "overall", "altogether"];

/// Answers data questions over row-oriented delimited documents.
#[derive(Debug, Default)]
pub struct TabularExtractor;

impl TabularExtractor {
    /// Creates a new tabular extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for TabularExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Tabular
    }

    fn attempt(&self, question: &str, documents: &[&Document]) -> Option<AnswerResult> {
        let question = question.to_lowercase();

        // First candidate recognized as delimited tabular data wins.
        let (document, table) = documents
            .iter()
            .find_map(|doc| parse_table(&doc.content).map(|table| (*doc, table)))?;

        // Direct lookup takes precedence over aggregation: a question that
        // names a specific row is asking about that row.
        let (answer, confidence) =
            direct_lookup(&question, &table).or_else(|| aggregate(&question, &table))?;

        Some(AnswerResult::new(
            answer,
            Some(document.filename.clone()),
            confidence,
            ExtractorKind::Tabular,
        ))
    }
}

/// A parsed delimited table: header row plus data rows of equal width.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Parses document content as a delimited table.
///
/// Recognition requires at least two named columns and one consistent data
/// row. Rows that fail to parse (ragged width, bad quoting) are skipped,
/// not fatal.
fn parse_table(content: &str) -> Option<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers().ok()?.iter().map(str::to_string).collect();
    if headers.len() < 2 || headers.iter().any(String::is_empty) {
        return None;
    }

    let rows: Vec<Vec<String>> = reader
        .records()
        .filter_map(|record| record.ok())
        .map(|record| record.iter().map(str::to_string).collect())
        .collect();

    if rows.is_empty() {
        return None;
    }

    Some(Table { headers, rows })
}

/// Returns the row's requested field when the question names a value of
/// the table's name column (case-insensitive substring match).
fn direct_lookup(question: &str, table: &Table) -> Option<(String, f32)> {
    let column = target_column(question, table)?;

    for row in &table.rows {
        let name = row.first()?;
        if name.len() < 2 || !question.contains(&name.to_lowercase()) {
            continue;
        }

        let value = &row[column];
        if value.is_empty() {
            continue;
        }

        let answer = format!("For {}, {} is {}.", name, table.headers[column], value);
        return Some((answer, CONFIDENCE_DIRECT));
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggregateOp {
    Max,
    Min,
    Sum,
}

/// Computes max/min/sum over the requested numeric column for superlative
/// questions. Rows whose field fails numeric coercion are skipped. Ties on
/// max/min keep the first row in file order.
fn aggregate(question: &str, table: &Table) -> Option<(String, f32)> {
    let op = aggregate_op(question)?;
    let column = target_column(question, table)?;
    let header = &table.headers[column];

    match op {
        AggregateOp::Max | AggregateOp::Min => {
            let mut best: Option<(&[String], f64)> = None;
            for row in &table.rows {
                let Some(value) = parse_numeric(&row[column]) else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((_, current)) => match op {
                        AggregateOp::Max => value > current,
                        AggregateOp::Min => value < current,
                        AggregateOp::Sum => unreachable!(),
                    },
                };
                if better {
                    best = Some((row.as_slice(), value));
                }
            }

            let (row, _) = best?;
            let direction = if op == AggregateOp::Max {
                "highest"
            } else {
                "lowest"
            };
            let answer = format!("{} has the {direction} {header} at {}.", row[0], row[column]);
            Some((answer, CONFIDENCE_AGGREGATE))
        }
        AggregateOp::Sum => {
            let values: Vec<f64> = table
                .rows
                .iter()
                .filter_map(|row| parse_numeric(&row[column]))
                .collect();
            if values.is_empty() {
                return None;
            }

            let total: f64 = values.iter().sum();
            let answer = format!(
                "The total {header} across all rows is {}.",
                format_number(total)
            );
            Some((answer, CONFIDENCE_AGGREGATE))
        }
    }
}

fn aggregate_op(question: &str) -> Option<AggregateOp> {
    if MAX_KEYWORDS.iter().any(|kw| question.contains(kw)) {
        Some(AggregateOp::Max)
    } else if MIN_KEYWORDS.iter().any(|kw| question.contains(kw)) {
        Some(AggregateOp::Min)
    } else if SUM_KEYWORDS.iter().any(|kw| question.contains(kw)) {
        Some(AggregateOp::Sum)
    } else {
        None
    }
}

/// Chooses the column the question is asking about.
///
/// A non-name column whose normalized header contains one of the
/// question's tokens (singular/plural tolerant) wins; otherwise the first
/// column with any numerically coercible value is used. Returns `None` if
/// neither exists, in which case no answer is attempted.
fn target_column(question: &str, table: &Table) -> Option<usize> {
    let tokens = question_tokens(question);

    for (index, header) in table.headers.iter().enumerate().skip(1) {
        let normalized = normalize_header(header);
        let matched = tokens.iter().any(|token| {
            let singular = token.trim_end_matches('s');
            singular.len() > 3 && normalized.contains(singular)
        });
        if matched {
            return Some(index);
        }
    }

    first_numeric_column(table)
}

fn first_numeric_column(table: &Table) -> Option<usize> {
    (1..table.headers.len())
        .find(|&index| table.rows.iter().any(|row| parse_numeric(&row[index]).is_some()))
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

fn question_tokens(question: &str) -> Vec<String> {
    question
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() > 3)
        .map(str::to_string)
        .collect()
}

/// Coerces a cell to a number, tolerating currency signs and thousands
/// separators. Returns `None` for malformed values so callers skip the
/// row instead of treating it as zero.
fn parse_numeric(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentBuilder, DocumentId};

    const DEPARTMENTS: &str = "Department,EmployeeCount\nEngineering,45\nSales,30\nMarketing,20";

    fn doc(content: &str) -> Document {
        DocumentBuilder::new()
            .id(DocumentId::new(1))
            .filename("company_data.csv")
            .content(content)
            .embedding(vec![1.0, 0.0])
            .build()
    }

    #[test]
    fn aggregate_max_cites_name_and_value() {
        let document = doc(DEPARTMENTS);
        let extractor = TabularExtractor::new();

        let result = extractor
            .attempt("which department has the most employees", &[&document])
            .unwrap();

        assert!(result.answer().contains("Engineering"));
        assert!(result.answer().contains("45"));
        assert_eq!(result.confidence(), 0.85);
        assert_eq!(result.source(), Some("company_data.csv"));
        assert_eq!(result.extractor(), ExtractorKind::Tabular);
    }

    #[test]
    fn direct_lookup_returns_field_verbatim() {
        let document = doc(DEPARTMENTS);
        let extractor = TabularExtractor::new();

        let result = extractor
            .attempt("how many employees in Sales", &[&document])
            .unwrap();

        assert!(result.answer().contains("30"));
        assert!(result.answer().contains("Sales"));
        assert_eq!(result.confidence(), 0.9);
    }

    #[test]
    fn aggregate_min_selects_smallest_value() {
        let document = doc(DEPARTMENTS);
        let extractor = TabularExtractor::new();

        let result = extractor
            .attempt("which department has the fewest employees", &[&document])
            .unwrap();

        assert!(result.answer().contains("Marketing"));
        assert!(result.answer().contains("20"));
    }

    #[test]
    fn aggregate_sum_totals_numeric_column() {
        let document = doc(DEPARTMENTS);
        let extractor = TabularExtractor::new();

        let result = extractor
            .attempt("what is the total employee count", &[&document])
            .unwrap();

        assert!(result.answer().contains("95"));
        assert_eq!(result.confidence(), 0.85);
    }

    #[test]
    fn malformed_numeric_rows_are_skipped_not_zeroed() {
        let content = "Department,EmployeeCount\nEngineering,45\nSales,n/a\nMarketing,20";
        let document = doc(content);
        let extractor = TabularExtractor::new();

        // Sum ignores the malformed Sales row entirely.
        let result = extractor
            .attempt("what is the total employee count", &[&document])
            .unwrap();
        assert!(result.answer().contains("65"));

        // Min skips it as well instead of treating n/a as zero.
        let result = extractor
            .attempt("which department has the fewest employees", &[&document])
            .unwrap();
        assert!(result.answer().contains("Marketing"));
    }

    #[test]
    fn aggregate_tie_keeps_first_row_in_file_order() {
        let content = "Department,EmployeeCount\nSales,45\nEngineering,45\nMarketing,20";
        let document = doc(content);
        let extractor = TabularExtractor::new();

        let result = extractor
            .attempt("which department has the most employees", &[&document])
            .unwrap();

        assert!(result.answer().contains("Sales"));
    }

    #[test]
    fn currency_and_separators_are_coerced() {
        let content = "Department,Budget 2024\nEngineering,\"$1,200,000\"\nSales,\"$900,000\"";
        let document = doc(content);
        let extractor = TabularExtractor::new();

        let result = extractor
            .attempt("which department has the highest budget", &[&document])
            .unwrap();

        assert!(result.answer().contains("Engineering"));
    }

    #[test]
    fn non_tabular_documents_are_passed_over() {
        let prose = doc("Welcome to the company. This handbook explains everything.");
        let mut table_doc = doc(DEPARTMENTS);
        table_doc.filename = "data.csv".to_string();
        let extractor = TabularExtractor::new();

        let result = extractor
            .attempt("which department has the most employees", &[&prose, &table_doc])
            .unwrap();

        assert_eq!(result.source(), Some("data.csv"));
    }

    #[test]
    fn returns_none_when_no_candidate_is_tabular() {
        let prose = doc("Welcome to the company.");
        let extractor = TabularExtractor::new();

        let result = extractor.attempt("which department has the most employees", &[&prose]);
        assert!(result.is_none());
    }

    #[test]
    fn returns_none_without_superlative_or_named_row() {
        let document = doc(DEPARTMENTS);
        let extractor = TabularExtractor::new();

        let result = extractor.attempt("tell me about departments", &[&document]);
        assert!(result.is_none());
    }

    #[test]
    fn returns_none_when_no_column_is_numeric() {
        let content = "Department,Lead\nEngineering,Ada\nSales,Grace";
        let document = doc(content);
        let extractor = TabularExtractor::new();

        let result = extractor.attempt("which department has the most widgets", &[&document]);
        assert!(result.is_none());
    }
}
