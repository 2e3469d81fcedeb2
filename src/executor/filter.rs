//! Translation of predicate trees into record filters.
//!
//! Translation is where filter literals meet column types: each literal is
//! coerced to the type of the field it is compared with, and a literal that
//! cannot be coerced fails the whole query.

use crate::access::{AdRecord, DataType, Value, DATE_FORMAT};
use crate::catalog::Field;
use crate::executor::error::{ExecutionError, ExecutionResult, LiteralError};
use crate::filter::{Comparison, ComparisonOperator, Literal, Predicate};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Wildcard accepted by `==` and `!=` on text columns
const WILDCARD: char = '*';

/// A predicate compiled against the record schema
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    Compare {
        field: Field,
        operator: ComparisonOperator,
        operand: Value,
    },
    Pattern {
        field: Field,
        pattern: String,
        negated: bool,
    },
    In {
        field: Field,
        values: Vec<Value>,
    },
    And(Vec<RecordFilter>),
    Or(Vec<RecordFilter>),
    Not(Box<RecordFilter>),
}

impl RecordFilter {
    /// Compile a predicate tree
    pub fn translate(predicate: &Predicate) -> ExecutionResult<Self> {
        match predicate {
            Predicate::Comparison(cmp) => translate_comparison(cmp),
            Predicate::And(children) => Ok(RecordFilter::And(translate_all(children)?)),
            Predicate::Or(children) => Ok(RecordFilter::Or(translate_all(children)?)),
            Predicate::Not(inner) => Ok(RecordFilter::Not(Box::new(Self::translate(inner)?))),
        }
    }

    /// Evaluate the filter against one record
    pub fn matches(&self, record: &AdRecord) -> bool {
        match self {
            RecordFilter::Compare {
                field,
                operator,
                operand,
            } => record
                .get(*field)
                .compare(operand)
                .map_or(false, |ordering| operator_accepts(*operator, ordering)),
            RecordFilter::Pattern {
                field,
                pattern,
                negated,
            } => match record.get(*field) {
                Value::String(text) => wildcard_match(pattern, &text) != *negated,
                _ => false,
            },
            RecordFilter::In { field, values } => {
                let value = record.get(*field);
                values
                    .iter()
                    .any(|candidate| value.compare(candidate) == Some(Ordering::Equal))
            }
            RecordFilter::And(children) => children.iter().all(|c| c.matches(record)),
            RecordFilter::Or(children) => children.iter().any(|c| c.matches(record)),
            RecordFilter::Not(inner) => !inner.matches(record),
        }
    }
}

fn translate_all(children: &[Predicate]) -> ExecutionResult<Vec<RecordFilter>> {
    children.iter().map(RecordFilter::translate).collect()
}

fn translate_comparison(cmp: &Comparison) -> ExecutionResult<RecordFilter> {
    let field = cmp.field;
    let coerce = |literal: &Literal| {
        coerce_literal(literal, field.data_type())
            .map_err(|source| ExecutionError::Translation { field, source })
    };

    if cmp.operator == ComparisonOperator::In {
        let values = cmp.arguments.iter().map(coerce).collect::<Result<_, _>>()?;
        return Ok(RecordFilter::In { field, values });
    }

    // The parser guarantees exactly one argument for scalar operators
    let literal = match cmp.arguments.first() {
        Some(literal) => literal,
        None => return Ok(RecordFilter::Or(vec![])),
    };
    let operand = coerce(literal)?;

    if let Value::String(text) = &operand {
        let is_equality = matches!(
            cmp.operator,
            ComparisonOperator::Equal | ComparisonOperator::NotEqual
        );
        if is_equality && text.contains(WILDCARD) {
            return Ok(RecordFilter::Pattern {
                field,
                pattern: text.clone(),
                negated: cmp.operator == ComparisonOperator::NotEqual,
            });
        }
    }

    Ok(RecordFilter::Compare {
        field,
        operator: cmp.operator,
        operand,
    })
}

/// Convert a literal into a value of the column's type
pub fn coerce_literal(literal: &Literal, data_type: DataType) -> Result<Value, LiteralError> {
    match (data_type, literal) {
        (DataType::Varchar, Literal::Text(text) | Literal::Bare(text)) => {
            Ok(Value::String(text.clone()))
        }
        (DataType::Varchar, other) => Ok(Value::String(other.to_string())),
        (_, Literal::Bare(raw)) => coerce_literal(&Literal::infer(raw), data_type),

        (DataType::Integer | DataType::Float, Literal::Integer(n)) => Ok(Value::Integer(*n)),
        (DataType::Integer | DataType::Float, Literal::Float(x)) => Ok(Value::Float(*x)),
        (DataType::Integer | DataType::Float, Literal::Text(text)) => parse_number(text),

        (DataType::Date, Literal::Date(date)) => Ok(Value::Date(*date)),
        (DataType::Date, Literal::Text(text)) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|source| LiteralError::NotADate {
                literal: text.clone(),
                source,
            }),

        (expected, other) => Err(LiteralError::Incompatible {
            literal: other.to_string(),
            expected,
        }),
    }
}

fn parse_number(text: &str) -> Result<Value, LiteralError> {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Integer(n));
    }
    match trimmed.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(Value::Float(x)),
        Ok(_) => Err(LiteralError::Incompatible {
            literal: text.to_string(),
            expected: DataType::Integer,
        }),
        Err(source) => Err(LiteralError::NotANumber {
            literal: text.to_string(),
            source,
        }),
    }
}

fn operator_accepts(operator: ComparisonOperator, ordering: Ordering) -> bool {
    match operator {
        ComparisonOperator::Equal | ComparisonOperator::In => ordering == Ordering::Equal,
        ComparisonOperator::NotEqual => ordering != Ordering::Equal,
        ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
        ComparisonOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        ComparisonOperator::LessThan => ordering == Ordering::Less,
        ComparisonOperator::LessThanOrEqual => ordering != Ordering::Greater,
    }
}

/// Match `text` against `pattern`, where `*` stands for any run of characters
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last '*' seen and the text position it was matched at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == WILDCARD {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == WILDCARD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse;
    use std::error::Error;

    fn record(source: &str, campaign: &str, day: (i32, u32, u32), clicks: i32) -> AdRecord {
        let daily = NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap();
        AdRecord::new(source, campaign, daily, clicks, clicks * 100)
    }

    fn compile(filter: &str) -> RecordFilter {
        RecordFilter::translate(&parse(filter).unwrap()).unwrap()
    }

    #[test]
    fn test_date_comparison_with_quoted_literal() {
        let filter = compile("daily>'2020-01-01'");
        assert!(filter.matches(&record("A", "c", (2020, 1, 2), 1)));
        assert!(!filter.matches(&record("A", "c", (2020, 1, 1), 1)));
        assert!(!filter.matches(&record("A", "c", (2019, 12, 31), 1)));
    }

    #[test]
    fn test_numeric_comparisons() {
        let r = record("A", "c", (2020, 1, 1), 5);
        assert!(compile("clicks==5").matches(&r));
        assert!(compile("clicks!=4").matches(&r));
        assert!(compile("clicks>=5").matches(&r));
        assert!(compile("clicks=le=5").matches(&r));
        assert!(compile("clicks<5.5").matches(&r));
        assert!(compile("clicks=='5'").matches(&r));
        assert!(!compile("clicks>5").matches(&r));
        assert!(compile("impressions=gt=499").matches(&r));
    }

    #[test]
    fn test_logical_combinations() {
        let google = record("Google Ads", "c", (2020, 1, 1), 5);
        let twitter = record("Twitter Ads", "c", (2020, 1, 1), 1);

        let filter = compile("dataSource=='Google Ads',clicks<2");
        assert!(filter.matches(&google));
        assert!(filter.matches(&twitter));

        let filter = compile("dataSource=='Google Ads';clicks<2");
        assert!(!filter.matches(&google));
        assert!(!filter.matches(&twitter));

        let filter = compile("dataSource=out=('Google Ads')");
        assert!(!filter.matches(&google));
        assert!(filter.matches(&twitter));

        let filter = compile("clicks=in=(1,2,3)");
        assert!(!filter.matches(&google));
        assert!(filter.matches(&twitter));
    }

    #[test]
    fn test_wildcards() {
        let r = record("Google Ads", "Adventmarkt Touristik", (2020, 1, 1), 1);
        assert!(compile("campaign==Advent*").matches(&r));
        assert!(compile("campaign=='*Touristik'").matches(&r));
        assert!(compile("campaign==*markt*").matches(&r));
        assert!(!compile("campaign!=*markt*").matches(&r));
        assert!(!compile("campaign==Touristik*").matches(&r));

        assert!(wildcard_match("a*b*c", "aXXbYYc"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("a**", "a"));
        assert!(!wildcard_match("a*c", "abcd"));
        assert!(wildcard_match("*ab", "aab"));
    }

    #[test]
    fn test_type_mismatch_carries_causes() {
        let err = RecordFilter::translate(&parse("daily>'yesterday'").unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Could not translate filter on field 'daily'");

        let cause = err.source().unwrap();
        assert_eq!(cause.to_string(), "'yesterday' is not a date");
        assert!(cause.source().is_some());

        let err = RecordFilter::translate(&parse("clicks==abc").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Translation {
                source: LiteralError::NotANumber { .. },
                ..
            }
        ));

        let err = RecordFilter::translate(&parse("clicks>2020-01-01").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Translation {
                source: LiteralError::Incompatible { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_text_columns_accept_any_literal() {
        assert_eq!(
            coerce_literal(&Literal::Integer(7), DataType::Varchar).unwrap(),
            Value::from("7")
        );
        let r = record("A", "2020-01-01", (2020, 1, 1), 1);
        assert!(compile("campaign==2020-01-01").matches(&r));
    }

    #[test]
    fn test_bare_text_literals_match_verbatim() {
        for campaign in ["007", "1.50", "1e3", "2020-1-1", "+5"] {
            let r = record("A", campaign, (2020, 1, 1), 1);
            let filter = format!("campaign=={}", campaign);
            assert!(compile(&filter).matches(&r), "{} should match", filter);
        }

        let r = record("A", "7", (2020, 1, 1), 1);
        assert!(!compile("campaign==007").matches(&r));
        assert!(compile("campaign=in=(007,7)").matches(&r));
        assert_eq!(
            coerce_literal(&Literal::bare("1.50"), DataType::Varchar).unwrap(),
            Value::from("1.50")
        );
    }

    #[test]
    fn test_bare_literals_are_typed_by_column() {
        let r = record("A", "c", (2020, 1, 1), 7);
        assert!(compile("clicks==007").matches(&r));
        assert!(compile("clicks<7.50").matches(&r));
        assert!(compile("daily==2020-1-1").matches(&r));
        assert_eq!(
            coerce_literal(&Literal::bare("1e3"), DataType::Integer).unwrap(),
            Value::Float(1000.0)
        );
    }
}
