//! Backend-agnostic predicate tree produced by the filter parser.
//!
//! A predicate only describes a condition; backends translate it into their
//! own representation before evaluating it.

use crate::access::value::DATE_FORMAT;
use crate::catalog::Field;
use chrono::NaiveDate;
use std::fmt;

/// Comparison operators of the filter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// List membership
    In,
}

impl ComparisonOperator {
    /// Map a comparator as written in a filter to an operator.
    ///
    /// `=out=` is not listed here; the parser expresses it as a negated `=in=`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(ComparisonOperator::Equal),
            "!=" => Some(ComparisonOperator::NotEqual),
            ">" | "=gt=" => Some(ComparisonOperator::GreaterThan),
            ">=" | "=ge=" => Some(ComparisonOperator::GreaterThanOrEqual),
            "<" | "=lt=" => Some(ComparisonOperator::LessThan),
            "<=" | "=le=" => Some(ComparisonOperator::LessThanOrEqual),
            "=in=" => Some(ComparisonOperator::In),
            _ => None,
        }
    }

    /// Whether the operator accepts more than one argument
    pub fn is_multi_value(&self) -> bool {
        matches!(self, ComparisonOperator::In)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::In => "=in=",
        }
    }
}

/// Literal argument of a comparison.
///
/// Quoted arguments are always text. Bare arguments keep their spelling and
/// are typed by shape only once the column they are compared with is known.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
    Bare(String),
}

impl Literal {
    pub fn bare(raw: impl Into<String>) -> Self {
        Literal::Bare(raw.into())
    }

    /// Classify an unquoted argument
    pub fn infer(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            return Literal::Integer(n);
        }
        if looks_numeric(raw) {
            if let Ok(x) = raw.parse::<f64>() {
                return Literal::Float(x);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Literal::Date(date);
        }
        Literal::Text(raw.to_string())
    }
}

// Rejects spellings like "inf" or "NaN" that f64 parsing would otherwise accept.
fn looks_numeric(raw: &str) -> bool {
    raw.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && raw.chars().any(|c| c.is_ascii_digit())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Literal::Text(s) | Literal::Bare(s) => write!(f, "{}", s),
        }
    }
}

/// A single `field <op> argument(s)` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: Field,
    pub operator: ComparisonOperator,
    pub arguments: Vec<Literal>,
}

/// Boolean condition tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison(Comparison),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn comparison(field: Field, operator: ComparisonOperator, arguments: Vec<Literal>) -> Self {
        Predicate::Comparison(Comparison {
            field,
            operator,
            arguments,
        })
    }

    pub fn negate(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    /// Fields referenced anywhere in the tree, in order of appearance
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, out: &mut Vec<Field>) {
        match self {
            Predicate::Comparison(cmp) => out.push(cmp.field),
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().for_each(|child| child.collect_fields(out))
            }
            Predicate::Not(inner) => inner.collect_fields(out),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison(cmp) => {
                write!(f, "{}{}", cmp.field, cmp.operator.as_str())?;
                if cmp.operator.is_multi_value() {
                    let args: Vec<String> = cmp.arguments.iter().map(|a| a.to_string()).collect();
                    write!(f, "({})", args.join(","))
                } else {
                    match cmp.arguments.first() {
                        Some(arg) => write!(f, "'{}'", arg),
                        None => Ok(()),
                    }
                }
            }
            Predicate::And(children) => write_joined(f, children, ";"),
            Predicate::Or(children) => write_joined(f, children, ","),
            Predicate::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}
