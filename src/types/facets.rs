//! Restriction facets
//!
//! `range` and `length` restrictions share one syntax: intervals separated
//! by `|`, each either a single bound or `lower..upper`, where a bound is a
//! number or one of the keywords `min`/`max`. Facets are kept as data; the
//! binding engine does not enforce them.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::element::Element;
use crate::error::{Error, Result, SchemaError};

/// One end of a range interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// The smallest value of the base type
    Min,
    /// The largest value of the base type
    Max,
    /// An explicit value
    Value(Decimal),
}

impl RangeBound {
    /// Parse a single bound
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "min" => Ok(RangeBound::Min),
            "max" => Ok(RangeBound::Max),
            other => Decimal::from_str(other).map(RangeBound::Value).map_err(|e| {
                Error::Schema(
                    SchemaError::new(format!("Invalid range bound '{}': {}", other, e))
                        .with_keyword("range"),
                )
            }),
        }
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Min => write!(f, "min"),
            RangeBound::Max => write!(f, "max"),
            RangeBound::Value(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for RangeBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A closed interval of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeInterval {
    /// Lower bound
    pub min: RangeBound,
    /// Upper bound
    pub max: RangeBound,
}

impl RangeInterval {
    /// Create a new interval
    pub fn new(min: RangeBound, max: RangeBound) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the interval; `min`/`max` are unbounded
    pub fn contains(&self, value: Decimal) -> bool {
        let above_min = match self.min {
            RangeBound::Value(min) => value >= min,
            RangeBound::Min => true,
            RangeBound::Max => false,
        };
        let below_max = match self.max {
            RangeBound::Value(max) => value <= max,
            RangeBound::Min | RangeBound::Max => true,
        };
        above_min && below_max
    }
}

/// A `range` or `length` restriction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Range {
    /// Alternative intervals in declaration order
    pub ranges: Vec<RangeInterval>,
}

impl Range {
    /// Parse a restriction expression such as `0..10 | 20 | 100..max`
    pub fn parse(expr: &str) -> Result<Self> {
        let ranges = expr
            .split('|')
            .map(str::trim)
            .map(|part| {
                let (lower, upper) = match part.split_once("..") {
                    Some((lower, upper)) => (lower, Some(upper)),
                    None => (part, None),
                };

                let min = RangeBound::parse(lower)?;
                let max = match upper {
                    Some(upper) => RangeBound::parse(upper)?,
                    None => min,
                };

                Ok(RangeInterval::new(min, max))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { ranges })
    }

    /// Parse the `value` argument of a `range`/`length` statement
    pub fn from_element(el: &Element) -> Result<Self> {
        let value = el.value.as_deref().ok_or_else(|| {
            Error::Schema(SchemaError::new("Restriction has no value").with_keyword(el.keyword.as_str()))
        })?;
        Self::parse(value)
    }

    /// Parse the restriction child with the given keyword, if present
    pub fn from_child(el: &Element, keyword: &str) -> Result<Option<Self>> {
        el.find_child(keyword).map(Self::from_element).transpose()
    }

    /// Whether any interval contains `value`
    pub fn contains(&self, value: Decimal) -> bool {
        self.ranges.iter().any(|r| r.contains(value))
    }
}
