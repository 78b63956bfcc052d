//! Numeric range and threshold refinements (`year >= 1990`, `rating >= 4`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Comparison operator of a numeric refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericOp {
	#[serde(rename = "<")]
	LessThan,
	#[serde(rename = "<=")]
	LessThanOrEqual,
	#[serde(rename = "=")]
	Equal,
	#[serde(rename = "!=")]
	NotEqual,
	#[serde(rename = ">=")]
	GreaterThanOrEqual,
	#[serde(rename = ">")]
	GreaterThan,
}

impl NumericOp {
	/// Operator symbol used in encoded filters.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::LessThan => "<",
			Self::LessThanOrEqual => "<=",
			Self::Equal => "=",
			Self::NotEqual => "!=",
			Self::GreaterThanOrEqual => ">=",
			Self::GreaterThan => ">",
		}
	}

	/// Evaluates `lhs <op> rhs`.
	pub fn matches(self, lhs: f64, rhs: f64) -> bool {
		match self {
			Self::LessThan => lhs < rhs,
			Self::LessThanOrEqual => lhs <= rhs,
			Self::Equal => lhs == rhs,
			Self::NotEqual => lhs != rhs,
			Self::GreaterThanOrEqual => lhs >= rhs,
			Self::GreaterThan => lhs > rhs,
		}
	}
}

/// `attribute <op> value` filter on a numeric attribute.
///
/// Equality compares `value` by [`f64::total_cmp`], so every refinement
/// (NaN included) equals its own clone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericRefinement {
	pub attribute: String,
	pub op: NumericOp,
	pub value: f64,
}

impl PartialEq for NumericRefinement {
	fn eq(&self, other: &Self) -> bool {
		self.attribute == other.attribute && self.op == other.op && self.value.total_cmp(&other.value).is_eq()
	}
}

impl Eq for NumericRefinement {}

impl NumericRefinement {
	pub fn new(attribute: impl Into<String>, op: NumericOp, value: f64) -> Self {
		Self {
			attribute: attribute.into(),
			op,
			value,
		}
	}

	/// Parses `attribute<op>value`, tolerating whitespace around the operator.
	pub fn parse(filter: &str) -> Result<Self> {
		let invalid = || QueryError::InvalidNumericFilter(filter.to_string());

		// Two-character operators first so `>=` is not read as `>`.
		const OPS: [(&str, NumericOp); 6] = [
			("<=", NumericOp::LessThanOrEqual),
			(">=", NumericOp::GreaterThanOrEqual),
			("!=", NumericOp::NotEqual),
			("<", NumericOp::LessThan),
			(">", NumericOp::GreaterThan),
			("=", NumericOp::Equal),
		];

		let (pos, symbol, op) = OPS
			.iter()
			.filter_map(|(symbol, op)| filter.find(symbol).map(|pos| (pos, *symbol, *op)))
			.min_by_key(|(pos, symbol, _)| (*pos, std::cmp::Reverse(symbol.len())))
			.ok_or_else(invalid)?;

		let attribute = filter[..pos].trim();
		let value = filter[pos + symbol.len()..].trim();
		if attribute.is_empty() {
			return Err(invalid());
		}
		let value: f64 = value.parse().map_err(|_| invalid())?;
		if !value.is_finite() {
			return Err(invalid());
		}
		Ok(Self::new(attribute, op, value))
	}
}

impl fmt::Display for NumericRefinement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}{}", self.attribute, self.op.as_str(), self.value)
	}
}
