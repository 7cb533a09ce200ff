/// A report cell after numeric normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Number(n) => serde_json::json!(n),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Coerce a raw cell to a number when it parses as one.
///
/// The API occasionally reports positive infinity for ratios with a zero denominator;
/// those become `0.0`. Other non-finite parses (`NaN`, `-inf`) are not meaningful
/// numbers and are kept as their original text.
///
/// Surrounding whitespace is ignored when parsing; text that is not a number is kept untrimmed.
#[must_use]
pub fn normalize(raw: &str) -> CellValue {
    match raw.trim().parse::<f64>() {
        Ok(v) if v == f64::INFINITY => CellValue::Number(0.0),
        Ok(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::Text(raw.to_string()),
    }
}
