use super::{CellValue, normalize};
use crate::report::ReportError;

/// A named cell of a report row.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub value: CellValue,
}

/// A report row split into its dimension and metric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedRow {
    pub dimensions: Vec<Entry>,
    pub metrics: Vec<Entry>,
}

impl ClassifiedRow {
    /// Find a metric entry by its column name.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<&Entry> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

/// Split one row into dimensions and metrics.
///
/// A column is a metric if and only if its header appears in `metric_names`; the
/// value's type plays no part. Column order is preserved within each list.
pub fn classify<H, V>(headers: &[H], values: &[V], metric_names: &[String]) -> Result<ClassifiedRow, ReportError>
where
    H: AsRef<str>,
    V: AsRef<str>,
{
    if headers.len() != values.len() {
        return Err(ReportError::ShapeMismatch {
            headers: headers.len(),
            values: values.len(),
        });
    }

    let mut row = ClassifiedRow::default();
    for (header, value) in headers.iter().zip(values) {
        let header = header.as_ref();
        let entry = Entry {
            name: header.to_string(),
            value: normalize(value.as_ref()),
        };

        if metric_names.iter().any(|m| m == header) {
            row.metrics.push(entry);
        } else {
            row.dimensions.push(entry);
        }
    }

    Ok(row)
}
