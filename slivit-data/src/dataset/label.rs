use super::*;
use crate::common::*;

/// Parse one annotation cell into a finite label value.
///
/// Missing cells, empty cells, and cells that do not parse to a finite
/// number (e.g. `NaN`) all yield `None`.
pub fn parse_label(cell: Option<&str>) -> Option<R64> {
    let value: f64 = cell?.trim().parse().ok()?;
    R64::try_new(value)
}

/// Resolve the label vector of one sample against an annotations table.
///
/// The vector holds one value per requested pathology, in pathology order,
/// exactly as stored in the table. It is recomputed on every call; nothing
/// is cached. The annotation row is re-checked by key rather than trusted
/// from index-construction time, since the backing table handed in here is
/// not necessarily the one the sample index was built against.
pub fn resolve_labels(
    sample: &Sample,
    annotations: &CsvTable,
    key_column: &str,
    pathologies: &IndexSet<String>,
) -> Result<Vec<R64>> {
    let key = sample.key.as_str();

    let row = if annotations.get(sample.annotation_row, key_column) == Some(key) {
        sample.annotation_row
    } else {
        (0..annotations.num_rows())
            .find(|&row| annotations.get(row, key_column) == Some(key))
            .ok_or_else(|| {
                Error::data_integrity(format!("no annotation row with key '{}'", key))
            })?
    };

    pathologies
        .iter()
        .map(|pathology| {
            parse_label(annotations.get(row, pathology)).ok_or_else(|| {
                Error::data_integrity(format!(
                    "the label '{}' of sample '{}' is missing or not a finite number",
                    pathology, key
                ))
            })
        })
        .try_collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_label_test() {
        assert_eq!(parse_label(Some("1.0")), Some(r64(1.0)));
        assert_eq!(parse_label(Some(" 0.5 ")), Some(r64(0.5)));
        assert_eq!(parse_label(Some("-3")), Some(r64(-3.0)));
        assert_eq!(parse_label(Some("NaN")), None);
        assert_eq!(parse_label(Some("inf")), None);
        assert_eq!(parse_label(Some("")), None);
        assert_eq!(parse_label(Some("yes")), None);
        assert_eq!(parse_label(None), None);
    }
}
