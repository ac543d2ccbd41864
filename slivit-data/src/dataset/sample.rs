use super::*;
use crate::{common::*, decoder::ImageFormat};

/// One indexed unit of imaging data, produced by joining the metadata and
/// annotations tables. Constructed once at dataset-initialization time and
/// immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sample {
    /// The value of the key column shared by both tables.
    pub key: String,
    /// Image path relative to the dataset data directory.
    pub image_file: PathBuf,
    /// Row position in the annotations table at construction time.
    pub annotation_row: usize,
}

/// Column names linking the tables to samples and image files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyColumns {
    /// The sample-identifying column, present in both tables.
    pub key: String,
    /// Optional metadata column holding the image file name. When the
    /// column is absent or empty, the file name is derived as
    /// `<key>.<format extension>`.
    pub image: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            key: "sample_id".into(),
            image: "image_file".into(),
        }
    }
}

/// Build the ordered sample index.
///
/// Samples follow the metadata row order. A metadata row joins the index
/// when its key has an annotation row whose every requested pathology cell
/// parses to a finite number; rows with unresolved labels are excluded.
pub fn build_samples(
    metadata: &CsvTable,
    annotations: &CsvTable,
    pathologies: &IndexSet<String>,
    columns: &KeyColumns,
    format: ImageFormat,
) -> Result<Vec<Sample>> {
    if pathologies.is_empty() {
        return Err(Error::configuration("the pathology list is empty"));
    }
    for pathology in pathologies {
        if !annotations.has_column(pathology) {
            return Err(Error::configuration(format!(
                "the pathology '{}' is not a column of '{}'",
                pathology,
                annotations.path().display()
            )));
        }
    }
    for table in [metadata, annotations] {
        if !table.has_column(&columns.key) {
            return Err(Error::configuration(format!(
                "the key column '{}' is not a column of '{}'",
                columns.key,
                table.path().display()
            )));
        }
    }
    if metadata.num_rows() == 0 {
        return Err(Error::data_integrity(format!(
            "the metadata table '{}' has no rows",
            metadata.path().display()
        )));
    }

    // key -> annotation row
    let mut key_to_row = IndexMap::with_capacity(annotations.num_rows());
    for row in 0..annotations.num_rows() {
        let key = match annotations.get(row, &columns.key) {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(Error::data_integrity(format!(
                    "annotation row {} has no key value",
                    row
                )))
            }
        };
        if key_to_row.insert(key, row).is_some() {
            return Err(Error::data_integrity(format!(
                "duplicated key '{}' in '{}'",
                key,
                annotations.path().display()
            )));
        }
    }

    let mut samples = vec![];
    let mut num_joined = 0;

    for row in 0..metadata.num_rows() {
        let key = match metadata.get(row, &columns.key) {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(Error::data_integrity(format!(
                    "metadata row {} has no key value",
                    row
                )))
            }
        };
        let annotation_row = match key_to_row.get(key) {
            Some(&annotation_row) => annotation_row,
            None => continue,
        };
        num_joined += 1;

        let resolvable = pathologies
            .iter()
            .all(|pathology| parse_label(annotations.get(annotation_row, pathology)).is_some());
        if !resolvable {
            warn!("sample '{}' has an unresolved label, excluded", key);
            continue;
        }

        let image_file = metadata
            .get(row, &columns.image)
            .filter(|name| !name.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}.{}", key, format.extension())));

        samples.push(Sample {
            key: key.to_owned(),
            image_file,
            annotation_row,
        });
    }

    if num_joined == 0 {
        return Err(Error::data_integrity(format!(
            "no key of '{}' matches any key of '{}'",
            metadata.path().display(),
            annotations.path().display()
        )));
    }

    info!(
        "indexed {} of {} metadata rows ({} joined, {} with unresolved labels)",
        samples.len(),
        metadata.num_rows(),
        num_joined,
        num_joined - samples.len(),
    );

    Ok(samples)
}
