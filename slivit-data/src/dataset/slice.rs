use super::*;
use crate::{
    common::*,
    decoder::{Decoder, ImageFormat},
    transform::{self, TransformChain},
};

/// The slice dataset builder.
#[derive(Debug)]
pub struct SliceDatasetInit {
    pub metadata_file: PathBuf,
    pub annotations_file: PathBuf,
    pub data_dir: PathBuf,
    pub pathologies: Vec<String>,
    pub format: ImageFormat,
    pub columns: KeyColumns,
    /// Transform chain applied to every decoded image. Defaults to
    /// [`transform::default_transform`].
    pub transform: Option<TransformChain>,
}

impl SliceDatasetInit {
    pub fn new(
        metadata_file: impl Into<PathBuf>,
        annotations_file: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        pathologies: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            metadata_file: metadata_file.into(),
            annotations_file: annotations_file.into(),
            data_dir: data_dir.into(),
            pathologies: pathologies.into_iter().map(Into::into).collect(),
            format: ImageFormat::Jpeg,
            columns: KeyColumns::default(),
            transform: None,
        }
    }

    pub fn build(self) -> Result<SliceDataset> {
        let Self {
            metadata_file,
            annotations_file,
            data_dir,
            pathologies,
            format,
            columns,
            transform,
        } = self;

        let num_requested = pathologies.len();
        let pathologies: IndexSet<String> = pathologies.into_iter().collect();
        if pathologies.len() != num_requested {
            return Err(Error::configuration("duplicated pathology names"));
        }

        let metadata = CsvTable::open(&metadata_file)?;
        let annotations = CsvTable::open(&annotations_file)?;
        let samples = build_samples(&metadata, &annotations, &pathologies, &columns, format)?;
        let decoder = format.decoder();
        let transform = transform.unwrap_or_else(transform::default_transform);

        info!(
            "dataset ready: {} samples, {} pathologies, format {}",
            samples.len(),
            pathologies.len(),
            format
        );

        Ok(SliceDataset {
            metadata,
            annotations,
            pathologies,
            columns,
            samples,
            data_dir,
            decoder,
            transform,
        })
    }
}

/// The labeled slice dataset.
///
/// All state is established at construction time and read-only afterward,
/// so access is safe from concurrent loader workers. Every access re-reads
/// the image file from disk and re-resolves the label vector.
#[derive(Debug)]
pub struct SliceDataset {
    metadata: CsvTable,
    annotations: CsvTable,
    pathologies: IndexSet<String>,
    columns: KeyColumns,
    samples: Vec<Sample>,
    data_dir: PathBuf,
    decoder: Box<dyn Decoder>,
    transform: TransformChain,
}

impl SliceDataset {
    /// The ordered sample index.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn metadata(&self) -> &CsvTable {
        &self.metadata
    }

    pub fn annotations(&self) -> &CsvTable {
        &self.annotations
    }

    /// The requested pathologies, in label-vector order.
    pub fn pathologies(&self) -> &IndexSet<String> {
        &self.pathologies
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    /// Get the transformed image and the label vector of the sample at
    /// `index`.
    ///
    /// The image tensor is `[3, 224, 224]` float in `[0, 1]` under the
    /// default transform chain; the label tensor is 1-D float with exactly
    /// one value per pathology, in pathology order.
    pub fn get(&self, index: usize) -> Result<(Tensor, Tensor)> {
        let sample = self.samples.get(index).ok_or(Error::OutOfRange {
            index,
            size: self.samples.len(),
        })?;

        let image_path = self.data_dir.join(&sample.image_file);
        let image = self.decoder.decode(&image_path)?;
        let image = self.transform.apply(image)?;

        let labels = resolve_labels(
            sample,
            &self.annotations,
            &self.columns.key,
            &self.pathologies,
        )?;
        if labels.len() != self.pathologies.len() {
            return Err(Error::invariant(format!(
                "the label vector of sample '{}' has {} values but {} pathologies are requested",
                sample.key,
                labels.len(),
                self.pathologies.len()
            )));
        }

        let labels: Vec<f32> = labels.iter().map(|value| value.raw() as f32).collect();
        let labels = Tensor::of_slice(&labels);

        Ok((image, labels))
    }
}

impl RandomAccessDataset for SliceDataset {
    fn size(&self) -> usize {
        SliceDataset::size(self)
    }

    fn get(&self, index: usize) -> Result<(Tensor, Tensor)> {
        SliceDataset::get(self, index)
    }
}
