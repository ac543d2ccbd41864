use crate::common::*;

/// A dataset that an external batching/shuffling loader can access at
/// random positions, possibly from several worker threads at once.
pub trait RandomAccessDataset
where
    Self: Debug + Send + Sync,
{
    /// The number of indexed samples.
    fn size(&self) -> usize;

    /// Get the `(image, labels)` pair at `index`.
    fn get(&self, index: usize) -> Result<(Tensor, Tensor)>;
}
