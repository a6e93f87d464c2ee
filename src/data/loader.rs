//! Batched, restartable loaders

use super::Dataset;
use crate::train::Batch;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::rc::Rc;

/// Iterator over the batches of one epoch
pub type Batches = Box<dyn Iterator<Item = Batch>>;

/// A finite, restartable source of batches
///
/// Every call to `batches` starts a fresh pass over the data.
pub trait BatchSource {
    /// Start a new pass over the data
    fn batches(&mut self) -> Batches;

    /// Number of batches per pass
    fn len(&self) -> usize;

    /// Check if a pass yields no batches
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BatchSource for Vec<Batch> {
    fn batches(&mut self) -> Batches {
        Box::new(self.clone().into_iter())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// In-memory loader that slices a [`Dataset`] into batches
///
/// Shuffling takes an explicit RNG so runs are reproducible without any
/// process-wide seed.
///
/// # Example
///
/// ```
/// use aprendiz::data::{BatchSource, DataLoader, Dataset};
/// use ndarray::Array2;
///
/// let ds = Dataset::new(Array2::zeros((10, 3)), Array2::zeros((10, 1))).unwrap();
/// let mut loader = DataLoader::new(ds, 4);
/// assert_eq!(loader.len(), 3);
/// assert_eq!(loader.batches().map(|b| b.len()).collect::<Vec<_>>(), vec![4, 4, 2]);
/// ```
pub struct DataLoader {
    dataset: Rc<Dataset>,
    batch_size: usize,
    rng: Option<StdRng>,
}

impl DataLoader {
    /// Sequential loader
    pub fn new(dataset: Dataset, batch_size: usize) -> Self {
        Self {
            dataset: Rc::new(dataset),
            batch_size: batch_size.max(1),
            rng: None,
        }
    }

    /// Loader that reshuffles sample order on every pass
    pub fn shuffled(dataset: Dataset, batch_size: usize, rng: StdRng) -> Self {
        Self {
            rng: Some(rng),
            ..Self::new(dataset, batch_size)
        }
    }

    /// Batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl BatchSource for DataLoader {
    fn batches(&mut self) -> Batches {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if let Some(rng) = self.rng.as_mut() {
            order.shuffle(rng);
        }

        let dataset = Rc::clone(&self.dataset);
        let batch_size = self.batch_size;
        let chunks: Vec<Vec<usize>> = order.chunks(batch_size).map(<[usize]>::to_vec).collect();
        Box::new(chunks.into_iter().map(move |indices| {
            let (inputs, targets) = dataset.select(&indices);
            Batch::new(vec![inputs, targets])
        }))
    }

    fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }
}

/// Training and validation sources
pub struct DataLoaders {
    /// Source for training passes
    pub train: Box<dyn BatchSource>,
    /// Source for validation passes
    pub valid: Box<dyn BatchSource>,
}

impl DataLoaders {
    /// Pair two sources
    pub fn new(train: impl BatchSource + 'static, valid: impl BatchSource + 'static) -> Self {
        Self {
            train: Box::new(train),
            valid: Box::new(valid),
        }
    }

    /// Build loaders from datasets: shuffled training batches and unshuffled
    /// validation batches of twice the size
    pub fn from_datasets(train: Dataset, valid: Dataset, batch_size: usize, rng: StdRng) -> Self {
        Self::new(
            DataLoader::shuffled(train, batch_size, rng),
            DataLoader::new(valid, batch_size * 2),
        )
    }

    /// Source for a pass kind
    pub fn get_mut(&mut self, training: bool) -> &mut dyn BatchSource {
        if training {
            self.train.as_mut()
        } else {
            self.valid.as_mut()
        }
    }
}
