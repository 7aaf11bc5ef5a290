//! In-memory datasets and preprocessing helpers.
//!
//! A [`Dataset`] is a pair of parallel arrays: feature vectors and integer
//! labels. Construction checks everything that can be checked without
//! knowing the network: equal lengths, consistent row width and finite
//! values. Feature count and label range are checked against the network
//! when the data is used.

use crate::error::{InputError, Result};
use crate::utils::SimpleRng;

/// Parallel arrays of feature vectors and label indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl Dataset {
    /// Build a dataset, rejecting empty, ragged or non-finite input.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self> {
        validate_inputs(&features)?;
        if features.len() != labels.len() {
            return Err(InputError::LengthMismatch {
                inputs: features.len(),
                labels: labels.len(),
            }
            .into());
        }
        Ok(Self { features, labels })
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Width of every feature vector.
    pub fn num_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    /// Iterate over `(features, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], usize)> + '_ {
        self.features
            .iter()
            .map(Vec::as_slice)
            .zip(self.labels.iter().copied())
    }

    /// Check that every label is below `num_classes`.
    pub fn validate_labels(&self, num_classes: usize) -> Result<()> {
        validate_labels(&self.labels, num_classes)
    }

    /// Subset by index, in the given order. Indices come from `shuffled_indices`.
    pub(crate) fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Shuffle and split into `(train, held_out)`.
    ///
    /// `floor(len * train_ratio)` examples go to the training part, clamped to
    /// `[1, len]`, so the training part is never empty. The held-out part may be.
    pub fn split(&self, train_ratio: f64, rng: &mut SimpleRng) -> (Dataset, Dataset) {
        let indices = self.shuffled_indices(rng);
        let (train, held_out) = indices.split_at(train_size(self.len(), train_ratio));
        (self.select(train), self.select(held_out))
    }

    pub(crate) fn shuffled_indices(&self, rng: &mut SimpleRng) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        rng.shuffle_usize(&mut indices);
        indices
    }

    /// Min-max scale every column into [0, 1]. A constant column becomes 0.
    pub fn feature_scaling(&mut self) {
        scale_columns(&mut self.features);
    }
}

/// Number of training examples for a split of `len` examples.
pub(crate) fn train_size(len: usize, train_ratio: f64) -> usize {
    ((len as f64 * train_ratio).floor() as usize).clamp(1, len.max(1))
}

/// One-hot vector with `1.0` at `label`.
///
/// # Panics
///
/// Panics if `label >= num_classes`.
pub fn one_hot(label: usize, num_classes: usize) -> Vec<f64> {
    assert!(label < num_classes, "label out of range");
    let mut target = vec![0.0; num_classes];
    target[label] = 1.0;
    target
}

/// Index of the largest value; the first one wins on ties.
///
/// Starts from negative infinity so an output equal to `f64::MIN` at index 0
/// is still found. Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut max_value = f64::NEG_INFINITY;
    let mut index = 0;
    for (i, &value) in values.iter().enumerate() {
        if value > max_value {
            max_value = value;
            index = i;
        }
    }
    index
}

/// Reject empty, ragged or non-finite rows.
pub fn validate_inputs(features: &[Vec<f64>]) -> Result<()> {
    let first = features.first().ok_or(InputError::EmptyDataset)?;
    let num_features = first.len();

    for (row, values) in features.iter().enumerate() {
        if values.len() != num_features {
            return Err(InputError::FeatureCountMismatch {
                row,
                expected: num_features,
                actual: values.len(),
            }
            .into());
        }
        validate_row(values, row)?;
    }
    Ok(())
}

/// Reject an empty row or one containing NaN or infinity.
pub fn validate_row(values: &[f64], row: usize) -> Result<()> {
    if values.is_empty() {
        return Err(InputError::EmptyRow { row }.into());
    }
    if let Some((column, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(InputError::NonFinite { row, column, value }.into());
    }
    Ok(())
}

/// Reject an empty label list or a label outside `[0, num_classes)`.
pub fn validate_labels(labels: &[usize], num_classes: usize) -> Result<()> {
    if labels.is_empty() {
        return Err(InputError::EmptyDataset.into());
    }
    if let Some((index, &label)) = labels
        .iter()
        .enumerate()
        .find(|(_, &label)| label >= num_classes)
    {
        return Err(InputError::LabelOutOfRange {
            index,
            label,
            num_classes,
        }
        .into());
    }
    Ok(())
}

/// Reject an empty list or rows whose width differs from the first row.
fn check_row_widths(features: &[Vec<f64>]) -> Result<usize> {
    let num_features = features.first().ok_or(InputError::EmptyDataset)?.len();
    if let Some((row, values)) = features
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != num_features)
    {
        return Err(InputError::FeatureCountMismatch {
            row,
            expected: num_features,
            actual: values.len(),
        }
        .into());
    }
    Ok(num_features)
}

/// Min-max scale each column of `features` in place.
///
/// # Errors
///
/// Returns an input error for empty, ragged or non-finite rows; `features`
/// is left untouched in that case.
pub fn feature_scaling(features: &mut [Vec<f64>]) -> Result<()> {
    validate_inputs(features)?;
    scale_columns(features);
    Ok(())
}

// Callers guarantee a non-empty, rectangular, finite matrix.
fn scale_columns(features: &mut [Vec<f64>]) {
    let Some(first) = features.first() else {
        return;
    };
    let mut min = first.clone();
    let mut max = first.clone();

    for row in features.iter().skip(1) {
        for (j, &value) in row.iter().enumerate() {
            if value < min[j] {
                min[j] = value;
            }
            if value > max[j] {
                max[j] = value;
            }
        }
    }

    for row in features.iter_mut() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = if max[j] != min[j] {
                (*value - min[j]) / (max[j] - min[j])
            } else {
                0.0
            };
        }
    }
}

/// Replace NaN entries with the mean of the non-NaN values in their column.
///
/// A column with no finite values at all is filled with 0. Run this on raw
/// rows before building a [`Dataset`], which rejects NaN.
///
/// # Errors
///
/// Returns an input error for an empty list or ragged rows; `features` is
/// left untouched in that case.
pub fn replace_nan_with_mean(features: &mut [Vec<f64>]) -> Result<()> {
    let num_features = check_row_widths(features)?;
    let mut sum = vec![0.0; num_features];
    let mut count = vec![0usize; num_features];

    for row in features.iter() {
        for (j, &value) in row.iter().enumerate() {
            if !value.is_nan() {
                sum[j] += value;
                count[j] += 1;
            }
        }
    }

    let mean: Vec<f64> = sum
        .iter()
        .zip(count.iter())
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();

    for row in features.iter_mut() {
        for (value, &m) in row.iter_mut().zip(mean.iter()) {
            if value.is_nan() {
                *value = m;
            }
        }
    }
    Ok(())
}
