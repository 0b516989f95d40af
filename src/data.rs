//! Examples and datasets.
//!
//! A [`Data`] is one example: an input matrix, an optional target and an
//! optional label. Inputs may be any shape (e.g. an image grid); the network
//! flattens them row-major into a column vector on a private copy.
//!
//! The dataset text format is a sequence of line pairs: the input values, then
//! the target values, each comma-separated in row-major order.

use std::fs;
use std::ops::Index;
use std::path::Path;

use tracing::{error, info};

use crate::matrix::parse_values;
use crate::{Error, Matrix, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    input: Matrix,
    target: Option<Matrix>,
    label: Option<String>,
}

impl Data {
    pub fn new(input: Matrix, target: Matrix) -> Self {
        Self {
            input,
            target: Some(target),
            label: None,
        }
    }

    /// An example without a target, for prediction only.
    pub fn unlabeled(input: Matrix) -> Self {
        Self {
            input,
            target: None,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    pub fn input(&self) -> &Matrix {
        &self.input
    }

    #[inline]
    pub fn target(&self) -> Option<&Matrix> {
        self.target.as_ref()
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_input(&mut self, input: Matrix) {
        self.input = input;
    }

    pub fn set_target(&mut self, target: Matrix) {
        self.target = Some(target);
    }

    /// Column vector of length `num_labels` with a single `1.0` at `index`.
    pub fn one_hot(num_labels: usize, index: usize) -> Result<Matrix> {
        if index >= num_labels {
            return Err(Error::InvalidData(format!(
                "label index {index} out of range for {num_labels} labels"
            )));
        }
        let mut target = Matrix::zeros(num_labels, 1);
        target[(index, 0)] = 1.0;
        Ok(target)
    }

    /// Grayscale `height x width` matrix from packed, row-major RGB bytes.
    ///
    /// Cell `(i, j)` is the plain mean of the red, green and blue intensities
    /// of the pixel at column `j`, row `i`.
    pub fn grayscale_from_rgb(width: usize, height: usize, pixels: &[u8]) -> Result<Matrix> {
        if pixels.len() != width * height * 3 {
            return Err(Error::InvalidData(format!(
                "expected {} bytes for a {width}x{height} RGB image, got {}",
                width * height * 3,
                pixels.len()
            )));
        }

        let mut m = Matrix::zeros(height, width);
        for (idx, px) in pixels.chunks_exact(3).enumerate() {
            let sum = f64::from(px[0]) + f64::from(px[1]) + f64::from(px[2]);
            m[(idx / width, idx % width)] = sum / 3.0;
        }
        Ok(m)
    }

    /// A labelled image example: grayscale input plus a one-hot target.
    pub fn from_rgb(
        width: usize,
        height: usize,
        pixels: &[u8],
        num_labels: usize,
        label_index: usize,
        label: impl Into<String>,
    ) -> Result<Self> {
        let input = Self::grayscale_from_rgb(width, height, pixels)?;
        let target = Self::one_hot(num_labels, label_index)?;
        Ok(Self::new(input, target).with_label(label))
    }
}

/// An ordered collection of examples plus the class labels they use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    examples: Vec<Data>,
    labels: Vec<String>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an example and return the new length.
    pub fn push(&mut self, data: Data) -> usize {
        self.examples.push(data);
        self.examples.len()
    }

    /// Append a class label and return the number of labels.
    pub fn add_label(&mut self, label: impl Into<String>) -> usize {
        self.labels.push(label.into());
        self.labels.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Data> {
        self.examples.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Data> {
        self.examples.iter()
    }

    #[inline]
    pub fn examples(&self) -> &[Data] {
        &self.examples
    }

    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Element count of the first example's input.
    pub fn input_size(&self) -> Option<usize> {
        self.examples.first().map(|d| d.input.len())
    }

    /// Element count of the first example's target.
    pub fn target_size(&self) -> Option<usize> {
        self.examples.first().and_then(|d| d.target.as_ref()).map(Matrix::len)
    }

    /// [`Matrix::normalize`] every input.
    pub fn normalize(&mut self) {
        for d in &mut self.examples {
            d.input.normalize();
        }
    }

    /// Downsample every input by `stride` (vector or 2-D, per input shape).
    pub fn downsample(&mut self, stride: usize) -> Result<()> {
        let inputs = self
            .examples
            .iter()
            .map(|d| d.input.downsample_auto(stride))
            .collect::<Result<Vec<_>>>()?;
        for (d, input) in self.examples.iter_mut().zip(inputs) {
            d.input = input;
        }
        Ok(())
    }

    /// Use each example's input as its target (autoencoder training).
    pub fn set_inputs_as_target(&mut self) {
        for d in &mut self.examples {
            d.target = Some(d.input.clone());
        }
    }

    /// Serialize to the line-pair text format.
    pub fn to_text(&self) -> Result<String> {
        let mut out = String::new();
        for (i, d) in self.examples.iter().enumerate() {
            let target = d
                .target
                .as_ref()
                .ok_or_else(|| Error::InvalidData(format!("example {i} has no target")))?;
            out.push_str(&d.input.to_flat_line());
            out.push('\n');
            out.push_str(&target.to_flat_line());
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse the line-pair text format. Inputs and targets become column vectors.
    pub fn from_text(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() % 2 != 0 {
            return Err(Error::Parse(format!(
                "dataset has {} non-empty lines; expected input/target pairs",
                lines.len()
            )));
        }

        let mut ds = DataSet::new();
        for (pair_idx, pair) in lines.chunks_exact(2).enumerate() {
            let input = parse_values(pair[0])
                .map_err(|e| Error::Parse(format!("example {pair_idx} input: {e}")))?;
            let target = parse_values(pair[1])
                .map_err(|e| Error::Parse(format!("example {pair_idx} target: {e}")))?;
            ds.push(Data::new(Matrix::vector(&input), Matrix::vector(&target)));
        }
        Ok(ds)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        let result = self
            .to_text()
            .and_then(|text| fs::write(p, text).map_err(|e| Error::io(p, e)));
        match &result {
            Ok(()) => info!(path = %p.display(), examples = self.len(), "dataset saved"),
            Err(e) => error!(path = %p.display(), error = %e, "dataset save failed"),
        }
        result
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let result = fs::read_to_string(p)
            .map_err(|e| Error::io(p, e))
            .and_then(|text| Self::from_text(&text));
        match &result {
            Ok(ds) => info!(path = %p.display(), examples = ds.len(), "dataset loaded"),
            Err(e) => error!(path = %p.display(), error = %e, "dataset load failed"),
        }
        result
    }
}

impl Index<usize> for DataSet {
    type Output = Data;

    fn index(&self, idx: usize) -> &Data {
        &self.examples[idx]
    }
}

impl FromIterator<Data> for DataSet {
    fn from_iter<I: IntoIterator<Item = Data>>(iter: I) -> Self {
        Self {
            examples: iter.into_iter().collect(),
            labels: Vec::new(),
        }
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Data;
    type IntoIter = std::slice::Iter<'a, Data>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}
