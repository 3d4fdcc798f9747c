//! Dataset storage and IDX loading.
//!
//! A `Dataset` is one split (training or test): a contiguous row-major buffer
//! of flattened input vectors and a parallel list of integer class labels.
//! The loaders read the classic IDX pair (big-endian image file, magic
//! `0x803`; label file, magic `0x801`), normalize pixels to `[0, 1]` and
//! surface every failure as a recoverable error so a caller never trains on a
//! partially loaded split.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::{Error, Result};

const IMAGE_MAGIC: u32 = 0x0000_0803;
const LABEL_MAGIC: u32 = 0x0000_0801;

#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<f64>,
    labels: Vec<usize>,
    input_dim: usize,
}

impl Dataset {
    /// Build a split from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` row-major; `labels` has one entry per
    /// row.
    pub fn from_flat(inputs: Vec<f64>, labels: Vec<usize>, input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        if inputs.len() % input_dim != 0 {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {input_dim}",
                inputs.len()
            )));
        }
        let len = inputs.len() / input_dim;
        if labels.len() != len {
            return Err(Error::InvalidData(format!(
                "labels length {} does not match sample count {len}",
                labels.len()
            )));
        }

        Ok(Self {
            inputs,
            labels,
            input_dim,
        })
    }

    /// Load a split from an IDX image/label file pair.
    pub fn from_idx_files(images: &Path, labels: &Path) -> Result<Self> {
        let (inputs, input_dim) = read_idx_images(images)?;
        let labels_vec = read_idx_labels(labels)?;
        if labels_vec.len() * input_dim != inputs.len() {
            return Err(Error::InvalidData(format!(
                "{} has {} labels but {} has {} images",
                labels.display(),
                labels_vec.len(),
                images.display(),
                inputs.len() / input_dim
            )));
        }
        Self::from_flat(inputs, labels_vec, input_dim)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// The `idx`-th flattened input vector.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    pub fn input(&self, idx: usize) -> &[f64] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    /// The `idx`-th class label.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    pub fn label(&self, idx: usize) -> usize {
        self.labels[idx]
    }

    /// Largest label in the split, if any.
    pub fn max_label(&self) -> Option<usize> {
        self.labels.iter().copied().max()
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| Error::InvalidData(format!("could not open {}: {e}", path.display())))?;
    Ok(BufReader::new(file))
}

fn read_be_u32(r: &mut impl Read, path: &Path, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)
        .map_err(|e| Error::InvalidData(format!("{}: could not read {what}: {e}", path.display())))?;
    Ok(u32::from_be_bytes(buf))
}

fn read_idx_images(path: &Path) -> Result<(Vec<f64>, usize)> {
    let mut r = open(path)?;

    let magic = read_be_u32(&mut r, path, "magic number")?;
    if magic != IMAGE_MAGIC {
        return Err(Error::InvalidData(format!(
            "{}: image magic mismatch (got {magic:#010x})",
            path.display()
        )));
    }
    let count = read_be_u32(&mut r, path, "image count")? as usize;
    let rows = read_be_u32(&mut r, path, "row count")? as usize;
    let cols = read_be_u32(&mut r, path, "column count")? as usize;

    let dim = rows * cols;
    if dim == 0 {
        return Err(Error::InvalidData(format!(
            "{}: degenerate image dimensions {rows}x{cols}",
            path.display()
        )));
    }
    let total = count.checked_mul(dim).ok_or_else(|| {
        Error::InvalidData(format!(
            "{}: image payload size overflows ({count} x {dim})",
            path.display()
        ))
    })?;

    let mut pixels = vec![0u8; total];
    r.read_exact(&mut pixels).map_err(|e| {
        Error::InvalidData(format!(
            "{}: truncated image payload: {e}",
            path.display()
        ))
    })?;

    let inputs = pixels.iter().map(|&p| f64::from(p) / 255.0).collect();
    Ok((inputs, dim))
}

fn read_idx_labels(path: &Path) -> Result<Vec<usize>> {
    let mut r = open(path)?;

    let magic = read_be_u32(&mut r, path, "magic number")?;
    if magic != LABEL_MAGIC {
        return Err(Error::InvalidData(format!(
            "{}: label magic mismatch (got {magic:#010x})",
            path.display()
        )));
    }
    let count = read_be_u32(&mut r, path, "label count")? as usize;

    let mut raw = vec![0u8; count];
    r.read_exact(&mut raw).map_err(|e| {
        Error::InvalidData(format!(
            "{}: truncated label payload: {e}",
            path.display()
        ))
    })?;

    Ok(raw.iter().map(|&l| l as usize).collect())
}
