// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Named, shaped views over caller-owned `f32` buffers.
//!
//! Tensors never own their data. The borrow lifetime guarantees the buffer
//! outlives every `Executor::run` call that sees it.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{BenchError, BenchResult};

/// Inputs handed to an executor, keyed by tensor name.
pub type InputTensors<'a> = HashMap<String, BaseTensor<'a>>;

/// Caller-allocated outputs an executor writes into, keyed by tensor name.
pub type OutputTensors<'a> = HashMap<String, BaseTensorMut<'a>>;

/// Number of elements a shape describes. A rank-0 shape holds one element.
pub fn num_elements(shape: &[usize]) -> usize {
    shape.iter().product()
}

fn check_len(name: &str, shape: &[usize], len: usize) -> BenchResult<()> {
    let expected = num_elements(shape);
    if expected != len {
        return Err(BenchError::TensorSize {
            name: name.to_string(),
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Read-only tensor view.
#[derive(Debug, Clone)]
pub struct BaseTensor<'a> {
    name: String,
    shape: Vec<usize>,
    data: &'a [f32],
}

impl<'a> BaseTensor<'a> {
    /// Create a view; fails when `data` does not hold exactly the shape's
    /// element count.
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: &'a [f32]) -> BenchResult<Self> {
        let name = name.into();
        check_len(&name, &shape, data.len())?;
        Ok(Self { name, shape, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Writable tensor view for executor outputs.
#[derive(Debug)]
pub struct BaseTensorMut<'a> {
    name: String,
    shape: Vec<usize>,
    data: &'a mut [f32],
}

impl<'a> BaseTensorMut<'a> {
    pub fn new(
        name: impl Into<String>,
        shape: Vec<usize>,
        data: &'a mut [f32],
    ) -> BenchResult<Self> {
        let name = name.into();
        check_len(&name, &shape, data.len())?;
        Ok(Self { name, shape, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut *self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Owned storage the harness allocates for one tensor; executors only ever
/// see views into it.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBuffer {
    name: String,
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl TensorBuffer {
    /// Zero-filled buffer sized to `shape`.
    pub fn zeros(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let data = vec![0.0; num_elements(&shape)];
        Self {
            name: name.into(),
            shape,
            data,
        }
    }

    pub fn from_vec(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> BenchResult<Self> {
        let name = name.into();
        check_len(&name, &shape, data.len())?;
        Ok(Self { name, shape, data })
    }

    /// Load raw little-endian `f32` values from `path`. The file must hold
    /// exactly the element count of `shape`.
    pub fn from_file(
        name: impl Into<String>,
        shape: Vec<usize>,
        path: impl AsRef<Path>,
    ) -> BenchResult<Self> {
        let name = name.into();
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| BenchError::FileRead {
            kind: "input",
            path: path.to_path_buf(),
            source: e,
        })?;

        let expected = num_elements(&shape);
        if bytes.len() != expected * std::mem::size_of::<f32>() {
            return Err(BenchError::TensorSize {
                name,
                expected,
                actual: bytes.len() / std::mem::size_of::<f32>(),
            });
        }

        let data = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self { name, shape, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn view(&self) -> BaseTensor<'_> {
        BaseTensor {
            name: self.name.clone(),
            shape: self.shape.clone(),
            data: &self.data,
        }
    }

    pub fn view_mut(&mut self) -> BaseTensorMut<'_> {
        BaseTensorMut {
            name: self.name.clone(),
            shape: self.shape.clone(),
            data: &mut self.data,
        }
    }
}

/// Serialize values the way `TensorBuffer::from_file` expects them.
pub fn f32_to_le_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_view_rejects_wrong_length() {
        let data = [1.0f32; 5];
        assert!(BaseTensor::new("input", vec![2, 3], &data).is_err());
        assert!(BaseTensor::new("input", vec![5], &data).is_ok());
    }

    #[test]
    fn test_output_view_writes_through() {
        let mut storage = vec![0.0f32; 4];
        {
            let mut out = BaseTensorMut::new("output", vec![2, 2], &mut storage).unwrap();
            out.data_mut().copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        }
        assert_eq!(storage, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_num_elements() {
        assert_eq!(num_elements(&[1, 224, 224, 3]), 150_528);
        assert_eq!(num_elements(&[]), 1);
        assert_eq!(num_elements(&[4, 0]), 0);
    }

    #[test]
    fn test_buffer_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.bin");
        std::fs::write(&path, f32_to_le_bytes(&[0.5, -1.0, 2.25])).unwrap();

        let buffer = TensorBuffer::from_file("input", vec![3], &path).unwrap();
        assert_eq!(buffer.data(), &[0.5, -1.0, 2.25]);
        assert_eq!(buffer.view().shape(), &[3]);
    }

    #[test]
    fn test_buffer_from_file_size_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.bin");
        std::fs::write(&path, f32_to_le_bytes(&[1.0, 2.0])).unwrap();

        let result = TensorBuffer::from_file("input", vec![3], &path);
        assert!(matches!(result, Err(BenchError::TensorSize { .. })));
    }

    #[test]
    fn test_buffer_from_missing_file() {
        let result = TensorBuffer::from_file("input", vec![1], "/nonexistent/input.bin");
        assert!(matches!(result, Err(BenchError::FileRead { .. })));
    }
}
