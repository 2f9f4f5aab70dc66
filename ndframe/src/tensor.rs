/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use serde::Deserialize;
use serde::Serialize;

use crate::error::FrameError;
use crate::slice::CartesianIterator;
use crate::slice::Slice;

/// Dense n-dimensional storage: a flat buffer and the row-major
/// [`Slice`] that addresses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor<T> {
    data: Vec<T>,
    layout: Slice,
}

impl<T> Tensor<T> {
    /// Wraps `data` as a tensor of shape `shape`. The buffer length
    /// must be the product of the shape.
    pub fn from_shape_vec(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Result<Self, FrameError> {
        let layout = Slice::new_row_major(shape);
        if layout.len() != data.len() {
            return Err(FrameError::ShapeMismatch {
                expected: layout.len(),
                got: data.len(),
            });
        }
        Ok(Self { data, layout })
    }

    /// A tensor of shape `shape` whose element at each index is
    /// `f(index)`.
    pub fn from_fn<F>(shape: impl Into<Vec<usize>>, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> T,
    {
        let layout = Slice::new_row_major(shape);
        let data = CartesianIterator::new(layout.sizes().to_vec())
            .map(|index| f(&index))
            .collect();
        Self { data, layout }
    }

    pub fn shape(&self) -> &[usize] {
        self.layout.sizes()
    }

    pub fn ndim(&self) -> usize {
        self.layout.num_dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn layout(&self) -> &Slice {
        &self.layout
    }

    /// The element at `index`.
    pub fn element(&self, index: &[usize]) -> Result<&T, FrameError> {
        let loc = self.layout.location(index)?;
        Ok(&self.data[loc])
    }

    pub fn element_mut(&mut self, index: &[usize]) -> Result<&mut T, FrameError> {
        let loc = self.layout.location(index)?;
        Ok(&mut self.data[loc])
    }

    /// The element at storage location `loc`.
    pub fn at_location(&self, loc: usize) -> Option<&T> {
        self.data.get(loc)
    }

    pub fn at_location_mut(&mut self, loc: usize) -> Option<&mut T> {
        self.data.get_mut(loc)
    }

    /// Elements in storage (row-major) order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Every index of this tensor's shape, in row-major order.
    pub fn indices(&self) -> impl Iterator<Item = Vec<usize>> {
        CartesianIterator::new(self.shape().to_vec())
    }

    /// Reinterprets the buffer with a new shape of the same size.
    pub fn reshape(&mut self, shape: &[usize]) -> Result<(), FrameError> {
        self.layout = self.layout.view(shape)?;
        Ok(())
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Tensor<U> {
        Tensor {
            data: self.data.iter().map(f).collect(),
            layout: self.layout.clone(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Clone> Tensor<T> {
    /// A tensor of shape `shape` with every element set to `value`.
    pub fn filled(shape: impl Into<Vec<usize>>, value: T) -> Self {
        let layout = Slice::new_row_major(shape);
        Self {
            data: vec![value; layout.len()],
            layout,
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element() {
        let t = Tensor::from_shape_vec([2, 3], (0..6).collect()).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(*t.element(&[1, 2]).unwrap(), 5);
        assert_eq!(*t.element(&[0, 1]).unwrap(), 1);
        assert!(t.element(&[2, 0]).is_err());
        assert!(t.element(&[0]).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(matches!(
            Tensor::from_shape_vec([2, 2], vec![1, 2, 3]),
            Err(FrameError::ShapeMismatch {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn test_from_fn_and_indices() {
        let t = Tensor::from_fn([2, 2], |i| i[0] * 10 + i[1]);
        assert_eq!(t.iter().copied().collect::<Vec<_>>(), vec![0, 1, 10, 11]);
        assert_eq!(t.indices().count(), 4);
    }

    #[test]
    fn test_reshape_and_fill() {
        let mut t = Tensor::filled([2, 3], 0);
        *t.element_mut(&[1, 1]).unwrap() = 7;
        t.reshape(&[3, 2]).unwrap();
        assert_eq!(*t.element(&[2, 0]).unwrap(), 7);
        assert!(t.reshape(&[4, 2]).is_err());
        t.fill(1);
        assert!(t.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_zero_dimensional() {
        let t = Tensor::from_shape_vec(Vec::<usize>::new(), vec![42]).unwrap();
        assert_eq!(*t.element(&[]).unwrap(), 42);
        assert_eq!(t.indices().collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
    }
}
