/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Strided layouts of dense storage.

use std::iter::zip;

use serde::Deserialize;
use serde::Serialize;

/// The type of error for layout operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SliceError {
    #[error("invalid dims: expected {expected}, got {got}")]
    InvalidDims { expected: usize, got: usize },

    #[error("index {index} out of range {total}")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("value {value} not in slice")]
    ValueNotInSlice { value: usize },

    #[error("incompatible view: {reason}")]
    IncompatibleView { reason: String },

    #[error("empty range: {begin}..{end} (step {step})")]
    EmptyRange {
        begin: usize,
        end: usize,
        step: usize,
    },

    #[error("dimension {dim} out of range for {ndims}-dimensional slice")]
    DimensionOutOfRange { dim: usize, ndims: usize },
}

/// The layout of an n-dimensional array in flat storage: an offset
/// plus one size and one stride per dimension.
///
/// ```text
/// location(i₀, ..., iₖ₋₁) = offset + Σ iⱼ × strides[j]
/// ```
///
/// Variables own a row-major slice over their storage. Views reuse
/// [`Slice::at`] and [`Slice::select`] to describe the region they
/// expose without copying, and [`Slice::insert_unit_dim`] to add a
/// dimension of size one.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Slice {
    offset: usize,
    sizes: Vec<usize>,
    strides: Vec<usize>,
}

impl Slice {
    /// Creates a slice from explicit offset, sizes and strides. Sizes
    /// and strides must have the same length.
    pub fn new(offset: usize, sizes: Vec<usize>, strides: Vec<usize>) -> Result<Self, SliceError> {
        if sizes.len() != strides.len() {
            return Err(SliceError::InvalidDims {
                expected: sizes.len(),
                got: strides.len(),
            });
        }
        Ok(Slice {
            offset,
            sizes,
            strides,
        })
    }

    /// A dense slice of the given sizes, last dimension varying
    /// fastest.
    pub fn new_row_major(sizes: impl Into<Vec<usize>>) -> Self {
        let sizes = sizes.into();
        let strides = row_major_strides(&sizes);
        Self {
            offset: 0,
            sizes,
            strides,
        }
    }

    /// The number of dimensions.
    pub fn num_dim(&self) -> usize {
        self.sizes.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The size of each dimension.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// The number of addressed elements.
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this slice is dense row-major storage starting at zero.
    pub fn is_contiguous(&self) -> bool {
        self.offset == 0 && self.strides == row_major_strides(&self.sizes)
    }

    /// The storage location of the element at `coord`. Every
    /// coordinate must be within its dimension.
    pub fn location(&self, coord: &[usize]) -> Result<usize, SliceError> {
        if coord.len() != self.sizes.len() {
            return Err(SliceError::InvalidDims {
                expected: self.sizes.len(),
                got: coord.len(),
            });
        }
        let mut loc = self.offset;
        for ((&index, &size), &stride) in zip(zip(coord, &self.sizes), &self.strides) {
            if index >= size {
                return Err(SliceError::IndexOutOfRange { index, total: size });
            }
            loc += index * stride;
        }
        Ok(loc)
    }

    /// The coordinate of storage location `value`, for row-major
    /// slices.
    pub fn coordinates(&self, value: usize) -> Result<Vec<usize>, SliceError> {
        let mut rest = value
            .checked_sub(self.offset)
            .ok_or(SliceError::ValueNotInSlice { value })?;
        let mut order: Vec<usize> = (0..self.num_dim()).collect();
        order.sort_by_key(|&d| std::cmp::Reverse(self.strides[d]));
        let mut coord = vec![0; self.num_dim()];
        for d in order {
            let (stride, size) = (self.strides[d], self.sizes[d]);
            let index = if size > 1 && stride > 0 { rest / stride } else { 0 };
            if index >= size.max(1) {
                return Err(SliceError::ValueNotInSlice { value });
            }
            coord[d] = index;
            rest -= index * stride;
        }
        if rest != 0 {
            return Err(SliceError::ValueNotInSlice { value });
        }
        Ok(coord)
    }

    /// Fixes dimension `dim` at `index`, removing that dimension.
    pub fn at(&self, dim: usize, index: usize) -> Result<Self, SliceError> {
        self.check_dim(dim)?;
        if index >= self.sizes[dim] {
            return Err(SliceError::IndexOutOfRange {
                index,
                total: self.sizes[dim],
            });
        }
        let mut sizes = self.sizes.clone();
        let mut strides = self.strides.clone();
        sizes.remove(dim);
        let stride = strides.remove(dim);
        Ok(Slice {
            offset: self.offset + index * stride,
            sizes,
            strides,
        })
    }

    /// Restricts dimension `dim` to `begin..end`, every `step`th.
    pub fn select(
        &self,
        dim: usize,
        begin: usize,
        end: usize,
        step: usize,
    ) -> Result<Self, SliceError> {
        self.check_dim(dim)?;
        if step == 0 || end <= begin {
            return Err(SliceError::EmptyRange { begin, end, step });
        }
        if end > self.sizes[dim] {
            return Err(SliceError::IndexOutOfRange {
                index: end,
                total: self.sizes[dim],
            });
        }
        let mut slice = self.clone();
        slice.offset += begin * slice.strides[dim];
        slice.sizes[dim] = (end - begin).div_ceil(step);
        slice.strides[dim] *= step;
        Ok(slice)
    }

    /// Inserts a dimension of size one before dimension `dim`. The
    /// addressed locations are unchanged.
    pub fn insert_unit_dim(&self, dim: usize) -> Result<Self, SliceError> {
        if dim > self.num_dim() {
            return Err(SliceError::DimensionOutOfRange {
                dim,
                ndims: self.num_dim(),
            });
        }
        let stride = self.strides.get(dim).map_or(1, |s| s * self.sizes[dim]);
        let mut slice = self.clone();
        slice.sizes.insert(dim, 1);
        slice.strides.insert(dim, stride);
        Ok(slice)
    }

    /// Reinterprets a contiguous slice with new sizes holding the same
    /// number of elements.
    pub fn view(&self, new_sizes: &[usize]) -> Result<Slice, SliceError> {
        let view_elems: usize = new_sizes.iter().product();
        if view_elems != self.len() {
            return Err(SliceError::IncompatibleView {
                reason: format!(
                    "element count mismatch: base has {}, view wants {}",
                    self.len(),
                    view_elems
                ),
            });
        }
        if !self.is_contiguous() {
            return Err(SliceError::IncompatibleView {
                reason: "view requires a contiguous base".to_string(),
            });
        }
        Ok(Slice::new_row_major(new_sizes))
    }

    /// Storage locations in row-major order of the coordinates.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        CartesianIterator::new(self.sizes.clone()).map(move |coord| {
            self.offset
                + zip(&coord, &self.strides)
                    .map(|(i, s)| i * s)
                    .sum::<usize>()
        })
    }

    fn check_dim(&self, dim: usize) -> Result<(), SliceError> {
        if dim >= self.num_dim() {
            return Err(SliceError::DimensionOutOfRange {
                dim,
                ndims: self.num_dim(),
            });
        }
        Ok(())
    }
}

fn row_major_strides(sizes: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; sizes.len()];
    for i in (0..sizes.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * sizes[i + 1];
    }
    strides
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Iterates over every coordinate of a shape in row-major order (last
/// dimension varies fastest). A zero-dimensional shape has exactly one
/// coordinate, the empty one.
///
/// ```ignore
/// let coords: Vec<_> = CartesianIterator::new(vec![2, 2]).collect();
/// assert_eq!(coords, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
/// ```
pub(crate) struct CartesianIterator {
    dims: Vec<usize>,
    index: usize,
    total: usize,
}

impl CartesianIterator {
    pub(crate) fn new(dims: Vec<usize>) -> Self {
        let total = dims.iter().product();
        CartesianIterator {
            dims,
            index: 0,
            total,
        }
    }
}

impl Iterator for CartesianIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.total {
            return None;
        }
        let mut result = vec![0; self.dims.len()];
        let mut rest = self.index;
        for (i, dim) in self.dims.iter().enumerate().rev() {
            result[i] = rest % dim;
            rest /= dim;
        }
        self.index += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cartesian_iterator() {
        let coords: Vec<_> = CartesianIterator::new(vec![2, 3]).collect();
        assert_eq!(
            coords,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
        assert_eq!(CartesianIterator::new(vec![]).count(), 1);
        assert_eq!(CartesianIterator::new(vec![3, 0]).count(), 0);
    }

    #[test]
    fn test_row_major() {
        let s = Slice::new_row_major([4, 4, 4]);
        assert_eq!(s.strides(), &[16, 4, 1]);
        assert!(s.iter().eq(0..64));
        assert!(s.is_contiguous());
        assert_eq!(s.location(&[1, 2, 3]).unwrap(), 27);
        assert_eq!(s.coordinates(27).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_location_bounds() {
        let s = Slice::new_row_major([2, 3]);
        assert!(matches!(
            s.location(&[0, 3]),
            Err(SliceError::IndexOutOfRange { index: 3, total: 3 })
        ));
        assert!(matches!(
            s.location(&[0]),
            Err(SliceError::InvalidDims {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_at() {
        let s = Slice::new_row_major([3, 3]);
        let row = s.at(0, 2).unwrap();
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![6, 7, 8]);
        let col = s.at(1, 1).unwrap();
        assert_eq!(col.iter().collect::<Vec<_>>(), vec![1, 4, 7]);
        assert!(col.at(0, 3).is_err());
        assert!(s.at(2, 0).is_err());
    }

    #[test]
    fn test_select() {
        let s = Slice::new_row_major([4, 4]);
        let sub = s.select(1, 1, 4, 2).unwrap();
        assert_eq!(sub.sizes(), &[4, 2]);
        assert_eq!(sub.location(&[1, 1]).unwrap(), 7);
        assert!(!sub.is_contiguous());
        assert!(matches!(
            s.select(0, 2, 2, 1),
            Err(SliceError::EmptyRange { .. })
        ));
        assert!(s.select(0, 0, 5, 1).is_err());
    }

    #[test]
    fn test_insert_unit_dim() {
        let s = Slice::new_row_major([3, 3]);
        let e = s.insert_unit_dim(0).unwrap();
        assert_eq!(e.sizes(), &[1, 3, 3]);
        assert!(e.iter().eq(s.iter()));
        assert_eq!(e.location(&[0, 2, 0]).unwrap(), s.location(&[2, 0]).unwrap());

        let e = s.insert_unit_dim(2).unwrap();
        assert_eq!(e.sizes(), &[3, 3, 1]);
        assert_eq!(e.location(&[1, 2, 0]).unwrap(), 5);
        assert!(s.insert_unit_dim(3).is_err());
    }

    #[test]
    fn test_view() {
        let s = Slice::new_row_major([2, 3, 4]);
        let v = s.view(&[6, 4]).unwrap();
        assert_eq!(v.strides(), &[4, 1]);
        assert!(s.view(&[5, 5]).is_err());
        let col = s.select(2, 0, 4, 2).unwrap();
        assert!(col.view(&[12]).is_err());
    }
}
