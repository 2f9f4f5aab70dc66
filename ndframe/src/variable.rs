/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Labeled n-dimensional arrays.
//!
//! A [`Variable`] couples dense storage with a [`Coordinate`] (the
//! labels along each named dimension) and a [`Dimension`] mapping (the
//! position of each named dimension in the storage shape). The shape
//! is always the one the coordinate implies:
//!
//! ```text
//! shape[dimension[name]] == coordinate[name].len()
//! ```
//!
//! Elements are `Option<T>`; `None` is the missing value.

/// Assignment from expressions.
pub mod assign;

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::coordinate::Coordinate;
use crate::coordinate::CoordinateLookup;
use crate::coordinate::Join;
use crate::coordinate::TrivialBroadcast;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::expression::Expression;
use crate::label::Label;
use crate::selector::ISelector;
use crate::selector::Locator;
use crate::selector::Selector;
use crate::tensor::Tensor;

/// A labeled n-dimensional array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable<T> {
    data: Tensor<Option<T>>,
    coordinate: Coordinate,
    dimension: Dimension,
}

/// Checks that `coordinate` and `dimension` describe the same
/// dimensions and returns the shape they imply.
fn compute_shape(coordinate: &Coordinate, dimension: &Dimension) -> Result<Vec<usize>, FrameError> {
    if coordinate.len() != dimension.len() {
        return Err(FrameError::IndexArity {
            expected: coordinate.len(),
            got: dimension.len(),
        });
    }
    coordinate.shape(dimension)
}

impl<T> Variable<T> {
    /// Creates a variable from storage already shaped by `coordinate`
    /// and `dimension`.
    pub fn new(
        data: Tensor<Option<T>>,
        coordinate: Coordinate,
        dimension: Dimension,
    ) -> Result<Self, FrameError> {
        let shape = compute_shape(&coordinate, &dimension)?;
        if data.shape() != shape.as_slice() {
            return Err(FrameError::IncompatibleShape {
                expected: shape,
                got: data.shape().to_vec(),
            });
        }
        Ok(Self {
            data,
            coordinate,
            dimension,
        })
    }

    /// Creates a variable from a row-major buffer.
    pub fn from_vec(
        data: Vec<Option<T>>,
        coordinate: Coordinate,
        dimension: Dimension,
    ) -> Result<Self, FrameError> {
        let shape = compute_shape(&coordinate, &dimension)?;
        Ok(Self {
            data: Tensor::from_shape_vec(shape, data)?,
            coordinate,
            dimension,
        })
    }

    /// A variable whose every element is missing.
    pub fn missing(coordinate: Coordinate, dimension: Dimension) -> Result<Self, FrameError> {
        let shape = compute_shape(&coordinate, &dimension)?;
        Ok(Self {
            data: Tensor::from_fn(shape, |_| None),
            coordinate,
            dimension,
        })
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    pub fn data(&self) -> &Tensor<Option<T>> {
        &self.data
    }

    /// Elements in storage order, for in-place updates.
    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, Option<T>> {
        self.data.iter_mut()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dimension.len()
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A reference to the element at positional `index`.
    pub fn get(&self, index: &[usize]) -> Result<&Option<T>, FrameError> {
        self.data.element(index)
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Result<&mut Option<T>, FrameError> {
        self.data.element_mut(index)
    }

    pub fn select_mut(&mut self, selector: &Selector) -> Result<&mut Option<T>, FrameError> {
        let index = selector.get_index(&self.coordinate, &self.dimension)?;
        self.data.element_mut(&index)
    }

    pub fn iselect_mut(&mut self, selector: &ISelector) -> Result<&mut Option<T>, FrameError> {
        let index = selector.get_index(&self.dimension);
        self.data.element_mut(&index)
    }

    /// Replaces coordinate and dimension mapping. Every element of the
    /// new storage is missing.
    pub fn resize(&mut self, coordinate: Coordinate, dimension: Dimension) -> Result<(), FrameError> {
        *self = Self::missing(coordinate, dimension)?;
        Ok(())
    }

    /// Replaces coordinate and dimension mapping, keeping the storage.
    /// The new shape must hold as many elements as the old one.
    pub fn reshape(&mut self, coordinate: Coordinate, dimension: Dimension) -> Result<(), FrameError> {
        let shape = compute_shape(&coordinate, &dimension)?;
        self.data.reshape(&shape)?;
        self.coordinate = coordinate;
        self.dimension = dimension;
        Ok(())
    }
}

impl<T: Clone> Variable<T> {
    /// A variable whose every element is `value`.
    pub fn filled(coordinate: Coordinate, dimension: Dimension, value: T) -> Result<Self, FrameError> {
        let shape = compute_shape(&coordinate, &dimension)?;
        Ok(Self {
            data: Tensor::filled(shape, Some(value)),
            coordinate,
            dimension,
        })
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(Some(value));
    }

    /// The element at positional `index`.
    pub fn element(&self, index: &[usize]) -> Result<Option<T>, FrameError> {
        self.get(index).cloned()
    }

    /// The element at one label per dimension, in dimension order.
    pub fn locate<L: Into<Label>>(
        &self,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Option<T>, FrameError> {
        self.locate_element(&Locator::new(labels))
    }

    pub fn locate_element(&self, locator: &Locator) -> Result<Option<T>, FrameError> {
        let index = locator.get_index(&self.coordinate, &self.dimension)?;
        self.element(&index)
    }

    /// The element at the labels of `selector`. Strict: an unknown
    /// label fails.
    pub fn select(&self, selector: &Selector) -> Result<Option<T>, FrameError> {
        self.select_with(Join::Inner, selector)
    }

    /// The element at the labels of `selector`. With [`Join::Outer`] an
    /// unknown label reads as missing.
    pub fn select_with(&self, join: Join, selector: &Selector) -> Result<Option<T>, FrameError> {
        match join {
            Join::Inner => {
                let index = selector.get_index(&self.coordinate, &self.dimension)?;
                self.element(&index)
            }
            Join::Outer => match selector.get_outer_index(&self.coordinate, &self.dimension) {
                (index, true) => self.element(&index),
                (_, false) => Ok(None),
            },
        }
    }

    pub fn iselect(&self, selector: &ISelector) -> Result<Option<T>, FrameError> {
        self.element(&selector.get_index(&self.dimension))
    }
}

impl<T: Clone> Expression for Variable<T> {
    type Elem = T;

    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast {
        coordinate.broadcast(join, &[self.coordinate.as_like()])
    }

    fn broadcast_dimensions(&self, dimension: &mut Dimension) -> bool {
        dimension.broadcast(&[&self.dimension])
    }

    fn select(&self, join: Join, selector: &Selector) -> Result<Option<T>, FrameError> {
        self.select_with(join, selector)
    }

    fn element(&self, index: &[usize]) -> Result<Option<T>, FrameError> {
        Variable::element(self, index)
    }
}

impl<T: fmt::Display> fmt::Display for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = crate::config::global::get().missing_repr;
        let cells: Vec<String> = self
            .data
            .iter()
            .map(|value| match value {
                Some(v) => v.to_string(),
                None => missing.clone(),
            })
            .collect();
        crate::pretty::fmt_variable(f, self.shape(), &cells, &self.coordinate)
    }
}
