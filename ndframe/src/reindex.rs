/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Lazy relabeling.
//!
//! A [`ReindexView`] shows a variable under new axes for some of its
//! dimensions. Reading at a position of a reindexed dimension takes the
//! label the new axis has there and looks it up in the base's own axis.
//! Labels the base does not have read as missing.
//!
//! [`align`] broadcasts the coordinates of several variables and
//! returns each of them reindexed onto the common coordinate, so that
//! they can be combined position by position.

use std::fmt;

use crate::axis::Axis;
use crate::coordinate::Coordinate;
use crate::coordinate::CoordinateLookup;
use crate::coordinate::Join;
use crate::coordinate::TrivialBroadcast;
use crate::coordinate::chain::CoordinateChain;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::expression::Expression;
use crate::function::IntoOperand;
use crate::function::Operand;
use crate::label::Label;
use crate::selector::ISelector;
use crate::selector::Locator;
use crate::selector::Selector;
use crate::slice::CartesianIterator;
use crate::variable::Variable;

/// A read-only view of a variable with some axes replaced.
#[derive(Debug, Clone)]
pub struct ReindexView<'a, T> {
    base: &'a Variable<T>,
    coordinate: CoordinateChain,
    shape: Vec<usize>,
}

impl<'a, T> ReindexView<'a, T> {
    fn new(base: &'a Variable<T>, coordinate: CoordinateChain) -> Result<Self, FrameError> {
        let shape = coordinate.shape(base.dimension())?;
        Ok(Self {
            base,
            coordinate,
            shape,
        })
    }

    pub fn base(&self) -> &'a Variable<T> {
        self.base
    }

    pub fn coordinate(&self) -> &CoordinateChain {
        &self.coordinate
    }

    /// The dimension mapping, which is the base's.
    pub fn dimension(&self) -> &Dimension {
        self.base.dimension()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps a view index onto a base index. `None` when a reindexed
    /// position carries a label the base does not have.
    fn base_index(&self, index: &[usize]) -> Result<Option<Vec<usize>>, FrameError> {
        let dimension = self.base.dimension();
        if index.len() != dimension.len() {
            return Err(FrameError::IndexArity {
                expected: dimension.len(),
                got: index.len(),
            });
        }
        let mut base_index = Vec::with_capacity(index.len());
        for (name, &position) in dimension.names().zip(index) {
            if !self.coordinate.is_reindexed(name) {
                base_index.push(position);
                continue;
            }
            let label = self.coordinate.label_at(name, position)?;
            match self.base.coordinate().get(name)?.position(label) {
                Some(base_position) => base_index.push(base_position),
                None => return Ok(None),
            }
        }
        Ok(Some(base_index))
    }
}

impl<T: Clone> ReindexView<'_, T> {
    pub fn element(&self, index: &[usize]) -> Result<Option<T>, FrameError> {
        match self.base_index(index)? {
            Some(index) => self.base.element(&index),
            None => Ok(None),
        }
    }

    pub fn locate<L: Into<Label>>(
        &self,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Option<T>, FrameError> {
        self.locate_element(&Locator::new(labels))
    }

    pub fn locate_element(&self, locator: &Locator) -> Result<Option<T>, FrameError> {
        let index = locator.get_index(&self.coordinate, self.dimension())?;
        self.element(&index)
    }

    /// The element at the labels of `selector`. Labels must belong to
    /// the view's axes; those the base lacks read as missing.
    pub fn select(&self, selector: &Selector) -> Result<Option<T>, FrameError> {
        self.select_with(Join::Inner, selector)
    }

    pub fn select_with(&self, join: Join, selector: &Selector) -> Result<Option<T>, FrameError> {
        match join {
            Join::Inner => {
                let index = selector.get_index(&self.coordinate, self.dimension())?;
                self.element(&index)
            }
            Join::Outer => match selector.get_outer_index(&self.coordinate, self.dimension()) {
                (index, true) => self.element(&index),
                (_, false) => Ok(None),
            },
        }
    }

    pub fn iselect(&self, selector: &ISelector) -> Result<Option<T>, FrameError> {
        self.element(&selector.get_index(self.dimension()))
    }
}

impl<T: Clone> Expression for ReindexView<'_, T> {
    type Elem = T;

    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast {
        coordinate.broadcast(join, &[self.coordinate.as_like()])
    }

    fn broadcast_dimensions(&self, dimension: &mut Dimension) -> bool {
        dimension.broadcast(&[self.base.dimension()])
    }

    fn select(&self, join: Join, selector: &Selector) -> Result<Option<T>, FrameError> {
        self.select_with(join, selector)
    }

    fn element(&self, index: &[usize]) -> Result<Option<T>, FrameError> {
        ReindexView::element(self, index)
    }
}

impl<'a, 'b: 'a, T: Clone + 'a> IntoOperand<'a, T> for &'a ReindexView<'b, T> {
    fn into_operand(self) -> Operand<'a, T> {
        Box::new(self)
    }
}

impl<T: fmt::Display + Clone> fmt::Display for ReindexView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = crate::config::global::get().missing_repr;
        let mut cells = Vec::with_capacity(self.len());
        for index in CartesianIterator::new(self.shape.clone()) {
            cells.push(match self.element(&index).map_err(|_| fmt::Error)? {
                Some(v) => v.to_string(),
                None => missing.clone(),
            });
        }
        crate::pretty::fmt_variable(f, &self.shape, &cells, &self.coordinate)
    }
}

/// `base` with the axes of `overrides` in place of its own. Every
/// overridden name must be a dimension of `base`.
pub fn reindex<T, S>(
    base: &Variable<T>,
    overrides: impl IntoIterator<Item = (S, Axis)>,
) -> Result<ReindexView<'_, T>, FrameError>
where
    S: Into<String>,
{
    let coordinate = CoordinateChain::new(base.coordinate().clone(), overrides)?;
    tracing::debug!(
        reindexed = ?base
            .dimension()
            .names()
            .filter(|name| coordinate.is_reindexed(name))
            .collect::<Vec<_>>(),
        "reindex"
    );
    ReindexView::new(base, coordinate)
}

/// `base` reindexed onto the axes `other` has for the dimensions they
/// share.
pub fn reindex_like<'a, T, E>(base: &'a Variable<T>, other: &E) -> Result<ReindexView<'a, T>, FrameError>
where
    E: Expression + ?Sized,
{
    let mut coordinate = Coordinate::default();
    other.broadcast_coordinates(Join::Inner, &mut coordinate);
    reindex(base, shared_axes(base, &coordinate))
}

/// The axes of `coordinate` for the dimensions `variable` has.
fn shared_axes<T>(variable: &Variable<T>, coordinate: &Coordinate) -> Vec<(String, Axis)> {
    coordinate
        .iter()
        .filter(|(name, _)| variable.coordinate().contains(name))
        .map(|(name, axis)| (name.to_string(), axis.clone()))
        .collect()
}

/// Broadcasts the coordinates of `variables` with `join` and returns
/// every variable reindexed onto the result, in order.
pub fn align<'a, T>(
    join: Join,
    variables: &[&'a Variable<T>],
) -> Result<Vec<ReindexView<'a, T>>, FrameError> {
    let operands: Vec<_> = variables.iter().map(|v| v.coordinate().as_like()).collect();
    let mut coordinate = Coordinate::default();
    let trivial = coordinate.broadcast(join, &operands);
    tracing::debug!(
        ?join,
        operands = variables.len(),
        same_labels = trivial.same_labels,
        "align"
    );
    variables
        .iter()
        .map(|&variable| reindex(variable, shared_axes(variable, &coordinate)))
        .collect()
}
