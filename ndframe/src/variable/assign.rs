/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Assignment of expressions into variables.
//!
//! The right-hand side is first broadcast into a fresh coordinate and
//! dimension mapping. Then one of two paths fills the destination:
//!
//! - the *fast path* copies element by element in positional order.
//!   It requires a trivial broadcast: every operand already has the
//!   result's dimensions, in order, and the result's labels, so that a
//!   position means the same labels in every operand;
//! - the *slow path* walks every index of the result, turns it into a
//!   label selector and asks the expression for the element at those
//!   labels.
//!
//! Both paths produce the same variable. The fast path can be disabled
//! with [`Config::assign_fast_path`](crate::config::Config).

use crate::coordinate::Coordinate;
use crate::coordinate::CoordinateLike;
use crate::coordinate::Join;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::expression::Expression;
use crate::expression::broadcast_expression;
use crate::selector::Selector;
use crate::slice::CartesianIterator;
use crate::tensor::Tensor;
use crate::variable::Variable;
use crate::variable::compute_shape;

/// Which way an assignment filled its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignPath {
    Fast,
    Slow,
}

impl<T: Clone> Variable<T> {
    /// Materialises `expr` with the default (inner) join.
    pub fn from_expr<E>(expr: &E) -> Result<Self, FrameError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        Self::from_expr_with(Join::Inner, expr)
    }

    /// Materialises `expr`, broadcasting its operands with `join`.
    pub fn from_expr_with<E>(join: Join, expr: &E) -> Result<Self, FrameError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        let mut variable = Self::missing(Coordinate::default(), Dimension::default())?;
        variable.assign_with(join, expr)?;
        Ok(variable)
    }

    /// Replaces this variable with the value of `expr`, broadcast with
    /// the default (inner) join.
    pub fn assign<E>(&mut self, expr: &E) -> Result<AssignPath, FrameError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        self.assign_with(Join::Inner, expr)
    }

    /// Replaces this variable with the value of `expr`. Coordinate,
    /// dimension mapping and shape all become those of the broadcast
    /// of `expr`.
    pub fn assign_with<E>(&mut self, join: Join, expr: &E) -> Result<AssignPath, FrameError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        let (coordinate, dimension, trivial, same_dimensions) = broadcast_expression(join, expr);
        let shape = compute_shape(&coordinate, &dimension)?;
        let fast = crate::config::global::get().assign_fast_path
            && trivial.is_trivial()
            && same_dimensions;

        if fast {
            tracing::debug!(?shape, "assign: fast path");
            let mut data = Vec::with_capacity(shape.iter().product());
            for index in CartesianIterator::new(shape.clone()) {
                data.push(expr.element(&index)?);
            }
            self.data = Tensor::from_shape_vec(shape, data)?;
            self.coordinate = coordinate;
            self.dimension = dimension;
            Ok(AssignPath::Fast)
        } else {
            tracing::debug!(
                ?shape,
                same_dimensions = trivial.same_dimensions,
                same_labels = trivial.same_labels,
                same_dimension_order = same_dimensions,
                "assign: slow path"
            );
            let mut tmp = Self::missing(coordinate, dimension)?;
            tmp.assign_data(join, expr)?;
            *self = tmp;
            Ok(AssignPath::Slow)
        }
    }

    /// Fills every element of this variable by label lookup in `expr`.
    fn assign_data<E>(&mut self, join: Join, expr: &E) -> Result<(), FrameError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        for index in self.data.indices() {
            let selector = Selector::from_index(&self.coordinate, &self.dimension, &index)?;
            *self.data.element_mut(&index)? = expr.select(join, &selector)?;
        }
        Ok(())
    }

    /// Fails with [`FrameError::IncompatibleDimensions`] unless every
    /// dimension of `expr` is a dimension of this variable.
    pub fn assert_compatible_shape<E>(&self, expr: &E) -> Result<(), FrameError>
    where
        E: Expression + ?Sized,
    {
        let mut dimension = Dimension::default();
        expr.broadcast_dimensions(&mut dimension);
        if dimension.names().all(|name| self.dimension.contains(name)) {
            Ok(())
        } else {
            Err(FrameError::IncompatibleDimensions)
        }
    }

    /// Updates this variable in place to `f(self, expr)`, keeping its
    /// dimension mapping.
    ///
    /// `expr` may have fewer dimensions than this variable; it is then
    /// broadcast along the others. Labels of this variable that `expr`
    /// lacks are dropped (inner join).
    pub fn compute_assign<E, F>(&mut self, expr: &E, f: F) -> Result<AssignPath, FrameError>
    where
        E: Expression + ?Sized,
        F: Fn(Option<T>, Option<E::Elem>) -> Option<T>,
    {
        self.assert_compatible_shape(expr)?;

        let mut coordinate = self.coordinate.clone();
        let trivial = expr.broadcast_coordinates(Join::Inner, &mut coordinate);
        let mut dimension = self.dimension.clone();
        let same_dimensions = expr.broadcast_dimensions(&mut dimension);

        if trivial.same_labels && same_dimensions && crate::config::global::get().assign_fast_path {
            tracing::debug!(shape = ?self.shape(), "compute_assign: fast path");
            for index in self.data.indices() {
                let rhs = expr.element(&index)?;
                let slot = self.data.element_mut(&index)?;
                *slot = f(slot.take(), rhs);
            }
            return Ok(AssignPath::Fast);
        }

        tracing::debug!(shape = ?self.shape(), "compute_assign: slow path");
        let mut tmp = Self::missing(coordinate, self.dimension.clone())?;
        for index in tmp.data.indices() {
            let selector = Selector::from_index(&tmp.coordinate, &tmp.dimension, &index)?;
            let lhs = self.select(&selector)?;
            let rhs = expr.select(Join::Inner, &selector)?;
            *tmp.data.element_mut(&index)? = f(lhs, rhs);
        }
        *self = tmp;
        Ok(AssignPath::Slow)
    }

    /// Broadcasts this variable's coordinate together with
    /// `coordinates` and returns the result.
    pub fn broadcast_with(&self, join: Join, coordinates: &[CoordinateLike<'_>]) -> Coordinate {
        let mut result = Coordinate::default();
        let mut operands = vec![self.coordinate.as_like()];
        operands.extend_from_slice(coordinates);
        result.broadcast(join, &operands);
        result
    }
}
