/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The operation set shared by every variable-like type.
//!
//! Variables, their views and lazy functions of them all take part in
//! broadcasting and answer selections. Assignment only relies on this
//! trait, so any of them can be materialised into a
//! [`Variable`](crate::Variable).

use crate::coordinate::Coordinate;
use crate::coordinate::CoordinateLike;
use crate::coordinate::Join;
use crate::coordinate::TrivialBroadcast;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::selector::Selector;

/// A labeled n-dimensional expression.
pub trait Expression {
    /// The element type. Reads return `Option<Elem>`, `None` being
    /// missing.
    type Elem: Clone;

    /// Broadcasts this expression's coordinate into `coordinate` with
    /// the join policy `join`.
    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast;

    /// Broadcasts this expression's dimension mapping into
    /// `dimension`. Returns `true` iff nothing changed.
    fn broadcast_dimensions(&self, dimension: &mut Dimension) -> bool;

    /// The element at the labels of `selector`. With [`Join::Inner`] an
    /// unknown label fails; with [`Join::Outer`] it reads as missing.
    /// Names that are not dimensions of this expression are ignored.
    fn select(&self, join: Join, selector: &Selector) -> Result<Option<Self::Elem>, FrameError>;

    /// The element at positional `index`, in this expression's
    /// dimension order.
    fn element(&self, index: &[usize]) -> Result<Option<Self::Elem>, FrameError>;
}

impl<E: Expression + ?Sized> Expression for &E {
    type Elem = E::Elem;

    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast {
        (**self).broadcast_coordinates(join, coordinate)
    }

    fn broadcast_dimensions(&self, dimension: &mut Dimension) -> bool {
        (**self).broadcast_dimensions(dimension)
    }

    fn select(&self, join: Join, selector: &Selector) -> Result<Option<Self::Elem>, FrameError> {
        (**self).select(join, selector)
    }

    fn element(&self, index: &[usize]) -> Result<Option<Self::Elem>, FrameError> {
        (**self).element(index)
    }
}

impl<E: Expression + ?Sized> Expression for Box<E> {
    type Elem = E::Elem;

    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast {
        (**self).broadcast_coordinates(join, coordinate)
    }

    fn broadcast_dimensions(&self, dimension: &mut Dimension) -> bool {
        (**self).broadcast_dimensions(dimension)
    }

    fn select(&self, join: Join, selector: &Selector) -> Result<Option<Self::Elem>, FrameError> {
        (**self).select(join, selector)
    }

    fn element(&self, index: &[usize]) -> Result<Option<Self::Elem>, FrameError> {
        (**self).element(index)
    }
}

/// A scalar operand: no dimensions, the same value everywhere.
///
/// Its coordinate is the identity of broadcasting, so it never makes a
/// broadcast non-trivial and never reads as missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar<T>(pub T);

impl<T: Clone> Expression for Scalar<T> {
    type Elem = T;

    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast {
        coordinate.broadcast(join, &[CoordinateLike::Identity])
    }

    fn broadcast_dimensions(&self, _dimension: &mut Dimension) -> bool {
        true
    }

    fn select(&self, _join: Join, _selector: &Selector) -> Result<Option<T>, FrameError> {
        Ok(Some(self.0.clone()))
    }

    fn element(&self, _index: &[usize]) -> Result<Option<T>, FrameError> {
        Ok(Some(self.0.clone()))
    }
}

/// The coordinate and dimension mapping `expr` broadcasts to when
/// assigned into an empty destination.
pub fn broadcast_expression<E: Expression + ?Sized>(
    join: Join,
    expr: &E,
) -> (Coordinate, Dimension, TrivialBroadcast, bool) {
    let mut coordinate = Coordinate::default();
    let mut dimension = Dimension::default();
    let trivial = expr.broadcast_coordinates(join, &mut coordinate);
    let same_dimensions = expr.broadcast_dimensions(&mut dimension);
    (coordinate, dimension, trivial, same_dimensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let s = Scalar(2.5);
        let mut c = crate::coordinate!(x = [1, 2]).unwrap();
        let before = c.clone();
        assert!(s.broadcast_coordinates(Join::Outer, &mut c).is_trivial());
        assert_eq!(c, before);
        let mut d = Dimension::default();
        assert!(s.broadcast_dimensions(&mut d));
        assert!(d.is_empty());
        assert_eq!(s.element(&[7, 7]).unwrap(), Some(2.5));
        assert_eq!(
            s.select(Join::Inner, &crate::selector!(x = 9)).unwrap(),
            Some(2.5)
        );
    }

    #[test]
    fn test_broadcast_expression() {
        let (c, d, trivial, same) = broadcast_expression(Join::Inner, &Scalar(1));
        assert!(c.is_empty());
        assert!(d.is_empty());
        assert!(trivial.is_trivial());
        assert!(same);
    }
}
