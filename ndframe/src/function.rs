/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Lazy elementwise functions of variable-like operands.
//!
//! A [`Function`] holds a scalar function and its operands and
//! computes nothing until an element is read. Its coordinate and
//! dimension mapping are the broadcast of its operands'; they are
//! computed on first use and cached. The coordinate cache remembers
//! the join it was computed with and is rebuilt when asked for another.
//!
//! The arithmetic operators build functions:
//!
//! ```ignore
//! let sum = &a + &b;          // Function over a and b
//! let scaled = (&a + &b) * 2.0;
//! let total = Variable::from_expr(&scaled)?;
//! ```
//!
//! A missing operand makes the arithmetic result missing.

use std::cell::RefCell;
use std::fmt;
use std::ops;

use crate::coordinate::Coordinate;
use crate::coordinate::Join;
use crate::coordinate::TrivialBroadcast;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::expression::Expression;
use crate::expression::Scalar;
use crate::selector::Selector;
use crate::variable::Variable;

/// A boxed operand of a [`Function`].
pub type Operand<'a, T> = Box<dyn Expression<Elem = T> + 'a>;

type ScalarFn<'a, T, R> = Box<dyn Fn(&[Option<T>]) -> Option<R> + 'a>;

/// A lazy elementwise function over operands with element type `T`,
/// producing elements of type `R`.
pub struct Function<'a, T, R> {
    f: ScalarFn<'a, T, R>,
    operands: Vec<Operand<'a, T>>,
    coordinate: RefCell<Option<(Join, Coordinate, TrivialBroadcast)>>,
    dimension: RefCell<Option<(Dimension, bool)>>,
}

impl<'a, T: Clone + 'a, R> Function<'a, T, R> {
    /// A function applying `f` to the elements of `operands` read at
    /// the same labels.
    pub fn new<F>(f: F, operands: Vec<Operand<'a, T>>) -> Self
    where
        F: Fn(&[Option<T>]) -> Option<R> + 'a,
    {
        Self {
            f: Box::new(f),
            operands,
            coordinate: RefCell::new(None),
            dimension: RefCell::new(None),
        }
    }

    /// A function of one operand.
    pub fn unary<A, F>(operand: A, f: F) -> Self
    where
        A: IntoOperand<'a, T>,
        F: Fn(T) -> R + 'a,
    {
        Self::new(
            move |xs: &[Option<T>]| match xs {
                [Some(x)] => Some(f(x.clone())),
                _ => None,
            },
            vec![operand.into_operand()],
        )
    }

    /// A function of two operands.
    pub fn binary<A, B, F>(lhs: A, rhs: B, f: F) -> Self
    where
        A: IntoOperand<'a, T>,
        B: IntoOperand<'a, T>,
        F: Fn(T, T) -> R + 'a,
    {
        Self::new(
            move |xs: &[Option<T>]| match xs {
                [Some(a), Some(b)] => Some(f(a.clone(), b.clone())),
                _ => None,
            },
            vec![lhs.into_operand(), rhs.into_operand()],
        )
    }

    /// The number of operands.
    pub fn arity(&self) -> usize {
        self.operands.len()
    }

    /// The broadcast coordinate of the operands under `join`.
    pub fn coordinate(&self, join: Join) -> Coordinate {
        self.with_coordinate(join, |coordinate, _| coordinate.clone())
    }

    /// The broadcast dimension mapping of the operands.
    pub fn dimension(&self) -> Dimension {
        self.with_dimension(|dimension, _| dimension.clone())
    }

    fn with_coordinate<U>(&self, join: Join, f: impl FnOnce(&Coordinate, TrivialBroadcast) -> U) -> U {
        let stale = !matches!(&*self.coordinate.borrow(), Some((cached, _, _)) if *cached == join);
        if stale {
            let mut coordinate = Coordinate::default();
            let mut trivial = TrivialBroadcast::trivial();
            for operand in self.operands.iter().rev() {
                trivial = trivial.and(operand.broadcast_coordinates(join, &mut coordinate));
            }
            tracing::trace!(?join, arity = self.arity(), "function coordinate computed");
            *self.coordinate.borrow_mut() = Some((join, coordinate, trivial));
        }
        match &*self.coordinate.borrow() {
            Some((_, coordinate, trivial)) => f(coordinate, *trivial),
            None => f(&Coordinate::default(), TrivialBroadcast::trivial()),
        }
    }

    fn with_dimension<U>(&self, f: impl FnOnce(&Dimension, bool) -> U) -> U {
        if self.dimension.borrow().is_none() {
            let mut dimension = Dimension::default();
            let mut trivial = true;
            for operand in self.operands.iter().rev() {
                trivial &= operand.broadcast_dimensions(&mut dimension);
            }
            *self.dimension.borrow_mut() = Some((dimension, trivial));
        }
        match &*self.dimension.borrow() {
            Some((dimension, trivial)) => f(dimension, *trivial),
            None => f(&Dimension::default(), true),
        }
    }
}

impl<'a, T: Clone + 'a, R: Clone> Expression for Function<'a, T, R> {
    type Elem = R;

    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast {
        self.with_coordinate(join, |own, trivial| {
            trivial.and(coordinate.broadcast(join, &[own.as_like()]))
        })
    }

    fn broadcast_dimensions(&self, dimension: &mut Dimension) -> bool {
        self.with_dimension(|own, trivial| {
            // Functions of scalars only have no dimensions.
            if own.is_empty() {
                return trivial;
            }
            dimension.broadcast(&[own]) && trivial
        })
    }

    fn select(&self, join: Join, selector: &Selector) -> Result<Option<R>, FrameError> {
        let args = self
            .operands
            .iter()
            .map(|operand| operand.select(join, selector))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((self.f)(&args))
    }

    fn element(&self, index: &[usize]) -> Result<Option<R>, FrameError> {
        let args = self
            .operands
            .iter()
            .map(|operand| operand.element(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((self.f)(&args))
    }
}

impl<T, R> fmt::Debug for Function<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("arity", &self.operands.len())
            .finish()
    }
}

/// Conversion into a [`Function`] operand.
pub trait IntoOperand<'a, T> {
    fn into_operand(self) -> Operand<'a, T>;
}

impl<'a, T: Clone + 'a> IntoOperand<'a, T> for &'a Variable<T> {
    fn into_operand(self) -> Operand<'a, T> {
        Box::new(self)
    }
}

impl<'a, U: Clone + 'a, T: Clone + 'a> IntoOperand<'a, T> for Function<'a, U, T> {
    fn into_operand(self) -> Operand<'a, T> {
        Box::new(self)
    }
}

impl<'a, T: Clone + 'a> IntoOperand<'a, T> for Scalar<T> {
    fn into_operand(self) -> Operand<'a, T> {
        Box::new(self)
    }
}

impl<'a, T: 'a> IntoOperand<'a, T> for Operand<'a, T> {
    fn into_operand(self) -> Operand<'a, T> {
        self
    }
}

macro_rules! scalar_operand {
    ($($t:ty),*) => {
        $(
            impl<'a> IntoOperand<'a, $t> for $t {
                fn into_operand(self) -> Operand<'a, $t> {
                    Box::new(Scalar(self))
                }
            }
        )*
    };
}

scalar_operand!(f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, usize, bool);

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<'a, T, Rhs> ops::$trait<Rhs> for &'a Variable<T>
        where
            T: Clone + ops::$trait<Output = T> + 'a,
            Rhs: IntoOperand<'a, T>,
        {
            type Output = Function<'a, T, T>;

            fn $method(self, rhs: Rhs) -> Self::Output {
                Function::binary(self, rhs, |a, b| a $op b)
            }
        }

        impl<'a, U, T, Rhs> ops::$trait<Rhs> for Function<'a, U, T>
        where
            U: Clone + 'a,
            T: Clone + ops::$trait<Output = T> + 'a,
            Rhs: IntoOperand<'a, T>,
        {
            type Output = Function<'a, T, T>;

            fn $method(self, rhs: Rhs) -> Self::Output {
                Function::binary(self, rhs, |a, b| a $op b)
            }
        }
    };
}

binary_operator!(Add, add, +);
binary_operator!(Sub, sub, -);
binary_operator!(Mul, mul, *);
binary_operator!(Div, div, /);

impl<'a, T> ops::Neg for &'a Variable<T>
where
    T: Clone + ops::Neg<Output = T> + 'a,
{
    type Output = Function<'a, T, T>;

    fn neg(self) -> Self::Output {
        Function::unary(self, |x| -x)
    }
}

impl<'a, U, T> ops::Neg for Function<'a, U, T>
where
    U: Clone + 'a,
    T: Clone + ops::Neg<Output = T> + 'a,
{
    type Output = Function<'a, T, T>;

    fn neg(self) -> Self::Output {
        Function::unary(self, |x| -x)
    }
}

macro_rules! comparison {
    ($(#[$doc:meta])* $name:ident, $bound:ident, $op:tt) => {
        $(#[$doc])*
        pub fn $name<'a, T, A, B>(lhs: A, rhs: B) -> Function<'a, T, bool>
        where
            T: Clone + $bound + 'a,
            A: IntoOperand<'a, T>,
            B: IntoOperand<'a, T>,
        {
            Function::binary(lhs, rhs, |a, b| a $op b)
        }
    };
}

comparison!(
    /// Elementwise `lhs == rhs`.
    equal, PartialEq, ==
);
comparison!(
    /// Elementwise `lhs != rhs`.
    not_equal, PartialEq, !=
);
comparison!(
    /// Elementwise `lhs < rhs`.
    less, PartialOrd, <
);
comparison!(
    /// Elementwise `lhs <= rhs`.
    less_equal, PartialOrd, <=
);
comparison!(
    /// Elementwise `lhs > rhs`.
    greater, PartialOrd, >
);
comparison!(
    /// Elementwise `lhs >= rhs`.
    greater_equal, PartialOrd, >=
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::global;
    use crate::selector;
    use crate::strategy::sample_variable;
    use crate::variable::assign::AssignPath;

    fn shifted() -> Variable<f64> {
        // Same data as the sample, abscissa labels (a, b, d).
        let v = sample_variable();
        let mut coordinate = v.coordinate().clone();
        coordinate.insert("abscissa", crate::Axis::new(["a", "b", "d"]).unwrap());
        Variable::new(v.data().clone(), coordinate, v.dimension().clone()).unwrap()
    }

    #[test]
    fn test_lazy_add() {
        let v = sample_variable();
        let f = &v + &v;
        assert_eq!(f.arity(), 2);
        assert_eq!(f.element(&[0, 1]).unwrap(), Some(4.0));
        assert_eq!(f.element(&[1, 0]).unwrap(), None);
        assert_eq!(
            f.select(Join::Inner, &selector!(abscissa = "d", ordinate = 4))
                .unwrap(),
            Some(18.0)
        );
    }

    #[test]
    fn test_operators_compose() {
        let v = sample_variable();
        let f = -((&v - 1.0) * 2.0 / 4.0);
        assert_eq!(f.element(&[2, 2]).unwrap(), Some(-4.0));
        let g = &v * Scalar(3.0);
        assert_eq!(g.element(&[0, 0]).unwrap(), Some(3.0));
        let h = -&v;
        assert_eq!(h.element(&[0, 1]).unwrap(), Some(-2.0));
    }

    #[test]
    fn test_comparisons() {
        let v = sample_variable();
        let lt = less(&v, 5.0);
        assert_eq!(lt.element(&[0, 0]).unwrap(), Some(true));
        assert_eq!(lt.element(&[1, 1]).unwrap(), Some(false));
        assert_eq!(lt.element(&[1, 0]).unwrap(), None);
        assert_eq!(greater_equal(&v, 5.0).element(&[1, 1]).unwrap(), Some(true));
        assert_eq!(equal(&v, &v).element(&[2, 0]).unwrap(), Some(true));
        assert_eq!(not_equal(&v, 7.0).element(&[2, 0]).unwrap(), Some(false));
        assert_eq!(less_equal(&v, 1.0).element(&[0, 0]).unwrap(), Some(true));
        assert_eq!(greater(&v, 1.0).element(&[0, 0]).unwrap(), Some(false));
    }

    #[test]
    fn test_generic_function() {
        let v = sample_variable();
        let w = shifted();
        let coalesce = Function::new(
            |xs: &[Option<f64>]| xs.iter().flatten().copied().reduce(f64::max),
            vec![(&v).into_operand(), (&w).into_operand()],
        );
        let c = coalesce.coordinate(Join::Outer);
        assert_eq!(c.get("abscissa").unwrap().len(), 4);
        let r = Variable::from_expr_with(Join::Outer, &coalesce).unwrap();
        // Row b only exists in w, row c only in v.
        assert_eq!(r.select(&selector!(abscissa = "b", ordinate = 2)).unwrap(), Some(5.0));
        assert_eq!(r.select(&selector!(abscissa = "c", ordinate = 2)).unwrap(), Some(5.0));
    }

    #[test]
    fn test_coordinate_cache_follows_join() {
        let v = sample_variable();
        let w = shifted();
        let f = &v + &w;
        assert_eq!(f.coordinate(Join::Inner).get("abscissa").unwrap().len(), 2);
        assert_eq!(f.coordinate(Join::Outer).get("abscissa").unwrap().len(), 4);
        assert_eq!(f.coordinate(Join::Inner).get("abscissa").unwrap().len(), 2);
        assert_eq!(f.dimension(), *v.dimension());
    }

    #[test]
    fn test_trivial_broadcast_through_function() {
        let v = sample_variable();
        let w = shifted();
        let mut c = Coordinate::default();
        assert!((&v + &v).broadcast_coordinates(Join::Inner, &mut c).is_trivial());
        let mut c = Coordinate::default();
        assert!(!(&v + &w).broadcast_coordinates(Join::Inner, &mut c).is_trivial());
        let mut d = Dimension::default();
        assert!((&v + 1.0).broadcast_dimensions(&mut d));
        assert_eq!(d, *v.dimension());
    }

    #[test]
    fn test_fast_and_slow_paths_agree() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let v = sample_variable();
        let w = shifted();

        let mut fast = Variable::missing(Coordinate::default(), Dimension::default()).unwrap();
        assert_eq!(fast.assign(&(&v + &v)).unwrap(), AssignPath::Fast);

        let mut slow = Variable::missing(Coordinate::default(), Dimension::default()).unwrap();
        assert_eq!(slow.assign(&(&v + &w)).unwrap(), AssignPath::Slow);

        // The inner join keeps rows a and d.
        assert_eq!(slow.shape(), &[2, 3]);
        for a in ["a", "d"] {
            for o in [1, 2, 4] {
                let s = selector!(abscissa = a, ordinate = o);
                let expected = match (v.select(&s).unwrap(), w.select(&s).unwrap()) {
                    (Some(x), Some(y)) => Some(x + y),
                    _ => None,
                };
                assert_eq!(slow.select(&s).unwrap(), expected);
            }
        }
        assert_eq!(fast.select(&selector!(abscissa = "d", ordinate = 2)).unwrap(), Some(16.0));
        assert_eq!(slow.select(&selector!(abscissa = "d", ordinate = 2)).unwrap(), Some(16.0));
    }
}
