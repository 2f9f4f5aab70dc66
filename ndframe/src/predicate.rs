/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Boolean predicates over axis labels.
//!
//! A predicate is evaluated once per element position of a variable,
//! with a [`Selector`] naming the label of that position along every
//! dimension. Conditions are built from [`axis`] terms:
//!
//! ```
//! use ndframe::predicate::axis;
//!
//! let cond = axis("ordinate").lt(6) & axis("abscissa").not_equal("c");
//! ```
//!
//! Any `Fn(&Selector) -> bool` is a predicate too.

use std::cmp::Ordering;
use std::fmt;
use std::ops;

use crate::error::FrameError;
use crate::label::Label;
use crate::selector::Selector;

/// Something that decides, from the labels of a position, whether the
/// position is selected.
pub trait AxisPredicate {
    fn evaluate(&self, selector: &Selector) -> Result<bool, FrameError>;
}

impl<F> AxisPredicate for F
where
    F: Fn(&Selector) -> bool,
{
    fn evaluate(&self, selector: &Selector) -> Result<bool, FrameError> {
        Ok(self(selector))
    }
}

/// One side of a comparison: the label along a named dimension, or a
/// constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisTerm {
    Axis(String),
    Value(Label),
}

/// The term reading the label along dimension `name`.
pub fn axis(name: impl Into<String>) -> AxisTerm {
    AxisTerm::Axis(name.into())
}

macro_rules! term_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AxisTerm {
                fn from(value: $t) -> Self {
                    AxisTerm::Value(Label::from(value))
                }
            }
        )*
    };
}

term_from!(i8, i16, i32, i64, u8, u16, u32, char, &str, String);

impl From<Label> for AxisTerm {
    fn from(label: Label) -> Self {
        AxisTerm::Value(label)
    }
}

impl AxisTerm {
    fn resolve<'a>(&'a self, selector: &'a Selector) -> Result<&'a Label, FrameError> {
        match self {
            AxisTerm::Axis(name) => selector
                .get(name)
                .ok_or_else(|| FrameError::unknown_dimension(name)),
            AxisTerm::Value(label) => Ok(label),
        }
    }

    fn compare(self, op: Comparison, rhs: impl Into<AxisTerm>) -> AxisCondition {
        AxisCondition::Compare {
            op,
            left: self,
            right: rhs.into(),
        }
    }

    pub fn lt(self, rhs: impl Into<AxisTerm>) -> AxisCondition {
        self.compare(Comparison::Less, rhs)
    }

    pub fn le(self, rhs: impl Into<AxisTerm>) -> AxisCondition {
        self.compare(Comparison::LessEqual, rhs)
    }

    pub fn gt(self, rhs: impl Into<AxisTerm>) -> AxisCondition {
        self.compare(Comparison::Greater, rhs)
    }

    pub fn ge(self, rhs: impl Into<AxisTerm>) -> AxisCondition {
        self.compare(Comparison::GreaterEqual, rhs)
    }

    pub fn equal(self, rhs: impl Into<AxisTerm>) -> AxisCondition {
        self.compare(Comparison::Equal, rhs)
    }

    pub fn not_equal(self, rhs: impl Into<AxisTerm>) -> AxisCondition {
        self.compare(Comparison::NotEqual, rhs)
    }
}

impl fmt::Display for AxisTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisTerm::Axis(name) => write!(f, "{}", name),
            AxisTerm::Value(Label::Str(s)) => write!(f, "{:?}", s),
            AxisTerm::Value(label) => write!(f, "{}", label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Less => ordering.is_lt(),
            Comparison::LessEqual => ordering.is_le(),
            Comparison::Greater => ordering.is_gt(),
            Comparison::GreaterEqual => ordering.is_ge(),
            Comparison::Equal => ordering.is_eq(),
            Comparison::NotEqual => ordering.is_ne(),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterEqual => ">=",
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        }
    }
}

/// A boolean expression over axis labels.
///
/// Labels of different kinds do not compare: evaluating
/// `axis("ordinate").lt("x")` on an integer axis fails with
/// [`FrameError::LabelTypeMismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisCondition {
    Compare {
        op: Comparison,
        left: AxisTerm,
        right: AxisTerm,
    },
    And(Box<AxisCondition>, Box<AxisCondition>),
    Or(Box<AxisCondition>, Box<AxisCondition>),
    Not(Box<AxisCondition>),
}

impl AxisCondition {
    pub fn and(self, other: AxisCondition) -> AxisCondition {
        AxisCondition::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: AxisCondition) -> AxisCondition {
        AxisCondition::Or(Box::new(self), Box::new(other))
    }
}

impl AxisPredicate for AxisCondition {
    fn evaluate(&self, selector: &Selector) -> Result<bool, FrameError> {
        match self {
            AxisCondition::Compare { op, left, right } => {
                let l = left.resolve(selector)?;
                let r = right.resolve(selector)?;
                if !l.same_kind(r) {
                    return Err(FrameError::LabelTypeMismatch {
                        left: l.clone(),
                        right: r.clone(),
                    });
                }
                Ok(op.holds(l.cmp(r)))
            }
            AxisCondition::And(a, b) => Ok(a.evaluate(selector)? && b.evaluate(selector)?),
            AxisCondition::Or(a, b) => Ok(a.evaluate(selector)? || b.evaluate(selector)?),
            AxisCondition::Not(a) => Ok(!a.evaluate(selector)?),
        }
    }
}

impl ops::BitAnd for AxisCondition {
    type Output = AxisCondition;

    fn bitand(self, rhs: AxisCondition) -> AxisCondition {
        self.and(rhs)
    }
}

impl ops::BitOr for AxisCondition {
    type Output = AxisCondition;

    fn bitor(self, rhs: AxisCondition) -> AxisCondition {
        self.or(rhs)
    }
}

impl ops::Not for AxisCondition {
    type Output = AxisCondition;

    fn not(self) -> AxisCondition {
        AxisCondition::Not(Box::new(self))
    }
}

impl fmt::Display for AxisCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisCondition::Compare { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            AxisCondition::And(a, b) => write!(f, "({} && {})", a, b),
            AxisCondition::Or(a, b) => write!(f, "({} || {})", a, b),
            AxisCondition::Not(a) => write!(f, "!({})", a),
        }
    }
}
