/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Labeled n-dimensional arrays.
//!
//! A [`Variable`] is a dense array whose dimensions have names and
//! whose positions along each dimension have [`Label`]s. Elements are
//! addressed by position, by label ([`Selector`], [`Locator`]) or by
//! named position ([`ISelector`]).
//!
//! Operands with different labels are reconciled by broadcasting their
//! [`Coordinate`]s: shared dimensions are joined label by label
//! ([`Join::Inner`] or [`Join::Outer`]) and missing dimensions are
//! added. Lazy [`function`]s of variables and the views of this crate
//! ([`view`], [`reindex`], [`masked`], [`expand`]) all take part in
//! broadcasting through the [`Expression`] trait, and any expression
//! can be materialised with [`Variable::from_expr`].
//!
//! ```
//! use ndframe::Dimension;
//! use ndframe::Variable;
//! use ndframe::coordinate;
//! use ndframe::selector;
//!
//! let v = Variable::from_vec(
//!     vec![Some(1.0), Some(2.0), None, Some(4.0)],
//!     coordinate!(x = ["a", "b"], y = [1, 2]).unwrap(),
//!     Dimension::new(["x", "y"]).unwrap(),
//! )
//! .unwrap();
//! let doubled = Variable::from_expr(&(&v * 2.0)).unwrap();
//! assert_eq!(doubled.select(&selector!(x = "b", y = 2)).unwrap(), Some(8.0));
//! assert_eq!(doubled.select(&selector!(x = "b", y = 1)).unwrap(), None);
//! ```

/// Labels, the keys of axes.
pub mod label;

/// Axes: ordered sequences of unique labels.
pub mod axis;

/// Dimension mappings: dimension name to shape index.
pub mod dimension;

/// Coordinates, their views and broadcasting.
pub mod coordinate;

/// Label and position based selection descriptors.
pub mod selector;

/// Strided layouts over flat storage.
pub mod slice;

/// Dense n-dimensional storage.
pub mod tensor;

/// Values read through masked views.
pub mod value;

/// The operation set shared by every variable-like type.
pub mod expression;

/// Labeled n-dimensional arrays.
pub mod variable;

/// Lazy elementwise functions and operators.
pub mod function;

/// Sliced and squeezed views of variables.
pub mod view;

/// Lazy relabeling and alignment.
pub mod reindex;

/// Boolean predicates over axis labels.
pub mod predicate;

/// Predicate-masked views.
pub mod masked;

/// Views with extra unit dimensions.
pub mod expand;

/// Type-erased variables.
pub mod dynamic;

/// Runtime configuration.
pub mod config;

mod error;
mod pretty;

/// Property-based generators for randomized test input.
#[cfg(test)]
pub mod strategy;

pub use axis::Axis;
pub use axis::slice::AxisSlice;
pub use axis::slice::DynamicSlice;
pub use axis::slice::IndexSlice;
pub use axis::view::AxisView;
pub use coordinate::Coordinate;
pub use coordinate::Join;
pub use coordinate::TrivialBroadcast;
pub use dimension::Dimension;
pub use dynamic::DynamicVariable;
pub use dynamic::ScalarValue;
pub use error::FrameError;
pub use expand::ExpandDimsView;
pub use expression::Expression;
pub use expression::Scalar;
pub use function::Function;
pub use label::Label;
pub use masked::MaskedView;
pub use reindex::ReindexView;
pub use selector::ISelector;
pub use selector::Locator;
pub use selector::Selector;
pub use slice::Slice;
pub use slice::SliceError;
pub use tensor::Tensor;
pub use value::Masked;
pub use variable::Variable;
pub use variable::assign::AssignPath;
pub use view::VariableView;
