/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Per-call selection descriptors.
//!
//! Every element access on a variable-like type resolves one of these
//! into a flat positional index with one entry per dimension, in
//! [`Dimension`] order. Dimensions a descriptor does not mention
//! default to position 0.
//!
//! - [`Selector`] names a label per dimension and is looked up through
//!   the coordinate. [`Selector::get_index`] is strict;
//!   [`Selector::get_outer_index`] reports absent labels instead of
//!   failing.
//! - [`ISelector`] names a position per dimension; no lookup happens.
//! - [`Locator`] lists one label per dimension, in dimension order.

use std::fmt;

use crate::coordinate::CoordinateLookup;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::label::Label;

/// A label-keyed selection: `(dimension name, label)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    entries: Vec<(String, Label)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `(name, label)`, builder style.
    pub fn with(mut self, name: impl Into<String>, label: impl Into<Label>) -> Self {
        self.push(name, label);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, label: impl Into<Label>) {
        self.entries.push((name.into(), label.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Label)> + '_ {
        self.entries.iter().map(|(name, label)| (name.as_str(), label))
    }

    /// The label selected along `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, label)| label)
    }

    /// The selector naming, for every dimension, the label at the
    /// matching entry of `index`.
    pub fn from_index<C: CoordinateLookup + ?Sized>(
        coordinate: &C,
        dimension: &Dimension,
        index: &[usize],
    ) -> Result<Self, FrameError> {
        if index.len() != dimension.len() {
            return Err(FrameError::IndexArity {
                expected: dimension.len(),
                got: index.len(),
            });
        }
        let entries = dimension
            .names()
            .zip(index)
            .map(|(name, &pos)| -> Result<(String, Label), FrameError> {
                Ok((name.to_string(), coordinate.label_at(name, pos)?.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }

    /// Resolves this selector strictly. Names that are not dimensions
    /// are ignored; an unknown label along a known dimension fails.
    pub fn get_index<C: CoordinateLookup + ?Sized>(
        &self,
        coordinate: &C,
        dimension: &Dimension,
    ) -> Result<Vec<usize>, FrameError> {
        let mut index = vec![0; dimension.len()];
        for (name, label) in self.iter() {
            if let Some(dim) = dimension.position(name) {
                index[dim] = coordinate.position_of(name, label)?;
            }
        }
        Ok(index)
    }

    /// Resolves this selector without failing. The flag is `false` as
    /// soon as a label is absent from its axis; the index is then
    /// unspecified.
    pub fn get_outer_index<C: CoordinateLookup + ?Sized>(
        &self,
        coordinate: &C,
        dimension: &Dimension,
    ) -> (Vec<usize>, bool) {
        let mut index = vec![0; dimension.len()];
        for (name, label) in self.iter() {
            if let Some(dim) = dimension.position(name) {
                match coordinate.find_position(name, label) {
                    Some(pos) => index[dim] = pos,
                    None => return (index, false),
                }
            }
        }
        (index, true)
    }
}

impl<N: Into<String>, L: Into<Label>> FromIterator<(N, L)> for Selector {
    fn from_iter<I: IntoIterator<Item = (N, L)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, label)| (name.into(), label.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, label)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, label)?;
        }
        write!(f, "}}")
    }
}

/// A position-keyed selection: `(dimension name, position)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ISelector {
    entries: Vec<(String, usize)>,
}

impl ISelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, position: usize) -> Self {
        self.entries.push((name.into(), position));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|(name, pos)| (name.as_str(), *pos))
    }

    /// Places every position at its dimension's index. Names that are
    /// not dimensions are ignored.
    pub fn get_index(&self, dimension: &Dimension) -> Vec<usize> {
        let mut index = vec![0; dimension.len()];
        for (name, pos) in self.iter() {
            if let Some(dim) = dimension.position(name) {
                index[dim] = pos;
            }
        }
        index
    }
}

impl<N: Into<String>> FromIterator<(N, usize)> for ISelector {
    fn from_iter<I: IntoIterator<Item = (N, usize)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, pos)| (name.into(), pos))
                .collect(),
        }
    }
}

/// One label per dimension, in dimension order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locator {
    labels: Vec<Label>,
}

impl Locator {
    pub fn new<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Resolves `labels[i]` along dimension `i`. Strict.
    pub fn get_index<C: CoordinateLookup + ?Sized>(
        &self,
        coordinate: &C,
        dimension: &Dimension,
    ) -> Result<Vec<usize>, FrameError> {
        if self.labels.len() != dimension.len() {
            return Err(FrameError::IndexArity {
                expected: dimension.len(),
                got: self.labels.len(),
            });
        }
        dimension
            .names()
            .zip(&self.labels)
            .map(|(name, label)| coordinate.position_of(name, label))
            .collect()
    }
}

/// Construct a [`Selector`] from `name = label` pairs.
///
/// ```
/// let s = ndframe::selector!(abscissa = "a", ordinate = 2);
/// assert_eq!(s.len(), 2);
/// ```
#[macro_export]
macro_rules! selector {
    ( $( $name:ident = $label:expr ),* $(,)? ) => {
        $crate::Selector::new() $( .with(stringify!($name), $label) )*
    };
}
