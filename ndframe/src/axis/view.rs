/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;

use crate::axis::Axis;
use crate::axis::slice::IndexSlice;
use crate::error::FrameError;
use crate::label::Label;

/// An [`Axis`] seen through an [`IndexSlice`].
///
/// The view shares the base axis' labels; position `i` of the view is
/// position `slice.get(i)` of the base.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisView {
    axis: Axis,
    slice: IndexSlice,
}

impl AxisView {
    pub fn new(axis: Axis, slice: IndexSlice) -> Self {
        Self { axis, slice }
    }

    /// The unrestricted view of `axis`.
    pub fn full(axis: Axis) -> Self {
        let size = axis.len();
        Self::new(axis, IndexSlice::All { size })
    }

    pub fn len(&self) -> usize {
        self.slice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    /// The underlying axis.
    pub fn base(&self) -> &Axis {
        &self.axis
    }

    pub fn slice(&self) -> &IndexSlice {
        &self.slice
    }

    /// The label at view position `position`.
    pub fn label(&self, position: usize) -> Result<&Label, FrameError> {
        let base = self
            .slice
            .get(position)
            .ok_or(FrameError::PositionOutOfRange {
                position,
                size: self.len(),
            })?;
        self.axis.label(base)
    }

    /// The view position of `label`, if the view shows it.
    pub fn position(&self, label: &Label) -> Option<usize> {
        self.axis
            .position(label)
            .and_then(|pos| self.slice.revert(pos))
    }

    /// The view position of `label`, failing if the view does not
    /// show it.
    pub fn get(&self, label: &Label) -> Result<usize, FrameError> {
        self.position(label).ok_or_else(|| FrameError::UnknownLabel {
            label: label.clone(),
        })
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.position(label).is_some()
    }

    /// The labels shown, in view order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> + '_ {
        self.slice
            .positions()
            .filter_map(move |pos| self.axis.labels().get(pos))
    }

    /// Copies the visible labels into an owned axis.
    pub fn to_axis(&self) -> Axis {
        if matches!(self.slice, IndexSlice::All { .. }) {
            return self.axis.clone();
        }
        Axis::from_unique(self.labels().cloned().collect())
    }
}

impl fmt::Display for AxisView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for label in self.labels() {
            write!(f, "{}, ", label)?;
        }
        write!(f, ")")
    }
}
