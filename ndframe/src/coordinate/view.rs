/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::collections::BTreeMap;
use std::fmt;

use crate::axis::Axis;
use crate::axis::view::AxisView;
use crate::coordinate::Coordinate;
use crate::coordinate::CoordinateLike;
use crate::coordinate::CoordinateLookup;
use crate::coordinate::fmt_axes;
use crate::error::FrameError;
use crate::label::Label;

/// A coordinate whose axes are [`AxisView`]s onto the axes of another
/// coordinate. Squeezed dimensions are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateView {
    axes: BTreeMap<String, AxisView>,
}

impl CoordinateView {
    pub fn new<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, AxisView)>,
    ) -> Result<Self, FrameError> {
        let mut axes = BTreeMap::new();
        for (name, view) in pairs {
            let name = name.into();
            if axes.contains_key(&name) {
                return Err(FrameError::DuplicateDimension { name });
            }
            axes.insert(name, view);
        }
        Ok(Self { axes })
    }

    /// The unrestricted view of every axis of `coordinate`.
    pub fn full(coordinate: &Coordinate) -> Self {
        Self {
            axes: coordinate
                .iter()
                .map(|(name, axis)| (name.to_string(), AxisView::full(axis.clone())))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.axes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AxisView)> + '_ {
        self.axes.iter().map(|(name, view)| (name.as_str(), view))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&AxisView, FrameError> {
        self.axes
            .get(name)
            .ok_or_else(|| FrameError::unknown_dimension(name))
    }

    /// Copies the visible labels into an owned coordinate.
    pub fn to_coordinate(&self) -> Coordinate {
        let pairs: Vec<(&str, Axis)> = self
            .iter()
            .map(|(name, view)| (name, view.to_axis()))
            .collect();
        let mut coordinate = Coordinate::default();
        for (name, axis) in pairs {
            coordinate.insert(name, axis);
        }
        coordinate
    }

    pub fn as_like(&self) -> CoordinateLike<'_> {
        CoordinateLike::View(self)
    }
}

impl CoordinateLookup for CoordinateView {
    fn position_of(&self, name: &str, label: &Label) -> Result<usize, FrameError> {
        self.get(name)?.get(label)
    }

    fn find_position(&self, name: &str, label: &Label) -> Option<usize> {
        self.axes.get(name).and_then(|view| view.position(label))
    }

    fn label_at(&self, name: &str, position: usize) -> Result<&Label, FrameError> {
        self.get(name)?.label(position)
    }

    fn axis_len(&self, name: &str) -> Result<usize, FrameError> {
        Ok(self.get(name)?.len())
    }
}

impl fmt::Display for CoordinateView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_axes(f, &self.iter().collect::<Vec<_>>())
    }
}
