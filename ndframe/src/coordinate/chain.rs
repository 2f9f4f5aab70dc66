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
use crate::coordinate::Coordinate;
use crate::coordinate::CoordinateLike;
use crate::coordinate::CoordinateLookup;
use crate::coordinate::fmt_axes;
use crate::error::FrameError;
use crate::label::Label;

/// A coordinate with some of its axes replaced.
///
/// Looking up a reindexed dimension uses the replacement axis; every
/// other dimension falls through to the base.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateChain {
    base: Coordinate,
    overrides: BTreeMap<String, Axis>,
}

impl CoordinateChain {
    /// Overlays `overrides` onto `base`. Every overridden name must be
    /// a dimension of `base`.
    pub fn new<S: Into<String>>(
        base: Coordinate,
        overrides: impl IntoIterator<Item = (S, Axis)>,
    ) -> Result<Self, FrameError> {
        let mut map = BTreeMap::new();
        for (name, axis) in overrides {
            let name = name.into();
            if !base.contains(&name) {
                return Err(FrameError::ReindexUnknownDimension { name });
            }
            map.insert(name, axis);
        }
        Ok(Self {
            base,
            overrides: map,
        })
    }

    pub fn base(&self) -> &Coordinate {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Whether `name` has a replacement axis.
    pub fn is_reindexed(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Axis, FrameError> {
        match self.overrides.get(name) {
            Some(axis) => Ok(axis),
            None => self.base.get(name),
        }
    }

    /// `(name, axis)` pairs in name order, replacement axes included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Axis)> + '_ {
        self.base
            .iter()
            .map(move |(name, axis)| (name, self.overrides.get(name).unwrap_or(axis)))
    }

    pub fn to_coordinate(&self) -> Coordinate {
        let mut coordinate = self.base.clone();
        for (name, axis) in &self.overrides {
            coordinate.insert(name.clone(), axis.clone());
        }
        coordinate
    }

    pub fn as_like(&self) -> CoordinateLike<'_> {
        CoordinateLike::Chain(self)
    }
}

impl CoordinateLookup for CoordinateChain {
    fn position_of(&self, name: &str, label: &Label) -> Result<usize, FrameError> {
        self.get(name)?.get(label)
    }

    fn find_position(&self, name: &str, label: &Label) -> Option<usize> {
        self.get(name).ok().and_then(|axis| axis.position(label))
    }

    fn label_at(&self, name: &str, position: usize) -> Result<&Label, FrameError> {
        self.get(name)?.label(position)
    }

    fn axis_len(&self, name: &str) -> Result<usize, FrameError> {
        Ok(self.get(name)?.len())
    }
}

impl fmt::Display for CoordinateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_axes(f, &self.iter().collect::<Vec<_>>())
    }
}
