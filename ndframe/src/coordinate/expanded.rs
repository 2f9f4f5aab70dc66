/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use crate::axis::Axis;
use crate::coordinate::Coordinate;
use crate::coordinate::CoordinateLike;
use crate::coordinate::CoordinateLookup;
use crate::coordinate::fmt_axes;
use crate::error::FrameError;
use crate::label::Label;

/// A coordinate extended with new dimensions of a single label each.
///
/// The label of every added axis is `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateExpanded {
    base: Coordinate,
    extra: BTreeMap<String, Axis>,
}

impl CoordinateExpanded {
    /// Adds one single-label axis per name in `names`. No name may
    /// already be a dimension of `base`.
    pub fn new<S: AsRef<str>>(
        base: Coordinate,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, FrameError> {
        let mut extra = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            if base.contains(name) {
                return Err(FrameError::DimensionExists {
                    name: name.to_string(),
                });
            }
            if extra
                .insert(name.to_string(), Axis::from_unique(vec![Label::Int(0)]))
                .is_some()
            {
                return Err(FrameError::DuplicateDimension {
                    name: name.to_string(),
                });
            }
        }
        Ok(Self { base, extra })
    }

    pub fn base(&self) -> &Coordinate {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` is one of the added dimensions.
    pub fn is_expanded(&self, name: &str) -> bool {
        self.extra.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Axis, FrameError> {
        match self.extra.get(name) {
            Some(axis) => Ok(axis),
            None => self.base.get(name),
        }
    }

    /// `(name, axis)` pairs of base and added dimensions, in name
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Axis)> + '_ {
        self.base
            .iter()
            .merge_by(
                self.extra.iter().map(|(name, axis)| (name.as_str(), axis)),
                |a, b| a.0 <= b.0,
            )
    }

    pub fn to_coordinate(&self) -> Coordinate {
        let mut coordinate = self.base.clone();
        for (name, axis) in &self.extra {
            coordinate.insert(name.clone(), axis.clone());
        }
        coordinate
    }

    pub fn as_like(&self) -> CoordinateLike<'_> {
        CoordinateLike::Expanded(self)
    }
}

impl CoordinateLookup for CoordinateExpanded {
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

impl fmt::Display for CoordinateExpanded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_axes(f, &self.iter().collect::<Vec<_>>())
    }
}
