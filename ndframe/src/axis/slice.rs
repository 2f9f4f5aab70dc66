/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Axis restrictions.
//!
//! Three descriptions of "which positions of an axis to keep" live
//! here:
//!
//! - [`AxisSlice`] is expressed in the *label* domain (`range("a",
//!   "c")`, `keep(["b"])`, ...). It is resolved against a concrete
//!   [`Axis`] by [`AxisSlice::build_index_slice`].
//! - [`DynamicSlice`] is the user-facing *position* domain
//!   description. Indices may be negative (relative to the end) or out
//!   of range; [`DynamicSlice::normalize`] resolves both.
//! - [`IndexSlice`] is the resolved, in-range position domain slice
//!   that views use to map their own positions onto base positions.
//!
//! Both user-facing forms carry a "squeeze" member: a single label
//! (or position) that collapses the dimension instead of restricting
//! it. Squeezes are detected with `get_squeeze()` and never resolved
//! into an [`IndexSlice`].

use std::collections::HashSet;

use crate::axis::Axis;
use crate::error::FrameError;
use crate::label::Label;
use crate::slice::SliceError;

/// A resolved positional restriction of an axis of known size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexSlice {
    /// Positions `start..stop`.
    Range { start: usize, stop: usize },
    /// Positions `start..stop`, every `step`th.
    Stepped {
        start: usize,
        stop: usize,
        step: usize,
    },
    /// Exactly these positions, in this order.
    Keep(Vec<usize>),
    /// Every position of `0..size` except the (sorted) `dropped` ones.
    Drop { dropped: Vec<usize>, size: usize },
    /// Every position of `0..size`.
    All { size: usize },
}

impl IndexSlice {
    /// Keeps the in-range positions of `positions`, first occurrence
    /// wins.
    pub fn keep(positions: Vec<usize>, size: usize) -> Self {
        let mut seen = HashSet::new();
        IndexSlice::Keep(
            positions
                .into_iter()
                .filter(|&p| p < size && seen.insert(p))
                .collect(),
        )
    }

    /// Drops the in-range positions of `positions`.
    pub fn drop(positions: Vec<usize>, size: usize) -> Self {
        let mut dropped: Vec<usize> = positions.into_iter().filter(|&p| p < size).collect();
        dropped.sort_unstable();
        dropped.dedup();
        IndexSlice::Drop { dropped, size }
    }

    /// The number of positions selected.
    pub fn len(&self) -> usize {
        match self {
            IndexSlice::Range { start, stop } => stop.saturating_sub(*start),
            IndexSlice::Stepped { start, stop, step } => {
                stop.saturating_sub(*start).div_ceil(*step)
            }
            IndexSlice::Keep(keep) => keep.len(),
            IndexSlice::Drop { dropped, size } => size - dropped.len(),
            IndexSlice::All { size } => *size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The base position of the `index`th selected position.
    pub fn get(&self, index: usize) -> Option<usize> {
        if index >= self.len() {
            return None;
        }
        let pos = match self {
            IndexSlice::Range { start, .. } => start + index,
            IndexSlice::Stepped { start, step, .. } => start + index * step,
            IndexSlice::Keep(keep) => keep[index],
            IndexSlice::Drop { dropped, .. } => {
                let mut pos = index;
                for &d in dropped {
                    if d <= pos {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                pos
            }
            IndexSlice::All { .. } => index,
        };
        Some(pos)
    }

    /// Whether base position `pos` is selected.
    pub fn contains(&self, pos: usize) -> bool {
        self.revert(pos).is_some()
    }

    /// The inverse of [`IndexSlice::get`]: the view position of base
    /// position `pos`, if it is selected.
    pub fn revert(&self, pos: usize) -> Option<usize> {
        match self {
            IndexSlice::Range { start, stop } => (*start..*stop).contains(&pos).then(|| pos - start),
            IndexSlice::Stepped { start, stop, step } => ((*start..*stop).contains(&pos)
                && (pos - start) % step == 0)
                .then(|| (pos - start) / step),
            IndexSlice::Keep(keep) => keep.iter().position(|&p| p == pos),
            IndexSlice::Drop { dropped, size } => (pos < *size && dropped.binary_search(&pos).is_err())
                .then(|| pos - dropped.partition_point(|&d| d < pos)),
            IndexSlice::All { size } => (pos < *size).then_some(pos),
        }
    }

    /// The distance between the `index`th and the next selected base
    /// position.
    pub fn step_size(&self, index: usize) -> usize {
        match (self.get(index), self.get(index + 1)) {
            (Some(a), Some(b)) if b > a => b - a,
            _ => 1,
        }
    }

    /// The selected base positions, in view order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// A positional restriction as written by a caller.
///
/// Negative `Keep`/`Drop` entries count from the end of the axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DynamicSlice {
    Range { start: usize, stop: usize },
    Stepped {
        start: usize,
        stop: usize,
        step: usize,
    },
    Keep(Vec<isize>),
    Drop(Vec<isize>),
    All,
    /// Collapse the dimension to this position.
    Squeeze(usize),
}

impl DynamicSlice {
    pub fn range(start: usize, stop: usize) -> Self {
        DynamicSlice::Range { start, stop }
    }

    pub fn stepped(start: usize, stop: usize, step: usize) -> Self {
        DynamicSlice::Stepped { start, stop, step }
    }

    pub fn keep(positions: impl IntoIterator<Item = isize>) -> Self {
        DynamicSlice::Keep(positions.into_iter().collect())
    }

    pub fn drop(positions: impl IntoIterator<Item = isize>) -> Self {
        DynamicSlice::Drop(positions.into_iter().collect())
    }

    pub fn all() -> Self {
        DynamicSlice::All
    }

    pub fn squeeze(position: usize) -> Self {
        DynamicSlice::Squeeze(position)
    }

    /// The squeezed position, if this slice is a squeeze.
    pub fn get_squeeze(&self) -> Option<usize> {
        match self {
            DynamicSlice::Squeeze(pos) => Some(*pos),
            _ => None,
        }
    }

    /// Resolves this slice against an axis of `size` positions:
    /// bounds are clamped, negative positions are made absolute and
    /// out-of-range list entries are removed.
    pub fn normalize(&self, size: usize) -> Result<IndexSlice, FrameError> {
        let absolute = |positions: &[isize]| -> Vec<usize> {
            positions
                .iter()
                .filter_map(|&p| {
                    let p = if p < 0 { size as isize + p } else { p };
                    usize::try_from(p).ok()
                })
                .collect()
        };
        Ok(match self {
            DynamicSlice::Range { start, stop } => {
                let stop = (*stop).min(size);
                IndexSlice::Range {
                    start: (*start).min(stop),
                    stop,
                }
            }
            DynamicSlice::Stepped { start, stop, step } => {
                if *step == 0 {
                    return Err(SliceError::EmptyRange {
                        begin: *start,
                        end: *stop,
                        step: *step,
                    }
                    .into());
                }
                let stop = (*stop).min(size);
                IndexSlice::Stepped {
                    start: (*start).min(stop),
                    stop,
                    step: *step,
                }
            }
            DynamicSlice::Keep(keep) => IndexSlice::keep(absolute(keep), size),
            DynamicSlice::Drop(drop) => IndexSlice::drop(absolute(drop), size),
            DynamicSlice::All => IndexSlice::All { size },
            DynamicSlice::Squeeze(_) => return Err(FrameError::SqueezeSlice),
        })
    }
}

/// A label-domain restriction of an axis.
///
/// Ranges are inclusive of their last label: `range("a", "c")` over
/// `(a, b, c, d)` keeps `a`, `b` and `c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AxisSlice {
    Range {
        first: Label,
        last: Label,
    },
    Stepped {
        first: Label,
        last: Label,
        step: usize,
    },
    Keep(Vec<Label>),
    Drop(Vec<Label>),
    All,
    /// Collapse the dimension to this label.
    Squeeze(Label),
}

impl AxisSlice {
    pub fn range(first: impl Into<Label>, last: impl Into<Label>) -> Self {
        AxisSlice::Range {
            first: first.into(),
            last: last.into(),
        }
    }

    pub fn stepped(first: impl Into<Label>, last: impl Into<Label>, step: usize) -> Self {
        AxisSlice::Stepped {
            first: first.into(),
            last: last.into(),
            step,
        }
    }

    pub fn keep<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Self {
        AxisSlice::Keep(labels.into_iter().map(Into::into).collect())
    }

    pub fn drop<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Self {
        AxisSlice::Drop(labels.into_iter().map(Into::into).collect())
    }

    pub fn all() -> Self {
        AxisSlice::All
    }

    pub fn squeeze(label: impl Into<Label>) -> Self {
        AxisSlice::Squeeze(label.into())
    }

    /// The squeezed label, if this slice is a squeeze.
    pub fn get_squeeze(&self) -> Option<&Label> {
        match self {
            AxisSlice::Squeeze(label) => Some(label),
            _ => None,
        }
    }

    /// Resolves this slice into positions of `axis`. Labels are looked
    /// up strictly: an unknown label is an error.
    pub fn build_index_slice(&self, axis: &Axis) -> Result<IndexSlice, FrameError> {
        let lookup = |labels: &[Label]| -> Result<Vec<usize>, FrameError> {
            labels.iter().map(|l| axis.get(l)).collect()
        };
        Ok(match self {
            AxisSlice::Range { first, last } => IndexSlice::Range {
                start: axis.get(first)?,
                stop: axis.get(last)? + 1,
            },
            AxisSlice::Stepped { first, last, step } => {
                let start = axis.get(first)?;
                let stop = axis.get(last)? + 1;
                if *step == 0 {
                    return Err(SliceError::EmptyRange {
                        begin: start,
                        end: stop,
                        step: *step,
                    }
                    .into());
                }
                IndexSlice::Stepped {
                    start,
                    stop,
                    step: *step,
                }
            }
            AxisSlice::Keep(labels) => IndexSlice::keep(lookup(labels)?, axis.len()),
            AxisSlice::Drop(labels) => IndexSlice::drop(lookup(labels)?, axis.len()),
            AxisSlice::All => IndexSlice::All { size: axis.len() },
            AxisSlice::Squeeze(_) => return Err(FrameError::SqueezeSlice),
        })
    }
}
