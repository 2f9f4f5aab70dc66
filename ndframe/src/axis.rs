/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Label-indexed axes.
//!
//! An [`Axis`] is an ordered bijection between unique [`Label`]s and
//! the positions `0..len()`. Axes are cheap to clone: the label list
//! and its reverse index are shared, and only copied when an axis is
//! mutated by [`Axis::merge`], [`Axis::intersect`] or
//! [`Axis::merge_unsorted`].
//!
//! The two join operations are the axis-level half of coordinate
//! broadcasting:
//!
//! ```text
//!   outer:  {a, c, d} merge     {a, b}  =>  {a, c, d, b}
//!   inner:  {a, c, d} intersect {d, a}  =>  {a, d}
//! ```
//!
//! Both report whether the receiver ends up identical, label for
//! label and in order, to the operand. That "trivial" signal is what
//! licenses positional (label-free) access across operands.

/// Restrictions of an axis, in label and position domain.
pub mod slice;

/// Axes restricted by a positional slice.
pub mod view;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::FrameError;
use crate::label::Label;

#[derive(Clone, Debug, Default)]
struct AxisData {
    labels: Vec<Label>,
    index: HashMap<Label, usize>,
}

impl AxisData {
    fn reindex(&mut self) {
        self.index = self
            .labels
            .iter()
            .enumerate()
            .map(|(pos, label)| (label.clone(), pos))
            .collect();
    }
}

/// An ordered sequence of unique labels together with the reverse
/// mapping from label to position.
///
/// Invariants: labels are unique, `axis.get(axis.label(i)) == i` for
/// every `i < axis.len()`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Label>", into = "Vec<Label>")]
pub struct Axis {
    data: Arc<AxisData>,
}

impl Axis {
    /// Creates an axis from a list of labels. Fails if a label occurs
    /// more than once.
    pub fn new<L, I>(labels: I) -> Result<Self, FrameError>
    where
        L: Into<Label>,
        I: IntoIterator<Item = L>,
    {
        let labels: Vec<Label> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());
        for (pos, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), pos).is_some() {
                return Err(FrameError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }
        Ok(Self {
            data: Arc::new(AxisData { labels, index }),
        })
    }

    // Callers guarantee `labels` are unique.
    pub(crate) fn from_unique(labels: Vec<Label>) -> Self {
        let mut data = AxisData {
            labels,
            index: HashMap::new(),
        };
        data.reindex();
        Self {
            data: Arc::new(data),
        }
    }

    /// The axis whose labels are the integers `0..size`.
    pub fn default_axis(size: usize) -> Self {
        Self::from_unique((0_i64..).take(size).map(Label::Int).collect())
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.data.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.labels.is_empty()
    }

    /// The labels in axis order.
    pub fn labels(&self) -> &[Label] {
        &self.data.labels
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.data.index.contains_key(label)
    }

    /// The position of `label`, or `None` if the axis does not hold it.
    pub fn position(&self, label: &Label) -> Option<usize> {
        self.data.index.get(label).copied()
    }

    /// The position of `label`. Fails with
    /// [`FrameError::UnknownLabel`] if the axis does not hold it.
    pub fn get(&self, label: &Label) -> Result<usize, FrameError> {
        self.position(label).ok_or_else(|| FrameError::UnknownLabel {
            label: label.clone(),
        })
    }

    /// The label at `position`.
    pub fn label(&self, position: usize) -> Result<&Label, FrameError> {
        self.data
            .labels
            .get(position)
            .ok_or(FrameError::PositionOutOfRange {
                position,
                size: self.len(),
            })
    }

    /// Looks up `label`, returning the stored label with its position.
    pub fn find(&self, label: &Label) -> Option<(&Label, usize)> {
        self.data
            .index
            .get(label)
            .map(|&pos| (&self.data.labels[pos], pos))
    }

    /// Iterates over `(label, position)` pairs in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, usize)> + '_ {
        self.data.labels.iter().enumerate().map(|(pos, l)| (l, pos))
    }

    /// Outer-join update: appends every label of `other` not already
    /// present, in `other`'s order, after the existing labels.
    ///
    /// Returns `true` iff `other` already held exactly the receiver's
    /// labels in the receiver's order (the receiver is then left
    /// unchanged). This is stricter than "no label added": a strict
    /// subset of the receiver, or the same labels in another order,
    /// returns `false` even though nothing is appended.
    pub fn merge(&mut self, other: &Axis) -> bool {
        let trivial = self.labels() == other.labels();
        if trivial {
            return true;
        }
        let missing: Vec<Label> = other
            .labels()
            .iter()
            .filter(|l| !self.contains(l))
            .cloned()
            .collect();
        if !missing.is_empty() {
            let data = Arc::make_mut(&mut self.data);
            for label in missing {
                data.index.insert(label.clone(), data.labels.len());
                data.labels.push(label);
            }
        }
        false
    }

    /// Inner-join update: keeps only the labels also present in
    /// `other`, preserving the receiver's relative order.
    ///
    /// Returns `true` iff `other` already held exactly the receiver's
    /// labels in the receiver's order (nothing is then removed). This
    /// is stricter than "nothing removed": a strict superset of the
    /// receiver returns `false` even though every label is kept.
    pub fn intersect(&mut self, other: &Axis) -> bool {
        if self.labels() == other.labels() {
            return true;
        }
        if self.labels().iter().any(|l| !other.contains(l)) {
            let data = Arc::make_mut(&mut self.data);
            data.labels.retain(|l| other.contains(l));
            data.reindex();
        }
        false
    }

    /// Merge that follows first-seen order rather than appending.
    ///
    /// With `broadcasting` set, a cursor walks `labels`: a label the
    /// receiver already holds moves the cursor just past it, an
    /// unseen label is inserted at the cursor and the cursor advances.
    /// Merging `{h, c, e}` into `{a, b, d, e}` thus yields
    /// `{h, c, a, b, d, e}`. Without `broadcasting`, unseen labels are
    /// appended as in [`Axis::merge`].
    ///
    /// Returns `true` iff `labels` already equalled the receiver.
    pub fn merge_unsorted(&mut self, broadcasting: bool, labels: &[Label]) -> bool {
        if self.labels() == labels {
            return true;
        }
        if !broadcasting {
            let data = Arc::make_mut(&mut self.data);
            for label in labels {
                if !data.index.contains_key(label) {
                    data.index.insert(label.clone(), data.labels.len());
                    data.labels.push(label.clone());
                }
            }
            return false;
        }
        let data = Arc::make_mut(&mut self.data);
        let mut cursor = 0;
        for label in labels {
            match data.labels.iter().position(|l| l == label) {
                Some(pos) => cursor = pos + 1,
                None => {
                    data.labels.insert(cursor, label.clone());
                    cursor += 1;
                }
            }
        }
        data.reindex();
        false
    }

    /// A new axis holding, in order, the labels for which `pred` holds.
    pub fn filter<F>(&self, mut pred: F) -> Axis
    where
        F: FnMut(&Label) -> bool,
    {
        Axis::from_unique(self.labels().iter().filter(|l| pred(l)).cloned().collect())
    }
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) || self.labels() == other.labels()
    }
}

impl Eq for Axis {}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Axis").field(&self.data.labels).finish()
    }
}

/// Renders `(a, c, d, )`.
impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for label in self.labels() {
            write!(f, "{}, ", label)?;
        }
        write!(f, ")")
    }
}

impl TryFrom<Vec<Label>> for Axis {
    type Error = FrameError;

    fn try_from(labels: Vec<Label>) -> Result<Self, Self::Error> {
        Axis::new(labels)
    }
}

impl From<Axis> for Vec<Label> {
    fn from(axis: Axis) -> Self {
        axis.labels().to_vec()
    }
}
