/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Coordinates and broadcasting.
//!
//! A [`Coordinate`] maps dimension names to [`Axis`]es. Broadcasting
//! reconciles the coordinates of several operands into one:
//!
//! - a dimension only some operands have is added as is;
//! - a dimension several operands share is joined axis by axis,
//!   [`Join::Outer`] taking the union of the labels
//!   ([`Axis::merge`]) and [`Join::Inner`] the intersection
//!   ([`Axis::intersect`]).
//!
//! Operands are heterogeneous: owned coordinates, views onto a
//! coordinate, reindexing chains, expanded coordinates, and the
//! identity coordinate of scalars. [`CoordinateLike`] is the closed
//! set of these kinds.
//!
//! Broadcasting also reports a [`TrivialBroadcast`]: whether the
//! result has exactly the dimensions and labels of every operand. When
//! it does, operands can be combined position by position without any
//! label lookup.

/// Coordinates overlaid with replacement axes.
pub mod chain;

/// Coordinates extended with new dimensions.
pub mod expanded;

/// Coordinates restricted to axis views.
pub mod view;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::axis::Axis;
use crate::coordinate::chain::CoordinateChain;
use crate::coordinate::expanded::CoordinateExpanded;
use crate::coordinate::view::CoordinateView;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::label::Label;

/// The join policy used when two operands share a dimension.
///
/// `Inner` is the default: misaligned labels are dropped and strict
/// lookups of them fail. `Outer` keeps every label and reports absent
/// combinations as missing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize
)]
pub enum Join {
    #[default]
    Inner,
    Outer,
}

/// Whether a broadcast changed nothing.
///
/// `same_dimensions` holds when every operand had the dimensions of
/// the result; `same_labels` when every shared axis of every operand
/// already equalled the result's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrivialBroadcast {
    pub same_dimensions: bool,
    pub same_labels: bool,
}

impl TrivialBroadcast {
    /// The flags of a broadcast that changed nothing.
    pub fn trivial() -> Self {
        Self {
            same_dimensions: true,
            same_labels: true,
        }
    }

    pub fn is_trivial(&self) -> bool {
        self.same_dimensions && self.same_labels
    }

    /// Flags for two broadcasts applied one after the other.
    pub fn and(self, other: TrivialBroadcast) -> Self {
        Self {
            same_dimensions: self.same_dimensions && other.same_dimensions,
            same_labels: self.same_labels && other.same_labels,
        }
    }
}

impl Default for TrivialBroadcast {
    fn default() -> Self {
        Self::trivial()
    }
}

/// Label lookups shared by every coordinate kind. Selectors resolve
/// through this trait.
pub trait CoordinateLookup {
    /// The position of `label` along dimension `name`. Fails if either
    /// is unknown.
    fn position_of(&self, name: &str, label: &Label) -> Result<usize, FrameError>;

    /// The position of `label` along dimension `name`, or `None` if
    /// either is unknown.
    fn find_position(&self, name: &str, label: &Label) -> Option<usize>;

    /// The label at `position` along dimension `name`.
    fn label_at(&self, name: &str, position: usize) -> Result<&Label, FrameError>;

    /// The number of labels along dimension `name`.
    fn axis_len(&self, name: &str) -> Result<usize, FrameError>;

    /// The shape implied by this coordinate under the dimension
    /// mapping `dimension`: `shape[dimension[name]] = len(name)`.
    fn shape(&self, dimension: &Dimension) -> Result<Vec<usize>, FrameError> {
        dimension.names().map(|name| self.axis_len(name)).collect()
    }
}

/// The kinds of coordinate that take part in broadcasting.
#[derive(Debug, Clone, Copy)]
pub enum CoordinateLike<'a> {
    Owned(&'a Coordinate),
    View(&'a CoordinateView),
    Chain(&'a CoordinateChain),
    Expanded(&'a CoordinateExpanded),
    /// The coordinate of a scalar. It has no dimensions and is skipped
    /// by broadcasting.
    Identity,
}

impl<'a> CoordinateLike<'a> {
    pub fn is_identity(&self) -> bool {
        matches!(self, CoordinateLike::Identity)
    }

    /// The number of dimensions.
    pub fn len(&self) -> usize {
        match self {
            CoordinateLike::Owned(c) => c.len(),
            CoordinateLike::View(c) => c.len(),
            CoordinateLike::Chain(c) => c.len(),
            CoordinateLike::Expanded(c) => c.len(),
            CoordinateLike::Identity => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(name, axis)` pairs in name order. Views are copied into owned
    /// axes; every other kind lends its axes.
    pub fn axes(&self) -> Vec<(&'a str, Cow<'a, Axis>)> {
        match *self {
            CoordinateLike::Owned(c) => c
                .iter()
                .map(|(name, axis)| (name, Cow::Borrowed(axis)))
                .collect(),
            CoordinateLike::View(c) => c
                .iter()
                .map(|(name, axis)| (name, Cow::Owned(axis.to_axis())))
                .collect(),
            CoordinateLike::Chain(c) => c
                .iter()
                .map(|(name, axis)| (name, Cow::Borrowed(axis)))
                .collect(),
            CoordinateLike::Expanded(c) => c
                .iter()
                .map(|(name, axis)| (name, Cow::Borrowed(axis)))
                .collect(),
            CoordinateLike::Identity => Vec::new(),
        }
    }
}

/// A mapping from dimension name to [`Axis`].
///
/// Dimensions are kept in name order; two coordinates are equal when
/// they have the same names and, name by name, equal axes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinate {
    axes: BTreeMap<String, Axis>,
}

impl Coordinate {
    /// Creates a coordinate from `(name, axis)` pairs. Fails if a name
    /// occurs more than once.
    pub fn new<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, Axis)>,
    ) -> Result<Self, FrameError> {
        let mut axes = BTreeMap::new();
        for (name, axis) in pairs {
            let name = name.into();
            if axes.contains_key(&name) {
                return Err(FrameError::DuplicateDimension { name });
            }
            axes.insert(name, axis);
        }
        Ok(Self { axes })
    }

    /// The number of dimensions.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Dimension names in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.axes.keys().map(String::as_str)
    }

    /// `(name, axis)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Axis)> + '_ {
        self.axes.iter().map(|(name, axis)| (name.as_str(), axis))
    }

    /// The axis of dimension `name`, if any.
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.get(name)
    }

    /// The axis of dimension `name`. Fails with
    /// [`FrameError::UnknownDimension`] if there is none.
    pub fn get(&self, name: &str) -> Result<&Axis, FrameError> {
        self.axis(name)
            .ok_or_else(|| FrameError::unknown_dimension(name))
    }

    /// The position of `label` along `name`.
    pub fn position(&self, name: &str, label: &Label) -> Result<usize, FrameError> {
        self.get(name)?.get(label)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }

    pub fn contains_label(&self, name: &str, label: &Label) -> bool {
        self.axis(name).is_some_and(|axis| axis.contains(label))
    }

    /// Adds or replaces the axis of `name`, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, axis: Axis) -> Option<Axis> {
        self.axes.insert(name.into(), axis)
    }

    /// Borrows this coordinate as a broadcasting operand.
    pub fn as_like(&self) -> CoordinateLike<'_> {
        CoordinateLike::Owned(self)
    }

    /// Broadcasts `operands` into this coordinate with the join
    /// policy `join`.
    ///
    /// An empty receiver is first seeded with a copy of the last
    /// non-identity operand. Operands are then folded in from right to
    /// left: a dimension new to the receiver is added (and
    /// `same_dimensions` cleared), a shared one is joined axis by axis
    /// and its trivial flag folded into `same_labels`. After each
    /// operand, `same_dimensions` also requires that the operand had
    /// as many dimensions as the receiver. Identity operands are
    /// skipped.
    pub fn broadcast(&mut self, join: Join, operands: &[CoordinateLike<'_>]) -> TrivialBroadcast {
        if self.is_empty() {
            if let Some(last) = operands.iter().rev().find(|c| !c.is_identity()) {
                self.broadcast_empty(last);
            }
        }
        let mut result = TrivialBroadcast::trivial();
        for operand in operands.iter().rev() {
            if operand.is_identity() {
                continue;
            }
            for (name, axis) in operand.axes() {
                match self.axes.get_mut(name) {
                    None => {
                        self.axes.insert(name.to_string(), axis.into_owned());
                        result.same_dimensions = false;
                    }
                    Some(existing) => {
                        result.same_labels &= match join {
                            Join::Outer => existing.merge(&axis),
                            Join::Inner => existing.intersect(&axis),
                        };
                    }
                }
            }
            result.same_dimensions &= self.len() == operand.len();
        }
        tracing::trace!(
            ?join,
            same_dimensions = result.same_dimensions,
            same_labels = result.same_labels,
            "broadcast coordinates"
        );
        result
    }

    fn broadcast_empty(&mut self, operand: &CoordinateLike<'_>) {
        self.axes = operand
            .axes()
            .into_iter()
            .map(|(name, axis)| (name.to_string(), axis.into_owned()))
            .collect();
    }
}

impl CoordinateLookup for Coordinate {
    fn position_of(&self, name: &str, label: &Label) -> Result<usize, FrameError> {
        self.position(name, label)
    }

    fn find_position(&self, name: &str, label: &Label) -> Option<usize> {
        self.axis(name).and_then(|axis| axis.position(label))
    }

    fn label_at(&self, name: &str, position: usize) -> Result<&Label, FrameError> {
        self.get(name)?.label(position)
    }

    fn axis_len(&self, name: &str) -> Result<usize, FrameError> {
        Ok(self.get(name)?.len())
    }
}

/// Writes one line per dimension, `name: (label, ...)`, names padded
/// to the longest one.
pub(crate) fn fmt_axes<A: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    axes: &[(&str, A)],
) -> fmt::Result {
    let width = axes.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, axis) in axes {
        writeln!(f, "{:<width$}: {}", name, axis, width = width)?;
    }
    Ok(())
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_axes(f, &self.iter().collect::<Vec<_>>())
    }
}

/// Construct a [`Coordinate`] from `name = [labels...]` pairs. The
/// result is a `Result`, failing on duplicate labels.
///
/// ```
/// let c = ndframe::coordinate!(abscissa = ["a", "c", "d"], ordinate = [1, 2, 4]).unwrap();
/// assert_eq!(c.len(), 2);
/// assert_eq!(c.position("ordinate", &4.into()).unwrap(), 2);
/// ```
#[macro_export]
macro_rules! coordinate {
    ( $( $name:ident = [ $( $label:expr ),* $(,)? ] ),* $(,)? ) => {
        (|| -> ::std::result::Result<$crate::Coordinate, $crate::FrameError> {
            let mut pairs: ::std::vec::Vec<(&str, $crate::Axis)> = ::std::vec::Vec::new();
            $(
                let labels: ::std::vec::Vec<$crate::Label> =
                    ::std::vec![ $( $crate::Label::from($label) ),* ];
                pairs.push((stringify!($name), $crate::Axis::new(labels)?));
            )*
            $crate::Coordinate::new(pairs)
        })()
    };
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::strategy::gen_coordinate;

    fn axis<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Axis {
        Axis::new(labels).unwrap()
    }

    fn xy() -> Coordinate {
        coordinate!(abscissa = ["a", "c", "d"], ordinate = [1, 2, 4]).unwrap()
    }

    #[test]
    fn test_lookup() {
        let c = xy();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("abscissa").unwrap(), &axis(["a", "c", "d"]));
        assert_eq!(c.position("ordinate", &2.into()).unwrap(), 1);
        assert!(c.contains("ordinate"));
        assert!(c.contains_label("abscissa", &"d".into()));
        assert!(!c.contains_label("abscissa", &"b".into()));
        assert!(!c.contains_label("altitude", &"b".into()));
        assert!(matches!(
            c.get("altitude"),
            Err(FrameError::UnknownDimension { .. })
        ));
        assert!(matches!(
            c.position("abscissa", &"b".into()),
            Err(FrameError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_duplicate_dimension() {
        assert!(matches!(
            Coordinate::new([("x", axis([1])), ("x", axis([2]))]),
            Err(FrameError::DuplicateDimension { .. })
        ));
        assert!(coordinate!(x = [1, 1]).is_err());
    }

    #[test]
    fn test_shape() {
        let c = xy();
        let d = Dimension::new(["ordinate", "abscissa"]).unwrap();
        assert_eq!(c.shape(&d).unwrap(), vec![3, 3]);
        let d = Dimension::new(["altitude"]).unwrap();
        assert!(c.shape(&d).is_err());
    }

    #[test]
    fn test_broadcast_self_is_trivial() {
        let c = xy();
        let mut res = Coordinate::default();
        let trivial = res.broadcast(Join::Inner, &[c.as_like(), c.as_like()]);
        assert_eq!(trivial, TrivialBroadcast::trivial());
        assert_eq!(res, c);

        let mut res = c.clone();
        assert!(res.broadcast(Join::Outer, &[c.as_like()]).is_trivial());
    }

    #[test]
    fn test_broadcast_superset_of_dimensions() {
        let c = xy();
        let wider = coordinate!(
            abscissa = ["a", "c", "d"],
            ordinate = [1, 2, 4],
            altitude = [10, 20]
        )
        .unwrap();
        let mut res = c.clone();
        let trivial = res.broadcast(Join::Inner, &[wider.as_like()]);
        assert!(!trivial.same_dimensions);
        assert!(trivial.same_labels);
        assert_eq!(res, wider);
    }

    #[test]
    fn test_broadcast_outer() {
        let c1 = coordinate!(abscissa = ["a", "c", "d"], ordinate = [1, 2, 4]).unwrap();
        let c2 = coordinate!(abscissa = ["a", "b", "d"], ordinate = [1, 4]).unwrap();
        let mut res = Coordinate::default();
        let trivial = res.broadcast(Join::Outer, &[c1.as_like(), c2.as_like()]);
        assert!(trivial.same_dimensions);
        assert!(!trivial.same_labels);
        // Seeded with c2, then c1 merged in.
        assert_eq!(res.get("abscissa").unwrap(), &axis(["a", "b", "d", "c"]));
        assert_eq!(res.get("ordinate").unwrap(), &axis([1, 4, 2]));
    }

    #[test]
    fn test_broadcast_inner() {
        let c1 = coordinate!(abscissa = ["a", "c", "d"], ordinate = [1, 2, 4]).unwrap();
        let c2 = coordinate!(abscissa = ["d", "a", "b"], ordinate = [1, 4]).unwrap();
        let mut res = Coordinate::default();
        let trivial = res.broadcast(Join::Inner, &[c1.as_like(), c2.as_like()]);
        assert!(!trivial.same_labels);
        assert_eq!(res.get("abscissa").unwrap(), &axis(["d", "a"]));
        assert_eq!(res.get("ordinate").unwrap(), &axis([1, 4]));
    }

    #[test]
    fn test_broadcast_three_operands() {
        let c1 = coordinate!(x = [1, 2], y = ["a"]).unwrap();
        let c2 = coordinate!(y = ["a", "b"], z = ['u']).unwrap();
        let c3 = coordinate!(z = ['u', 'v'], w = [0]).unwrap();
        let mut res = Coordinate::default();
        let trivial = res.broadcast(
            Join::Outer,
            &[c1.as_like(), CoordinateLike::Identity, c2.as_like(), c3.as_like()],
        );
        assert!(!trivial.same_dimensions);
        assert!(!trivial.same_labels);
        assert_eq!(res.names().collect::<Vec<_>>(), vec!["w", "x", "y", "z"]);
        assert_eq!(res.get("y").unwrap(), &axis(["a", "b"]));
        assert_eq!(res.get("z").unwrap(), &axis(['u', 'v']));
    }

    #[test]
    fn test_broadcast_identity_only() {
        let mut res = Coordinate::default();
        let trivial = res.broadcast(Join::Inner, &[CoordinateLike::Identity]);
        assert!(trivial.is_trivial());
        assert!(res.is_empty());
    }

    #[test]
    fn test_display() {
        let c = coordinate!(x = [1, 2], abscissa = ["a"]).unwrap();
        assert_eq!(c.to_string(), "abscissa: (a, )\nx       : (1, 2, )\n");
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = xy();
        let json = serde_json::to_string(&c).unwrap();
        let d: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(c, d);
    }

    proptest! {
        #[test]
        fn prop_broadcast_with_self_is_trivial(c in gen_coordinate(3, 6)) {
            let mut res = c.clone();
            prop_assert!(res.broadcast(Join::Outer, &[c.as_like()]).is_trivial());
            prop_assert!(res.broadcast(Join::Inner, &[c.as_like()]).is_trivial());
            prop_assert_eq!(res, c);
        }
    }
}
