/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::axis::Axis;
use crate::error::FrameError;
use crate::label::Label;

/// The mapping from dimension name to the index of that dimension in
/// the data's shape.
///
/// A `Dimension` is an [`Axis`] whose labels are dimension names, so
/// the positions are always the dense range `0..len()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimension {
    axis: Axis,
}

impl Dimension {
    /// Creates a mapping where `names[i]` is shape index `i`.
    pub fn new<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Self, FrameError> {
        let labels: Vec<Label> = names.into_iter().map(|n| n.as_ref().into()).collect();
        let axis = Axis::new(labels).map_err(|err| match err {
            FrameError::DuplicateLabel { label } => FrameError::DuplicateDimension {
                name: label.to_string(),
            },
            err => err,
        })?;
        Ok(Self { axis })
    }

    /// The number of dimensions.
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// The underlying axis of names.
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Dimension names in shape order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.axis.labels().iter().filter_map(Label::as_str)
    }

    /// The name of shape index `index`.
    pub fn name(&self, index: usize) -> Result<&str, FrameError> {
        let label = self.axis.label(index)?;
        label.as_str().ok_or_else(|| FrameError::UnknownLabel {
            label: label.clone(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.axis.contains(&name.into())
    }

    /// The shape index of `name`, if it is a dimension.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.axis.position(&name.into())
    }

    /// The shape index of `name`. Fails with
    /// [`FrameError::UnknownDimension`] if it is not a dimension.
    pub fn get(&self, name: &str) -> Result<usize, FrameError> {
        self.position(name)
            .ok_or_else(|| FrameError::unknown_dimension(name))
    }

    /// Broadcasts this mapping with `operands`.
    ///
    /// An empty receiver is first seeded with the last operand. The
    /// operands are then merged right to left with
    /// [`Axis::merge_unsorted`], so names the receiver already holds
    /// keep their relative order and unseen names are inserted where
    /// they are first met.
    ///
    /// Returns `true` iff every operand equals the result, name for
    /// name and in order. Positional access is then valid across all
    /// operands.
    pub fn broadcast(&mut self, operands: &[&Dimension]) -> bool {
        if self.is_empty() {
            if let Some(last) = operands.last() {
                self.axis = last.axis.clone();
            }
        }
        let mut trivial = true;
        for operand in operands.iter().rev() {
            trivial &= self.axis.merge_unsorted(true, operand.axis.labels());
        }
        tracing::trace!(dimension = %self, trivial, "broadcast dimensions");
        trivial
    }

    /// A copy with `name` inserted at shape index `index` (clamped to
    /// `len()`).
    pub fn inserted(&self, name: &str, index: usize) -> Result<Dimension, FrameError> {
        if self.contains(name) {
            return Err(FrameError::DimensionExists {
                name: name.to_string(),
            });
        }
        let mut labels = self.axis.labels().to_vec();
        labels.insert(index.min(labels.len()), name.into());
        Ok(Self {
            axis: Axis::from_unique(labels),
        })
    }

    /// A copy without the dimensions named in `names`.
    pub fn without(&self, names: &[&str]) -> Dimension {
        Self {
            axis: self
                .axis
                .filter(|l| l.as_str().map_or(true, |n| !names.contains(&n))),
        }
    }
}

/// Renders `(abscissa, ordinate, )`.
impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.axis, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(names: &[&str]) -> Dimension {
        Dimension::new(names).unwrap()
    }

    #[test]
    fn test_lookup() {
        let d = dims(&["abscissa", "ordinate"]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("ordinate").unwrap(), 1);
        assert_eq!(d.name(0).unwrap(), "abscissa");
        assert!(d.contains("abscissa"));
        assert!(matches!(
            d.get("altitude"),
            Err(FrameError::UnknownDimension { name }) if name == "altitude"
        ));
        assert_eq!(d.names().collect::<Vec<_>>(), vec!["abscissa", "ordinate"]);
    }

    #[test]
    fn test_duplicate() {
        assert!(matches!(
            Dimension::new(["a", "a"]),
            Err(FrameError::DuplicateDimension { name }) if name == "a"
        ));
    }

    #[test]
    fn test_broadcast_into_receiver() {
        let mut d = dims(&["a", "b", "d", "e"]);
        assert!(!d.broadcast(&[&dims(&["h", "c", "e"])]));
        assert_eq!(d, dims(&["h", "c", "a", "b", "d", "e"]));
    }

    #[test]
    fn test_broadcast_folds_right_to_left() {
        // Seeded with the last operand, then the first one is merged.
        let mut d = Dimension::default();
        assert!(!d.broadcast(&[&dims(&["a", "b", "d", "e"]), &dims(&["h", "c", "e"])]));
        assert_eq!(d, dims(&["a", "b", "d", "h", "c", "e"]));

        let mut d = Dimension::default();
        assert!(!d.broadcast(&[
            &dims(&["a", "b"]),
            &dims(&["b", "c"]),
            &dims(&["d", "c"]),
        ]));
        // Seeded with (d, c); (b, c) puts b in front; (a, b) then puts
        // a in front of b.
        assert_eq!(d, dims(&["a", "b", "d", "c"]));
    }

    #[test]
    fn test_broadcast_trivial() {
        let a = dims(&["x", "y"]);
        let mut d = Dimension::default();
        assert!(d.broadcast(&[&a, &a]));
        assert_eq!(d, a);

        // Same names, different order: not trivial, receiver order kept.
        let mut d = a.clone();
        assert!(!d.broadcast(&[&dims(&["y", "x"])]));
        assert_eq!(d, a);
    }

    #[test]
    fn test_insert_and_remove() {
        let d = dims(&["x", "y"]);
        assert_eq!(d.inserted("z", 1).unwrap(), dims(&["x", "z", "y"]));
        assert_eq!(d.inserted("z", 9).unwrap(), dims(&["x", "y", "z"]));
        assert!(matches!(
            d.inserted("x", 0),
            Err(FrameError::DimensionExists { .. })
        ));
        assert_eq!(d.without(&["x"]), dims(&["y"]));
    }
}
