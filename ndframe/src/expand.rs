/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Views with extra unit dimensions.
//!
//! [`expand_dims`] and [`expand_dims_at`] add new dimensions of size
//! one to a variable without copying it. Each new dimension gets a
//! single-label axis (label `0`) and a unit entry in the strided layout
//! used to address the base's storage.

use std::fmt;

use crate::coordinate::Coordinate;
use crate::coordinate::Join;
use crate::coordinate::TrivialBroadcast;
use crate::coordinate::expanded::CoordinateExpanded;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::expression::Expression;
use crate::function::IntoOperand;
use crate::function::Operand;
use crate::label::Label;
use crate::selector::ISelector;
use crate::selector::Locator;
use crate::selector::Selector;
use crate::slice::Slice;
use crate::variable::Variable;

/// A read-only view of a variable with added unit dimensions.
#[derive(Debug, Clone)]
pub struct ExpandDimsView<'a, T> {
    base: &'a Variable<T>,
    coordinate: CoordinateExpanded,
    dimension: Dimension,
    layout: Slice,
}

/// `base` with the dimensions `names` added in front, in order.
pub fn expand_dims<T, S>(
    base: &Variable<T>,
    names: impl IntoIterator<Item = S>,
) -> Result<ExpandDimsView<'_, T>, FrameError>
where
    S: AsRef<str>,
{
    let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
    expand_dims_at(base, names.into_iter().enumerate().map(|(i, name)| (name, i)))
}

/// `base` with each `(name, position)` dimension added at `position`
/// of the result's dimension mapping. Insertions apply in ascending
/// position order; positions past the end append.
pub fn expand_dims_at<T, S>(
    base: &Variable<T>,
    dims: impl IntoIterator<Item = (S, usize)>,
) -> Result<ExpandDimsView<'_, T>, FrameError>
where
    S: AsRef<str>,
{
    let mut dims: Vec<(S, usize)> = dims.into_iter().collect();
    dims.sort_by_key(|(_, position)| *position);

    let coordinate =
        CoordinateExpanded::new(base.coordinate().clone(), dims.iter().map(|(name, _)| name))?;
    let mut dimension = base.dimension().clone();
    let mut layout = Slice::new_row_major(base.shape());
    for (name, position) in &dims {
        let position = (*position).min(dimension.len());
        dimension = dimension.inserted(name.as_ref(), position)?;
        layout = layout.insert_unit_dim(position)?;
    }
    tracing::debug!(
        expanded = ?dims.iter().map(|(name, position)| (name.as_ref(), *position)).collect::<Vec<_>>(),
        dimension = %dimension,
        "expand_dims"
    );
    Ok(ExpandDimsView {
        base,
        coordinate,
        dimension,
        layout,
    })
}

impl<'a, T> ExpandDimsView<'a, T> {
    pub fn base(&self) -> &'a Variable<T> {
        self.base
    }

    pub fn coordinate(&self) -> &CoordinateExpanded {
        &self.coordinate
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    pub fn shape(&self) -> &[usize] {
        self.layout.sizes()
    }

    pub fn get(&self, index: &[usize]) -> Result<&Option<T>, FrameError> {
        if index.len() != self.dimension.len() {
            return Err(FrameError::IndexArity {
                expected: self.dimension.len(),
                got: index.len(),
            });
        }
        let location = self.layout.location(index)?;
        self.base
            .data()
            .at_location(location)
            .ok_or(FrameError::PositionOutOfRange {
                position: location,
                size: self.base.len(),
            })
    }
}

impl<T: Clone> ExpandDimsView<'_, T> {
    pub fn element(&self, index: &[usize]) -> Result<Option<T>, FrameError> {
        self.get(index).cloned()
    }

    pub fn locate<L: Into<Label>>(
        &self,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Option<T>, FrameError> {
        self.locate_element(&Locator::new(labels))
    }

    pub fn locate_element(&self, locator: &Locator) -> Result<Option<T>, FrameError> {
        let index = locator.get_index(&self.coordinate, &self.dimension)?;
        self.element(&index)
    }

    pub fn select(&self, selector: &Selector) -> Result<Option<T>, FrameError> {
        self.select_with(Join::Inner, selector)
    }

    pub fn select_with(&self, join: Join, selector: &Selector) -> Result<Option<T>, FrameError> {
        match join {
            Join::Inner => {
                let index = selector.get_index(&self.coordinate, &self.dimension)?;
                self.element(&index)
            }
            Join::Outer => match selector.get_outer_index(&self.coordinate, &self.dimension) {
                (index, true) => self.element(&index),
                (_, false) => Ok(None),
            },
        }
    }

    pub fn iselect(&self, selector: &ISelector) -> Result<Option<T>, FrameError> {
        self.element(&selector.get_index(&self.dimension))
    }
}

impl<T: Clone> Expression for ExpandDimsView<'_, T> {
    type Elem = T;

    fn broadcast_coordinates(&self, join: Join, coordinate: &mut Coordinate) -> TrivialBroadcast {
        coordinate.broadcast(join, &[self.coordinate.as_like()])
    }

    fn broadcast_dimensions(&self, dimension: &mut Dimension) -> bool {
        dimension.broadcast(&[&self.dimension])
    }

    fn select(&self, join: Join, selector: &Selector) -> Result<Option<T>, FrameError> {
        self.select_with(join, selector)
    }

    fn element(&self, index: &[usize]) -> Result<Option<T>, FrameError> {
        ExpandDimsView::element(self, index)
    }
}

impl<'a, 'b: 'a, T: Clone + 'a> IntoOperand<'a, T> for &'a ExpandDimsView<'b, T> {
    fn into_operand(self) -> Operand<'a, T> {
        Box::new(self)
    }
}

impl<T: fmt::Display> fmt::Display for ExpandDimsView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = crate::config::global::get().missing_repr;
        let mut cells = Vec::with_capacity(self.layout.len());
        for location in self.layout.iter() {
            cells.push(match self.base.data().at_location(location) {
                Some(Some(v)) => v.to_string(),
                _ => missing.clone(),
            });
        }
        crate::pretty::fmt_variable(f, self.shape(), &cells, &self.coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::global;
    use crate::selector;
    use crate::strategy::sample_variable;

    #[test]
    fn test_expand_dims_front() {
        let v = sample_variable();
        let res = expand_dims(&v, ["altitude"]).unwrap();
        assert_eq!(res.shape(), &[1, 3, 3]);
        assert_eq!(res.dimension(), &Dimension::new(["altitude", "abscissa", "ordinate"]).unwrap());
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(res.element(&[0, i, j]).unwrap(), v.element(&[i, j]).unwrap());
            }
        }
        assert_eq!(res.element(&[0, 2, 0]).unwrap(), Some(7.0));
        assert!(res.element(&[1, 0, 0]).is_err());
        assert!(res.coordinate().is_expanded("altitude"));
    }

    #[test]
    fn test_expand_dims_at() {
        let v = sample_variable();
        let res = expand_dims_at(&v, [("time", 3), ("altitude", 1)]).unwrap();
        assert_eq!(
            res.dimension(),
            &Dimension::new(["abscissa", "altitude", "ordinate", "time"]).unwrap()
        );
        assert_eq!(res.shape(), &[3, 1, 3, 1]);
        assert_eq!(res.element(&[2, 0, 1, 0]).unwrap(), Some(8.0));
        assert_eq!(
            res.select(&selector!(altitude = 0, abscissa = "d", ordinate = 2, time = 0))
                .unwrap(),
            Some(8.0)
        );
        assert!(res.select(&selector!(altitude = 1)).is_err());
        assert_eq!(
            res.iselect(&ISelector::new().with("abscissa", 1).with("ordinate", 2))
                .unwrap(),
            Some(6.0)
        );
        assert_eq!(
            res.locate([Label::from("a"), Label::from(0), Label::from(1), Label::from(0)])
                .unwrap(),
            Some(1.0)
        );
    }

    #[test]
    fn test_expand_errors() {
        let v = sample_variable();
        assert!(matches!(
            expand_dims(&v, ["abscissa"]),
            Err(FrameError::DimensionExists { .. })
        ));
        assert!(matches!(
            expand_dims(&v, ["time", "time"]),
            Err(FrameError::DuplicateDimension { .. })
        ));
    }

    #[test]
    fn test_materialize_expanded() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let v = sample_variable();
        let res = expand_dims(&v, ["band"]).unwrap();
        let w = Variable::from_expr(&res).unwrap();
        assert_eq!(w.shape(), &[1, 3, 3]);
        assert_eq!(w.coordinate().get("band").unwrap().len(), 1);
        assert_eq!(w.element(&[0, 1, 2]).unwrap(), Some(6.0));
    }

    #[test]
    fn test_display() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let v = Variable::from_vec(
            vec![Some(1), None],
            crate::coordinate!(x = ["p", "q"]).unwrap(),
            Dimension::new(["x"]).unwrap(),
        )
        .unwrap();
        let res = expand_dims(&v, ["y"]).unwrap();
        assert_eq!(
            res.to_string(),
            "{{  1, N/A}}\nCoordinates:\nx: (p, q, )\ny: (0, )\n"
        );
    }
}
