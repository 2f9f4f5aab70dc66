/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Restricted views of a variable.
//!
//! A [`VariableView`] shows a variable through one restriction per
//! dimension. A dimension is either *sliced* (kept, showing a subset of
//! its positions through an [`IndexSlice`]) or *squeezed* (fixed at a
//! single position and removed from the view). Nothing is copied: the
//! view maps its own index onto an index of the base and reads there.
//!
//! Views are built with the free functions of this module:
//!
//! - [`select`] takes `(name, AxisSlice)` pairs (label domain);
//! - [`iselect`] takes `(name, DynamicSlice)` pairs (position domain);
//! - [`locate`] and [`ilocate`] take one slice per dimension, in
//!   dimension order; missing trailing slices mean "all".
//!
//! A view over `&Variable` reads; a view over `&mut Variable` can
//! also be filled or assigned to.

use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;

use crate::axis::Axis;
use crate::axis::slice::AxisSlice;
use crate::axis::slice::DynamicSlice;
use crate::axis::slice::IndexSlice;
use crate::axis::view::AxisView;
use crate::coordinate::Coordinate;
use crate::coordinate::Join;
use crate::coordinate::TrivialBroadcast;
use crate::coordinate::view::CoordinateView;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::expression::Expression;
use crate::function::IntoOperand;
use crate::function::Operand;
use crate::label::Label;
use crate::selector::ISelector;
use crate::selector::Locator;
use crate::selector::Selector;
use crate::slice::CartesianIterator;
use crate::variable::Variable;

/// What a view keeps of one base dimension.
#[derive(Debug, Clone, PartialEq)]
enum Restriction {
    Sliced(IndexSlice),
    Squeezed(usize),
}

/// A variable seen through per-dimension slices and squeezes.
///
/// `B` is the handle on the base: `&Variable<T>` for read-only views,
/// `&mut Variable<T>` for writable ones.
#[derive(Debug)]
pub struct VariableView<B> {
    base: B,
    coordinate: CoordinateView,
    dimension: Dimension,
    /// One entry per base dimension, in base dimension order.
    restrictions: Vec<Restriction>,
    shape: Vec<usize>,
}

impl<T, B> VariableView<B>
where
    B: Deref<Target = Variable<T>>,
{
    fn build(base: B, restrictions: Vec<Restriction>) -> Result<Self, FrameError> {
        let mut axes = Vec::new();
        let mut names = Vec::new();
        let mut squeezed = Vec::new();
        for (name, restriction) in base.dimension().names().zip(&restrictions) {
            match restriction {
                Restriction::Sliced(slice) => {
                    let axis = base.coordinate().get(name)?.clone();
                    axes.push((name.to_string(), AxisView::new(axis, slice.clone())));
                    names.push(name.to_string());
                }
                Restriction::Squeezed(position) => squeezed.push((name.to_string(), *position)),
            }
        }
        if !squeezed.is_empty() {
            tracing::debug!(?squeezed, "variable view squeezes dimensions");
        }
        let coordinate = CoordinateView::new(axes)?;
        let dimension = Dimension::new(&names)?;
        let shape = names
            .iter()
            .map(|name| coordinate.get(name).map(AxisView::len))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            base,
            coordinate,
            dimension,
            restrictions,
            shape,
        })
    }

    /// The restriction-free view of `base`.
    pub fn full(base: B) -> Result<Self, FrameError> {
        let restrictions = base
            .shape()
            .iter()
            .map(|&size| Restriction::Sliced(IndexSlice::All { size }))
            .collect();
        Self::build(base, restrictions)
    }

    pub fn base(&self) -> &Variable<T> {
        &self.base
    }

    /// The view's coordinate. Squeezed dimensions are absent.
    pub fn coordinate(&self) -> &CoordinateView {
        &self.coordinate
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps a view index onto the base index it reads.
    fn base_index(&self, index: &[usize]) -> Result<Vec<usize>, FrameError> {
        if index.len() != self.dimension.len() {
            return Err(FrameError::IndexArity {
                expected: self.dimension.len(),
                got: index.len(),
            });
        }
        let mut next = 0;
        self.restrictions
            .iter()
            .map(|restriction| match restriction {
                Restriction::Squeezed(position) => Ok(*position),
                Restriction::Sliced(slice) => {
                    let position = index[next];
                    next += 1;
                    slice.get(position).ok_or(FrameError::PositionOutOfRange {
                        position,
                        size: slice.len(),
                    })
                }
            })
            .collect()
    }

    /// A reference to the element at view index `index`.
    pub fn get(&self, index: &[usize]) -> Result<&Option<T>, FrameError> {
        let index = self.base_index(index)?;
        self.base.get(&index)
    }
}

impl<T: Clone, B> VariableView<B>
where
    B: Deref<Target = Variable<T>>,
{
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

    /// The element at the labels of `selector`, looked up in the view's
    /// coordinate. Labels the view hides fail.
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

impl<T: Clone, B> VariableView<B>
where
    B: DerefMut<Target = Variable<T>>,
{
    pub fn get_mut(&mut self, index: &[usize]) -> Result<&mut Option<T>, FrameError> {
        let index = self.base_index(index)?;
        self.base.get_mut(&index)
    }

    /// Sets every element the view shows to `value`.
    pub fn fill(&mut self, value: T) -> Result<(), FrameError> {
        for index in CartesianIterator::new(self.shape.clone()) {
            *self.get_mut(&index)? = Some(value.clone());
        }
        Ok(())
    }

    /// Writes `expr` into the elements the view shows.
    ///
    /// `expr` is materialised first, then read at the labels of every
    /// view position. Dimensions `expr` lacks are broadcast; labels it
    /// lacks fail, and the base is left unchanged.
    pub fn assign<E>(&mut self, expr: &E) -> Result<(), FrameError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        let tmp = Variable::from_expr(expr)?;
        let mut writes = Vec::with_capacity(self.len());
        for index in CartesianIterator::new(self.shape.clone()) {
            let selector = Selector::from_index(&self.coordinate, &self.dimension, &index)?;
            let value = tmp.select(&selector)?;
            writes.push((index, value));
        }
        for (index, value) in writes {
            *self.get_mut(&index)? = value;
        }
        Ok(())
    }
}

impl<T: Clone, B> Expression for VariableView<B>
where
    B: Deref<Target = Variable<T>>,
{
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
        VariableView::element(self, index)
    }
}

impl<'a, T, B> IntoOperand<'a, T> for &'a VariableView<B>
where
    T: Clone + 'a,
    B: Deref<Target = Variable<T>> + 'a,
{
    fn into_operand(self) -> Operand<'a, T> {
        Box::new(self)
    }
}

impl<T: fmt::Display + Clone, B> fmt::Display for VariableView<B>
where
    B: Deref<Target = Variable<T>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = crate::config::global::get().missing_repr;
        let mut cells = Vec::with_capacity(self.len());
        for index in CartesianIterator::new(self.shape.clone()) {
            cells.push(match self.get(&index).map_err(|_| fmt::Error)? {
                Some(v) => v.to_string(),
                None => missing.clone(),
            });
        }
        crate::pretty::fmt_variable(f, &self.shape, &cells, &self.coordinate)
    }
}

fn label_restriction(axis: &Axis, slice: &AxisSlice) -> Result<Restriction, FrameError> {
    match slice.get_squeeze() {
        Some(label) => Ok(Restriction::Squeezed(axis.get(label)?)),
        None => Ok(Restriction::Sliced(slice.build_index_slice(axis)?)),
    }
}

fn position_restriction(size: usize, slice: &DynamicSlice) -> Result<Restriction, FrameError> {
    match slice.get_squeeze() {
        Some(position) if position < size => Ok(Restriction::Squeezed(position)),
        Some(position) => Err(FrameError::PositionOutOfRange { position, size }),
        None => Ok(Restriction::Sliced(slice.normalize(size)?)),
    }
}

/// Restrictions for `variable` with every dimension unrestricted.
fn unrestricted<T>(variable: &Variable<T>) -> Vec<Restriction> {
    variable
        .shape()
        .iter()
        .map(|&size| Restriction::Sliced(IndexSlice::All { size }))
        .collect()
}

/// A view of `base` restricted by label-domain slices. Dimensions not
/// named are kept whole.
pub fn select<T, B, S>(
    base: B,
    slices: impl IntoIterator<Item = (S, AxisSlice)>,
) -> Result<VariableView<B>, FrameError>
where
    B: Deref<Target = Variable<T>>,
    S: AsRef<str>,
{
    let mut restrictions = unrestricted(&base);
    for (name, slice) in slices {
        let name = name.as_ref();
        let dim = base.dimension().get(name)?;
        let axis = base.coordinate().get(name)?;
        restrictions[dim] = label_restriction(axis, &slice)?;
    }
    VariableView::build(base, restrictions)
}

/// A view of `base` restricted by position-domain slices. Dimensions
/// not named are kept whole.
pub fn iselect<T, B, S>(
    base: B,
    slices: impl IntoIterator<Item = (S, DynamicSlice)>,
) -> Result<VariableView<B>, FrameError>
where
    B: Deref<Target = Variable<T>>,
    S: AsRef<str>,
{
    let mut restrictions = unrestricted(&base);
    for (name, slice) in slices {
        let dim = base.dimension().get(name.as_ref())?;
        restrictions[dim] = position_restriction(base.shape()[dim], &slice)?;
    }
    VariableView::build(base, restrictions)
}

/// A view of `base` restricted by one label-domain slice per
/// dimension, in dimension order.
pub fn locate<T, B>(base: B, slices: Vec<AxisSlice>) -> Result<VariableView<B>, FrameError>
where
    B: Deref<Target = Variable<T>>,
{
    if slices.len() > base.ndim() {
        return Err(FrameError::IndexArity {
            expected: base.ndim(),
            got: slices.len(),
        });
    }
    let mut restrictions = unrestricted(&base);
    for (dim, (name, slice)) in base.dimension().names().zip(&slices).enumerate() {
        restrictions[dim] = label_restriction(base.coordinate().get(name)?, slice)?;
    }
    VariableView::build(base, restrictions)
}

/// A view of `base` restricted by one position-domain slice per
/// dimension, in dimension order.
pub fn ilocate<T, B>(base: B, slices: Vec<DynamicSlice>) -> Result<VariableView<B>, FrameError>
where
    B: Deref<Target = Variable<T>>,
{
    if slices.len() > base.ndim() {
        return Err(FrameError::IndexArity {
            expected: base.ndim(),
            got: slices.len(),
        });
    }
    let mut restrictions = unrestricted(&base);
    for (dim, slice) in slices.iter().enumerate() {
        restrictions[dim] = position_restriction(base.shape()[dim], slice)?;
    }
    VariableView::build(base, restrictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::global;
    use crate::expression::Scalar;
    use crate::function::Function;
    use crate::selector;
    use crate::strategy::sample_variable;

    #[test]
    fn test_select_range_and_squeeze() {
        let v = sample_variable();
        let view = select(
            &v,
            [
                ("abscissa", AxisSlice::range("c", "d")),
                ("ordinate", AxisSlice::squeeze(2)),
            ],
        )
        .unwrap();
        assert_eq!(view.shape(), &[2]);
        assert_eq!(view.dimension(), &Dimension::new(["abscissa"]).unwrap());
        assert_eq!(view.element(&[0]).unwrap(), Some(5.0));
        assert_eq!(view.element(&[1]).unwrap(), Some(8.0));
        assert_eq!(view.coordinate().get("abscissa").unwrap().to_string(), "(c, d, )");
        assert!(!view.coordinate().contains("ordinate"));
        assert_eq!(view.select(&selector!(abscissa = "d")).unwrap(), Some(8.0));
        // `a` is outside the view.
        assert!(view.select(&selector!(abscissa = "a")).is_err());
        assert_eq!(
            view.select_with(Join::Outer, &selector!(abscissa = "a"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_view_transparency() {
        let v = sample_variable();
        let view = select(&v, [("ordinate", AxisSlice::keep([4, 1]))]).unwrap();
        assert_eq!(view.shape(), &[3, 2]);
        for index in CartesianIterator::new(view.shape().to_vec()) {
            let s = Selector::from_index(view.coordinate(), view.dimension(), &index).unwrap();
            assert_eq!(view.element(&index).unwrap(), v.select(&s).unwrap());
        }
    }

    #[test]
    fn test_iselect_and_locate() {
        let v = sample_variable();
        let view = iselect(&v, [("ordinate", DynamicSlice::keep([-1, 0]))]).unwrap();
        assert_eq!(view.element(&[2, 0]).unwrap(), Some(9.0));
        assert_eq!(view.element(&[2, 1]).unwrap(), Some(7.0));
        assert_eq!(
            view.iselect(&ISelector::new().with("abscissa", 1)).unwrap(),
            Some(6.0)
        );

        let view = locate(&v, vec![AxisSlice::keep(["d", "a"])]).unwrap();
        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.locate([Label::from("a"), Label::from(2)]).unwrap(), Some(2.0));

        let view = ilocate(&v, vec![DynamicSlice::squeeze(0), DynamicSlice::stepped(0, 3, 2)]).unwrap();
        assert_eq!(view.shape(), &[2]);
        assert_eq!(view.element(&[1]).unwrap(), None);
    }

    #[test]
    fn test_construction_errors() {
        let v = sample_variable();
        assert!(matches!(
            select(&v, [("altitude", AxisSlice::all())]),
            Err(FrameError::UnknownDimension { .. })
        ));
        assert!(matches!(
            select(&v, [("abscissa", AxisSlice::squeeze("b"))]),
            Err(FrameError::UnknownLabel { .. })
        ));
        assert!(matches!(
            iselect(&v, [("abscissa", DynamicSlice::squeeze(3))]),
            Err(FrameError::PositionOutOfRange { .. })
        ));
        assert!(matches!(
            ilocate(&v, vec![DynamicSlice::all(); 3]),
            Err(FrameError::IndexArity {
                expected: 2,
                got: 3
            })
        ));
        let view = VariableView::full(&v).unwrap();
        assert!(matches!(
            view.element(&[0]),
            Err(FrameError::IndexArity { .. })
        ));
        assert!(view.element(&[0, 3]).is_err());
    }

    #[test]
    fn test_fill_through_view() {
        let mut v = sample_variable();
        {
            let mut view = select(&mut v, [("abscissa", AxisSlice::squeeze("c"))]).unwrap();
            view.fill(0.0).unwrap();
        }
        assert_eq!(v.element(&[1, 0]).unwrap(), Some(0.0));
        assert_eq!(v.element(&[1, 2]).unwrap(), Some(0.0));
        assert_eq!(v.element(&[0, 0]).unwrap(), Some(1.0));
    }

    #[test]
    fn test_assign_through_view() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let mut v = sample_variable();
        let src = Variable::filled(
            crate::coordinate!(abscissa = ["a", "c", "d"], ordinate = [1, 4]).unwrap(),
            Dimension::new(["abscissa", "ordinate"]).unwrap(),
            -1.0,
        )
        .unwrap();
        {
            let mut view = select(&mut v, [("ordinate", AxisSlice::keep([1, 4]))]).unwrap();
            view.assign(&src).unwrap();
        }
        assert_eq!(v.element(&[1, 0]).unwrap(), Some(-1.0));
        assert_eq!(v.element(&[2, 2]).unwrap(), Some(-1.0));
        assert_eq!(v.element(&[2, 1]).unwrap(), Some(8.0));

        {
            let mut view = select(&mut v, [("abscissa", AxisSlice::keep(["a"]))]).unwrap();
            view.assign(&Scalar(3.0)).unwrap();
        }
        assert_eq!(v.element(&[0, 1]).unwrap(), Some(3.0));
    }

    #[test]
    fn test_failed_assign_leaves_base_unchanged() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let mut v = sample_variable();
        let before = v.clone();
        let partial = Variable::filled(
            crate::coordinate!(abscissa = ["a", "c"]).unwrap(),
            Dimension::new(["abscissa"]).unwrap(),
            7.0,
        )
        .unwrap();
        {
            let mut view = VariableView::full(&mut v).unwrap();
            assert!(matches!(
                view.assign(&partial),
                Err(FrameError::UnknownLabel { .. })
            ));
        }
        assert_eq!(v, before);
    }

    #[test]
    fn test_view_in_function() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let v = sample_variable();
        let view = select(&v, [("abscissa", AxisSlice::range("c", "d"))]).unwrap();
        let doubled = Variable::from_expr(&Function::binary(&view, &v, |a: f64, b: f64| a + b)).unwrap();
        // The inner join keeps the rows the view shows.
        assert_eq!(doubled.shape(), &[2, 3]);
        assert_eq!(doubled.select(&selector!(abscissa = "d", ordinate = 4)).unwrap(), Some(18.0));
    }

    #[test]
    fn test_display() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let v = sample_variable();
        let view = select(&v, [("abscissa", AxisSlice::squeeze("c"))]).unwrap();
        assert_eq!(
            view.to_string(),
            "{N/A,   5,   6}\nCoordinates:\nordinate: (1, 2, 4, )\n"
        );
    }
}
