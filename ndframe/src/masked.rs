/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Predicate-masked views.
//!
//! [`mask_where`] evaluates an [`AxisPredicate`] once at every position
//! of a variable and keeps the result as a boolean mask. Reads through
//! the view return [`Masked::Masked`] where the predicate was false;
//! writes skip those positions, leaving the base untouched there.
//!
//! ```ignore
//! let mut masked = mask_where(&mut var, &axis("ordinate").lt(6))?;
//! masked.fill(5.2)?; // only positions with ordinate < 6 change
//! ```

use std::fmt;
use std::ops::Deref;
use std::ops::DerefMut;

use crate::coordinate::Coordinate;
use crate::coordinate::Join;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::expression::Expression;
use crate::label::Label;
use crate::predicate::AxisPredicate;
use crate::selector::ISelector;
use crate::selector::Locator;
use crate::selector::Selector;
use crate::tensor::Tensor;
use crate::value::Masked;
use crate::variable::Variable;

/// A variable seen through a boolean mask. `true` marks a visible
/// position.
#[derive(Debug)]
pub struct MaskedView<B> {
    base: B,
    mask: Tensor<bool>,
}

/// Masks `base` with `predicate`, evaluated at the labels of every
/// position.
pub fn mask_where<T, B, P>(base: B, predicate: &P) -> Result<MaskedView<B>, FrameError>
where
    B: Deref<Target = Variable<T>>,
    P: AxisPredicate + ?Sized,
{
    let mut mask = Tensor::filled(base.shape().to_vec(), false);
    for index in mask.indices() {
        let selector = Selector::from_index(base.coordinate(), base.dimension(), &index)?;
        *mask.element_mut(&index)? = predicate.evaluate(&selector)?;
    }
    tracing::debug!(
        visible = mask.iter().filter(|&&visible| visible).count(),
        total = mask.len(),
        "masked view"
    );
    Ok(MaskedView { base, mask })
}

impl<T, B> MaskedView<B>
where
    B: Deref<Target = Variable<T>>,
{
    pub fn base(&self) -> &Variable<T> {
        &self.base
    }

    pub fn mask(&self) -> &Tensor<bool> {
        &self.mask
    }

    pub fn coordinate<'a>(&'a self) -> &'a Coordinate
    where
        T: 'a,
    {
        self.base.coordinate()
    }

    pub fn dimension<'a>(&'a self) -> &'a Dimension
    where
        T: 'a,
    {
        self.base.dimension()
    }

    pub fn shape<'a>(&'a self) -> &'a [usize]
    where
        T: 'a,
    {
        self.base.shape()
    }

    /// Whether position `index` is visible.
    pub fn is_visible(&self, index: &[usize]) -> Result<bool, FrameError> {
        self.mask.element(index).copied()
    }
}

impl<T: Clone, B> MaskedView<B>
where
    B: Deref<Target = Variable<T>>,
{
    pub fn element(&self, index: &[usize]) -> Result<Masked<Option<T>>, FrameError> {
        if self.is_visible(index)? {
            Ok(Masked::Visible(self.base.element(index)?))
        } else {
            Ok(Masked::Masked)
        }
    }

    pub fn locate<L: Into<Label>>(
        &self,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Masked<Option<T>>, FrameError> {
        self.locate_element(&Locator::new(labels))
    }

    pub fn locate_element(&self, locator: &Locator) -> Result<Masked<Option<T>>, FrameError> {
        let index = locator.get_index(self.coordinate(), self.dimension())?;
        self.element(&index)
    }

    pub fn select(&self, selector: &Selector) -> Result<Masked<Option<T>>, FrameError> {
        self.select_with(Join::Inner, selector)
    }

    /// With [`Join::Outer`], a label the base lacks reads as visible and
    /// missing.
    pub fn select_with(
        &self,
        join: Join,
        selector: &Selector,
    ) -> Result<Masked<Option<T>>, FrameError> {
        match join {
            Join::Inner => {
                let index = selector.get_index(self.coordinate(), self.dimension())?;
                self.element(&index)
            }
            Join::Outer => match selector.get_outer_index(self.coordinate(), self.dimension()) {
                (index, true) => self.element(&index),
                (_, false) => Ok(Masked::Visible(None)),
            },
        }
    }

    pub fn iselect(&self, selector: &ISelector) -> Result<Masked<Option<T>>, FrameError> {
        self.element(&selector.get_index(self.dimension()))
    }
}

impl<T: Clone, B> MaskedView<B>
where
    B: DerefMut<Target = Variable<T>>,
{
    /// Sets every visible element to `value`.
    pub fn fill(&mut self, value: T) -> Result<(), FrameError> {
        for index in self.mask.indices() {
            if *self.mask.element(&index)? {
                *self.base.get_mut(&index)? = Some(value.clone());
            }
        }
        Ok(())
    }

    /// Writes `expr`, read at the labels of every visible position.
    ///
    /// Every value is read before the first write, so a failed lookup
    /// leaves the base unchanged.
    pub fn assign<E>(&mut self, expr: &E) -> Result<(), FrameError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        let tmp = Variable::from_expr(expr)?;
        let mut writes = Vec::new();
        for index in self.mask.indices() {
            if !*self.mask.element(&index)? {
                continue;
            }
            let selector =
                Selector::from_index(self.base.coordinate(), self.base.dimension(), &index)?;
            let value = tmp.select(&selector)?;
            writes.push((index, value));
        }
        for (index, value) in writes {
            *self.base.get_mut(&index)? = value;
        }
        Ok(())
    }
}

impl<T: fmt::Display + Clone, B> fmt::Display for MaskedView<B>
where
    B: Deref<Target = Variable<T>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cells = Vec::with_capacity(self.mask.len());
        for index in self.mask.indices() {
            cells.push(self.element(&index).map_err(|_| fmt::Error)?.to_string());
        }
        crate::pretty::fmt_variable(f, self.shape(), &cells, self.coordinate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::global;
    use crate::expression::Scalar;
    use crate::predicate::axis;
    use crate::selector;

    fn variable() -> Variable<f64> {
        Variable::from_vec(
            vec![
                Some(1.0),
                Some(2.0),
                None,
                None,
                Some(5.0),
                Some(6.0),
                Some(7.0),
                Some(8.0),
                Some(9.0),
            ],
            crate::coordinate!(abscissa = ["a", "c", "d"], ordinate = [1, 4, 6]).unwrap(),
            Dimension::new(["abscissa", "ordinate"]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_masked_reads() {
        let v = variable();
        let masked = mask_where(&v, &axis("ordinate").lt(6)).unwrap();
        assert_eq!(
            masked.iselect(&ISelector::new().with("abscissa", 0).with("ordinate", 2))
                .unwrap(),
            Masked::Masked
        );
        assert_eq!(masked.element(&[0, 1]).unwrap(), Masked::Visible(Some(2.0)));
        // Missing and masked stay distinct.
        assert_eq!(masked.element(&[1, 0]).unwrap(), Masked::Visible(None));
        assert_eq!(
            masked.select(&selector!(abscissa = "d", ordinate = 6)).unwrap(),
            Masked::Masked
        );
        assert_eq!(
            masked.locate([Label::from("d"), Label::from(4)]).unwrap(),
            Masked::Visible(Some(8.0))
        );
        assert_eq!(
            masked.select_with(Join::Outer, &selector!(abscissa = "b"))
                .unwrap(),
            Masked::Visible(None)
        );
        assert!(masked.select(&selector!(abscissa = "b")).is_err());
    }

    #[test]
    fn test_masked_fill() {
        let mut v = variable();
        {
            let mut masked = mask_where(&mut v, &axis("ordinate").lt(6)).unwrap();
            masked.fill(5.2).unwrap();
            assert_eq!(masked.shape(), &[3, 3]);
            assert_eq!(masked.dimension(), &Dimension::new(["abscissa", "ordinate"]).unwrap());
            assert!(masked.coordinate().contains("ordinate"));
            assert_eq!(masked.element(&[1, 0]).unwrap(), Masked::Visible(Some(5.2)));
            assert!(masked.element(&[1, 2]).unwrap().is_masked());
        }
        for row in 0..3 {
            assert_eq!(v.element(&[row, 0]).unwrap(), Some(5.2));
            assert_eq!(v.element(&[row, 1]).unwrap(), Some(5.2));
        }
        assert_eq!(v.element(&[0, 2]).unwrap(), None);
        assert_eq!(v.element(&[2, 2]).unwrap(), Some(9.0));
    }

    #[test]
    fn test_masked_assign() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let mut v = variable();
        let source = v.clone();
        let doubled = Variable::from_expr(&(&source * 2.0)).unwrap();
        {
            let cond = axis("abscissa").equal("c") | axis("ordinate").equal(6);
            let mut masked = mask_where(&mut v, &cond).unwrap();
            masked.assign(&doubled).unwrap();
        }
        assert_eq!(v.element(&[1, 1]).unwrap(), Some(10.0));
        assert_eq!(v.element(&[2, 2]).unwrap(), Some(18.0));
        assert_eq!(v.element(&[0, 0]).unwrap(), Some(1.0));

        let mut masked = mask_where(&mut v, &|s: &Selector| s.get("abscissa") == Some(&Label::from("a"))).unwrap();
        masked.assign(&Scalar(0.0)).unwrap();
        assert_eq!(v.element(&[0, 2]).unwrap(), Some(0.0));
        assert_eq!(v.element(&[1, 0]).unwrap(), None);
    }

    #[test]
    fn test_failed_assign_leaves_base_unchanged() {
        let mut v = variable();
        let before = v.clone();
        let partial = Variable::from_vec(
            vec![Some(7.0), Some(7.0)],
            crate::coordinate!(abscissa = ["a", "c"]).unwrap(),
            Dimension::new(["abscissa"]).unwrap(),
        )
        .unwrap();
        {
            let mut masked = mask_where(&mut v, &axis("ordinate").lt(6)).unwrap();
            assert!(matches!(
                masked.assign(&partial),
                Err(FrameError::UnknownLabel { .. })
            ));
        }
        assert_eq!(v, before);
    }

    #[test]
    fn test_predicate_errors_surface() {
        let v = variable();
        assert!(matches!(
            mask_where(&v, &axis("ordinate").lt("x")),
            Err(FrameError::LabelTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_display() {
        let lock = global::lock();
        let _guard = lock.override_config(Config::default());
        let v = variable();
        let masked = mask_where(&v, &axis("ordinate").lt(6)).unwrap();
        assert_eq!(
            masked.to_string(),
            "{{     1,      2, masked},\n {   N/A,      5, masked},\n {     7,      8, masked}}\nCoordinates:\nabscissa: (a, c, d, )\nordinate: (1, 4, 6, )\n"
        );
    }
}
