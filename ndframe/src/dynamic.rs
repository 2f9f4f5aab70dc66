/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Type-erased variables.
//!
//! Variables of different element types can be stored together as
//! `Box<dyn DynamicVariable>`. Elements are read back as
//! [`ScalarValue`]s.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::coordinate::Coordinate;
use crate::coordinate::Join;
use crate::dimension::Dimension;
use crate::error::FrameError;
use crate::selector::ISelector;
use crate::selector::Selector;
use crate::variable::Variable;

/// An element of a type-erased variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

macro_rules! scalar_from {
    ($variant:ident: $($t:ty),*) => {
        $(
            impl From<$t> for ScalarValue {
                fn from(value: $t) -> Self {
                    ScalarValue::$variant(value.into())
                }
            }
        )*
    };
}

scalar_from!(Int: i8, i16, i32, i64, u8, u16, u32);
scalar_from!(Float: f32, f64);
scalar_from!(Bool: bool);
scalar_from!(Str: String, &str);

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{}", v),
            ScalarValue::Int(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// The element-type independent part of a [`Variable`].
pub trait DynamicVariable: fmt::Debug {
    fn coordinate(&self) -> &Coordinate;

    fn dimension(&self) -> &Dimension;

    fn shape(&self) -> &[usize];

    /// The element at the labels of `selector`. Strict.
    fn select(&self, selector: &Selector) -> Result<Option<ScalarValue>, FrameError>;

    fn select_with(
        &self,
        join: Join,
        selector: &Selector,
    ) -> Result<Option<ScalarValue>, FrameError>;

    fn iselect(&self, selector: &ISelector) -> Result<Option<ScalarValue>, FrameError>;

    fn clone_box(&self) -> Box<dyn DynamicVariable>;
}

impl<T> DynamicVariable for Variable<T>
where
    T: Clone + Into<ScalarValue> + fmt::Debug + 'static,
{
    fn coordinate(&self) -> &Coordinate {
        Variable::coordinate(self)
    }

    fn dimension(&self) -> &Dimension {
        Variable::dimension(self)
    }

    fn shape(&self) -> &[usize] {
        Variable::shape(self)
    }

    fn select(&self, selector: &Selector) -> Result<Option<ScalarValue>, FrameError> {
        Ok(Variable::select(self, selector)?.map(Into::into))
    }

    fn select_with(
        &self,
        join: Join,
        selector: &Selector,
    ) -> Result<Option<ScalarValue>, FrameError> {
        Ok(Variable::select_with(self, join, selector)?.map(Into::into))
    }

    fn iselect(&self, selector: &ISelector) -> Result<Option<ScalarValue>, FrameError> {
        Ok(Variable::iselect(self, selector)?.map(Into::into))
    }

    fn clone_box(&self) -> Box<dyn DynamicVariable> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn DynamicVariable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
