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

/// A key of an [`Axis`](crate::Axis).
///
/// Labels form a closed set of scalar kinds. They compare and hash by
/// value; labels of different kinds are never equal.
///
/// Deriving `Ord` is sound because every payload is `Ord`; ordering
/// across kinds follows declaration order and is only used to keep
/// maps deterministic, never to compare user data.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize
)]
pub enum Label {
    Int(i64),
    Char(char),
    Str(String),
}

impl Label {
    /// The string payload, if this is a string label.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer label.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Label::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Whether `self` and `other` hold the same kind of payload.
    pub fn same_kind(&self, other: &Label) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{}", i),
            Label::Char(c) => write!(f, "{}", c),
            Label::Str(s) => write!(f, "{}", s),
        }
    }
}

macro_rules! label_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Label {
                fn from(value: $t) -> Self {
                    Label::Int(value as i64)
                }
            }
        )*
    };
}

label_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<usize> for Label {
    type Error = std::num::TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Ok(Label::Int(i64::try_from(value)?))
    }
}

impl From<char> for Label {
    fn from(value: char) -> Self {
        Label::Char(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

impl From<&Label> for Label {
    fn from(value: &Label) -> Self {
        value.clone()
    }
}
