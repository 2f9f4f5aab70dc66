/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;

/// A value read through a masked view: either visible, or hidden by
/// the view's predicate.
///
/// Masked is distinct from missing: a masked read of a missing element
/// is `Masked::Visible(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Masked<T> {
    Visible(T),
    Masked,
}

impl<T> Masked<T> {
    pub fn is_masked(&self) -> bool {
        matches!(self, Masked::Masked)
    }

    /// The visible value, if any.
    pub fn visible(self) -> Option<T> {
        match self {
            Masked::Visible(v) => Some(v),
            Masked::Masked => None,
        }
    }

    pub fn as_ref(&self) -> Masked<&T> {
        match self {
            Masked::Visible(v) => Masked::Visible(v),
            Masked::Masked => Masked::Masked,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Masked<U> {
        match self {
            Masked::Visible(v) => Masked::Visible(f(v)),
            Masked::Masked => Masked::Masked,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Masked<Option<T>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = crate::config::global::get();
        match self {
            Masked::Visible(Some(v)) => write!(f, "{}", v),
            Masked::Visible(None) => f.write_str(&config.missing_repr),
            Masked::Masked => f.write_str(&config.masked_repr),
        }
    }
}
