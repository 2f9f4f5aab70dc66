/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Property-based generators for axes, coordinates and variables,
//! and the fixed sample variable shared by unit tests.
//!
//! Labels are drawn from a small pool of integers and strings so that
//! independently generated axes overlap often enough to exercise the
//! join paths.
//!
//! This module is only included in test builds (`#[cfg(test)]`).

use proptest::prelude::*;
use proptest::sample::subsequence;

use crate::Axis;
use crate::Coordinate;
use crate::Dimension;
use crate::Label;
use crate::Variable;

const DIMENSION_NAMES: [&str; 5] = ["abscissa", "ordinate", "altitude", "time", "band"];

fn label_pool() -> Vec<Label> {
    (0..8)
        .map(Label::from)
        .chain(["a", "b", "c", "d", "e", "f", "g", "h"].map(Label::from))
        .collect()
}

/// Generates up to `max_len` unique labels, in random order.
pub fn gen_labels(max_len: usize) -> impl Strategy<Value = Vec<Label>> {
    let pool = label_pool();
    let max_len = max_len.min(pool.len());
    subsequence(pool, 0..=max_len).prop_shuffle()
}

/// Generates an [`Axis`] of up to `max_len` labels.
pub fn gen_axis(max_len: usize) -> impl Strategy<Value = Axis> {
    gen_labels(max_len).prop_map(Axis::from_unique)
}

/// Generates a [`Coordinate`] of 1 to `max_dims` dimensions, each with
/// up to `max_len` labels.
pub fn gen_coordinate(max_dims: usize, max_len: usize) -> impl Strategy<Value = Coordinate> {
    let max_dims = max_dims.clamp(1, DIMENSION_NAMES.len());
    subsequence(DIMENSION_NAMES.to_vec(), 1..=max_dims).prop_flat_map(move |names| {
        prop::collection::vec(gen_axis(max_len), names.len()).prop_map(move |axes| {
            let mut coordinate = Coordinate::default();
            for (name, axis) in names.iter().zip(axes) {
                coordinate.insert(*name, axis);
            }
            coordinate
        })
    })
}

/// Generates a [`Variable`] of 1 to `max_dims` non-empty dimensions
/// with random, occasionally missing, integer data. Dimension order is
/// shuffled relative to coordinate order.
pub fn gen_variable(max_dims: usize, max_len: usize) -> impl Strategy<Value = Variable<i64>> {
    let max_len = max_len.max(1);
    let max_dims = max_dims.clamp(1, DIMENSION_NAMES.len());
    subsequence(DIMENSION_NAMES.to_vec(), 1..=max_dims)
        .prop_shuffle()
        .prop_flat_map(move |names| {
            prop::collection::vec(1..=max_len, names.len()).prop_flat_map(move |sizes| {
                let len: usize = sizes.iter().product();
                let names = names.clone();
                prop::collection::vec(prop::option::weighted(0.9, -100i64..100), len).prop_map(
                    move |data| {
                        let mut coordinate = Coordinate::default();
                        for (name, &size) in names.iter().zip(&sizes) {
                            coordinate.insert(*name, Axis::default_axis(size));
                        }
                        let dimension = Dimension::new(&names).unwrap();
                        Variable::from_vec(data, coordinate, dimension).unwrap()
                    },
                )
            })
        })
}

/// The 3x3 variable used throughout the unit tests:
///
/// ```text
/// {{  1,   2, N/A},
///  {N/A,   5,   6},
///  {  7,   8,   9}}
/// abscissa: (a, c, d, )
/// ordinate: (1, 2, 4, )
/// ```
pub fn sample_variable() -> Variable<f64> {
    let coordinate = crate::coordinate!(abscissa = ["a", "c", "d"], ordinate = [1, 2, 4]).unwrap();
    let dimension = Dimension::new(["abscissa", "ordinate"]).unwrap();
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
        coordinate,
        dimension,
    )
    .unwrap()
}
