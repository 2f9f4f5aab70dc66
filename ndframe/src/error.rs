/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::label::Label;
use crate::slice::SliceError;

/// The type of error for labeled lookups, view construction and
/// assignment.
///
/// Strict (inner-join) operations report misalignment through this
/// type. Outer-join operations never produce an error for an absent
/// label; they return the missing value instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    #[error("unknown dimension `{name}`")]
    UnknownDimension { name: String },

    #[error("label `{label}` not found in axis")]
    UnknownLabel { label: Label },

    #[error("position {position} out of range for axis of size {size}")]
    PositionOutOfRange { position: usize, size: usize },

    #[error("duplicate label `{label}` in axis")]
    DuplicateLabel { label: Label },

    #[error("duplicate dimension `{name}`")]
    DuplicateDimension { name: String },

    #[error("build_index_slice forbidden for squeeze")]
    SqueezeSlice,

    #[error("cannot reindex dimension `{name}`: not in the base coordinate")]
    ReindexUnknownDimension { name: String },

    #[error("cannot expand dimension `{name}`: already in the base coordinate")]
    DimensionExists { name: String },

    #[error("Incompatible dimensions of expressions")]
    IncompatibleDimensions,

    #[error("shape mismatch: expected {expected} elements, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    IncompatibleShape {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("expected {expected} indices, got {got}")]
    IndexArity { expected: usize, got: usize },

    #[error("cannot compare labels `{left}` and `{right}` of different kinds")]
    LabelTypeMismatch { left: Label, right: Label },

    #[error(transparent)]
    Slice(#[from] SliceError),
}

impl FrameError {
    pub(crate) fn unknown_dimension(name: &str) -> Self {
        FrameError::UnknownDimension {
            name: name.to_string(),
        }
    }
}
