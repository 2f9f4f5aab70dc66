/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Text rendering of variables.
//!
//! Elements are printed as nested braces, one level per dimension,
//! each cell right-aligned to the widest cell. The coordinate follows:
//!
//! ```text
//! {{  1,   2, N/A},
//!  {N/A,   5,   6},
//!  {  7,   8,   9}}
//! Coordinates:
//! abscissa: (a, c, d, )
//! ordinate: (1, 2, 4, )
//! ```

use std::fmt;

/// Writes `cells` (row-major, of shape `shape`) followed by
/// `coordinate`.
pub(crate) fn fmt_variable(
    f: &mut fmt::Formatter<'_>,
    shape: &[usize],
    cells: &[String],
    coordinate: &dyn fmt::Display,
) -> fmt::Result {
    let width = cells.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    fmt_block(f, shape, cells, width, 0)?;
    write!(f, "\nCoordinates:\n{}", coordinate)
}

fn fmt_block(
    f: &mut fmt::Formatter<'_>,
    shape: &[usize],
    cells: &[String],
    width: usize,
    depth: usize,
) -> fmt::Result {
    let Some((&len, rest)) = shape.split_first() else {
        return match cells.first() {
            Some(cell) => write!(f, "{:>width$}", cell),
            None => Ok(()),
        };
    };
    let stride: usize = rest.iter().product();
    f.write_str("{")?;
    for i in 0..len {
        if i > 0 {
            if rest.is_empty() {
                f.write_str(", ")?;
            } else {
                write!(f, ",\n{:indent$}", "", indent = depth + 1)?;
            }
        }
        let start = i * stride;
        let block = cells.get(start..start + stride).unwrap_or(&[]);
        fmt_block(f, rest, block, width, depth + 1)?;
    }
    f.write_str("}")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rendered<'a> {
        shape: &'a [usize],
        cells: Vec<String>,
    }

    impl fmt::Display for Rendered<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt_variable(f, self.shape, &self.cells, &"x: (0, )\n")
        }
    }

    fn render(shape: &[usize], cells: &[&str]) -> String {
        Rendered {
            shape,
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
        .to_string()
    }

    #[test]
    fn test_one_dimensional() {
        assert_eq!(
            render(&[3], &["1", "22", "N/A"]),
            "{  1,  22, N/A}\nCoordinates:\nx: (0, )\n"
        );
    }

    #[test]
    fn test_three_dimensional() {
        let cells = ["1", "2", "3", "4", "5", "6", "7", "8"];
        assert_eq!(
            render(&[2, 2, 2], &cells),
            "{{{1, 2},\n  {3, 4}},\n {{5, 6},\n  {7, 8}}}\nCoordinates:\nx: (0, )\n"
        );
    }

    #[test]
    fn test_degenerate_shapes() {
        assert_eq!(render(&[], &["7"]), "7\nCoordinates:\nx: (0, )\n");
        assert_eq!(render(&[0], &[]), "{}\nCoordinates:\nx: (0, )\n");
        assert_eq!(render(&[2, 0], &[]), "{{},\n {}}\nCoordinates:\nx: (0, )\n");
    }
}
