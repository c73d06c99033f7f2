//! Mapping between linear slice indices and positions in the dimensions beyond the plane.
//!
//! Dimension 2 varies fastest, so index `i` of a stack with higher dims `[a, b]` is
//! `(i % a, i / a)`.

use crate::error::{Result, StackError};

/// Number of slices addressed by `dims`; 1 for a plain 2-D volume. `None` if the count
/// does not fit in `usize`.
pub fn slice_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

pub(crate) fn checked_slice_count(dims: &[usize]) -> Result<usize> {
    slice_count(dims).ok_or_else(|| StackError::InvalidShape {
        shape: dims.to_vec(),
        reason: "slice count overflows usize".into(),
    })
}

/// Decomposes `index` into one component per entry of `dims`.
pub fn to_coordinate(index: usize, dims: &[usize]) -> Result<Vec<i64>> {
    let len = checked_slice_count(dims)?;
    if index >= len {
        return Err(StackError::OutOfRange {
            index: index as i64,
            len,
        });
    }
    let mut rest = index;
    Ok(dims
        .iter()
        .map(|&d| {
            let c = rest % d;
            rest /= d;
            c as i64
        })
        .collect())
}

/// Inverse of [`to_coordinate`].
pub fn to_index(coordinate: &[i64], dims: &[usize]) -> Result<usize> {
    let len = checked_slice_count(dims)?;
    if coordinate.len() != dims.len() {
        return Err(StackError::InvalidShape {
            shape: dims.to_vec(),
            reason: format!("coordinate {:?} has the wrong length", coordinate),
        });
    }
    coordinate.iter().zip(dims).rev().try_fold(0usize, |acc, (&c, &d)| {
        if c < 0 || c as usize >= d {
            Err(StackError::OutOfRange { index: c, len })
        } else {
            Ok(acc * d + c as usize)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use std::collections::HashSet;

    #[test]
    fn test_dimension_two_varies_fastest() {
        assert_eq!(to_coordinate(0, &[3, 2]).unwrap(), vec![0, 0]);
        assert_eq!(to_coordinate(1, &[3, 2]).unwrap(), vec![1, 0]);
        assert_eq!(to_coordinate(4, &[3, 2]).unwrap(), vec![1, 1]);
        assert_eq!(to_coordinate(5, &[3, 2]).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_bijection_over_cartesian_product() {
        for dims in [vec![5], vec![3, 2], vec![2, 1, 4], vec![1, 1], vec![4, 3, 2, 2]] {
            let len = slice_count(&dims).unwrap();
            let coords = (0..len).map(|i| to_coordinate(i, &dims).unwrap()).collect::<Vec<_>>();

            let unique = coords.iter().cloned().collect::<HashSet<_>>();
            assert_eq!(unique.len(), len, "not injective for {:?}", dims);

            let product = dims
                .iter()
                .map(|&d| 0..d as i64)
                .multi_cartesian_product()
                .collect::<HashSet<_>>();
            assert_eq!(unique, product, "image differs from product for {:?}", dims);

            for (i, c) in coords.iter().enumerate() {
                assert_eq!(to_index(c, &dims).unwrap(), i);
            }
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            to_coordinate(6, &[3, 2]),
            Err(StackError::OutOfRange { index: 6, len: 6 })
        ));
        assert!(matches!(to_index(&[3, 0], &[3, 2]), Err(StackError::OutOfRange { .. })));
        assert!(matches!(to_index(&[-1, 0], &[3, 2]), Err(StackError::OutOfRange { .. })));
    }

    #[test]
    fn test_no_higher_dims_is_a_single_slice() {
        assert_eq!(slice_count(&[]), Some(1));
        assert_eq!(to_coordinate(0, &[]).unwrap(), Vec::<i64>::new());
        assert!(to_coordinate(1, &[]).is_err());
    }

    #[test]
    fn test_overflowing_slice_count() {
        let dims = [usize::MAX / 2, 3];
        assert_eq!(slice_count(&dims), None);
        assert!(matches!(to_coordinate(0, &dims), Err(StackError::InvalidShape { .. })));
        assert!(matches!(to_index(&[0, 0], &dims), Err(StackError::InvalidShape { .. })));
        assert_eq!(slice_count(&[0, usize::MAX]), Some(0));
    }
}
