use super::error::ArrayError;
use super::header::Header;

/// A frame sequence needs a frame axis plus at least two image axes
pub const MIN_SEQUENCE_RANK: usize = 3;

#[inline]
pub fn validate_rank(shape: &[usize]) -> Result<(), ArrayError> {
    if shape.len() < MIN_SEQUENCE_RANK {
        return Err(ArrayError::Rank {
            shape: shape.to_vec(),
        });
    }
    Ok(())
}

#[inline]
pub fn validate_data_len(header: &Header, available: usize) -> Result<(), ArrayError> {
    let expected = header
        .shape
        .iter()
        .try_fold(header.dtype.element.size(), |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| ArrayError::header("shape is too large"))?;

    if available < expected {
        return Err(ArrayError::Truncated {
            expected,
            found: available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_validate_rank() {
        assert!(validate_rank(&[1, 2, 3]).is_ok());
        assert!(validate_rank(&[1, 2, 3, 3]).is_ok());
        assert_matches!(validate_rank(&[2, 3]), Err(ArrayError::Rank { shape }) if shape == vec![2, 3]);
        assert_matches!(validate_rank(&[]), Err(ArrayError::Rank { .. }));
    }

    #[test]
    fn test_validate_data_len() {
        let header = Header {
            dtype: "<u2".parse().unwrap(),
            fortran_order: false,
            shape: vec![2, 2, 2],
        };
        assert!(validate_data_len(&header, 16).is_ok());
        assert!(validate_data_len(&header, 20).is_ok());
        assert_matches!(
            validate_data_len(&header, 15),
            Err(ArrayError::Truncated { expected: 16, found: 15 })
        );

        let huge = Header {
            shape: vec![usize::MAX, 2, 2],
            ..header
        };
        assert_matches!(validate_data_len(&huge, 0), Err(ArrayError::MalformedHeader(_)));
    }
}
