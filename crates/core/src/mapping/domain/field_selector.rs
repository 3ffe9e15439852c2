use std::str::FromStr;

use super::mapping_error::MappingError;

/// Which whitespace-separated fields of a record to rewrite.
///
/// Syntax: empty (no fields), `i,j,k`, a single index `i`, or a range
/// `start-end` where either bound may be omitted. Range ends are exclusive
/// and a missing end means the record length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    Empty,
    Indices(Vec<usize>),
    Range { start: usize, end: Option<usize> },
}

impl FieldSelector {
    /// Every field of every record.
    pub fn all() -> Self {
        FieldSelector::Range {
            start: 0,
            end: None,
        }
    }

    /// Concrete field indices for a record of `len` fields.
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>, MappingError> {
        match self {
            FieldSelector::Empty => Ok(Vec::new()),
            FieldSelector::Indices(indices) => {
                if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                    return Err(MappingError::FieldOutOfRange { index, len });
                }
                Ok(indices.clone())
            }
            FieldSelector::Range { start, end } => {
                let end = end.unwrap_or(len);
                if end > len {
                    return Err(MappingError::FieldOutOfRange {
                        index: end - 1,
                        len,
                    });
                }
                Ok((*start..end).collect())
            }
        }
    }
}

impl FromStr for FieldSelector {
    type Err = MappingError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let trimmed = spec.trim();
        let invalid = |reason: String| MappingError::InvalidSelector {
            spec: spec.to_string(),
            reason,
        };
        let index = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|e| invalid(format!("{:?}: {e}", s.trim())))
        };

        if trimmed.is_empty() {
            return Ok(FieldSelector::Empty);
        }
        if trimmed.contains(',') {
            let indices = trimmed.split(',').map(|s| index(s)).collect::<Result<_, _>>()?;
            return Ok(FieldSelector::Indices(indices));
        }
        if let Some((start, end)) = trimmed.split_once('-') {
            let start = if start.trim().is_empty() {
                0
            } else {
                index(start)?
            };
            let end = if end.trim().is_empty() {
                None
            } else {
                Some(index(end)?)
            };
            if end.is_some_and(|end| end < start) {
                return Err(invalid("range ends before it starts".to_string()));
            }
            return Ok(FieldSelector::Range { start, end });
        }
        Ok(FieldSelector::Indices(vec![index(trimmed)?]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 5, vec![])]
    #[case("0", 5, vec![0])]
    #[case("0,1", 5, vec![0, 1])]
    #[case("3, 1", 5, vec![3, 1])]
    #[case("2-", 5, vec![2, 3, 4])]
    #[case("12-", 14, vec![12, 13])]
    #[case("-2", 5, vec![0, 1])]
    #[case("1-3", 5, vec![1, 2])]
    #[case("-", 3, vec![0, 1, 2])]
    #[case("4-", 3, vec![])]
    fn test_resolve(#[case] spec: &str, #[case] len: usize, #[case] expected: Vec<usize>) {
        let selector: FieldSelector = spec.parse().unwrap();
        assert_eq!(selector.resolve(len).unwrap(), expected);
    }

    #[rstest]
    #[case("a")]
    #[case("1,x")]
    #[case("3-1")]
    #[case("1-b")]
    fn test_invalid_specs(#[case] spec: &str) {
        assert!(matches!(
            spec.parse::<FieldSelector>(),
            Err(MappingError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_index_past_record_is_out_of_range() {
        let selector: FieldSelector = "0,3".parse().unwrap();
        assert!(matches!(
            selector.resolve(2),
            Err(MappingError::FieldOutOfRange { index: 3, len: 2 })
        ));
    }

    #[test]
    fn test_range_end_past_record_is_out_of_range() {
        let selector: FieldSelector = "0-4".parse().unwrap();
        assert!(matches!(
            selector.resolve(3),
            Err(MappingError::FieldOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_all_covers_every_field() {
        assert_eq!(FieldSelector::all().resolve(2).unwrap(), vec![0, 1]);
    }
}
