//! The three size metrics reported for every tree node.

use crate::utils::config::GZIP_LEVEL;
use flate2::{Compression, GzBuilder};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::iter::Sum;
use std::ops::Add;

/// Declared, measured and compressed size of one node
///
/// `parsed_size` is `None` when no source text was found, which is different
/// from `Some(0)` (source found, but empty). `gzip_size` is only ever present
/// alongside `parsed_size`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeTriplet {
    pub stat_size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gzip_size: Option<u64>,
}

impl SizeTriplet {
    /// Only the declared size is known
    pub fn declared(stat_size: u64) -> Self {
        Self {
            stat_size,
            parsed_size: None,
            gzip_size: None,
        }
    }

    /// Declared size plus sizes measured from the emitted source text
    pub fn measured(stat_size: u64, source: &str) -> Self {
        Self {
            stat_size,
            parsed_size: Some(source.len() as u64),
            gzip_size: gzip_size(source),
        }
    }

    /// Share of an owner's measured sizes, proportional to declared size
    ///
    /// Used for modules merged into a concatenated module, whose own emitted
    /// text no longer exists separately.
    pub fn estimated_from(stat_size: u64, owner: &SizeTriplet) -> Self {
        let share = |total: u64| {
            if owner.stat_size == 0 {
                0
            } else {
                (total as u128 * stat_size as u128 / owner.stat_size as u128) as u64
            }
        };

        Self {
            stat_size,
            parsed_size: owner.parsed_size.map(share),
            gzip_size: owner.gzip_size.map(share),
        }
    }
}

impl Add for SizeTriplet {
    type Output = SizeTriplet;

    fn add(self, other: SizeTriplet) -> SizeTriplet {
        SizeTriplet {
            stat_size: self.stat_size + other.stat_size,
            parsed_size: sum_optional(self.parsed_size, other.parsed_size),
            gzip_size: sum_optional(self.gzip_size, other.gzip_size),
        }
    }
}

impl Sum for SizeTriplet {
    fn sum<I: Iterator<Item = SizeTriplet>>(iter: I) -> SizeTriplet {
        iter.fold(SizeTriplet::default(), Add::add)
    }
}

impl<'a> Sum<&'a SizeTriplet> for SizeTriplet {
    fn sum<I: Iterator<Item = &'a SizeTriplet>>(iter: I) -> SizeTriplet {
        iter.copied().sum()
    }
}

/// Sum of two optional sizes: present when either side is present
///
/// An absent side contributes nothing; it never turns a present side into
/// absent, and two absent sides stay absent.
pub fn sum_optional(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Gzip-compressed length of `src` at the fixed compression level
///
/// The header carries no timestamp or file name, so equal input always
/// compresses to equal bytes.
pub fn gzip_size(src: &str) -> Option<u64> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::new(), Compression::new(GZIP_LEVEL));

    encoder.write_all(src.as_bytes()).ok()?;
    let compressed = encoder.finish().ok()?;

    Some(compressed.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_optional() {
        assert_eq!(sum_optional(Some(2), Some(3)), Some(5));
        assert_eq!(sum_optional(Some(2), None), Some(2));
        assert_eq!(sum_optional(None, Some(3)), Some(3));
        assert_eq!(sum_optional(None, None), None);
    }

    #[test]
    fn test_declared_has_no_measurements() {
        let size = SizeTriplet::declared(24);
        assert_eq!(size.stat_size, 24);
        assert_eq!(size.parsed_size, None);
        assert_eq!(size.gzip_size, None);
    }

    #[test]
    fn test_empty_source_is_not_absent() {
        let size = SizeTriplet::measured(10, "");
        assert_eq!(size.parsed_size, Some(0));
        assert!(size.gzip_size.is_some());
    }

    #[test]
    fn test_measured_counts_utf8_bytes() {
        let size = SizeTriplet::measured(0, "ü€");
        assert_eq!(size.parsed_size, Some(5));
    }

    #[test]
    fn test_gzip_is_deterministic() {
        let src = "function add(a, b) { return a + b; }".repeat(20);
        assert_eq!(gzip_size(&src), gzip_size(&src));
        assert!(gzip_size(&src).unwrap() < src.len() as u64);
    }

    #[test]
    fn test_sum_of_triplets() {
        let total: SizeTriplet = [
            SizeTriplet::declared(5),
            SizeTriplet {
                stat_size: 10,
                parsed_size: Some(7),
                gzip_size: Some(4),
            },
        ]
        .iter()
        .sum();

        assert_eq!(total.stat_size, 15);
        assert_eq!(total.parsed_size, Some(7));
        assert_eq!(total.gzip_size, Some(4));
    }

    #[test]
    fn test_estimated_from_owner() {
        let owner = SizeTriplet {
            stat_size: 200,
            parsed_size: Some(100),
            gzip_size: Some(41),
        };

        let share = SizeTriplet::estimated_from(50, &owner);
        assert_eq!(share.parsed_size, Some(25));
        assert_eq!(share.gzip_size, Some(10));

        let unmeasured = SizeTriplet::estimated_from(50, &SizeTriplet::declared(200));
        assert_eq!(unmeasured.parsed_size, None);
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let json = serde_json::to_string(&SizeTriplet::declared(3)).unwrap();
        assert_eq!(json, r#"{"statSize":3}"#);
    }
}
