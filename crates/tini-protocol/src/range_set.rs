//! Track selection lists
//!
//! A list is a comma-separated sequence of items:
//!
//! - `N`: the single number N
//! - `N-M`: N through M inclusive
//! - `N-`: N and everything above
//! - `-M`: everything up to M
//! - `-`: everything
//!
//! ```rust
//! use tini_protocol::RangeSet;
//!
//! let set: RangeSet = "2,4-6,8-".parse().unwrap();
//! assert!(set.contains(5));
//! assert!(!set.contains(7));
//! ```

use std::str::FromStr;

use crate::error::RangeSetError;
use crate::matcher::Cursor;

/// Inclusive interval, `None` meaning unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub first: Option<u32>,
    pub last: Option<u32>,
}

impl Interval {
    /// Whether `n` lies within the interval
    pub fn contains(&self, n: u32) -> bool {
        self.first.map_or(true, |first| first <= n) && self.last.map_or(true, |last| n <= last)
    }
}

/// Union of intervals parsed from one or more selection lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    intervals: Vec<Interval>,
}

impl RangeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `expression` and add its intervals to the set
    ///
    /// The set is left unchanged if the expression is malformed.
    pub fn merge(&mut self, expression: &str) -> Result<(), RangeSetError> {
        let parsed = parse_list(expression).ok_or_else(|| RangeSetError {
            expression: expression.to_string(),
        })?;
        self.intervals.extend(parsed);
        Ok(())
    }

    /// Whether any interval contains `n`
    pub fn contains(&self, n: u32) -> bool {
        self.intervals.iter().any(|interval| interval.contains(n))
    }

    /// The parsed intervals, in input order
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Whether the set has no intervals
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

impl FromStr for RangeSet {
    type Err = RangeSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = RangeSet::new();
        set.merge(s)?;
        Ok(set)
    }
}

fn parse_list(expression: &str) -> Option<Vec<Interval>> {
    let mut intervals = Vec::new();
    let mut c = Cursor::new(expression);
    while c.eos().is_none() {
        while let Some(next) = c.char(',') {
            c = next;
        }
        let (next, interval) = parse_item(c)?;
        intervals.push(interval);
        c = next;
    }
    Some(intervals)
}

fn parse_item(c: Cursor<'_>) -> Option<(Cursor<'_>, Interval)> {
    let (c, first) = match c.unsigned() {
        Some((c, n)) => (c, Some(n)),
        None => (c, None),
    };
    let (c, last) = match c.char('-') {
        Some(c) if at_item_end(c) => (c, None),
        Some(c) => {
            let (c, n) = c.unsigned()?;
            (c, Some(n))
        }
        // a bare item needs its number
        None => (c, Some(first?)),
    };
    at_item_end(c).then_some((c, Interval { first, last }))
}

fn at_item_end(c: Cursor<'_>) -> bool {
    c.eos().is_some() || c.rest().starts_with(',')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(first: Option<u32>, last: Option<u32>) -> Interval {
        Interval { first, last }
    }

    #[test]
    fn test_parse_items() {
        let set: RangeSet = "2,4-6,8-,-3,-".parse().unwrap();
        assert_eq!(
            set.intervals(),
            &[
                interval(Some(2), Some(2)),
                interval(Some(4), Some(6)),
                interval(Some(8), None),
                interval(None, Some(3)),
                interval(None, None),
            ]
        );
    }

    #[test]
    fn test_membership() {
        let set: RangeSet = "2,4-6,8-".parse().unwrap();
        for n in [2, 4, 5, 6, 8, 100] {
            assert!(set.contains(n), "{} should be included", n);
        }
        for n in [0, 1, 3, 7] {
            assert!(!set.contains(n), "{} should be excluded", n);
        }
    }

    #[test]
    fn test_open_below() {
        let set: RangeSet = "-3".parse().unwrap();
        assert!(set.contains(0));
        assert!(set.contains(3));
        assert!(!set.contains(4));
    }

    #[test]
    fn test_everything() {
        let set: RangeSet = "-".parse().unwrap();
        assert!(set.contains(0));
        assert!(set.contains(u32::MAX));
    }

    #[test]
    fn test_empty_expression_is_empty_set() {
        let set: RangeSet = "".parse().unwrap();
        assert!(set.is_empty());
        assert!(!set.contains(1));
    }

    #[test]
    fn test_leading_and_repeated_commas() {
        let set: RangeSet = ",,1,,3".parse().unwrap();
        assert_eq!(set.intervals().len(), 2);
        assert!(set.contains(3));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let set: RangeSet = "6-4".parse().unwrap();
        assert!((0..10).all(|n| !set.contains(n)));
    }

    #[test]
    fn test_malformed_lists() {
        for expr in ["a", "1,", ",", "1-2-3", "1 2", "1-x", "--", "3x", "1,,"] {
            let err = expr.parse::<RangeSet>().unwrap_err();
            assert_eq!(err.expression, expr);
        }
    }

    #[test]
    fn test_merge_accumulates_and_is_atomic() {
        let mut set = RangeSet::new();
        set.merge("1").unwrap();
        set.merge("5-6").unwrap();
        assert!(set.merge("7,x").is_err());
        assert_eq!(set.intervals().len(), 2);
        assert!(set.contains(1));
        assert!(set.contains(6));
        assert!(!set.contains(7));
    }
}
