//! Cursor-based matchers for sentence bodies
//!
//! Every matcher consumes a [`Cursor`] and returns the advanced cursor (plus
//! the matched value, where there is one) or `None`. Chaining matchers with
//! `?` gives a small parser without backtracking: the first failing step
//! aborts the whole decode.
//!
//! ```rust
//! use tini_protocol::matcher::Cursor;
//!
//! fn clock(input: &str) -> Option<(u32, u32)> {
//!     let (c, hour) = Cursor::new(input).unsigned()?;
//!     let (c, minute) = c.char(':')?.unsigned()?;
//!     c.eos()?;
//!     Some((hour, minute))
//! }
//!
//! assert_eq!(clock("12:34"), Some((12, 34)));
//! assert_eq!(clock("12-34"), None);
//! ```

/// A position within an input string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `input`
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Unconsumed input
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn advance(self, n: usize) -> Self {
        Self {
            input: self.input,
            pos: self.pos + n,
        }
    }

    /// Match a single character
    pub fn char(self, c: char) -> Option<Self> {
        self.rest()
            .starts_with(c)
            .then(|| self.advance(c.len_utf8()))
    }

    /// Match a literal string
    pub fn literal(self, s: &str) -> Option<Self> {
        self.rest().starts_with(s).then(|| self.advance(s.len()))
    }

    /// Match exactly `n` decimal digits
    pub fn digits(self, n: usize) -> Option<(Self, u32)> {
        let field = self.rest().as_bytes().get(..n)?;
        let value = accumulate(field)?;
        Some((self.advance(n), value))
    }

    /// Match one or more decimal digits
    ///
    /// Fails if the value does not fit in a `u32`.
    pub fn unsigned(self) -> Option<(Self, u32)> {
        let len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if len == 0 {
            return None;
        }
        let value = accumulate(&self.rest().as_bytes()[..len])?;
        Some((self.advance(len), value))
    }

    /// Match any one character of `set`, returning the character matched
    pub fn one_of(self, set: &str) -> Option<(Self, char)> {
        let c = self.rest().chars().next()?;
        set.contains(c).then(|| (self.advance(c.len_utf8()), c))
    }

    /// Capture text up to `delim`
    ///
    /// With `consume` the delimiter is required and skipped. Without it the
    /// cursor stops on the delimiter, and a missing delimiter captures the
    /// remaining input.
    pub fn until(self, delim: char, consume: bool) -> Option<(Self, String)> {
        let rest = self.rest();
        match rest.find(delim) {
            Some(end) => {
                let next = if consume { end + delim.len_utf8() } else { end };
                Some((self.advance(next), rest[..end].to_string()))
            }
            None if consume => None,
            None => Some((self.advance(rest.len()), rest.to_string())),
        }
    }

    /// Capture the remaining input
    pub fn until_end(self) -> (Self, String) {
        let rest = self.rest();
        (self.advance(rest.len()), rest.to_string())
    }

    /// Skip to a CR, which must be followed by LF
    pub fn until_eol(self) -> Option<Self> {
        let cr = self.rest().find('\r')?;
        self.advance(cr + 1).char('\n')
    }

    /// Match the end of input
    pub fn eos(self) -> Option<Self> {
        self.rest().is_empty().then_some(self)
    }
}

fn accumulate(digits: &[u8]) -> Option<u32> {
    digits.iter().try_fold(0u32, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn test_char_and_literal() {
        let c = Cursor::new("PBRSNP,x");
        let c = c.literal("PBRSNP").unwrap().char(',').unwrap();
        assert_eq!(c.rest(), "x");
        assert!(c.char(',').is_none());
        assert!(Cursor::new("PBR").literal("PBRSNP").is_none());
    }

    #[test]
    fn test_fixed_width_digits() {
        let (c, v) = Cursor::new("123456").digits(2).unwrap();
        assert_eq!(v, 12);
        assert_eq!(c.position(), 2);

        assert!(Cursor::new("1a3456").digits(2).is_none());
        assert!(Cursor::new("1").digits(2).is_none());
    }

    #[test]
    fn test_unsigned() {
        let (c, v) = Cursor::new("0042,").unsigned().unwrap();
        assert_eq!(v, 42);
        assert_eq!(c.rest(), ",");

        assert!(Cursor::new(",1").unsigned().is_none());
        assert!(Cursor::new("99999999999").unsigned().is_none());
    }

    #[test]
    fn test_one_of() {
        let (c, matched) = Cursor::new("HFDTE").one_of("BH").unwrap();
        assert_eq!(matched, 'H');
        assert_eq!(c.rest(), "FDTE");
        assert!(Cursor::new("A").one_of("BH").is_none());
        assert!(Cursor::new("").one_of("BH").is_none());
    }

    #[test]
    fn test_until() {
        let (c, s) = Cursor::new("5020,Pilot").until(',', true).unwrap();
        assert_eq!(s, "5020");
        assert_eq!(c.rest(), "Pilot");

        let (c, s) = Cursor::new("5020,Pilot").until(',', false).unwrap();
        assert_eq!(s, "5020");
        assert_eq!(c.rest(), ",Pilot");

        assert!(Cursor::new("no delimiter").until(',', true).is_none());
        let (c, s) = Cursor::new("no delimiter").until(',', false).unwrap();
        assert_eq!(s, "no delimiter");
        assert!(c.eos().is_some());
    }

    #[test]
    fn test_until_eol() {
        let c = Cursor::new("B1234\r\nrest").until_eol().unwrap();
        assert_eq!(c.rest(), "rest");
        assert!(Cursor::new("B1234\n").until_eol().is_none());
        assert!(Cursor::new("B1234\rX").until_eol().is_none());
    }

    #[test]
    fn test_failure_short_circuits() {
        let parsed = (|| {
            let c = Cursor::new("AB").char('X')?;
            c.char('B')
        })();
        assert!(parsed.is_none());
    }
}
