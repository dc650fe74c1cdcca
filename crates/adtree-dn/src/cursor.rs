/// A cursor for character-by-character DN scanning with position tracking.
///
/// Positions are byte offsets into the input, so error reports can point at
/// the exact place the scan stopped.
#[derive(Clone)]
pub(crate) struct Cursor<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Returns the current byte offset.
    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    /// Advances by one character, returning the consumed character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Consumes a two-hex-digit escape body if one starts here.
    ///
    /// Nothing is consumed unless both digits are present.
    pub fn hex_byte(&mut self) -> Option<u8> {
        let digits = self.s.as_bytes().get(self.i..self.i + 2)?;
        let hi = (digits[0] as char).to_digit(16)?;
        let lo = (digits[1] as char).to_digit(16)?;
        self.i += 2;
        Some((hi * 16 + lo) as u8)
    }
}
