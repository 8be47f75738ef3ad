//! Newline-delimited text assembly for byte streams

use heapless::{String, Vec};

/// Collects bytes into lines of at most `N` bytes.
///
/// `\r` is dropped, so both `\n` and `\r\n` endings work. A line that
/// overflows is discarded up to its terminating newline and reported once as
/// an error.
pub struct LineBuffer<const N: usize> {
    buf: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed one byte. Returns a line when `byte` completes one.
    pub fn push(&mut self, byte: u8) -> Option<Result<String<N>, &'static str>> {
        match byte {
            b'\n' => {
                let line = if self.overflowed {
                    Err("line too long")
                } else {
                    String::from_utf8(self.buf.clone()).map_err(|_| "line is not UTF-8")
                };
                self.buf.clear();
                self.overflowed = false;
                Some(line)
            }
            b'\r' => None,
            _ => {
                if !self.overflowed && self.buf.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }

    /// Bytes buffered for the current, unterminated line
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Line = Result<std::string::String, &'static str>;

    fn ok(text: &str) -> Line {
        Ok(text.into())
    }

    fn err(reason: &'static str) -> Line {
        Err(reason)
    }

    fn feed<const N: usize>(
        lines: &mut LineBuffer<N>,
        bytes: &[u8],
    ) -> std::vec::Vec<Line> {
        bytes
            .iter()
            .filter_map(|&b| lines.push(b))
            .map(|line| line.map(|s| std::string::String::from(s.as_str())))
            .collect()
    }

    #[test]
    fn test_splits_on_newline() {
        let mut lines = LineBuffer::<32>::new();
        let out = feed(&mut lines, b"lights on\nlights off\n");
        assert_eq!(out, [ok("lights on"), ok("lights off")]);
        assert_eq!(lines.pending(), 0);
    }

    #[test]
    fn test_crlf_endings() {
        let mut lines = LineBuffer::<32>::new();
        let out = feed(&mut lines, b"lights on\r\n");
        assert_eq!(out, [ok("lights on")]);
    }

    #[test]
    fn test_partial_line_is_kept() {
        let mut lines = LineBuffer::<32>::new();
        assert!(feed(&mut lines, b"lig").is_empty());
        assert_eq!(lines.pending(), 3);
        assert_eq!(feed(&mut lines, b"hts on\n"), [ok("lights on")]);
    }

    #[test]
    fn test_overflow_discards_whole_line() {
        let mut lines = LineBuffer::<4>::new();
        let out = feed(&mut lines, b"toolong\nok\n");
        assert_eq!(out, [err("line too long"), ok("ok")]);
    }

    #[test]
    fn test_line_of_exactly_capacity() {
        let mut lines = LineBuffer::<4>::new();
        let out = feed(&mut lines, b"abcd\nabcde\nok\n");
        assert_eq!(out, [ok("abcd"), err("line too long"), ok("ok")]);
    }

    #[test]
    fn test_invalid_utf8() {
        let mut lines = LineBuffer::<8>::new();
        let out = feed(&mut lines, &[0xFF, 0xFE, b'\n']);
        assert_eq!(out, [err("line is not UTF-8")]);
    }
}
