//! Forward-only cursor over token lines.

use super::tokenizer::TokenLine;
use super::types::TlogError;

/// Sequential reader over a slice of token lines.
///
/// Lines handed out borrow the underlying slice, not the cursor, so a caller
/// can keep a line while continuing to advance.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    lines: &'a [TokenLine],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(lines: &'a [TokenLine]) -> Self {
        Self { lines, position: 0 }
    }

    /// True while an unread line remains
    #[inline]
    pub fn has_more(&self) -> bool {
        self.position < self.lines.len()
    }

    /// Index of the next line to be read
    pub fn position(&self) -> usize {
        self.position
    }

    /// Take the next line and advance. Fails once the input is exhausted;
    /// guard with [`Cursor::has_more`].
    pub fn next_line(&mut self) -> Result<&'a TokenLine, TlogError> {
        let line = self
            .lines
            .get(self.position)
            .ok_or(TlogError::CursorExhausted {
                position: self.position,
            })?;
        self.position += 1;
        Ok(line)
    }

    /// Take the next line of a brace block.
    ///
    /// `depth` is the current nesting level; a line holding a `{` token
    /// raises it and a line holding a `}` token lowers it. Returns `None`
    /// once the block is closed or the input runs out. Unterminated blocks
    /// simply end at end of input.
    pub fn next_in_block(
        &mut self,
        depth: &mut usize,
    ) -> Result<Option<&'a TokenLine>, TlogError> {
        if *depth == 0 || !self.has_more() {
            return Ok(None);
        }

        let line = self.next_line()?;
        if line.contains("{") {
            *depth += 1;
        }
        if line.contains("}") {
            *depth = depth.saturating_sub(1);
        }

        Ok(Some(line))
    }

    /// Consume and discard one block whose opening brace was already read
    pub fn skip_block(&mut self) -> Result<usize, TlogError> {
        let mut depth = 1;
        let mut skipped = 0;
        while self.next_in_block(&mut depth)?.is_some() {
            skipped += 1;
        }
        Ok(skipped)
    }
}
