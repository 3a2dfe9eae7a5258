//! Ordered token sets passed between cascade rounds.
//!
//! On disk a set is newline-delimited text, one token per line. Reading skips
//! empty lines and strips a trailing `\r`, so files written on any platform
//! load the same. Writing refuses any token that would not read back as
//! itself, since a lost or split line shifts every later offset.

use crate::error::{CascadeError, Result};
use std::io::{BufRead, Write};

/// Order-preserving sequence of tokens.
///
/// The order is significant: a token's position in a round is its offset in
/// that round's input set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionSet {
    tokens: Vec<Vec<u8>>,
}

impl CollisionSet {
    /// Empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Empty set with room for `capacity` tokens.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tokens: Vec::with_capacity(capacity),
        }
    }

    /// Append a token.
    pub fn push<T: AsRef<[u8]> + ?Sized>(&mut self, token: &T) {
        self.tokens.push(token.as_ref().to_vec());
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `offset`.
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<&[u8]> {
        self.tokens.get(offset).map(Vec::as_slice)
    }

    /// Tokens in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.tokens.iter().map(Vec::as_slice)
    }

    /// Take the tokens out.
    #[must_use]
    pub fn into_inner(self) -> Vec<Vec<u8>> {
        self.tokens
    }

    /// Read newline-delimited tokens.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Io`](crate::error::CascadeError::Io) if the
    /// reader fails.
    pub fn read_lines<R: BufRead>(reader: R) -> Result<Self> {
        let mut set = Self::new();
        for line in reader.split(b'\n') {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if !line.is_empty() {
                set.tokens.push(line);
            }
        }
        Ok(set)
    }

    /// Write tokens one per line. Nothing is written if any token fails
    /// [`is_line_safe`].
    ///
    /// # Errors
    ///
    /// - [`CascadeError::UnwritableToken`] for the first token that would not
    ///   read back unchanged
    /// - [`CascadeError::Io`] if the writer fails
    pub fn write_lines<W: Write>(&self, mut writer: W) -> Result<()> {
        if let Some(offset) = self.tokens.iter().position(|t| !is_line_safe(t)) {
            return Err(CascadeError::unwritable_token(offset));
        }
        for token in &self.tokens {
            writer.write_all(token)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// True if `token` survives [`CollisionSet::write_lines`] followed by
/// [`CollisionSet::read_lines`]: non-empty, no `\n`, no trailing `\r`.
#[must_use]
pub fn is_line_safe(token: &[u8]) -> bool {
    !token.is_empty() && !token.contains(&b'\n') && token.last() != Some(&b'\r')
}

impl<T: AsRef<[u8]>> FromIterator<T> for CollisionSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(|t| t.as_ref().to_vec()).collect(),
        }
    }
}

impl<T: AsRef<[u8]>> Extend<T> for CollisionSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tokens
            .extend(iter.into_iter().map(|t| t.as_ref().to_vec()));
    }
}
