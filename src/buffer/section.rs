use std::ops::Range;

use crate::binxml::ReaderQuotas;

/// One closed section: a byte range of the buffer plus the quotas its
/// reader will enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    offset: usize,
    len: usize,
    quotas: ReaderQuotas,
}

impl Section {
    pub(crate) fn new(offset: usize, len: usize, quotas: ReaderQuotas) -> Self {
        Self {
            offset,
            len,
            quotas,
        }
    }

    /// Byte offset of the section in the sealed buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Quotas captured when the section was opened.
    #[inline]
    pub fn quotas(&self) -> &ReaderQuotas {
        &self.quotas
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}
