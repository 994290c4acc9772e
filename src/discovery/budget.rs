//! Item budget threaded through a discovery run

/// Soft ceiling on items fetched. Checked between units of work, so a page
/// already fetched is always kept whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    limit: usize,
    consumed: usize,
}

impl Budget {
    pub fn new(limit: usize) -> Self {
        Self { limit, consumed: 0 }
    }

    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    pub fn charge(&mut self, items: usize) {
        self.consumed = self.consumed.saturating_add(items);
    }

    pub fn is_exhausted(&self) -> bool {
        self.consumed >= self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.consumed)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}
