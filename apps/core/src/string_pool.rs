use std::cmp::Ordering;

/// Candidate strings from one source, stored back-to-back in a single
/// buffer with a sorted index of spans into it. Batch builders call
/// [`StringPool::sort`] once after all inserts; single insertions after
/// that go through [`StringPool::insert_sorted`].
///
/// All comparisons are byte-wise and case-sensitive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringPool {
    buffer: String,
    index: Vec<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    offset: usize,
    len: usize,
}

fn entry(buffer: &str, span: Span) -> &str {
    &buffer[span.offset..span.offset + span.len]
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sorted pool from an unordered batch of strings.
    pub fn from_unsorted<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pool = Self::new();
        for item in items {
            pool.add(item.as_ref());
        }
        pool.sort();
        pool
    }

    /// Appends without re-sorting; the index is unordered until the next
    /// [`StringPool::sort`].
    pub fn add(&mut self, value: &str) {
        let offset = self.buffer.len();
        self.buffer.push_str(value);
        self.index.push(Span {
            offset,
            len: value.len(),
        });
    }

    pub fn sort(&mut self) {
        let buffer = &self.buffer;
        self.index
            .sort_by(|a, b| entry(buffer, *a).cmp(entry(buffer, *b)));
    }

    /// Inserts a single string at its sorted position. The index must
    /// already be sorted.
    pub fn insert_sorted(&mut self, value: &str) {
        let offset = self.buffer.len();
        self.buffer.push_str(value);
        let span = Span {
            offset,
            len: value.len(),
        };
        let position = match self.search(|existing| existing.cmp(value)) {
            Ok(position) | Err(position) => position,
        };
        self.index.insert(position, span);
    }

    /// Exact-match lookup over the sorted index.
    pub fn contains(&self, value: &str) -> bool {
        self.search(|existing| existing.cmp(value)).is_ok()
    }

    /// Binary search with a caller-supplied comparator, mirroring
    /// `slice::binary_search_by` over the referenced strings.
    pub fn search<'a, F>(&'a self, mut compare: F) -> Result<usize, usize>
    where
        F: FnMut(&'a str) -> Ordering,
    {
        let buffer = &self.buffer;
        self.index
            .binary_search_by(|span| compare(entry(buffer, *span)))
    }

    pub fn get(&self, position: usize) -> &str {
        entry(&self.buffer, self.index[position])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.index.iter().map(|span| entry(&self.buffer, *span))
    }
}
