use std::collections::{btree_map, BTreeMap, HashMap};
use std::iter::Rev;

use crate::JobRecord;

/// Job records accumulated during one session, newest first.
///
/// `index` maps a `public_id` to the arrival sequence of its latest ingest;
/// `by_arrival` holds the records keyed by that sequence. Re-ingesting an id
/// moves it to the front instead of duplicating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobResultSet {
    index: HashMap<String, u64>,
    by_arrival: BTreeMap<u64, JobRecord>,
    next_seq: u64,
}

impl JobResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record` at the front, replacing any record with the same id.
    pub fn ingest(&mut self, record: JobRecord) -> Records<'_> {
        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(previous) = self.index.insert(record.public_id.clone(), seq) {
            self.by_arrival.remove(&previous);
        }
        self.by_arrival.insert(seq, record);
        self.iter()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.by_arrival.clear();
        self.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.by_arrival.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_arrival.is_empty()
    }

    pub fn get(&self, public_id: &str) -> Option<&JobRecord> {
        self.index
            .get(public_id)
            .and_then(|seq| self.by_arrival.get(seq))
    }

    pub fn iter(&self) -> Records<'_> {
        Records {
            inner: self.by_arrival.values().rev(),
        }
    }

    /// Lazy view of the records matching `filter`. Does not mutate the set.
    pub fn filter<'a>(&'a self, filter: &'a JobFilter) -> Filtered<'a> {
        Filtered {
            records: self.iter(),
            filter,
        }
    }
}

impl<'a> IntoIterator for &'a JobResultSet {
    type Item = &'a JobRecord;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Newest-first iterator over a [`JobResultSet`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    inner: Rev<btree_map::Values<'a, u64, JobRecord>>,
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a JobRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Records<'_> {}

/// Case-insensitive substring match on title and location.
/// An empty needle matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    title: String,
    location: String,
}

impl JobFilter {
    pub fn new(title: &str, location: &str) -> Self {
        Self {
            title: title.to_lowercase(),
            location: location.to_lowercase(),
        }
    }

    pub fn matches(&self, record: &JobRecord) -> bool {
        record.title.to_lowercase().contains(&self.title)
            && record.location.to_lowercase().contains(&self.location)
    }
}

/// Restartable filtered view; clone it to iterate again.
#[derive(Debug, Clone)]
pub struct Filtered<'a> {
    records: Records<'a>,
    filter: &'a JobFilter,
}

impl<'a> Iterator for Filtered<'a> {
    type Item = &'a JobRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.records.find(|record| filter.matches(record))
    }
}
