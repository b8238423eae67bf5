//! Per-entry-point call counters

use std::collections::BTreeMap;

/// Counts how often each boundary entry point was invoked.
///
/// Keys are the static entry point names, so counting never allocates after
/// the first call of a given name.
#[derive(Debug, Default, Clone)]
pub struct CallCounter {
    calls: BTreeMap<&'static str, usize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: &'static str) {
        *self.calls.entry(entry).or_insert(0) += 1;
    }

    pub fn get(&self, entry: &str) -> usize {
        self.calls.get(entry).copied().unwrap_or(0)
    }

    /// Calls across every entry point.
    pub fn total(&self) -> usize {
        self.calls.values().sum()
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }

    /// Entry points in name order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.calls.iter().map(|(name, count)| (*name, *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_entry_point() {
        let mut counter = CallCounter::new();
        counter.record("transform_get");
        counter.record("transform_get");
        counter.record("entity_has");

        assert_eq!(counter.get("transform_get"), 2);
        assert_eq!(counter.get("entity_has"), 1);
        assert_eq!(counter.get("never_called"), 0);
        assert_eq!(counter.total(), 3);

        let names: Vec<_> = counter.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["entity_has", "transform_get"]);

        counter.reset();
        assert_eq!(counter.total(), 0);
    }
}
