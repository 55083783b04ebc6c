use std::collections::{HashMap, VecDeque};

use engine::Campaign;

/// Bounded least-recently-used campaign cache.
///
/// A plain map plus a recency queue: front is the coldest tenant, back the
/// hottest. Every hit, insert and refresh moves the tenant to the back, so
/// eviction always removes the genuinely least-recently-used entry.
#[derive(Debug)]
pub(crate) struct LruCache {
    capacity: usize,
    entries: HashMap<u64, Campaign>,
    recency: VecDeque<u64>,
}

impl LruCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    fn touch(&mut self, id: u64) {
        self.recency.retain(|&entry| entry != id);
        self.recency.push_back(id);
    }

    pub(crate) fn get(&mut self, id: u64) -> Option<&Campaign> {
        if !self.entries.contains_key(&id) {
            return None;
        }
        self.touch(id);
        self.entries.get(&id)
    }

    pub(crate) fn insert(&mut self, campaign: Campaign) {
        let id = campaign.id;
        self.entries.insert(id, campaign);
        self.touch(id);

        while self.entries.len() > self.capacity {
            let Some(coldest) = self.recency.pop_front() else {
                break;
            };
            self.entries.remove(&coldest);
        }
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.remove(&id);
        self.recency.retain(|&entry| entry != id);
    }
}
