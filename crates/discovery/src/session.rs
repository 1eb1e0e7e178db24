use std::collections::HashSet;

use crate::ResolvedItem;

/// Per-call search state, created fresh by every `find_item`.
#[derive(Debug, Default)]
pub(crate) struct Session {
    rank: u32,
    counted: usize,
    probed: HashSet<String>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rank(&self) -> u32 {
        self.rank
    }

    /// Advances to the next tier. The rank only moves when the tiers since
    /// the last move contributed items.
    pub(crate) fn next_tier(&mut self, produced: usize) {
        if produced > self.counted {
            self.rank += 1;
            self.counted = produced;
        }
    }

    pub(crate) fn was_probed(&self, key: &str) -> bool {
        self.probed.contains(key)
    }

    /// Records the directories a scan visited and hands back its items.
    pub(crate) fn commit(&mut self, scan: Scan) -> Vec<ResolvedItem> {
        self.probed.extend(scan.probed);
        scan.items
    }
}

/// Outcome of probing a set of directories without touching the session.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    pub(crate) items: Vec<ResolvedItem>,
    pub(crate) probed: Vec<String>,
}

impl Scan {
    pub(crate) fn visited(&self, key: &str) -> bool {
        self.probed.iter().any(|p| p == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_moves_only_after_productive_tiers() {
        let mut s = Session::new();
        assert_eq!(s.rank(), 0);
        s.next_tier(0);
        assert_eq!(s.rank(), 0);
        s.next_tier(2);
        assert_eq!(s.rank(), 1);
        s.next_tier(2);
        assert_eq!(s.rank(), 1);
        s.next_tier(3);
        assert_eq!(s.rank(), 2);
    }

    #[test]
    fn commit_records_probed_directories() {
        let mut s = Session::new();
        let scan = Scan {
            items: Vec::new(),
            probed: vec!["/a/snippets".into()],
        };
        assert!(!s.was_probed("/a/snippets"));
        s.commit(scan);
        assert!(s.was_probed("/a/snippets"));
    }
}
