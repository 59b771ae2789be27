// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pass/fail bookkeeping per cut.

/// Raw and weighted pass/fail counts of one cut.
///
/// `n_pass_weighted` accumulates the cumulative weight *after* the cut's own
/// contribution; `n_fail_weighted` accumulates the weight the record arrived
/// with.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CutStats {
    pub n_pass: u64,
    pub n_pass_weighted: f64,
    pub n_fail: u64,
    pub n_fail_weighted: f64,
}

impl CutStats {
    /// Number of records that reached this cut.
    pub fn reached(&self) -> u64 {
        self.n_pass + self.n_fail
    }

    pub fn reached_weighted(&self) -> f64 {
        self.n_pass_weighted + self.n_fail_weighted
    }

    /// Weighted fraction of arriving records that passed.
    pub fn efficiency(&self) -> Option<f64> {
        let total = self.reached_weighted();
        if self.reached() == 0 || total == 0.0 {
            None
        } else {
            Some(self.n_pass_weighted / total)
        }
    }

    pub fn merge(&mut self, other: &CutStats) {
        self.n_pass += other.n_pass;
        self.n_pass_weighted += other.n_pass_weighted;
        self.n_fail += other.n_fail;
        self.n_fail_weighted += other.n_fail_weighted;
    }

    /// `self - other`, or `None` when either raw count would go negative.
    pub fn difference(&self, other: &CutStats) -> Option<CutStats> {
        Some(CutStats {
            n_pass: self.n_pass.checked_sub(other.n_pass)?,
            n_pass_weighted: self.n_pass_weighted - other.n_pass_weighted,
            n_fail: self.n_fail.checked_sub(other.n_fail)?,
            n_fail_weighted: self.n_fail_weighted - other.n_fail_weighted,
        })
    }
}

/// Counters for every cut of a cutflow, indexed in insertion order.
///
/// Workers that share a read-only cutflow each accumulate into their own
/// `CutflowStats`; the results are combined with [`CutflowStats::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutflowStats {
    cuts: Vec<CutStats>,
}

impl CutflowStats {
    pub fn with_len(len: usize) -> Self {
        Self {
            cuts: vec![CutStats::default(); len],
        }
    }

    pub(crate) fn record_pass(&mut self, i: usize, weight: f64) {
        let stats = self.slot(i);
        stats.n_pass += 1;
        stats.n_pass_weighted += weight;
    }

    pub(crate) fn record_fail(&mut self, i: usize, weight: f64) {
        let stats = self.slot(i);
        stats.n_fail += 1;
        stats.n_fail_weighted += weight;
    }

    pub fn get(&self, i: usize) -> Option<&CutStats> {
        self.cuts.get(i)
    }

    pub fn merge(&mut self, other: &CutflowStats) {
        for (i, stats) in other.cuts.iter().enumerate() {
            self.slot(i).merge(stats);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CutStats> {
        self.cuts.iter()
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    // Grows on demand so stats created before late insertions stay usable.
    fn slot(&mut self, i: usize) -> &mut CutStats {
        if i >= self.cuts.len() {
            self.cuts.resize(i + 1, CutStats::default());
        }
        &mut self.cuts[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency() {
        let stats = CutStats {
            n_pass: 3,
            n_pass_weighted: 3.0,
            n_fail: 1,
            n_fail_weighted: 1.0,
        };
        assert_eq!(stats.reached(), 4);
        assert_eq!(stats.efficiency(), Some(0.75));
        assert_eq!(CutStats::default().efficiency(), None);
    }

    #[test]
    fn test_merge_is_elementwise_sum() {
        let mut a = CutflowStats::with_len(2);
        a.record_pass(0, 1.5);
        a.record_fail(1, 1.5);
        let mut b = CutflowStats::with_len(2);
        b.record_pass(0, 2.0);
        b.record_pass(1, 0.5);

        a.merge(&b);
        assert_eq!(a.get(0).unwrap().n_pass, 2);
        assert_eq!(a.get(0).unwrap().n_pass_weighted, 3.5);
        assert_eq!(a.get(1).unwrap().n_pass, 1);
        assert_eq!(a.get(1).unwrap().n_fail, 1);
    }

    #[test]
    fn test_difference() {
        let a = CutStats {
            n_pass: 5,
            n_pass_weighted: 5.0,
            n_fail: 2,
            n_fail_weighted: 2.0,
        };
        let b = CutStats {
            n_pass: 2,
            n_pass_weighted: 2.0,
            n_fail: 2,
            n_fail_weighted: 2.0,
        };
        let d = a.difference(&b).unwrap();
        assert_eq!(d.n_pass, 3);
        assert_eq!(d.n_fail, 0);
        assert_eq!(d.n_pass_weighted, 3.0);
    }

    #[test]
    fn test_difference_below_zero_is_none() {
        let small = CutStats {
            n_pass: 2,
            n_pass_weighted: 2.0,
            n_fail: 0,
            n_fail_weighted: 0.0,
        };
        let large = CutStats {
            n_pass: 5,
            n_pass_weighted: 5.0,
            n_fail: 0,
            n_fail_weighted: 0.0,
        };
        assert_eq!(small.difference(&large), None);
        assert_eq!(large.difference(&small).map(|d| d.n_pass), Some(3));
    }
}
