//! Top-K candidate tracking with deterministic ordering.

use std::cmp::Ordering;

/// Scored hypothesis in the coordinate frame of one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) level: usize,
    pub(crate) x: usize,
    pub(crate) y: usize,
    pub(crate) score: f32,
    pub(crate) variant: usize,
}

fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
        .then_with(|| a.variant.cmp(&b.variant))
}

/// Sorts candidates by descending score with deterministic tie-breaking.
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp_desc);
}

/// Top-K container with O(k) insertion cost.
pub(crate) struct TopK {
    k: usize,
    items: Vec<Candidate>,
}

impl TopK {
    /// Creates a new Top-K collector.
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k),
        }
    }

    /// Pushes a candidate, evicting the worst one if at capacity.
    pub(crate) fn push(&mut self, cand: Candidate) {
        if self.k == 0 {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(cand);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if candidate_cmp_desc(item, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }

        if candidate_cmp_desc(&cand, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = cand;
        }
    }

    /// Returns candidates sorted by descending score.
    pub(crate) fn into_sorted_desc(mut self) -> Vec<Candidate> {
        sort_candidates_desc(&mut self.items);
        self.items
    }
}

/// Keeps the `k` best candidates, best first.
pub(crate) fn select_topk<I>(candidates: I, k: usize) -> Vec<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut topk = TopK::new(k);
    for cand in candidates {
        topk.push(cand);
    }
    topk.into_sorted_desc()
}
