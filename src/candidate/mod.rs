//! Candidate representation and Top-K selection.

pub(crate) mod topk;
