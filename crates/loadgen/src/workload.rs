//! Request generation for load runs.
//!
//! A workload turns randomness into complete transaction requests: it picks a
//! kind (or is pinned to one) and samples that kind's parameters.

use crate::mix::TransactionMix;
use crate::sampler::{self, SampleRanges};
use rand::{Rng, RngCore};
use std::sync::Arc;
use tpcc_types::{TransactionKind, TransactionRequest};

/// Trait for generating transaction requests.
pub trait WorkloadGenerator: Send + Sync {
    /// Generate a single request.
    fn generate_one(&self, rng: &mut dyn RngCore) -> TransactionRequest;

    /// Generate `count` requests.
    fn generate_batch(&self, count: usize, rng: &mut dyn RngCore) -> Vec<TransactionRequest> {
        (0..count).map(|_| self.generate_one(rng)).collect()
    }
}

/// Weighted workload: each request's kind comes from the transaction mix.
#[derive(Debug, Clone)]
pub struct MixedWorkload {
    mix: Arc<TransactionMix>,
    ranges: SampleRanges,
}

impl MixedWorkload {
    pub fn new(mix: Arc<TransactionMix>, ranges: SampleRanges) -> Self {
        Self { mix, ranges }
    }

    pub fn mix(&self) -> &TransactionMix {
        &self.mix
    }

    fn generate_one_inner<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionRequest {
        let kind = self.mix.select(rng);
        sampler::sample(kind, &self.ranges, rng)
    }
}

impl WorkloadGenerator for MixedWorkload {
    fn generate_one(&self, rng: &mut dyn RngCore) -> TransactionRequest {
        self.generate_one_inner(rng)
    }
}

/// Single-kind workload, used by dedicated virtual users.
#[derive(Debug, Clone)]
pub struct FixedWorkload {
    kind: TransactionKind,
    ranges: SampleRanges,
}

impl FixedWorkload {
    pub fn new(kind: TransactionKind, ranges: SampleRanges) -> Self {
        Self { kind, ranges }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }
}

impl WorkloadGenerator for FixedWorkload {
    fn generate_one(&self, rng: &mut dyn RngCore) -> TransactionRequest {
        sampler::sample(self.kind, &self.ranges, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mix::WeightTable;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fixed_workload_only_emits_its_kind() {
        let workload = FixedWorkload::new(TransactionKind::Delivery, SampleRanges::default());
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let batch = workload.generate_batch(50, &mut rng);
        assert_eq!(batch.len(), 50);
        assert!(batch
            .iter()
            .all(|r| r.kind() == TransactionKind::Delivery));
    }

    #[test]
    fn test_mixed_workload_is_reproducible() {
        let mix = Arc::new(TransactionMix::new(WeightTable::tpcc()));
        let workload = MixedWorkload::new(mix, SampleRanges::new(4));

        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(
            workload.generate_batch(20, &mut a),
            workload.generate_batch(20, &mut b)
        );
    }

    #[test]
    fn test_mixed_workload_respects_single_kind_table() {
        let mix = Arc::new(TransactionMix::new(WeightTable::single(
            TransactionKind::Payment,
        )));
        let workload = MixedWorkload::new(mix, SampleRanges::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for request in workload.generate_batch(100, &mut rng) {
            assert_eq!(request.kind(), TransactionKind::Payment);
        }
        assert_eq!(workload.mix().fallback_count(), 0);
    }
}
