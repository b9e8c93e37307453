//! Weighted transaction-mix selection.
//!
//! A [`WeightTable`] maps each [`TransactionKind`] to an integer weight. The
//! weights are proportional and need not sum to 100. [`TransactionMix`] draws
//! a kind per iteration with a cumulative-weight sampler.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tpcc_types::{TransactionKind, UnknownKind};
use tracing::warn;

/// Errors building a weight table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MixError {
    #[error("Weight table has zero total weight")]
    ZeroTotal,

    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),

    #[error("Invalid weight entry '{0}', expected kind=weight")]
    InvalidEntry(String),

    #[error("Transaction kind {0} listed more than once")]
    Duplicate(TransactionKind),
}

/// Integer weights over the five transaction kinds.
///
/// A kind with weight 0 is absent from the mix. The total is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<TransactionKind, u32>",
    into = "BTreeMap<TransactionKind, u32>"
)]
pub struct WeightTable {
    weights: [u32; TransactionKind::COUNT],
}

impl WeightTable {
    /// Build a table from `(kind, weight)` entries. Unlisted kinds get 0.
    pub fn new(
        entries: impl IntoIterator<Item = (TransactionKind, u32)>,
    ) -> Result<Self, MixError> {
        let mut weights = [0u32; TransactionKind::COUNT];
        let mut seen = [false; TransactionKind::COUNT];

        for (kind, weight) in entries {
            if seen[kind.index()] {
                return Err(MixError::Duplicate(kind));
            }
            seen[kind.index()] = true;
            weights[kind.index()] = weight;
        }

        let table = Self { weights };
        if table.total() == 0 {
            return Err(MixError::ZeroTotal);
        }
        Ok(table)
    }

    /// The standard TPC-C mix: 45% New-Order, 43% Payment, 4% each for
    /// Order-Status, Delivery and Stock-Level.
    pub fn tpcc() -> Self {
        Self {
            weights: [45, 43, 4, 4, 4],
        }
    }

    /// A table that only ever selects `kind`.
    pub fn single(kind: TransactionKind) -> Self {
        let mut weights = [0u32; TransactionKind::COUNT];
        weights[kind.index()] = 100;
        Self { weights }
    }

    /// Weight of one kind.
    pub fn weight(&self, kind: TransactionKind) -> u32 {
        self.weights[kind.index()]
    }

    /// Sum of all weights.
    pub fn total(&self) -> u64 {
        self.weights.iter().map(|&w| w as u64).sum()
    }

    /// Expected fraction of selections for `kind`.
    pub fn share(&self, kind: TransactionKind) -> f64 {
        self.weight(kind) as f64 / self.total() as f64
    }

    /// Kinds with a positive weight, in canonical order.
    pub fn kinds(&self) -> impl Iterator<Item = (TransactionKind, u32)> + '_ {
        TransactionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.weight(kind)))
            .filter(|&(_, weight)| weight > 0)
    }

    /// Whether every kind has a positive weight.
    pub fn is_full_mix(&self) -> bool {
        self.weights.iter().all(|&w| w > 0)
    }

    /// Split `vus` virtual users across kinds in proportion to the weights.
    ///
    /// Uses largest-remainder apportionment (ties broken in canonical order).
    /// When there are at least as many VUs as weighted kinds, every weighted
    /// kind gets at least one VU. The result is grouped by kind in canonical
    /// order.
    pub fn allocate_vus(&self, vus: usize) -> Vec<TransactionKind> {
        let total = self.total();
        let mut counts = [0usize; TransactionKind::COUNT];
        let mut remainders: Vec<(u64, TransactionKind)> = Vec::new();
        let mut assigned = 0usize;

        for (kind, weight) in self.kinds() {
            let scaled = vus as u64 * weight as u64;
            counts[kind.index()] = (scaled / total) as usize;
            assigned += counts[kind.index()];
            remainders.push((scaled % total, kind));
        }

        // Stable sort keeps canonical order among equal remainders.
        remainders.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, kind) in remainders.iter().take(vus - assigned) {
            counts[kind.index()] += 1;
        }

        let weighted = self.kinds().count();
        if vus >= weighted {
            for (kind, _) in self.kinds() {
                if counts[kind.index()] > 0 {
                    continue;
                }
                // Borrow from the kind holding the most VUs.
                let donor = (0..TransactionKind::COUNT)
                    .max_by_key(|&i| (counts[i], std::cmp::Reverse(i)))
                    .unwrap_or(0);
                if counts[donor] > 1 {
                    counts[donor] -= 1;
                    counts[kind.index()] += 1;
                }
            }
        }

        TransactionKind::ALL
            .into_iter()
            .flat_map(|kind| std::iter::repeat(kind).take(counts[kind.index()]))
            .collect()
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::tpcc()
    }
}

impl TryFrom<BTreeMap<TransactionKind, u32>> for WeightTable {
    type Error = MixError;

    fn try_from(map: BTreeMap<TransactionKind, u32>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<WeightTable> for BTreeMap<TransactionKind, u32> {
    fn from(table: WeightTable) -> Self {
        table.kinds().collect()
    }
}

/// Parses `new_order=45,payment=43,...`.
impl FromStr for WeightTable {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (kind, weight) = entry
                .split_once('=')
                .ok_or_else(|| MixError::InvalidEntry(entry.to_string()))?;
            let kind: TransactionKind = kind.parse()?;
            let weight: u32 = weight
                .trim()
                .parse()
                .map_err(|_| MixError::InvalidEntry(entry.to_string()))?;
            entries.push((kind, weight));
        }
        Self::new(entries)
    }
}

impl fmt::Display for WeightTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .kinds()
            .map(|(kind, weight)| format!("{}={}", kind, weight))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Cumulative-weight selector over a [`WeightTable`].
///
/// Shared read-only across virtual users. The only mutable state is the
/// fallback counter, which should stay at zero.
#[derive(Debug)]
pub struct TransactionMix {
    table: WeightTable,
    fallbacks: AtomicU64,
}

impl TransactionMix {
    pub fn new(table: WeightTable) -> Self {
        Self {
            table,
            fallbacks: AtomicU64::new(0),
        }
    }

    pub fn table(&self) -> &WeightTable {
        &self.table
    }

    /// Draw `r` uniformly in `[1, total]` and resolve it to a kind.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionKind {
        let draw = rng.gen_range(1..=self.table.total());
        self.resolve(draw)
    }

    /// Map a 1-based draw to the first kind whose cumulative weight reaches
    /// it, iterating in canonical order.
    ///
    /// A draw outside `[1, total]` matches nothing: the result is New-Order
    /// and the fallback counter is incremented.
    pub fn resolve(&self, draw: u64) -> TransactionKind {
        let mut cumulative = 0u64;
        for kind in TransactionKind::ALL {
            let weight = self.table.weight(kind) as u64;
            cumulative += weight;
            if weight > 0 && draw >= 1 && draw <= cumulative {
                return kind;
            }
        }

        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        warn!(
            draw,
            total = self.table.total(),
            "Draw matched no transaction kind, falling back to new_order"
        );
        TransactionKind::NewOrder
    }

    /// Number of selections that hit the New-Order fallback.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }
}
