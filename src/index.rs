use std::collections::HashMap;

use tracing::debug;

use crate::error::{HistoryError, SimError};
use crate::models::{Observation, Pattern, Symbol};

/// Empirical next-day-return distributions keyed by the symbolic state
/// that preceded them.
///
/// Two tiers: the primary map keys on the full W-symbol pattern, the
/// fallback map keys on the pattern's final symbol alone. Both are built
/// in a single pass over the history and never mutated afterwards; every
/// stored bin is non-empty by construction.
#[derive(Debug)]
pub struct DistributionIndex {
    by_pattern: HashMap<Pattern, Vec<f64>>,
    by_tag: HashMap<Symbol, Vec<f64>>,
    pattern_width: usize,
}

impl DistributionIndex {
    /// Build the index from the full historical observation sequence.
    ///
    /// Every observation contributes its `next_ret` to the bin of its
    /// pattern and to the bin of its tag. The loader has already
    /// validated that all patterns share one width; an empty history is
    /// rejected here because no bin could ever resolve against it.
    pub fn build(history: &[Observation]) -> Result<Self, HistoryError> {
        let first = history.first().ok_or(HistoryError::Empty)?;
        let pattern_width = first.tag_pattern.width();

        let mut by_pattern: HashMap<Pattern, Vec<f64>> = HashMap::new();
        let mut by_tag: HashMap<Symbol, Vec<f64>> = HashMap::new();

        for obs in history {
            by_pattern
                .entry(obs.tag_pattern.clone())
                .or_default()
                .push(obs.next_ret);
            by_tag.entry(obs.tag).or_default().push(obs.next_ret);
        }

        Ok(Self {
            by_pattern,
            by_tag,
            pattern_width,
        })
    }

    /// Resolve the bin of candidate next-day returns for a pattern.
    ///
    /// Exact pattern match first; a pattern that never occurred in the
    /// history degrades to the bin of its final symbol. That degradation
    /// is expected during simulation (unseen W-symbol combinations are
    /// common) and is not an error. Failing both tiers means the history
    /// never produced this symbol at all, which aborts the run.
    pub fn resolve_bin(&self, pattern: &Pattern) -> Result<&[f64], SimError> {
        if let Some(bin) = self.by_pattern.get(pattern) {
            return Ok(bin);
        }

        let tag = pattern.last();
        debug!(pattern = %pattern, tag = %tag, "pattern unseen, falling back to tag bin");
        match self.by_tag.get(&tag) {
            Some(bin) if !bin.is_empty() => Ok(bin),
            _ => Err(SimError::UnresolvableBin {
                pattern: pattern.to_string(),
                tag: tag.as_char(),
            }),
        }
    }

    /// Width W shared by every pattern key.
    pub fn pattern_width(&self) -> usize {
        self.pattern_width
    }

    /// Number of distinct pattern keys.
    pub fn pattern_count(&self) -> usize {
        self.by_pattern.len()
    }

    /// Total returns stored across all pattern bins; equals the number
    /// of observations the index was built from.
    pub fn sample_count(&self) -> usize {
        self.by_pattern.values().map(Vec::len).sum()
    }
}
