use crate::error::ReconError;
use crate::model::CountryRecord;
use crate::registry::Registry;

/// A successful match: the registry record plus how many trailing characters
/// were cut from the input before it hit (0 = exact or full-string containment).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatch<'r> {
    pub record: &'r CountryRecord,
    pub truncated: usize,
}

/// Colloquial-to-official name matcher using stepwise suffix truncation.
///
/// Attempt `k` (for `k` in `0..=max_truncations`) drops the last `k` characters
/// and returns the first registry long name, in registry order, that contains
/// the remainder. No ranking: first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatcher {
    max_truncations: usize,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self { max_truncations: 4 }
    }
}

impl NameMatcher {
    pub fn new(max_truncations: usize) -> Self {
        Self { max_truncations }
    }

    pub fn max_truncations(&self) -> usize {
        self.max_truncations
    }

    /// Record for `colloquial_name`, or `NoMatch`.
    ///
    /// Truncation stops once the remainder would be empty, so a name no longer
    /// than `max_truncations` characters never falls back to "first record
    /// wins": it either matches on a non-empty prefix or misses.
    pub fn find<'r>(
        &self,
        colloquial_name: &str,
        registry: &'r Registry,
        verbose: bool,
    ) -> Result<NameMatch<'r>, ReconError> {
        if let Ok(record) = registry.lookup_by_name(colloquial_name) {
            return Ok(NameMatch { record, truncated: 0 });
        }

        for truncated in 0..=self.max_truncations {
            let candidate = truncate_chars(colloquial_name, truncated);
            // an empty remainder would be contained in every name
            if candidate.is_empty() {
                break;
            }

            if let Some(record) = registry
                .records()
                .iter()
                .find(|r| r.long_name.contains(candidate))
            {
                if verbose {
                    log::info!("Matched {colloquial_name:<20} -> {}", record.long_name);
                }
                return Ok(NameMatch { record, truncated });
            }
        }

        Err(ReconError::NoMatch {
            name: colloquial_name.into(),
        })
    }

    /// Official long name for `colloquial_name`, or `NoMatch`.
    pub fn match_name<'r>(
        &self,
        colloquial_name: &str,
        registry: &'r Registry,
        verbose: bool,
    ) -> Result<&'r str, ReconError> {
        self.find(colloquial_name, registry, verbose)
            .map(|m| m.record.long_name.as_str())
    }
}

/// Drop the last `count` characters (not bytes).
fn truncate_chars(name: &str, count: usize) -> &str {
    if count == 0 {
        return name;
    }
    match name.char_indices().rev().nth(count - 1) {
        Some((idx, _)) => &name[..idx],
        None => "",
    }
}
