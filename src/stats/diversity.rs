//! Nucleotide diversity (π): per-site probability that two random samples
//! from a sample set differ, summed across sites.
//!
//! Matches tskit's `mode="site"` diversity statistic without the genome-length
//! normalization (`span_normalise`) — this crate has no notion of physical
//! sequence length, only a site count, so normalizing by site count would
//! silently change the statistic's units; callers wanting a per-site mean
//! divide by `sequence.num_sites()` themselves.

use crate::frequencies::{AlleleFrequencies, SiteFrequencies};
use crate::samples::Count;

fn pairs(n: u64) -> u64 {
    n * n.saturating_sub(1) / 2
}

/// `lane`'s sample-set size must be passed explicitly (`n`): the statistic
/// needs it to normalize per-site heterozygosity, and `NumSamplesBelowAccessor`
/// only exposes counts *below a node*, not the sample-set's own size.
pub fn diversity<const N: usize>(freqs: AlleleFrequencies<'_, N>, lane: usize, n: Count) -> f64 {
    let total_pairs = pairs(n as u64);
    if total_pairs == 0 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for site in freqs {
        let same_pairs: u64 = match site {
            SiteFrequencies::BiAllelic { derived_count, .. } => {
                let d = derived_count[lane] as u64;
                let a = n as u64 - d;
                pairs(d) + pairs(a)
            }
            SiteFrequencies::MultiAllelic { counts } => counts.values().map(|c| pairs(c[lane] as u64)).sum(),
        };
        sum += (total_pairs - same_pairs) as f64 / total_pairs as f64;
    }
    sum
}
