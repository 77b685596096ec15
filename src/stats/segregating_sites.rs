//! Segregating sites: count of sites where a sample set carries more than
//! one allelic state.

use crate::frequencies::{AlleleFrequencies, SiteFrequencies};
use crate::samples::Count;

pub fn num_segregating_sites<const N: usize>(freqs: AlleleFrequencies<'_, N>, lane: usize, n: Count) -> u64 {
    let mut count = 0u64;
    for site in freqs {
        let segregating = match site {
            SiteFrequencies::BiAllelic { derived_count, .. } => {
                let d = derived_count[lane];
                d > 0 && d < n
            }
            SiteFrequencies::MultiAllelic { counts } => counts.values().filter(|c| c[lane] > 0).count() > 1,
        };
        if segregating {
            count += 1;
        }
    }
    count
}
