//! Allele frequency spectrum: histogram of derived-allele counts across
//! sites, for one sample set.
//!
//! Bin `k` (`0..=n`) holds the number of sites where exactly `k` samples in
//! the set carry a non-ancestral state — a multiallelic site contributes
//! once per distinct non-ancestral state observed, matching tskit's
//! polarised AFS.

use crate::frequencies::{AlleleFrequencies, SiteFrequencies};
use crate::samples::Count;

pub fn allele_frequency_spectrum<const N: usize>(freqs: AlleleFrequencies<'_, N>, lane: usize, n: Count) -> Vec<u64> {
    let mut spectrum = vec![0u64; n as usize + 1];
    for site in freqs {
        match site {
            SiteFrequencies::BiAllelic { derived_count, .. } => {
                let d = derived_count[lane];
                if d > 0 {
                    spectrum[d as usize] += 1;
                }
            }
            SiteFrequencies::MultiAllelic { counts } => {
                for &c in counts.values() {
                    let d = c[lane];
                    if d > 0 {
                        spectrum[d as usize] += 1;
                    }
                }
            }
        }
    }
    spectrum
}
