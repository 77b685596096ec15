//! Allele-frequency iteration: per-site allele counts across up to
//! four sample sets at once, biallelic fast path with multiallelic fallback.
//!
//! The "upgrade both cursors whenever either observes multiallelicity"
//! contract falls out for free here: each sample set is a *lane* inside one
//! shared [`SiteFrequencies`] value per site, rather than a separate per-sample-set
//! iterator. A site can only be represented one way — biallelic or
//! multiallelic — so the moment any lane observes a third allele, every
//! lane for that site is carried in the multiallelic map together. There is
//! no way to leave one lane on the fast path while another has upgraded.

use crate::ids::SiteId;
use crate::samples::{Count, NumSamplesBelowAccessor};
use crate::sequence::{AllelicState, GenomicSequence};
use std::collections::HashMap;

/// Per-site allele counts, one `[Count; N]` row per distinct allelic state
/// observed at that site (including the ancestral state, even if no sample
/// carries it).
#[derive(Clone, Debug)]
pub enum SiteFrequencies<const N: usize> {
    BiAllelic { ancestral_state: AllelicState, derived_state: AllelicState, derived_count: [Count; N] },
    MultiAllelic { counts: HashMap<AllelicState, [Count; N]> },
}

impl<const N: usize> SiteFrequencies<N> {
    pub fn count_of(&self, state: AllelicState, total: [Count; N]) -> [Count; N] {
        match self {
            SiteFrequencies::BiAllelic { ancestral_state, derived_state, derived_count } => {
                if state == *derived_state {
                    *derived_count
                } else if state == *ancestral_state {
                    let mut out = [0; N];
                    for k in 0..N {
                        out[k] = total[k] - derived_count[k];
                    }
                    out
                } else {
                    [0; N]
                }
            }
            SiteFrequencies::MultiAllelic { counts } => counts.get(&state).copied().unwrap_or([0; N]),
        }
    }

    pub fn is_multiallelic(&self) -> bool {
        matches!(self, SiteFrequencies::MultiAllelic { .. })
    }
}

/// Streams [`SiteFrequencies`] across every site of a [`GenomicSequence`],
/// driven by a precomputed [`NumSamplesBelowAccessor`] (DAG or BP, either
/// works — the accessor already hides that distinction).
pub struct AlleleFrequencies<'a, const N: usize> {
    sequence: &'a GenomicSequence,
    accessor: &'a NumSamplesBelowAccessor<N>,
    site_cursor: SiteId,
    force_multiallelic: bool,
}

impl<'a, const N: usize> AlleleFrequencies<'a, N> {
    pub fn new(sequence: &'a GenomicSequence, accessor: &'a NumSamplesBelowAccessor<N>) -> Self {
        AlleleFrequencies { sequence, accessor, site_cursor: 0, force_multiallelic: false }
    }

    /// Once set, every subsequent site is represented as `MultiAllelic`
    /// even when it would otherwise qualify for the biallelic fast path.
    /// Needed when combining this stream against another that has already
    /// seen a third allele at a site the two must stay aligned on.
    pub fn force_multiallelicity(&mut self) {
        self.force_multiallelic = true;
    }

    fn site_net_counts(&self, site: SiteId) -> (AllelicState, HashMap<AllelicState, [Count; N]>) {
        let ancestral = self.sequence.ancestral_state(site);
        let muts = self.sequence.mutations_at_site(site);

        // direct_children[m] = sum of subtree sizes of mutations whose
        // parent_mutation is m's global id — subtracted from m's own
        // subtree size to get m's *net* contribution (each nested mutation
        // already fully overrides its ancestor's effect within its own
        // subtree, so only *direct* children need subtracting, not every
        // descendant — their effects are absorbed one level down).
        let mut child_size_sum: HashMap<u32, [Count; N]> = HashMap::new();
        for m in muts {
            if let Some(parent_id) = m.parent_mutation() {
                let mut row = [0 as Count; N];
                for k in 0..N {
                    row[k] = self.accessor.num_samples_below(m.node_id(), k);
                }
                let entry = child_size_sum.entry(parent_id).or_insert([0; N]);
                for k in 0..N {
                    entry[k] += row[k];
                }
            }
        }

        let mut by_state: HashMap<AllelicState, [Count; N]> = HashMap::new();
        let mut derived_total = [0 as Count; N];
        for (local_idx, m) in muts.iter().enumerate() {
            let global_id = self.sequence.global_mutation_id(site, local_idx);
            let mut net = [0 as Count; N];
            for k in 0..N {
                net[k] = self.accessor.num_samples_below(m.node_id(), k);
            }
            if let Some(sub) = child_size_sum.get(&global_id) {
                for k in 0..N {
                    net[k] -= sub[k];
                }
            }
            let entry = by_state.entry(m.derived_state()).or_insert([0; N]);
            for k in 0..N {
                entry[k] += net[k];
                derived_total[k] += net[k];
            }
        }

        // Ancestral state always gets an entry, even if every sample has
        // moved away from it — whatever isn't accounted for by a derived
        // state is, by definition, still ancestral.
        let mut ancestral_row = [0 as Count; N];
        for k in 0..N {
            ancestral_row[k] = self.accessor.total(k) - derived_total[k];
        }
        let entry = by_state.entry(ancestral).or_insert([0; N]);
        for k in 0..N {
            entry[k] += ancestral_row[k];
        }

        (ancestral, by_state)
    }
}

impl<'a, const N: usize> Iterator for AlleleFrequencies<'a, N> {
    type Item = SiteFrequencies<N>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.site_cursor >= self.sequence.num_sites() {
            return None;
        }
        let site = self.site_cursor;
        self.site_cursor += 1;

        let (ancestral, by_state) = self.site_net_counts(site);

        let non_ancestral_states: Vec<_> = by_state.keys().copied().filter(|s| *s != ancestral).collect();
        let biallelic_fits = !self.force_multiallelic && non_ancestral_states.len() <= 1;

        if biallelic_fits {
            let derived_state = non_ancestral_states.first().copied().unwrap_or(ancestral);
            let derived_count = by_state.get(&derived_state).copied().unwrap_or([0; N]);
            Some(SiteFrequencies::BiAllelic { ancestral_state: ancestral, derived_state, derived_count })
        } else {
            Some(SiteFrequencies::MultiAllelic { counts: by_state })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress_dag;
    use crate::config::BuildConfig;
    use crate::ids::SampleSet;
    use crate::reader::fixtures::SingleTreeFixture;
    use crate::reader::MutationRecord;
    use crate::samples::from_dag;

    fn tree_with_one_mutation() -> SingleTreeFixture {
        // caterpillar ((0,1)4,(2,3)5)6, one mutation at node 4: samples 0,1 derived.
        SingleTreeFixture {
            num_samples: 4,
            postorder: vec![0, 1, 4, 2, 3, 5, 6],
            children: vec![(4, vec![0, 1]), (5, vec![2, 3]), (6, vec![4, 5])],
            root: 6,
            ancestral: vec![0],
            mutations: vec![vec![MutationRecord { site: 0, node: 4, derived_state: 1, parent_mutation: None }]],
        }
    }

    fn tree_with_nested_mutations() -> SingleTreeFixture {
        // mutation at 4 (derived=1, covers samples 0,1), nested mutation at
        // sample 0 reverting to derived=2 — net(4) should drop to just sample 1.
        SingleTreeFixture {
            num_samples: 4,
            postorder: vec![0, 1, 4, 2, 3, 5, 6],
            children: vec![(4, vec![0, 1]), (5, vec![2, 3]), (6, vec![4, 5])],
            root: 6,
            ancestral: vec![0],
            mutations: vec![vec![
                MutationRecord { site: 0, node: 4, derived_state: 1, parent_mutation: None },
                MutationRecord { site: 0, node: 0, derived_state: 2, parent_mutation: Some(0) },
            ]],
        }
    }

    #[test]
    fn biallelic_site_reports_derived_count() {
        let reader = tree_with_one_mutation();
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();

        let mut all = SampleSet::new(4);
        for s in 0..4 {
            all.add(s);
        }
        let accessor = from_dag(&forest, [&all]);
        let mut freqs = AlleleFrequencies::new(&seq, &accessor);
        let site0 = freqs.next().unwrap();
        match site0 {
            SiteFrequencies::BiAllelic { ancestral_state, derived_state, derived_count } => {
                assert_eq!(ancestral_state, 0);
                assert_eq!(derived_state, 1);
                assert_eq!(derived_count[0], 2);
            }
            _ => panic!("expected biallelic site"),
        }
        assert!(freqs.next().is_none());
    }

    #[test]
    fn nested_mutation_subtracts_overridden_samples() {
        let reader = tree_with_nested_mutations();
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();

        let mut all = SampleSet::new(4);
        for s in 0..4 {
            all.add(s);
        }
        let accessor = from_dag(&forest, [&all]);
        let mut freqs = AlleleFrequencies::new(&seq, &accessor);
        let site0 = freqs.next().unwrap();
        match site0 {
            SiteFrequencies::MultiAllelic { counts } => {
                assert_eq!(counts.get(&1).copied().unwrap()[0], 1); // sample 1 only
                assert_eq!(counts.get(&2).copied().unwrap()[0], 1); // sample 0 only
            }
            _ => panic!("expected multiallelic site: two distinct non-ancestral states"),
        }
    }

    #[test]
    fn force_multiallelicity_upgrades_a_would_be_biallelic_site() {
        let reader = tree_with_one_mutation();
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();

        let mut all = SampleSet::new(4);
        for s in 0..4 {
            all.add(s);
        }
        let accessor = from_dag(&forest, [&all]);
        let mut freqs = AlleleFrequencies::new(&seq, &accessor);
        freqs.force_multiallelicity();
        let site0 = freqs.next().unwrap();
        assert!(site0.is_multiallelic());
    }
}
