//! Position-level diff of two symbol sequences
//!
//! Adapted from Heckel's line-diff algorithm: instead of text lines the
//! symbols here are class fingerprints. Matching is equality-based, so two
//! positions can only ever be paired when their symbols are byte-identical.

use std::collections::HashMap;
use std::hash::Hash;

/// Bookkeeping for one distinct symbol across both sequences
#[derive(Debug)]
struct Symbol {
    old_count: usize,
    new_count: usize,
    /// Last position at which the symbol occurred in the old sequence
    olno: usize,
}

/// Match up positions of `old` and `new` whose symbols correspond
///
/// Returns a partial bijection as two mutually inverse maps: old position to
/// new position, and new position to old position. The algorithm runs five
/// ordered passes:
///
///   1. count every symbol on the new side
///   2. count every symbol on the old side, recording its last position
///   3. symbols globally unique on both sides match directly
///   4. a new position immediately following a matched one is matched to the
///      old position following its counterpart, provided that position is
///      free and the symbols are equal
///   5. the final new position gets the symmetric backward treatment
///
/// Symbols that are duplicated on either side, or present on only one side,
/// are left unmatched by pass 3 — identity alone cannot disambiguate them.
/// Only passes 4 and 5 recover such positions, and only right next to an
/// already-confirmed match.
pub fn diff<S: Eq + Hash>(
    old: &[S],
    new: &[S],
) -> (HashMap<usize, usize>, HashMap<usize, usize>) {
    let mut table: HashMap<&S, Symbol> = HashMap::new();

    // Pass 1
    for symbol in new {
        let entry = table.entry(symbol).or_insert(Symbol {
            old_count: 0,
            new_count: 0,
            olno: 0,
        });
        entry.new_count += 1;
    }

    // Pass 2
    for (line, symbol) in old.iter().enumerate() {
        let entry = table.entry(symbol).or_insert(Symbol {
            old_count: 0,
            new_count: 0,
            olno: 0,
        });
        entry.old_count += 1;
        entry.olno = line;
    }

    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let mut reverse_mapping: HashMap<usize, usize> = HashMap::new();

    // Pass 3
    for (line, symbol) in new.iter().enumerate() {
        let entry = &table[symbol];
        if entry.old_count == 1 && entry.new_count == 1 {
            mapping.insert(entry.olno, line);
            reverse_mapping.insert(line, entry.olno);
        }
    }

    log::debug!("found {} direct mappings", mapping.len());
    log::debug!(
        "{} non-unique symbols",
        table
            .values()
            .filter(|s| s.old_count > 1 || s.new_count > 1)
            .count()
    );
    log::debug!(
        "{} one-sided symbols",
        table
            .values()
            .filter(|s| s.old_count * s.new_count == 0)
            .count()
    );

    // Pass 4
    for (line, symbol) in new.iter().enumerate().skip(1) {
        let previous_old = match reverse_mapping.get(&(line - 1)) {
            Some(&previous_old) => previous_old,
            None => continue,
        };

        let maybe_old_line = previous_old + 1;
        if maybe_old_line >= old.len() || mapping.contains_key(&maybe_old_line) {
            continue;
        }

        if &old[maybe_old_line] == symbol {
            mapping.insert(maybe_old_line, line);
            reverse_mapping.insert(line, maybe_old_line);
        }
    }

    // Pass 5: the last position only, propagated backwards
    if let Some((line, symbol)) = new.iter().enumerate().next_back() {
        if let Some(&next_old) = reverse_mapping.get(&(line + 1)) {
            if next_old > 0 {
                let maybe_old_line = next_old - 1;
                if !mapping.contains_key(&maybe_old_line) && &old[maybe_old_line] == symbol {
                    mapping.insert(maybe_old_line, line);
                    reverse_mapping.insert(line, maybe_old_line);
                }
            }
        }
    }

    (mapping, reverse_mapping)
}

#[cfg(test)]
mod test {
    use super::*;

    fn pairs(mapping: &HashMap<usize, usize>) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = mapping.iter().map(|(&o, &n)| (o, n)).collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn identical_sequences_match_every_position() {
        let old = vec!["a", "b", "c"];
        let new = vec!["a", "b", "c"];
        let (mapping, reverse_mapping) = diff(&old, &new);
        assert_eq!(pairs(&mapping), vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(pairs(&reverse_mapping), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn mappings_are_mutual_inverses() {
        let old = vec!["a", "b", "c", "d"];
        let new = vec!["b", "a", "d"];
        let (mapping, reverse_mapping) = diff(&old, &new);
        for (&o, &n) in &mapping {
            assert_eq!(reverse_mapping[&n], o);
        }
        for (&n, &o) in &reverse_mapping {
            assert_eq!(mapping[&o], n);
        }
    }

    #[test]
    fn duplicated_symbols_stay_unmatched_without_an_anchor() {
        let old = vec!["d", "d"];
        let new = vec!["d", "d"];
        let (mapping, _) = diff(&old, &new);
        assert!(mapping.is_empty());
    }

    #[test]
    fn one_sided_symbols_stay_unmatched() {
        let old = vec!["a", "b"];
        let new = vec!["a", "c"];
        let (mapping, _) = diff(&old, &new);
        assert_eq!(pairs(&mapping), vec![(0, 0)]);
    }

    #[test]
    fn continuation_recovers_duplicates_after_a_confirmed_match() {
        // "d" is duplicated, so pass 3 matches only "u"; pass 4 then walks
        // the run of duplicates forward from that anchor.
        let old = vec!["u", "d", "d"];
        let new = vec!["u", "d", "d"];
        let (mapping, _) = diff(&old, &new);
        assert_eq!(pairs(&mapping), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn continuation_only_propagates_forward_from_a_neighbor() {
        // The anchor "u" sits after the duplicate, so the leading "d" has no
        // matched predecessor and no pass recovers position 0.
        let old = vec!["d", "u", "d"];
        let new = vec!["d", "u", "d"];
        let (mapping, _) = diff(&old, &new);
        assert_eq!(pairs(&mapping), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn empty_sequences_produce_empty_mappings() {
        let old: Vec<&str> = vec![];
        let new: Vec<&str> = vec![];
        let (mapping, reverse_mapping) = diff(&old, &new);
        assert!(mapping.is_empty());
        assert!(reverse_mapping.is_empty());
    }
}
