//! Composite scoring and selection among coercion candidates (spec §4.4).
//!
//! A coerced result's score is the sum of its own flag penalties plus ten
//! times the sum of its children's scores, so a container's quality is
//! dominated by how well its children matched rather than by a single flag
//! on the container itself.

use crate::value::Flag;

/// Sums a set of flag penalties, saturating at `u32::MAX` so a single
/// `NoMatch` (penalty `u32::MAX`) poisons the whole sum instead of wrapping.
#[inline]
pub fn flag_penalty_sum(flags: &[Flag]) -> u32 {
    flags.iter().fold(0u32, |acc, f| acc.saturating_add(f.penalty()))
}

/// Composite score: `own` penalties plus `10 * sum(children)`, per spec §3.2.
#[inline]
pub fn composite_score(own_flags: &[Flag], child_scores: &[u32]) -> u32 {
    let own = flag_penalty_sum(own_flags);
    let children: u32 = child_scores
        .iter()
        .fold(0u32, |acc, s| acc.saturating_add(*s));
    own.saturating_add(children.saturating_mul(10))
}

/// Provenance metadata a candidate carries for the tie-breaker rules. None of
/// this affects the primary sort; it only disambiguates a tie on score.
#[derive(Debug, Clone, Copy, Default)]
pub struct Provenance {
    /// This result used a `SingleToArray` wrap somewhere in its own flags.
    pub used_single_to_array: bool,
    /// This result came from coercing the Value directly as an object/array,
    /// as opposed to an `ImpliedKey`/`ObjectToPrimitive` rescue of a scalar.
    pub is_container_result: bool,
    /// The Value this result was built from was (or was extracted from) a
    /// `Markdown`-wrapped plain string, rather than parsed JSON.
    pub from_markdown_string: bool,
    /// Position in the union's declared option order (0 = first).
    pub declaration_index: usize,
}

/// One candidate outcome of coercing a Value against a schema option.
#[derive(Debug, Clone)]
pub struct Candidate<T> {
    pub value: T,
    pub flags: Vec<Flag>,
    pub score: u32,
    pub provenance: Provenance,
}

impl<T> Candidate<T> {
    pub fn new(value: T, flags: Vec<Flag>, child_scores: &[u32], provenance: Provenance) -> Self {
        let score = composite_score(&flags, child_scores);
        Self {
            value,
            flags,
            score,
            provenance,
        }
    }
}

/// Selects the best candidate per spec §4.4: ascending score, then four
/// tie-breakers in order, evaluated only among candidates tied for the best
/// score. Returns `None` if `candidates` is empty or the best score is ∞
/// (`u32::MAX`, meaning every candidate was `NoMatch`).
pub fn select_best<T>(candidates: Vec<Candidate<T>>, target_is_string: bool) -> Option<Candidate<T>> {
    let best_score = candidates.iter().map(|c| c.score).min()?;
    if best_score == u32::MAX {
        return None;
    }

    candidates
        .into_iter()
        .filter(|c| c.score == best_score)
        .min_by_key(|c| tie_break_key(&c.provenance, target_is_string))
}

/// Lower is better. Order matches spec §4.4 point 2 exactly: (a) avoid
/// `SingleToArray` when a real-array competitor exists, (b) prefer container
/// results over rescued primitives, (c) prefer parsed-JSON provenance over
/// markdown-extracted prose for non-string targets (reversed for string
/// targets), (d) earlier union declaration order.
fn tie_break_key(p: &Provenance, target_is_string: bool) -> (u8, u8, u8, usize) {
    let a = u8::from(p.used_single_to_array);
    let b = u8::from(!p.is_container_result);
    let c = if target_is_string {
        u8::from(!p.from_markdown_string)
    } else {
        u8::from(p.from_markdown_string)
    };
    (a, b, c, p.declaration_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(score_flags: Vec<Flag>, prov: Provenance) -> Candidate<&'static str> {
        Candidate::new("v", score_flags, &[], prov)
    }

    #[test]
    fn composite_score_weighs_children_by_ten() {
        let s = composite_score(&[Flag::ImpliedKey], &[3, 2]);
        assert_eq!(s, 2 + 10 * 5);
    }

    #[test]
    fn no_match_poisons_the_sum() {
        let s = composite_score(&[Flag::NoMatch], &[0]);
        assert_eq!(s, u32::MAX);
    }

    #[test]
    fn lower_score_wins_outright() {
        let good = cand(vec![Flag::ExactMatch], Provenance::default());
        let bad = cand(vec![Flag::StringToNumber, Flag::CaseCoerced], Provenance::default());
        let winner = select_best(vec![good, bad], false).unwrap();
        assert_eq!(winner.score, 0);
    }

    #[test]
    fn tie_break_prefers_non_single_to_array() {
        let array_like = cand(
            vec![],
            Provenance {
                used_single_to_array: false,
                is_container_result: true,
                ..Default::default()
            },
        );
        let wrapped = cand(
            vec![],
            Provenance {
                used_single_to_array: true,
                is_container_result: true,
                ..Default::default()
            },
        );
        let winner = select_best(vec![wrapped, array_like], false).unwrap();
        assert!(!winner.provenance.used_single_to_array);
    }

    #[test]
    fn tie_break_prefers_container_over_implied_key_rescue() {
        let container = cand(
            vec![],
            Provenance {
                is_container_result: true,
                ..Default::default()
            },
        );
        let rescued = cand(
            vec![],
            Provenance {
                is_container_result: false,
                ..Default::default()
            },
        );
        let winner = select_best(vec![rescued, container], false).unwrap();
        assert!(winner.provenance.is_container_result);
    }

    #[test]
    fn tie_break_string_targets_prefer_markdown_prose() {
        let parsed = cand(
            vec![],
            Provenance {
                from_markdown_string: false,
                is_container_result: true,
                ..Default::default()
            },
        );
        let prose = cand(
            vec![],
            Provenance {
                from_markdown_string: true,
                is_container_result: true,
                ..Default::default()
            },
        );
        let winner = select_best(vec![parsed.clone(), prose.clone()], true).unwrap();
        assert!(winner.provenance.from_markdown_string);
        let winner_non_string = select_best(vec![parsed, prose], false).unwrap();
        assert!(!winner_non_string.provenance.from_markdown_string);
    }

    #[test]
    fn all_no_match_fails() {
        let a = cand(vec![Flag::NoMatch], Provenance::default());
        let b = cand(vec![Flag::NoMatch], Provenance::default());
        assert!(select_best(vec![a, b], false).is_none());
    }

    #[test]
    fn empty_candidates_fails() {
        let empty: Vec<Candidate<&'static str>> = Vec::new();
        assert!(select_best(empty, false).is_none());
    }
}
