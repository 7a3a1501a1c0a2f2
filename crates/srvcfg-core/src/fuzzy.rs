//! Approximate name matching for quick-fix suggestions
//!
//! Similarity is character overlap, not edit distance. The matched
//! character count `M` between target and candidate is found by taking
//! the longest common run, then recursing on the unmatched pieces to its
//! left and right (Ratcliff/Obershelp). Comparison is case-insensitive.
//!
//! A candidate clears the threshold when `M / len(target)` reaches it.
//! Among those, the candidates with the largest `M` win; ties are
//! returned comma-joined in candidate order.

pub use srvcfg_meta::settings::DEFAULT_THRESHOLD;

/// Best correction for `target`, or `None` when no candidate clears
/// `threshold` percent.
///
/// ```
/// use srvcfg_core::fuzzy::best_match;
///
/// let found = best_match(&["cookieGroup", "cookieStore"], "cookieStar", &[] as &[&str], 70);
/// assert_eq!(found.as_deref(), Some("cookieStore"));
/// ```
pub fn best_match(
    candidates: &[impl AsRef<str>],
    target: &str,
    exclude: &[impl AsRef<str>],
    threshold: u8,
) -> Option<String> {
    let target_chars = lowered(target);
    if target_chars.is_empty() {
        return None;
    }
    let required = usize::from(threshold) * target_chars.len();

    let mut best_score = 0;
    let mut winners: Vec<&str> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if exclude.iter().any(|e| e.as_ref() == candidate) {
            continue;
        }
        let matched = matched_chars(&target_chars, &lowered(candidate));
        if matched == 0 || matched * 100 < required {
            continue;
        }
        if matched > best_score {
            best_score = matched;
            winners.clear();
        }
        if matched == best_score && !winners.contains(&candidate) {
            winners.push(candidate);
        }
    }

    if winners.is_empty() {
        None
    } else {
        Some(winners.join(","))
    }
}

/// Similarity of `candidate` to `target` in percent, as used by
/// [`best_match`].
pub fn similarity(target: &str, candidate: &str) -> u8 {
    let target = lowered(target);
    if target.is_empty() {
        return 0;
    }
    let matched = matched_chars(&target, &lowered(candidate));
    u8::try_from(matched * 100 / target.len()).unwrap_or(100)
}

fn lowered(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Total length of the recursively found common runs.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, len) = longest_common_run(a, alo, ahi, b, blo, bhi);
        if len == 0 {
            continue;
        }
        total += len;
        pending.push((alo, i, blo, j));
        pending.push((i + len, ahi, j + len, bhi));
    }
    total
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]` as
/// `(start in a, start in b, length)`; the earliest in `a` wins ties.
fn longest_common_run(
    a: &[char],
    alo: usize,
    ahi: usize,
    b: &[char],
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    if alo >= ahi || blo >= bhi {
        return best;
    }
    let width = bhi - blo + 1;
    let mut previous = vec![0usize; width];
    let mut current = vec![0usize; width];
    for i in alo..ahi {
        for j in blo..bhi {
            let k = j - blo + 1;
            current[k] = if a[i] == b[j] { previous[k - 1] + 1 } else { 0 };
            if current[k] > best.2 {
                best = (i + 1 - current[k], j + 1 - current[k], current[k]);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn matched_chars_recurses_both_sides() {
        assert_eq!(matched_chars(&lowered("cookieHat"), &lowered("cookieCart")), 8);
        assert_eq!(matched_chars(&lowered("cookieHat"), &lowered("cookieFare")), 7);
        assert_eq!(matched_chars(&lowered("abc"), &lowered("xyz")), 0);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(
            best_match(&["HTTPENDPOINT"], "httpEndpoint", NONE, 70).as_deref(),
            Some("HTTPENDPOINT")
        );
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(best_match(NONE, "x", NONE, 70), None);
        assert_eq!(best_match(&["a"], "", NONE, 70), None);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 7 of 10 target characters match
        assert_eq!(similarity("cookieStar", "cookieGroup"), 70);
        assert_eq!(
            best_match(&["cookieGroup"], "cookieStar", NONE, 70).as_deref(),
            Some("cookieGroup")
        );
        assert_eq!(best_match(&["cookieGroup"], "cookieStar", NONE, 71), None);
    }
}
