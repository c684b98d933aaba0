//! Fuzzy tool-name matching
//!
//! Recovers a valid tool name from a misspelled or abbreviated one. Stages,
//! in order: exact match, case-insensitive substring match in either
//! direction, then a character-overlap score. The overlap score is not an
//! edit distance: it counts how many characters of the shorter name occur
//! anywhere in the longer one, divided by the longer name's length. It can
//! pair unrelated names that share common letters, and existing plans depend
//! on exactly that behavior.

/// Minimum overlap score accepted by [`best_match`].
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// How a candidate was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Substring,
    Similar(f64),
}

/// A known name selected for a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatch<'a> {
    pub name: &'a str,
    pub kind: MatchKind,
}

/// Best known name for `candidate` at the default threshold.
pub fn best_match<'a, S: AsRef<str>>(candidate: &str, known: &'a [S]) -> Option<&'a str> {
    find_match(candidate, known, DEFAULT_MATCH_THRESHOLD).map(|m| m.name)
}

pub fn best_match_with_threshold<'a, S: AsRef<str>>(
    candidate: &str,
    known: &'a [S],
    threshold: f64,
) -> Option<&'a str> {
    find_match(candidate, known, threshold).map(|m| m.name)
}

/// Resolve `candidate` against `known`, reporting which stage matched.
/// Ties go to the earliest entry in `known`.
pub fn find_match<'a, S: AsRef<str>>(
    candidate: &str,
    known: &'a [S],
    threshold: f64,
) -> Option<NameMatch<'a>> {
    if let Some(name) = known.iter().map(AsRef::<str>::as_ref).find(|k| *k == candidate) {
        return Some(NameMatch {
            name,
            kind: MatchKind::Exact,
        });
    }

    let lowered = candidate.to_lowercase();
    if let Some(name) = known.iter().map(AsRef::<str>::as_ref).find(|k| {
        let k = k.to_lowercase();
        k.contains(&lowered) || lowered.contains(&k)
    }) {
        return Some(NameMatch {
            name,
            kind: MatchKind::Substring,
        });
    }

    let mut best: Option<(&'a str, f64)> = None;
    for name in known.iter().map(AsRef::<str>::as_ref) {
        let score = similarity(candidate, name);
        if score >= threshold && best.map_or(true, |(_, s)| score > s) {
            best = Some((name, score));
        }
    }
    best.map(|(name, score)| NameMatch {
        name,
        kind: MatchKind::Similar(score),
    })
}

/// Character-overlap score in `[0, 1]`, over lowercased names.
///
/// Every character of the shorter name (repeats included) that appears
/// anywhere in the longer name counts once. When both have the same length
/// `candidate` plays the shorter role.
pub fn similarity(candidate: &str, known: &str) -> f64 {
    let a: Vec<char> = candidate.to_lowercase().chars().collect();
    let b: Vec<char> = known.to_lowercase().chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if longer.is_empty() {
        return 0.0;
    }
    let common = shorter.iter().filter(|c| longer.contains(c)).count();
    common as f64 / longer.len() as f64
}
