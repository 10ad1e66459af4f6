use std::collections::BTreeSet;

/// Insertion/deletion edit distance (no substitutions), computed from the
/// longest common subsequence with the two-row O(min(m,n)) space algorithm.
pub fn indel_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m == 0 || n == 0 {
        return m + n;
    }
    let total = m + n;

    // Keep the shorter string in the inner loop to minimise allocation.
    let (a, b, n) = if m >= n { (a, b, n) } else { (b, a, m) };

    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for ca in &a {
        for j in 1..=n {
            curr[j] = if *ca == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    total - 2 * prev[n]
}

/// Normalized similarity in 0–100: the share of both strings' characters
/// that survive an indel alignment, rounded half-to-even.
pub fn ratio(s1: &str, s2: &str) -> u8 {
    if s1 == s2 {
        return 100;
    }
    let total = s1.chars().count() + s2.chars().count();
    if s1.is_empty() || s2.is_empty() {
        return 0;
    }
    let kept = total - indel_distance(s1, s2);
    (100.0 * kept as f64 / total as f64).round_ties_even() as u8
}

/// Order- and duplicate-insensitive similarity of two names in 0–100.
///
/// Both names are uppercased and reduced to their set of alphanumeric words.
/// The shared words form a common core; the score is the best `ratio` among
/// core vs. core+rest-of-left, core vs. core+rest-of-right, and the two
/// extended forms against each other. A name whose words are a subset of the
/// other's therefore scores 100.
pub fn token_set_ratio(s1: &str, s2: &str) -> u8 {
    let t1 = word_set(s1);
    let t2 = word_set(s2);
    if t1.is_empty() || t2.is_empty() {
        return 0;
    }

    let join = |words: Vec<&String>| words.into_iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    let sect = join(t1.intersection(&t2).collect());
    let only1 = join(t1.difference(&t2).collect());
    let only2 = join(t2.difference(&t1).collect());

    let combined1 = format!("{sect} {only1}").trim().to_string();
    let combined2 = format!("{sect} {only2}").trim().to_string();

    ratio(&sect, &combined1)
        .max(ratio(&sect, &combined2))
        .max(ratio(&combined1, &combined2))
}

/// Uppercase ASCII words; anything that is not a letter, digit or `_`
/// separates words, and non-ASCII characters are dropped.
fn word_set(s: &str) -> BTreeSet<String> {
    let cleaned: String = s
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c.to_ascii_uppercase() } else { ' ' })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}
