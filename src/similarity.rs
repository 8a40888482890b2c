/// Longer inputs are truncated before scoring.
pub const MAX_COMPARED_CHARS: usize = 256;

pub fn common_chars(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().take(MAX_COMPARED_CHARS).collect();
    let b: Vec<char> = b.chars().take(MAX_COMPARED_CHARS).collect();
    common_run_total(&a, &b)
}

fn common_run_total(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (pos_a, pos_b, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }

    len + common_run_total(&a[..pos_a], &b[..pos_b])
        + common_run_total(&a[pos_a + len..], &b[pos_b + len..])
}

/// First longest common run, scanning `a` then `b` left to right.
/// `current[j]` is the length of the common run ending at `a[i - 1]`, `b[j - 1]`.
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            current[j] = if a[i - 1] == b[j - 1] {
                previous[j - 1] + 1
            } else {
                0
            };

            let len = current[j];
            if len > best.2 {
                best = (i - len, j - len, len);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

/// Percentage in `0.0..=100.0`; two empty strings score 0.
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    let total = a.chars().take(MAX_COMPARED_CHARS).count()
        + b.chars().take(MAX_COMPARED_CHARS).count();
    if total == 0 {
        return 0.0;
    }

    common_chars(a, b) as f64 * 2.0 * 100.0 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_full() {
        assert!((similarity_percent("infosys", "infosys") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(common_chars("abc", "xyz"), 0);
        assert_eq!(similarity_percent("abc", "xyz"), 0.0);
        assert_eq!(similarity_percent("", ""), 0.0);
    }

    #[test]
    fn recurses_on_both_sides_of_the_longest_run() {
        // Nothing remains to the left of "World" in the shorter string.
        assert_eq!(common_chars("Hello World", "World"), 5);
        assert_eq!(common_chars("accenture", "acenture"), 8);
        let score = similarity_percent("accenture", "acenture");
        assert!((score - 94.117_647).abs() < 1e-3);
    }

    #[test]
    fn typo_clears_the_clustering_threshold() {
        assert!(similarity_percent("cognizant", "cognizent") > 85.0);
        assert!(similarity_percent("wipro", "zoho") < 85.0);
    }

    #[test]
    fn ties_pick_the_earliest_run() {
        // "ab" and "cd" both have length 2; "ab" comes first in `a`.
        let a: Vec<char> = "abxcd".chars().collect();
        let b: Vec<char> = "cdab".chars().collect();
        assert_eq!(longest_common_run(&a, &b), (0, 2, 2));
        assert_eq!(common_chars("abxcd", "cdab"), 2);
    }

    #[test]
    fn long_pasted_names_score_quickly() {
        let a: String = "tata consultancy ".repeat(300);
        let b: String = "consultancy tata ".repeat(300);
        let started = std::time::Instant::now();
        let score = similarity_percent(&a, &b);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert!(score > 85.0);

        let noise: String = (0..5000u32)
            .map(|i| char::from(b'a' + (i * 7 % 26) as u8))
            .collect();
        let started = std::time::Instant::now();
        let score = similarity_percent(&noise, &noise.chars().rev().collect::<String>());
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert!((0.0..=100.0).contains(&score));
    }
}
