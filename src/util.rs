//! Small helpers shared across coercion and validation: edit-distance based
//! "did you mean" suggestion lists (§4.1 enum coercion, §4.2 rules 2/8).

/// Levenshtein edit distance between two ASCII-ish strings, case-sensitive.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cur = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev
            } else {
                1 + prev.min(row[j]).min(row[j - 1])
            };
            prev = cur;
        }
    }
    row[b.len()]
}

/// Ranks `candidates` by edit distance to `input`, keeping only those close
/// enough to plausibly be a typo, and returns up to 5 names best-first.
///
/// Mirrors graphql-js's `suggestionList`: a candidate is considered only if
/// its distance is at most a third of its own length (and always accepted
/// if it's a case-insensitive match), which keeps wildly unrelated names
/// out of the list.
pub fn suggestion_list<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let input_lower = input.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let candidate_lower = candidate.to_lowercase();
            let threshold = (input.len().max(candidate.len()) / 2).max(1);
            let distance = if input_lower == candidate_lower {
                0
            } else {
                levenshtein_distance(&input_lower, &candidate_lower)
            };
            (distance <= threshold).then_some((distance, candidate))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(5).map(|(_, name)| name).collect()
}

/// Renders a suggestion list as the `" Did you mean a, b, or c?"` suffix
/// graphql-js appends to unknown-name errors. Empty string when `options`
/// is empty.
pub fn did_you_mean(options: &[&str]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = options.iter().map(|o| format!("\"{o}\"")).collect();
    let list = match quoted.as_slice() {
        [one] => one.clone(),
        [a, b] => format!("{a} or {b}"),
        many => {
            let (last, rest) = many.split_last().unwrap();
            format!("{}, or {}", rest.join(", "), last)
        }
    };
    format!(" Did you mean {list}?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_close_matches() {
        let suggestions = suggestion_list("nam", ["name", "namme", "totallyDifferent"]);
        assert_eq!(suggestions, vec!["name", "namme"]);
    }

    #[test]
    fn formats_single_suggestion() {
        assert_eq!(did_you_mean(&["name"]), " Did you mean \"name\"?");
    }

    #[test]
    fn formats_multiple_suggestions() {
        assert_eq!(
            did_you_mean(&["name", "nickname", "age"]),
            " Did you mean \"name\", \"nickname\", or \"age\"?"
        );
    }
}
