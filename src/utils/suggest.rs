fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut curr = Vec::with_capacity(prev.len());
        curr.push(i + 1);
        for (j, cb) in b_chars.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            curr.push((prev[j + 1] + 1).min(curr[j] + 1).min(substitution));
        }
        prev = curr;
    }
    prev[b_chars.len()]
}

fn distance(input: &str, candidate: &str) -> Option<usize> {
    let a = normalize_token(input);
    let b = normalize_token(candidate);
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(0);
    }
    if a.contains(&b) || b.contains(&a) {
        return Some(1);
    }
    Some(levenshtein(&a, &b))
}

fn max_allowed_distance(input: &str) -> usize {
    match normalize_token(input).len() {
        0 => 0,
        1..=4 => 1,
        5..=8 => 2,
        len => ((len as f32 * 0.35).floor() as usize).max(3),
    }
}

/// Closest candidates to `input`, best first, at most `limit` of them.
pub fn suggest(input: &str, candidates: &[String], limit: usize) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    let allowed = max_allowed_distance(input);
    let mut scored: Vec<(usize, &String)> = candidates
        .iter()
        .filter_map(|candidate| distance(input, candidate).map(|d| (d, candidate)))
        .filter(|(d, _)| *d <= allowed)
        .collect();
    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(b.1))
    });
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(limit.max(1))
        .map(|(_, candidate)| candidate.clone())
        .collect()
}
