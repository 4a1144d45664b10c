/// Characters shown before a match.
const LEAD: usize = 60;
/// Characters shown after the end of a match.
const TRAIL: usize = 80;
/// Length of the fallback snippet when the query is not in the text.
const HEAD: usize = 140;
const ELLIPSIS: char = '…';

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Character index of the first case-insensitive occurrence of `needle` in
/// `haystack`. Characters are compared one to one, so the index is valid in
/// `haystack` even when lowercasing would change its length.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay: Vec<char> = haystack.chars().collect();
    let pat: Vec<char> = needle.chars().collect();
    find_chars(&hay, &pat)
}

fn find_chars(hay: &[char], pat: &[char]) -> Option<usize> {
    if pat.is_empty() {
        return Some(0);
    }
    if pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&start| {
        hay[start..start + pat.len()]
            .iter()
            .zip(pat)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b))
    })
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

/// Builds the excerpt shown under a search result.
///
/// With a match, the window runs from 60 characters before it to 80 after
/// it, with `…` marking each cut side. Without one, it is the first 140
/// characters. An empty query yields an empty snippet.
pub fn build_snippet(text: &str, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let pat: Vec<char> = query.chars().collect();

    let Some(idx) = find_chars(&chars, &pat) else {
        let mut snippet: String = chars.iter().take(HEAD).collect();
        if chars.len() > HEAD {
            snippet.push(ELLIPSIS);
        }
        return snippet;
    };

    let start = idx.saturating_sub(LEAD);
    let end = (idx + pat.len() + TRAIL).min(chars.len());
    let mut snippet = String::new();
    if start > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.extend(&chars[start..end]);
    if end < chars.len() {
        snippet.push(ELLIPSIS);
    }
    snippet
}
