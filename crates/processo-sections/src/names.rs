use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of two or more capitalised words, allowing lowercase Portuguese
/// name particles between them ("Maria da Silva", "Banco do Brasil").
static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Lu}[\p{L}'.&-]*(?:[ \t]+(?:(?:da|de|do|das|dos)[ \t]+)?\p{Lu}[\p{L}'.&-]*)+")
        .unwrap()
});

/// Capitalised words that start sentences rather than names.
const LEADING_STOPWORDS: &[&str] = &[
    "A", "As", "O", "Os", "Em", "No", "Na", "Nos", "Nas", "De", "Da", "Do", "Ao", "Para", "Por",
    "Que", "Se", "Um", "Uma", "Dos", "Das", "E",
];

fn strip_leading_stopwords(candidate: &str) -> Option<&str> {
    let mut rest = candidate;
    loop {
        let (first, tail) = rest.split_once(char::is_whitespace)?;
        if !LEADING_STOPWORDS.contains(&first) {
            return Some(rest);
        }
        rest = tail.trim_start();
    }
}

/// Proper-name mentions (people and organisations) in order of first
/// appearance, without duplicates.
pub fn proper_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for m in NAME_RE.find_iter(text) {
        let Some(name) = strip_leading_stopwords(m.as_str()) else {
            continue;
        };
        let name = name.trim_end_matches(['.', ',', '-']).to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
