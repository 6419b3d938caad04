use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use processo_core::{PartyMention, SectionSplitter, Sections, SubjectMention};

use crate::{capitalize, normalize_whitespace};

static FACTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(dos fatos|fatos)(.*?)(dos pedidos|dos fundamentos|fundamentação|conclusão|$)")
        .unwrap()
});

static PARTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(autor|réu|exequente|executado|requerente|requerido|apelante|apelado|impetrante|impetrado|agravante|agravado)[\s:.-]+([A-ZÁ-Úa-zá-ú\s.,\-']+)",
    )
    .unwrap()
});

static SUBJECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(assuntos?|matéria)[\s:.-]+([A-ZÁ-Úa-zá-ú\s.,\-']+)").unwrap()
});

/// Splitter driven by labelled mentions.
///
/// - facts: text between the first "fatos" heading and the next closing
///   heading (pedidos, fundamentos, fundamentação, conclusão) or the end;
/// - parties: every `role: name` mention, unique per role and
///   case-insensitive name, in order of first appearance;
/// - subjects: every `assunto: description` mention, unique
///   case-insensitively.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexSplitter;

impl RegexSplitter {
    pub fn new() -> Self {
        Self
    }
}

fn facts(text: &str) -> String {
    FACTS_RE
        .captures(text)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn parties(text: &str) -> Vec<PartyMention> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caps in PARTY_RE.captures_iter(text) {
        let role = capitalize(caps[1].trim());
        let name = normalize_whitespace(&caps[2]);
        if name.is_empty() {
            continue;
        }
        if seen.insert(format!("{role}:{}", name.to_lowercase())) {
            out.push(PartyMention {
                role: Some(role),
                name,
            });
        }
    }
    out
}

fn subjects(text: &str) -> Vec<SubjectMention> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caps in SUBJECT_RE.captures_iter(text) {
        let description = normalize_whitespace(&caps[2]);
        if description.is_empty() {
            continue;
        }
        if seen.insert(description.to_lowercase()) {
            out.push(SubjectMention { description });
        }
    }
    out
}

impl SectionSplitter for RegexSplitter {
    fn name(&self) -> &str {
        "regex"
    }

    fn split(&self, text: &str) -> Sections {
        let sections = Sections {
            facts: facts(text),
            parties: parties(text),
            subjects: subjects(text),
        };
        tracing::debug!(
            facts_chars = sections.facts.len(),
            parties = sections.parties.len(),
            subjects = sections.subjects.len(),
            "regex sections"
        );
        sections
    }
}
