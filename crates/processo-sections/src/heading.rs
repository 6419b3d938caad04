use once_cell::sync::Lazy;
use regex::Regex;

use processo_core::{PartyMention, SectionSplitter, Sections, SubjectMention};

use crate::names::proper_names;
use processo_core::report::truncate_chars;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(dos fatos|fatos|das partes|partes|assuntos?|matéria|dos pedidos|fundamentação|conclusão)[\s:.-]+",
    )
    .unwrap()
});

/// Subject blocks are cut to this many characters.
pub const SUBJECT_BLOCK_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Facts,
    Parties,
    Subjects,
    Other,
}

impl BlockKind {
    fn of(heading: &str) -> Self {
        let heading = heading.to_lowercase();
        if heading.contains("fato") {
            BlockKind::Facts
        } else if heading.contains("parte") {
            BlockKind::Parties
        } else if heading.contains("assunto") || heading.contains("matéria") {
            BlockKind::Subjects
        } else {
            BlockKind::Other
        }
    }
}

/// Text between consecutive headings, tagged by the opening heading.
fn blocks(text: &str) -> Vec<(BlockKind, &str)> {
    let headings: Vec<_> = HEADING_RE.captures_iter(text).collect();
    headings
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let title = caps.get(1)?;
            let end = headings
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            Some((BlockKind::of(title.as_str()), text[whole.end()..end].trim()))
        })
        .collect()
}

fn mentions(names: Vec<String>) -> Vec<PartyMention> {
    names
        .into_iter()
        .map(|name| PartyMention { role: None, name })
        .collect()
}

/// Splitter driven by section headings.
///
/// Fact blocks are concatenated, each followed by a newline. Party blocks
/// contribute the proper names found in them; without any party block, names
/// are taken from the whole text. Subject blocks contribute
/// their first [`SUBJECT_BLOCK_CHARS`] characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingSplitter;

impl HeadingSplitter {
    pub fn new() -> Self {
        Self
    }
}

impl SectionSplitter for HeadingSplitter {
    fn name(&self) -> &str {
        "heading"
    }

    fn split(&self, text: &str) -> Sections {
        let mut sections = Sections::default();
        let mut party_names = Vec::new();
        let mut has_party_block = false;

        for (kind, block) in blocks(text) {
            match kind {
                BlockKind::Facts => {
                    sections.facts.push_str(block);
                    sections.facts.push('\n');
                }
                BlockKind::Parties => {
                    has_party_block = true;
                    party_names.extend(proper_names(block));
                }
                BlockKind::Subjects => sections.subjects.push(SubjectMention {
                    description: truncate_chars(block, SUBJECT_BLOCK_CHARS).to_string(),
                }),
                BlockKind::Other => {}
            }
        }

        if !has_party_block {
            party_names = proper_names(text);
        }
        sections.parties = mentions(party_names);

        tracing::debug!(
            facts_chars = sections.facts.len(),
            parties = sections.parties.len(),
            subjects = sections.subjects.len(),
            "heading sections"
        );
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETICAO: &str = "DAS PARTES\nAutora Maria da Silva contra Banco Central do Brasil\n\
DOS FATOS\nA autora foi cobrada indevidamente.\n\
ASSUNTO: Cobrança indevida\n\
DOS PEDIDOS\nRequer indenização.";

    #[test]
    fn slices_blocks_between_headings() {
        let kinds: Vec<_> = blocks(PETICAO).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Parties,
                BlockKind::Facts,
                BlockKind::Subjects,
                BlockKind::Other
            ]
        );
    }

    #[test]
    fn split_reads_each_block_by_heading() {
        let sections = HeadingSplitter::new().split(PETICAO);
        assert_eq!(sections.facts, "A autora foi cobrada indevidamente.\n");
        let names: Vec<_> = sections.parties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Autora Maria da Silva", "Banco Central do Brasil"]);
        assert!(sections.parties.iter().all(|p| p.role.is_none()));
        assert_eq!(sections.subjects[0].description, "Cobrança indevida");
    }

    #[test]
    fn subject_blocks_are_truncated() {
        let long = "x".repeat(500);
        let sections = HeadingSplitter::new().split(&format!("Assunto: {long}"));
        assert_eq!(sections.subjects[0].description.len(), SUBJECT_BLOCK_CHARS);
    }

    #[test]
    fn names_fall_back_to_whole_text() {
        let sections = HeadingSplitter::new().split("Ação movida por José Pereira sem seções.");
        assert_eq!(sections.parties[0].name, "José Pereira");
        assert!(sections.facts.is_empty());
    }
}
