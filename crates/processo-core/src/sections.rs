use serde::{Deserialize, Serialize};

/// A party name found in running text, with the role label when one was
/// attached to it (e.g. "Autor", "Réu").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMention {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMention {
    pub description: String,
}

/// Named sections of a filing's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(default)]
    pub facts: String,
    #[serde(default)]
    pub parties: Vec<PartyMention>,
    #[serde(default)]
    pub subjects: Vec<SubjectMention>,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.facts.trim().is_empty() && self.parties.is_empty() && self.subjects.is_empty()
    }
}

/// Splits extracted text into [`Sections`].
pub trait SectionSplitter: Send + Sync {
    fn name(&self) -> &str;

    fn split(&self, text: &str) -> Sections;
}
