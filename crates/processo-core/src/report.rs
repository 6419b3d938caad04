use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{ExtractionResult, Method, Parties, RawTable, Subject};
use crate::sections::{PartyMention, Sections, SubjectMention};
use crate::summary::{CostBreakdown, pre_ai_prompt};

/// Extracted text is cut to this many characters in a [`Preview`].
pub const PREVIEW_TEXT_LIMIT: usize = 10_000;

/// Everything gathered before any provider call, for the user to review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub text: String,
    pub method: Method,
    pub sections: Sections,
    pub heading_sections: Sections,
    pub subjects: Vec<Subject>,
    pub parties: Parties,
    pub additional_info: IndexMap<String, String>,
    pub raw_tables: Vec<RawTable>,
    /// Artifact id of the rendered structured page, when rendering succeeded.
    pub page_image: Option<String>,
    pub prompt: String,
}

impl Preview {
    pub fn new(
        extraction: &ExtractionResult,
        sections: Sections,
        heading_sections: Sections,
        page_image: Option<String>,
    ) -> Self {
        let prompt = pre_ai_prompt(&sections.facts);
        Self {
            text: truncate_chars(extraction.text(), PREVIEW_TEXT_LIMIT).to_string(),
            method: extraction.method(),
            sections,
            heading_sections,
            subjects: extraction.subjects().to_vec(),
            parties: extraction.parties().clone(),
            additional_info: extraction.additional_info().clone(),
            raw_tables: extraction.raw_tables().to_vec(),
            page_image,
            prompt,
        }
    }
}

/// The final deliverable for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDocument {
    pub parties: Vec<PartyMention>,
    pub subjects: Vec<SubjectMention>,
    pub summary_of_facts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_breakdown: Option<CostBreakdown>,
}

impl CaseDocument {
    pub fn new(sections: &Sections, summary_of_facts: impl Into<String>) -> Self {
        Self {
            parties: sections.parties.clone(),
            subjects: sections.subjects.clone(),
            summary_of_facts: summary_of_facts.into(),
            image_analysis: None,
            cost_breakdown: None,
        }
    }

    pub fn with_image_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.image_analysis = Some(analysis.into());
        self
    }

    pub fn with_cost_breakdown(mut self, costs: CostBreakdown) -> Self {
        self.cost_breakdown = Some(costs);
        self
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
