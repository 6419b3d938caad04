use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Which strategy produced an [`ExtractionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Structured,
    PlainA,
    PlainB,
    Ocr,
    None,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Structured => "structured",
            Method::PlainA => "plain_a",
            Method::PlainB => "plain_b",
            Method::Ocr => "ocr",
            Method::None => "none",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A case subject row from the "Assuntos" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub description: String,
    pub is_primary: String,
}

/// Party role categories of the "Partes" table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Plaintiff,
    Defendant,
    Prosecution,
}

impl PartyRole {
    /// Marker rows switch the current role. Checked in this order; the
    /// first substring hit wins.
    pub const MARKERS: [(&'static str, PartyRole); 3] = [
        ("AUTOR", PartyRole::Plaintiff),
        ("ACUSADO", PartyRole::Defendant),
        ("MP", PartyRole::Prosecution),
    ];
}

/// Parties and their representatives grouped by role, as raw row strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    pub plaintiff: Vec<String>,
    pub defendant: Vec<String>,
    pub prosecution: Vec<String>,
}

impl Parties {
    pub fn get(&self, role: PartyRole) -> &[String] {
        match role {
            PartyRole::Plaintiff => &self.plaintiff,
            PartyRole::Defendant => &self.defendant,
            PartyRole::Prosecution => &self.prosecution,
        }
    }

    pub fn push(&mut self, role: PartyRole, line: String) {
        match role {
            PartyRole::Plaintiff => self.plaintiff.push(line),
            PartyRole::Defendant => self.defendant.push(line),
            PartyRole::Prosecution => self.prosecution.push(line),
        }
    }

    pub fn extend(&mut self, other: Parties) {
        self.plaintiff.extend(other.plaintiff);
        self.defendant.extend(other.defendant);
        self.prosecution.extend(other.prosecution);
    }

    pub fn is_empty(&self) -> bool {
        self.plaintiff.is_empty() && self.defendant.is_empty() && self.prosecution.is_empty()
    }
}

/// A table as returned by the layout engine: rows of optional cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build a table from plain strings; empty strings become `None`.
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.into();
                        if cell.is_empty() { None } else { Some(cell) }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn header(&self) -> Option<&[Option<String>]> {
        self.rows.first().map(|r| r.as_slice())
    }

    pub fn body(&self) -> &[Vec<Option<String>>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output of the structured strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredContent {
    /// Narrative text of every page except the structured page.
    pub text: String,
    pub subjects: Vec<Subject>,
    pub parties: Parties,
    pub additional_info: IndexMap<String, String>,
    pub raw_tables: Vec<RawTable>,
}

impl StructuredContent {
    /// Usable if any of the narrative or structured fields carries data.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
            || !self.subjects.is_empty()
            || !self.parties.is_empty()
            || !self.additional_info.is_empty()
    }
}

static EMPTY_PARTIES: Parties = Parties {
    plaintiff: Vec::new(),
    defendant: Vec::new(),
    prosecution: Vec::new(),
};

static EMPTY_INFO: Lazy<IndexMap<String, String>> = Lazy::new(IndexMap::new);

/// The result of running the extraction pipeline over one document.
///
/// Exactly one strategy's output. Structured fields only exist on the
/// [`ExtractionResult::Structured`] variant; the accessors return empty
/// values for the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Structured(StructuredContent),
    PlainA(String),
    PlainB(String),
    Ocr(String),
    None,
}

impl ExtractionResult {
    pub fn method(&self) -> Method {
        match self {
            ExtractionResult::Structured(_) => Method::Structured,
            ExtractionResult::PlainA(_) => Method::PlainA,
            ExtractionResult::PlainB(_) => Method::PlainB,
            ExtractionResult::Ocr(_) => Method::Ocr,
            ExtractionResult::None => Method::None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ExtractionResult::Structured(c) => &c.text,
            ExtractionResult::PlainA(t) | ExtractionResult::PlainB(t) | ExtractionResult::Ocr(t) => t,
            ExtractionResult::None => "",
        }
    }

    pub fn structured(&self) -> Option<&StructuredContent> {
        match self {
            ExtractionResult::Structured(c) => Some(c),
            _ => None,
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        self.structured().map(|c| c.subjects.as_slice()).unwrap_or(&[])
    }

    pub fn parties(&self) -> &Parties {
        self.structured().map(|c| &c.parties).unwrap_or(&EMPTY_PARTIES)
    }

    pub fn additional_info(&self) -> &IndexMap<String, String> {
        self.structured()
            .map(|c| &c.additional_info)
            .unwrap_or(&EMPTY_INFO)
    }

    pub fn raw_tables(&self) -> &[RawTable] {
        self.structured()
            .map(|c| c.raw_tables.as_slice())
            .unwrap_or(&[])
    }

    /// Whether this result passes its strategy's success test.
    pub fn is_usable(&self) -> bool {
        match self {
            ExtractionResult::Structured(c) => c.has_content(),
            ExtractionResult::PlainA(t) | ExtractionResult::PlainB(t) | ExtractionResult::Ocr(t) => {
                !t.trim().is_empty()
            }
            ExtractionResult::None => false,
        }
    }
}

#[derive(Serialize)]
struct ExtractionJson<'a> {
    method: Method,
    text: &'a str,
    subjects: &'a [Subject],
    parties: &'a Parties,
    additional_info: &'a IndexMap<String, String>,
    raw_tables: &'a [RawTable],
}

impl Serialize for ExtractionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ExtractionJson {
            method: self.method(),
            text: self.text(),
            subjects: self.subjects(),
            parties: self.parties(),
            additional_info: self.additional_info(),
            raw_tables: self.raw_tables(),
        }
        .serialize(serializer)
    }
}
