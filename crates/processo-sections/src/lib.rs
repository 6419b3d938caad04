//! Two interchangeable [`SectionSplitter`]s over extracted filing text.
//!
//! [`RegexSplitter`] reads labelled mentions ("Autor: ...", "Assunto: ...")
//! anywhere in the text; [`HeadingSplitter`] slices the text into blocks at
//! section headings and reads each block according to its heading.

mod heading;
mod names;
mod regex_splitter;

pub use heading::HeadingSplitter;
pub use names::proper_names;
pub use processo_core::SectionSplitter;
pub use regex_splitter::RegexSplitter;

/// Collapse runs of whitespace to single spaces and trim.
pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Uppercase the first character, lowercase the rest.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
