use std::io::Write;

use owo_colors::OwoColorize;
use processo_core::report::truncate_chars;
use processo_core::{CaseDocument, ExtractionResult, Method, PartyRole, Sections};

/// Characters of extracted text shown in the terminal summary.
const TEXT_PREVIEW_CHARS: usize = 500;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn heading(w: &mut dyn Write, title: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", title.bold())
    } else {
        writeln!(w, "{}", title)
    }
}

fn role_label(role: PartyRole) -> &'static str {
    match role {
        PartyRole::Plaintiff => "Autor",
        PartyRole::Defendant => "Acusado",
        PartyRole::Prosecution => "MP",
    }
}

/// Print which strategy won and what it produced.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    file_name: &str,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Extracting text from {}...", file_name)?;

    if result.method() == Method::None {
        if color.enabled() {
            writeln!(w, "{}", "No strategy produced usable text".red())?;
        } else {
            writeln!(w, "No strategy produced usable text")?;
        }
        return Ok(());
    }

    if color.enabled() {
        writeln!(
            w,
            "Method: {} ({} chars)",
            result.method().green(),
            result.text().chars().count()
        )?;
    } else {
        writeln!(
            w,
            "Method: {} ({} chars)",
            result.method(),
            result.text().chars().count()
        )?;
    }
    writeln!(w)?;

    if result.structured().is_some() {
        print_structured(w, result, color)?;
    }

    heading(w, "Text:", color)?;
    let preview = truncate_chars(result.text(), TEXT_PREVIEW_CHARS);
    writeln!(w, "{}", preview)?;
    if preview.len() < result.text().len() {
        if color.enabled() {
            writeln!(w, "{}", "[...]".dimmed())?;
        } else {
            writeln!(w, "[...]")?;
        }
    }
    Ok(())
}

fn print_structured(
    w: &mut dyn Write,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    if !result.subjects().is_empty() {
        heading(w, "Subjects:", color)?;
        for subject in result.subjects() {
            let primary = if subject.is_primary.is_empty() {
                String::new()
            } else {
                format!(" [{}]", subject.is_primary)
            };
            writeln!(w, "  {} {}{}", subject.code, subject.description, primary)?;
        }
        writeln!(w)?;
    }

    let parties = result.parties();
    if !parties.is_empty() {
        heading(w, "Parties:", color)?;
        for (_, role) in PartyRole::MARKERS {
            for line in parties.get(role) {
                writeln!(w, "  {:<8} {}", role_label(role), line)?;
            }
        }
        writeln!(w)?;
    }

    if !result.additional_info().is_empty() {
        heading(w, "Additional information:", color)?;
        for (key, value) in result.additional_info() {
            writeln!(w, "  {}: {}", key, value)?;
        }
        writeln!(w)?;
    }

    if color.enabled() {
        writeln!(
            w,
            "{}",
            format!("({} raw tables)", result.raw_tables().len()).dimmed()
        )?;
    } else {
        writeln!(w, "({} raw tables)", result.raw_tables().len())?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print one splitter's sections.
pub fn print_sections(
    w: &mut dyn Write,
    splitter: &str,
    sections: &Sections,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Splitter:".cyan(), splitter)?;
    } else {
        writeln!(w, "Splitter: {}", splitter)?;
    }
    writeln!(w)?;

    heading(w, "Facts:", color)?;
    if sections.facts.trim().is_empty() {
        writeln!(w, "  (none)")?;
    } else {
        writeln!(w, "{}", sections.facts.trim_end())?;
    }
    writeln!(w)?;

    heading(w, "Parties:", color)?;
    if sections.parties.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for party in &sections.parties {
        match &party.role {
            Some(role) => writeln!(w, "  {}: {}", role, party.name)?,
            None => writeln!(w, "  {}", party.name)?,
        }
    }
    writeln!(w)?;

    heading(w, "Subjects:", color)?;
    if sections.subjects.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for subject in &sections.subjects {
        writeln!(w, "  {}", subject.description)?;
    }
    Ok(())
}

/// Print the final document and its cost, if any.
pub fn print_case_document(
    w: &mut dyn Write,
    document: &CaseDocument,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold().cyan())?;
        writeln!(w, "{}", "CASE SUMMARY".bold().cyan())?;
        writeln!(w, "{}", sep.bold().cyan())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "CASE SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }
    writeln!(w)?;
    writeln!(w, "{}", document.summary_of_facts.trim_end())?;
    writeln!(w)?;

    if let Some(analysis) = &document.image_analysis {
        heading(w, "Page image analysis:", color)?;
        writeln!(w, "{}", analysis.trim_end())?;
        writeln!(w)?;
    }

    writeln!(
        w,
        "{} parties, {} subjects",
        document.parties.len(),
        document.subjects.len()
    )?;

    if let Some(costs) = &document.cost_breakdown {
        let line = format!("Estimated AI cost: US$ {:.4}", costs.total_usd);
        if color.enabled() {
            writeln!(w, "{}", line.dimmed())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use processo_core::{PartyMention, SubjectMention};

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn failed_extraction_is_reported() {
        let out = render(|w| {
            print_extraction_summary(w, "a.pdf", &ExtractionResult::None, ColorMode(false))
        });
        assert!(out.contains("No strategy produced usable text"));
    }

    #[test]
    fn plain_text_summary_shows_method_and_text() {
        let result = ExtractionResult::PlainB("Texto da petição".into());
        let out = render(|w| print_extraction_summary(w, "a.pdf", &result, ColorMode(false)));
        assert!(out.contains("Method: plain_b (16 chars)"));
        assert!(out.contains("Texto da petição"));
        assert!(!out.contains("[...]"));
    }

    #[test]
    fn sections_list_roles_and_placeholders() {
        let sections = Sections {
            facts: String::new(),
            parties: vec![PartyMention {
                role: Some("Autor".into()),
                name: "Maria Souza".into(),
            }],
            subjects: vec![SubjectMention {
                description: "Dano moral".into(),
            }],
        };
        let out = render(|w| print_sections(w, "regex", &sections, ColorMode(false)));
        assert!(out.contains("Splitter: regex"));
        assert!(out.contains("  (none)"));
        assert!(out.contains("  Autor: Maria Souza"));
        assert!(out.contains("  Dano moral"));
    }
}
