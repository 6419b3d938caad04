//! Classification and parsing of the structured page's tables.
//!
//! A table is recognised by substrings of its header row. Marker text is
//! matched case-sensitively, in the language of the filings, and is kept
//! verbatim for compatibility with existing documents.

use indexmap::IndexMap;

use crate::model::{Parties, PartyRole, RawTable, Subject};

pub const SUBJECTS_MARKER: &str = "Assuntos";
pub const PARTIES_MARKER: &str = "Partes";
pub const ADDITIONAL_INFO_MARKER: &str = "Informações Adicionais";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Subjects,
    Parties,
    AdditionalInfo,
    Unrecognized,
}

/// Classify a table by its header row. Checked in the order subjects,
/// parties, additional info.
pub fn classify(table: &RawTable) -> TableKind {
    let Some(header) = table.header() else {
        return TableKind::Unrecognized;
    };
    let has = |marker: &str| {
        header
            .iter()
            .any(|cell| cell.as_deref().is_some_and(|c| c.contains(marker)))
    };

    if has(SUBJECTS_MARKER) {
        TableKind::Subjects
    } else if has(PARTIES_MARKER) {
        TableKind::Parties
    } else if has(ADDITIONAL_INFO_MARKER) {
        TableKind::AdditionalInfo
    } else {
        TableKind::Unrecognized
    }
}

fn cell_text(row: &[Option<String>], index: usize) -> String {
    row.get(index).cloned().flatten().unwrap_or_default()
}

fn is_blank(cell: &Option<String>) -> bool {
    cell.as_deref().is_none_or(|c| c.trim().is_empty())
}

/// One subject per body row with at least three cells.
pub fn parse_subjects(table: &RawTable) -> Vec<Subject> {
    table
        .body()
        .iter()
        .filter(|row| row.len() >= 3)
        .map(|row| Subject {
            code: cell_text(row, 0),
            description: cell_text(row, 1),
            is_primary: cell_text(row, 2),
        })
        .collect()
}

/// Scanner state while walking a parties table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartyState {
    Idle,
    Collecting(PartyRole),
}

fn marker_role(joined: &str) -> Option<PartyRole> {
    PartyRole::MARKERS
        .iter()
        .find(|(marker, _)| joined.contains(marker))
        .map(|(_, role)| *role)
}

/// Group the rows of a parties table by role.
///
/// Marker rows (`AUTOR`, `ACUSADO`, `MP`) switch the current role and are
/// not recorded themselves. Any other row with a non-blank cell is
/// appended to the current role as its non-blank cells joined by spaces.
/// Rows before the first marker are dropped.
pub fn parse_parties(table: &RawTable) -> Parties {
    let mut parties = Parties::default();
    let mut state = PartyState::Idle;

    for row in &table.rows {
        let joined = row
            .iter()
            .filter(|c| !is_blank(c))
            .filter_map(|c| c.as_deref())
            .collect::<Vec<_>>()
            .join(" ");

        if let Some(role) = marker_role(&joined) {
            state = PartyState::Collecting(role);
            continue;
        }

        if let PartyState::Collecting(role) = state {
            if !joined.is_empty() {
                parties.push(role, joined);
            }
        }
    }

    parties
}

/// Key/value pairs from body rows with two or more cells and a non-blank key.
pub fn parse_additional_info(table: &RawTable) -> IndexMap<String, String> {
    let mut info = IndexMap::new();
    for row in table.body() {
        if row.len() < 2 || is_blank(&row[0]) {
            continue;
        }
        let key = cell_text(row, 0);
        let key = key.trim().trim_end_matches(':').trim_end().to_string();
        let value = cell_text(row, 1).trim().to_string();
        info.insert(key, value);
    }
    info
}

/// Everything recognised on the structured page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTables {
    pub subjects: Vec<Subject>,
    pub parties: Parties,
    pub additional_info: IndexMap<String, String>,
}

/// Parse every recognised table, accumulating across tables of the same kind.
pub fn parse_tables(tables: &[RawTable]) -> ParsedTables {
    let mut parsed = ParsedTables::default();
    for table in tables {
        match classify(table) {
            TableKind::Subjects => parsed.subjects.extend(parse_subjects(table)),
            TableKind::Parties => parsed.parties.extend(parse_parties(table)),
            TableKind::AdditionalInfo => parsed.additional_info.extend(parse_additional_info(table)),
            TableKind::Unrecognized => {
                tracing::debug!(rows = table.len(), "ignoring unrecognized table");
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_header_substring() {
        let subjects = RawTable::from_strings([vec!["Assuntos", "Descrição", "Principal"]]);
        let parties = RawTable::from_strings([vec!["Partes e Representantes"]]);
        let info = RawTable::from_strings([vec!["Informações Adicionais", ""]]);
        let other = RawTable::from_strings([vec!["Movimentações"]]);
        assert_eq!(classify(&subjects), TableKind::Subjects);
        assert_eq!(classify(&parties), TableKind::Parties);
        assert_eq!(classify(&info), TableKind::AdditionalInfo);
        assert_eq!(classify(&other), TableKind::Unrecognized);
        assert_eq!(classify(&RawTable::default()), TableKind::Unrecognized);
    }

    #[test]
    fn markers_are_case_sensitive() {
        let t = RawTable::from_strings([vec!["ASSUNTOS"], vec!["x"]]);
        assert_eq!(classify(&t), TableKind::Unrecognized);
    }

    #[test]
    fn subjects_precede_parties_in_classification() {
        let t = RawTable::from_strings([vec!["Assuntos", "Partes"]]);
        assert_eq!(classify(&t), TableKind::Subjects);
    }

    #[test]
    fn subject_rows_need_three_cells() {
        let t = RawTable::from_strings([
            vec!["Assuntos", "Descrição", "Principal"],
            vec!["001", "Dano moral", "S"],
            vec!["002", "Incompleto"],
            vec!["003", "", "N"],
        ]);
        let subjects = parse_subjects(&t);
        assert_eq!(subjects.len(), 2);
        assert_eq!(
            subjects[0],
            Subject {
                code: "001".into(),
                description: "Dano moral".into(),
                is_primary: "S".into(),
            }
        );
        assert_eq!(subjects[1].description, "");
    }

    #[test]
    fn party_state_machine_groups_rows() {
        let t = RawTable::from_strings([
            vec!["Partes e Representantes"],
            vec!["AUTOR"],
            vec!["João Silva"],
            vec!["ACUSADO"],
            vec!["Empresa X"],
        ]);
        let parties = parse_parties(&t);
        assert_eq!(parties.plaintiff, vec!["João Silva"]);
        assert_eq!(parties.defendant, vec!["Empresa X"]);
        assert!(parties.prosecution.is_empty());
    }

    #[test]
    fn rows_before_first_marker_are_dropped() {
        let t = RawTable::from_strings([
            vec!["Partes", ""],
            vec!["Sem papel", ""],
            vec!["MP", ""],
            vec!["Promotor", "OAB 123"],
            vec!["", "  "],
        ]);
        let parties = parse_parties(&t);
        assert!(parties.plaintiff.is_empty());
        assert_eq!(parties.prosecution, vec!["Promotor OAB 123"]);
    }

    #[test]
    fn marker_priority_is_autor_first() {
        let t = RawTable::from_strings([
            vec!["Partes"],
            vec!["ACUSADO e AUTOR"],
            vec!["Fulano"],
        ]);
        assert_eq!(parse_parties(&t).plaintiff, vec!["Fulano"]);
    }

    #[test]
    fn mp_matches_as_plain_substring() {
        let t = RawTable::from_strings([
            vec!["Partes"],
            vec!["AUTOR"],
            vec!["EMPRESA LTDA"],
            vec!["Beltrano"],
        ]);
        let parties = parse_parties(&t);
        assert!(parties.plaintiff.is_empty());
        assert_eq!(parties.prosecution, vec!["Beltrano"]);
    }

    #[test]
    fn additional_info_keys_lose_trailing_colon() {
        let t = RawTable::from_strings([
            vec!["Informações Adicionais", ""],
            vec![" Valor da causa: ", " R$ 10.000,00 "],
            vec!["Justiça gratuita:", ""],
            vec!["", "orphan"],
            vec!["Valor da causa", "R$ 20.000,00"],
        ]);
        let info = parse_additional_info(&t);
        assert_eq!(info.len(), 2);
        assert_eq!(info["Valor da causa"], "R$ 20.000,00");
        assert_eq!(info["Justiça gratuita"], "");
        assert_eq!(info.get_index(0).unwrap().0, "Valor da causa");
    }

    #[test]
    fn parse_tables_accumulates_and_skips_unknown() {
        let tables = vec![
            RawTable::from_strings([vec!["Assuntos", "Descrição", "Principal"], vec!["1", "A", "S"]]),
            RawTable::from_strings([vec!["Outra"], vec!["x"]]),
            RawTable::from_strings([vec!["Assuntos", "Descrição", "Principal"], vec!["2", "B", "N"]]),
        ];
        let parsed = parse_tables(&tables);
        let codes: Vec<_> = parsed.subjects.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "2"]);
        assert!(parsed.parties.is_empty());
    }
}
