//! Table reconstruction from positioned text lines.
//!
//! PDF engines hand back text lines with bounding boxes, not tables. The
//! structured page of a filing lays its metadata out as ruled tables, so
//! the tables can be rebuilt from geometry alone:
//!
//! 1. lines whose vertical centres overlap form a visual row;
//! 2. a vertical gap much larger than the typical row height ends a table,
//!    and so does a row carrying a table marker (`Assuntos`, `Partes`,
//!    `Informações Adicionais`), since stacked tables share row spacing;
//! 3. cell left edges are clustered into columns, and every row gets one
//!    slot per column (`None` where the row has no text in that column).

use crate::model::RawTable;
use crate::tables::{ADDITIONAL_INFO_MARKER, PARTIES_MARKER, SUBJECTS_MARKER};

/// Axis-aligned bounding box in page coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }
}

/// A line of text with its position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    pub text: String,
    pub bbox: BBox,
}

impl PositionedLine {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    text: String,
    x0: f32,
}

#[derive(Debug, Clone)]
struct Row {
    cells: Vec<Cell>,
    y0: f32,
    y1: f32,
}

impl Row {
    fn start(line: &PositionedLine) -> Self {
        Self {
            cells: vec![Cell {
                text: line.text.trim().to_string(),
                x0: line.bbox.x0,
            }],
            y0: line.bbox.y0,
            y1: line.bbox.y1,
        }
    }

    fn accepts(&self, bbox: &BBox) -> bool {
        let center = bbox.center_y();
        let own_center = (self.y0 + self.y1) / 2.0;
        (center >= self.y0 && center <= self.y1) || (own_center >= bbox.y0 && own_center <= bbox.y1)
    }

    fn add(&mut self, line: &PositionedLine) {
        self.cells.push(Cell {
            text: line.text.trim().to_string(),
            x0: line.bbox.x0,
        });
        self.y0 = self.y0.min(line.bbox.y0);
        self.y1 = self.y1.max(line.bbox.y1);
    }

    fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Whether any cell names one of the recognised table kinds.
    fn has_marker(&self) -> bool {
        self.cells.iter().any(|cell| {
            [SUBJECTS_MARKER, PARTIES_MARKER, ADDITIONAL_INFO_MARKER]
                .iter()
                .any(|marker| cell.text.contains(*marker))
        })
    }
}

/// Rebuilds tables from the positioned lines of one page.
#[derive(Debug, Clone)]
pub struct TableDetector {
    /// A gap above `gap_factor × median row height` separates two tables.
    gap_factor: f32,
    /// Cells whose left edges are within this many points share a column.
    column_tolerance: f32,
}

impl Default for TableDetector {
    fn default() -> Self {
        Self {
            gap_factor: 1.8,
            column_tolerance: 6.0,
        }
    }
}

impl TableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gap_factor(mut self, factor: f32) -> Self {
        self.gap_factor = factor;
        self
    }

    pub fn with_column_tolerance(mut self, tolerance: f32) -> Self {
        self.column_tolerance = tolerance;
        self
    }

    /// Detect tables on a page. A table needs at least two rows, and either
    /// a row with two or more cells or a marker in its first row; anything
    /// else is running text.
    pub fn detect(&self, lines: &[PositionedLine]) -> Vec<RawTable> {
        let rows = group_rows(lines);
        if rows.is_empty() {
            return Vec::new();
        }

        let median = median_height(&rows);
        let max_gap = self.gap_factor * median;

        let mut tables = Vec::new();
        let mut current: Vec<Row> = Vec::new();
        for row in rows {
            if let Some(prev) = current.last() {
                if row.y0 - prev.y1 > max_gap || row.has_marker() {
                    tables.push(std::mem::take(&mut current));
                }
            }
            current.push(row);
        }
        tables.push(current);

        tables
            .into_iter()
            .filter(|rows| {
                rows.len() >= 2
                    && (rows.iter().any(|r| r.cells.len() >= 2) || rows[0].has_marker())
            })
            .map(|rows| self.align_columns(&rows))
            .collect()
    }

    fn align_columns(&self, rows: &[Row]) -> RawTable {
        let mut edges: Vec<f32> = rows
            .iter()
            .flat_map(|r| r.cells.iter().map(|c| c.x0))
            .collect();
        edges.sort_by(f32::total_cmp);

        let mut anchors: Vec<f32> = Vec::new();
        for x in edges {
            match anchors.last() {
                Some(&anchor) if x - anchor <= self.column_tolerance => {}
                _ => anchors.push(x),
            }
        }

        let out = rows
            .iter()
            .map(|row| {
                let mut slots: Vec<Option<String>> = vec![None; anchors.len()];
                for cell in &row.cells {
                    let col = column_of(&anchors, cell.x0, self.column_tolerance);
                    if let Some(existing) = &mut slots[col] {
                        existing.push(' ');
                        existing.push_str(&cell.text);
                    } else {
                        slots[col] = Some(cell.text.clone());
                    }
                }
                slots
            })
            .collect();

        RawTable::new(out)
    }
}

/// Index of the right-most anchor at or left of `x` (within tolerance).
fn column_of(anchors: &[f32], x: f32, tolerance: f32) -> usize {
    anchors
        .iter()
        .rposition(|&a| a <= x + tolerance)
        .unwrap_or(0)
}

fn group_rows(lines: &[PositionedLine]) -> Vec<Row> {
    let mut sorted: Vec<&PositionedLine> =
        lines.iter().filter(|l| !l.text.trim().is_empty()).collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .y0
            .total_cmp(&b.bbox.y0)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut rows: Vec<Row> = Vec::new();
    for line in sorted {
        match rows.last_mut() {
            Some(row) if row.accepts(&line.bbox) => row.add(line),
            _ => rows.push(Row::start(line)),
        }
    }

    for row in &mut rows {
        row.cells.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    rows
}

fn median_height(rows: &[Row]) -> f32 {
    let mut heights: Vec<f32> = rows.iter().map(Row::height).collect();
    heights.sort_by(f32::total_cmp);
    let median = heights[heights.len() / 2];
    if median > 0.0 { median } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, x0: f32, y0: f32) -> PositionedLine {
        PositionedLine::new(text, BBox::new(x0, y0, x0 + 8.0 * text.len() as f32, y0 + 10.0))
    }

    fn cells(table: &RawTable, row: usize) -> Vec<Option<&str>> {
        table.rows[row].iter().map(|c| c.as_deref()).collect()
    }

    #[test]
    fn rebuilds_three_column_table() {
        let lines = vec![
            line("Assuntos", 50.0, 100.0),
            line("Descrição", 150.0, 100.5),
            line("Principal", 350.0, 99.5),
            line("001", 50.0, 114.0),
            line("Dano moral", 150.0, 114.0),
            line("S", 350.0, 114.0),
        ];
        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            cells(&tables[0], 0),
            vec![Some("Assuntos"), Some("Descrição"), Some("Principal")]
        );
        assert_eq!(cells(&tables[0], 1), vec![Some("001"), Some("Dano moral"), Some("S")]);
    }

    #[test]
    fn missing_cells_become_none() {
        let lines = vec![
            line("Chave", 50.0, 100.0),
            line("Valor", 200.0, 100.0),
            line("Segredo de justiça:", 50.0, 114.0),
        ];
        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(cells(&tables[0], 1), vec![Some("Segredo de justiça:"), None]);
    }

    #[test]
    fn large_gap_splits_tables() {
        let lines = vec![
            line("Assuntos", 50.0, 100.0),
            line("Descrição", 150.0, 100.0),
            line("001", 50.0, 114.0),
            line("Dano", 150.0, 114.0),
            line("Partes", 50.0, 300.0),
            line("Advogados", 150.0, 300.0),
            line("AUTOR", 50.0, 314.0),
        ];
        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].rows[0][0].as_deref(), Some("Partes"));
        assert_eq!(tables[1].len(), 2);
    }

    #[test]
    fn marker_row_starts_a_new_table() {
        let lines = vec![
            line("Assuntos", 50.0, 100.0),
            line("Descrição", 150.0, 100.0),
            line("001", 50.0, 114.0),
            line("Dano", 150.0, 114.0),
            line("Partes e Representantes", 50.0, 128.0),
            line("AUTOR", 50.0, 142.0),
            line("João Silva", 50.0, 156.0),
        ];
        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(cells(&tables[1], 0), vec![Some("Partes e Representantes")]);
        assert_eq!(cells(&tables[1], 2), vec![Some("João Silva")]);
    }

    #[test]
    fn single_column_table_kept_when_headed_by_marker() {
        let lines = vec![
            line("Partes e Representantes", 50.0, 100.0),
            line("AUTOR", 50.0, 114.0),
            line("João Silva", 50.0, 128.0),
        ];
        let tables = TableDetector::new().detect(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3);
    }

    #[test]
    fn single_column_text_is_not_a_table() {
        let lines = vec![
            line("Dos fatos", 50.0, 100.0),
            line("O autor alega que", 50.0, 114.0),
            line("sofreu dano.", 50.0, 128.0),
        ];
        assert!(TableDetector::new().detect(&lines).is_empty());
    }

    #[test]
    fn single_row_is_not_a_table() {
        let lines = vec![line("a", 50.0, 100.0), line("b", 150.0, 100.0)];
        assert!(TableDetector::new().detect(&lines).is_empty());
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert!(TableDetector::new().detect(&[line("   ", 0.0, 0.0)]).is_empty());
    }
}
