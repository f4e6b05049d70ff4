use crate::EntityKind;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct CountRow {
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Rows")]
    pub count: String,
}

/// Two-column table of row counts per entity kind
pub struct TableBuilder {
    rows: Vec<CountRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, count: impl ToString) {
        self.rows.push(CountRow {
            kind: label.to_string(),
            count: count.to_string(),
        });
    }

    pub fn add_count(&mut self, kind: EntityKind, count: impl ToString) {
        self.add_row(kind.as_str(), count);
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts per kind followed by a total row
pub fn counts_table(counts: &[(EntityKind, u64)]) -> String {
    let mut builder = TableBuilder::new();
    let mut total = 0u64;
    for (kind, count) in counts {
        builder.add_count(*kind, count);
        total += count;
    }
    builder.add_row("total", total);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_table_has_total() {
        let table = counts_table(&[(EntityKind::Exam, 2), (EntityKind::Lesson, 3)]);
        assert!(table.contains("exam"));
        assert!(table.contains("total"));
        assert!(table.contains('5'));
    }

    #[test]
    fn test_empty_builder_is_empty() {
        assert!(TableBuilder::new().build().is_empty());
    }
}
