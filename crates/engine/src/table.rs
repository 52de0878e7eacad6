use std::fmt;

use pantry_core::{ids::RecordId, record::RecordList, schema::Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: RecordId,
    pub cells: Vec<String>,
}

/// Display model of the category table: one column per visible schema
/// field, one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl TableView {
    pub fn build(schema: &Schema, records: &RecordList) -> Self {
        let columns: Vec<String> = schema
            .visible_columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = records
            .iter()
            .map(|record| TableRow {
                id: record.id().clone(),
                cells: columns
                    .iter()
                    .map(|name| record.get(name).map(|v| v.display()).unwrap_or_default())
                    .collect(),
            })
            .collect();
        Self { columns, rows }
    }

    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

/// Renders the table as HTML.
impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<table>\n<thead>\n<tr>")?;
        for name in &self.columns {
            write!(f, "<td>{}</td>", escape(name))?;
        }
        f.write_str("</tr>\n</thead>\n<tbody>\n")?;
        for row in &self.rows {
            let id = escape(row.id.as_str());
            write!(f, "<tr data-id=\"{id}\">")?;
            for (name, cell) in self.columns.iter().zip(&row.cells) {
                write!(
                    f,
                    "<td><input type=\"text\" name=\"{}\" value=\"{}\"></td>",
                    escape(name),
                    escape(cell)
                )?;
            }
            writeln!(
                f,
                "<td><button name=\"delete\" value=\"{id}\">X</button></td></tr>"
            )?;
        }
        writeln!(
            f,
            "<tr><td colspan=\"{}\"><button name=\"add\">add new row</button></td></tr>",
            self.columns.len()
        )?;
        f.write_str("</tbody>\n</table>\n")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::document::CategoryDocument;

    #[test]
    fn build_uses_visible_columns() {
        let view = TableView::build(
            &Schema::pantry_categories(),
            &CategoryDocument::seed().unwrap().categories,
        );
        assert_eq!(view.columns.len(), 6);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(
            view.rows[0].cells,
            vec!["AP Flour", "all purpose flour", "", "52", "false", "true"]
        );
    }

    #[test]
    fn missing_fields_render_empty() {
        let records = RecordList::new()
            .with_appended(pantry_core::record::Record::new("r".into()).with("name", "salt"))
            .unwrap();
        let view = TableView::build(&Schema::pantry_categories(), &records);
        assert_eq!(view.rows[0].cells[0], "salt");
        assert!(view.rows[0].cells[1..].iter().all(String::is_empty));
    }

    #[test]
    fn html_escapes_values() {
        let records = RecordList::new()
            .with_appended(
                pantry_core::record::Record::new("r\"1".into()).with("name", "<b>salt</b> & co"),
            )
            .unwrap();
        let html = TableView::build(&Schema::pantry_categories(), &records).to_html();
        assert!(html.contains("&lt;b&gt;salt&lt;/b&gt; &amp; co"));
        assert!(html.contains("data-id=\"r&quot;1\""));
        assert!(!html.contains("<b>"));
        assert!(html.contains("colspan=\"6\""));
        assert!(html.contains("<td>shelf life, weeks</td>"));
    }

    #[test]
    fn html_has_one_row_per_record() {
        let mut records = CategoryDocument::seed().unwrap().categories;
        records = records
            .with_appended(pantry_core::record::Record::new("r2".into()))
            .unwrap();
        let view = TableView::build(&Schema::pantry_categories(), &records);
        let html = view.to_html();
        assert_eq!(html, format!("{view}"));
        assert_eq!(html.matches("<tr data-id=").count(), 2);
        assert_eq!(html.matches("name=\"delete\"").count(), 2);
        assert!(html.starts_with("<table>\n<thead>"));
        assert!(html.ends_with("</tbody>\n</table>\n"));
    }
}
