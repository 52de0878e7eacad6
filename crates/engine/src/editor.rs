use pantry_core::{
    document::{CategoryDocument, Persisted},
    field_value::FieldValue,
    ids::{RecordId, Revision},
    record::RecordList,
    schema::Schema,
};
use pantry_storage::DocumentStore;
use tracing::{debug, error, info};

use crate::context::StoreHandle;
use crate::error::EngineError;
use crate::table::TableView;

/// In-memory editing session over the categories document.
///
/// Cell edits and row changes only touch the local record list. Nothing is
/// written until [`TableEditor::save`] is called.
#[derive(Debug, Clone)]
pub struct TableEditor {
    document_id: String,
    schema: Schema,
    records: RecordList,
    saved: RecordList,
    revision: Option<Revision>,
}

impl TableEditor {
    pub fn new(document_id: &str, schema: Schema, document: CategoryDocument) -> Self {
        Self {
            document_id: document_id.to_string(),
            schema,
            saved: document.categories.clone(),
            records: document.categories,
            revision: document.revision,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = schema;
    }

    pub fn records(&self) -> &RecordList {
        &self.records
    }

    /// Revision of the last document this editor loaded or saved.
    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    /// Whether local edits have not been saved yet.
    pub fn is_dirty(&self) -> bool {
        self.records != self.saved
    }

    pub fn visible_columns(&self) -> Vec<&str> {
        self.schema.visible_columns()
    }

    pub fn view(&self) -> TableView {
        TableView::build(&self.schema, &self.records)
    }

    /// Set `field` of the record `id` to `value`. Unknown ids are ignored.
    pub fn edit_cell(
        &mut self,
        value: FieldValue,
        field: &str,
        id: &RecordId,
    ) -> Result<(), EngineError> {
        if !self.records.contains(id) {
            debug!(record = %id, field, "edit for unknown record ignored");
        }
        self.records = self.records.with_field(id, field, value)?;
        Ok(())
    }

    /// Like [`edit_cell`](Self::edit_cell), interpreting `raw` by the
    /// column's kind.
    pub fn edit_cell_text(
        &mut self,
        raw: &str,
        field: &str,
        id: &RecordId,
    ) -> Result<(), EngineError> {
        let value = self.schema.coerce_input(field, raw);
        self.edit_cell(value, field, id)
    }

    /// Append a record filled with schema defaults and return its id.
    pub fn add_row(&mut self) -> RecordId {
        loop {
            let id = RecordId::generate();
            if let Ok(records) = self.records.with_appended(self.schema.new_record(id.clone())) {
                self.records = records;
                return id;
            }
        }
    }

    /// Remove the record `id`. Returns false, leaving the list as is, when
    /// no record has that id.
    pub fn delete_row(&mut self, id: &RecordId) -> bool {
        let (records, removed) = self.records.with_removed(id);
        if !removed {
            debug!(record = %id, "delete for unknown record ignored");
        }
        self.records = records;
        removed
    }

    /// Write the local record list over the latest stored document.
    ///
    /// The stored categories are replaced wholesale. On failure the error is
    /// logged and returned and the local state is left as it was.
    pub async fn save(&mut self, store: &StoreHandle) -> Result<Revision, EngineError> {
        let records = self.records.clone();
        let doc_id = self.document_id.clone();
        let outcome = store
            .run({
                let records = records.clone();
                move |s| save_categories(s, &doc_id, records)
            })
            .await;

        match outcome {
            Ok(revision) => {
                info!(store = store.name(), doc_id = %self.document_id, %revision, "saved document");
                self.saved = records;
                self.revision = Some(revision.clone());
                Ok(revision)
            }
            Err(err) => {
                error!(store = store.name(), doc_id = %self.document_id, error = %err, "failed to save document");
                Err(err)
            }
        }
    }
}

fn save_categories(
    store: &mut dyn DocumentStore,
    doc_id: &str,
    categories: RecordList,
) -> Result<Revision, EngineError> {
    let latest = store.get(doc_id)?;
    let current = CategoryDocument::decode(&latest.body, latest.revision.clone())?;
    let merged = current.with_categories(categories);
    Ok(store.put(doc_id, Some(&latest.revision), &merged.encode()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::record::Record;

    fn editor() -> TableEditor {
        TableEditor::new(
            "categories",
            Schema::pantry_categories(),
            CategoryDocument::seed().unwrap(),
        )
    }

    #[test]
    fn edit_cell_replaces_one_field() {
        let mut editor = editor();
        let before = editor.records().clone();
        let id = RecordId::from("xxxxx");

        editor
            .edit_cell("bread flour".into(), "name", &id)
            .unwrap();

        let after = editor.records().get(&id).unwrap();
        assert_eq!(after.get("name"), Some(&FieldValue::Text("bread flour".into())));
        assert_eq!(after.get("staple"), Some(&FieldValue::Boolean(true)));
        assert_eq!(
            before.get(&id).unwrap().get("name"),
            Some(&FieldValue::Text("AP Flour".into()))
        );
        assert!(editor.is_dirty());
    }

    #[test]
    fn edit_cell_text_coerces() {
        let mut editor = editor();
        let id = RecordId::from("xxxxx");
        editor.edit_cell_text("26", "shelf life, weeks", &id).unwrap();
        assert_eq!(
            editor.records().get(&id).unwrap().get("shelf life, weeks"),
            Some(&FieldValue::Number(26.0))
        );
    }

    #[test]
    fn edit_cell_rejects_id() {
        let mut editor = editor();
        let err = editor
            .edit_cell("other".into(), "_id", &RecordId::from("xxxxx"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(_)));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn add_row_uses_fresh_id_and_defaults() {
        let mut editor = editor();
        let before = editor.records().clone();
        let id = editor.add_row();

        assert!(!before.contains(&id));
        assert_eq!(editor.records().len(), before.len() + 1);
        let added = editor.records().iter().last().unwrap();
        assert_eq!(added, &Schema::pantry_categories().new_record(id));
    }

    #[test]
    fn delete_row_by_id() {
        let mut editor = editor();
        let id = editor.add_row();
        assert!(editor.delete_row(&RecordId::from("xxxxx")));
        let ids: Vec<_> = editor.records().iter().map(Record::id).cloned().collect();
        assert_eq!(ids, vec![id]);

        let before = editor.records().clone();
        assert!(!editor.delete_row(&RecordId::from("missing")));
        assert!(editor.records().ptr_eq(&before));
    }
}
