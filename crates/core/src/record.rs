use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::field_value::FieldValue;
use crate::ids::RecordId;

/// Name under which the record id travels in schemas and edit requests.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    id: RecordId,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Immutable list of records with structural sharing.
///
/// Every `with_*` call returns a new list and leaves `self` untouched.
/// Records that a mutation does not touch are shared between the old and
/// new list, so `Arc::ptr_eq` holds for them.
#[derive(Debug, Clone, Default)]
pub struct RecordList(Arc<Vec<Arc<Record>>>);

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Result<Self, CoreError> {
        records
            .into_iter()
            .try_fold(Self::new(), |list, record| list.with_appended(record))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.0.iter().map(|r| &**r)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.position(id).map(|idx| &*self.0[idx])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    /// Shared handle to the record with `id`.
    pub fn get_shared(&self, id: &RecordId) -> Option<&Arc<Record>> {
        self.position(id).map(|idx| &self.0[idx])
    }

    /// True when both lists are the same allocation.
    pub fn ptr_eq(&self, other: &RecordList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.0.iter().position(|r| &r.id == id)
    }

    /// Replace one field of the record with `id`. An absent id yields the
    /// list unchanged.
    pub fn with_field(
        &self,
        id: &RecordId,
        field: &str,
        value: FieldValue,
    ) -> Result<Self, CoreError> {
        if field == ID_FIELD {
            return Err(CoreError::ImmutableField(field.to_string()));
        }
        let Some(idx) = self.position(id) else {
            return Ok(self.clone());
        };
        let mut updated = Record::clone(&self.0[idx]);
        updated.fields.insert(field.to_string(), value);
        let mut records = Vec::clone(&self.0);
        records[idx] = Arc::new(updated);
        Ok(Self(Arc::new(records)))
    }

    pub fn with_appended(&self, record: Record) -> Result<Self, CoreError> {
        if self.contains(&record.id) {
            return Err(CoreError::DuplicateId(record.id.to_string()));
        }
        let mut records = Vec::with_capacity(self.0.len() + 1);
        records.extend(self.0.iter().cloned());
        records.push(Arc::new(record));
        Ok(Self(Arc::new(records)))
    }

    /// Remove the record with `id`. Returns whether a record was removed;
    /// when none matched the returned list is `self`.
    pub fn with_removed(&self, id: &RecordId) -> (Self, bool) {
        if !self.contains(id) {
            return (self.clone(), false);
        }
        let records = self
            .0
            .iter()
            .filter(|r| &r.id != id)
            .cloned()
            .collect::<Vec<_>>();
        (Self(Arc::new(records)), true)
    }
}

impl PartialEq for RecordList {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Eq for RecordList {}

impl Serialize for RecordList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RecordList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records: Vec<Record> = Deserialize::deserialize(deserializer)?;
        Self::from_records(records).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> RecordList {
        RecordList::from_records(vec![
            Record::new("a".into()).with("name", "flour").with("qty", 2.0),
            Record::new("b".into()).with("name", "sugar"),
            Record::new("c".into()).with("name", "salt"),
        ])
        .unwrap()
    }

    #[test]
    fn with_field_shares_untouched_records() {
        let before = sample();
        let after = before
            .with_field(&"b".into(), "name", "brown sugar".into())
            .unwrap();

        assert_eq!(
            before.get(&"b".into()).unwrap().get("name"),
            Some(&FieldValue::Text("sugar".into()))
        );
        assert_eq!(
            after.get(&"b".into()).unwrap().get("name"),
            Some(&FieldValue::Text("brown sugar".into()))
        );
        for id in ["a", "c"] {
            let id = RecordId::from(id);
            assert!(Arc::ptr_eq(
                before.get_shared(&id).unwrap(),
                after.get_shared(&id).unwrap()
            ));
        }
    }

    #[test]
    fn with_field_missing_id_is_noop() {
        let before = sample();
        let after = before
            .with_field(&"zzz".into(), "name", "x".into())
            .unwrap();
        assert!(after.ptr_eq(&before));
    }

    #[test]
    fn with_field_rejects_id_field() {
        let err = sample()
            .with_field(&"a".into(), ID_FIELD, "other".into())
            .unwrap_err();
        assert!(matches!(err, CoreError::ImmutableField(_)));
    }

    #[test]
    fn with_appended_rejects_duplicate() {
        let err = sample()
            .with_appended(Record::new("a".into()))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId(_)));
    }

    #[test]
    fn with_removed_is_keyed_by_id() {
        let before = sample();
        let (after, removed) = before.with_removed(&"b".into());
        assert!(removed);
        let ids: Vec<_> = after.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(before.len(), 3);

        let (same, removed) = after.with_removed(&"b".into());
        assert!(!removed);
        assert!(same.ptr_eq(&after));
    }

    fn arb_list() -> impl Strategy<Value = RecordList> {
        prop::collection::btree_map("[a-z]{1,6}", "[a-z ]{0,8}", 1..12).prop_map(|rows| {
            RecordList::from_records(
                rows.into_iter()
                    .map(|(id, name)| Record::new(id.into()).with("name", name))
                    .collect(),
            )
            .unwrap()
        })
    }

    proptest! {
        #[test]
        fn edit_changes_only_target_field(
            list in arb_list(),
            pick in any::<prop::sample::Index>(),
            value in "[a-z]{0,8}",
        ) {
            let target = list.iter().nth(pick.index(list.len())).unwrap().id().clone();
            let snapshot: Vec<Record> = list.iter().cloned().collect();
            let edited = list.with_field(&target, "name", value.clone().into()).unwrap();

            prop_assert_eq!(list.iter().cloned().collect::<Vec<_>>(), snapshot.clone());
            prop_assert_eq!(edited.len(), snapshot.len());
            for (old, new) in snapshot.iter().zip(edited.iter()) {
                prop_assert_eq!(old.id(), new.id());
                if old.id() == &target {
                    prop_assert_eq!(new.get("name"), Some(&FieldValue::Text(value.clone())));
                } else {
                    prop_assert_eq!(old, new);
                }
            }
        }

        #[test]
        fn remove_drops_exactly_one(list in arb_list(), pick in any::<prop::sample::Index>()) {
            let target = list.iter().nth(pick.index(list.len())).unwrap().id().clone();
            let (after, removed) = list.with_removed(&target);
            prop_assert!(removed);
            prop_assert_eq!(after.len(), list.len() - 1);
            prop_assert!(!after.contains(&target));
            let expected: Vec<_> = list.iter().filter(|r| r.id() != &target).cloned().collect();
            prop_assert_eq!(after.iter().cloned().collect::<Vec<_>>(), expected);
        }
    }
}
