// File: ./src/model/merge.rs
use crate::model::EventRecord;
use std::collections::HashMap;

/// Folds `incoming` into `current`, field by field.
/// A field is only overwritten when the incoming value is present, so a
/// failed extraction never erases what an earlier run learned.
pub fn merge_non_destructive(current: &mut EventRecord, incoming: &EventRecord) {
    macro_rules! merge_field {
        ($field:ident) => {
            if incoming.$field.is_some() {
                current.$field = incoming.$field.clone();
            }
        };
    }

    merge_field!(title);
    merge_field!(link);
    merge_field!(date);
    merge_field!(start);
    merge_field!(end);
    merge_field!(description);
}

/// Merges freshly extracted records into a previously persisted list.
///
/// Existing records keep their relative order; unseen ids are appended in the
/// order they arrive. Ids are compared as plain strings.
pub fn reconcile(existing: Vec<EventRecord>, candidates: Vec<EventRecord>) -> Vec<EventRecord> {
    let mut merged = existing;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, rec)| (rec.id.clone(), i))
        .collect();

    for candidate in candidates {
        match index.get(&candidate.id) {
            Some(&i) => merge_non_destructive(&mut merged[i], &candidate),
            None => {
                index.insert(candidate.id.clone(), merged.len());
                merged.push(candidate);
            }
        }
    }
    merged
}
