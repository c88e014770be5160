//! Bucket tag merging

use std::collections::{BTreeMap, HashMap};

/// Merge a bucket's existing tags into the requested ones.
///
/// Existing tags missing from `requested` are always kept. For keys present
/// in both, the requested value wins only when `overwrite` is set.
pub fn merge_tags<I>(
    existing: I,
    requested: HashMap<String, String>,
    overwrite: bool,
) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut merged: BTreeMap<String, String> = requested.into_iter().collect();

    for (key, value) in existing {
        if overwrite && merged.contains_key(&key) {
            continue;
        }
        merged.insert(key, value);
    }

    merged
}
