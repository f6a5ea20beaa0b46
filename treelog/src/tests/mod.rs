//! Log engine and store tests


use assert_matches::assert_matches;
use treelog_storage::Storage;

use crate::{Error, Leaf, LogStorage};

pub(crate) fn leaf(tag: &str) -> Leaf {
    Leaf::new(tag.as_bytes().to_vec())
}

/// Two transactions append to level 0 from the same committed state. The
/// first commit wins; the second must fail and leave the first node intact.
pub(crate) fn check_concurrent_appends_conflict<'db, S: Storage<'db>>(storage: &'db S) {
    let first = storage.start_transaction();
    let second = storage.start_transaction();
    assert_eq!(
        LogStorage::new(&first)
            .append(0, &leaf("A"))
            .unwrap()
            .expect("append"),
        0
    );
    assert_eq!(
        LogStorage::new(&second)
            .append(0, &leaf("B"))
            .unwrap()
            .expect("append"),
        0
    );

    storage
        .commit_transaction(first)
        .unwrap()
        .expect("cannot commit");
    assert_matches!(
        storage
            .commit_transaction(second)
            .map_err(Error::StoreFault)
            .unwrap(),
        Err(Error::StoreFault(_))
    );

    let tx = storage.start_transaction();
    let log = LogStorage::new(&tx);
    assert_eq!(log.entry_count(0).unwrap().expect("count"), 1);
    assert_eq!(log.get(0, 0).unwrap().expect("get"), leaf("A"));
}
