/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/


//! Release hooks for keys and values leaving the tree.

use std::cell::RefCell;
use std::rc::Rc;

use augmented_tree::AugmentedTree;

type Log = Rc<RefCell<Vec<String>>>;

/// A tree whose release hooks record `key:<k>` and `value:<v>` entries.
fn logged_tree() -> (AugmentedTree<i64, String, ()>, Log) {
    let log: Log = Rc::default();
    let keys = Rc::clone(&log);
    let values = Rc::clone(&log);
    let tree = AugmentedTree::builder()
        .on_key_release(move |key: i64| keys.borrow_mut().push(format!("key:{key}")))
        .on_value_release(move |value: String| values.borrow_mut().push(format!("value:{value}")))
        .build();
    (tree, log)
}

#[test]
fn test_remove_releases_key_and_value_once() {
    let (mut tree, log) = logged_tree();
    tree.insert(1, "one".to_owned());
    tree.insert(2, "two".to_owned());

    assert!(tree.remove(&1));
    assert_eq!(*log.borrow(), ["key:1", "value:one"]);

    assert!(!tree.remove(&1));
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn test_overwrite_returns_value_instead_of_releasing() {
    let (mut tree, log) = logged_tree();
    tree.insert(1, "one".to_owned());

    assert_eq!(tree.insert(1, "uno".to_owned()).as_deref(), Some("one"));
    assert!(log.borrow().is_empty());
    assert_eq!(tree.get(&1).map(String::as_str), Some("uno"));
}

#[test]
fn test_two_child_removal_releases_only_the_removed_entry() {
    let (mut tree, log) = logged_tree();
    for key in 0..15 {
        tree.insert(key, format!("v{key}"));
    }
    let root = tree.root_index().expect("tree is not empty");
    let root_key = *tree.node(root).key();
    let root_node = tree.node(root);
    assert!(root_node.left_index().is_some() && root_node.right_index().is_some());

    assert!(tree.remove(&root_key));
    assert_eq!(*log.borrow(), [format!("key:{root_key}"), format!("value:v{root_key}")]);

    // The predecessor moved into the root's slot and kept its value.
    let predecessor = root_key - 1;
    assert_eq!(tree.get(&predecessor), Some(&format!("v{predecessor}")));
}

#[test]
fn test_clear_releases_everything_in_key_order() {
    let (mut tree, log) = logged_tree();
    for key in [3, 1, 2] {
        tree.insert(key, format!("v{key}"));
    }

    tree.clear();
    assert_eq!(
        *log.borrow(),
        ["key:1", "value:v1", "key:2", "value:v2", "key:3", "value:v3"]
    );
    assert!(tree.is_empty());
}

#[test]
fn test_dropping_the_tree_releases_nothing() {
    let (mut tree, log) = logged_tree();
    tree.insert(1, "one".to_owned());
    drop(tree);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_hooks_are_optional() {
    let mut tree: AugmentedTree<i64, String, ()> = AugmentedTree::builder()
        .on_value_release(|_value: String| {})
        .build();
    tree.insert(1, "one".to_owned());
    assert!(tree.remove(&1));

    let mut bare: AugmentedTree<i64, String, ()> = AugmentedTree::new();
    bare.insert(1, "one".to_owned());
    assert!(bare.remove(&1));
}
