use log_grok::strings::AhoCorasickTree;
use std::sync::Arc;
use std::thread;

#[test]
fn test_find_all_reports_overlapping_keywords() {
    let tree = AhoCorasickTree::new(["he", "she", "his", "hers"]);
    let found: Vec<&str> = tree.find_all("ahishers").collect();
    assert_eq!(found, vec!["his", "she", "he", "hers"]);
}

#[test]
fn test_find_all_restarts_per_call() {
    let tree = AhoCorasickTree::new(["ab"]);
    assert_eq!(tree.find_all("abab").count(), 2);
    assert_eq!(tree.find_all("abab").count(), 2);
}

#[test]
fn test_contains() {
    let tree = AhoCorasickTree::new(["error", "fail", "timeout"]);
    assert!(tree.contains("request timeout after 30s"));
    assert!(tree.contains("failed"));
    assert!(!tree.contains("all good"));
    assert!(!tree.contains(""));
}

#[test]
fn test_contains_that_start() {
    let tree = AhoCorasickTree::new(["ERROR", "WARN", "ERR"]);
    assert!(tree.contains_that_start("ERR: disk"));
    assert!(tree.contains_that_start("WARNING"));
    assert!(!tree.contains_that_start(" ERROR"));
    assert!(!tree.contains_that_start("EWARN"));
    assert!(!tree.contains_that_start("ER"));
}

#[test]
fn test_contains_that_start_is_anchored() {
    let tree = AhoCorasickTree::new(["cat"]);
    assert!(tree.contains("concatenate"));
    assert!(!tree.contains_that_start("concatenate"));
}

#[test]
fn test_non_ascii_keywords() {
    let tree = AhoCorasickTree::new(["ошибка", "警告"]);
    assert!(tree.contains("произошла ошибка"));
    assert_eq!(tree.find_all("警告: x").collect::<Vec<_>>(), vec!["警告"]);
    assert!(tree.contains_that_start("警告!"));
}

#[test]
fn test_shared_between_threads() {
    let tree = Arc::new(AhoCorasickTree::new(["needle"]));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || tree.contains(&format!("hay {i} needle")))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
