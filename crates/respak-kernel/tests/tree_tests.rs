//! Behavioral tests for the virtual tree.
//!
//! Covers creation idempotence, cascading deletion, cache consistency and
//! type-mismatch rejection through the public API only.

use respak_kernel::{TreeError, VirtualTree};

fn tree_with(paths: &[&str]) -> VirtualTree {
    let mut tree = VirtualTree::new();
    let root = tree.root();
    for path in paths {
        tree.create_directory(root, *path).unwrap();
    }
    tree
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_create_directory_is_idempotent() {
    let mut tree = VirtualTree::new();
    let root = tree.root();

    assert!(tree.create_directory(root, "a/b/c").unwrap());
    let first = tree.get_directory(root, "a/b/c").unwrap().unwrap();

    assert!(!tree.create_directory(root, "a/b/c").unwrap());
    let second = tree.get_directory(root, "a/b/c").unwrap().unwrap();

    assert_eq!(first, second, "same node both times");
}

#[test]
fn test_create_partial_path_reports_creation() {
    let mut tree = tree_with(&["a/b"]);
    let root = tree.root();
    assert!(tree.create_directory(root, "a/b/c").unwrap());
    assert!(!tree.create_directory(root, "a").unwrap());
}

#[test]
fn test_paths_are_normalized() {
    let mut tree = VirtualTree::new();
    let root = tree.root();
    tree.create_directory(root, "\\a//b/").unwrap();
    let b = tree.get_directory(root, "a/b").unwrap().unwrap();
    assert_eq!(tree.full_path(b).unwrap().as_str(), "a/b");
}

// ============================================================================
// Cascading deletion
// ============================================================================

#[test]
fn test_delete_directory_cascades() {
    let mut tree = tree_with(&["a/b/c"]);
    let root = tree.root();
    let b = tree.get_directory(root, "a/b").unwrap().unwrap();
    let c = tree.get_directory(root, "a/b/c").unwrap().unwrap();
    let file = tree.new_file(vec![9]);
    tree.write_file(c, "leaf.bin", file).unwrap();

    assert!(tree.delete_directory(root, "a/b").unwrap());

    assert_eq!(tree.get_directory(root, "a/b").unwrap(), None);
    assert_eq!(tree.get_directory(root, "a/b/c").unwrap(), None);
    assert!(tree.is_deleted(b));
    assert!(tree.is_deleted(c), "descendant handle reports deletion");
    assert!(tree.is_deleted(file), "files below are tombstoned too");
    assert!(tree.get_directory(root, "a").unwrap().is_some());
}

#[test]
fn test_deleted_handles_fail_fast() {
    let mut tree = tree_with(&["a/b/c"]);
    let root = tree.root();
    let c = tree.get_directory(root, "a/b/c").unwrap().unwrap();
    tree.delete_directory(root, "a").unwrap();

    let file = tree.new_file(vec![]);
    assert!(matches!(tree.write_file(c, "x", file), Err(TreeError::Deleted(_))));
    assert!(matches!(tree.list_all_directories(c, ""), Err(TreeError::Deleted(_))));
    assert!(matches!(tree.full_path(c), Err(TreeError::Deleted(_))));
    assert!(tree.is_independent(file).unwrap(), "failed write leaves the file alone");
}

#[test]
fn test_delete_missing_parent_fails() {
    let mut tree = VirtualTree::new();
    let root = tree.root();
    assert!(matches!(
        tree.delete_directory(root, "no/such/dir"),
        Err(TreeError::DirectoryNotFound(p)) if p.as_str() == "no/such"
    ));
    assert!(!tree.delete_directory(root, "absent").unwrap());
}

// ============================================================================
// Cache consistency
// ============================================================================

#[test]
fn test_cached_miss_is_refreshed_after_create() {
    let mut tree = VirtualTree::new();
    let root = tree.root();
    assert_eq!(tree.get_directory(root, "late").unwrap(), None);
    tree.create_directory(root, "late").unwrap();
    assert!(tree.get_directory(root, "late").unwrap().is_some());
}

#[test]
fn test_cached_hit_is_refreshed_after_delete() {
    let mut tree = tree_with(&["x/y"]);
    let root = tree.root();
    let x = tree.get_directory(root, "x").unwrap().unwrap();
    assert!(tree.get_directory(x, "y").unwrap().is_some());

    tree.delete_directory(x, "y").unwrap();
    assert_eq!(tree.get_directory(root, "x/y").unwrap(), None);
    assert_eq!(tree.get_directory(x, "y").unwrap(), None);

    // Recreating yields a fresh node, never the stale one.
    tree.create_directory(root, "x/y").unwrap();
    let fresh = tree.get_directory(root, "x/y").unwrap().unwrap();
    assert!(!tree.is_deleted(fresh));
}

#[test]
fn test_lookups_from_different_starts_agree() {
    let tree = tree_with(&["p/q/r"]);
    let root = tree.root();
    let p = tree.get_directory(root, "p").unwrap().unwrap();
    let q = tree.get_directory(root, "p/q").unwrap().unwrap();
    assert_eq!(tree.get_directory(p, "q/r").unwrap(), tree.get_directory(q, "r").unwrap());
}

// ============================================================================
// Type mismatches
// ============================================================================

#[test]
fn test_file_over_directory_is_rejected() {
    let mut tree = tree_with(&["assets/textures"]);
    let root = tree.root();
    let file = tree.new_file(vec![1]);

    let err = tree.write_file(root, "assets/textures", file).unwrap_err();
    assert!(matches!(err, TreeError::NotAFile(p) if p.as_str() == "assets/textures"));

    // Unchanged: still a directory, file still independent.
    assert!(tree.get_directory(root, "assets/textures").unwrap().is_some());
    assert!(tree.is_independent(file).unwrap());
}

#[test]
fn test_directory_over_file_is_rejected() {
    let mut tree = tree_with(&["assets"]);
    let root = tree.root();
    let file = tree.new_file(vec![1]);
    tree.write_file(root, "assets/readme", file).unwrap();

    let err = tree.create_directory(root, "assets/readme").unwrap_err();
    assert!(matches!(err, TreeError::NotADirectory(p) if p.as_str() == "assets/readme"));
    assert_eq!(tree.get_file(root, "assets/readme").unwrap(), Some(file));
    assert!(tree.list_directories(root, "assets").unwrap().is_empty());
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_listing_orders_and_filters() {
    let mut tree = tree_with(&["r/b/deep", "r/a"]);
    let root = tree.root();
    for path in ["r/z.txt", "r/b/one.txt", "r/b/deep/two.txt"] {
        let f = tree.new_file(path.as_bytes().to_vec());
        tree.write_file(root, path, f).unwrap();
    }

    let names = |ids: Vec<respak_kernel::DirId>, tree: &VirtualTree| -> Vec<String> {
        ids.into_iter().map(|d| tree.full_path(d).unwrap().to_string()).collect()
    };
    assert_eq!(names(tree.list_directories(root, "r").unwrap(), &tree), vec!["r/a", "r/b"]);
    assert_eq!(
        names(tree.list_all_directories(root, "r").unwrap(), &tree),
        vec!["r/a", "r/b", "r/b/deep"]
    );

    let files: Vec<String> = tree
        .list_all_files(root, "r")
        .unwrap()
        .into_iter()
        .map(|f| tree.full_path(f).unwrap().to_string())
        .collect();
    assert_eq!(files, vec!["r/b/deep/two.txt", "r/b/one.txt", "r/z.txt"]);

    assert!(matches!(tree.list_files(root, "r/missing"), Err(TreeError::DirectoryNotFound(_))));
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_end_to_end_scenario() {
    let mut tree = VirtualTree::new();
    let root = tree.root();

    tree.create_directory(root, "assets/textures").unwrap();
    let png = tree.new_file(vec![1, 2, 3, 4]);
    tree.write_file(root, "assets/textures/a.png", png).unwrap();

    let found = tree.get_file(root, "assets/textures/a.png").unwrap().unwrap();
    assert_eq!(tree.read_all_bytes(found).await.unwrap(), vec![1, 2, 3, 4]);

    let listed: Vec<&str> = tree
        .list_files(root, "assets/textures")
        .unwrap()
        .into_iter()
        .map(|f| tree.name(f).unwrap())
        .collect();
    assert_eq!(listed, vec!["a.png"]);

    assert!(tree.delete_directory(root, "assets").unwrap());
    assert_eq!(tree.get_file(root, "assets/textures/a.png").unwrap(), None);
    assert!(tree.is_deleted(found));
}
