use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use purgef::fill::FillGenerator;
use purgef::{purge, purge_with, FileWiper, FillKind, PurgeConfig, PurgeError, Status, Wipe, WipeError, WipeSpec};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

fn tree(root: &Path) {
    fs::create_dir(root).unwrap();
    fs::write(root.join("a.txt"), b"first secret").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/b.txt"), b"second secret").unwrap();
}

/// Refuses one path the way a permission denial would.
struct Denying {
    inner: FileWiper<StdRng>,
    denied: PathBuf,
}

impl Wipe for Denying {
    fn wipe(&mut self, path: &Path) -> Result<u64, WipeError> {
        if path == self.denied.as_path() {
            return Err(WipeError::OpenFailed {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        self.inner.wipe(path)
    }
}

fn seeded_wiper(passes: usize, kind: FillKind) -> FileWiper<StdRng> {
    FileWiper::new(
        WipeSpec::new(passes, kind).unwrap(),
        FillGenerator::new(StdRng::from_seed([1; 32])),
    )
}

#[test]
fn test_purge_directory_removes_everything() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    tree(&root);

    let config = PurgeConfig::new(&root, 1, FillKind::Zero).unwrap();
    let report = purge(&config);

    assert!(report.is_done(), "{}", report);
    assert_eq!(report.wiped.len(), 2);
    assert_eq!(report.removed_dirs.len(), 2);
    assert!(report.failed.is_empty());
    assert!(report.remaining_dirs.is_empty());
    assert_eq!(report.bytes_wiped(), 25);
    for path in &["root", "root/sub", "root/a.txt", "root/sub/b.txt"] {
        assert!(!dir.path().join(path).exists(), "{} survived", path);
    }
}

#[test]
fn test_purge_directory_with_random_fill() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    tree(&root);
    fs::create_dir_all(root.join("sub/empty/nested")).unwrap();

    let report = purge(&PurgeConfig::new(&root, 3, FillKind::Random).unwrap());

    assert!(report.is_done(), "{}", report);
    assert_eq!(report.removed_dirs.len(), 4);
    assert!(!root.exists());
}

#[test]
fn test_partial_failure_keeps_containing_directories() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    tree(&root);
    let denied = root.join("sub/b.txt");

    let mut wiper = Denying {
        inner: seeded_wiper(1, FillKind::Zero),
        denied: denied.clone(),
    };
    let report = purge_with(&root, &mut wiper);

    assert!(matches!(report.status, Status::PartiallyFailed));
    assert_eq!(report.wiped.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path(), denied.as_path());
    assert!(report.removed_dirs.is_empty());
    let left: Vec<_> = report.remaining_dirs.iter().map(|d| d.path.clone()).collect();
    assert_eq!(left, vec![root.join("sub"), root.clone()]);

    assert!(!root.join("a.txt").exists());
    assert_eq!(fs::read(&denied).unwrap(), b"second secret");

    let text = report.to_string();
    assert!(text.contains("sub/b.txt"));
    assert!(text.contains("partially failed"));
}

#[test]
fn test_missing_target_aborts() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nothing-here");

    for _ in 0..2 {
        let report = purge(&PurgeConfig::new(&missing, 1, FillKind::Random).unwrap());
        match report.status {
            Status::Aborted(PurgeError::TargetMissing(path)) => assert_eq!(path, missing),
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn test_single_file_target() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lonely.bin");
    fs::write(&path, vec![7u8; 10_000]).unwrap();

    let report = purge(&PurgeConfig::new(&path, 2, FillKind::Random).unwrap());

    assert!(report.is_done(), "{}", report);
    assert_eq!(report.wiped.len(), 1);
    assert_eq!(report.wiped[0].size, 10_000);
    assert!(report.removed_dirs.is_empty());
    assert!(!path.exists());
    assert!(dir.path().exists());
}

#[test]
fn test_empty_file_target() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty");
    fs::write(&path, b"").unwrap();

    let report = purge(&PurgeConfig::new(&path, 5, FillKind::Zero).unwrap());

    assert!(report.is_done(), "{}", report);
    assert!(!path.exists());
}

#[test]
fn test_zero_passes_rejected_by_engine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kept");
    fs::write(&path, b"still here").unwrap();

    let mut config = PurgeConfig::new(&path, 1, FillKind::Zero).unwrap();
    config.spec.passes = 0;
    let report = purge(&config);

    assert!(matches!(report.status, Status::Aborted(PurgeError::InvalidConfiguration(_))));
    assert_eq!(fs::read(&path).unwrap(), b"still here");
}

#[cfg(unix)]
#[test]
fn test_symlink_inside_tree_is_skipped() {
    let dir = tempdir().unwrap();
    let outside = dir.path().join("outside.txt");
    fs::write(&outside, b"not yours").unwrap();
    let root = dir.path().join("root");
    tree(&root);
    std::os::unix::fs::symlink(&outside, root.join("sub/link")).unwrap();

    let report = purge(&PurgeConfig::new(&root, 1, FillKind::Random).unwrap());

    assert!(matches!(report.status, Status::PartiallyFailed));
    assert_eq!(report.wiped.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, root.join("sub/link"));
    assert_eq!(fs::read(&outside).unwrap(), b"not yours");
    assert!(fs::symlink_metadata(root.join("sub/link")).is_ok());
    assert_eq!(report.remaining_dirs.len(), 2);
}

#[cfg(unix)]
#[test]
fn test_symlink_target_is_refused() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real.txt");
    let link = dir.path().join("link");
    fs::write(&real, b"untouched").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let report = purge(&PurgeConfig::new(&link, 1, FillKind::Zero).unwrap());

    assert!(matches!(report.status, Status::PartiallyFailed));
    assert!(matches!(report.failed[0], WipeError::NotRegularFile { .. }));
    assert_eq!(fs::read(&real).unwrap(), b"untouched");
}

#[test]
fn test_entropy_failure_stops_remaining_files() {
    struct Exhausted;

    impl Wipe for Exhausted {
        fn wipe(&mut self, path: &Path) -> Result<u64, WipeError> {
            Err(WipeError::EntropySourceUnavailable {
                path: path.to_path_buf(),
                source: rand::Error::new(rand::ErrorKind::Unavailable, "gone"),
            })
        }
    }

    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    tree(&root);

    let report = purge_with(&root, &mut Exhausted);

    assert!(matches!(report.status, Status::PartiallyFailed));
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed[0].is_fatal());
    assert!(matches!(report.failed[1], WipeError::NotAttempted { .. }));
    assert!(root.join("a.txt").exists());
    assert!(root.join("sub/b.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_walk_failure_aborts_before_any_wipe() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), b"readable").unwrap();
    let locked = root.join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("inner.txt"), b"hidden").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // privileged users can list it anyway
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = purge(&PurgeConfig::new(&root, 1, FillKind::Zero).unwrap());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    match &report.status {
        Status::Aborted(PurgeError::WalkFailed { path, .. }) => assert_eq!(path, &locked),
        other => panic!("unexpected {:?}", other),
    }
    assert!(report.wiped.is_empty());
    assert!(report.removed_dirs.is_empty());
    assert_eq!(fs::read(root.join("a.txt")).unwrap(), b"readable");
    assert_eq!(fs::read(locked.join("inner.txt")).unwrap(), b"hidden");
}

#[test]
fn test_unlink_failure_reports_destroyed_content() {
    struct Stuck;

    impl Wipe for Stuck {
        fn wipe(&mut self, path: &Path) -> Result<u64, WipeError> {
            Err(WipeError::UnlinkFailed {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only directory"),
            })
        }
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("stuck.txt");
    fs::write(&path, b"x").unwrap();

    let report = purge_with(&path, &mut Stuck);

    assert!(matches!(report.status, Status::PartiallyFailed));
    assert!(report.failed[0].content_destroyed());
    let text = report.to_string();
    assert!(text.contains("stuck.txt"), "{}", text);
    assert!(text.contains("(content destroyed)"), "{}", text);
}

#[test]
fn test_empty_directory_is_removed() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("hollow");
    fs::create_dir_all(root.join("inner")).unwrap();

    let report = purge(&PurgeConfig::new(&root, 2, FillKind::Zero).unwrap());

    assert!(report.is_done(), "{}", report);
    assert!(report.wiped.is_empty());
    assert_eq!(report.removed_dirs, vec![root.join("inner"), root.clone()]);
    assert!(!root.exists());
}
