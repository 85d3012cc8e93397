//! End-to-end tests for the file lifecycle and whole-tree passes.

use std::fs;
use std::path::{Path, PathBuf};

use dirseal::crypto::{FileKey, KeyProvider, StaticKeyProvider};
use dirseal::errors::DirSealError;
use dirseal::runner::{run, Reporter, RunOptions, RunSummary};
use dirseal::transform::{FileTransformer, Mode, Transformed};
use tempfile::TempDir;

/// Reporter that discards every event.
struct Silent;

impl Reporter for Silent {
    fn root_entered(&self, _: Mode, _: &Path) {}
    fn root_failed(&self, _: &Path, _: &DirSealError) {}
    fn file_transformed(&self, _: Mode, _: &Transformed) {}
    fn file_would_transform(&self, _: Mode, _: &Path) {}
    fn file_failed(&self, _: &Path, _: &DirSealError) {}
    fn finished(&self, _: &RunSummary) {}
}

fn key_k() -> StaticKeyProvider {
    StaticKeyProvider(FileKey::new([0x01; 32]))
}

fn transformer(provider: &dyn KeyProvider) -> FileTransformer {
    FileTransformer::new(&provider.provide().unwrap())
}

fn pass(t: &FileTransformer, mode: Mode, root: &Path) -> RunSummary {
    let options = RunOptions {
        mode,
        roots: vec![root.to_path_buf()],
        jobs: 1,
        dry_run: false,
        protected: Vec::new(),
    };
    run(t, &options, &Silent)
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in walk(root) {
        out.push(entry.strip_prefix(root).unwrap().to_path_buf());
    }
    out.sort();
    out
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            out.extend(walk(&path));
        } else {
            out.push(path);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Single file scenario
// ---------------------------------------------------------------------------

#[test]
fn notes_txt_end_to_end() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "hello").unwrap();
    let t = transformer(&key_k());

    let sealed = t.transform(Mode::Encrypt, &notes).unwrap();
    let artifact = dir.path().join("notes.txt.enc");
    assert_eq!(sealed.output, artifact);
    assert_eq!(fs::metadata(&artifact).unwrap().len(), 33);
    assert!(!notes.exists());

    t.transform(Mode::Decrypt, &artifact).unwrap();
    assert_eq!(fs::read_to_string(&notes).unwrap(), "hello");
    assert!(!artifact.exists());
}

#[test]
fn wrong_key_leaves_artifact_unchanged() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "hello").unwrap();
    let sealed = transformer(&key_k())
        .transform(Mode::Encrypt, &notes)
        .unwrap();
    let before = fs::read(&sealed.output).unwrap();

    let mut other = [0x01u8; 32];
    other[31] = 0x02;
    let err = transformer(&StaticKeyProvider(FileKey::new(other)))
        .transform(Mode::Decrypt, &sealed.output)
        .unwrap_err();

    assert!(matches!(err, DirSealError::AuthFailure));
    assert_eq!(fs::read(&sealed.output).unwrap(), before);
    assert!(!notes.exists());
}

#[test]
fn tampered_artifact_is_not_decrypted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.csv");
    fs::write(&path, "a,b,c\n1,2,3\n").unwrap();
    let t = transformer(&key_k());
    let sealed = t.transform(Mode::Encrypt, &path).unwrap();

    let mut bytes = fs::read(&sealed.output).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x80;
    fs::write(&sealed.output, &bytes).unwrap();

    assert!(matches!(
        t.transform(Mode::Decrypt, &sealed.output),
        Err(DirSealError::AuthFailure)
    ));
    assert_eq!(fs::read(&sealed.output).unwrap(), bytes);
    assert!(!path.exists());
}

// ---------------------------------------------------------------------------
// Whole-tree passes
// ---------------------------------------------------------------------------

fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("photos/2024")).unwrap();
    fs::write(root.join("todo.md"), "- ship it").unwrap();
    fs::write(root.join("photos/cat.jpg"), [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    fs::write(root.join("photos/2024/empty.bin"), b"").unwrap();
    dir
}

#[test]
fn encrypt_pass_is_idempotent() {
    let dir = sample_tree();
    let t = transformer(&key_k());

    let first = pass(&t, Mode::Encrypt, dir.path());
    assert_eq!(first.files_transformed, 3);

    let second = pass(&t, Mode::Encrypt, dir.path());
    assert_eq!(second.files_transformed, 0);
    assert_eq!(second.file_failures(), 0);

    assert_eq!(
        files_under(dir.path()),
        vec![
            PathBuf::from("photos/2024/empty.bin.enc"),
            PathBuf::from("photos/cat.jpg.enc"),
            PathBuf::from("todo.md.enc"),
        ]
    );
}

#[test]
fn decrypt_pass_restores_tree() {
    let dir = sample_tree();
    let t = transformer(&key_k());

    pass(&t, Mode::Encrypt, dir.path());
    let summary = pass(&t, Mode::Decrypt, dir.path());

    assert_eq!(summary.files_transformed, 3);
    assert_eq!(fs::read_to_string(dir.path().join("todo.md")).unwrap(), "- ship it");
    assert_eq!(
        fs::read(dir.path().join("photos/cat.jpg")).unwrap(),
        vec![0xFF, 0xD8, 0xFF, 0xE0]
    );
    assert!(fs::read(dir.path().join("photos/2024/empty.bin"))
        .unwrap()
        .is_empty());
    assert_eq!(files_under(dir.path()).len(), 3);
}

#[test]
fn interrupted_pair_is_reported_not_clobbered() {
    // Simulates a crash between writing the artifact and removing the source.
    let dir = TempDir::new().unwrap();
    let plain = dir.path().join("ledger.txt");
    fs::write(&plain, "v1").unwrap();
    let t = transformer(&key_k());
    let sealed = t.transform(Mode::Encrypt, &plain).unwrap();
    fs::write(&plain, "v1").unwrap();
    let artifact_before = fs::read(&sealed.output).unwrap();

    let summary = pass(&t, Mode::Encrypt, dir.path());

    assert_eq!(summary.io_failures, 1);
    assert_eq!(fs::read_to_string(&plain).unwrap(), "v1");
    assert_eq!(fs::read(&sealed.output).unwrap(), artifact_before);
}

#[test]
fn one_bad_artifact_does_not_stop_the_pass() {
    let dir = sample_tree();
    let t = transformer(&key_k());
    pass(&t, Mode::Encrypt, dir.path());
    fs::write(dir.path().join("bogus.enc"), b"not an artifact at all, sorry").unwrap();

    let summary = pass(&t, Mode::Decrypt, dir.path());

    assert_eq!(summary.files_transformed, 3);
    assert_eq!(summary.auth_failures, 1);
    assert!(dir.path().join("bogus.enc").exists());
}
