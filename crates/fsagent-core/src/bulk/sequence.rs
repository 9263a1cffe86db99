//! Numeric file/folder series

use crate::error::Result;
use crate::sandbox::{FileOps, FolderOps, SandboxGuard};
use crate::types::{BatchReport, ItemOutcome, OperationResult, SequenceRename, SequenceSpec};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Creates and renames numeric series. Per-index failures are recorded and the
/// batch keeps going; only an invalid range or an escaping name aborts it, and
/// both are detected before the first filesystem change.
pub struct SequenceEngine;

impl SequenceEngine {
    pub fn create_files(guard: &SandboxGuard, spec: &SequenceSpec, max_items: usize) -> Result<BatchReport> {
        spec.validate(max_items)?;
        let targets = resolve_all(guard, spec)?;
        let content = spec.content.as_deref().unwrap_or("");

        let report = run_batch("create_files_sequence", spec, targets, |path| {
            FileOps::create(guard, path, content)
        });
        info!("{}", report.summary().lines().next().unwrap_or_default());
        Ok(report)
    }

    pub fn create_folders(guard: &SandboxGuard, spec: &SequenceSpec, max_items: usize) -> Result<BatchReport> {
        spec.validate(max_items)?;
        let targets = resolve_all(guard, spec)?;

        let report = run_batch("create_folders_sequence", spec, targets, |path| {
            FolderOps::create(guard, path, false)
        });
        info!("{}", report.summary().lines().next().unwrap_or_default());
        Ok(report)
    }

    /// Pair the i-th old name with the i-th new name and rename each pair
    pub fn rename_files(guard: &SandboxGuard, rename: &SequenceRename, max_items: usize) -> Result<BatchReport> {
        rename.validate(max_items)?;
        let (old_spec, new_spec) = (rename.old_spec(), rename.new_spec());
        let sources = resolve_all(guard, &old_spec)?;
        let targets = resolve_all(guard, &new_spec)?;

        let mut report = BatchReport::new("rename_files_sequence");
        for ((i, from), (_, to)) in sources.into_iter().zip(targets) {
            let (old_name, new_name) = (old_spec.name_for(i), new_spec.name_for(i));
            debug!("Sequence rename [{}]: {} -> {}", i, old_name, new_name);

            let outcome = match FileOps::move_path(guard, &from, &to, rename.overwrite) {
                Ok(_) => ItemOutcome::Succeeded,
                Err(e) => {
                    warn!("Sequence rename [{}] failed: {}", i, e);
                    ItemOutcome::failed(&e)
                }
            };
            report.push(Some(i), Some(old_name), new_name, outcome);
        }

        info!("{}", report.summary().lines().next().unwrap_or_default());
        Ok(report)
    }
}

/// Resolve every name up front so an escape aborts before anything is touched
fn resolve_all(guard: &SandboxGuard, spec: &SequenceSpec) -> Result<Vec<(u64, PathBuf)>> {
    spec.indices()
        .map(|i| guard.resolve(spec.name_for(i)).map(|path| (i, path)))
        .collect()
}

fn run_batch(
    operation: &str,
    spec: &SequenceSpec,
    targets: Vec<(u64, PathBuf)>,
    mut action: impl FnMut(&PathBuf) -> Result<OperationResult>,
) -> BatchReport {
    let mut report = BatchReport::new(operation);

    for (i, path) in targets {
        let outcome = match action(&path) {
            Ok(_) => ItemOutcome::Succeeded,
            Err(e) => {
                warn!("{} [{}] failed: {}", operation, i, e);
                ItemOutcome::failed(&e)
            }
        };
        report.push(Some(i), None, spec.name_for(i), outcome);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn sandbox() -> (TempDir, SandboxGuard) {
        let dir = tempdir().unwrap();
        let guard = SandboxGuard::new(dir.path()).unwrap();
        (dir, guard)
    }

    fn names_in(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_create_files_sequence_exact_names() {
        let (dir, guard) = sandbox();
        let spec = SequenceSpec::new("report_", ".txt", 1, 3).with_zero_pad(2);

        let report = SequenceEngine::create_files(&guard, &spec, 100).unwrap();

        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 0);
        assert_eq!(names_in(dir.path()), vec!["report_01.txt", "report_02.txt", "report_03.txt"]);
    }

    #[test]
    fn test_create_files_sequence_with_content() {
        let (dir, guard) = sandbox();
        let spec = SequenceSpec::new("note", ".md", 1, 2).with_content("# title");

        SequenceEngine::create_files(&guard, &spec, 100).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("note2.md")).unwrap(), "# title");
    }

    #[test]
    fn test_partial_failure_marks_only_colliding_index() {
        let (dir, guard) = sandbox();
        fs::write(dir.path().join("report_02.txt"), "keep me").unwrap();
        let spec = SequenceSpec::new("report_", ".txt", 1, 3).with_zero_pad(2);

        let report = SequenceEngine::create_files(&guard, &spec, 100).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        let item = report.item_for_index(2).unwrap();
        assert!(matches!(item.outcome, ItemOutcome::Failed { kind: ErrorKind::Collision, .. }));
        assert_eq!(report.item_for_index(1).unwrap().outcome, ItemOutcome::Succeeded);
        assert_eq!(report.item_for_index(3).unwrap().outcome, ItemOutcome::Succeeded);
        assert_eq!(fs::read_to_string(dir.path().join("report_02.txt")).unwrap(), "keep me");
    }

    #[test]
    fn test_create_folders_sequence() {
        let (dir, guard) = sandbox();
        fs::create_dir(dir.path().join("week2")).unwrap();
        let spec = SequenceSpec::new("week", "", 1, 3);

        let report = SequenceEngine::create_folders(&guard, &spec, 100).unwrap();

        assert_eq!(report.succeeded(), 2);
        assert!(matches!(
            report.item_for_index(2).unwrap().outcome,
            ItemOutcome::Failed { kind: ErrorKind::Collision, .. }
        ));
        assert!(dir.path().join("week1").is_dir());
        assert!(dir.path().join("week3").is_dir());
    }

    #[test]
    fn test_invalid_spec_touches_nothing() {
        let (dir, guard) = sandbox();

        let narrow = SequenceSpec::new("f", ".txt", 1, 15).with_zero_pad(1);
        assert_eq!(
            SequenceEngine::create_files(&guard, &narrow, 100).unwrap_err().kind(),
            ErrorKind::InvalidArguments
        );

        let escaping = SequenceSpec::new("../f", ".txt", 1, 3);
        assert_eq!(
            SequenceEngine::create_files(&guard, &escaping, 100).unwrap_err().kind(),
            ErrorKind::PathEscape
        );

        assert!(names_in(dir.path()).is_empty());
    }

    #[test]
    fn test_rename_files_sequence() {
        let (dir, guard) = sandbox();
        for i in 1..=3 {
            fs::write(dir.path().join(format!("foo{:03}.txt", i)), i.to_string()).unwrap();
        }
        fs::write(dir.path().join("bar003.txt"), "taken").unwrap();
        fs::remove_file(dir.path().join("foo002.txt")).unwrap();

        let rename = SequenceRename {
            old_prefix: "foo".to_string(),
            old_suffix: ".txt".to_string(),
            new_prefix: "bar".to_string(),
            new_suffix: ".txt".to_string(),
            start: 1,
            end: 3,
            zero_pad: 3,
            overwrite: false,
        };
        let report = SequenceEngine::rename_files(&guard, &rename, 100).unwrap();

        assert_eq!(report.item_for_index(1).unwrap().outcome, ItemOutcome::Succeeded);
        assert!(matches!(
            report.item_for_index(2).unwrap().outcome,
            ItemOutcome::Failed { kind: ErrorKind::NotFound, .. }
        ));
        assert!(matches!(
            report.item_for_index(3).unwrap().outcome,
            ItemOutcome::Failed { kind: ErrorKind::Collision, .. }
        ));
        assert_eq!(names_in(dir.path()), vec!["bar001.txt", "bar003.txt", "foo003.txt"]);
        assert_eq!(fs::read_to_string(dir.path().join("bar003.txt")).unwrap(), "taken");
    }

    #[test]
    fn test_rename_files_sequence_overwrite() {
        let (dir, guard) = sandbox();
        fs::write(dir.path().join("a1"), "new").unwrap();
        fs::write(dir.path().join("b1"), "old").unwrap();

        let rename = SequenceRename {
            old_prefix: "a".to_string(),
            old_suffix: String::new(),
            new_prefix: "b".to_string(),
            new_suffix: String::new(),
            start: 1,
            end: 1,
            zero_pad: 0,
            overwrite: true,
        };
        let report = SequenceEngine::rename_files(&guard, &rename, 100).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(fs::read_to_string(dir.path().join("b1")).unwrap(), "new");
    }
}
