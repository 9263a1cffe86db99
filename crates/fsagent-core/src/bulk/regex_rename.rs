//! Regex-driven bulk rename with a side-effect-free planning phase

use crate::error::{Error, ErrorKind, Result, SandboxError};
use crate::sandbox::{io_error, FileOps, SandboxGuard};
use crate::types::{BatchReport, ItemOutcome, RenamePair, RenamePlan, RenameReport};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct RegexRenamer;

/// Why a pair cannot run yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blocked {
    /// Something inside this folder still has to be renamed
    ByDescendant,
    /// The target name is still held by the source of another pending pair
    ByTargetHolder,
}

impl RegexRenamer {
    /// Compute renames for every entry under `base_path` whose name matches `pattern`.
    ///
    /// Only names are matched, never full paths. Symlinks are left alone and
    /// entries whose substituted name is unchanged are not part of the plan.
    /// Nothing on disk is modified.
    pub fn plan(
        guard: &SandboxGuard,
        base_path: impl AsRef<Path>,
        pattern: &str,
        replacement: &str,
        include_subdirs: bool,
    ) -> Result<RenamePlan> {
        let base = guard.resolve(base_path)?;
        let base_display = guard.display(&base);

        let metadata = fs::metadata(&base).map_err(|e| io_error(guard, &base, e))?;
        if !metadata.is_dir() {
            return Err(SandboxError::WrongType(format!("{} is not a folder", base_display)).into());
        }

        let regex = Regex::new(pattern)?;
        let replacement_expanded = normalize_backrefs(replacement);

        debug!("Planning regex rename under {:?}: {} -> {}", base, pattern, replacement);

        let walker = WalkDir::new(&base)
            .min_depth(1)
            .max_depth(if include_subdirs { usize::MAX } else { 1 })
            .follow_links(false)
            .contents_first(true)
            .sort_by_file_name();

        let mut pairs = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry during rename planning: {}", e);
                    continue;
                }
            };
            if entry.path_is_symlink() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                debug!("Skipping non UTF-8 name: {:?}", entry.path());
                continue;
            };

            let new_name = regex.replace_all(name, replacement_expanded.as_str());
            if new_name == name {
                continue;
            }
            validate_name(name, &new_name)?;

            let source = guard.resolve(entry.path())?;
            let target = guard.resolve(entry.path().with_file_name(&*new_name))?;

            pairs.push(RenamePair {
                original: guard.display(&source),
                proposed: guard.display(&target),
                source,
                target,
            });
        }

        Ok(RenamePlan {
            base: base_display,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
            dry_run: true,
            pairs,
        })
    }

    /// Execute a plan through `FileOps::rename`, one pair at a time.
    ///
    /// A pair waits while entries inside it are still pending, or while its
    /// target is the source of another pending pair. Pairs that can never
    /// proceed (rename cycles) fail with a collision; everything else runs.
    pub fn apply(guard: &SandboxGuard, plan: &RenamePlan) -> BatchReport {
        let pairs = &plan.pairs;
        let mut outcomes: Vec<Option<ItemOutcome>> = vec![None; pairs.len()];
        let mut pending: Vec<usize> = (0..pairs.len()).collect();

        while !pending.is_empty() {
            let mut waiting = Vec::new();
            let mut progressed = false;

            for &idx in &pending {
                if blocked(pairs, &outcomes, &pending, idx).is_some() {
                    waiting.push(idx);
                    continue;
                }

                let pair = &pairs[idx];
                let outcome = match FileOps::rename(guard, &pair.source, &pair.target) {
                    Ok(_) => ItemOutcome::Succeeded,
                    Err(e) => {
                        warn!("Rename {} -> {} failed: {}", pair.original, pair.proposed, e);
                        ItemOutcome::failed(&e)
                    }
                };
                outcomes[idx] = Some(outcome);
                progressed = true;
            }

            if !progressed {
                let cycle: Vec<usize> = waiting
                    .iter()
                    .copied()
                    .filter(|&idx| blocked(pairs, &outcomes, &waiting, idx) == Some(Blocked::ByTargetHolder))
                    .collect();
                let stuck = if cycle.is_empty() { waiting.clone() } else { cycle };

                for idx in stuck {
                    let pair = &pairs[idx];
                    warn!("Rename cycle: {} -> {}", pair.original, pair.proposed);
                    outcomes[idx] = Some(ItemOutcome::Failed {
                        kind: ErrorKind::Collision,
                        message: format!(
                            "Already exists: {} (held by another rename in this batch)",
                            pair.proposed
                        ),
                    });
                }
            }

            pending = waiting.into_iter().filter(|&idx| outcomes[idx].is_none()).collect();
        }

        let mut report = BatchReport::new("bulk_rename_regex");
        for (pair, outcome) in pairs.iter().zip(outcomes) {
            let outcome = outcome.unwrap_or_else(|| ItemOutcome::Failed {
                kind: ErrorKind::Internal,
                message: "rename was never attempted".to_string(),
            });
            report.push(None, Some(pair.original.clone()), pair.proposed.clone(), outcome);
        }
        report
    }

    /// Plan, then apply unless `test_only` is set
    pub fn bulk_rename(
        guard: &SandboxGuard,
        base_path: impl AsRef<Path>,
        pattern: &str,
        replacement: &str,
        include_subdirs: bool,
        test_only: bool,
    ) -> Result<RenameReport> {
        let mut plan = Self::plan(guard, base_path, pattern, replacement, include_subdirs)?;

        if test_only {
            info!("Regex rename preview: {} change(s)", plan.pairs.len());
            return Ok(RenameReport { plan, applied: None });
        }

        plan.dry_run = false;
        let applied = Self::apply(guard, &plan);
        info!(
            "Regex rename applied: {} succeeded, {} failed",
            applied.succeeded(),
            applied.failed()
        );

        Ok(RenameReport {
            plan,
            applied: Some(applied),
        })
    }
}

fn blocked(pairs: &[RenamePair], outcomes: &[Option<ItemOutcome>], pending: &[usize], idx: usize) -> Option<Blocked> {
    let pair = &pairs[idx];
    let mut result = None;

    for &other in pending {
        if other == idx || outcomes[other].is_some() {
            continue;
        }
        let other_source = &pairs[other].source;
        if other_source == &pair.target {
            return Some(Blocked::ByTargetHolder);
        }
        if other_source != &pair.source && other_source.starts_with(&pair.source) {
            result = Some(Blocked::ByDescendant);
        }
    }

    result
}

fn validate_name(original: &str, proposed: &str) -> Result<()> {
    let invalid = proposed.is_empty()
        || proposed == "."
        || proposed == ".."
        || proposed.contains('/')
        || proposed.contains(std::path::MAIN_SEPARATOR);

    if invalid {
        return Err(Error::Sandbox(SandboxError::InvalidPath(format!(
            "renaming {:?} would produce invalid name {:?}",
            original, proposed
        ))));
    }
    Ok(())
}

/// Accept `\1` style group references alongside the native `$1` / `${name}`
fn normalize_backrefs(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut group = String::new();
        while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
            group.push(d);
        }

        if group.is_empty() {
            // `\\` collapses to one backslash, a lone one is kept
            chars.next_if_eq(&'\\');
            out.push('\\');
        } else {
            out.push_str(&format!("${{{}}}", group));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    fn sandbox() -> (TempDir, SandboxGuard) {
        let dir = tempdir().unwrap();
        let guard = SandboxGuard::new(dir.path()).unwrap();
        (dir, guard)
    }

    fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
        let mut entries: Vec<(String, Vec<u8>)> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().to_string();
                let bytes = if e.file_type().is_file() {
                    fs::read(e.path()).unwrap()
                } else {
                    Vec::new()
                };
                (rel, bytes)
            })
            .collect();
        entries.sort();
        entries
    }

    fn seed(root: &Path) {
        fs::create_dir_all(root.join("2023/img")).unwrap();
        fs::write(root.join("IMG_001.jpg"), "one").unwrap();
        fs::write(root.join("IMG_002.jpg"), "two").unwrap();
        fs::write(root.join("notes.txt"), "skip").unwrap();
        fs::write(root.join("2023/img/IMG_003.jpg"), "three").unwrap();
    }

    #[test]
    fn test_plan_matches_names_only() {
        let (dir, guard) = sandbox();
        seed(dir.path());

        let plan = RegexRenamer::plan(&guard, ".", r"^IMG_(\d+)", "photo_$1", true).unwrap();

        assert_eq!(
            plan.mapping(),
            vec![
                ("2023/img/IMG_003.jpg".to_string(), "2023/img/photo_003.jpg".to_string()),
                ("IMG_001.jpg".to_string(), "photo_001.jpg".to_string()),
                ("IMG_002.jpg".to_string(), "photo_002.jpg".to_string()),
            ]
        );
        assert!(plan.dry_run);
    }

    #[test]
    fn test_plan_without_subdirs() {
        let (dir, guard) = sandbox();
        seed(dir.path());

        let plan = RegexRenamer::plan(&guard, ".", "IMG", "pic", false).unwrap();
        assert_eq!(plan.pairs.len(), 2);
        assert!(plan.pairs.iter().all(|p| !p.original.contains('/')));
    }

    #[test]
    fn test_dry_run_is_side_effect_free_and_matches_apply() {
        let (dir, guard) = sandbox();
        seed(dir.path());
        let before = snapshot(dir.path());

        let preview = RegexRenamer::bulk_rename(&guard, ".", r"IMG_(\d+)", r"img-\1", true, true).unwrap();
        assert!(preview.applied.is_none());
        assert!(preview.summary().starts_with("Preview (no changes):"));
        assert_eq!(snapshot(dir.path()), before);

        let applied = RegexRenamer::bulk_rename(&guard, ".", r"IMG_(\d+)", r"img-\1", true, false).unwrap();
        assert_eq!(applied.plan.mapping(), preview.plan.mapping());

        let report = applied.applied.unwrap();
        assert_eq!(report.succeeded(), 3);
        assert!(dir.path().join("img-001.jpg").exists());
        assert!(dir.path().join("2023/img/img-003.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_collision_fails_single_pair() {
        let (dir, guard) = sandbox();
        fs::write(dir.path().join("a_1.txt"), "a1").unwrap();
        fs::write(dir.path().join("a_2.txt"), "a2").unwrap();
        fs::write(dir.path().join("b_2.txt"), "unrelated").unwrap();

        let report = RegexRenamer::bulk_rename(&guard, ".", "^a_", "b_", false, false)
            .unwrap()
            .applied
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let failed = report.items.iter().find(|i| i.target == "b_2.txt").unwrap();
        assert!(matches!(failed.outcome, ItemOutcome::Failed { kind: ErrorKind::Collision, .. }));
        assert_eq!(fs::read_to_string(dir.path().join("b_2.txt")).unwrap(), "unrelated");
        assert!(dir.path().join("b_1.txt").exists());
    }

    #[test]
    fn test_chain_inside_batch_is_ordered() {
        let (dir, guard) = sandbox();
        fs::write(dir.path().join("v1"), "one").unwrap();
        fs::write(dir.path().join("v2"), "two").unwrap();

        // v1 -> v2 must wait until v2 -> v3 has freed the name
        let plan = RegexRenamer::plan(&guard, ".", r"^v(\d)$", "v$1", false).unwrap();
        assert!(plan.is_empty());

        let mut plan = RegexRenamer::plan(&guard, ".", "^v1$", "v2", false).unwrap();
        let second = RegexRenamer::plan(&guard, ".", "^v2$", "v3", false).unwrap();
        plan.pairs.extend(second.pairs);

        let report = RegexRenamer::apply(&guard, &plan);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("v2")).unwrap(), "one");
        assert_eq!(fs::read_to_string(dir.path().join("v3")).unwrap(), "two");
    }

    #[test]
    fn test_swap_cycle_fails_both() {
        let (dir, guard) = sandbox();
        fs::write(dir.path().join("x"), "x").unwrap();
        fs::write(dir.path().join("y"), "y").unwrap();

        let mut plan = RegexRenamer::plan(&guard, ".", "^x$", "y", false).unwrap();
        plan.pairs.extend(RegexRenamer::plan(&guard, ".", "^y$", "x", false).unwrap().pairs);

        let report = RegexRenamer::apply(&guard, &plan);
        assert_eq!(report.failed(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("x")).unwrap(), "x");
    }

    #[test]
    fn test_folders_renamed_after_their_contents() {
        let (dir, guard) = sandbox();
        fs::create_dir(dir.path().join("old_dir")).unwrap();
        fs::write(dir.path().join("old_dir/old_file.txt"), "x").unwrap();

        let report = RegexRenamer::bulk_rename(&guard, ".", "^old_", "new_", true, false).unwrap();

        assert_eq!(
            report.plan.mapping(),
            vec![
                ("old_dir/old_file.txt".to_string(), "old_dir/new_file.txt".to_string()),
                ("old_dir".to_string(), "new_dir".to_string()),
            ]
        );
        assert_eq!(report.applied.unwrap().succeeded(), 2);
        assert!(dir.path().join("new_dir/new_file.txt").exists());
    }

    #[test]
    fn test_invalid_pattern_and_names() {
        let (dir, guard) = sandbox();
        fs::write(dir.path().join("a.txt"), "x").unwrap();

        let err = RegexRenamer::plan(&guard, ".", "(unclosed", "x", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPattern);

        let err = RegexRenamer::bulk_rename(&guard, ".", "a", "../../a", true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
        assert!(dir.path().join("a.txt").exists());

        let err = RegexRenamer::plan(&guard, "missing", "a", "b", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_no_matches_summary() {
        let (dir, guard) = sandbox();
        fs::write(dir.path().join("a.txt"), "x").unwrap();

        let report = RegexRenamer::bulk_rename(&guard, ".", "zzz", "y", true, false).unwrap();
        assert_eq!(report.summary(), "No matches.");
    }

    #[test]
    fn test_normalize_backrefs() {
        assert_eq!(normalize_backrefs(r"img-\1"), "img-${1}");
        assert_eq!(normalize_backrefs(r"\12x"), "${12}x");
        assert_eq!(normalize_backrefs("$1_keep"), "$1_keep");
        assert_eq!(normalize_backrefs(r"a\\b"), r"a\b");
    }
}
