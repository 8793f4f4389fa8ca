//! Cloning the configuration repository.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::{Context, Step, StepResult, done};
use crate::error::SetupError;
use crate::sync::InstallTargets;

/// Shallow-clone the configuration repository, or reuse an existing clone.
#[derive(Debug)]
pub struct CloneRepository;

impl Step for CloneRepository {
    fn name(&self) -> &'static str {
        "Clone repository"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let dir = ctx.repo_dir();
        let url = &ctx.manifest.source.url;

        if ctx.fs_ops.exists(&dir) {
            if would_remove_targets(&dir, &ctx.targets) {
                return Err(SetupError::ProtectedPath(dir).into());
            }
            let question = format!(
                "{} already exists. Remove it and clone again?",
                dir.display()
            );
            if !ctx.prompt.confirm(&question) {
                ctx.log
                    .info(&format!("reusing existing clone at {}", dir.display()));
                return Ok(StepResult::Skipped("reusing existing clone".to_string()));
            }
            if ctx.dry_run {
                ctx.log.dry_run(&format!("remove {}", dir.display()));
            } else {
                ctx.log
                    .debug(&format!("removing previous clone {}", dir.display()));
                std::fs::remove_dir_all(&dir)
                    .with_context(|| format!("removing {}", dir.display()))?;
            }
        }

        if !ctx.dry_run {
            crate::sync::fs::ensure_parent_dir(&dir)?;
        }
        ctx.log.info(&format!("cloning {url}"));
        let dir_arg = dir.to_string_lossy();
        ctx.runner
            .run("git", &["clone", "--depth", "1", url, &dir_arg], false)
            .with_context(|| format!("cloning {url}"))?;

        Ok(done(ctx))
    }
}

/// Whether removing `dir` would also remove the home or configuration root.
fn would_remove_targets(dir: &Path, targets: &InstallTargets) -> bool {
    targets.home.starts_with(dir) || targets.config_root.starts_with(dir)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::steps::test_helpers::make_context;
    use crate::test_support::FakeExecutor;
    use std::sync::Arc;

    #[test]
    fn fresh_clone_is_shallow() {
        let home = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExecutor::new());
        let (mut ctx, _) = make_context(home.path(), &fake, true, false);
        assert_eq!(CloneRepository.run(&mut ctx).unwrap(), StepResult::Ok);
        assert_eq!(
            fake.calls(),
            vec![format!(
                "git clone --depth 1 {} {}",
                ctx.manifest.source.url,
                ctx.repo_dir().display()
            )]
        );
        assert!(
            ctx.repo_dir().parent().unwrap().is_dir(),
            "parent of the clone directory is created"
        );
    }

    #[test]
    fn existing_clone_is_reused_when_declined() {
        let home = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExecutor::new());
        let (mut ctx, _) = make_context(home.path(), &fake, false, false);
        std::fs::create_dir_all(ctx.repo_dir().join(".config")).unwrap();

        let result = CloneRepository.run(&mut ctx).unwrap();
        assert!(matches!(result, StepResult::Skipped(_)));
        assert!(fake.calls().is_empty());
        assert!(ctx.repo_dir().join(".config").is_dir());
    }

    #[test]
    fn existing_clone_is_replaced_when_confirmed() {
        let home = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExecutor::new());
        let (mut ctx, _) = make_context(home.path(), &fake, true, false);
        std::fs::create_dir_all(ctx.repo_dir()).unwrap();
        std::fs::write(ctx.repo_dir().join("stale"), "x").unwrap();

        CloneRepository.run(&mut ctx).unwrap();
        assert!(!ctx.repo_dir().exists(), "old clone removed before cloning");
        assert_eq!(fake.calls().len(), 1);
    }

    #[test]
    fn clone_dir_holding_config_root_is_never_removed() {
        let home = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExecutor::new());
        let (mut ctx, _) = make_context(home.path(), &fake, true, false);
        ctx.targets.config_root = ctx.repo_dir().join(".config");
        std::fs::create_dir_all(&ctx.targets.config_root).unwrap();
        std::fs::write(ctx.targets.config_root.join("keep"), "x").unwrap();

        let err = CloneRepository.run(&mut ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::ProtectedPath(_))
        ));
        assert!(ctx.targets.config_root.join("keep").is_file());
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn protected_paths_cover_home_and_its_ancestors() {
        let targets = InstallTargets::for_home(Path::new("/home/u"));
        assert!(would_remove_targets(Path::new("/home/u"), &targets));
        assert!(would_remove_targets(Path::new("/home"), &targets));
        assert!(would_remove_targets(Path::new("/"), &targets));
        assert!(would_remove_targets(Path::new("/home/u/.config"), &targets));
        assert!(!would_remove_targets(Path::new("/home/u/.cache/rice"), &targets));
        assert!(!would_remove_targets(Path::new("/home/user"), &targets));
    }

    #[test]
    fn dry_run_keeps_existing_clone() {
        let home = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExecutor::new());
        let (mut ctx, _) = make_context(home.path(), &fake, true, true);
        std::fs::create_dir_all(ctx.repo_dir()).unwrap();

        assert_eq!(CloneRepository.run(&mut ctx).unwrap(), StepResult::DryRun);
        assert!(ctx.repo_dir().exists());
        assert!(fake.calls().is_empty());
    }
}
