//! Git source control through libgit2.

use std::path::Path;

use anyhow::{bail, Context, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, Repository, SubmoduleUpdateOptions};

use crate::sources::SourceControl;
use crate::util::fs::ensure_dir;

/// In-process git using `git2`. The job count is ignored; libgit2 fetches
/// submodules one at a time.
#[derive(Debug, Clone, Default)]
pub struct LibGit;

impl LibGit {
    pub fn new() -> Self {
        LibGit
    }
}

fn shallow_fetch_options<'a>() -> FetchOptions<'a> {
    let mut fo = FetchOptions::new();
    fo.depth(1);
    fo
}

fn update_submodules(repo: &Repository) -> Result<()> {
    for mut submodule in repo.submodules()? {
        let name = submodule.name().unwrap_or("<unnamed>").to_string();
        submodule
            .sync()
            .with_context(|| format!("failed to sync submodule `{}`", name))?;

        let mut opts = SubmoduleUpdateOptions::new();
        opts.fetch(shallow_fetch_options());
        submodule
            .update(true, Some(&mut opts))
            .with_context(|| format!("failed to update submodule `{}`", name))?;

        let nested = submodule
            .open()
            .with_context(|| format!("failed to open submodule `{}`", name))?;
        update_submodules(&nested)?;
    }
    Ok(())
}

impl SourceControl for LibGit {
    fn clone_url(&self, url: &str, reference: &str, _jobs: u32, dest: &Path) -> Result<()> {
        tracing::info!("Cloning {} ({}) into {}", url, reference, dest.display());

        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }

        let repo = RepoBuilder::new()
            .branch(reference)
            .fetch_options(shallow_fetch_options())
            .clone(url, dest)
            .with_context(|| format!("failed to clone {}", url))?;

        update_submodules(&repo)
    }

    fn pull(&self, dest: &Path) -> Result<()> {
        tracing::info!("Updating {}", dest.display());

        let repo = Repository::open(dest)
            .with_context(|| format!("failed to open git repository: {}", dest.display()))?;

        let head = repo.head()?;
        let Some(branch) = head.shorthand().map(str::to_string) else {
            bail!("{} has no checked-out branch", dest.display());
        };
        if !head.is_branch() {
            tracing::debug!("{} is detached at `{}`; nothing to pull", dest.display(), branch);
            return Ok(());
        }

        let mut remote = repo.find_remote("origin")?;
        remote
            .fetch(&[branch.as_str()], Some(&mut shallow_fetch_options()), None)
            .with_context(|| format!("failed to fetch `{}` for {}", branch, dest.display()))?;

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let fetched = repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repo.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            tracing::debug!("{} is up to date", dest.display());
        } else if analysis.is_fast_forward() {
            let refname = format!("refs/heads/{}", branch);
            let mut reference = repo.find_reference(&refname)?;
            reference.set_target(fetched.id(), "trellis: fast-forward")?;
            repo.set_head(&refname)?;
            repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        } else {
            bail!(
                "cannot fast-forward {} to origin/{}; resolve it by hand",
                dest.display(),
                branch
            );
        }

        update_submodules(&repo)
    }
}
