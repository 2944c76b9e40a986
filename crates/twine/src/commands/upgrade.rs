//! Upgrade command

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;
use twine_update::{
    BinaryInstaller, GitHubReleaseClient, ReleaseSource, UpdateConfig, UpdateFailure,
    UpdateOptions, UpdateResult, Updater,
};

use crate::cli::UpgradeArgs;
use crate::output;
use crate::version::VERSION;

pub async fn run(args: UpgradeArgs) -> Result<()> {
    let config = UpdateConfig::load().context("Failed to load update configuration")?;
    let client = GitHubReleaseClient::new(&config)?.with_progress(!args.json);
    let updater = Updater::new(Arc::new(client));

    remove_stale_binary(&args);

    if args.list {
        return list_versions(updater.source()).await;
    }

    let outcome = if args.check {
        let spinner = output::spinner("Checking for updates...");
        let outcome = updater.check_for_update(VERSION).await;
        spinner.finish_and_clear();
        outcome
    } else {
        let mut options = UpdateOptions::new(VERSION);
        options.target_version = args.target_version.clone();
        options.install_path = args.install_path.clone();
        updater.update(options).await
    };

    report(outcome, args.json)
}

/// List available versions
async fn list_versions(source: &dyn ReleaseSource) -> Result<()> {
    output::header("Available versions");
    let releases = source.list_releases().await?;

    for release in releases {
        let tag = &release.tag_name;
        let current = if twine_update::version::compare(tag, VERSION).is_eq() {
            " (current)"
        } else {
            ""
        };
        let prerelease = if release.prerelease {
            " [prerelease]"
        } else {
            ""
        };
        let date = release
            .published_at
            .map(|d| format!(" - {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!("  {}{}{}{}", tag, date, prerelease, current);
    }
    Ok(())
}

/// Print a successful outcome; a failure is returned for `main` to report
fn report(outcome: Result<UpdateResult, UpdateFailure>, json: bool) -> Result<()> {
    match outcome {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.updated {
                output::success(&result.message);
            } else {
                output::info(&result.message);
            }
            Ok(())
        }
        Err(failure) => {
            let kind = failure.kind();
            Err(anyhow::Error::new(failure).context(format!("Upgrade failed [{}]", kind)))
        }
    }
}

/// Windows leaves the previous binary beside the new one; remove it
fn remove_stale_binary(args: &UpgradeArgs) {
    let target = match &args.install_path {
        Some(path) => path.clone(),
        None => match std::env::current_exe() {
            Ok(path) => path,
            Err(_) => return,
        },
    };

    if let Err(e) = BinaryInstaller::new().cleanup_stale(&target) {
        warn!("{}", e);
    }
}
