use crate::api::RestConnector;
use crate::config::{GitBranchInspector, GitConfigStore};
use crate::models::PullRequest;
use crate::resolver::DialoguerPrompter;
use crate::workflow::{Draft, PullRequestOptions, PullRequestWorkflow};
use crate::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::time::Duration;

/// Open a pull request for the current branch's story
pub async fn run(no_complete: bool) -> Result<()> {
    let current_dir = env::current_dir()?;
    let mut store =
        GitConfigStore::open(&current_dir).context("Failed to open git configuration")?;
    let branches =
        GitBranchInspector::discover(&current_dir).context("Not inside a git repository")?;
    let prompter = DialoguerPrompter;
    let connector = RestConnector;

    let options = PullRequestOptions {
        complete: !no_complete,
    };

    let draft = PullRequestWorkflow::new(&mut store, &prompter, &branches, &connector)
        .compose(options)
        .await?;

    println!();
    print_draft(&draft);

    let pb = spinner(format!("Creating pull request on {}...", draft.repo));
    let result = draft.submit().await;
    pb.finish_and_clear();

    let pull_request = result?;
    println!("{}", created_message(&pull_request).green());
    Ok(())
}

fn print_draft(draft: &Draft) {
    println!("{}", draft.title.cyan().bold());
    println!(
        "   {} {}",
        "Story:".bright_black(),
        format!("#{} {}", draft.story.id, draft.story.title)
    );
    println!("   {} {}", "Branch:".bright_black(), draft.head);
    println!("   {} {}", "Repo:".bright_black(), draft.repo);
    println!();
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn created_message(pull_request: &PullRequest) -> String {
    format!(
        "✅ Created pull request #{}: {}",
        pull_request.number, pull_request.html_url
    )
}
