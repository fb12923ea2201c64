//! GitHub API helpers for replacing the coverage diff comment on a pull
//! request.

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;

const COMMENT_MARKER: &str = "<!-- covdiff-comment -->";
const API_ROOT: &str = "https://api.github.com";

/// Hidden marker identifying comments written by this tool.
pub fn comment_marker() -> &'static str {
    COMMENT_MARKER
}

/// Resolved GitHub Actions context, read from environment variables.
pub struct Context {
    token: String,
    repo: String,
    pr_number: u64,
}

impl Context {
    /// Build a context from standard GitHub Actions environment variables
    /// (`GITHUB_TOKEN`, `GITHUB_REPOSITORY`, `GITHUB_REF`). `Ok(None)` when
    /// the run is not for a pull request.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_vars(
            &std::env::var("GITHUB_REF").unwrap_or_default(),
            std::env::var("GITHUB_TOKEN").ok(),
            std::env::var("GITHUB_REPOSITORY").ok(),
        )
    }

    /// Like [`Context::from_env`], with the variables passed in. Token and
    /// repository are only required once `github_ref` names a pull request.
    pub fn from_vars(
        github_ref: &str,
        token: Option<String>,
        repo: Option<String>,
    ) -> Result<Option<Self>> {
        let Some(pr_number) = pr_number_from_ref(github_ref) else {
            return Ok(None);
        };
        let token = token.context("GITHUB_TOKEN environment variable is required")?;
        let repo = repo.context("GITHUB_REPOSITORY environment variable is required")?;
        Ok(Some(Self {
            token,
            repo,
            pr_number,
        }))
    }

    pub fn pr_number(&self) -> u64 {
        self.pr_number
    }

    /// Delete every earlier comment from this tool, then post `body`.
    pub fn replace_comment(&self, body: &str) -> Result<()> {
        let stale = self.find_own_comments()?;
        for id in &stale {
            self.delete_comment(*id)?;
        }
        if !stale.is_empty() {
            log::info!("Deleted {} previous coverage comment(s)", stale.len());
        }

        self.create_comment(body)?;
        log::info!("Comment posted to {}/pull/{}", self.repo, self.pr_number);
        Ok(())
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        ureq::request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "covdiff")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }

    /// IDs of comments on the PR that carry our hidden marker.
    fn find_own_comments(&self) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "{API_ROOT}/repos/{}/issues/{}/comments?per_page=100&page={page}",
                self.repo, self.pr_number
            );
            let comments: Vec<Comment> = self
                .request("GET", &url)
                .call()
                .context("Failed to list PR comments")?
                .into_json()
                .context("Failed to parse comments JSON")?;
            if comments.is_empty() {
                break;
            }
            ids.extend(
                comments
                    .iter()
                    .filter(|c| is_own_comment(c.body.as_deref()))
                    .map(|c| c.id),
            );
            page += 1;
        }
        Ok(ids)
    }

    fn delete_comment(&self, id: u64) -> Result<()> {
        let url = format!("{API_ROOT}/repos/{}/issues/comments/{id}", self.repo);
        check(self.request("DELETE", &url).call(), "deleting comment")
    }

    fn create_comment(&self, body: &str) -> Result<()> {
        let url = format!(
            "{API_ROOT}/repos/{}/issues/{}/comments",
            self.repo, self.pr_number
        );
        let resp = self
            .request("POST", &url)
            .send_json(serde_json::json!({ "body": with_marker(body) }));
        check(resp, "creating comment")
    }
}

#[derive(Deserialize)]
struct Comment {
    id: u64,
    body: Option<String>,
}

fn check(resp: std::result::Result<ureq::Response, ureq::Error>, action: &str) -> Result<()> {
    match resp {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            bail!("GitHub API error {action} (HTTP {code}): {body}");
        }
        Err(e) => bail!("Failed {action}: {e}"),
    }
}

fn with_marker(body: &str) -> String {
    format!("{COMMENT_MARKER}\n{body}")
}

fn is_own_comment(body: Option<&str>) -> bool {
    body.is_some_and(|b| b.contains(COMMENT_MARKER))
}

/// Extract the PR number from a ref such as `refs/pull/42/merge`.
pub fn pr_number_from_ref(github_ref: &str) -> Option<u64> {
    let parts: Vec<&str> = github_ref.split('/').collect();
    if parts.len() >= 3 && parts[0] == "refs" && parts[1] == "pull" {
        parts[2].parse().ok()
    } else {
        None
    }
}
