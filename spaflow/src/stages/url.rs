//! Trailing slash policies.
//!
//! Only one of the two stages should be wired into a pipeline. Both leave
//! preview requests alone and never touch the query string.

use super::Stage;
use crate::context::SpaRequest;
use crate::core::SpaResponse;
use async_trait::async_trait;
use tracing::debug;

/// Redirects `/foo?x=1` to `/foo/?x=1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddTrailingSlash;

#[async_trait]
impl Stage for AddTrailingSlash {
    fn name(&self) -> &str {
        "add_trailing_slash"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        if request.is_preview() {
            return Ok(());
        }

        let (path, query) = split_query(request.url());
        if path.ends_with('/') {
            return Ok(());
        }

        let target = join_query(&format!("{path}/"), query);
        debug!(from = %request.url(), to = %target, "Enforcing trailing slash");
        request.set_response(SpaResponse::redirect(target, true))?;
        Ok(())
    }
}

/// Redirects `/foo/?x=1` to `/foo?x=1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveTrailingSlash;

#[async_trait]
impl Stage for RemoveTrailingSlash {
    fn name(&self) -> &str {
        "remove_trailing_slash"
    }

    async fn execute(&self, request: &mut SpaRequest) -> anyhow::Result<()> {
        if request.is_preview() {
            return Ok(());
        }

        let (path, query) = split_query(request.url());
        if path.len() <= 1 {
            return Ok(());
        }
        let Some(stripped) = path.strip_suffix('/') else {
            return Ok(());
        };

        let target = join_query(stripped, query);
        debug!(from = %request.url(), to = %target, "Removing trailing slash");
        request.set_response(SpaResponse::redirect(target, true))?;
        Ok(())
    }
}

fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

fn join_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}
