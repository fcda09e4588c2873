//! Platform detection command

use super::CommandResult;
use crate::output::OutputFormat;
use loanapp_client::platform::{CloseAction, UserContext};
use loanapp_client::{bridge_for, AppConfig, LaunchContext, PlatformKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PlatformReport {
    platform: PlatformKind,
    detected: bool,
    close_action: CloseAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_error: Option<String>,
}

pub async fn handle(user_agent: &str, url: &str, settings: &AppConfig, format: OutputFormat) -> CommandResult {
    let launch = LaunchContext::new(user_agent, url);
    let kind = settings
        .platform
        .unwrap_or_else(|| PlatformKind::detect(&launch.user_agent, &launch.url));
    let bridge = bridge_for(kind, &launch);

    let (user, context_error) = match bridge.user_context().await {
        Ok(user) => (user, None),
        Err(e) => {
            tracing::warn!("No user context from {}: {}", kind, e);
            (None, Some(e.to_string()))
        }
    };
    let close_action = bridge.close_webview().await.map_err(|e| e.to_string())?;

    format.print(&PlatformReport {
        platform: bridge.kind(),
        detected: settings.platform.is_none(),
        close_action,
        user,
        context_error,
    });
    Ok(())
}
