//! Host platform bridges
//!
//! The form can be opened in a plain browser or inside a messenger webview.
//! The host is resolved once at startup into a [`PlatformKind`] and a boxed
//! [`PlatformBridge`]; callers never branch on the kind themselves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Host the form is running in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Facebook Messenger in-app browser
    Messenger,
    /// Telegram mini app webview
    Telegram,
    /// Any other browser
    #[serde(rename = "web")]
    GenericWeb,
}

impl PlatformKind {
    /// Identify the host from the launch user agent and URL.
    ///
    /// An explicit `platform` query parameter wins over the heuristics.
    pub fn detect(user_agent: &str, url: &str) -> Self {
        let requested = LaunchContext::new(user_agent, url)
            .param("platform")
            .and_then(|p| p.parse::<PlatformKind>().ok());
        if let Some(kind) = requested {
            return kind;
        }
        if url.contains("tgWebAppData") || user_agent.contains("Telegram") {
            return PlatformKind::Telegram;
        }
        const MESSENGER_MARKERS: [&str; 3] = ["FBAN/Messenger", "FB_IAB", "MessengerLite"];
        if MESSENGER_MARKERS.iter().any(|m| user_agent.contains(m)) {
            return PlatformKind::Messenger;
        }
        PlatformKind::GenericWeb
    }

    /// Short name
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Messenger => "messenger",
            PlatformKind::Telegram => "telegram",
            PlatformKind::GenericWeb => "web",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "messenger" => Ok(PlatformKind::Messenger),
            "telegram" => Ok(PlatformKind::Telegram),
            "web" | "generic" => Ok(PlatformKind::GenericWeb),
            other => Err(PlatformError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Platform bridge errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Launch URL carried no context for this host
    #[error("launch data missing: {0}")]
    MissingInitData(&'static str),
    /// Launch data present but unreadable
    #[error("malformed launch data: {0}")]
    MalformedInitData(String),
    /// Configured platform name not recognized
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}

/// What the host must do to close the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseAction {
    /// `Telegram.WebApp.close()`
    TelegramClose,
    /// `MessengerExtensions.requestCloseBrowser()`
    MessengerRequestCloseBrowser,
    /// `window.history.back()`
    HistoryBack,
}

/// Identity of the user as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserContext {
    /// Host that supplied the identity
    pub platform: PlatformKind,
    /// Host-scoped user id (Telegram user id, Messenger PSID)
    pub user_id: String,
    /// Name to greet the user with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Conversation the form was opened from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Kind of that conversation, e.g. `USER_TO_PAGE`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_type: Option<String>,
}

/// How the form was opened
#[derive(Debug, Clone, Default)]
pub struct LaunchContext {
    /// Browser user agent
    pub user_agent: String,
    /// Full launch URL, fragment included
    pub url: String,
}

impl LaunchContext {
    /// Launch context from a user agent and URL
    pub fn new(user_agent: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            url: url.into(),
        }
    }

    /// Key/value pairs from both the query string and the fragment
    fn params(&self) -> Vec<(String, String)> {
        let Ok(url) = Url::parse(&self.url) else {
            return Vec::new();
        };
        let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        if let Some(fragment) = url.fragment() {
            params.extend(url::form_urlencoded::parse(fragment.as_bytes()).into_owned());
        }
        params
    }

    fn param(&self, key: &str) -> Option<String> {
        self.params().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Capabilities every host exposes to the form
#[async_trait]
pub trait PlatformBridge: Send + Sync {
    /// Host kind
    fn kind(&self) -> PlatformKind;

    /// Close the webview or leave the page
    async fn close_webview(&self) -> Result<CloseAction, PlatformError>;

    /// User identity supplied by the host, if any
    async fn user_context(&self) -> Result<Option<UserContext>, PlatformError>;
}

/// Get the bridge for a resolved host
pub fn bridge_for(kind: PlatformKind, launch: &LaunchContext) -> Box<dyn PlatformBridge> {
    match kind {
        PlatformKind::Telegram => Box::new(TelegramBridge::new(launch)),
        PlatformKind::Messenger => Box::new(MessengerBridge::new(launch)),
        PlatformKind::GenericWeb => Box::new(WebBridge),
    }
}

/// Telegram mini app bridge, reading `tgWebAppData` launch parameters
pub struct TelegramBridge {
    init_data: Option<String>,
}

#[derive(Deserialize)]
struct TelegramUser {
    id: i64,
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl TelegramBridge {
    /// Bridge over the given launch
    pub fn new(launch: &LaunchContext) -> Self {
        Self {
            init_data: launch.param("tgWebAppData"),
        }
    }
}

#[async_trait]
impl PlatformBridge for TelegramBridge {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Telegram
    }

    async fn close_webview(&self) -> Result<CloseAction, PlatformError> {
        tracing::debug!("Closing Telegram webview");
        Ok(CloseAction::TelegramClose)
    }

    async fn user_context(&self) -> Result<Option<UserContext>, PlatformError> {
        let init_data = self
            .init_data
            .as_deref()
            .ok_or(PlatformError::MissingInitData("tgWebAppData"))?;

        let Some((_, user_json)) = url::form_urlencoded::parse(init_data.as_bytes())
            .find(|(k, _)| k == "user")
        else {
            return Ok(None);
        };

        let user: TelegramUser = serde_json::from_str(&user_json)
            .map_err(|e| PlatformError::MalformedInitData(e.to_string()))?;

        let display_name = match (&user.last_name, &user.username) {
            (Some(last), _) => format!("{} {}", user.first_name, last),
            (None, Some(username)) if user.first_name.is_empty() => username.clone(),
            _ => user.first_name.clone(),
        };

        Ok(Some(UserContext {
            platform: PlatformKind::Telegram,
            user_id: user.id.to_string(),
            display_name: Some(display_name),
            thread_id: None,
            thread_type: None,
        }))
    }
}

/// Messenger extensions bridge, reading `psid`, `tid` and `thread_type`
pub struct MessengerBridge {
    psid: Option<String>,
    thread_id: Option<String>,
    thread_type: Option<String>,
}

impl MessengerBridge {
    /// Bridge over the given launch
    pub fn new(launch: &LaunchContext) -> Self {
        Self {
            psid: launch.param("psid"),
            thread_id: launch.param("tid"),
            thread_type: launch.param("thread_type"),
        }
    }
}

#[async_trait]
impl PlatformBridge for MessengerBridge {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Messenger
    }

    async fn close_webview(&self) -> Result<CloseAction, PlatformError> {
        tracing::debug!("Requesting Messenger browser close");
        Ok(CloseAction::MessengerRequestCloseBrowser)
    }

    async fn user_context(&self) -> Result<Option<UserContext>, PlatformError> {
        let psid = self.psid.clone().ok_or(PlatformError::MissingInitData("psid"))?;
        Ok(Some(UserContext {
            platform: PlatformKind::Messenger,
            user_id: psid,
            display_name: None,
            thread_id: self.thread_id.clone(),
            thread_type: self.thread_type.clone(),
        }))
    }
}

/// Plain browser; no host identity, closing goes back in history
pub struct WebBridge;

#[async_trait]
impl PlatformBridge for WebBridge {
    fn kind(&self) -> PlatformKind {
        PlatformKind::GenericWeb
    }

    async fn close_webview(&self) -> Result<CloseAction, PlatformError> {
        Ok(CloseAction::HistoryBack)
    }

    async fn user_context(&self) -> Result<Option<UserContext>, PlatformError> {
        Ok(None)
    }
}
