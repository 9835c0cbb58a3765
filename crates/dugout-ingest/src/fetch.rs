//! Page-fetch collaborators and the HTTP implementation.

use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode};
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  #[error("fetch timed out")]
  Timeout,
  #[error("transport error: {0}")]
  Transport(String),
  #[error("unexpected status {0}")]
  Status(u16),
}

impl FetchError {
  /// Timeouts, broken connections, throttling and server errors are worth
  /// another attempt; other statuses are not.
  pub fn is_retryable(&self) -> bool {
    match self {
      Self::Timeout | Self::Transport(_) => true,
      Self::Status(code) => *code == 429 || (500..600).contains(code),
    }
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      Self::Timeout
    } else {
      Self::Transport(e.to_string())
    }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// One page-rendering session. A session serves one request at a time.
pub trait PageSession: Send {
  /// Fetch `url` and return its rendered HTML.
  fn fetch(&mut self, url: String) -> impl Future<Output = Result<String, FetchError>> + Send + '_;
}

/// Opens new sessions for the pool.
pub trait SessionFactory: Send + Sync {
  type Session: PageSession;

  fn open(&self) -> impl Future<Output = Result<Self::Session, FetchError>> + Send + '_;
}

// ─── HTTP ────────────────────────────────────────────────────────────────────

/// Builds one [`reqwest::Client`] per session.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
  user_agent: String,
  timeout:    Duration,
}

impl HttpSessionFactory {
  pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
    Self {
      user_agent: user_agent.into(),
      timeout,
    }
  }
}

pub struct HttpSession {
  client: Client,
}

impl SessionFactory for HttpSessionFactory {
  type Session = HttpSession;

  async fn open(&self) -> Result<HttpSession, FetchError> {
    let client = Client::builder()
      .user_agent(self.user_agent.as_str())
      .timeout(self.timeout)
      .build()?;
    Ok(HttpSession { client })
  }
}

impl PageSession for HttpSession {
  async fn fetch(&mut self, url: String) -> Result<String, FetchError> {
    let resp = self.client.get(&url).send().await?;
    let status = resp.status();
    if status != StatusCode::OK {
      return Err(FetchError::Status(status.as_u16()));
    }
    Ok(resp.text().await?)
  }
}

/// Host part of `url`, the key the throttle spaces requests by.
pub fn host_of(url: &str) -> String {
  reqwest::Url::parse(url)
    .ok()
    .and_then(|u| u.host_str().map(str::to_string))
    .unwrap_or_default()
}
