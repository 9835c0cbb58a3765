//! Fixed-size pool of page sessions.
//!
//! Each in-flight request holds exactly one session. Once every permit is
//! out, `acquire` waits until a session is returned.

use std::sync::{Mutex, PoisonError};

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::fetch::{FetchError, PageSession, SessionFactory};

pub struct SessionPool<F: SessionFactory> {
  factory: F,
  permits: Semaphore,
  idle:    Mutex<Vec<F::Session>>,
  size:    usize,
}

/// A session on loan from the pool. Dropping it returns the session.
pub struct PooledSession<'a, F: SessionFactory> {
  pool:    &'a SessionPool<F>,
  session: Option<F::Session>,
  _permit: SemaphorePermit<'a>,
}

impl<F: SessionFactory> SessionPool<F> {
  pub fn new(factory: F, size: usize) -> Self {
    let size = size.max(1);
    Self {
      factory,
      permits: Semaphore::new(size),
      idle: Mutex::new(Vec::with_capacity(size)),
      size,
    }
  }

  pub fn size(&self) -> usize { self.size }

  /// Sessions currently parked in the pool.
  pub fn idle_count(&self) -> usize {
    self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  /// Wait for a free slot and hand out an idle session, opening one when
  /// none is parked.
  pub async fn acquire(&self) -> Result<PooledSession<'_, F>, FetchError> {
    let permit = self
      .permits
      .acquire()
      .await
      .map_err(|_| FetchError::Transport("session pool closed".to_string()))?;

    let parked = self
      .idle
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .pop();
    let session = match parked {
      Some(s) => s,
      None => self.factory.open().await?,
    };

    Ok(PooledSession {
      pool:    self,
      session: Some(session),
      _permit: permit,
    })
  }
}

impl<F: SessionFactory> PooledSession<'_, F> {
  /// Drop the session instead of returning it; the next acquirer opens a
  /// fresh one.
  pub fn discard(mut self) { self.session = None; }

  pub async fn fetch(&mut self, url: String) -> Result<String, FetchError> {
    match self.session.as_mut() {
      Some(session) => session.fetch(url).await,
      None => Err(FetchError::Transport("session discarded".to_string())),
    }
  }
}

impl<F: SessionFactory> Drop for PooledSession<'_, F> {
  fn drop(&mut self) {
    if let Some(session) = self.session.take() {
      self
        .pool
        .idle
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(session);
    }
  }
}
