//! Request coalescing for concurrent fetches
//!
//! Two distinct raw URLs can normalize to different keys yet name the same
//! resource, and the same raw URL can be requested by several owners at once
//! (for example `/a?x=1` linked from many pages whose keys differ). The
//! coalescer keeps one shared future per raw URL while a fetch is in flight;
//! every caller arriving before it resolves gets a clone of the same result.

use crate::crawler::fetcher::FetchResult;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Table of in-flight fetches keyed by raw URL
#[derive(Default)]
pub struct RequestCoalescer {
    in_flight: Mutex<HashMap<String, SharedFetch>>,
}

impl RequestCoalescer {
    /// Creates an empty coalescer
    pub fn new() -> Self {
        Self::default()
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `fetch` for `raw_url`, or joins the fetch already running for it
    ///
    /// `fetch` is only called when no fetch for `raw_url` is in flight. The
    /// entry is removed once the shared result is available, so a later call
    /// for the same URL fetches again.
    pub async fn coalesce<F, Fut>(&self, raw_url: &str, fetch: F) -> FetchResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let shared = {
            let mut in_flight = self.in_flight();
            match in_flight.get(raw_url) {
                Some(existing) => {
                    tracing::debug!("Joining in-flight fetch for {}", raw_url);
                    existing.clone()
                }
                None => {
                    let shared = fetch().boxed().shared();
                    in_flight.insert(raw_url.to_string(), shared.clone());
                    shared
                }
            }
        };

        let _release = Release {
            coalescer: self,
            raw_url,
            shared: &shared,
        };

        shared.clone().await
    }

    /// Returns the number of fetches currently in flight
    pub fn in_flight_count(&self) -> usize {
        self.in_flight().len()
    }
}

/// Drops the table entry when the waiting caller finishes or is cancelled
struct Release<'a> {
    coalescer: &'a RequestCoalescer,
    raw_url: &'a str,
    shared: &'a SharedFetch,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.coalescer.in_flight();

        // A newer fetch for the same URL may have replaced ours.
        if in_flight
            .get(self.raw_url)
            .is_some_and(|current| current.ptr_eq(self.shared))
        {
            in_flight.remove(self.raw_url);
        }
    }
}
