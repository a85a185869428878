use http::Method;
use reqwest::blocking::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::connection::body::RequestBody;
use crate::connection::{request, Connection, Dispatch, RequestOutcome};
use crate::error::Result;

/// Scoped connection pool for consecutive requests to the same host.
///
/// The pool is released when the guard is dropped, whether or not the
/// requests made through it succeeded.
#[derive(Debug)]
pub struct Session<'c> {
    connection: &'c Connection,
    http: Client,
    requests: AtomicUsize,
}

impl<'c> Session<'c> {
    pub(crate) fn open(connection: &'c Connection, http: Client) -> Self {
        info!(endpoint = connection.kind().as_str(), "session opened");
        Self {
            connection,
            http,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl Dispatch for Session<'_> {
    fn request(&self, method: Method, path: &str, body: RequestBody, admin: bool) -> Result<RequestOutcome> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        request::execute(
            &self.http,
            self.connection.kind(),
            self.connection.context(),
            method,
            path,
            body,
            admin,
        )
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        info!(
            endpoint = self.connection.kind().as_str(),
            requests = self.requests(),
            "session closed"
        );
    }
}
