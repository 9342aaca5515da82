//! Handler contract shared by every data source.
//!
//! A handler fronts one upstream API and exposes the capability set a host
//! data platform expects from a data-source plugin:
//!
//! | Method | Network | Description |
//! |--------|---------|-------------|
//! | [`connect`](DataHandler::connect) | one probe | Validate credentials/reachability |
//! | [`disconnect`](DataHandler::disconnect) | none | Mark the handler disconnected |
//! | [`check_connection`](DataHandler::check_connection) | one probe | Liveness check (same probe as `connect`) |
//! | [`native_query`](DataHandler::native_query) | at most one GET | Route a free-text query |
//! | [`get_tables`](DataHandler::get_tables) | none | Catalog table names |
//! | [`get_columns`](DataHandler::get_columns) | none | Catalog columns of a table |
//!
//! Every operation returns a value rather than a `Result`: failures are folded
//! into [`QueryResponse::Error`] or an unsuccessful [`ConnectionStatus`].

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::{ConnectionStatus, ProviderId, QueryResponse};

pub type HandlerFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Connection state of a handler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Connected flag driven by health-check outcomes.
///
/// Each check overwrites the previous outcome; there is no latching.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    connected: AtomicBool,
}

impl ConnectionTracker {
    pub fn record(&self, status: &ConnectionStatus) {
        self.connected.store(status.success, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

/// Data-source handler contract.
///
/// Implementations must be `Send + Sync`; the only interior state they may
/// carry is the connection flag.
pub trait DataHandler: Send + Sync {
    /// Upstream this handler fronts.
    fn id(&self) -> ProviderId;

    /// Keywords recognised by [`native_query`](DataHandler::native_query), in match order.
    fn keywords(&self) -> Vec<&str>;

    /// Probes the upstream and records the outcome.
    fn connect<'a>(&'a self) -> HandlerFuture<'a, ConnectionStatus>;

    fn disconnect(&self);

    fn state(&self) -> ConnectionState;

    /// Liveness probe; identical to [`connect`](DataHandler::connect).
    fn check_connection<'a>(&'a self) -> HandlerFuture<'a, ConnectionStatus> {
        self.connect()
    }

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Routes a free-text query to one upstream call and normalizes the result.
    fn native_query<'a>(&'a self, query: &'a str) -> HandlerFuture<'a, QueryResponse>;

    fn get_tables(&self) -> QueryResponse;

    fn get_columns(&self, table_name: &str) -> QueryResponse;
}
