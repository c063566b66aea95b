//! Where the Redis store lives, resolved once at startup.

use banditry_core::{BanditError, BanditResult};
use std::str::FromStr;

const DEFAULT_PORT: u16 = 6379;

/// Redis connection target.
///
/// Parsed from `host:port`, `host:port:db`, `host:port/namespace`
/// (`host:port:db/namespace` also works) or a `redis://` URL. A pre-built
/// client can be handed over directly.
#[derive(Debug, Clone)]
pub enum StoreTarget {
    Address {
        host: String,
        port: u16,
    },
    AddressWithDb {
        host: String,
        port: u16,
        db: i64,
    },
    AddressWithNamespace {
        host: String,
        port: u16,
        db: Option<i64>,
        namespace: String,
    },
    Url(String),
    Client(redis::Client),
}

impl StoreTarget {
    /// Key prefix namespace, when the target carries one.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            StoreTarget::AddressWithNamespace { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    /// Resolve into a client plus the optional key namespace.
    pub fn into_client(self) -> BanditResult<(redis::Client, Option<String>)> {
        let (url, namespace) = match self {
            StoreTarget::Client(client) => return Ok((client, None)),
            StoreTarget::Url(url) => (url, None),
            StoreTarget::Address { host, port } => (format!("redis://{host}:{port}"), None),
            StoreTarget::AddressWithDb { host, port, db } => {
                (format!("redis://{host}:{port}/{db}"), None)
            }
            StoreTarget::AddressWithNamespace {
                host,
                port,
                db,
                namespace,
            } => {
                let url = match db {
                    Some(db) => format!("redis://{host}:{port}/{db}"),
                    None => format!("redis://{host}:{port}"),
                };
                (url, Some(namespace))
            }
        };

        let client = redis::Client::open(url.as_str())
            .map_err(|e| BanditError::Config(format!("invalid store address {url}: {e}")))?;
        Ok((client, namespace))
    }
}

impl FromStr for StoreTarget {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains("://") {
            return Ok(StoreTarget::Url(s.to_string()));
        }

        let (server, namespace) = match s.split_once('/') {
            Some((server, ns)) if !ns.is_empty() => (server, Some(ns.to_string())),
            Some((server, _)) => (server, None),
            None => (s, None),
        };

        let mut parts = server.split(':');
        let host = parts.next().unwrap_or_default();
        if host.is_empty() {
            return Err(BanditError::Config(format!("missing host in store address {s:?}")));
        }
        let port = match parts.next() {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| BanditError::Config(format!("invalid port {p:?} in {s:?}")))?,
            None => DEFAULT_PORT,
        };
        let db = parts
            .next()
            .map(|d| {
                d.parse::<i64>()
                    .map_err(|_| BanditError::Config(format!("invalid db index {d:?} in {s:?}")))
            })
            .transpose()?;
        if parts.next().is_some() {
            return Err(BanditError::Config(format!("too many ':' in store address {s:?}")));
        }

        let host = host.to_string();
        Ok(match (db, namespace) {
            (db, Some(namespace)) => StoreTarget::AddressWithNamespace {
                host,
                port,
                db,
                namespace,
            },
            (Some(db), None) => StoreTarget::AddressWithDb { host, port, db },
            (None, None) => StoreTarget::Address { host, port },
        })
    }
}
