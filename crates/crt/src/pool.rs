//! Re-exports the HTTP/1.1 connection pool.

pub use crt_pool::{ConnectionPool, EndpointKey, PoolManager, PoolOptions, ProxyConfig, Scheme};
