//! HTTP/1.1 connection pooling, TLS context caching, and CONNECT-proxy
//! tunneling.

mod connection;
mod endpoint;
mod headers;
mod manager;
mod pool;
mod proxy;
mod tls;

pub use connection::ConnState;
pub use endpoint::{EndpointKey, Scheme};
pub use manager::PoolManager;
pub use pool::{ConnectionPool, PoolOptions};
pub use proxy::ProxyConfig;
pub use tls::{TlsContext, TlsContextCache, TlsKey};
