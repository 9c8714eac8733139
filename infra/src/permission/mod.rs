//! Permission oracle over HTTP

pub mod http_oracle;

pub use http_oracle::HttpPermissionOracle;

pub use ac_shared::config::PermissionConfig;
