//! Types shared between the exchange client and anything that speaks its
//! backend's HTTP contract (mock servers in tests included).

pub mod domain;
pub mod error;
pub mod protocol;
