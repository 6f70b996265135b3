//! Measurement pipeline for ranking anycast CDN addresses.
//!
//! Stages run strictly left to right: [`expand`] turns CIDR/literal input
//! into candidate addresses, [`ping`] measures loss and latency over a
//! bounded worker pool, [`rank`] orders and window-filters the records, and
//! [`download`] benchmarks sustained throughput over the survivors.

pub mod download;
pub mod expand;
pub mod ping;
pub mod rank;
