//! afterschool - a lesson catalog and order service
//!
//! The service lists lessons, searches them by topic or location, updates
//! their remaining space, and records orders, all over HTTP on top of a small
//! document store.
//!
//! - [`storage`]: the document store and the handle shared by handlers
//! - [`query`]: search and update translation into store predicates and mutations
//! - [`catalog`]: lesson and order document shapes
//! - [`http_server`]: routes, errors and server lifecycle
//! - [`cli`]: `serve` and `seed` commands
//! - [`observability`]: structured logging

pub mod catalog;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod storage;
