//! Integration tests for the pool and the indexing pipeline
//!
//! Both run against a scripted NNTP server listening on localhost.

mod fake_server;
mod indexer_tests;
mod pool_tests;
