//! EFRSB Monitor Server Library
//!
//! HTTP server that monitors the Russian Unified Federal Register of
//! Bankruptcy Information (EFRSB) for messages about tracked debtors.
//!
//! # Overview
//!
//! - **Ingestion pipeline**: fetches registry pages, parses the message
//!   table, resolves debtors to known taxpayers, and persists messages
//! - **Background jobs**: batch parses run through an apalis PostgreSQL
//!   job queue with dedicated workers
//! - **API endpoints**: interactive parsing and message search
//! - **Database**: PostgreSQL integration with SQLx
//!
//! # Architecture
//!
//! Features are organized as vertical slices under [`features`]:
//! commands mutate state (run the pipeline, enqueue jobs), queries read
//! it, and routes wire both into axum handlers. The scraping machinery
//! itself lives in [`ingest`].
//!
//! ## Framework Stack
//!
//! - **Axum**: Modern, ergonomic web framework
//! - **SQLx**: PostgreSQL driver and query builder
//! - **Apalis**: PostgreSQL-backed background job processing
//! - **Scraper**: HTML parsing with CSS selectors

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

// Re-export commonly used types
pub use error::AppError;
