//! Question-bank search service: keyword and photo search over a relational
//! question store and an image vector index.

pub mod app;
pub mod client;
pub mod config;
pub mod database;
pub mod embedding;
pub mod error;
pub mod ids;
pub mod models;
pub mod orchestrator;
pub mod routes;
pub mod search;
pub mod storage;
pub mod vector_store;
pub mod vision;
