pub mod access;
pub mod catalog;
pub mod executor;
pub mod expression;
pub mod filter;
pub mod loader;
pub mod network;
pub mod query;
pub mod service;
pub mod storage;
