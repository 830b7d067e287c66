//! Infrastructure layer - chunkers, embedding providers, index, stores and services

pub mod chunking;
pub mod embedding;
pub mod id;
pub mod index;
pub mod logging;
pub mod retrieval;
pub mod services;
pub mod storage;
