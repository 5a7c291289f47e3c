//! Infrastructure layer: provider implementations, storage backends and services

pub mod http;
pub mod logging;
pub mod openai;
pub mod services;
pub mod storage;
