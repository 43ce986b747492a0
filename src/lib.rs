//! GradeLens core: workbook ingestion, dashboard analytics, report
//! generation, and assistant response parsing.

pub mod analysis;
pub mod chat;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod report;
