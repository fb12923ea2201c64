pub mod aggregate;
pub mod badge;
pub mod cli;
pub mod diff;
pub mod error;
pub mod github;
pub mod ingest;
pub mod model;
pub mod report;
pub mod summary;
