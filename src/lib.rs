pub mod chart;
pub mod columns;
pub mod config;
pub mod dataset;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod filter;
pub mod fuzzy_matcher;
pub mod help;
pub mod intent;
pub mod lexer;
pub mod repl;
pub mod response;
pub mod stats;

pub use config::Config;
pub use dataset::DatasetContext;
pub use dispatcher::Interpreter;
pub use error::{AnalyticaError, Result};
pub use response::Response;
