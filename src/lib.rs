//! Core library for the routing-reports command line application.
//!
//! The library turns semi-structured postal back-office exports into
//! consolidated per-agent CSV reports. The modules are structured to keep
//! responsibilities narrow and composable: IO adapters live under [`io`],
//! data representations inside [`model`], the spreadsheet layout description
//! in [`schema`], the reconciliation steps in [`normalize`], [`agents`],
//! [`orders`], [`assign`], and [`flatten`], and the report orchestration
//! under [`report`].

pub mod agents;
pub mod assign;
pub mod error;
pub mod flatten;
pub mod io;
pub mod model;
pub mod normalize;
pub mod orders;
pub mod report;
pub mod schema;

pub use error::{ReportError, Result};
