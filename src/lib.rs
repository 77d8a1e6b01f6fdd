#![warn(clippy::pedantic)]
// Noisy doc/signature lints — would require annotating most pub functions
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference — keeping format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
// Snowflake timestamp math casts millisecond counts between u64 and i64
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod discord;
pub mod errors;
pub mod export;
pub mod model;
pub mod render;
pub(crate) mod utils;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
