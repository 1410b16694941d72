#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::cast_possible_truncation, // f64 -> i64
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
)]

pub mod db;
pub mod mapping;
pub mod output;
pub mod paging;
pub mod ranklist;
pub mod row;
pub mod scrape;
pub mod util;
