#![doc = include_str!("../README.md")]

pub use sqlx_query_template_macro::*;

pub mod dialect;
mod error;
mod format;
mod scanner;
mod template;
mod value;
pub use dialect::*;
pub use error::*;
pub use format::*;
pub use scanner::*;
pub use template::*;
pub use value::*;
