pub mod enums;
pub mod fields;
pub mod document;
pub mod license;
pub mod filters;

pub use enums::*;
pub use fields::*;
pub use document::*;
pub use license::*;
pub use filters::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
