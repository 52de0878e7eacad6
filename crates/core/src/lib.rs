pub mod document;
pub mod error;
pub mod field_value;
pub mod ids;
pub mod record;
pub mod schema;

pub use error::CoreError;
