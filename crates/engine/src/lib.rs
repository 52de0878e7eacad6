pub mod app;
pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod resource;
pub mod table;

pub use app::PantryApp;
pub use config::{PantryConfig, StoreLocation};
pub use context::{StoreContext, StoreHandle};
pub use editor::TableEditor;
pub use error::EngineError;
pub use resource::{Resource, ResourceState, load_or_seed};
pub use table::{TableRow, TableView};
