pub mod error;
pub mod logger;
pub mod path;
pub mod lock;
pub mod store;

pub use error::{Result, ScribbleError};
pub use logger::{LogFacade, Logger};
pub use store::{Options, Store};
