pub mod request;
pub mod types;

pub use request::*;
pub use types::*;
