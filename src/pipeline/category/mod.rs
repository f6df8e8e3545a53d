pub mod types;
pub mod dictionary;
pub mod remote;
pub mod resolver;

pub use types::*;
pub use remote::*;
pub use resolver::*;
