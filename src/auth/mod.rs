pub mod authentication;
pub mod token;

pub use authentication::*;
pub use token::*;
