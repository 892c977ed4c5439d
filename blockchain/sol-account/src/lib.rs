pub mod account;
pub use account::*;

pub mod batch;
pub use batch::*;

pub mod error;
pub use error::*;

pub mod response;

pub mod subscription;
pub use subscription::*;

#[cfg(test)]
mod test_utils;
