pub mod discovery;
pub mod error;
pub mod local_address;
