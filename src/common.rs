pub mod error;
pub mod clock;
