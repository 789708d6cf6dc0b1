pub mod command;
pub mod driver;
pub mod timer;
