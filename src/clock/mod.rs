pub mod clock;
pub mod wall;
