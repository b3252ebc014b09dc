pub mod poll;
pub mod produce;
