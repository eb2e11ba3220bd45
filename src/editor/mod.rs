pub mod buffer;
pub mod highlight;
pub mod wrap;
