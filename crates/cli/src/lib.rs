pub mod disc;
pub mod pixel;
pub mod resolution;
pub mod sht;
