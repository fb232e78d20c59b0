pub mod cursor;
pub mod intset;
pub mod listpack;
pub mod quicklist;
pub mod types;
pub mod ziplist;
pub mod zipmap;

pub use quicklist::*;
pub use types::*;
