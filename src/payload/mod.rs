pub mod decoder;
pub mod grouping;
pub mod layout;

pub use decoder::decode_payload;
pub use grouping::{block_count, group_channels};
pub use layout::Layout;
