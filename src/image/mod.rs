pub mod binary;
pub mod io;
pub mod traits;
pub mod u8;

pub use self::binary::BinaryImage;
pub use self::traits::{ImageView, Rows};
pub use self::u8::ImageU8;
