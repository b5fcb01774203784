pub mod io;
pub mod traits;
pub mod u16;

pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u16::{GrayImageU16, ImageU16};
