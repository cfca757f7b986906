mod color;
mod grid;
mod sampling;

pub use color::{expose, hsv_to_rgb};
pub use grid::{contains, pixel_center, pixel_index, position_to_pixel};
pub use sampling::ImageView;
