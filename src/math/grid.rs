use glam::{IVec2, Vec2};

/// Pixel cell containing a continuous position (pixel centers sit at `i + 0.5`)
pub fn position_to_pixel(pos: Vec2) -> IVec2 {
    IVec2::new(pos.x.floor() as i32, pos.y.floor() as i32)
}

/// Center of pixel `(x, y)` in continuous coordinates
pub fn pixel_center(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// True when a continuous position lies on the image
pub fn contains(pos: Vec2, width: u32, height: u32) -> bool {
    pos.x >= 0.0 && pos.y >= 0.0 && pos.x < width as f32 && pos.y < height as f32
}

/// Row-major index of an on-image pixel, `None` outside the image
pub fn pixel_index(pixel: IVec2, width: u32, height: u32) -> Option<usize> {
    if pixel.x < 0 || pixel.y < 0 || pixel.x >= width as i32 || pixel.y >= height as i32 {
        return None;
    }
    Some(pixel.y as usize * width as usize + pixel.x as usize)
}
