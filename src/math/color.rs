use glam::{Vec3, Vec4};

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let h_prime = (h * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

/// Scale rgb by `exposure`, optionally flooring at zero; alpha untouched
pub fn expose(color: Vec4, exposure: f32, clamp_negative: bool) -> Vec4 {
    let rgb = color.truncate() * exposure;
    let rgb = if clamp_negative { rgb.max(Vec3::ZERO) } else { rgb };
    rgb.extend(color.w)
}
