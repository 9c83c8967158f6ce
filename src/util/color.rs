/// Pack 8-bit channels as RGBA in a u32 (R in the high byte).
pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32
}

/// Unpack to floats in [0, 1].
pub fn unpack_rgba(c: u32) -> [f32; 4] {
    [
        ((c >> 24) & 0xFF) as f32 / 255.0,
        ((c >> 16) & 0xFF) as f32 / 255.0,
        ((c >> 8) & 0xFF) as f32 / 255.0,
        (c & 0xFF) as f32 / 255.0,
    ]
}

/// Opaque colour from hue, saturation and lightness, all in [0, 1].
pub fn hsl(h: f32, s: f32, l: f32) -> u32 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    pack_rgba(
        channel(h + 1.0 / 3.0),
        channel(h),
        channel(h - 1.0 / 3.0),
        0xFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries() {
        assert_eq!(hsl(0.0, 1.0, 0.5), 0xFF0000FF);
        assert_eq!(hsl(1.0 / 3.0, 1.0, 0.5), 0x00FF00FF);
        assert_eq!(hsl(2.0 / 3.0, 1.0, 0.5), 0x0000FFFF);
    }

    #[test]
    fn grey_ignores_hue() {
        assert_eq!(hsl(0.3, 0.0, 0.5), hsl(0.8, 0.0, 0.5));
    }

    #[test]
    fn unpack_inverts_pack() {
        let c = pack_rgba(255, 0, 51, 102);
        assert_eq!(unpack_rgba(c), [1.0, 0.0, 0.2, 0.4]);
    }
}
