// color.rs     Color module
//
// Copyright (c) 2024-2025  Douglas Lau
//

/// RGB color with channels in `[0, 1]`
///
/// `#[repr(C)]` so that color slices can be written directly into binary
/// buffers for export.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red channel
    pub r: f32,

    /// Green channel
    pub g: f32,

    /// Blue channel
    pub b: f32,
}

/// Interpolate one RGB channel from hue
fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl Color {
    /// Create a new color, clamping each channel to `[0, 1]`
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Create a color from hue / saturation / lightness
    ///
    /// Hue wraps around; saturation and lightness are clamped to `[0, 1]`.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Color::rgb(l, l, l);
        }
        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Color::rgb(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    }

    /// Get hue / saturation / lightness channels
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == self.r {
            (self.g - self.b) / d + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / d + 2.0
        } else {
            (self.r - self.g) / d + 4.0
        };
        (h / 6.0, s, l)
    }

    /// Offset hue / saturation / lightness channels
    pub fn offset_hsl(self, dh: f32, ds: f32, dl: f32) -> Self {
        let (h, s, l) = self.to_hsl();
        Color::from_hsl(h + dh, s + ds, l + dl)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn hsl_round_trip() {
        for color in [
            Color::rgb(0.294, 0.212, 0.129),
            Color::rgb(0.13, 0.55, 0.13),
            Color::rgb(0.8, 0.8, 0.9),
            Color::rgb(0.0, 0.0, 0.0),
            Color::rgb(1.0, 1.0, 1.0),
        ] {
            let (h, s, l) = color.to_hsl();
            let rt = Color::from_hsl(h, s, l);
            assert_near(rt.r, color.r);
            assert_near(rt.g, color.g);
            assert_near(rt.b, color.b);
        }
    }

    #[test]
    fn gray_has_no_hue() {
        let (h, s, l) = Color::rgb(0.5, 0.5, 0.5).to_hsl();
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert_near(l, 0.5);
    }

    #[test]
    fn offset_clamps_channels() {
        let c = Color::rgb(0.9, 0.9, 0.9).offset_hsl(0.0, 0.0, 0.5);
        assert_eq!((c.r, c.g, c.b), (1.0, 1.0, 1.0));
        let c = Color::rgb(0.1, 0.1, 0.1).offset_hsl(0.0, 0.0, -0.5);
        assert_eq!((c.r, c.g, c.b), (0.0, 0.0, 0.0));
    }

    #[test]
    fn hue_wraps() {
        let c = Color::rgb(0.5, 0.25, 0.25);
        let a = c.offset_hsl(1.25, 0.0, 0.0);
        let b = c.offset_hsl(0.25, 0.0, 0.0);
        assert_near(a.r, b.r);
        assert_near(a.g, b.g);
        assert_near(a.b, b.b);
    }
}
