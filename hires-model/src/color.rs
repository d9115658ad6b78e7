//! RGBA colors, straight or premultiplied.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    pub premultiplied: bool,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0, premultiplied: true };

    pub fn straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a, premultiplied: false }
    }

    pub fn premultiplied(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a, premultiplied: true }
    }

    /// Opaque color from `0xRRGGBB`.
    pub fn from_rgb(rgb: u32) -> Self {
        Self::straight(
            ((rgb >> 16) & 0xFF) as f32 / 255.0,
            ((rgb >> 8) & 0xFF) as f32 / 255.0,
            (rgb & 0xFF) as f32 / 255.0,
            1.0,
        )
    }

    pub fn set(&mut self, other: Color) -> &mut Self {
        *self = other;
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        *self = Self::TRANSPARENT;
        self
    }

    pub fn to_premultiplied(self) -> Self {
        if self.premultiplied {
            return self;
        }
        Self::premultiplied(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    pub fn to_straight(self) -> Self {
        if !self.premultiplied {
            return self;
        }
        if self.a == 0.0 {
            return Self::straight(0.0, 0.0, 0.0, 0.0);
        }
        Self::straight(self.r / self.a, self.g / self.a, self.b / self.a, self.a)
    }

    /// Place `other` behind this color.
    pub fn underlay(&mut self, other: Color) -> &mut Self {
        if self.a >= 1.0 {
            return self;
        }
        let top = self.to_premultiplied();
        let below = other.to_premultiplied();
        let rest = 1.0 - top.a;
        *self = Self::premultiplied(
            top.r + below.r * rest,
            top.g + below.g * rest,
            top.b + below.b * rest,
            top.a + below.a * rest,
        );
        self
    }

    /// Place `other` in front of this color.
    pub fn overlay(&mut self, other: Color) -> &mut Self {
        let mut top = other;
        top.underlay(*self);
        *self = top;
        self
    }

    pub fn multiply(&mut self, other: Color) -> &mut Self {
        let a = self.to_premultiplied();
        let b = other.to_premultiplied();
        *self = Self::premultiplied(a.r * b.r, a.g * b.g, a.b * b.b, a.a * b.a);
        self
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// `0xAARRGGBB` of the straight color.
    pub fn to_argb(self) -> u32 {
        let c = self.to_straight();
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        channel(c.a) << 24 | channel(c.r) << 16 | channel(c.g) << 8 | channel(c.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premultiply_round_trip() {
        let color = Color::straight(0.5, 1.0, 0.25, 0.5);
        let pre = color.to_premultiplied();
        assert_eq!((pre.r, pre.g, pre.b, pre.a), (0.25, 0.5, 0.125, 0.5));
        assert_eq!(pre.to_straight(), color);
        assert_eq!(Color::TRANSPARENT.to_straight().a, 0.0);
    }

    #[test]
    fn test_underlay() {
        let mut glass = Color::straight(0.0, 0.0, 1.0, 0.5);
        glass.underlay(Color::from_rgb(0xFF0000));
        let result = glass.to_straight();
        assert_eq!(result.a, 1.0);
        assert_eq!((result.r, result.g, result.b), (0.5, 0.0, 0.5));

        let mut opaque = Color::from_rgb(0x00FF00);
        opaque.underlay(Color::from_rgb(0xFF0000));
        assert_eq!(opaque.to_argb(), 0xFF00FF00);
    }

    #[test]
    fn test_overlay_and_multiply() {
        let mut base = Color::from_rgb(0xFF0000);
        base.overlay(Color::straight(0.0, 0.0, 1.0, 0.5));
        assert_eq!(base.to_argb(), 0xFF800080);

        let mut tint = Color::from_rgb(0xFFFFFF);
        tint.multiply(Color::from_rgb(0x336699));
        assert_eq!(tint.to_argb(), 0xFF336699);
    }
}
