//! Rectangles and affine transforms shared by the cache, renderer and search

/// Page units per inch; media boxes are reported at this resolution.
pub const REFERENCE_DPI: f32 = 72.0;

/// Axis-aligned rectangle in floating point coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const EMPTY: Self = Self {
        x0: 0.0,
        y0: 0.0,
        x1: 0.0,
        y1: 0.0,
    };

    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Smallest integer rectangle covering this one.
    ///
    /// Edges within 0.001 of an integer snap to it, so a transform that lands
    /// on 611.9999 does not grow the result by a whole pixel.
    #[must_use]
    pub fn round_out(&self) -> IRect {
        if self.is_empty() {
            return IRect::EMPTY;
        }
        IRect {
            x0: (self.x0 + 0.001).floor() as i32,
            y0: (self.y0 + 0.001).floor() as i32,
            x1: (self.x1 - 0.001).ceil() as i32,
            y1: (self.y1 - 0.001).ceil() as i32,
        }
    }
}

impl From<IRect> for Rect {
    fn from(r: IRect) -> Self {
        Self::new(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32)
    }
}

/// Axis-aligned rectangle in device pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl IRect {
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    #[must_use]
    pub fn intersect(&self, other: &IRect) -> IRect {
        let r = IRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if r.is_empty() { IRect::EMPTY } else { r }
    }

    /// Bounding union; empty operands are ignored.
    #[must_use]
    pub fn union(&self, other: &IRect) -> IRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        IRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// Affine transform `[a b c d e f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    #[must_use]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Uniform scale from page units to pixels at `dpi`
    #[must_use]
    pub fn for_resolution(dpi: u32) -> Self {
        let zoom = dpi as f32 / REFERENCE_DPI;
        Self::scale(zoom, zoom)
    }

    /// `self` followed by `then`
    #[must_use]
    pub fn concat(&self, then: &Matrix) -> Matrix {
        Matrix {
            a: self.a * then.a + self.b * then.c,
            b: self.a * then.b + self.b * then.d,
            c: self.c * then.a + self.d * then.c,
            d: self.c * then.b + self.d * then.d,
            e: self.e * then.a + self.f * then.c + then.e,
            f: self.e * then.b + self.f * then.d + then.f,
        }
    }

    #[must_use]
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Bounding box of the transformed corners of `r`
    #[must_use]
    pub fn transform_rect(&self, r: &Rect) -> Rect {
        if r.is_empty() {
            return Rect::EMPTY;
        }
        let corners = [
            self.transform_point(r.x0, r.y0),
            self.transform_point(r.x1, r.y0),
            self.transform_point(r.x0, r.y1),
            self.transform_point(r.x1, r.y1),
        ];
        let mut out = Rect::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for (x, y) in corners {
            out.x0 = out.x0.min(x);
            out.y0 = out.y0.min(y);
            out.x1 = out.x1.max(x);
            out.y1 = out.y1.max(y);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_matrix_scales_letter_page() {
        let ctm = Matrix::for_resolution(144);
        let media = Rect::new(0.0, 0.0, 612.0, 792.0);
        let bbox = ctm.transform_rect(&media).round_out();
        assert_eq!(bbox, IRect::new(0, 0, 1224, 1584));
    }

    #[test]
    fn round_out_tolerates_float_noise() {
        let r = Rect::new(0.0004, 9.9996, 99.9999, 20.5);
        assert_eq!(r.round_out(), IRect::new(0, 10, 100, 21));
    }

    #[test]
    fn concat_applies_left_then_right() {
        let m = Matrix::scale(2.0, 2.0).concat(&Matrix::scale(0.5, 3.0));
        assert_eq!(m.transform_point(10.0, 10.0), (10.0, 60.0));
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let a = IRect::new(0, 0, 10, 10);
        let b = IRect::new(20, 20, 30, 30);
        assert!(a.intersect(&b).is_empty());
        assert_eq!(a.intersect(&IRect::new(5, 5, 30, 30)), IRect::new(5, 5, 10, 10));
    }

    #[test]
    fn union_skips_empty() {
        let a = IRect::EMPTY;
        let b = IRect::new(1, 2, 3, 4);
        assert_eq!(a.union(&b), b);
        assert_eq!(b.union(&IRect::new(0, 0, 2, 2)), IRect::new(0, 0, 3, 4));
    }
}
