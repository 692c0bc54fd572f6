#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    pub start: (f64, f64),
    pub control1: (f64, f64),
    pub control2: (f64, f64),
    pub end: (f64, f64),
}

impl CubicCurve {
    /// Both control points sit on the horizontal midpoint, at the start and end heights.
    pub fn horizontal(start: (f64, f64), end: (f64, f64)) -> Self {
        let xi = (start.0 + end.0) / 2.0;
        Self {
            start,
            control1: (xi, start.1),
            control2: (xi, end.1),
            end,
        }
    }

    pub fn point_at(&self, t: f64) -> (f64, f64) {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        (
            a * self.start.0 + b * self.control1.0 + c * self.control2.0 + d * self.end.0,
            a * self.start.1 + b * self.control1.1 + c * self.control2.1 + d * self.end.1,
        )
    }

    pub fn to_svg_path(&self) -> String {
        format!(
            "M{:.2},{:.2}C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            self.start.0,
            self.start.1,
            self.control1.0,
            self.control1.1,
            self.control2.0,
            self.control2.1,
            self.end.0,
            self.end.1
        )
    }
}
