//! Decomposition of a text element's affine transform.
//!
//! Text is placed by translating to the matrix's `(e, f)` components, scaling
//! the font uniformly and rotating around the anchor. Skew and shear are not
//! represented.
//!
//! ## Rotation convention
//!
//! Angles are in degrees, clockwise positive, in the y-down space of the SVG
//! source. The same convention is used by [`Surface::transform_rotate`].
//!
//! [`Surface::transform_rotate`]: crate::renderer::Surface::transform_rotate

use crate::parser::scan;

/// Below this magnitude the `b` component is treated as zero
pub const ROTATION_TOLERANCE: f64 = 0.02;

/// Placement derived from a `transform` attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Anchor x (matrix `e`)
    pub x: f64,
    /// Anchor y (matrix `f`)
    pub y: f64,
    /// Uniform font scale factor
    pub scale: f64,
    /// Rotation in degrees, clockwise positive
    pub rotation: f64,
}

impl Default for TextPlacement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl TextPlacement {
    /// Decompose a transform string such as `matrix(a b c d e f)`.
    ///
    /// The first six numbers found anywhere in the string form the matrix.
    /// With fewer than six the default placement is returned.
    pub fn parse(transform: &str) -> Self {
        let values: Vec<f64> = scan::decimals(transform).take(6).collect();
        match values.as_slice() {
            &[a, b, c, d, e, f] => Self::from_matrix([a, b, c, d, e, f]),
            _ => Self::default(),
        }
    }

    /// Decompose `[a b c d e f]` into translation, uniform scale and rotation
    pub fn from_matrix(matrix: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = matrix;
        let (scale, rotation) = if (b == 0.0 && c == 0.0) || b.abs() < ROTATION_TOLERANCE {
            (d, 0.0)
        } else {
            ((b * b + d * d).sqrt(), b.atan2(a).to_degrees())
        };
        Self {
            x: e,
            y: f,
            scale,
            rotation,
        }
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation != 0.0
    }
}
