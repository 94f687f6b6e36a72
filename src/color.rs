// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Distance-to-colour mapping.
//!
//! The clinical map is a fixed piecewise-linear transfer function:
//!
//! | distance (mm) | colour          |
//! |---------------|-----------------|
//! | 0.0 - 1.0     | red             |
//! | 1.0 - 1.6     | red to yellow   |
//! | 1.6 - 3.25    | yellow to green |
//! | 3.25 - 4.0    | green to blue   |
//! | 4.0 and above | blue            |

use crate::error::{JointSpaceError, Result};
use crate::result::ScalarField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value range the clinical colour map is displayed over
pub const DISPLAY_RANGE: (f64, f64) = (0.0, 5.0);

/// Name of the clinical preset
pub const CLINICAL_PRESET: &str = "JSV_RYGB_0to5";

/// Linear RGB colour with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);
    pub const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// 8-bit channels, rounded
    pub fn to_u8(&self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_u8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// One control point of a transfer function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub value: f64,
    pub color: Rgb,
}

/// Piecewise-linear scalar to colour mapping, clamped at both ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTransferFunction {
    name: String,
    points: Vec<ControlPoint>,
}

impl ColorTransferFunction {
    /// Control points must be non-empty, finite, sorted by value and have
    /// channels in `[0, 1]`. Repeated values produce a hard step.
    pub fn new(name: impl Into<String>, points: Vec<ControlPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(JointSpaceError::invalid_color_map("no control points"));
        }
        for (i, point) in points.iter().enumerate() {
            if !point.value.is_finite() {
                return Err(JointSpaceError::invalid_color_map(format!(
                    "control point {} has non-finite value",
                    i
                )));
            }
            if !point.color.is_valid() {
                return Err(JointSpaceError::invalid_color_map(format!(
                    "control point {} has a channel outside [0, 1]",
                    i
                )));
            }
        }
        if points.windows(2).any(|w| w[1].value < w[0].value) {
            return Err(JointSpaceError::invalid_color_map(
                "control points are not sorted by value",
            ));
        }

        Ok(Self {
            name: name.into(),
            points,
        })
    }

    /// The fixed red/yellow/green/blue map over 0-5 mm
    pub fn clinical() -> Self {
        let p = |value, color| ControlPoint { value, color };
        Self {
            name: CLINICAL_PRESET.to_string(),
            points: vec![
                p(0.0, Rgb::RED),
                p(1.0, Rgb::RED),
                p(1.6, Rgb::YELLOW),
                p(3.25, Rgb::GREEN),
                p(4.0, Rgb::BLUE),
                p(5.0, Rgb::BLUE),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Colour at `value`; NaN maps to the first control point
    pub fn evaluate(&self, value: f64) -> Rgb {
        // `new` and `clinical` guarantee at least one point
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Rgb::RED,
        };
        if value.is_nan() || value <= first.value {
            return first.color;
        }
        if value >= last.value {
            return last.color;
        }

        let upper = self.points.partition_point(|p| p.value <= value);
        let lo = &self.points[upper - 1];
        let hi = &self.points[upper];
        let t = (value - lo.value) / (hi.value - lo.value);
        lo.color.lerp(&hi.color, t)
    }
}

/// Coarse colour bands, used for histograms and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorBand {
    /// Up to 1.0 mm
    Red,
    RedYellow,
    YellowGreen,
    GreenBlue,
    /// Beyond 4.0 mm
    Blue,
}

impl ColorBand {
    pub const ALL: [ColorBand; 5] = [
        ColorBand::Red,
        ColorBand::RedYellow,
        ColorBand::YellowGreen,
        ColorBand::GreenBlue,
        ColorBand::Blue,
    ];

    pub fn classify(distance: f64) -> Self {
        if distance.is_nan() || distance <= 1.0 {
            Self::Red
        } else if distance <= 1.6 {
            Self::RedYellow
        } else if distance <= 3.25 {
            Self::YellowGreen
        } else if distance <= 4.0 {
            Self::GreenBlue
        } else {
            Self::Blue
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "0.00-1.00 mm  red",
            Self::RedYellow => "1.00-1.60 mm  red-yellow",
            Self::YellowGreen => "1.60-3.25 mm  yellow-green",
            Self::GreenBlue => "3.25-4.00 mm  green-blue",
            Self::Blue => "> 4.00 mm     blue",
        }
    }
}

/// Maps distances to display colours over a fixed range
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBandMapper {
    transfer: ColorTransferFunction,
    range: (f64, f64),
}

impl Default for ColorBandMapper {
    fn default() -> Self {
        Self::clinical()
    }
}

impl ColorBandMapper {
    pub fn clinical() -> Self {
        Self {
            transfer: ColorTransferFunction::clinical(),
            range: DISPLAY_RANGE,
        }
    }

    /// Custom transfer function displayed over `range`
    pub fn new(transfer: ColorTransferFunction, range: (f64, f64)) -> Result<Self> {
        if !(range.0.is_finite() && range.1.is_finite()) || range.0 > range.1 {
            return Err(JointSpaceError::invalid_color_map(format!(
                "invalid display range {:?}",
                range
            )));
        }
        Ok(Self { transfer, range })
    }

    pub fn transfer_function(&self) -> &ColorTransferFunction {
        &self.transfer
    }

    pub fn scalar_range(&self) -> (f64, f64) {
        self.range
    }

    /// Colour for one distance; the value is clamped to the display range
    pub fn color_for(&self, distance: f64) -> Rgb {
        // NaN passes through clamp and lands on the low end
        self.transfer.evaluate(distance.clamp(self.range.0, self.range.1))
    }

    pub fn vertex_colors(&self, field: &ScalarField) -> Vec<Rgb> {
        field.values().iter().map(|&d| self.color_for(d)).collect()
    }

    /// Vertex count per colour band, in band order
    pub fn band_histogram(&self, field: &ScalarField) -> Vec<(ColorBand, usize)> {
        let mut counts = [0usize; 5];
        for &d in field.values() {
            counts[ColorBand::classify(d) as usize] += 1;
        }
        ColorBand::ALL.iter().copied().zip(counts).collect()
    }
}
