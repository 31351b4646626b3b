//! Cubic performance curves.
use super::curve_quadratic::evaluate_polynomial;
use super::{Model, ModelObject, ModelObjectKind};
use anyhow::Result;
use std::borrow::{Borrow, BorrowMut};

const COEFFICIENT1_CONSTANT: usize = 2;
const COEFFICIENT2_X: usize = 3;
const COEFFICIENT3_X2: usize = 4;
const COEFFICIENT4_X3: usize = 5;
const MINIMUM_VALUE_OF_X: usize = 6;
const MAXIMUM_VALUE_OF_X: usize = 7;
const MINIMUM_CURVE_OUTPUT: usize = 8;
const MAXIMUM_CURVE_OUTPUT: usize = 9;

/// `OS:Curve:Cubic`: `C1 + C2*x + C3*x^2 + C4*x^3`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveCubic;

impl ModelObjectKind for CurveCubic {
    const IDD_OBJECT_TYPE: &'static str = "OS:Curve:Cubic";

    fn initialize(object: &mut ModelObject<&mut Model, Self>) -> Result<()> {
        for index in COEFFICIENT1_CONSTANT..=MINIMUM_VALUE_OF_X {
            object.set_double(index, 0.0)?;
        }
        object.set_maximum_value_of_x(1.0)
    }
}

impl<M: Borrow<Model>> ModelObject<M, CurveCubic> {
    /// C1
    pub fn coefficient1_constant(&self) -> f64 {
        self.get_double(COEFFICIENT1_CONSTANT).unwrap_or_default()
    }

    /// C2
    pub fn coefficient2_x(&self) -> f64 {
        self.get_double(COEFFICIENT2_X).unwrap_or_default()
    }

    /// C3
    pub fn coefficient3_x_pow2(&self) -> f64 {
        self.get_double(COEFFICIENT3_X2).unwrap_or_default()
    }

    /// C4
    pub fn coefficient4_x_pow3(&self) -> f64 {
        self.get_double(COEFFICIENT4_X3).unwrap_or_default()
    }

    /// The lowest value of x the curve is evaluated at
    pub fn minimum_value_of_x(&self) -> f64 {
        self.get_double(MINIMUM_VALUE_OF_X).unwrap_or_default()
    }

    /// The highest value of x the curve is evaluated at
    pub fn maximum_value_of_x(&self) -> f64 {
        self.get_double(MAXIMUM_VALUE_OF_X).unwrap_or(1.0)
    }

    /// The lowest value the curve may give
    pub fn minimum_curve_output(&self) -> Option<f64> {
        self.get_double(MINIMUM_CURVE_OUTPUT)
    }

    /// The highest value the curve may give
    pub fn maximum_curve_output(&self) -> Option<f64> {
        self.get_double(MAXIMUM_CURVE_OUTPUT)
    }

    /// Evaluate the curve at `x`, clamping `x` into range and the result into any output bounds
    pub fn evaluate(&self, x: f64) -> f64 {
        evaluate_polynomial(
            &[
                self.coefficient1_constant(),
                self.coefficient2_x(),
                self.coefficient3_x_pow2(),
                self.coefficient4_x_pow3(),
            ],
            x,
            (self.minimum_value_of_x(), self.maximum_value_of_x()),
            (self.minimum_curve_output(), self.maximum_curve_output()),
        )
    }
}

impl<M: BorrowMut<Model>> ModelObject<M, CurveCubic> {
    /// Set C1
    pub fn set_coefficient1_constant(&mut self, value: f64) -> Result<()> {
        self.set_double(COEFFICIENT1_CONSTANT, value)
    }

    /// Set C2
    pub fn set_coefficient2_x(&mut self, value: f64) -> Result<()> {
        self.set_double(COEFFICIENT2_X, value)
    }

    /// Set C3
    pub fn set_coefficient3_x_pow2(&mut self, value: f64) -> Result<()> {
        self.set_double(COEFFICIENT3_X2, value)
    }

    /// Set C4
    pub fn set_coefficient4_x_pow3(&mut self, value: f64) -> Result<()> {
        self.set_double(COEFFICIENT4_X3, value)
    }

    /// Set the lowest value of x
    pub fn set_minimum_value_of_x(&mut self, value: f64) -> Result<()> {
        self.set_double(MINIMUM_VALUE_OF_X, value)
    }

    /// Set the highest value of x
    pub fn set_maximum_value_of_x(&mut self, value: f64) -> Result<()> {
        self.set_double(MAXIMUM_VALUE_OF_X, value)
    }

    /// Set the lowest output
    pub fn set_minimum_curve_output(&mut self, value: f64) -> Result<()> {
        self.set_double(MINIMUM_CURVE_OUTPUT, value)
    }

    /// Remove the lower output bound
    pub fn reset_minimum_curve_output(&mut self) {
        self.reset(MINIMUM_CURVE_OUTPUT);
    }

    /// Set the highest output
    pub fn set_maximum_curve_output(&mut self, value: f64) -> Result<()> {
        self.set_double(MAXIMUM_CURVE_OUTPUT, value)
    }

    /// Remove the upper output bound
    pub fn reset_maximum_curve_output(&mut self) {
        self.reset(MAXIMUM_CURVE_OUTPUT);
    }
}
