//! # UnaryOp Enum Module
//!
//! The elementwise operation set every backend implements.

use std::fmt::{Display, Formatter};

/// Elementwise operation selector passed through the backend interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `e^x`
    Exp,
    /// Gauss error function.
    Erf,
    /// Hyperbolic tangent.
    Tanh,
    /// Logistic function `1 / (1 + e^-x)`.
    Sigmoid,
    /// `x·Φ(x)`
    Gelu,
    /// `Φ(x) + x·φ(x)`
    GeluBackward,
    /// `x·σ(x)`
    Swish,
    /// `σ(x) + x·σ(x)·(1 - σ(x))`
    SwishBackward,
    /// Standard normal CDF `Φ(x)`.
    NormalCdf,
    /// Standard normal PDF `φ(x)`.
    NormalPdf,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 10] = [
        UnaryOp::Exp,
        UnaryOp::Erf,
        UnaryOp::Tanh,
        UnaryOp::Sigmoid,
        UnaryOp::Gelu,
        UnaryOp::GeluBackward,
        UnaryOp::Swish,
        UnaryOp::SwishBackward,
        UnaryOp::NormalCdf,
        UnaryOp::NormalPdf,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            UnaryOp::Exp => "exp",
            UnaryOp::Erf => "erf",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Sigmoid => "sigmoid",
            UnaryOp::Gelu => "gelu",
            UnaryOp::GeluBackward => "gelu_backward",
            UnaryOp::Swish => "swish",
            UnaryOp::SwishBackward => "swish_backward",
            UnaryOp::NormalCdf => "normal_cdf",
            UnaryOp::NormalPdf => "normal_pdf",
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
