//! Copyright © 2025 Peter Garfield Bower. All rights reserved.
//!
//! # **simdops** - *Hardware-adaptive elementwise kernels*
//!
//! Elementwise numeric operations over 64-byte aligned `f32`/`f64` tensors
//! (`exp`, `erf`, `tanh`, `sigmoid`, `softmax`, GELU, Swish and their
//! gradients), running on the fastest instruction set the host supports.
//!
//! ## Layers
//! - **Capabilities**: [`probe`] / [`capabilities`] report the usable
//!   [`InstructionSet`] tiers, computed once per process.
//! - **Backends**: one [`MathBackend`] per tier, all implementing the same
//!   operation set over flat buffers. Results agree across tiers within
//!   float tolerance.
//! - **Dispatcher**: picks the default tier and supports scoped,
//!   thread-local overrides via [`Dispatcher::with_forced_tier`].
//! - **Façade**: [`ElementwiseOps`] validates dtype, layout and shape and
//!   applies an operation in place or into a new tensor.
//!
//! ```
//! use simdops::{ElementwiseOps, NumericTensor, Tensor};
//!
//! let ops = ElementwiseOps::new();
//! let x: NumericTensor = Tensor::<f64>::arange(-3.0, 3.5, 0.5).into();
//! let y = ops.erf(&x).unwrap();
//! let v = y.as_f64().unwrap().as_slice();
//! assert!((v[8] - 0.8427).abs() < 1e-4);
//! ```

pub mod enums {
    pub mod dtype;
    pub mod error;
    pub mod instruction_set;
    pub mod unary_op;
    pub mod collections {
        pub mod numeric_tensor;
    }
}

pub mod structs {
    pub mod capabilities;
    pub mod config;
    pub mod dispatcher;
    pub mod elementwise_ops;
    pub mod tensor;
}

pub mod traits {
    pub mod backend;
    pub mod type_unions;
}

pub mod kernels {
    pub(crate) mod approx;
    pub mod backends;
    pub(crate) mod lanes;
}

pub use enums::collections::numeric_tensor::NumericTensor;
pub use enums::dtype::DType;
pub use enums::error::{KernelError, KernelResult};
pub use enums::instruction_set::InstructionSet;
pub use enums::unary_op::UnaryOp;

pub use kernels::backends::backend_for;

pub use structs::capabilities::{CapabilityReport, capabilities, probe};
pub use structs::config::{DispatchConfig, FallbackPolicy};
pub use structs::dispatcher::{
    Dispatcher, OverrideGuard, active_instruction_set, override_depth,
};
pub use structs::elementwise_ops::{Applied, CpuFeatureScope, ElementwiseOps};
pub use structs::tensor::Tensor;

pub use traits::backend::MathBackend;
pub use traits::type_unions::{Float, Numeric};

pub use vec64::Vec64;
