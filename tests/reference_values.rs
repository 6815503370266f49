//! Known values on every usable tier, plus the error contract.

mod common;

use common::*;
use simdops::{
    CapabilityReport, DType, DispatchConfig, Dispatcher, ElementwiseOps, FallbackPolicy,
    InstructionSet, KernelError, NumericTensor, Tensor, UnaryOp,
};

const ERF_AT_HALF_STEPS: [f64; 13] = [
    -1.0, -0.9996, -0.9953, -0.9661, -0.8427, -0.5205, 0.0, 0.5205, 0.8427, 0.9661, 0.9953, 0.9996,
    1.0,
];

// d/dx GELU over -3..=3 in steps of 0.5, as produced by autograd.
const GELU_GRAD_AT_HALF_STEPS: [f64; 13] = [
    -0.0119, -0.0376, -0.0852, -0.1275, -0.0833, 0.1325, 0.5000, 0.8675, 1.0833, 1.1275, 1.0852,
    1.0376, 1.0119,
];

#[test]
fn test_erf_reference_on_every_tier() {
    let x: NumericTensor = Tensor::<f32>::arange(-3.0, 3.5, 0.5).into();
    assert_eq!(x.len(), 13);
    for isa in ElementwiseOps::instruction_sets() {
        let y = run_on(isa, UnaryOp::Erf, &x);
        assert_all_close(&values(&y), &ERF_AT_HALF_STEPS, 1e-4, &format!("erf on {isa}"));
    }
}

#[test]
fn test_exp_arange_inplace_and_copy() {
    for isa in ElementwiseOps::instruction_sets() {
        let scope = ElementwiseOps::with_cpu_feature(isa).unwrap();

        let x32: NumericTensor = Tensor::<f32>::arange(-10.0, 10.0, 0.5).into();
        let x64: NumericTensor = Tensor::<f64>::arange(-10.0, 10.0, 0.5).into();
        for x in [x32, x64] {
            let want: Vec<f64> = values(&x).iter().map(|v| v.exp()).collect();

            let copied = scope.exp(&x).unwrap();
            assert_all_close(&values(&copied), &want, 1e-4, &format!("exp copy on {isa}"));

            let mut inplace = x.clone();
            scope.exp_inplace(&mut inplace).unwrap();
            assert_all_close(&values(&inplace), &want, 1e-4, &format!("exp inplace on {isa}"));
            assert_eq!(copied, inplace);
        }
    }
}

#[test]
fn test_gelu_backward_matches_autograd() {
    for isa in ElementwiseOps::instruction_sets() {
        for x in [
            NumericTensor::from(Tensor::<f32>::arange(-3.0, 3.5, 0.5)),
            NumericTensor::from(Tensor::<f64>::arange(-3.0, 3.5, 0.5)),
        ] {
            let y = run_on(isa, UnaryOp::GeluBackward, &x);
            assert_all_close(
                &values(&y),
                &GELU_GRAD_AT_HALF_STEPS,
                1e-4,
                &format!("gelu_backward on {isa} ({})", x.dtype()),
            );
        }
    }
}

#[test]
fn test_closed_forms() {
    let xs = [-4.0, -1.5, -0.25, 0.0, 0.75, 2.0, 5.0];
    let x = f64_tensor(&xs);
    let ops = ElementwiseOps::new();

    let sigmoid: Vec<f64> = xs.iter().map(|v: &f64| 1.0 / (1.0 + (-v).exp())).collect();
    assert_all_close(&values(&ops.sigmoid(&x).unwrap()), &sigmoid, 1e-9, "sigmoid");

    let swish: Vec<f64> = xs.iter().zip(&sigmoid).map(|(v, s)| v * s).collect();
    assert_all_close(&values(&ops.swish(&x).unwrap()), &swish, 1e-9, "swish");

    let swish_grad: Vec<f64> = xs
        .iter()
        .zip(&sigmoid)
        .map(|(v, s)| s + v * s * (1.0 - s))
        .collect();
    assert_all_close(
        &values(&ops.swish_backward(&x).unwrap()),
        &swish_grad,
        1e-9,
        "swish_backward",
    );

    let tanh: Vec<f64> = xs.iter().map(|v| v.tanh()).collect();
    assert_all_close(&values(&ops.tanh(&x).unwrap()), &tanh, 1e-9, "tanh");

    let pdf: Vec<f64> = xs
        .iter()
        .map(|v| (-0.5 * v * v).exp() / (2.0 * std::f64::consts::PI).sqrt())
        .collect();
    assert_all_close(&values(&ops.normal_pdf(&x).unwrap()), &pdf, 1e-9, "normal_pdf");

    let cdf = values(&ops.normal_cdf(&x).unwrap());
    let gelu = values(&ops.gelu(&x).unwrap());
    for ((v, c), g) in xs.iter().zip(&cdf).zip(&gelu) {
        assert!(close(*g, v * c, 1e-9), "gelu({v})");
    }
    assert!(close(cdf[3], 0.5, 1e-9));
}

#[test]
fn test_ieee_special_values() {
    let xs = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY];
    let x = f32_tensor(&xs);
    for isa in ElementwiseOps::instruction_sets() {
        let exp = values(&run_on(isa, UnaryOp::Exp, &x));
        assert!(exp[0].is_nan());
        assert_eq!(exp[1], f64::INFINITY);
        assert_eq!(exp[2], 0.0);

        for op in [UnaryOp::Tanh, UnaryOp::Erf] {
            let y = values(&run_on(isa, op, &x));
            assert!(y[0].is_nan(), "{op} on {isa}");
            assert_eq!(y[1], 1.0, "{op} on {isa}");
            assert_eq!(y[2], -1.0, "{op} on {isa}");
        }

        let sigmoid = values(&run_on(isa, UnaryOp::Sigmoid, &x));
        assert!(sigmoid[0].is_nan());
        assert_eq!(&sigmoid[1..], &[1.0, 0.0]);

        let gelu = values(&run_on(isa, UnaryOp::Gelu, &x));
        assert!(gelu[0].is_nan());
        assert_eq!(&gelu[1..], &[f64::INFINITY, 0.0]);

        for op in UnaryOp::ALL {
            assert!(values(&run_on(isa, op, &x))[0].is_nan(), "{op} on {isa}");
        }
    }
}

#[test]
fn test_softmax_nan_row_stays_isolated() {
    let x: NumericTensor = Tensor::<f32>::from_vec(vec![1.0, f32::NAN, 0.0, 0.0], &[2, 2])
        .unwrap()
        .into();
    for isa in ElementwiseOps::instruction_sets() {
        let y = ElementwiseOps::scoped(isa, |ops| ops.softmax(&x)).unwrap().unwrap();
        let v = values(&y);
        assert!(v[0].is_nan() && v[1].is_nan(), "{isa}");
        assert_eq!(&v[2..], &[0.5, 0.5], "{isa}");
    }
}

#[test]
fn test_softmax_on_last_axis_of_3d() {
    let data: Vec<f64> = (0..24).map(|i| i as f64).collect();
    let x: NumericTensor = Tensor::from_vec(data, &[2, 3, 4]).unwrap().into();
    let y = ElementwiseOps::new().softmax(&x).unwrap();
    assert_eq!(y.shape(), &[2, 3, 4]);
    let v = values(&y);
    // every row is a shift of 0..4, so every row is identical
    for row in v.chunks(4) {
        assert_all_close(row, &v[..4], 1e-12, "row");
        assert!(close(row.iter().sum::<f64>(), 1.0, 1e-12));
    }
}

#[test]
fn test_error_contract() {
    let ops = ElementwiseOps::new();

    for dtype_tensor in [
        NumericTensor::from(Tensor::<i32>::from_slice(&[1, 2])),
        NumericTensor::from(Tensor::<i64>::from_slice(&[1, 2])),
    ] {
        for op in UnaryOp::ALL {
            let err = ops.apply_copied(op, &dtype_tensor).unwrap_err();
            assert!(matches!(err, KernelError::UnsupportedDtype { .. }), "{op}");
        }
        assert!(matches!(
            ops.softmax(&dtype_tensor).unwrap_err(),
            KernelError::UnsupportedDtype { .. }
        ));
    }

    let strided: NumericTensor = Tensor::<f32>::from_vec(vec![0.0; 6], &[3, 2])
        .unwrap()
        .transposed()
        .unwrap()
        .into();
    for op in UnaryOp::ALL {
        assert!(matches!(
            ops.apply_copied(op, &strided).unwrap_err(),
            KernelError::NonContiguousBuffer { .. }
        ));
    }
    assert!(matches!(
        ops.softmax(&strided).unwrap_err(),
        KernelError::NonContiguousBuffer { .. }
    ));

    let scalar: NumericTensor = Tensor::scalar(0.0f64).into();
    assert!(matches!(
        ops.softmax(&scalar).unwrap_err(),
        KernelError::InvalidShape { .. }
    ));
    let mut scalar = scalar;
    assert!(ops.softmax_with(&mut scalar, true).is_err());
    assert_eq!(scalar.dtype(), DType::Float64);
}

#[test]
fn test_unknown_tier_name_is_rejected() {
    let err = "avx2".parse::<InstructionSet>().unwrap_err();
    assert!(err.to_string().contains("avx2"));
}

#[test]
fn test_strict_policy_refuses_unusable_tier() {
    let strict = Dispatcher::with_capabilities(
        DispatchConfig::new().with_fallback(FallbackPolicy::Strict),
        CapabilityReport::scalar_only(),
    );
    for isa in InstructionSet::ALL {
        let result = strict.with_forced_tier(isa);
        if isa == InstructionSet::Scalar {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                result.unwrap_err(),
                KernelError::UnsupportedInstructionSetRequested { .. }
            ));
        }
    }
}
