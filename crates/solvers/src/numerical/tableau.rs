use nalgebra::DVector;
use tether_core::{Equations, Instant};

use super::{Error, Sample, StepperType, evaluate};

/// Butcher tableau of an explicit Runge-Kutta scheme.
///
/// Row `i` of `a` holds the `i` coefficients of stage `i`. `error` holds the
/// difference between the propagating weights and the embedded lower-order
/// weights, so `h·Σ errorᵢ·kᵢ` estimates the local error.
pub(super) struct Tableau {
    c: &'static [f64],
    a: &'static [&'static [f64]],
    b: &'static [f64],
    error: Option<&'static [f64]>,
    /// `1 / (q + 1)` for an embedded estimate of order `q`.
    pub(super) error_exponent: f64,
    /// The last stage is the derivative at the end of the step.
    fsal: bool,
}

/// The outcome of one trial step.
pub(super) struct Attempt {
    pub(super) x: DVector<f64>,
    pub(super) error: Option<DVector<f64>>,
    pub(super) end_derivative: Option<DVector<f64>>,
}

static RK4: Tableau = Tableau {
    c: &[0.0, 0.5, 0.5, 1.0],
    a: &[&[], &[0.5], &[0.0, 0.5], &[0.0, 0.0, 1.0]],
    b: &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
    error: None,
    error_exponent: 0.25,
    fsal: false,
};

const CASH_KARP_B: [f64; 6] = [
    37.0 / 378.0,
    0.0,
    250.0 / 621.0,
    125.0 / 594.0,
    0.0,
    512.0 / 1771.0,
];

const CASH_KARP_ERROR: [f64; 6] = [
    CASH_KARP_B[0] - 2825.0 / 27648.0,
    0.0,
    CASH_KARP_B[2] - 18575.0 / 48384.0,
    CASH_KARP_B[3] - 13525.0 / 55296.0,
    -277.0 / 14336.0,
    CASH_KARP_B[5] - 0.25,
];

static CASH_KARP: Tableau = Tableau {
    c: &[0.0, 0.2, 0.3, 0.6, 1.0, 0.875],
    a: &[
        &[],
        &[0.2],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[0.3, -0.9, 1.2],
        &[-11.0 / 54.0, 2.5, -70.0 / 27.0, 35.0 / 27.0],
        &[
            1631.0 / 55296.0,
            175.0 / 512.0,
            575.0 / 13824.0,
            44275.0 / 110_592.0,
            253.0 / 4096.0,
        ],
    ],
    b: &CASH_KARP_B,
    error: Some(&CASH_KARP_ERROR),
    error_exponent: 0.2,
    fsal: false,
};

const DOPRI5_B: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];

const DOPRI5_ERROR: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339_200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

static DOPRI5: Tableau = Tableau {
    c: &[0.0, 0.2, 0.3, 0.8, 8.0 / 9.0, 1.0, 1.0],
    a: &[
        &[],
        &[0.2],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[
            19372.0 / 6561.0,
            -25360.0 / 2187.0,
            64448.0 / 6561.0,
            -212.0 / 729.0,
        ],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
        &[
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ],
    b: &DOPRI5_B,
    error: Some(&DOPRI5_ERROR),
    error_exponent: 0.2,
    fsal: true,
};

impl StepperType {
    pub(super) fn tableau(self) -> &'static Tableau {
        match self {
            Self::RungeKutta4 => &RK4,
            Self::RungeKuttaCashKarp54 => &CASH_KARP,
            Self::RungeKuttaDopri5 => &DOPRI5,
        }
    }
}

impl Tableau {
    /// Takes one trial step of size `h` from `sample`.
    ///
    /// The first stage reuses the derivative stored in the sample.
    pub(super) fn step<E: Equations>(
        &self,
        equations: &E,
        origin: Instant,
        sample: &Sample,
        h: f64,
    ) -> Result<Attempt, Error> {
        let mut stages: Vec<DVector<f64>> = Vec::with_capacity(self.c.len());
        stages.push(sample.dx.clone());

        for (c, row) in self.c.iter().zip(self.a).skip(1) {
            let x = combine(&sample.x, h, row, &stages);
            stages.push(evaluate(equations, origin, sample.t + c * h, &x)?);
        }

        let x = combine(&sample.x, h, self.b, &stages);
        let error = self
            .error
            .map(|weights| combine(&DVector::zeros(sample.x.len()), h, weights, &stages));
        let end_derivative = if self.fsal { stages.pop() } else { None };

        Ok(Attempt {
            x,
            error,
            end_derivative,
        })
    }
}

/// `base + h·Σ weightsᵢ·stagesᵢ`, skipping zero weights.
fn combine(
    base: &DVector<f64>,
    h: f64,
    weights: &[f64],
    stages: &[DVector<f64>],
) -> DVector<f64> {
    let mut x = base.clone();
    for (weight, stage) in weights.iter().zip(stages) {
        if *weight != 0.0 {
            x.axpy(h * weight, stage, 1.0);
        }
    }
    x
}
