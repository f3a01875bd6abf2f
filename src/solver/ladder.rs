use crate::error::{SolverError, SolverResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// How interior ladder points are interpolated between `T_min` and `T_max`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LadderMode {
    LinearTemperature,
    LinearBeta,
    ExponentialTemperature,
}

impl LadderMode {
    /// Numeric codes used by legacy parameter files: 0, 1, 2.
    pub fn from_code(code: i64) -> SolverResult<Self> {
        match code {
            0 => Ok(Self::LinearTemperature),
            1 => Ok(Self::LinearBeta),
            2 => Ok(Self::ExponentialTemperature),
            other => Err(SolverError::Config(format!(
                "Requested ladder init mode {} does not exist",
                other
            ))),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::LinearTemperature => 0,
            Self::LinearBeta => 1,
            Self::ExponentialTemperature => 2,
        }
    }
}

/// Accepts either the kebab-case mode name or its numeric code, so older
/// parameter files with `"ladder_mode": 2` keep loading.
pub fn deserialize_mode<'de, D>(deserializer: D) -> Result<LadderMode, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Code(i64),
        Name(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Code(code) => LadderMode::from_code(code).map_err(serde::de::Error::custom),
        Repr::Name(name) => LadderMode::from_str(&name).map_err(|_| {
            serde::de::Error::custom(format!("Unknown ladder mode '{}'", name))
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ladder {
    pub temperatures: Vec<f64>,
    pub betas: Vec<f64>,
}

pub fn check_bounds(t_min: f64, t_max: f64) -> SolverResult<()> {
    if !(t_min.is_finite() && t_max.is_finite()) {
        return Err(SolverError::Config(format!(
            "Ladder bounds must be finite (t_min={}, t_max={})",
            t_min, t_max
        )));
    }
    if t_min <= 0.0 {
        return Err(SolverError::Config(format!(
            "t_min must be positive, got {}",
            t_min
        )));
    }
    if t_min >= t_max {
        return Err(SolverError::Config(format!(
            "t_min ({}) must be smaller than t_max ({})",
            t_min, t_max
        )));
    }
    Ok(())
}

/// Temperatures increase from `t_min` to `t_max`; betas are their inverses.
/// Both endpoints are assigned exactly. A one-slot ladder is `[t_min]`.
pub fn build_ladder(size: usize, t_min: f64, t_max: f64, mode: LadderMode) -> SolverResult<Ladder> {
    check_bounds(t_min, t_max)?;
    if size == 0 {
        return Err(SolverError::Config(
            "Ladder needs at least one slot".to_string(),
        ));
    }
    if size == 1 {
        return Ok(Ladder {
            temperatures: vec![t_min],
            betas: vec![1.0 / t_min],
        });
    }

    let last = size - 1;
    let steps = last as f64;
    let mut temperatures = vec![0.0; size];
    let mut betas = vec![0.0; size];

    match mode {
        LadderMode::LinearTemperature => {
            let t_step = (t_max - t_min) / steps;
            for (i, t) in temperatures.iter_mut().enumerate() {
                *t = t_min + t_step * i as f64;
            }
            temperatures[last] = t_max;
            for (b, &t) in betas.iter_mut().zip(&temperatures) {
                *b = 1.0 / t;
            }
        }
        LadderMode::LinearBeta => {
            let beta_hot = 1.0 / t_max;
            let beta_cold = 1.0 / t_min;
            let beta_step = (beta_cold - beta_hot) / steps;
            for (i, b) in betas.iter_mut().enumerate() {
                *b = beta_cold - beta_step * i as f64;
            }
            betas[last] = beta_hot;
            for (t, &b) in temperatures.iter_mut().zip(&betas) {
                *t = 1.0 / b;
            }
        }
        LadderMode::ExponentialTemperature => {
            let ratio = (t_max / t_min).powf(1.0 / steps);
            for (i, t) in temperatures.iter_mut().enumerate() {
                *t = t_min * ratio.powi(i as i32);
            }
            temperatures[last] = t_max;
            for (b, &t) in betas.iter_mut().zip(&temperatures) {
                *b = 1.0 / t;
            }
        }
    }

    temperatures[0] = t_min;
    betas[0] = 1.0 / t_min;
    temperatures[last] = t_max;
    betas[last] = 1.0 / t_max;

    if let Some(slot) = temperatures.windows(2).position(|w| w[0] >= w[1]) {
        return Err(SolverError::Config(format!(
            "Temperature range [{}, {}] is too narrow for {} slots: slots {} and {} collapse",
            t_min,
            t_max,
            size,
            slot,
            slot + 1
        )));
    }

    Ok(Ladder {
        temperatures,
        betas,
    })
}
