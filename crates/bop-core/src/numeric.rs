use crate::BopError;

/// Floating point type used throughout system
pub type Real = f64;

/// Time tolerance for port handshakes and history lookups [s].
pub const TIME_TOLERANCE: Real = 1e-6;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, BopError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(BopError::NonFinite { what, value: v })
    }
}

/// Fail unless `v` lies in the closed interval `[min, max]`.
pub fn ensure_within(v: Real, min: Real, max: Real, what: &'static str) -> Result<Real, BopError> {
    ensure_finite(v, what)?;
    if v < min || v > max {
        return Err(BopError::OutOfRange {
            what,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

/// Weighted root-mean-square norm used for error control: each component is
/// scaled by `atol + rtol * max(|a_i|, |b_i|)`.
pub fn weighted_rms(err: &[Real], a: &[Real], b: &[Real], rtol: Real, atol: Real) -> Real {
    if err.is_empty() {
        return 0.0;
    }
    let sum: Real = err
        .iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(e, (x, y))| {
            let scale = atol + rtol * x.abs().max(y.abs());
            (e / scale).powi(2)
        })
        .sum();
    (sum / err.len() as Real).sqrt()
}
