//! Darcy friction-factor correlations for turbulent pipe flow.
//!
//! Each correlation is valid only inside its own (Re, e/D) envelope. They
//! are kept in an ordered table and all evaluated; an entry outside its
//! envelope, or one whose formula leaves the real domain, yields exactly 0.
//!
//! | # | name          | envelope                 |
//! |---|---------------|--------------------------|
//! | 1 | Moody 1947    | Re > 4000, e/D < 0.01    |
//! | 2 | Swamee-Jain   | Re > 5000, e/D < 0.05    |
//! | 3 | Chen 1979     | Re > 4000                |
//! | 4 | Manadilli     | Re > 4000, e/D < 0.05    |
//! | 5 | Cheng 2008    | Re > 4000, e/D < 0.05    |

/// One friction-factor correlation and its validity envelope.
#[derive(Clone, Copy)]
pub struct Correlation {
    /// Key used for recorded quantities (`<key>_f`, `<key>_dp`).
    pub key: &'static str,
    pub label: &'static str,
    applies: fn(f64, f64) -> bool,
    formula: fn(f64, f64) -> f64,
}

impl std::fmt::Debug for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Correlation").field("key", &self.key).finish()
    }
}

impl Correlation {
    /// Friction factor at Reynolds number `re` and relative roughness `rel`
    /// (e/D); 0 outside the envelope.
    pub fn factor(&self, re: f64, rel: f64) -> f64 {
        if !re.is_finite() || !rel.is_finite() || rel < 0.0 || !(self.applies)(re, rel) {
            return 0.0;
        }
        let f = (self.formula)(re, rel);
        if f.is_finite() && f > 0.0 { f } else { 0.0 }
    }
}

fn moody(re: f64, rel: f64) -> f64 {
    0.0055 * (1.0 + (2.0e4 * rel + 1.0e6 / re).cbrt())
}

fn swamee_jain(re: f64, rel: f64) -> f64 {
    0.25 / (rel / 3.7 + 5.74 / re.powf(0.9)).log10().powi(2)
}

fn chen(re: f64, rel: f64) -> f64 {
    let inner = rel.powf(1.1098) / 2.8257 + 5.8506 / re.powf(0.8981);
    let inv_sqrt_f = -2.0 * (rel / 3.7065 - 5.0452 / re * inner.log10()).log10();
    (1.0 / inv_sqrt_f).powi(2)
}

fn manadilli(re: f64, rel: f64) -> f64 {
    let inv_sqrt_f = -2.0 * (rel / 3.7 + 95.0 / re.powf(0.983) - 96.82 / re).log10();
    (1.0 / inv_sqrt_f).powi(2)
}

fn cheng(re: f64, rel: f64) -> f64 {
    let a = 1.0 / (1.0 + (re / 2720.0).powi(9));
    let b = 1.0 / (1.0 + (re * rel / 160.0).powi(2));
    let inv_f = (re / 64.0).powf(a)
        * (1.8 * (re / 6.8).log10()).powf(2.0 * (1.0 - a) * b)
        * (2.0 * (3.7 / rel).log10()).powf(2.0 * (1.0 - a) * (1.0 - b));
    1.0 / inv_f
}

/// Correlations in evaluation order.
pub const CORRELATIONS: [Correlation; 5] = [
    Correlation {
        key: "moody",
        label: "Moody",
        applies: |re, rel| re > 4000.0 && rel < 0.01,
        formula: moody,
    },
    Correlation {
        key: "swamee_jain",
        label: "Swamee-Jain",
        applies: |re, rel| re > 5000.0 && rel < 0.05,
        formula: swamee_jain,
    },
    Correlation {
        key: "chen",
        label: "Chen",
        applies: |re, _| re > 4000.0,
        formula: chen,
    },
    Correlation {
        key: "manadilli",
        label: "Manadilli",
        applies: |re, rel| re > 4000.0 && rel < 0.05,
        formula: manadilli,
    },
    Correlation {
        key: "cheng",
        label: "Cheng",
        applies: |re, rel| re > 4000.0 && rel < 0.05,
        formula: cheng,
    },
];

/// Friction factors of every correlation, in table order.
pub fn friction_factors(re: f64, rel: f64) -> [(&'static str, f64); 5] {
    CORRELATIONS.map(|c| (c.key, c.factor(re, rel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REL: f64 = 0.061e-3 / 0.2;

    #[test]
    fn all_agree_in_fully_turbulent_flow() {
        let factors = friction_factors(1.0e6, REL);
        for (key, f) in factors {
            assert!(f > 0.01 && f < 0.03, "{key}: f = {f}");
        }
        let max = factors.iter().map(|(_, f)| *f).fold(f64::MIN, f64::max);
        let min = factors.iter().map(|(_, f)| *f).fold(f64::MAX, f64::min);
        assert!((max - min) / min < 0.2, "spread {min}..{max}");
    }

    #[test]
    fn laminar_flow_yields_zero() {
        for (key, f) in friction_factors(2000.0, REL) {
            assert_eq!(f, 0.0, "{key}");
        }
    }

    #[test]
    fn swamee_jain_starts_later() {
        let factors = friction_factors(4500.0, REL);
        assert!(factors[0].1 > 0.0);
        assert_eq!(factors[1], ("swamee_jain", 0.0));
    }

    #[test]
    fn rough_pipes_drop_out_of_envelope() {
        let factors = friction_factors(1.0e5, 0.02);
        assert_eq!(factors[0].1, 0.0, "moody needs e/D < 0.01");
        assert!(factors[1].1 > 0.0);

        let very_rough = friction_factors(1.0e5, 0.2);
        assert!(very_rough[2].1 > 0.0, "chen has no roughness bound");
        assert_eq!(very_rough[3].1, 0.0);
        assert_eq!(very_rough[4].1, 0.0);
    }

    #[test]
    fn non_finite_inputs_yield_zero() {
        for (_, f) in friction_factors(f64::NAN, REL) {
            assert_eq!(f, 0.0);
        }
        for (_, f) in friction_factors(1.0e5, f64::INFINITY) {
            assert_eq!(f, 0.0);
        }
    }

    proptest! {
        #[test]
        fn below_threshold_is_exactly_zero(re in 0.0f64..=4000.0, rel in 0.0f64..0.1) {
            for (_, f) in friction_factors(re, rel) {
                prop_assert_eq!(f, 0.0);
            }
        }

        #[test]
        fn results_are_finite(re in 0.0f64..1.0e8, rel in 0.0f64..0.1) {
            for (_, f) in friction_factors(re, rel) {
                prop_assert!(f.is_finite() && f >= 0.0);
            }
        }
    }
}
