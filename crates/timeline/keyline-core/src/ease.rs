#![allow(dead_code)]
//! Interpolation dispatch and the built-in easing curves.
//!
//! A curve maps `(from, to, t)` straight to an output value; the registry
//! resolves curves by their authoring name at advancement time so keyframes
//! can carry `"ease": "powerTwoOut"` as plain data.

use std::collections::HashMap;

/// Easing curve: `(from, to, t) -> value`, with `t` in `[0, 1]`.
pub type EaseFn = fn(f64, f64, f64) -> f64;

/// Linear interpolation of scalars. The default when a keyframe names no
/// curve.
#[inline]
pub fn linear(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Quadratic ease-in: change accelerates from a standstill.
#[inline]
pub fn power_two_in(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t * t
}

/// Quadratic ease-out: change decelerates into the target.
#[inline]
pub fn power_two_out(from: f64, to: f64, t: f64) -> f64 {
    let inv = 1.0 - t;
    from + (to - from) * (1.0 - inv * inv)
}

/// Name-keyed curve registry implementing the interpolation contract
/// `(from, to, t, ease?, key?) -> value`.
///
/// `linear`, `powerTwoIn`, and `powerTwoOut` come pre-registered; hosts add
/// their own via [`Interpolator::register`]. An unknown curve name logs a
/// warning and falls back to linear, keeping a typo from freezing the
/// animation.
#[derive(Clone, Debug)]
pub struct Interpolator {
    curves: HashMap<String, EaseFn>,
}

impl Interpolator {
    pub fn new() -> Self {
        let mut curves: HashMap<String, EaseFn> = HashMap::new();
        curves.insert("linear".into(), linear);
        curves.insert("powerTwoIn".into(), power_two_in);
        curves.insert("powerTwoOut".into(), power_two_out);
        Self { curves }
    }

    /// Register (or replace) a curve under an authoring name.
    pub fn register(&mut self, name: impl Into<String>, curve: EaseFn) {
        self.curves.insert(name.into(), curve);
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Interpolate `from` → `to` at fraction `t` through the named curve.
    ///
    /// `key` identifies the sub-property being interpolated when the
    /// keyframe value is a field map; built-in curves ignore it, but it is
    /// part of the dispatch contract and is logged with fallback warnings.
    pub fn value(&self, from: f64, to: f64, t: f64, ease: Option<&str>, key: Option<&str>) -> f64 {
        match ease {
            None => linear(from, to, t),
            Some(name) => match self.curves.get(name) {
                Some(curve) => curve(from, to, t),
                None => {
                    log::warn!(
                        "unknown ease '{}'{}; falling back to linear",
                        name,
                        key.map(|k| format!(" (key '{k}')")).unwrap_or_default()
                    );
                    linear(from, to, t)
                }
            },
        }
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}
