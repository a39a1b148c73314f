//! Oracle claims: supervision of the form "the true distance between these
//! two collections lies in `[lo, hi]`".

use bagdist_core::{Bag, Error, Result};
use serde::{Deserialize, Serialize};

/// A closed interval `[lo, hi]` of acceptable values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(Error::InvalidInterval { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// The degenerate interval `[value, value]`
    pub fn exact(value: f64) -> Result<Self> {
        Self::new(value, value)
    }

    #[inline]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Point of the interval closest to `value`
    pub fn closest(&self, value: f64) -> f64 {
        value.clamp(self.lo, self.hi)
    }
}

impl TryFrom<(f64, f64)> for Interval {
    type Error = Error;

    fn try_from((lo, hi): (f64, f64)) -> Result<Self> {
        Self::new(lo, hi)
    }
}

impl From<Interval> for (f64, f64) {
    fn from(interval: Interval) -> Self {
        (interval.lo, interval.hi)
    }
}

/// Two bag collections and the interval their distance should fall in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleClaim<B: Bag> {
    pub first: Vec<B>,
    pub second: Vec<B>,
    pub interval: Interval,
}

impl<B: Bag> OracleClaim<B> {
    pub fn new<I, J>(first: I, second: J, interval: Interval) -> Self
    where
        I: IntoIterator<Item = B>,
        J: IntoIterator<Item = B>,
    {
        Self {
            first: first.into_iter().collect(),
            second: second.into_iter().collect(),
            interval,
        }
    }
}
