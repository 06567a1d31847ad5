//! Derived cardiology indices.
//!
//! Every function takes raw measurement strings and returns a [`Metric`]:
//! either a fixed-precision decimal string or [`Metric::Absent`]. Missing,
//! unparseable, non-finite or zero-divisor inputs never produce a number.

use std::fmt;

use crate::model::{DiastolicFunction, ExamRecord};
use crate::values::present;

/// Printed in place of a derived value that cannot be computed.
pub const ABSENT: &str = "-";

/// Allometric exponent used to normalise LV diameter by body weight.
pub const NORMALIZATION_EXPONENT: f64 = 0.294;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Metric {
    Value(String),
    Absent,
}

impl Metric {
    fn from_number(value: f64, decimals: usize) -> Self {
        if value.is_finite() {
            Metric::Value(format!("{value:.decimals$}"))
        } else {
            Metric::Absent
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Metric::Absent)
    }

    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(ABSENT)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the leading decimal of a raw measurement, accepting `.` or `,` as
/// separator and ignoring a trailing unit ("4,0 cm" -> 4.0).
pub fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    let mut number = String::with_capacity(raw.len());
    let mut seen_separator = false;
    for (i, ch) in raw.chars().enumerate() {
        match ch {
            '0'..='9' => number.push(ch),
            '-' | '+' if i == 0 => number.push(ch),
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                number.push('.');
            }
            _ => break,
        }
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn operand(raw: Option<&str>) -> Option<f64> {
    parse_decimal(raw).filter(|v| *v != 0.0)
}

fn ratio(numerator: Option<&str>, denominator: Option<&str>) -> Metric {
    match (operand(numerator), operand(denominator)) {
        (Some(n), Some(d)) => Metric::from_number(n / d, 2),
        _ => Metric::Absent,
    }
}

/// FS% = (LVIDd - LVIDs) / LVIDd x 100, one decimal.
pub fn shortening_fraction(lvidd: Option<&str>, lvids: Option<&str>) -> Metric {
    match (operand(lvidd), operand(lvids)) {
        (Some(d), Some(s)) => Metric::from_number((d - s) / d * 100.0, 1),
        _ => Metric::Absent,
    }
}

/// Teicholz volume estimate, 7d^3 / (2.4 + d).
pub fn teicholz_volume(diameter: f64) -> Option<f64> {
    let divisor = 2.4 + diameter;
    if divisor == 0.0 {
        return None;
    }
    let volume = 7.0 * diameter.powi(3) / divisor;
    volume.is_finite().then_some(volume)
}

/// FE% (Teicholz) = (EDV - ESV) / EDV x 100, one decimal.
pub fn ejection_fraction_teicholz(lvidd: Option<&str>, lvids: Option<&str>) -> Metric {
    let (Some(d), Some(s)) = (operand(lvidd), operand(lvids)) else {
        return Metric::Absent;
    };
    match (teicholz_volume(d), teicholz_volume(s)) {
        (Some(edv), Some(esv)) if edv != 0.0 => Metric::from_number((edv - esv) / edv * 100.0, 1),
        _ => Metric::Absent,
    }
}

/// LVIDd / weight^0.294, two decimals. Weight must be positive.
pub fn normalized_diameter(lvidd: Option<&str>, weight_kg: Option<&str>) -> Metric {
    match (operand(lvidd), operand(weight_kg).filter(|w| *w > 0.0)) {
        (Some(d), Some(w)) => Metric::from_number(d / w.powf(NORMALIZATION_EXPONENT), 2),
        _ => Metric::Absent,
    }
}

pub fn e_to_a(e: Option<&str>, a: Option<&str>) -> Metric {
    ratio(e, a)
}

pub fn e_to_ivrt(e: Option<&str>, ivrt: Option<&str>) -> Metric {
    ratio(e, ivrt)
}

pub fn e_to_e_prime(e: Option<&str>, e_prime: Option<&str>) -> Metric {
    ratio(e, e_prime)
}

/// E over the mean of both e' sites; falls back to whichever site exists.
pub fn mean_e_to_e_prime(
    e: Option<&str>,
    e_prime_free: Option<&str>,
    e_prime_septal: Option<&str>,
) -> Metric {
    let Some(e) = operand(e) else {
        return Metric::Absent;
    };
    let mean = match (operand(e_prime_free), operand(e_prime_septal)) {
        (Some(free), Some(septal)) => (free + septal) / 2.0,
        (Some(site), None) | (None, Some(site)) => site,
        (None, None) => return Metric::Absent,
    };
    if mean == 0.0 {
        return Metric::Absent;
    }
    Metric::from_number(e / mean, 2)
}

/// AE/Ao = left atrium / aortic root.
pub fn atrium_to_aorta(left_atrium: Option<&str>, aortic_root: Option<&str>) -> Metric {
    ratio(left_atrium, aortic_root)
}

/// Every derived value of one exam, recomputed for each render.
#[derive(Clone, Debug)]
pub struct DerivedValues {
    pub shortening_fraction: Metric,
    pub ejection_fraction: Metric,
    pub normalized_diameter: Metric,
    pub atrium_to_aorta: Metric,
    pub e_to_a: Metric,
    pub e_to_ivrt: Metric,
    pub e_to_e_prime_free: Metric,
    pub e_to_e_prime_septal: Metric,
    pub mean_e_to_e_prime: Metric,
}

impl DerivedValues {
    pub fn compute(exam: &ExamRecord) -> Self {
        let lv = &exam.left_ventricle;
        let lvidd = present(&lv.diameter_diastole);
        let lvids = present(&lv.diameter_systole);
        let DiastolicFunction { e_wave, a_wave, ivrt, .. } = &exam.diastolic;
        let e = present(e_wave);
        let free = present(&exam.tdi_free_wall.e_prime);
        let septal = present(&exam.tdi_septal.e_prime);

        let shortening_fraction = manual_or(&lv.shortening_fraction, || {
            shortening_fraction(lvidd, lvids)
        });
        let ejection_fraction = manual_or(&lv.ejection_fraction, || {
            ejection_fraction_teicholz(lvidd, lvids)
        });

        Self {
            shortening_fraction,
            ejection_fraction,
            normalized_diameter: normalized_diameter(lvidd, present(&exam.patient.weight)),
            atrium_to_aorta: atrium_to_aorta(present(&lv.left_atrium), present(&lv.aortic_root)),
            e_to_a: e_to_a(e, present(a_wave)),
            e_to_ivrt: e_to_ivrt(e, present(ivrt)),
            e_to_e_prime_free: e_to_e_prime(e, free),
            e_to_e_prime_septal: e_to_e_prime(e, septal),
            mean_e_to_e_prime: mean_e_to_e_prime(e, free, septal),
        }
    }
}

/// A manually entered value replaces the computed one verbatim.
fn manual_or(manual: &Option<String>, compute: impl FnOnce() -> Metric) -> Metric {
    match present(manual) {
        Some(value) => Metric::Value(value.trim_end_matches('%').trim().to_string()),
        None => compute(),
    }
}
