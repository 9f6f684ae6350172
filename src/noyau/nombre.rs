// src/noyau/nombre.rs
//
// Valeur numérique exacte + affichage arrondi
// -------------------------------------------
// - NumericValue : rationnel exact (BigRational), aucune perte en cours de calcul
// - Precision    : chiffres de travail / garde / affichage + plage d’exposant
// - Affichage    : arrondi au pair (half-even) sur N chiffres significatifs,
//                  appliqué SEULEMENT à l’affichage

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use super::erreur::EngineError;

/// Chiffres affichés par défaut (minimum garanti).
pub const DISPLAY_DIGITS_MIN: usize = 28;

/// Garde-fou : borne haute des chiffres affichés.
const DISPLAY_DIGITS_MAX: usize = 200;

/// log10(2), pour estimer un exposant décimal à partir d’un nombre de bits.
const LOG10_2: f64 = std::f64::consts::LOG10_2;

/* ------------------------ Précision ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    /// Décimales conservées pour les résultats transcendants.
    pub working_digits: usize,
    /// Décimales supplémentaires pendant les séries.
    pub guard_digits: usize,
    /// Chiffres significatifs à l’affichage.
    pub display_digits: usize,
    /// Exposant décimal maximal représentable.
    pub max_exponent: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            working_digits: 50,
            guard_digits: 15,
            display_digits: DISPLAY_DIGITS_MIN,
            max_exponent: 9999,
        }
    }
}

impl Precision {
    /// Borne chaque champ dans sa plage utile (anti-abus / anti-gel).
    pub fn clamped(self) -> Self {
        let display_digits = self.display_digits.clamp(DISPLAY_DIGITS_MIN, DISPLAY_DIGITS_MAX);
        Self {
            working_digits: self
                .working_digits
                .clamp(display_digits + 4, DISPLAY_DIGITS_MAX * 5),
            guard_digits: self.guard_digits.clamp(5, 100),
            display_digits,
            max_exponent: self.max_exponent.clamp(100, 100_000),
        }
    }

    /// Décimales utilisées pendant les séries (travail + garde).
    pub fn places_calcul(&self) -> usize {
        self.working_digits + self.guard_digits
    }
}

/* ------------------------ Helpers entiers ------------------------ */

pub(crate) fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// n / d arrondi au pair (d > 0).
pub(crate) fn div_arrondi_pair(n: &BigInt, d: &BigInt) -> BigInt {
    let neg = n.is_negative();
    let a = n.abs();
    let mut q = &a / d;
    let r = &a % d;

    let double = r * 2u32;
    let impair = (&q % 2u32).is_one();
    match double.cmp(d) {
        Ordering::Greater => q += 1u32,
        Ordering::Equal if impair => q += 1u32,
        _ => {}
    }

    if neg {
        -q
    } else {
        q
    }
}

/// Compare a/d à 10^e (a > 0, d > 0).
fn compare_pow10(a: &BigInt, d: &BigInt, e: i64) -> Ordering {
    if e >= 0 {
        a.cmp(&(d * pow10(e as usize)))
    } else {
        (a * pow10((-e) as usize)).cmp(d)
    }
}

/// Estimation de log10(|x|) à ~1e-15 près, sans conversion complète.
pub(crate) fn log10_estime(x: &BigInt) -> f64 {
    let bits = x.bits();
    if bits <= 53 {
        // petit entier : conversion directe exacte
        return x.abs().to_f64().unwrap_or(0.0).log10();
    }
    let shift = bits - 53;
    let top: BigInt = x.abs() >> shift;
    top.to_f64().unwrap_or(1.0).log10() + shift as f64 * LOG10_2
}

/* ------------------------ NumericValue ------------------------ */

/// Valeur exacte. Les approximations (π, e, séries) sont elles-mêmes
/// des rationnels, arrondis une seule fois à la précision de travail.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericValue(BigRational);

impl NumericValue {
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn from_integer(n: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn from_rational(r: BigRational) -> Self {
        Self(r)
    }

    pub fn as_rational(&self) -> &BigRational {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Exposant décimal : 10^e <= |x| < 10^(e+1). None pour zéro.
    pub fn decimal_exponent(&self) -> Option<i64> {
        if self.0.is_zero() {
            return None;
        }
        let a = self.0.numer().abs();
        let d = self.0.denom();

        let diff_bits = a.bits() as i64 - d.bits() as i64;
        let mut e = (diff_bits as f64 * LOG10_2).floor() as i64;

        while compare_pow10(&a, d, e) == Ordering::Less {
            e -= 1;
        }
        while compare_pow10(&a, d, e + 1) != Ordering::Less {
            e += 1;
        }
        Some(e)
    }

    /// Vérifie la plage représentable.
    /// - |x| >= 10^(max+1) : dépassement
    /// - 0 < |x| < 10^-max : ramené à zéro
    pub(crate) fn verifie_plage(self, max_exponent: u32) -> Result<Self, EngineError> {
        if self.0.is_zero() {
            return Ok(self);
        }
        // borne rapide par les bits : la plupart des valeurs s’arrêtent ici
        let diff_bits = self.0.numer().bits() as i64 - self.0.denom().bits() as i64;
        let borne_bits = ((max_exponent as f64) / LOG10_2) as i64 - 2;
        if diff_bits.abs() < borne_bits {
            return Ok(self);
        }

        let max = i64::from(max_exponent);
        match self.decimal_exponent() {
            Some(e) if e > max => Err(EngineError::OverflowError),
            Some(e) if e < -max => Ok(Self::zero()),
            _ => Ok(self),
        }
    }

    /// Arrondi au pair à `places` décimales.
    pub fn round_places(&self, places: usize) -> Self {
        let scale = pow10(places);
        let n = div_arrondi_pair(&(self.0.numer() * &scale), self.0.denom());
        Self(BigRational::new(n, scale))
    }

    /// Arrondi au pair à `digits` chiffres significatifs.
    pub fn round_significant(&self, digits: usize) -> Self {
        let Some(e) = self.decimal_exponent() else {
            return Self::zero();
        };
        let shift = digits as i64 - 1 - e;
        let (n, d) = (self.0.numer(), self.0.denom());
        if shift >= 0 {
            let scale = pow10(shift as usize);
            let m = div_arrondi_pair(&(n * &scale), d);
            Self(BigRational::new(m, scale))
        } else {
            let scale = pow10((-shift) as usize);
            let m = div_arrondi_pair(n, &(d * &scale));
            Self(BigRational::from_integer(m * scale))
        }
    }

    /// Texte d’affichage : `digits` chiffres significatifs, zéros de fin retirés,
    /// notation scientifique hors de [1e-6, 10^digits).
    pub fn to_display(&self, digits: usize) -> String {
        let digits = digits.max(1);
        let Some(mut e) = self.decimal_exponent() else {
            return "0".to_string();
        };

        // mantisse entière sur `digits` chiffres
        let shift = digits as i64 - 1 - e;
        let a = self.0.numer().abs();
        let d = self.0.denom();
        let mut m = if shift >= 0 {
            div_arrondi_pair(&(a * pow10(shift as usize)), d)
        } else {
            div_arrondi_pair(&a, &(d * pow10((-shift) as usize)))
        };
        // 9.99… arrondi en 10.0… : un chiffre de plus
        if m >= pow10(digits) {
            m /= 10u32;
            e += 1;
        }

        let chiffres = m.to_str_radix(10);
        let signe = if self.0.is_negative() { "-" } else { "" };

        if e >= -6 && e < digits as i64 {
            let (ent, frac) = if e >= 0 {
                let k = (e + 1) as usize;
                (chiffres[..k].to_string(), chiffres[k..].to_string())
            } else {
                let zeros = "0".repeat((-e - 1) as usize);
                ("0".to_string(), format!("{zeros}{chiffres}"))
            };
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{signe}{ent}")
            } else {
                format!("{signe}{ent}.{frac}")
            }
        } else {
            let (tete, reste) = chiffres.split_at(1);
            let reste = reste.trim_end_matches('0');
            let exp_signe = if e < 0 { '-' } else { '+' };
            if reste.is_empty() {
                format!("{signe}{tete}E{exp_signe}{}", e.abs())
            } else {
                format!("{signe}{tete}.{reste}E{exp_signe}{}", e.abs())
            }
        }
    }
}

impl std::ops::Neg for NumericValue {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display(DISPLAY_DIGITS_MIN))
    }
}

impl From<i64> for NumericValue {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl From<BigRational> for NumericValue {
    fn from(r: BigRational) -> Self {
        Self(r)
    }
}

/// Lecture d’un littéral décimal : `-12.5`, `.5`, `1.5E+40`.
impl FromStr for NumericValue {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalide = |pos: usize| EngineError::syntax(pos, format!("nombre invalide: '{s}'"));

        let (neg, corps) = match s.strip_prefix('-') {
            Some(reste) => (true, reste),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (mantisse, exposant) = match corps.find(|c: char| c == 'e' || c == 'E') {
            Some(k) => {
                let exp: i64 = corps[k + 1..].parse().map_err(|_| invalide(k + 1))?;
                (&corps[..k], exp)
            }
            None => (corps, 0),
        };

        let (ent, frac) = mantisse.split_once('.').unwrap_or((mantisse, ""));
        if ent.is_empty() && frac.is_empty() {
            return Err(invalide(0));
        }
        if !ent.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalide(0));
        }

        let texte = format!("{ent}{frac}");
        let n = BigInt::parse_bytes(texte.as_bytes(), 10).ok_or_else(|| invalide(0))?;
        let n = if neg { -n } else { n };

        let e = exposant - frac.len() as i64;
        if e.unsigned_abs() > 1_000_000 {
            return Err(EngineError::OverflowError);
        }
        let r = if e >= 0 {
            BigRational::from_integer(n * pow10(e as usize))
        } else {
            BigRational::new(n, pow10((-e) as usize))
        };
        Ok(Self(r))
    }
}
