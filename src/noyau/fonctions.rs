//! Fonctions et opérateurs non triviaux du noyau.
//!
//! Règle commune : tout ce qui est rationnel reste exact (modulo, puissances
//! entières, factorielle, racines de carrés parfaits, log des puissances de 10).
//! Le reste passe par les noyaux en virgule fixe, avec décimales de garde,
//! puis un seul arrondi au pair.

use std::f64::consts::LN_10;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::erreur::EngineError;
use super::jetons::{Constante, Fonction};
use super::nombre::{div_arrondi_pair, log10_estime, pow10, NumericValue, Precision};
use super::trig::{eval_trig, AngleMode, TrigFn};
use super::virgule_fixe::{
    chiffres_entiers, exp_rationnel, ln10_scaled, ln_scaled, pi_scaled, rational_scaled,
    rational_sqrt_scaled, reduit_places, scaled_to_rational,
};

/// Taille (en bits) au-delà de laquelle une puissance entière exacte
/// serait trop coûteuse : on passe alors par exp(n·ln|a|).
const BITS_PUISSANCE_MAX: u64 = 200_000;

/* ------------------------ Constantes ------------------------ */

/// π et e, gardés à working + guard décimales.
pub fn constante(c: Constante, prec: &Precision) -> NumericValue {
    let q = prec.places_calcul();
    let r = match c {
        Constante::Pi => scaled_to_rational(pi_scaled(q), q),
        Constante::E => exp_rationnel(&pow10(q), q),
    };
    NumericValue::from_rational(r)
}

/* ------------------------ Dispatch ------------------------ */

/// Applique une fonction unaire nommée.
pub fn applique(
    f: Fonction,
    x: &NumericValue,
    mode: AngleMode,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    let trig = |t: TrigFn| eval_trig(t, x, mode, prec);
    match f {
        Fonction::Sin => trig(TrigFn::Sin),
        Fonction::Cos => trig(TrigFn::Cos),
        Fonction::Tan => trig(TrigFn::Tan),
        Fonction::Asin => trig(TrigFn::Asin),
        Fonction::Acos => trig(TrigFn::Acos),
        Fonction::Atan => trig(TrigFn::Atan),
        Fonction::Sinh => sinh(x, prec),
        Fonction::Cosh => cosh(x, prec),
        Fonction::Tanh => tanh(x, prec),
        Fonction::Log => log10(x, prec),
        Fonction::Ln => ln(x, prec),
        Fonction::Sqrt => racine(x, prec),
        Fonction::Abs => Ok(x.abs()),
        Fonction::Factorial => factorielle(x, prec),
    }
}

/* ------------------------ Arithmétique exacte ------------------------ */

pub fn division(a: &NumericValue, b: &NumericValue) -> Result<NumericValue, EngineError> {
    if b.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    Ok(NumericValue::from_rational(a.as_rational() / b.as_rational()))
}

/// Modulo « plancher » : le reste a le signe du diviseur (-7 mod 3 = 2).
pub fn modulo(a: &NumericValue, b: &NumericValue) -> Result<NumericValue, EngineError> {
    if b.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    let (a, b) = (a.as_rational(), b.as_rational());
    let q = (a / b).floor();
    Ok(NumericValue::from_rational(a - b * q))
}

pub fn factorielle(x: &NumericValue, prec: &Precision) -> Result<NumericValue, EngineError> {
    if x.is_negative() || !x.is_integer() {
        return Err(EngineError::domain(
            "factorial",
            "entier positif ou nul attendu",
        ));
    }
    let n = x
        .as_rational()
        .to_integer()
        .to_u64()
        .ok_or(EngineError::OverflowError)?;

    // Σ log10(k) : on refuse avant de construire un entier géant
    let limite = f64::from(prec.max_exponent) + 1.0;
    let mut ordre = 0.0f64;
    for k in 2..=n {
        ordre += (k as f64).log10();
        if ordre > limite + 1e-6 {
            return Err(EngineError::OverflowError);
        }
    }

    let produit = (2..=n).fold(BigInt::one(), |acc, k| acc * k);
    Ok(NumericValue::from_rational(BigRational::from_integer(produit)))
}

/* ------------------------ Racine, logarithmes ------------------------ */

fn racine_exacte(r: &BigRational) -> Option<BigRational> {
    let (n, d) = (r.numer(), r.denom());
    let sn = n.sqrt();
    let sd = d.sqrt();
    (&sn * &sn == *n && &sd * &sd == *d).then(|| BigRational::new(sn, sd))
}

pub fn racine(x: &NumericValue, prec: &Precision) -> Result<NumericValue, EngineError> {
    if x.is_negative() {
        return Err(EngineError::domain("sqrt", "racine d’un nombre négatif"));
    }
    let r = x.as_rational();
    if let Some(exacte) = racine_exacte(r) {
        return Ok(NumericValue::from_rational(exacte));
    }

    // petits arguments : décimales en plus pour garder les chiffres significatifs
    let e = x.decimal_exponent().unwrap_or(0);
    let places = prec.places_calcul() + (-e).max(0) as usize / 2 + 1;
    let s = rational_sqrt_scaled(r, places);
    Ok(NumericValue::from_rational(scaled_to_rational(s, places))
        .round_significant(prec.working_digits))
}

fn exige_positif(x: &NumericValue, op: &'static str) -> Result<(), EngineError> {
    if x.is_negative() || x.is_zero() {
        return Err(EngineError::domain(op, "argument négatif ou nul"));
    }
    Ok(())
}

pub fn ln(x: &NumericValue, prec: &Precision) -> Result<NumericValue, EngineError> {
    exige_positif(x, "ln")?;
    let (p, q) = (prec.working_digits, prec.places_calcul());
    let v = ln_scaled(x.as_rational(), q);
    Ok(NumericValue::from_rational(scaled_to_rational(
        reduit_places(&v, q, p),
        p,
    )))
}

/// 10^k exact -> Some(k).
fn puissance_de_dix(r: &BigRational) -> Option<i64> {
    let est_pow10 = |n: &BigInt| {
        let s = n.to_str_radix(10);
        s.starts_with('1') && s[1..].bytes().all(|b| b == b'0')
    };
    let (n, d) = (r.numer(), r.denom());
    if d.is_one() && est_pow10(n) {
        return i64::try_from(n.to_str_radix(10).len() - 1).ok();
    }
    if n.is_one() && est_pow10(d) {
        return i64::try_from(d.to_str_radix(10).len() - 1).ok().map(|k| -k);
    }
    None
}

/// Logarithme décimal.
pub fn log10(x: &NumericValue, prec: &Precision) -> Result<NumericValue, EngineError> {
    exige_positif(x, "log")?;
    if let Some(k) = puissance_de_dix(x.as_rational()) {
        return Ok(NumericValue::from_integer(k));
    }
    let (p, q) = (prec.working_digits, prec.places_calcul());
    let num = ln_scaled(x.as_rational(), q) * pow10(q);
    let v = div_arrondi_pair(&num, &ln10_scaled(q));
    Ok(NumericValue::from_rational(scaled_to_rational(
        reduit_places(&v, q, p),
        p,
    )))
}

/* ------------------------ Exponentielles ------------------------ */

/// Approximation f64 d’un rationnel (±inf / 0 hors de la plage f64).
fn approx_f64(r: &BigRational) -> f64 {
    if r.is_zero() {
        return 0.0;
    }
    let k = 60 - (r.numer().bits() as i64 - r.denom().bits() as i64);
    let q = if k >= 0 {
        (r.numer() << k as usize) / r.denom()
    } else {
        r.numer() / (r.denom() << (-k) as usize)
    };
    let exposant = (-k).clamp(-1100, 1100) as i32;
    q.to_f64().unwrap_or(0.0) * 2f64.powi(exposant)
}

/// log10|a| en f64, précis aussi quand |a| est proche de 1.
fn log10_abs(a: &BigRational) -> f64 {
    let d = a.abs() - BigRational::one();
    let x = approx_f64(&d);
    if x.abs() < 1e-3 {
        return x.ln_1p() / LN_10;
    }
    log10_estime(a.numer()) - log10_estime(a.denom())
}

/// exp(y) avec ~`places` chiffres relatifs, après contrôle de l’ordre de grandeur :
/// trop grand -> OverflowError, trop petit -> 0.
fn exp_controle(
    y: &BigRational,
    places: usize,
    prec: &Precision,
) -> Result<BigRational, EngineError> {
    let limite = (f64::from(prec.max_exponent) + 1.0) * LN_10 + 1.0;
    let a = approx_f64(y);
    if a > limite {
        return Err(EngineError::OverflowError);
    }
    if a < -limite {
        return Ok(BigRational::zero());
    }
    Ok(exp_rationnel(&rational_scaled(y, places), places))
}

/// Décimales de travail pour un argument proche de zéro (annulation dans E - 1/E).
fn places_hyperboliques(x: &NumericValue, prec: &Precision) -> usize {
    let e = x.decimal_exponent().unwrap_or(0);
    prec.places_calcul() + (-e).max(0) as usize
}

pub fn sinh(x: &NumericValue, prec: &Precision) -> Result<NumericValue, EngineError> {
    if x.is_zero() {
        return Ok(NumericValue::zero());
    }
    let places = places_hyperboliques(x, prec);
    let e = exp_controle(&x.as_rational().abs(), places, prec)?;
    let s = (&e - e.recip()) / BigRational::from_integer(BigInt::from(2));
    let s = if x.is_negative() { -s } else { s };
    Ok(NumericValue::from_rational(s).round_significant(prec.working_digits))
}

pub fn cosh(x: &NumericValue, prec: &Precision) -> Result<NumericValue, EngineError> {
    if x.is_zero() {
        return Ok(NumericValue::one());
    }
    let e = exp_controle(&x.as_rational().abs(), prec.places_calcul(), prec)?;
    let c = (&e + e.recip()) / BigRational::from_integer(BigInt::from(2));
    Ok(NumericValue::from_rational(c).round_significant(prec.working_digits))
}

pub fn tanh(x: &NumericValue, prec: &Precision) -> Result<NumericValue, EngineError> {
    if x.is_zero() {
        return Ok(NumericValue::zero());
    }
    let un = BigRational::one();
    let a = x.as_rational().abs();

    // exp(-2|x|) sous la précision : ±1
    let sature = (prec.places_calcul() as f64 + 2.0) * LN_10 / 2.0;
    let t = if approx_f64(&a) > sature {
        un
    } else {
        let places = places_hyperboliques(x, prec);
        let e2 = exp_controle(&(a * BigInt::from(2)), places, prec)?;
        (&e2 - &un) / (&e2 + &un)
    };
    let t = if x.is_negative() { -t } else { t };
    Ok(NumericValue::from_rational(t).round_significant(prec.working_digits))
}

/* ------------------------ Puissance ------------------------ */

pub fn puissance(
    a: &NumericValue,
    b: &NumericValue,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    if b.is_integer() {
        return puissance_entiere(a, &b.as_rational().to_integer(), prec);
    }
    if a.is_negative() {
        return Err(EngineError::domain(
            "^",
            "base négative avec exposant non entier",
        ));
    }
    if a.is_zero() {
        return if b.is_negative() {
            Err(EngineError::DivisionByZero)
        } else {
            Ok(NumericValue::zero())
        };
    }
    let r = exp_log(a.as_rational(), b.as_rational(), prec)?;
    Ok(NumericValue::from_rational(r).round_significant(prec.working_digits))
}

/// exp(b · ln|a|), a ≠ 0.
fn exp_log(a: &BigRational, b: &BigRational, prec: &Precision) -> Result<BigRational, EngineError> {
    let q = prec.places_calcul();
    let places = q + chiffres_entiers(b) + 2;
    let ln_a = scaled_to_rational(ln_scaled(&a.abs(), places), places);
    exp_controle(&(b * ln_a), q, prec)
}

fn puissance_entiere(
    a: &NumericValue,
    n: &BigInt,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    if n.is_zero() {
        return Ok(NumericValue::one());
    }
    if a.is_zero() {
        return if n.is_negative() {
            Err(EngineError::DivisionByZero)
        } else {
            Ok(NumericValue::zero())
        };
    }

    let r = a.as_rational();
    let impair = !(n % 2u32).is_zero();
    let negatif = r.is_negative() && impair;
    let signe = |v: BigRational| if negatif { -v } else { v };

    if r.abs().is_one() {
        return Ok(NumericValue::from_rational(signe(BigRational::one())));
    }

    // ordre de grandeur du résultat, avant tout calcul
    let limite = f64::from(prec.max_exponent) + 1.0;
    let ordre = n.to_f64().unwrap_or(f64::INFINITY) * log10_abs(r);
    if ordre > limite + 1.0 {
        return Err(EngineError::OverflowError);
    }
    if ordre < -(limite + 1.0) {
        return Ok(NumericValue::zero());
    }

    let bits = r.numer().bits() + r.denom().bits();
    let exact = n
        .abs()
        .to_u32()
        .filter(|m| bits.saturating_mul(u64::from(*m)) <= BITS_PUISSANCE_MAX);

    match exact {
        Some(m) => {
            // a irréductible => a^m irréductible : pas de pgcd à recalculer
            let (num, den) = (r.numer().abs().pow(m), r.denom().pow(m));
            let v = if n.is_negative() {
                BigRational::new_raw(den, num)
            } else {
                BigRational::new_raw(num, den)
            };
            Ok(NumericValue::from_rational(signe(v)))
        }
        None => {
            let v = exp_log(r, &BigRational::from_integer(n.clone()), prec)?;
            Ok(NumericValue::from_rational(signe(v)).round_significant(prec.working_digits))
        }
    }
}
