// src/noyau/trig.rs
//
// Trigonométrie avec mode d’angle
// -------------------------------
// - AngleMode fourni à chaque appel (le noyau ne le stocke pas)
// - Degrés : réduction EXACTE modulo 360, puis table des angles spéciaux
//   à valeur rationnelle (0, ±1/2, ±1, tan indéfinie)
// - Sinon : séries en virgule fixe, arrondi une seule fois à working_digits
// - Réciproques : résultat converti en degrés si demandé

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use super::erreur::EngineError;
use super::nombre::{div_arrondi_pair, pow10, NumericValue, Precision};
use super::virgule_fixe::{
    atan_scaled, chiffres_entiers, pi_scaled, rational_scaled, rational_sqrt_scaled,
    reduit_places, scaled_to_rational, sin_cos_scaled,
};

/// Au-delà, la réduction d’argument coûterait trop de décimales de π.
const CHIFFRES_ENTIERS_MAX: usize = 2000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    #[serde(alias = "deg")]
    Degrees,
    #[serde(alias = "rad")]
    Radians,
}

impl AngleMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Degrees => Self::Radians,
            Self::Radians => Self::Degrees,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Degrees => "DEG",
            Self::Radians => "RAD",
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AngleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deg" | "degree" | "degrees" | "degres" | "degrés" => Ok(Self::Degrees),
            "rad" | "radian" | "radians" => Ok(Self::Radians),
            autre => Err(format!("mode d’angle inconnu: '{autre}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

impl TrigFn {
    fn nom(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrigOutcome {
    Valeur(BigRational),
    Indefini,
}

/* ------------------------ Angles spéciaux (degrés) ------------------------ */

/// r mod periode, résultat dans [0, periode).
pub(crate) fn mod_rationnel(r: &BigRational, periode: i64) -> BigRational {
    let p = BigRational::from_integer(BigInt::from(periode));
    r - &p * (r / &p).floor()
}

/// Reconnaît les angles (en degrés, déjà réduits dans [0, 360)) dont le
/// sin/cos/tan est rationnel.
///
/// Retour:
/// - Some(Valeur(r)) si reconnu
/// - Some(Indefini) pour tan(90) / tan(270)
/// - None si non reconnu
pub fn trig_special(deg: &BigRational, f: TrigFn) -> Option<TrigOutcome> {
    if !deg.is_integer() {
        return None;
    }
    let a = deg.to_integer().to_i64()?;

    let rat = |n: i64, d: i64| TrigOutcome::Valeur(BigRational::new(n.into(), d.into()));

    let out = match f {
        TrigFn::Sin => match a {
            0 | 180 => rat(0, 1),
            30 | 150 => rat(1, 2),
            210 | 330 => rat(-1, 2),
            90 => rat(1, 1),
            270 => rat(-1, 1),
            _ => return None,
        },
        TrigFn::Cos => match a {
            0 => rat(1, 1),
            180 => rat(-1, 1),
            60 | 300 => rat(1, 2),
            120 | 240 => rat(-1, 2),
            90 | 270 => rat(0, 1),
            _ => return None,
        },
        TrigFn::Tan => match a {
            0 | 180 => rat(0, 1),
            45 | 225 => rat(1, 1),
            135 | 315 => rat(-1, 1),
            90 | 270 => TrigOutcome::Indefini,
            _ => return None,
        },
        TrigFn::Asin | TrigFn::Acos | TrigFn::Atan => return None,
    };

    Some(out)
}

/* ------------------------ Évaluation ------------------------ */

/// sin / cos / tan / asin / acos / atan au mode d’angle demandé.
pub fn eval_trig(
    f: TrigFn,
    x: &NumericValue,
    mode: AngleMode,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    match f {
        TrigFn::Sin | TrigFn::Cos | TrigFn::Tan => directe(f, x.as_rational(), mode, prec),
        TrigFn::Asin | TrigFn::Acos | TrigFn::Atan => reciproque(f, x.as_rational(), mode, prec),
    }
}

fn directe(
    f: TrigFn,
    r: &BigRational,
    mode: AngleMode,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    let p = prec.working_digits;

    // angle en radians, scalé à q décimales
    let (x, q) = match mode {
        AngleMode::Degrees => {
            let deg = mod_rationnel(r, 360);
            match trig_special(&deg, f) {
                Some(TrigOutcome::Valeur(v)) => return Ok(NumericValue::from_rational(v)),
                Some(TrigOutcome::Indefini) => {
                    return Err(EngineError::domain(f.nom(), "tangente indéfinie"))
                }
                None => {}
            }
            let q = prec.places_calcul() + 3;
            let num = deg.numer() * pi_scaled(q);
            let den = deg.denom() * BigInt::from(180);
            (div_arrondi_pair(&num, &den), q)
        }
        AngleMode::Radians => {
            let ent = chiffres_entiers(r);
            if ent > CHIFFRES_ENTIERS_MAX {
                return Err(EngineError::PrecisionError {
                    operation: f.nom(),
                });
            }
            let q = prec.places_calcul() + ent;
            (rational_scaled(r, q), q)
        }
    };

    let (sin, cos) = sin_cos_scaled(&x, q);

    let v = match f {
        TrigFn::Sin => reduit_places(&sin, q, p),
        TrigFn::Cos => reduit_places(&cos, q, p),
        _ => {
            if reduit_places(&cos, q, p).is_zero() {
                return Err(EngineError::domain("tan", "tangente indéfinie"));
            }
            let tan_q = div_arrondi_pair(&(sin * pow10(q)), &cos);
            reduit_places(&tan_q, q, p)
        }
    };

    Ok(NumericValue::from_rational(scaled_to_rational(v, p)))
}

fn reciproque(
    f: TrigFn,
    r: &BigRational,
    mode: AngleMode,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    let p = prec.working_digits;
    let q = prec.places_calcul();
    let un = BigRational::one();

    if matches!(f, TrigFn::Asin | TrigFn::Acos) && r.abs() > un {
        return Err(EngineError::domain(f.nom(), "argument hors de [-1, 1]"));
    }

    let demi_pi = pi_scaled(q) >> 1u32;

    // asin(x) = atan(x / √(1 - x²)) ; ±π/2 aux bornes
    let borne = |r: &BigRational| {
        if r.is_negative() {
            -demi_pi.clone()
        } else {
            demi_pi.clone()
        }
    };
    let asin = |r: &BigRational| -> BigInt {
        if r.abs() == un {
            return borne(r);
        }
        // 1 - x² sous 10^-2q : √ nulle à q décimales, on est à la borne
        let s = rational_sqrt_scaled(&(&un - r * r), q);
        if s.is_zero() {
            return borne(r);
        }
        let t = rational_scaled(r, q) * pow10(q) / s;
        atan_scaled(&t, q)
    };

    let rad = match f {
        TrigFn::Asin => asin(r),
        TrigFn::Acos => &demi_pi - asin(r),
        _ => atan_scaled(&rational_scaled(r, q), q),
    };

    let v = match mode {
        AngleMode::Radians => reduit_places(&rad, q, p),
        AngleMode::Degrees => {
            let deg = div_arrondi_pair(&(rad * 180u32 * pow10(q)), &pi_scaled(q));
            reduit_places(&deg, q, p)
        }
    };

    Ok(NumericValue::from_rational(scaled_to_rational(v, p)))
}
