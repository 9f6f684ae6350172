// src/noyau/virgule_fixe.rs
//
// Noyaux en virgule fixe (entier “scalé” ×10^places)
// --------------------------------------------------
// - π (Machin), ln 2 et ln 10 en cache par nombre de décimales
// - exp, ln, sin/cos, atan, √ par séries / Newton sur BigInt
// - Tous les noyaux tronquent ; l’appelant calcule avec des décimales de garde
//   puis arrondit une seule fois.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::nombre::{div_arrondi_pair, pow10};

/* ------------------------ Conversions ------------------------ */

/// r -> entier “scalé” = arrondi(r * 10^places)
pub fn rational_scaled(r: &BigRational, places: usize) -> BigInt {
    div_arrondi_pair(&(r.numer() * pow10(places)), r.denom())
}

/// entier “scalé” -> rationnel exact v / 10^places
pub fn scaled_to_rational(v: BigInt, places: usize) -> BigRational {
    BigRational::new(v, pow10(places))
}

/// Passe de `de` décimales à `vers` décimales (vers <= de), arrondi au pair.
pub fn reduit_places(v: &BigInt, de: usize, vers: usize) -> BigInt {
    debug_assert!(vers <= de);
    div_arrondi_pair(v, &pow10(de - vers))
}

/// Nombre de chiffres de la partie entière de |r| (0 si |r| < 1).
pub fn chiffres_entiers(r: &BigRational) -> usize {
    let ent = (r.numer().abs()) / r.denom();
    if ent.is_zero() {
        0
    } else {
        ent.to_str_radix(10).len()
    }
}

/* ------------------------ Constantes en cache ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Constante {
    Pi,
    Ln2,
    Ln10,
}

static CACHE: OnceLock<Mutex<HashMap<(Constante, usize), BigInt>>> = OnceLock::new();

fn constante_cached(c: Constante, places: usize, calcul: fn(usize) -> BigInt) -> BigInt {
    let m = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    // un calcul interrompu ne laisse jamais de valeur partielle : on ignore l’empoisonnement
    let lire = || m.lock().unwrap_or_else(|p| p.into_inner());

    if let Some(v) = lire().get(&(c, places)) {
        return v.clone();
    }

    // verrou relâché pendant le calcul : ln 10 redemande ln 2
    let v = calcul(places);
    lire().insert((c, places), v.clone());
    v
}

/// arctan(1/q) en entier scalé (troncature) via série:
/// atan(z) = z - z^3/3 + z^5/5 - ...
fn arctan_inv_q_scaled(q: i64, scale: &BigInt) -> BigInt {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut k: u64 = 0;
    let mut sign_pos = true;

    // q^(2k+1)
    let mut q_pow = q.clone();
    let mut sum = BigInt::zero();

    loop {
        let d = &q_pow * (2 * k + 1);
        let term = scale / &d;
        if term.is_zero() {
            break;
        }

        if sign_pos {
            sum += &term;
        } else {
            sum -= &term;
        }

        q_pow *= &q2;
        sign_pos = !sign_pos;
        k += 1;
    }

    sum
}

fn pi_scaled_compute(places: usize) -> BigInt {
    // extra pour amortir les erreurs de troncature
    let extra = 10usize;
    let scale = pow10(places + extra);

    // Machin : π = 16*atan(1/5) - 4*atan(1/239)
    let a = arctan_inv_q_scaled(5, &scale);
    let b = arctan_inv_q_scaled(239, &scale);

    let pi = BigInt::from(16) * a - BigInt::from(4) * b;
    pi / pow10(extra)
}

fn ln2_scaled_compute(places: usize) -> BigInt {
    // ln 2 = 2·atanh(1/3)
    let extra = 10usize;
    let p = places + extra;
    let z = pow10(p) / 3u32;
    atanh_scaled(&z, p) * 2u32 / pow10(extra)
}

fn ln10_scaled_compute(places: usize) -> BigInt {
    // ln 10 = 3·ln 2 + ln(5/4) ; ln(5/4) = 2·atanh(1/9)
    let extra = 10usize;
    let p = places + extra;
    let z = pow10(p) / 9u32;
    let ln_5_4 = atanh_scaled(&z, p) * 2u32;
    (ln2_scaled(p) * 3u32 + ln_5_4) / pow10(extra)
}

pub fn pi_scaled(places: usize) -> BigInt {
    constante_cached(Constante::Pi, places, pi_scaled_compute)
}

pub fn ln2_scaled(places: usize) -> BigInt {
    constante_cached(Constante::Ln2, places, ln2_scaled_compute)
}

pub fn ln10_scaled(places: usize) -> BigInt {
    constante_cached(Constante::Ln10, places, ln10_scaled_compute)
}

/* ------------------------ Séries de base ------------------------ */

/// atanh(z) pour |z| petit : z + z^3/3 + z^5/5 + ...
fn atanh_scaled(z: &BigInt, places: usize) -> BigInt {
    let scale = pow10(places);
    let z2 = z * z / &scale;

    let mut sum = z.clone();
    let mut z_pow = z.clone();
    let mut k: u64 = 1;
    loop {
        z_pow = &z_pow * &z2 / &scale;
        let term = &z_pow / (2 * k + 1);
        if term.is_zero() {
            break;
        }
        sum += term;
        k += 1;
    }
    sum
}

/// exp(x), x scalé, résultat scalé.
/// Réduction x/2^k jusqu’à |x| < 1/1024 puis Taylor, puis k élévations au carré.
pub fn exp_scaled(x: &BigInt, places: usize) -> BigInt {
    // décimales en plus : chaque carré double l’erreur relative
    let extra = 12usize;
    let p = places + extra;
    let scale = pow10(p);

    let mut r = x * pow10(extra);
    let seuil = &scale >> 10u32;
    let mut k: u32 = 0;
    while r.abs() > seuil {
        r >>= 1u32;
        k += 1;
    }

    let mut sum = scale.clone();
    let mut term = scale.clone();
    let mut n: u64 = 1;
    loop {
        term = &term * &r / (&scale * n);
        if term.is_zero() {
            break;
        }
        sum += &term;
        n += 1;
    }

    for _ in 0..k {
        sum = &sum * &sum / &scale;
    }

    sum / pow10(extra)
}

/// exp(x) comme rationnel avec une précision RELATIVE de ~10^-places.
/// Pour x < 0 on inverse exp(-x) : pas de perte sur les petits résultats.
pub fn exp_rationnel(x: &BigInt, places: usize) -> BigRational {
    if x.is_negative() {
        let e = exp_scaled(&-x, places);
        BigRational::new(pow10(places), e)
    } else {
        scaled_to_rational(exp_scaled(x, places), places)
    }
}

/// ln(r), r > 0 rationnel, résultat scalé.
/// r = m·2^k avec m ∈ (1/2, 2) ; ln m = 2·atanh((m-1)/(m+1)).
pub fn ln_scaled(r: &BigRational, places: usize) -> BigInt {
    let extra = 10usize;
    let p = places + extra;

    let k = r.numer().bits() as i64 - r.denom().bits() as i64;
    let m = if k >= 0 {
        r / BigRational::from_integer(BigInt::one() << (k as u64))
    } else {
        r * BigRational::from_integer(BigInt::one() << ((-k) as u64))
    };

    let un = BigRational::one();
    let z = (&m - &un) / (&m + &un);
    let z_s = rational_scaled(&z, p);

    let ln_m = atanh_scaled(&z_s, p) * 2u32;
    let ln_r = ln_m + ln2_scaled(p) * k;
    ln_r / pow10(extra)
}

/* ------------------------ Trigonométrie ------------------------ */

/// (sin x, cos x), x scalé (radians), résultats scalés.
/// Réduction dans [-π, π] puis Taylor. L’appelant fournit assez de décimales
/// pour couvrir la partie entière de x.
pub fn sin_cos_scaled(x: &BigInt, places: usize) -> (BigInt, BigInt) {
    let scale = pow10(places);
    let pi = pi_scaled(places);
    let deux_pi = &pi * 2u32;

    // x - round(x / 2π)·2π
    let tours = div_arrondi_pair(x, &deux_pi);
    let r = x - tours * &deux_pi;
    let r2 = &r * &r / &scale;

    let mut sin = r.clone();
    let mut term = r.clone();
    let mut n: u64 = 1;
    loop {
        term = -(&term * &r2) / (&scale * ((2 * n) * (2 * n + 1)));
        if term.is_zero() {
            break;
        }
        sin += &term;
        n += 1;
    }

    let mut cos = scale.clone();
    let mut term = scale.clone();
    let mut n: u64 = 1;
    loop {
        term = -(&term * &r2) / (&scale * ((2 * n - 1) * (2 * n)));
        if term.is_zero() {
            break;
        }
        cos += &term;
        n += 1;
    }

    (sin, cos)
}

/// atan(x), x scalé, résultat scalé.
/// |x| > 1 : π/2 - atan(1/x) ; puis 3 demi-angles avant la série.
pub fn atan_scaled(x: &BigInt, places: usize) -> BigInt {
    let extra = 5usize;
    let p = places + extra;
    let scale = pow10(p);

    let neg = x.is_negative();
    let mut a = x.abs() * pow10(extra);

    let inverse = a > scale;
    if inverse {
        a = &scale * &scale / &a;
    }

    // atan(a) = 2·atan(a / (1 + √(1 + a²)))
    let demis = 3u32;
    for _ in 0..demis {
        let racine = (&scale * &scale + &a * &a).sqrt();
        a = &a * &scale / (&scale + racine);
    }

    let a2 = &a * &a / &scale;
    let mut sum = a.clone();
    let mut a_pow = a.clone();
    let mut k: u64 = 1;
    let mut sign_pos = false;
    loop {
        a_pow = &a_pow * &a2 / &scale;
        let term = &a_pow / (2 * k + 1);
        if term.is_zero() {
            break;
        }
        if sign_pos {
            sum += term;
        } else {
            sum -= term;
        }
        sign_pos = !sign_pos;
        k += 1;
    }

    let mut res = sum << demis;
    if inverse {
        res = (pi_scaled(p) >> 1u32) - res;
    }
    let res = res / pow10(extra);
    if neg {
        -res
    } else {
        res
    }
}

/* ------------------------ √ (Newton) ------------------------ */

/// sqrt(r) en entier scalé : floor( sqrt(r) * 10^places ), r >= 0.
/// r = n/d
pub fn rational_sqrt_scaled(r: &BigRational, places: usize) -> BigInt {
    let n = r.numer().clone();
    let d = r.denom().clone();

    if n.is_zero() {
        return BigInt::zero();
    }

    // y ≈ sqrt(n/d) * 10^places  =>  y^2 ≈ (n * 10^(2*places)) / d
    let target = n * pow10(2 * places);

    // point de départ : racine entière du quotient, Newton sur le reste
    let mut y = (&target / &d).sqrt();
    if y.is_zero() {
        y = BigInt::one();
    }

    loop {
        let q = &target / (&d * &y);
        let y_next = (&y + q) >> 1u32;

        if y_next == y || y_next == (&y - 1u32) {
            // ajustement final (floor)
            let mut y_adj = y_next;

            while (&y_adj + 1u32) * (&y_adj + 1u32) * &d <= target {
                y_adj += 1u32;
            }
            while &y_adj * &y_adj * &d > target {
                y_adj -= 1u32;
            }
            return y_adj;
        }

        y = y_next;
    }
}
