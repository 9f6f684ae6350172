//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//!
//! Les identités sur les transcendantes sont vérifiées à tolérance près
//! (chaque résultat est arrondi à working_digits) ; tout ce qui reste
//! rationnel est comparé exactement.

use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;

use super::erreur::{EngineError, ErrorKind};
use super::eval_expression;
use super::nombre::{NumericValue, Precision};
use super::trig::AngleMode;

fn eval(expr: &str, mode: AngleMode) -> Result<NumericValue, EngineError> {
    eval_expression(expr, mode, &Precision::default())
}

fn eval_ok(expr: &str, mode: AngleMode) -> NumericValue {
    eval(expr, mode).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn assert_exact_eq(expr: &str, attendu: &str) {
    let v = eval_ok(expr, AngleMode::Degrees);
    assert_eq!(v.to_string(), attendu, "expr={expr:?}");
}

/// |a - b| < 10^-k
fn assert_proche(a: &NumericValue, b: &NumericValue, k: i32, ctx: &str) {
    let d = (a.as_rational() - b.as_rational()).abs();
    let tol = BigRational::new(BigInt::from(1), BigInt::from(10).pow(k as u32));
    assert!(d < tol, "{ctx}: écart {} >= 1e-{k}", NumericValue::from_rational(d));
}

fn assert_genre(expr: &str, mode: AngleMode, genre: ErrorKind) {
    match eval(expr, mode) {
        Err(e) => assert_eq!(e.kind(), genre, "expr={expr:?} err={e}"),
        Ok(v) => panic!("expr={expr:?} : attendu {genre:?}, obtenu {v}"),
    }
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Invariants trig ------------------------ */

#[test]
fn sci_indefinis_tan() {
    assert_genre("tan(90)", AngleMode::Degrees, ErrorKind::Domain);
    assert_genre("tan(270)", AngleMode::Degrees, ErrorKind::Domain);
    assert_genre("tan(-90)", AngleMode::Degrees, ErrorKind::Domain);
    assert_genre("1 + tan(450)", AngleMode::Degrees, ErrorKind::Domain);
}

#[test]
fn sci_identites_symetrie() {
    for mode in [AngleMode::Degrees, AngleMode::Radians] {
        for x in ["0.3", "17", "1.25", "100"] {
            let ctx = format!("x={x} {mode}");
            // sin(-x) = -sin(x) ; cos(-x) = cos(x) ; tan(-x) = -tan(x)
            let s = eval_ok(&format!("sin({x})"), mode);
            let s_neg = eval_ok(&format!("sin(-{x})"), mode);
            assert_proche(&s_neg, &-s, 48, &ctx);

            let c = eval_ok(&format!("cos({x})"), mode);
            let c_neg = eval_ok(&format!("cos(-{x})"), mode);
            assert_proche(&c_neg, &c, 48, &ctx);

            let t = eval_ok(&format!("tan({x})"), mode);
            let t_neg = eval_ok(&format!("tan(-{x})"), mode);
            assert_proche(&t_neg, &-t, 47, &ctx);
        }
    }
}

#[test]
fn sci_periodicite_degres_exacte() {
    // réduction exacte modulo 360 : mêmes valeurs au bit près
    for x in ["17", "0.5", "123.456"] {
        let a = eval_ok(&format!("sin({x})"), AngleMode::Degrees);
        let b = eval_ok(&format!("sin({x} + 720)"), AngleMode::Degrees);
        let c = eval_ok(&format!("sin({x} - 360)"), AngleMode::Degrees);
        assert_eq!(a, b, "x={x}");
        assert_eq!(a, c, "x={x}");
    }
}

#[test]
fn sci_pythagore() {
    for mode in [AngleMode::Degrees, AngleMode::Radians] {
        for x in ["1", "37", "2.5", "1000"] {
            let v = eval_ok(&format!("sin({x}) ^ 2 + cos({x}) ^ 2"), mode);
            assert_proche(&v, &NumericValue::one(), 45, &format!("x={x} {mode}"));
        }
    }
}

#[test]
fn sci_reciproques() {
    assert_proche(
        &eval_ok("asin(sin(0.7))", AngleMode::Radians),
        &eval_ok("0.7", AngleMode::Radians),
        45,
        "asin∘sin",
    );
    assert_proche(
        &eval_ok("atan(tan(40))", AngleMode::Degrees),
        &eval_ok("40", AngleMode::Degrees),
        44,
        "atan∘tan",
    );
    assert_proche(
        &eval_ok("acos(cos(2))", AngleMode::Radians),
        &eval_ok("2", AngleMode::Radians),
        45,
        "acos∘cos",
    );
}

/* ------------------------ Logarithmes / exponentielles ------------------------ */

#[test]
fn sci_log_exp() {
    let d = AngleMode::Degrees;
    assert_proche(&eval_ok("ln(e ^ 3)", d), &eval_ok("3", d), 45, "ln(e^3)");
    assert_proche(&eval_ok("e ^ ln(7)", d), &eval_ok("7", d), 45, "e^ln 7");
    assert_proche(&eval_ok("log(2) + log(5)", d), &NumericValue::one(), 45, "log 2 + log 5");
    assert_proche(
        &eval_ok("cosh(1.5) ^ 2 - sinh(1.5) ^ 2", d),
        &NumericValue::one(),
        44,
        "cosh² - sinh²",
    );
    assert_exact_eq("log(10 ^ 25)", "25");
    assert_exact_eq("log(0.001)", "-3");
}

/* ------------------------ Cohérence algébrique (zéro) ------------------------ */

#[test]
fn sci_zero_algebrique() {
    assert_exact_eq("(1/2 + 1/3) - 5/6", "0");
    assert_exact_eq("(2/3 * 3/4) - 1/2", "0");
    assert_exact_eq("0.1 + 0.2 - 0.3", "0");
    assert_exact_eq("sqrt(9/16) - 3/4", "0");
    assert_exact_eq("7! / 6! - 7", "0");
    assert_exact_eq("2 ^ 64 - 18446744073709551616", "0");
}

#[test]
fn sci_affichage_28_chiffres() {
    assert_exact_eq("1 / 3", "0.3333333333333333333333333333");
    assert_exact_eq("2 / 3", "0.6666666666666666666666666667");
    assert_exact_eq("10 ^ 30", "1E+30");
    assert_exact_eq("1 / 8 / 10 ^ 6", "1.25E-7");
    assert_exact_eq("0.000001", "0.000001");
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur_sqrt_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    // alternance sqrt / ^2 : reste un carré parfait à chaque étape
    let mut expr = "4".to_string();
    for k in 0..60 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
    }

    assert_exact_eq(&expr, "4");
    budget(t0, max);
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let expr = vec!["1/2"; 80].join(" + ");
    assert_exact_eq(&expr, "40");
    budget(t0, max);
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    // gros numérateur contrôlé (100 chiffres) : (10^100 - 1)/7 + 1/7 = 10^100/7
    let big = "9".repeat(100);
    let expr = format!("{big}/7 + 1/7");
    let v = eval_ok(&expr, AngleMode::Degrees);
    assert_eq!(v, eval_ok("10 ^ 100 / 7", AngleMode::Degrees));
    assert_eq!(v.to_string(), "1.428571428571428571428571429E+99");
    budget(t0, max);
}

#[test]
fn sci_limites_de_plage() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    assert_genre("10 ^ 9999 * 10", AngleMode::Degrees, ErrorKind::Overflow);
    assert_genre("3249!", AngleMode::Degrees, ErrorKind::Overflow);
    assert_genre("e ^ 100000", AngleMode::Degrees, ErrorKind::Overflow);
    assert_exact_eq("e ^ -100000", "0");
    assert_exact_eq("0.5 ^ 100000", "0");
    budget(t0, max);
}
