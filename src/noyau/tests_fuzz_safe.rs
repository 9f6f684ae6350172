//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - on accepte les erreurs de domaine et les divisions par zéro (le générateur
//!   ne produit que des expressions syntaxiquement valides)
//! - invariants : même entrée => même sortie ; affichage sur 28 chiffres au plus

use std::time::{Duration, Instant};

use super::erreur::{EngineError, ErrorKind};
use super::eval_expression;
use super::nombre::{NumericValue, Precision};
use super::trig::AngleMode;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn eval(expr: &str, mode: AngleMode) -> Result<NumericValue, EngineError> {
    eval_expression(expr, mode, &Precision::default())
}

fn is_erreur_attendue(e: &EngineError) -> bool {
    matches!(e.kind(), ErrorKind::Domain | ErrorKind::DivisionByZero)
}

/// Nombre de chiffres significatifs affichés (mantisse seule).
fn chiffres_affiches(txt: &str) -> usize {
    let mantisse = txt.split('E').next().unwrap_or(txt);
    mantisse
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .trim_start_matches('0')
        .len()
}

fn check_affichage(v: &NumericValue, expr: &str) {
    let txt = v.to_string();
    assert!(
        chiffres_affiches(&txt) <= 28,
        "trop de chiffres: expr={expr:?} -> {txt}"
    );
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_rat(rng: &mut Rng) -> String {
    // inclut 0 (utile pour tester les divisions par zéro)
    let a = rng.pick(8);
    let b = 1 + rng.pick(8);

    match rng.pick(3) {
        0 => format!("{a}/{b}"),
        1 => format!("{a}.{b}"),
        _ => format!("{a}"),
    }
}

fn gen_angle(rng: &mut Rng) -> String {
    // multiples de 15° (table exacte) ou angle quelconque
    if rng.coin() {
        let k = rng.pick(49) as i64 - 24;
        format!("{}", k * 15)
    } else {
        gen_rat(rng)
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 | 1 => gen_rat(rng),
        2 => "pi".to_string(),
        3 => "e".to_string(),
        4 => format!("sqrt({})", gen_rat(rng)),
        _ => format!("{}!", rng.pick(8)),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    let mut sous = || gen_expr(rng, depth - 1);
    let (a, b) = (sous(), sous());
    match rng.pick(14) {
        0 => gen_atom(rng),
        1 => format!("({a}+{b})"),
        2 => format!("({a}-{b})"),
        3 => format!("({a}*{b})"),
        4 => format!("({a}/{b})"),
        5 => format!("({a} % {b})"),
        6 => format!("({a}+{b}%)"),
        7 => format!("-({a})"),
        8 => format!("sin({})", gen_angle(rng)),
        9 => format!("cos({})", gen_angle(rng)),
        10 => format!("tan({})", gen_angle(rng)),
        11 => format!("ln({a})"),
        12 => format!("log({a})"),
        _ => format!("({a})^{}", rng.pick(4)),
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_affichage() {
    let t0 = Instant::now();
    let max = Duration::from_secs(30);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..120 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let mode = if rng.coin() {
            AngleMode::Degrees
        } else {
            AngleMode::Radians
        };

        let premier = eval(&expr, mode);
        assert_eq!(premier, eval(&expr, mode), "non déterministe: {expr:?}");

        match premier {
            Ok(v) => {
                check_affichage(&v, &expr);
                seen_ok += 1;
            }
            Err(e) => {
                assert!(
                    is_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_angles_trig_en_degres() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..80 {
        budget(t0, max);

        let a = gen_angle(&mut rng);
        for f in ["sin", "cos", "tan"] {
            let expr = format!("{f}({a})");
            match eval(&expr, AngleMode::Degrees) {
                Ok(v) => {
                    check_affichage(&v, &expr);
                    if f != "tan" {
                        assert!(
                            v.abs() <= NumericValue::one(),
                            "hors [-1, 1]: {expr:?} -> {v}"
                        );
                    }
                }
                Err(e) => {
                    // seul tan(90 + 180k) est indéfini
                    assert_eq!(f, "tan", "erreur non attendue: expr={expr:?} err={e}");
                    assert_eq!(e.kind(), ErrorKind::Domain);
                }
            }
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    let v = eval(&expr, AngleMode::Degrees).unwrap_or_else(|e| panic!("err: {e}"));

    // 800*(1/2) = 400
    assert_eq!(v.to_string(), "400");
}

#[test]
fn fuzz_safe_entrees_arbitraires() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    // suites de caractères quelconques : jamais de panique, seulement des erreurs typées
    let alphabet: Vec<char> = "0123456789.+-*/^%!() pisqrtlogn,#πe√×÷".chars().collect();
    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..400 {
        budget(t0, max);
        let n = 1 + rng.pick(12) as usize;
        let s: String = (0..n)
            .map(|_| alphabet[rng.pick(alphabet.len() as u32) as usize])
            .collect();
        let _ = eval(&s, AngleMode::Degrees);
        let _ = eval(&s, AngleMode::Radians);
    }
}
