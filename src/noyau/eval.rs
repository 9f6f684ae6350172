//! Noyau : évaluation (pipeline réel)
//!
//! tokenize -> RPN -> pile de valeurs -> NumericValue
//!
//! Aucune donnée partagée mutable : le mode d’angle et la précision sont
//! fournis à chaque appel. Seul le cache des constantes (π, ln 2, ln 10)
//! est global, et il est immuable une fois rempli.

use log::debug;

use super::erreur::EngineError;
use super::fonctions::{
    applique, constante, division, factorielle, modulo, puissance,
};
use super::jetons::{format_tokens, tokenize};
use super::nombre::{NumericValue, Precision};
use super::rpn::{format_rpn, to_rpn, Binaire, RpnItem, Unaire};
use super::trig::AngleMode;

/// Étapes intermédiaires d’une évaluation (affichables en console).
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
}

/// API publique : évalue une expression au mode d’angle donné.
pub fn eval_expression(
    expr_str: &str,
    mode: AngleMode,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    eval_avec_demarche(expr_str, mode, prec).map(|(v, _)| v)
}

/// Variante avec précision par défaut.
pub fn evaluate(expr_str: &str, mode: AngleMode) -> Result<NumericValue, EngineError> {
    eval_expression(expr_str, mode, &Precision::default())
}

/// Comme [`eval_expression`], en renvoyant aussi les jetons et la RPN.
pub fn eval_avec_demarche(
    expr_str: &str,
    mode: AngleMode,
    prec: &Precision,
) -> Result<(NumericValue, Demarche), EngineError> {
    let s = expr_str.trim();
    if s.is_empty() {
        return Err(EngineError::syntax(0, "entrée vide"));
    }

    // 1) Jetons
    let jetons = tokenize(s)?;
    let jetons_txt = format_tokens(&jetons);
    debug!("jetons: {jetons_txt}");

    // 2) RPN
    let rpn = to_rpn(&jetons)?;
    let rpn_txt = format_rpn(&rpn);
    debug!("rpn: {rpn_txt}");

    // 3) Pile
    let v = eval_rpn(&rpn, mode, prec)?;

    let d = Demarche {
        jetons: jetons_txt,
        rpn: rpn_txt,
    };
    Ok((v, d))
}

fn pop(st: &mut Vec<NumericValue>) -> Result<NumericValue, EngineError> {
    st.pop()
        .ok_or_else(|| EngineError::syntax(0, "RPN invalide (pile vide)"))
}

/// Évalue une suite RPN. Chaque valeur poussée est contrôlée (plage d’exposant).
pub fn eval_rpn(
    rpn: &[RpnItem],
    mode: AngleMode,
    prec: &Precision,
) -> Result<NumericValue, EngineError> {
    let mut st: Vec<NumericValue> = Vec::with_capacity(rpn.len());

    for item in rpn {
        let v = match item {
            RpnItem::Num(r) => NumericValue::from_rational(r.clone()),
            RpnItem::Const(c) => constante(*c, prec),

            RpnItem::Unaire(u) => {
                let x = pop(&mut st)?;
                match u {
                    Unaire::Moins => -x,
                    Unaire::Plus => x,
                }
            }

            RpnItem::Binaire(b) => {
                let rhs = pop(&mut st)?;
                let lhs = pop(&mut st)?;
                let (a, c) = (lhs.as_rational(), rhs.as_rational());
                match b {
                    Binaire::Add => NumericValue::from_rational(a + c),
                    Binaire::Sub => NumericValue::from_rational(a - c),
                    Binaire::Mul => NumericValue::from_rational(a * c),
                    Binaire::Div => division(&lhs, &rhs)?,
                    Binaire::Mod => modulo(&lhs, &rhs)?,
                    Binaire::Pow => puissance(&lhs, &rhs, prec)?,
                }
            }

            // A ± B%  =>  A ± A·B/100 ; sinon B/100
            RpnItem::Percent { of_left } => {
                let b = pop(&mut st)?;
                let centieme = division(&b, &NumericValue::from_integer(100))?;
                match st.last() {
                    Some(a) if *of_left => {
                        NumericValue::from_rational(a.as_rational() * centieme.as_rational())
                    }
                    _ => centieme,
                }
            }

            RpnItem::Factorial => factorielle(&pop(&mut st)?, prec)?,

            RpnItem::Fonction(f) => applique(*f, &pop(&mut st)?, mode, prec)?,
        };

        st.push(v.verifie_plage(prec.max_exponent)?);
    }

    if st.len() != 1 {
        return Err(EngineError::syntax(0, "expression incomplète"));
    }
    pop(&mut st)
}
