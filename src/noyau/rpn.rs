// src/noyau/rpn.rs
//
// Shunting-yard -> RPN (postfix)
// Objectif:
// - Convertir une suite de Jeton en RPN, en résolvant l’arité des opérateurs
// - Refuser tout ce qui est ambigu ou incomplet (SyntaxError positionnée)
//
// Précédences:
//   4 : moins / plus unaires (droite)
//   3 : ^ (droite) ; ! et % postfixes
//   2 : * / % binaire (gauche)
//   1 : + - binaires (gauche)
//
// Règles:
// - '-' / '+' unaire : en tête, après un opérateur ou après '('
// - '%' après un terme complet : modulo si un opérande suit immédiatement,
//   sinon pourcentage postfixe
// - pourcentage dont l’opérateur en attente est + ou - : `of_left`
//   (A + B% = A + A·B/100)
// - pas de multiplication implicite : "2(3)" et "2pi" sont refusés
// - une fonction exige '(' juste après son nom

use std::fmt;

use num_rational::BigRational;
use num_traits::One;

use super::erreur::EngineError;
use super::jetons::{Constante, Fonction, Jeton, Op, Tok};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unaire {
    Moins,
    Plus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binaire {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RpnItem {
    Num(BigRational),
    Const(Constante),
    Unaire(Unaire),
    Binaire(Binaire),
    Fonction(Fonction),
    Percent { of_left: bool },
    Factorial,
}

/// Élément de la pile d’opérateurs.
#[derive(Clone, Copy, Debug)]
enum Pile {
    /// '(' ouvrante, éventuellement collée à une fonction.
    LPar(Option<Fonction>),
    Unaire(Unaire),
    Binaire(Binaire),
}

const PREC_POSTFIX: u8 = 3;

impl Binaire {
    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div | Self::Mod => 2,
            Self::Pow => 3,
        }
    }

    fn is_right_associative(self) -> bool {
        matches!(self, Self::Pow)
    }
}

impl Pile {
    fn precedence(self) -> u8 {
        match self {
            Self::LPar(_) => 0,
            Self::Unaire(_) => 4,
            Self::Binaire(b) => b.precedence(),
        }
    }

    fn vers_rpn(self) -> Option<RpnItem> {
        match self {
            Self::LPar(_) => None,
            Self::Unaire(u) => Some(RpnItem::Unaire(u)),
            Self::Binaire(b) => Some(RpnItem::Binaire(b)),
        }
    }
}

/// Un jeton qui commence un nouvel opérande.
fn commence_operande(t: &Tok) -> bool {
    matches!(
        t,
        Tok::Num(_) | Tok::Const(_) | Tok::Fonction(_) | Tok::LPar
    )
}

struct Parseur {
    out: Vec<RpnItem>,
    ops: Vec<Pile>,
    // “valeur” = un atome ou une expression fermée : sert au moins unaire,
    // au pourcentage et au refus de la multiplication implicite
    prev_was_value: bool,
    profondeur: usize,
}

impl Parseur {
    /// Dépile tant que `doit_sortir(top)` et qu’on n’atteint pas '('.
    fn depile_tant_que(&mut self, doit_sortir: impl Fn(Pile) -> bool) {
        while let Some(&top) = self.ops.last() {
            if matches!(top, Pile::LPar(_)) || !doit_sortir(top) {
                break;
            }
            self.ops.pop();
            if let Some(item) = top.vers_rpn() {
                self.out.push(item);
            }
        }
    }

    fn pousse_binaire(&mut self, b: Binaire) {
        let p = b.precedence();
        let droite = b.is_right_associative();
        self.depile_tant_que(|top| {
            let pt = top.precedence();
            pt > p || (pt == p && !droite)
        });
        self.ops.push(Pile::Binaire(b));
        self.prev_was_value = false;
    }

    /// Postfixe : seuls les opérateurs strictement plus forts (unaires) sortent avant.
    fn pousse_postfixe(&mut self, item: RpnItem) {
        self.depile_tant_que(|top| top.precedence() > PREC_POSTFIX);
        self.out.push(item);
        self.prev_was_value = true;
    }

    fn operateur_en_attente_additif(&self) -> bool {
        matches!(
            self.ops.last(),
            Some(Pile::Binaire(Binaire::Add | Binaire::Sub))
        )
    }
}

fn implicite(pos: usize) -> EngineError {
    EngineError::syntax(pos, "multiplication implicite non supportée")
}

fn operande_manquant(pos: usize) -> EngineError {
    EngineError::syntax(pos, "opérande manquant")
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   jetons: [Fonction(Sin), LPar, Const(Pi), Op(Slash), Num(2), RPar]
///   rpn:    [Const(Pi), Num(2), Binaire(Div), Fonction(Sin)]
pub fn to_rpn(tokens: &[Jeton]) -> Result<Vec<RpnItem>, EngineError> {
    if tokens.is_empty() {
        return Err(EngineError::syntax(0, "expression vide"));
    }

    let mut p = Parseur {
        out: Vec::with_capacity(tokens.len()),
        ops: Vec::new(),
        prev_was_value: false,
        profondeur: 0,
    };

    let mut iter = tokens.iter().peekable();

    while let Some(j) = iter.next() {
        let pos = j.pos;

        match &j.tok {
            Tok::Num(r) => {
                if p.prev_was_value {
                    return Err(implicite(pos));
                }
                p.out.push(RpnItem::Num(r.clone()));
                p.prev_was_value = true;
            }

            Tok::Const(c) => {
                if p.prev_was_value {
                    return Err(implicite(pos));
                }
                p.out.push(RpnItem::Const(*c));
                p.prev_was_value = true;
            }

            Tok::Fonction(f) => {
                if p.prev_was_value {
                    return Err(implicite(pos));
                }
                // la fonction avale sa parenthèse ouvrante
                match iter.next() {
                    Some(Jeton { tok: Tok::LPar, .. }) => {
                        p.ops.push(Pile::LPar(Some(*f)));
                        p.profondeur += 1;
                        p.prev_was_value = false;
                    }
                    _ => {
                        return Err(EngineError::syntax(
                            pos,
                            format!("'(' attendue après {}", f.nom()),
                        ))
                    }
                }
            }

            Tok::LPar => {
                if p.prev_was_value {
                    return Err(implicite(pos));
                }
                p.ops.push(Pile::LPar(None));
                p.profondeur += 1;
                p.prev_was_value = false;
            }

            Tok::RPar => {
                if p.profondeur == 0 {
                    return Err(EngineError::syntax(pos, "')' sans '(' correspondante"));
                }
                if !p.prev_was_value {
                    // "()" ou "(1+)"
                    return Err(operande_manquant(pos));
                }

                // dépile jusqu’à '(' ; si une fonction y est collée, on la sort aussi
                let mut fonction = None;
                while let Some(top) = p.ops.pop() {
                    if let Pile::LPar(f) = top {
                        fonction = f;
                        break;
                    }
                    if let Some(item) = top.vers_rpn() {
                        p.out.push(item);
                    }
                }
                if let Some(f) = fonction {
                    p.out.push(RpnItem::Fonction(f));
                }

                p.profondeur -= 1;
                p.prev_was_value = true;
            }

            Tok::Op(op) => {
                if !p.prev_was_value {
                    // moins / plus unaire
                    let u = match op {
                        Op::Minus => Unaire::Moins,
                        Op::Plus => Unaire::Plus,
                        _ => return Err(operande_manquant(pos)),
                    };
                    // préfixe : ne dépile rien
                    p.ops.push(Pile::Unaire(u));
                    continue;
                }

                let b = match op {
                    Op::Plus => Binaire::Add,
                    Op::Minus => Binaire::Sub,
                    Op::Star => Binaire::Mul,
                    Op::Slash => Binaire::Div,
                    Op::Caret => Binaire::Pow,
                };
                p.pousse_binaire(b);
            }

            Tok::Factorial => {
                if !p.prev_was_value {
                    return Err(operande_manquant(pos));
                }
                p.pousse_postfixe(RpnItem::Factorial);
            }

            Tok::Percent => {
                if !p.prev_was_value {
                    return Err(operande_manquant(pos));
                }

                let suivi_d_operande = iter.peek().is_some_and(|s| commence_operande(&s.tok));
                if suivi_d_operande {
                    p.pousse_binaire(Binaire::Mod);
                } else {
                    // les unaires sortent d’abord ; on regarde ensuite l’opérateur en attente
                    p.depile_tant_que(|top| top.precedence() > PREC_POSTFIX);
                    let of_left = p.operateur_en_attente_additif();
                    p.pousse_postfixe(RpnItem::Percent { of_left });
                }
            }
        }
    }

    if p.profondeur != 0 {
        return Err(EngineError::syntax(
            fin_position(tokens),
            "parenthèse non fermée",
        ));
    }
    if !p.prev_was_value {
        return Err(operande_manquant(fin_position(tokens)));
    }

    // vide la pile ops
    while let Some(op) = p.ops.pop() {
        if let Some(item) = op.vers_rpn() {
            p.out.push(item);
        }
    }

    Ok(p.out)
}

/// Position du dernier jeton (pour les erreurs “fin d’entrée”).
fn fin_position(tokens: &[Jeton]) -> usize {
    tokens.last().map_or(0, |j| j.pos)
}

/* ------------------------ Format (debug / journal) ------------------------ */

impl fmt::Display for RpnItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(r) => {
                if r.denom().is_one() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Self::Const(Constante::Pi) => f.write_str("π"),
            Self::Const(Constante::E) => f.write_str("e"),
            Self::Unaire(Unaire::Moins) => f.write_str("neg"),
            Self::Unaire(Unaire::Plus) => f.write_str("pos"),
            Self::Binaire(b) => f.write_str(match b {
                Binaire::Add => "+",
                Binaire::Sub => "-",
                Binaire::Mul => "*",
                Binaire::Div => "/",
                Binaire::Mod => "mod",
                Binaire::Pow => "^",
            }),
            Self::Fonction(g) => f.write_str(g.nom()),
            Self::Percent { of_left: true } => f.write_str("%of"),
            Self::Percent { of_left: false } => f.write_str("%"),
            Self::Factorial => f.write_str("!"),
        }
    }
}

pub fn format_rpn(rpn: &[RpnItem]) -> String {
    rpn.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::jetons::tokenize;

    fn rpn(s: &str) -> String {
        let js = tokenize(s).unwrap_or_else(|e| panic!("tokenize({s:?}) : {e}"));
        let r = to_rpn(&js).unwrap_or_else(|e| panic!("to_rpn({s:?}) : {e}"));
        format_rpn(&r)
    }

    fn syntaxe(s: &str) -> (usize, String) {
        let js = tokenize(s).unwrap_or_else(|e| panic!("tokenize({s:?}) : {e}"));
        match to_rpn(&js) {
            Err(EngineError::SyntaxError { position, reason }) => (position, reason),
            other => panic!("attendu SyntaxError pour {s:?}, obtenu {other:?}"),
        }
    }

    #[test]
    fn precedence_et_groupes() {
        assert_eq!(rpn("2 + 3 * 4"), "2 3 4 * +");
        assert_eq!(rpn("(2 + 3) * 4"), "2 3 + 4 *");
        assert_eq!(rpn("8 - 3 - 2"), "8 3 - 2 -");
        assert_eq!(rpn("2 ^ 3 ^ 2"), "2 3 2 ^ ^");
    }

    #[test]
    fn moins_unaire() {
        assert_eq!(rpn("-3"), "3 neg");
        assert_eq!(rpn("2 * -3"), "2 3 neg *");
        assert_eq!(rpn("(-1)"), "1 neg");
        assert_eq!(rpn("--2"), "2 neg neg");
        assert_eq!(rpn("+2"), "2 pos");
        // unaire (4) plus fort que ^ (3)
        assert_eq!(rpn("-2^2"), "2 neg 2 ^");
        assert_eq!(rpn("sin(-1)"), "1 neg sin");
    }

    #[test]
    fn fonctions() {
        assert_eq!(rpn("sin(pi/2)"), "π 2 / sin");
        assert_eq!(rpn("sqrt(4) + abs(-2)"), "4 sqrt 2 neg abs +");
        assert_eq!(rpn("ln(e)"), "e ln");
    }

    #[test]
    fn pourcentage_et_modulo() {
        assert_eq!(rpn("100 + 10%"), "100 10 %of +");
        assert_eq!(rpn("10 % 3"), "10 3 mod");
        assert_eq!(rpn("50 * 10%"), "50 10 % *");
        assert_eq!(rpn("10%"), "10 %");
        assert_eq!(rpn("200 - (5)%"), "200 5 %of -");
        assert_eq!(rpn("10 % (3)"), "10 3 mod");
    }

    #[test]
    fn factorielle_postfixe() {
        assert_eq!(rpn("5!"), "5 !");
        assert_eq!(rpn("2^3!"), "2 3 ! ^");
        assert_eq!(rpn("3!!"), "3 ! !");
        assert_eq!(rpn("factorial(4)"), "4 factorial");
    }

    #[test]
    fn vide_et_parentheses() {
        assert_eq!(syntaxe("(1 + 2").0, 5);
        assert_eq!(syntaxe("1 + 2)").0, 5);
        assert!(syntaxe("()").1.contains("opérande"));
        assert!(matches!(
            to_rpn(&[]),
            Err(EngineError::SyntaxError { position: 0, .. })
        ));
    }

    #[test]
    fn operande_absent() {
        assert_eq!(syntaxe("1 +").0, 2);
        assert_eq!(syntaxe("* 2").0, 0);
        assert_eq!(syntaxe("2 * / 3").0, 4);
        assert_eq!(syntaxe("!").0, 0);
        assert_eq!(syntaxe("% 3").0, 0);
    }

    #[test]
    fn multiplication_implicite_refusee() {
        assert_eq!(syntaxe("2(3+4)").0, 1);
        assert_eq!(syntaxe("2pi").0, 1);
        assert_eq!(syntaxe("(1)(2)").0, 3);
        assert_eq!(syntaxe("3 sin(1)").0, 2);
        assert_eq!(syntaxe("5! 2").0, 3);
    }

    #[test]
    fn fonction_sans_parenthese() {
        let (pos, raison) = syntaxe("sin 30");
        assert_eq!(pos, 0);
        assert!(raison.contains("sin"));
        assert_eq!(syntaxe("sqrt").0, 0);
    }
}
