// src/noyau/jetons.rs
//
// Tokenisation paresseuse : texte -> jetons positionnés
// -----------------------------------------------------
// - nombres décimaux exacts (au plus un '.', ".5" accepté)
// - mots-clés (fonctions / constantes) insensibles à la casse, lus en entier
// - glyphes : π, √, ×, ÷, − (U+2212)
// - '%' reste un seul jeton : percent ou modulo, c’est le parseur qui tranche

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

use super::erreur::EngineError;
use super::nombre::pow10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Log,
    Ln,
    Sqrt,
    Abs,
    Factorial,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constante {
    Pi,
    E,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Op(Op),
    Fonction(Fonction),
    Const(Constante),
    LPar,
    RPar,
    Percent,
    Factorial,
}

/// Jeton + position (index de caractère dans l’entrée).
#[derive(Clone, Debug, PartialEq)]
pub struct Jeton {
    pub tok: Tok,
    pub pos: usize,
}

impl Fonction {
    pub fn nom(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Log => "log",
            Self::Ln => "ln",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Factorial => "factorial",
        }
    }
}

/// Table fixe des mots-clés.
fn mot_cle(w: &str) -> Option<Tok> {
    let t = match w {
        "sin" => Tok::Fonction(Fonction::Sin),
        "cos" => Tok::Fonction(Fonction::Cos),
        "tan" => Tok::Fonction(Fonction::Tan),
        "asin" => Tok::Fonction(Fonction::Asin),
        "acos" => Tok::Fonction(Fonction::Acos),
        "atan" => Tok::Fonction(Fonction::Atan),
        "sinh" => Tok::Fonction(Fonction::Sinh),
        "cosh" => Tok::Fonction(Fonction::Cosh),
        "tanh" => Tok::Fonction(Fonction::Tanh),
        "log" => Tok::Fonction(Fonction::Log),
        "ln" => Tok::Fonction(Fonction::Ln),
        "sqrt" => Tok::Fonction(Fonction::Sqrt),
        "abs" => Tok::Fonction(Fonction::Abs),
        "factorial" => Tok::Fonction(Fonction::Factorial),
        "pi" => Tok::Const(Constante::Pi),
        "e" => Tok::Const(Constante::E),
        _ => return None,
    };
    Some(t)
}

/* ------------------------ Itérateur ------------------------ */

/// Suite paresseuse de jetons. S’arrête définitivement après la première erreur.
pub struct Jetons {
    chars: Vec<char>,
    i: usize,
    fini: bool,
}

impl Jetons {
    pub fn new(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
            i: 0,
            fini: false,
        }
    }

    /// Nombre : chiffres et au plus un '.'.
    fn lire_nombre(&mut self) -> Result<Jeton, EngineError> {
        let start = self.i;
        let mut ent = String::new();
        let mut frac = String::new();
        let mut point = false;

        while self.i < self.chars.len() {
            let c = self.chars[self.i];
            if c.is_ascii_digit() {
                if point {
                    frac.push(c);
                } else {
                    ent.push(c);
                }
            } else if c == '.' {
                if point {
                    return Err(EngineError::syntax(
                        self.i,
                        "deux points décimaux dans un nombre",
                    ));
                }
                point = true;
            } else {
                break;
            }
            self.i += 1;
        }

        if ent.is_empty() && frac.is_empty() {
            return Err(EngineError::syntax(start, "nombre invalide: '.'"));
        }

        let texte = format!("{ent}{frac}");
        let n = BigInt::parse_bytes(texte.as_bytes(), 10)
            .ok_or_else(|| EngineError::syntax(start, "nombre invalide"))?;
        let r = if frac.is_empty() {
            BigRational::from_integer(n)
        } else {
            BigRational::new(n, pow10(frac.len()))
        };

        Ok(Jeton {
            tok: Tok::Num(r),
            pos: start,
        })
    }

    /// Identifiant [a-zA-Z]+ lu en entier, puis cherché dans la table.
    fn lire_mot(&mut self) -> Result<Jeton, EngineError> {
        let start = self.i;
        while self.i < self.chars.len() && self.chars[self.i].is_ascii_alphabetic() {
            self.i += 1;
        }
        let word: String = self.chars[start..self.i].iter().collect();
        let w = word.to_lowercase();

        mot_cle(&w)
            .map(|tok| Jeton { tok, pos: start })
            .ok_or_else(|| EngineError::syntax(start, format!("identifiant inconnu: '{word}'")))
    }
}

impl Iterator for Jetons {
    type Item = Result<Jeton, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fini {
            return None;
        }

        while self.i < self.chars.len() && self.chars[self.i].is_whitespace() {
            self.i += 1;
        }
        if self.i >= self.chars.len() {
            self.fini = true;
            return None;
        }

        let c = self.chars[self.i];
        let pos = self.i;

        let simple = match c {
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            '+' => Some(Tok::Op(Op::Plus)),
            '-' | '−' => Some(Tok::Op(Op::Minus)),
            '*' | '×' => Some(Tok::Op(Op::Star)),
            '/' | '÷' => Some(Tok::Op(Op::Slash)),
            '^' => Some(Tok::Op(Op::Caret)),
            '%' => Some(Tok::Percent),
            '!' => Some(Tok::Factorial),
            'π' => Some(Tok::Const(Constante::Pi)),
            '√' => Some(Tok::Fonction(Fonction::Sqrt)),
            _ => None,
        };

        let res = if let Some(tok) = simple {
            self.i += 1;
            Ok(Jeton { tok, pos })
        } else if c.is_ascii_digit() || c == '.' {
            self.lire_nombre()
        } else if c.is_ascii_alphabetic() {
            self.lire_mot()
        } else {
            Err(EngineError::syntax(pos, format!("caractère inattendu: '{c}'")))
        };

        if res.is_err() {
            self.fini = true;
        }
        Some(res)
    }
}

/// Tokenize une chaîne complète.
pub fn tokenize(s: &str) -> Result<Vec<Jeton>, EngineError> {
    Jetons::new(s).collect()
}

/* ------------------------ Format (debug / journal) ------------------------ */

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Num(r) => {
                if r.denom().is_one() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Tok::Op(Op::Plus) => f.write_str("+"),
            Tok::Op(Op::Minus) => f.write_str("-"),
            Tok::Op(Op::Star) => f.write_str("*"),
            Tok::Op(Op::Slash) => f.write_str("/"),
            Tok::Op(Op::Caret) => f.write_str("^"),
            Tok::Fonction(g) => f.write_str(g.nom()),
            Tok::Const(Constante::Pi) => f.write_str("π"),
            Tok::Const(Constante::E) => f.write_str("e"),
            Tok::LPar => f.write_str("("),
            Tok::RPar => f.write_str(")"),
            Tok::Percent => f.write_str("%"),
            Tok::Factorial => f.write_str("!"),
        }
    }
}

/// Liste de jetons en texte.
pub fn format_tokens(tokens: &[Jeton]) -> String {
    tokens
        .iter()
        .map(|j| j.tok.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
