//! Noyau de calcul
//!
//! Organisation interne :
//! - jetons.rs       : tokenisation (mots-clés, glyphes, positions)
//! - rpn.rs          : shunting-yard, % postfixe / modulo, factorielle
//! - nombre.rs       : NumericValue (rationnel exact), précision, affichage
//! - virgule_fixe.rs : séries en entiers scalés + cache π / ln 2 / ln 10
//! - trig.rs         : mode d’angle, angles spéciaux exacts, séries
//! - fonctions.rs    : √, ln, log, sinh/cosh/tanh, !, ^, modulo, constantes
//! - eval.rs         : pipeline complet (pur, sans état)
//! - memoire.rs      : registre MS/MR/MC/M+/M-
//! - historique.rs   : journal des calculs
//! - erreur.rs       : taxonomie d’erreurs

pub mod erreur;
pub mod eval;
pub mod fonctions;
pub mod historique;
pub mod jetons;
pub mod memoire;
pub mod nombre;
pub mod rpn;
pub mod trig;
pub mod virgule_fixe;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique
pub use erreur::{EngineError, ErrorKind};
pub use eval::{eval_avec_demarche, eval_expression, evaluate, Demarche};
pub use historique::{HistoryEntry, Historique};
pub use memoire::Memoire;
pub use nombre::{NumericValue, Precision};
pub use trig::AngleMode;
