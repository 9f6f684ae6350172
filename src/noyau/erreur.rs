// src/noyau/erreur.rs
//
// Taxonomie d’erreurs du noyau
// ----------------------------
// - EngineError : erreur détaillée (position, opération, raison) pour le diagnostic
// - ErrorKind   : genre stable, sans donnée, stocké dans l’historique et
//                 traduit en message fixe par la couche présentation

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("erreur de syntaxe (position {position}) : {reason}")]
    SyntaxError { position: usize, reason: String },

    #[error("domaine invalide pour {operation} : {reason}")]
    DomainError {
        operation: &'static str,
        reason: String,
    },

    #[error("division par zéro")]
    DivisionByZero,

    #[error("dépassement de capacité")]
    OverflowError,

    #[error("précision non atteinte pour {operation}")]
    PrecisionError { operation: &'static str },

    #[error("mémoire vide")]
    EmptyMemoryError,

    #[error("index d’historique hors limites : {index}")]
    IndexOutOfRange { index: usize },
}

/// Genre d’erreur, sans détail. Copiable, comparable, sérialisable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Syntax,
    Domain,
    DivisionByZero,
    Overflow,
    Precision,
    EmptyMemory,
    IndexOutOfRange,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SyntaxError { .. } => ErrorKind::Syntax,
            Self::DomainError { .. } => ErrorKind::Domain,
            Self::DivisionByZero => ErrorKind::DivisionByZero,
            Self::OverflowError => ErrorKind::Overflow,
            Self::PrecisionError { .. } => ErrorKind::Precision,
            Self::EmptyMemoryError => ErrorKind::EmptyMemory,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
        }
    }

    pub(crate) fn syntax(position: usize, reason: impl Into<String>) -> Self {
        Self::SyntaxError {
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn domain(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::DomainError {
            operation,
            reason: reason.into(),
        }
    }
}

impl ErrorKind {
    /// Message affiché à l’utilisateur : un seul texte fixe par genre.
    pub fn message(self) -> &'static str {
        match self {
            Self::Syntax => "Erreur : expression invalide",
            Self::Domain => "Erreur : hors domaine",
            Self::DivisionByZero => "Erreur : division par zéro",
            Self::Overflow => "Erreur : dépassement",
            Self::Precision => "Erreur : précision insuffisante",
            Self::EmptyMemory => "Mémoire vide",
            Self::IndexOutOfRange => "Historique : entrée inexistante",
        }
    }
}
