//! Calculatrice scientifique : noyau d’évaluation exact, session
//! (mémoire + historique), configuration et console.

pub mod app;
pub mod config;
pub mod journal;
pub mod noyau;
pub mod session;

pub use config::{load_defaults, EngineConfig, Loader};
pub use noyau::{evaluate, AngleMode, EngineError, ErrorKind, NumericValue, Precision};
pub use session::Session;
