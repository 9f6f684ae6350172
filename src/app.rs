// src/app.rs
//
// Calculatrice : module App (racine)
// ----------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + console.rs)
// - Ré-exporter Console et Calculatrice (pour main.rs)

pub mod console;
pub mod etat;

pub use console::{Calculatrice, Commande, Sortie};
pub use etat::Console;
