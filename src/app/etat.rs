//! src/app/etat.rs
//!
//! État de l’affichage (sans I/O, sans noyau).
//!
//! Rôle : contenir ce qu’un écran de calculatrice montre (entrée, résultat,
//! erreur, démarche, indicateurs M / DEG / RAD) et offrir les actions C / CLR / AC.
//!
//! Contrats :
//! - Aucune évaluation ici.
//! - Actions déterministes, sans effet de bord caché.

use crate::noyau::{AngleMode, Demarche};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Console {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub resultat: String, // dernier résultat affiché
    pub erreur: String,   // message fixe de l’erreur courante

    // --- démarche (jetons + RPN du dernier calcul réussi) ---
    pub demarche: Demarche,

    // --- indicateurs ---
    pub memoire: bool,
    pub mode: AngleMode,
}

impl Console {
    pub fn new(mode: AngleMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// AC : remise à zéro totale (entrée + résultats + indicateur mémoire).
    /// Le mode d’angle est conservé.
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
        self.memoire = false;
    }

    /// C : effacer seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
    }

    /// CLR : effacer résultat + erreur + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.resultat.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
    }

    /// Place une erreur.
    ///
    /// Le dernier résultat reste affiché ; la démarche, elle, n’est plus valable.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
    }

    pub fn set_resultat(&mut self, resultat: impl Into<String>, demarche: Demarche) {
        self.erreur.clear();
        self.resultat = resultat.into();
        self.demarche = demarche;
    }

    /// Ligne d’état : "[DEG] [M]".
    pub fn indicateurs(&self) -> String {
        if self.memoire {
            format!("[{}] [M]", self.mode.label())
        } else {
            format!("[{}]", self.mode.label())
        }
    }

    /// Ce que l’écran montre : l’erreur si présente, sinon le résultat.
    pub fn ecran(&self) -> &str {
        if self.erreur.is_empty() {
            &self.resultat
        } else {
            &self.erreur
        }
    }
}
