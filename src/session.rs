//! Session de calcul : mémoire + historique + configuration.
//!
//! Le noyau reste pur ; tout l’état mutable d’une calculatrice vit ici, dans
//! une valeur possédée par l’appelant (une session par utilisateur). Aucune
//! synchronisation interne : un seul appelant à la fois.

use log::warn;

use crate::config::EngineConfig;
use crate::noyau::{
    eval_avec_demarche, AngleMode, Demarche, EngineError, ErrorKind, HistoryEntry, Historique,
    Memoire, NumericValue,
};

#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    memoire: Memoire,
    historique: Historique,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.clamped();
        let historique = Historique::with_capacity(config.history.capacity);
        let memoire = Memoire::with_max_exponent(config.precision.max_exponent);
        Self {
            config,
            memoire,
            historique,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn default_mode(&self) -> AngleMode {
        self.config.angle.default_mode
    }

    pub fn set_default_mode(&mut self, mode: AngleMode) {
        self.config.angle.default_mode = mode;
    }

    /* ------------------------ Évaluation ------------------------ */

    /// Évalue puis consigne le résultat (valeur ou genre d’erreur) dans l’historique.
    /// La mémoire n’est jamais touchée, même en cas d’échec.
    pub fn evaluate(&mut self, expr: &str, mode: AngleMode) -> Result<NumericValue, EngineError> {
        self.evaluate_detaille(expr, mode).map(|(v, _)| v)
    }

    pub fn evaluate_default(&mut self, expr: &str) -> Result<NumericValue, EngineError> {
        self.evaluate(expr, self.default_mode())
    }

    /// Comme [`Session::evaluate`], avec les jetons et la RPN.
    pub fn evaluate_detaille(
        &mut self,
        expr: &str,
        mode: AngleMode,
    ) -> Result<(NumericValue, Demarche), EngineError> {
        let res = eval_avec_demarche(expr, mode, &self.config.precision);
        let outcome = match &res {
            Ok((v, _)) => Ok(v.clone()),
            Err(e) => {
                warn!("évaluation échouée ({mode}) « {expr} » : {e}");
                Err(e.kind())
            }
        };
        self.historique.append(expr.trim(), outcome);
        res
    }

    /// Texte d’affichage selon `display_digits`.
    pub fn display(&self, v: &NumericValue) -> String {
        v.to_display(self.config.precision.display_digits)
    }

    /* ------------------------ Mémoire ------------------------ */

    pub fn memory_store(&mut self, v: NumericValue) -> Option<NumericValue> {
        self.memoire.store(v)
    }

    pub fn memory_recall(&self) -> Result<NumericValue, EngineError> {
        self.memoire.recall()
    }

    pub fn memory_clear(&mut self) {
        self.memoire.clear();
    }

    /// M+ ; OverflowError si la somme sort de la plage, mémoire inchangée.
    pub fn memory_add(&mut self, v: &NumericValue) -> Result<(), EngineError> {
        self.memoire.add(v)
    }

    pub fn memory_subtract(&mut self, v: &NumericValue) -> Result<(), EngineError> {
        self.memoire.subtract(v)
    }

    pub fn memory_is_set(&self) -> bool {
        self.memoire.is_set()
    }

    /* ------------------------ Historique ------------------------ */

    pub fn history_append(
        &mut self,
        expression: impl Into<String>,
        outcome: Result<NumericValue, ErrorKind>,
    ) -> usize {
        self.historique.append(expression, outcome)
    }

    pub fn history_recall(&self, seq: usize) -> Result<HistoryEntry, EngineError> {
        self.historique.recall(seq)
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.historique.entries()
    }

    pub fn history_len(&self) -> usize {
        self.historique.len()
    }

    pub fn history_clear(&mut self) {
        self.historique.clear();
    }

    /// Mémoire et historique remis à zéro ; la configuration est conservée.
    pub fn reset(&mut self) {
        self.memoire.clear();
        self.historique.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echec_consigne_sans_toucher_la_memoire() {
        let mut s = Session::default();
        s.memory_store(NumericValue::from_integer(9));

        assert_eq!(
            s.evaluate("5 / 0", AngleMode::Degrees),
            Err(EngineError::DivisionByZero)
        );
        assert_eq!(s.memory_recall(), Ok(NumericValue::from_integer(9)));

        let e = s.history_recall(0).unwrap();
        assert_eq!(e.expression, "5 / 0");
        assert_eq!(e.outcome, Err(ErrorKind::DivisionByZero));
    }

    #[test]
    fn mode_par_defaut() {
        let mut s = Session::default();
        assert_eq!(s.evaluate_default("sin(90)").unwrap(), NumericValue::one());
        s.set_default_mode(AngleMode::Radians);
        assert_eq!(s.evaluate_default("cos(0)").unwrap(), NumericValue::one());
        assert_eq!(s.history_len(), 2);
    }

    #[test]
    fn capacite_configuree() {
        let mut cfg = EngineConfig::default();
        cfg.history.capacity = 2;
        let mut s = Session::new(cfg);
        for e in ["1", "2", "3"] {
            s.evaluate_default(e).unwrap();
        }
        let seqs: Vec<usize> = s.history_entries().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn memoire_bornee_par_la_config() {
        let mut cfg = EngineConfig::default();
        cfg.precision.max_exponent = 100;
        let mut s = Session::new(cfg);
        let grand = s.evaluate_default("9 * 10 ^ 100").unwrap();
        s.memory_add(&grand).unwrap();
        assert_eq!(s.memory_add(&grand), Err(EngineError::OverflowError));
        assert_eq!(s.memory_recall(), Ok(grand));
    }

    #[test]
    fn reset_complet() {
        let mut s = Session::default();
        s.evaluate_default("1 + 1").unwrap();
        s.memory_add(&NumericValue::one()).unwrap();
        s.reset();
        assert_eq!(s.history_len(), 0);
        assert!(!s.memory_is_set());
    }
}
