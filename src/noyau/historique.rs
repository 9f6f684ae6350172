//! Journal des calculs.
//!
//! Chaque entrée reçoit un numéro de séquence (`seq`) attribué à partir de 0,
//! jamais réutilisé dans une session. Capacité bornée (FIFO) ou illimitée (0).

use std::collections::VecDeque;

use log::info;

use super::erreur::{EngineError, ErrorKind};
use super::nombre::NumericValue;

/// Capacité par défaut du journal.
pub const CAPACITE_DEFAUT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seq: usize,
    pub expression: String,
    pub outcome: Result<NumericValue, ErrorKind>,
}

#[derive(Clone, Debug)]
pub struct Historique {
    entrees: VecDeque<HistoryEntry>,
    capacite: usize,
    prochain: usize,
}

impl Default for Historique {
    fn default() -> Self {
        Self::with_capacity(CAPACITE_DEFAUT)
    }
}

impl Historique {
    /// `capacite == 0` : illimité.
    pub fn with_capacity(capacite: usize) -> Self {
        Self {
            entrees: VecDeque::new(),
            capacite,
            prochain: 0,
        }
    }

    pub fn capacite(&self) -> usize {
        self.capacite
    }

    /// Seule voie d’écriture. Deux appels => deux entrées.
    pub fn append(
        &mut self,
        expression: impl Into<String>,
        outcome: Result<NumericValue, ErrorKind>,
    ) -> usize {
        let seq = self.prochain;
        self.prochain += 1;

        let entree = HistoryEntry {
            seq,
            expression: expression.into(),
            outcome,
        };
        match &entree.outcome {
            Ok(v) => info!("historique #{seq} : {} = {v}", entree.expression),
            Err(k) => info!("historique #{seq} : {} -> {k:?}", entree.expression),
        }
        self.entrees.push_back(entree);

        if self.capacite > 0 {
            while self.entrees.len() > self.capacite {
                self.entrees.pop_front();
            }
        }
        seq
    }

    /// Copie de l’entrée `seq` (IndexOutOfRange si inconnue ou évincée).
    pub fn recall(&self, seq: usize) -> Result<HistoryEntry, EngineError> {
        let premier = self
            .entrees
            .front()
            .map_or(self.prochain, |e| e.seq);
        if seq < premier {
            return Err(EngineError::IndexOutOfRange { index: seq });
        }
        self.entrees
            .get(seq - premier)
            .cloned()
            .ok_or(EngineError::IndexOutOfRange { index: seq })
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entrees.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }

    /// Vide le journal ; la numérotation continue.
    pub fn clear(&mut self) {
        self.entrees.clear();
        info!("historique effacé");
    }
}
