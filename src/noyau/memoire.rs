// src/noyau/memoire.rs
//
// Registre mémoire (MS / MR / MC / M+ / M-)
// -----------------------------------------
// - Vide au départ : MR sur registre vide => EmptyMemoryError (jamais 0 implicite)
// - M+ / M- sur registre vide : initialise à v / -v
// - M+ / M- hors plage d’exposant : OverflowError, registre inchangé

use log::info;

use super::erreur::EngineError;
use super::nombre::{NumericValue, Precision};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memoire {
    valeur: Option<NumericValue>,
    max_exponent: u32,
}

impl Default for Memoire {
    fn default() -> Self {
        Self::with_max_exponent(Precision::default().max_exponent)
    }
}

impl Memoire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_exponent(max_exponent: u32) -> Self {
        Self {
            valeur: None,
            max_exponent,
        }
    }

    /// MS : écrase le registre, renvoie l’ancienne valeur.
    pub fn store(&mut self, v: NumericValue) -> Option<NumericValue> {
        info!("mémoire : stockage {v}");
        self.valeur.replace(v)
    }

    /// MR
    pub fn recall(&self) -> Result<NumericValue, EngineError> {
        self.valeur.clone().ok_or(EngineError::EmptyMemoryError)
    }

    /// MC
    pub fn clear(&mut self) {
        info!("mémoire effacée");
        self.valeur = None;
    }

    /// M+
    pub fn add(&mut self, v: &NumericValue) -> Result<(), EngineError> {
        let nouvelle = match &self.valeur {
            Some(m) => NumericValue::from_rational(m.as_rational() + v.as_rational()),
            None => v.clone(),
        };
        self.remplace(nouvelle, '+')
    }

    /// M-
    pub fn subtract(&mut self, v: &NumericValue) -> Result<(), EngineError> {
        let nouvelle = match &self.valeur {
            Some(m) => NumericValue::from_rational(m.as_rational() - v.as_rational()),
            None => -v.clone(),
        };
        self.remplace(nouvelle, '-')
    }

    fn remplace(&mut self, nouvelle: NumericValue, op: char) -> Result<(), EngineError> {
        let nouvelle = nouvelle.verifie_plage(self.max_exponent)?;
        info!("mémoire {op} : {nouvelle}");
        self.valeur = Some(nouvelle);
        Ok(())
    }

    /// Indicateur « M » de l’affichage.
    pub fn is_set(&self) -> bool {
        self.valeur.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> NumericValue {
        s.parse().unwrap()
    }

    #[test]
    fn vide_au_depart() {
        let m = Memoire::new();
        assert!(!m.is_set());
        assert_eq!(m.recall(), Err(EngineError::EmptyMemoryError));
    }

    #[test]
    fn store_renvoie_l_ancienne_valeur() {
        let mut m = Memoire::new();
        assert_eq!(m.store(v("42")), None);
        assert_eq!(m.store(v("7")), Some(v("42")));
        assert_eq!(m.recall(), Ok(v("7")));
    }

    #[test]
    fn add_et_subtract() {
        let mut m = Memoire::new();
        m.subtract(&v("2.5")).unwrap();
        assert_eq!(m.recall(), Ok(v("-2.5")));
        m.add(&v("10")).unwrap();
        assert_eq!(m.recall(), Ok(v("7.5")));

        let mut n = Memoire::new();
        n.add(&v("3")).unwrap();
        assert_eq!(n.recall(), Ok(v("3")));
    }

    #[test]
    fn cumul_hors_plage_refuse() {
        let mut m = Memoire::new();
        m.add(&v("9E+9999")).unwrap();
        assert_eq!(m.add(&v("9E+9999")), Err(EngineError::OverflowError));
        assert_eq!(m.recall(), Ok(v("9E+9999")));

        assert_eq!(m.subtract(&v("-9E+9999")), Err(EngineError::OverflowError));
        assert_eq!(m.recall(), Ok(v("9E+9999")));

        let mut petite = Memoire::with_max_exponent(100);
        assert_eq!(petite.add(&v("1E+101")), Err(EngineError::OverflowError));
        assert!(!petite.is_set());
    }

    #[test]
    fn clear_vide_le_registre() {
        let mut m = Memoire::new();
        m.store(v("1"));
        m.clear();
        assert!(!m.is_set());
        assert_eq!(m.recall(), Err(EngineError::EmptyMemoryError));
    }
}
