//! Boucle console : commandes de la calculatrice sur une session.
//!
//! Une ligne = une commande (`ms`, `mr`, `hist`…) ou une expression.
//! L’état affiché vit dans [`Console`] ; ici on ne fait que le relier à la
//! [`Session`] et aux flux d’entrée / sortie.

use std::io::{self, BufRead, Write};

use crate::noyau::{AngleMode, EngineError, HistoryEntry, NumericValue};
use crate::session::Session;

use super::etat::Console;

/// Commandes reconnues (insensibles à la casse).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Commande {
    Evaluer(String),
    MemoireStocke,
    MemoireRappel,
    MemoireEfface,
    MemoirePlus,
    MemoireMoins,
    /// `hist` : tout le journal ; `hist N` : l’entrée N.
    Historique(Option<usize>),
    EffaceHistorique,
    /// C : efface l’entrée, l’écran garde le résultat.
    EffaceEntree,
    /// CLR : efface résultat, erreur et démarche.
    EffaceResultats,
    ToutEffacer,
    Mode(Option<AngleMode>),
    Demarche,
    Quitter,
}

impl Commande {
    /// None pour une ligne vide.
    pub fn analyse(ligne: &str) -> Option<Self> {
        let l = ligne.trim();
        if l.is_empty() {
            return None;
        }
        let mut mots = l.split_whitespace();
        let tete = mots.next().unwrap_or_default().to_lowercase();
        let arg = mots.next();
        let seul = arg.is_none();

        let cmd = match tete.as_str() {
            "ms" if seul => Self::MemoireStocke,
            "mr" if seul => Self::MemoireRappel,
            "mc" if seul => Self::MemoireEfface,
            "m+" if seul => Self::MemoirePlus,
            "m-" if seul => Self::MemoireMoins,
            "hist" => match arg.map(str::parse::<usize>) {
                None => Self::Historique(None),
                Some(Ok(n)) => Self::Historique(Some(n)),
                Some(Err(_)) => Self::Evaluer(l.to_string()),
            },
            "clear" if seul => Self::EffaceHistorique,
            "c" if seul => Self::EffaceEntree,
            "clr" if seul => Self::EffaceResultats,
            "ac" if seul => Self::ToutEffacer,
            "deg" if seul => Self::Mode(Some(AngleMode::Degrees)),
            "rad" if seul => Self::Mode(Some(AngleMode::Radians)),
            "mode" if seul => Self::Mode(None),
            "demarche" | "démarche" if seul => Self::Demarche,
            "quit" | "exit" | "q" if seul => Self::Quitter,
            _ => Self::Evaluer(l.to_string()),
        };
        Some(cmd)
    }
}

/// Ce que la boucle doit faire après une commande.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sortie {
    Texte(String),
    Quitter,
}

pub struct Calculatrice {
    session: Session,
    ecran: Console,
    dernier: Option<NumericValue>,
}

impl Calculatrice {
    pub fn new(session: Session) -> Self {
        let ecran = Console::new(session.default_mode());
        Self {
            session,
            ecran,
            dernier: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn ecran(&self) -> &Console {
        &self.ecran
    }

    fn affiche(&self, v: &NumericValue) -> String {
        self.session.display(v)
    }

    fn erreur(&mut self, e: &EngineError) -> Sortie {
        self.ecran.set_erreur(e.kind().message());
        Sortie::Texte(self.ecran.ecran().to_string())
    }

    /// Ligne d’état suivie de ce que l’écran montre encore.
    fn etat_ecran(&self) -> String {
        let ecran = self.ecran.ecran();
        if ecran.is_empty() {
            self.ecran.indicateurs()
        } else {
            format!("{} {ecran}", self.ecran.indicateurs())
        }
    }

    /// Valeur courante pour MS / M+ / M- : le dernier résultat.
    fn valeur_courante(&self) -> Option<NumericValue> {
        self.dernier.clone()
    }

    fn ligne_historique(&self, e: &HistoryEntry) -> String {
        match &e.outcome {
            Ok(v) => format!("#{} {} = {}", e.seq, e.expression, self.affiche(v)),
            Err(k) => format!("#{} {} -> {}", e.seq, e.expression, k.message()),
        }
    }

    pub fn execute(&mut self, cmd: Commande) -> Sortie {
        let texte = match cmd {
            Commande::Evaluer(expr) => {
                self.ecran.entree = expr.clone();
                match self.session.evaluate_detaille(&expr, self.ecran.mode) {
                    Ok((v, d)) => {
                        let txt = self.affiche(&v);
                        self.ecran.set_resultat(txt.clone(), d);
                        self.dernier = Some(v);
                        txt
                    }
                    Err(e) => return self.erreur(&e),
                }
            }

            Commande::MemoireStocke | Commande::MemoirePlus | Commande::MemoireMoins => {
                let Some(v) = self.valeur_courante() else {
                    return Sortie::Texte("aucun résultat à mémoriser".into());
                };
                let res = match cmd {
                    Commande::MemoireStocke => {
                        self.session.memory_store(v);
                        Ok(())
                    }
                    Commande::MemoirePlus => self.session.memory_add(&v),
                    _ => self.session.memory_subtract(&v),
                };
                if let Err(e) = res {
                    return self.erreur(&e);
                }
                self.ecran.memoire = self.session.memory_is_set();
                self.ecran.indicateurs()
            }

            Commande::MemoireRappel => match self.session.memory_recall() {
                Ok(v) => {
                    let txt = self.affiche(&v);
                    self.ecran.set_resultat(txt.clone(), Default::default());
                    self.dernier = Some(v);
                    txt
                }
                Err(e) => return self.erreur(&e),
            },

            Commande::MemoireEfface => {
                self.session.memory_clear();
                self.ecran.memoire = false;
                self.ecran.indicateurs()
            }

            Commande::Historique(None) => {
                let lignes: Vec<String> = self
                    .session
                    .history_entries()
                    .iter()
                    .map(|e| self.ligne_historique(e))
                    .collect();
                if lignes.is_empty() {
                    "historique vide".to_string()
                } else {
                    lignes.join("\n")
                }
            }

            Commande::Historique(Some(seq)) => match self.session.history_recall(seq) {
                Ok(e) => self.ligne_historique(&e),
                Err(e) => return self.erreur(&e),
            },

            Commande::EffaceHistorique => {
                self.session.history_clear();
                "historique effacé".to_string()
            }

            Commande::EffaceEntree => {
                self.ecran.clear_entree();
                self.etat_ecran()
            }

            Commande::EffaceResultats => {
                self.ecran.clear_resultats();
                self.dernier = None;
                self.etat_ecran()
            }

            Commande::ToutEffacer => {
                self.session.reset();
                self.ecran.reset_total();
                self.dernier = None;
                self.ecran.indicateurs()
            }

            Commande::Mode(m) => {
                self.ecran.mode = m.unwrap_or_else(|| self.ecran.mode.toggle());
                self.session.set_default_mode(self.ecran.mode);
                self.ecran.indicateurs()
            }

            Commande::Demarche => {
                let d = &self.ecran.demarche;
                if d.jetons.is_empty() {
                    "aucune démarche".to_string()
                } else {
                    format!("jetons : {}\nrpn    : {}", d.jetons, d.rpn)
                }
            }

            Commande::Quitter => return Sortie::Quitter,
        };
        Sortie::Texte(texte)
    }

    /// Boucle lecture / exécution jusqu’à `quit` ou fin d’entrée.
    pub fn repl<R: BufRead, W: Write>(&mut self, entree: R, mut sortie: W) -> io::Result<()> {
        writeln!(sortie, "{}", self.ecran.indicateurs())?;
        for ligne in entree.lines() {
            let ligne = ligne?;
            let Some(cmd) = Commande::analyse(&ligne) else {
                continue;
            };
            match self.execute(cmd) {
                Sortie::Texte(t) => writeln!(sortie, "{t}")?,
                Sortie::Quitter => break,
            }
        }
        sortie.flush()
    }
}
