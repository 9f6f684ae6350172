// src/journal.rs
//
// Sortie du journal sur stderr
// ----------------------------
// La bibliothèque n’écrit que via la façade `log` ; seul le binaire installe
// cette sortie. Niveau choisi par le nombre de -v.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

struct Stderr {
    niveau: LevelFilter,
}

impl Log for Stderr {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.niveau
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        // stderr fermé : rien à faire
        let _ = writeln!(err, "[{:<5}] {}", record.level(), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// 0 -> warn, 1 -> info, 2 -> debug, 3+ -> trace.
pub fn niveau_depuis_verbosite(v: u8) -> LevelFilter {
    match v {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installe la sortie stderr (une seule fois par processus).
pub fn installe(verbosite: u8) -> Result<(), SetLoggerError> {
    let niveau = niveau_depuis_verbosite(verbosite);
    log::set_boxed_logger(Box::new(Stderr { niveau }))?;
    log::set_max_level(niveau);
    Ok(())
}
