// src/main.rs
//
// Calculatrice : point d’entrée console
// ------------------------------------
// - Expressions en arguments : évaluées dans l’ordre, code 1 si l’une échoue
// - Sans argument : boucle interactive sur stdin

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::error;

use calculatrice_sci::app::Calculatrice;
use calculatrice_sci::{journal, AngleMode, Loader, Session};

/// Calculatrice scientifique en précision décimale exacte.
#[derive(Parser, Debug)]
#[command(name = "calculatrice", version, about, long_about = None)]
struct Args {
    /// Expressions à évaluer (boucle interactive si aucune).
    expressions: Vec<String>,

    /// Angles en radians.
    #[arg(long, conflicts_with = "deg")]
    rad: bool,

    /// Angles en degrés (défaut).
    #[arg(long)]
    deg: bool,

    /// Fichier de configuration TOML superposé aux défauts.
    #[arg(short, long, value_name = "FICHIER")]
    config: Option<PathBuf>,

    /// Verbosité du journal (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = journal::installe(args.verbose) {
        eprintln!("journal indisponible : {e}");
    }

    let mut loader = Loader::new();
    if let Some(chemin) = &args.config {
        loader = loader.with_file(chemin);
    }
    let config = match loader.build() {
        Ok(c) => c,
        Err(e) => {
            error!("configuration invalide : {e}");
            eprintln!("configuration invalide : {e}");
            return ExitCode::from(2);
        }
    };

    let mut session = Session::new(config);
    if args.rad {
        session.set_default_mode(AngleMode::Radians);
    } else if args.deg {
        session.set_default_mode(AngleMode::Degrees);
    }

    if args.expressions.is_empty() {
        let mut calc = Calculatrice::new(session);
        let stdin = io::stdin();
        return match calc.repl(stdin.lock(), io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("erreur d’entrée / sortie : {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut echec = false;
    for expr in &args.expressions {
        match session.evaluate_default(expr) {
            Ok(v) => println!("{}", session.display(&v)),
            Err(e) => {
                echec = true;
                println!("{}", e.kind().message());
            }
        }
    }

    if echec {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
