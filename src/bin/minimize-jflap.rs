use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use automata_minimize::{
    jflap::{JflapDfa, JflapError, JflapVersion},
    prelude::*,
};
use clap::{Arg, ArgMatches, Command};
use thiserror::Error;
use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

fn cli() -> Command {
    Command::new("minimize-jflap")
        .about("Reads a deterministic automaton from a JFLAP file and prints the transition table of its minimal equivalent")
        .arg(
            Arg::new("path")
                .help("JFLAP file to read, asked for interactively if absent")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("jflap-version")
                .long("jflap-version")
                .help("layout of the file (6 or 8), detected from the content if absent")
                .value_parser(|s: &str| s.parse::<JflapVersion>()),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let Ok(Some(verbosity)) = matches.try_get_one::<String>("verbosity") else {
        return;
    };

    let level = match verbosity.as_str() {
        "trace" => filter::LevelFilter::TRACE,
        "debug" => filter::LevelFilter::DEBUG,
        "info" => filter::LevelFilter::INFO,
        _ => unreachable!(),
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

#[derive(Debug, Error)]
enum FrontendError {
    #[error("an empty path is not allowed")]
    EmptyPath,
    #[error("could not interact with the terminal: {0}")]
    Io(#[from] io::Error),
    #[error("problem reading {}: {error}", .path.display())]
    Parse { path: PathBuf, error: JflapError },
}

fn ask_for_path<R: BufRead, W: Write>(input: &mut R, notices: &mut W) -> io::Result<PathBuf> {
    write!(notices, "JFLAP automaton: ")?;
    notices.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

/// Loads the automaton at `given`, or at a path read from `input`. A path that does not exist is reported on
/// `notices` and asked for again, an empty path or a file that cannot be parsed ends the interaction.
fn load<R: BufRead, W: Write>(
    mut given: Option<PathBuf>,
    version: Option<JflapVersion>,
    input: &mut R,
    notices: &mut W,
) -> Result<JflapDfa, FrontendError> {
    loop {
        let path = match given.take() {
            Some(path) => path,
            None => ask_for_path(input, notices)?,
        };
        if path.as_os_str().is_empty() {
            return Err(FrontendError::EmptyPath);
        }

        debug!("loading automaton from {}", path.display());
        let loaded = match version {
            Some(version) => JflapDfa::from_file_with_version(&path, version),
            None => JflapDfa::from_file(&path),
        };
        match loaded {
            Ok(dfa) => return Ok(dfa),
            Err(JflapError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                writeln!(notices, "could not find {}, please try again", path.display())?;
            }
            Err(error) => return Err(FrontendError::Parse { path, error }),
        }
    }
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();

    setup_logging(&matches);

    let given = matches.get_one::<PathBuf>("path").cloned();
    let version = matches.get_one::<JflapVersion>("jflap-version").copied();

    let dfa = match load(given, version, &mut io::stdin().lock(), &mut io::stderr()) {
        Ok(dfa) => dfa,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let start = std::time::Instant::now();
    let minimized = minimize(&dfa);
    info!(
        "minimized {} states to {} in {}µs",
        dfa.size(),
        minimized.size(),
        start.elapsed().as_micros()
    );
    println!("{}", minimized.transition_table());
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn asks_again_for_missing_files() {
        let answer = format!("{}\n", fixture("redundant_v6.jff").display());
        let mut notices = vec![];
        let dfa = load(
            Some(fixture("nowhere.jff")),
            None,
            &mut answer.as_bytes(),
            &mut notices,
        )
        .unwrap();
        assert_eq!(dfa.size(), 4);

        let notices = String::from_utf8(notices).unwrap();
        assert!(notices.starts_with("could not find"));
        assert!(notices.ends_with("JFLAP automaton: "));
    }

    #[test]
    fn empty_path_ends_interaction() {
        let mut notices = vec![];
        let err = load(None, None, &mut "\n".as_bytes(), &mut notices).unwrap_err();
        assert!(matches!(err, FrontendError::EmptyPath));
        // end of input counts as an empty answer
        let err = load(None, None, &mut "".as_bytes(), &mut notices).unwrap_err();
        assert!(matches!(err, FrontendError::EmptyPath));
    }

    #[test]
    fn parse_errors_end_interaction() {
        let mut notices = vec![];
        let err = load(
            Some(fixture("lambda_v6.jff")),
            None,
            &mut "".as_bytes(),
            &mut notices,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FrontendError::Parse {
                error: JflapError::EmptySymbol { .. },
                ..
            }
        ));
        assert!(err.to_string().starts_with("problem reading"));
        assert!(notices.is_empty());
    }

    #[test]
    fn version_argument() {
        let matches = cli()
            .try_get_matches_from(["minimize-jflap", "file.jff", "--jflap-version", "8"])
            .unwrap();
        assert_eq!(
            matches.get_one::<JflapVersion>("jflap-version"),
            Some(&JflapVersion::V8)
        );
        assert!(cli()
            .try_get_matches_from(["minimize-jflap", "--jflap-version", "7"])
            .is_err());
    }
}
