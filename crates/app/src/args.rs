use std::fmt;
use std::path::{Path, PathBuf};

use recall_core::model::CourseId;

pub const DEFAULT_DB_URL: &str = "sqlite://data/recall.sqlite3";
pub const DEFAULT_QUESTIONS: usize = 10;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidCourse { raw: String },
    InvalidQuestions { raw: String },
    MissingCourse { command: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidCourse { raw } => write!(f, "invalid --course value: {raw:?}"),
            ArgsError::InvalidQuestions { raw } => {
                write!(f, "invalid --questions value: {raw} (expected a positive number)")
            }
            ArgsError::MissingCourse { command } => write!(f, "{command} requires --course"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quiz,
    Stats,
    Generate,
    Seed,
    DbInit,
    DbReset,
    Help,
}

impl Command {
    fn name(self) -> &'static str {
        match self {
            Command::Quiz => "quiz",
            Command::Stats => "stats",
            Command::Generate => "generate",
            Command::Seed => "seed",
            Command::DbInit => "db init",
            Command::DbReset => "db reset",
            Command::Help => "help",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub course: Option<CourseId>,
    pub questions: usize,
    pub verbose: bool,
}

impl Args {
    /// Parse the process arguments, with `RECALL_*` variables as defaults.
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Parse `argv` (without the program name); `env` supplies defaults.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter();

        let mut db_url = env("RECALL_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| normalize_sqlite_url(DEFAULT_DB_URL.into()), normalize_sqlite_url);
        let mut course = env("RECALL_COURSE")
            .filter(|value| !value.trim().is_empty())
            .map(parse_course)
            .transpose()?;
        let mut questions = env("RECALL_QUESTIONS")
            .map(parse_questions)
            .transpose()?
            .unwrap_or(DEFAULT_QUESTIONS);
        let mut verbose = false;
        let mut help = false;
        let mut command = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--course" => course = Some(parse_course(require_value(&mut args, "--course")?)?),
                "--questions" => {
                    questions = parse_questions(require_value(&mut args, "--questions")?)?;
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => help = true,
                _ if arg.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ if command.is_none() => command = Some(parse_command(&arg, &mut args)?),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = if help {
            Command::Help
        } else {
            command.unwrap_or(Command::Quiz)
        };

        if command == Command::Generate && course.is_none() {
            return Err(ArgsError::MissingCourse {
                command: command.name(),
            });
        }

        Ok(Self {
            command,
            db_url,
            course,
            questions,
            verbose,
        })
    }
}

fn parse_command(
    first: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<Command, ArgsError> {
    match first {
        "quiz" => Ok(Command::Quiz),
        "stats" => Ok(Command::Stats),
        "generate" => Ok(Command::Generate),
        "seed" => Ok(Command::Seed),
        "help" => Ok(Command::Help),
        "db" => match args.next().as_deref() {
            Some("init") => Ok(Command::DbInit),
            Some("reset") => Ok(Command::DbReset),
            Some(other) => Err(ArgsError::UnknownCommand(format!("db {other}"))),
            None => Err(ArgsError::MissingValue { flag: "db" }),
        },
        other => Err(ArgsError::UnknownCommand(other.to_owned())),
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_course(raw: String) -> Result<CourseId, ArgsError> {
    CourseId::new(raw.as_str()).map_err(|_| ArgsError::InvalidCourse { raw })
}

fn parse_questions(raw: String) -> Result<usize, ArgsError> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ArgsError::InvalidQuestions { raw }),
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  recall [quiz] [--course <id>]          take a quiz");
    eprintln!("                                         (pick one when --course is omitted)");
    eprintln!("  recall stats [--course <id>]           show correctness stats");
    eprintln!("  recall generate --course <id> [--questions <n>]");
    eprintln!("                                         build a quiz from course content");
    eprintln!("  recall seed                            store the built-in demo quiz");
    eprintln!("  recall db init                         create the database schema");
    eprintln!("  recall db reset                        drop all data and recreate the schema");
    eprintln!();
    eprintln!("Options may come before or after the command.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   (default {DEFAULT_DB_URL})");
    eprintln!("  --questions <n>     (default {DEFAULT_QUESTIONS})");
    eprintln!("  -v, --verbose       log at info level");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RECALL_DB_URL, RECALL_COURSE, RECALL_QUESTIONS,");
    eprintln!("  RECALL_API_BASE_URL, RECALL_API_TOKEN,");
    eprintln!("  RECALL_AI_API_KEY, RECALL_AI_BASE_URL, RECALL_AI_MODEL, RUST_LOG");
}

/// Turn `sqlite:relative/path` or a bare path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite:file:") {
        return trimmed.to_owned();
    }

    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory when missing.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}
