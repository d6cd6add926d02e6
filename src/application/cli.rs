use crate::application::{CaloriesApp, Config, JsonRenderer, ProfileInput, Renderer, TerminalRenderer};
use crate::domain::{Gender, RangeSelection, UnitSystem};
use crate::infrastructure::{DuckDbStorage, SimpleLogger};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "calories")]
#[command(about = "Track calories, weight and your daily energy balance")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal, global = true)]
    pub output: OutputFormat,

    /// Database file (overrides CALORIES_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct RangeArgs {
    /// Show the current week
    #[arg(short, long)]
    pub week: bool,

    /// Show the current month
    #[arg(short, long)]
    pub month: bool,

    /// Show the last N days
    #[arg(long = "hist", default_value_t = 0, allow_negative_numbers = true)]
    pub history: i64,

    /// Show a single date (dd.mm.yyyy)
    #[arg(short, long)]
    pub date: Option<String>,
}

impl From<RangeArgs> for RangeSelection {
    fn from(args: RangeArgs) -> Self {
        RangeSelection {
            week: args.week,
            month: args.month,
            history: args.history,
            date: args.date,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Terminal => Box::new(TerminalRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Show or set the profile used for BMR/AMR
    Config(ConfigArgs),
    /// Show the weight timeline, or record a new weight
    Weight {
        weight: Option<f64>,
    },
    /// Add an entry
    Add {
        /// Entry date (dd.mm.yyyy, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        calories: u32,
        #[arg(required = true, num_args = 1..)]
        food: Vec<String>,
    },
    /// Clear all entries of a date, or a single one
    Clear {
        /// Date to clear (dd.mm.yyyy, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// 1-based position of the entry to clear
        #[arg(short, long)]
        position: Option<usize>,
        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
    /// Export all data as JSON
    Export {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Import data from a JSON export
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ConfigArgs {
    /// Weight in kg (metric) or pounds (imperial)
    #[arg(short, long)]
    pub weight: Option<f64>,
    /// Height in cm (metric) or inches (imperial)
    #[arg(long)]
    pub height: Option<f64>,
    /// Activity multiplier, e.g. 1.2 for sedentary
    #[arg(short, long)]
    pub activity: Option<f64>,
    /// Birthday (dd.mm.yyyy)
    #[arg(short, long)]
    pub birthday: Option<String>,
    #[arg(short, long, default_value = "male")]
    pub gender: Gender,
    #[arg(short, long = "unit", default_value = "metric")]
    pub unit_system: UnitSystem,
    /// Overwrite an existing profile
    #[arg(short, long)]
    pub yes: bool,
}

impl ConfigArgs {
    fn is_update(&self) -> bool {
        self.weight.is_some()
            || self.height.is_some()
            || self.activity.is_some()
            || self.birthday.is_some()
    }

    fn input(&self) -> ProfileInput {
        ProfileInput {
            weight: self.weight.unwrap_or_default(),
            height: self.height.unwrap_or_default(),
            activity: self.activity.unwrap_or_default(),
            birthday: self.birthday.clone().unwrap_or_default(),
            gender: self.gender,
            unit_system: self.unit_system,
        }
    }
}

impl Cli {
    pub fn run() -> ExitCode {
        let cli = Self::parse();
        let config = Config::from_env().with_db_path(cli.db.clone());
        if let Err(e) = SimpleLogger::init(config.log_level) {
            eprintln!("{e}");
        }
        debug!("using database {}", config.db_path.display());

        let errors = cli.output.renderer();
        let storage = match DuckDbStorage::new(&config.db_path) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                println!("{}", errors.error(&e));
                return ExitCode::FAILURE;
            }
        };
        let app = CaloriesApp::new(storage, cli.output.renderer());

        match cli.dispatch(&app) {
            Ok(Some(out)) => {
                println!("{out}");
                ExitCode::SUCCESS
            }
            Ok(None) => ExitCode::SUCCESS,
            Err(e) => {
                warn!("command failed: {e:#}");
                println!("{}", errors.error(&e));
                ExitCode::FAILURE
            }
        }
    }

    /// Execute the parsed command. Returns the text to print, if any.
    pub fn dispatch(self, app: &CaloriesApp) -> Result<Option<String>> {
        let out = match self.command {
            None => app.show_days(&self.range.into())?,
            Some(Commands::Config(args)) => {
                if args.is_update() {
                    app.set_profile(&args.input(), args.yes)?
                } else {
                    app.show_profile()?
                }
            }
            Some(Commands::Weight { weight }) => app.weight(weight)?,
            Some(Commands::Add {
                date,
                calories,
                food,
            }) => app.add_entry(date.as_deref(), calories, &food.join(" "))?,
            Some(Commands::Clear {
                date,
                position,
                yes,
            }) => app.clear(date.as_deref(), position, yes)?,
            Some(Commands::Export { file }) => {
                let json = app.export()?;
                match file {
                    Some(file) => {
                        std::fs::write(&file, json)
                            .with_context(|| format!("error writing file {}", file.display()))?;
                        return Ok(None);
                    }
                    None => json,
                }
            }
            Some(Commands::Import { file }) => app.import(&file)?,
        };
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_utils::test_harness::TestStorage;
    use crate::infrastructure::EntryStore;
    use chrono::NaiveDate;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn app(test_storage: &TestStorage) -> CaloriesApp {
        CaloriesApp::new(test_storage.storage(), Box::new(TerminalRenderer))
            .with_today(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap())
    }

    #[test]
    fn range_flags_without_subcommand() {
        let cli = parse(&["calories", "-w"]);
        assert!(cli.command.is_none());
        assert!(cli.range.week);

        let cli = parse(&["calories", "--hist", "-7", "--output", "json"]);
        assert_eq!(cli.range.history, -7);
        assert_eq!(cli.output, OutputFormat::Json);

        let selection: RangeSelection = parse(&["calories", "-d", "02.01.2016"]).range.into();
        assert_eq!(selection.date.as_deref(), Some("02.01.2016"));
    }

    #[test]
    fn add_joins_food_words() {
        let cli = parse(&["calories", "add", "-d", "02.01.2016", "500", "big", "burger"]);
        assert_eq!(
            cli.command,
            Some(Commands::Add {
                date: Some("02.01.2016".to_string()),
                calories: 500,
                food: vec!["big".to_string(), "burger".to_string()],
            })
        );
        assert!(Cli::try_parse_from(["calories", "add", "500"]).is_err());
        assert!(Cli::try_parse_from(["calories", "add", "-5", "gum"]).is_err());
    }

    #[test]
    fn config_parses_gender_and_unit() {
        let cli = parse(&[
            "calories", "config", "-w", "85.9", "--height", "181.5", "-a", "1.2", "-b",
            "01.01.1990", "-g", "female", "-u", "imperial",
        ]);
        let Some(Commands::Config(args)) = cli.command else {
            panic!("expected config command");
        };
        assert!(args.is_update());
        assert_eq!(args.gender, Gender::Female);
        assert_eq!(args.unit_system, UnitSystem::Imperial);

        assert!(Cli::try_parse_from(["calories", "config", "-g", "other"]).is_err());

        let Some(Commands::Config(show)) = parse(&["calories", "config"]).command else {
            panic!("expected config command");
        };
        assert!(!show.is_update());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["calories", "weight", "--output", "json", "--db", "x.db"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert_eq!(cli.command, Some(Commands::Weight { weight: None }));
    }

    #[test]
    fn dispatch_add_then_show_date() {
        let test_storage = TestStorage::with_profile();
        let app = app(&test_storage);

        let out = parse(&["calories", "add", "-d", "02.01.2016", "500", "burger"])
            .dispatch(&app)
            .unwrap();
        assert_eq!(
            out.as_deref(),
            Some("Added Entry for 02.01.2016 with 500 calories (burger)")
        );

        let out = parse(&["calories", "-d", "02.01.2016"]).dispatch(&app).unwrap().unwrap();
        assert!(out.contains("\t500 burger"));
    }

    #[test]
    fn dispatch_export_to_file() {
        let test_storage = TestStorage::with_profile();
        test_storage.seed_entry("01.03.2024", 450, "soup");
        let app = app(&test_storage);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("export.json");
        let file_arg = file.to_string_lossy().to_string();

        let out = parse(&["calories", "export", "--file", &file_arg]).dispatch(&app).unwrap();
        assert!(out.is_none());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(written["entries"][0]["food"], "soup");

        parse(&["calories", "clear", "-d", "01.03.2024", "-y"]).dispatch(&app).unwrap();
        assert!(test_storage.storage().fetch_entries("01.03.2024").unwrap().is_empty());

        parse(&["calories", "import", "--file", &file_arg]).dispatch(&app).unwrap();
        assert_eq!(test_storage.storage().fetch_entries("01.03.2024").unwrap().len(), 1);
    }

    #[test]
    fn dispatch_errors_without_profile() {
        let test_storage = TestStorage::new();
        let err = parse(&["calories", "-w"]).dispatch(&app(&test_storage)).unwrap_err();
        assert!(err.to_string().starts_with("no config has been set"));
    }
}
