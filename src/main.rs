use chrono::{Local, Utc};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use growlog::{
    app::{App, KeyOutcome},
    app_dirs::AppDirs,
    config::{split_list, Config, ConfigStore, FileConfigStore},
    dashboard::Dashboard,
    export::write_csv,
    filter::{RecordFilter, TimeRange},
    form::{submit, FormError, FormInput},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    store::{ProgressDb, RecordSource},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    process,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 250;

/// track quiz attempts and see how learning is going
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Record quiz attempts, grade them A to E, and review progress with charts and a rule-based summary of performance, best and worst subject, and trend."
)]
pub struct Cli {
    /// database file (default: ~/.local/state/growlog/progress.db)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// config file holding the roster of persons and subjects
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// record a quiz attempt
    Add {
        #[clap(short, long)]
        person: String,

        #[clap(short, long)]
        subject: String,

        /// date of the attempt as YYYY-MM-DD (default: today)
        #[clap(short, long)]
        date: Option<String>,

        /// total number of questions
        #[clap(short, long)]
        total: u32,

        /// number of questions attempted
        #[clap(short, long)]
        attempted: u32,

        /// number of correct answers
        #[clap(short, long)]
        correct: u32,
    },

    /// list every attempt, newest first
    Data,

    /// print the expert system conclusion for a time range
    Summary {
        /// one of 7days, 2weeks, 1month, 3months (default: from config)
        #[clap(short, long)]
        range: Option<TimeRange>,

        #[clap(short, long)]
        person: Option<String>,

        /// restrict to a subject; repeat for several
        #[clap(short, long = "subject")]
        subjects: Vec<String>,

        /// print the summary as JSON
        #[clap(long)]
        json: bool,
    },

    /// write all attempts as CSV
    Export {
        /// output file (default: stdout)
        #[clap(short, long)]
        out: Option<PathBuf>,
    },

    /// show or replace the configured persons and subjects
    Roster {
        /// comma separated person names
        #[clap(long)]
        persons: Option<String>,

        /// comma separated subject names
        #[clap(long)]
        subjects: Option<String>,
    },

    /// interactive dashboard (default)
    Dashboard {
        #[clap(short, long)]
        range: Option<TimeRange>,
    },
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }

    fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("growlog.db"))
    }

    fn open_db(&self) -> Result<ProgressDb, Box<dyn Error>> {
        let path = self.db_path();
        tracing::debug!("opening database {}", path.display());
        Ok(ProgressDb::open(path)?)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("growlog=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        process::exit(report(&*e));
    }
}

/// Print `e` and pick the exit code: 2 for input the user can correct, 1 otherwise
fn report(e: &(dyn Error + 'static)) -> i32 {
    match e.downcast_ref::<FormError>() {
        Some(form) if form.is_validation() => {
            eprintln!("Invalid attempt: {form}");
            2
        }
        _ => {
            eprintln!("Error: {e}");
            1
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let store = cli.config_store();
    let config = store.load();

    match cli.command.clone() {
        Some(Command::Add {
            person,
            subject,
            date,
            total,
            attempted,
            correct,
        }) => {
            let input = FormInput {
                person,
                date,
                subject,
                total,
                attempted,
                correct,
            };
            let mut db = cli.open_db()?;
            let record = submit(&input, &config.roster, &mut db, Local::now().date_naive())?;
            println!(
                "Saved {} {} {}: {}/{} correct ({:.2}%), label {}",
                record.date,
                record.person,
                record.subject,
                record.correct,
                record.total_questions,
                record.correct_percent,
                record.score_label
            );
            println!("{} attempts stored", db.count()?);
        }
        Some(Command::Data) => print_data(&cli.open_db()?)?,
        Some(Command::Summary {
            range,
            person,
            subjects,
            json,
        }) => {
            let filter = RecordFilter::new(range.unwrap_or(config.default_range))
                .with_person(person)
                .with_subjects(subjects);
            print_summary(&cli.open_db()?, filter, json)?;
        }
        Some(Command::Export { out }) => {
            let records = cli.open_db()?.all_newest_first()?;
            let rows = match out {
                Some(path) => {
                    let rows = write_csv(&records, File::create(&path)?)?;
                    eprintln!("Exported {rows} attempts to {}", path.display());
                    rows
                }
                None => write_csv(&records, io::stdout().lock())?,
            };
            tracing::debug!(rows, "export finished");
        }
        Some(Command::Roster { persons, subjects }) => {
            let mut config = config;
            if persons.is_some() || subjects.is_some() {
                if let Some(persons) = persons {
                    config.roster.persons = split_list(&persons);
                }
                if let Some(subjects) = subjects {
                    config.roster.subjects = split_list(&subjects);
                }
                store.save(&config)?;
                eprintln!("Saved roster to {}", store.path().display());
            }
            print_roster(&config);
        }
        Some(Command::Dashboard { range }) => run_dashboard(&cli, config, range)?,
        None => run_dashboard(&cli, config, None)?,
    }

    Ok(())
}

fn print_data(db: &ProgressDb) -> Result<(), Box<dyn Error>> {
    use comfy_table::{Cell, Table};
    use growlog::ui::data_table::count_cell;

    let records = db.all_newest_first()?;
    if records.is_empty() {
        println!("No attempts recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Person",
        "Subject",
        "Attempted",
        "Correct",
        "Label",
    ]);
    for r in &records {
        table.add_row(vec![
            Cell::new(r.date),
            Cell::new(&r.person),
            Cell::new(&r.subject),
            Cell::new(count_cell(r.attempted, r.total_questions, r.attempted_percent)),
            Cell::new(count_cell(r.correct, r.total_questions, r.correct_percent)),
            Cell::new(r.score_label),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn print_summary(db: &ProgressDb, filter: RecordFilter, json: bool) -> Result<(), Box<dyn Error>> {
    let range = filter.range;
    let dashboard = Dashboard::load(db, filter, Utc::now())?;

    match (&dashboard.summary, json) {
        (None, true) => println!("null"),
        (None, false) => println!("No attempts in the last {}.", range.label().to_lowercase()),
        (Some(summary), true) => println!("{}", serde_json::to_string_pretty(summary)?),
        (Some(summary), false) => {
            println!("Expert System Conclusion ({})", range.label());
            println!("Overall Performance: {}", summary.overall_performance);
            println!("Best Subject: {}", summary.best_subject);
            println!("Worst Subject: {}", summary.worst_subject);
            println!("Performance Trend: {}", summary.trend);
            println!("Recommendation: {}", summary.recommendation);
        }
    }
    Ok(())
}

fn print_roster(config: &Config) {
    let show = |names: &[String]| {
        if names.is_empty() {
            "(any)".to_string()
        } else {
            names.join(", ")
        }
    };
    println!("Persons: {}", show(&config.roster.persons));
    println!("Subjects: {}", show(&config.roster.subjects));
    println!("Default range: {}", config.default_range);
}

fn run_dashboard(
    cli: &Cli,
    config: Config,
    range: Option<TimeRange>,
) -> Result<(), Box<dyn Error>> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let db = cli.open_db()?;
    let mut app = App::new(
        Box::new(db),
        config.roster,
        range.unwrap_or(config.default_range),
        Utc::now(),
    )?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.on_tick(Utc::now()) {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Key(key) => {
                if app.on_key(key, Utc::now()) == KeyOutcome::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    Ok(())
}
