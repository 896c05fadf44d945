use chrono::{Datelike, Local, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;
use workout_core::analytics::{self, Granularity, NavContext};
use workout_core::store::{self, DataStore};
use workout_core::*;

#[derive(Parser)]
#[command(name = "treino")]
#[command(about = "Strength training planner and workout logger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and edit the exercise catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Build a recommended workout for a time budget
    Generate {
        /// Muscle groups to train (1 to 3)
        #[arg(long = "group", required = true, value_delimiter = ',')]
        groups: Vec<MuscleGroup>,

        /// Target duration in minutes
        #[arg(long, allow_negative_numbers = true)]
        minutes: i64,

        /// Weekdays for the saved plan
        #[arg(long = "weekday", value_delimiter = ',')]
        weekdays: Vec<Weekday>,

        /// Save the result as a plan (requires --weekday)
        #[arg(long, requires = "weekdays")]
        save: bool,

        /// Shuffle seed, for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Manage saved workout plans
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Run today's workout
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Browse the session log
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Weight progression for one exercise
    Stats {
        #[arg(long)]
        exercise: String,

        /// week-days, month-days, month-weeks, year-months or years
        #[arg(long, default_value = "month-weeks")]
        granularity: Granularity,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        month: Option<u32>,

        /// Week of month (1-4), used by week-days
        #[arg(long)]
        week: Option<u32>,
    },

    /// Month view of training days
    Calendar {
        #[arg(long)]
        exercise: String,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        month: Option<u32>,
    },

    /// Export the full history to CSV
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List exercises, optionally for one sub-group
    List {
        #[arg(long)]
        sub_group: Option<String>,
    },

    /// Add an exercise definition
    Add {
        #[arg(long)]
        group: String,

        #[arg(long)]
        sub_group: String,

        /// isolated or multi_joint
        #[arg(long)]
        kind: ExerciseKind,

        #[arg(long)]
        name: String,

        /// Set range, e.g. "3-4"
        #[arg(long)]
        sets: String,

        /// Rep range, e.g. "8-12"
        #[arg(long)]
        reps: String,

        /// Rest range in seconds, e.g. "60-90"
        #[arg(long)]
        rest: String,

        #[arg(long)]
        synergists: Option<String>,

        #[arg(long)]
        antagonists: Option<String>,

        /// Reps are held seconds rather than repetitions
        #[arg(long)]
        time_based: bool,
    },

    /// Remove every exercise with this name from a sub-group
    Remove {
        #[arg(long)]
        sub_group: String,

        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum PlanAction {
    List,

    Show { id: Uuid },

    Delete { id: Uuid },

    /// Create a plan from catalog exercises at their recommended parameters
    Create {
        #[arg(long = "weekday", required = true, value_delimiter = ',')]
        weekdays: Vec<Weekday>,

        #[arg(long = "group", required = true, value_delimiter = ',')]
        groups: Vec<MuscleGroup>,

        #[arg(long = "exercise", required = true)]
        exercises: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Start the plan scheduled for today
    Start {
        /// Record the session for another day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Complete every set and skip every rest without prompting
        #[arg(long)]
        auto_complete: bool,

        /// Weight used for an exercise, NAME=KG (repeatable)
        #[arg(long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List logged sessions
    List {
        /// Include hidden entries
        #[arg(long)]
        all: bool,
    },

    /// Hide an entry from the log (analytics still count it)
    Hide { id: Uuid },

    /// Make a hidden entry visible again
    Show { id: Uuid },
}

fn parse_weight(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, kg) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=KG, got '{}'", s))?;
    let kg: f64 = kg
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight '{}'", kg))?;
    if name.trim().is_empty() {
        return Err("exercise name is empty".into());
    }
    Ok((name.trim().to_string(), kg))
}

fn main() {
    workout_core::logging::init_with_level("warn");

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store = DataStore::new(data_dir);
    let today = Local::now().date_naive();
    tracing::debug!("Using data directory {:?}, today is {}", store.dir(), today);

    match cli.command {
        Commands::Catalog { action } => cmd_catalog(&store, action, &config),
        Commands::Generate {
            groups,
            minutes,
            weekdays,
            save,
            seed,
        } => cmd_generate(&store, &groups, minutes, weekdays, save, seed, &config),
        Commands::Plan { action } => cmd_plan(&store, action, &config),
        Commands::Session { action } => match action {
            SessionAction::Start {
                date,
                auto_complete,
                weights,
            } => cmd_session_start(&store, date.unwrap_or(today), auto_complete, weights),
        },
        Commands::History { action } => cmd_history(&store, action),
        Commands::Stats {
            exercise,
            granularity,
            year,
            month,
            week,
        } => {
            let around = NavContext::around(today);
            let nav = NavContext::new(
                year.unwrap_or(around.year),
                month.unwrap_or(around.month),
                week.unwrap_or(around.week),
            )?;
            cmd_stats(&store, &exercise, granularity, &nav)
        }
        Commands::Calendar {
            exercise,
            year,
            month,
        } => cmd_calendar(
            &store,
            &exercise,
            year.unwrap_or(today.year()),
            month.unwrap_or(today.month()),
        ),
        Commands::Export { out } => cmd_export(&store, &out),
    }
}

fn cmd_catalog(store: &DataStore, action: CatalogAction, config: &Config) -> Result<()> {
    match action {
        CatalogAction::List { sub_group } => {
            let catalog = store.load_catalog()?;
            let names: Vec<&str> = match &sub_group {
                Some(name) => vec![name.as_str()],
                None => catalog.sub_group_names().collect(),
            };
            for name in names {
                let entry = catalog.list_by_sub_group(name);
                if entry.is_empty() {
                    if sub_group.is_some() {
                        println!("No exercises in '{}'", name);
                    }
                    continue;
                }
                println!("{}", name);
                for (kind, def) in entry.iter() {
                    println!(
                        "  {:<28} {:<11} sets {:<5} reps {:<6} rest {}s{}",
                        def.name,
                        kind.to_string(),
                        def.sets,
                        def.reps,
                        def.rest,
                        if def.time_based { " (timed)" } else { "" }
                    );
                }
            }
            Ok(())
        }
        CatalogAction::Add {
            group,
            sub_group,
            kind,
            name,
            sets,
            reps,
            rest,
            synergists,
            antagonists,
            time_based,
        } => {
            let mut catalog = store.load_catalog()?;
            let mut def = ExerciseDefinition::new(&name, &sets, &reps, &rest);
            def.synergists = synergists;
            def.antagonists = antagonists;
            if time_based {
                def = def.time_based();
            }
            if config.catalog.reject_duplicates {
                catalog.add_unique_exercise(&group, &sub_group, kind, def)?;
            } else {
                catalog.add_exercise(&group, &sub_group, kind, def)?;
            }
            store.save_catalog(&catalog)?;
            println!("✓ Added '{}' to {}", name, sub_group);
            Ok(())
        }
        CatalogAction::Remove { sub_group, name } => {
            let mut catalog = store.load_catalog()?;
            let removed = catalog.remove_exercise(&sub_group, &name);
            if removed == 0 {
                println!("No exercise named '{}' in {}", name, sub_group);
                return Ok(());
            }
            store.save_catalog(&catalog)?;
            println!("✓ Removed {} entr{} named '{}'", removed, if removed == 1 { "y" } else { "ies" }, name);
            Ok(())
        }
    }
}

fn cmd_generate(
    store: &DataStore,
    groups: &[MuscleGroup],
    minutes: i64,
    weekdays: Vec<Weekday>,
    save: bool,
    seed: Option<u64>,
    config: &Config,
) -> Result<()> {
    let catalog = store.load_catalog()?;
    let settings = config.generator_settings();
    let target = minutes.saturating_mul(60);

    let workout = match seed {
        Some(seed) => generate(&catalog, groups, target, &settings, &mut SeededOrdering::new(seed))?,
        None => generate(&catalog, groups, target, &settings, &mut RandomOrdering)?,
    };

    println!("\nRecommended workout ({} min target)", minutes);
    for group in &workout.exercises {
        println!("\n  {}", group.sub_group);
        for ex in &group.exercises {
            print_planned(ex);
        }
    }
    println!("\n  Estimated: {}", format_duration(workout.estimated_seconds));
    for (group, subs) in &workout.involved {
        println!("  {}: {}", group, subs.join(", "));
    }

    if save {
        let draft = PlanDraft::from_generated(weekdays, workout);
        let id = store::update_document(&store.plans_path(), |book: &mut PlanBook| {
            Ok(book.create(draft)?.id)
        })?;
        println!("\n✓ Saved plan {}", id);
    }
    Ok(())
}

fn cmd_plan(store: &DataStore, action: PlanAction, config: &Config) -> Result<()> {
    match action {
        PlanAction::List => {
            let book = store.load_plans()?;
            if book.plans().is_empty() {
                println!("No plans yet.");
            }
            for plan in book.plans() {
                println!(
                    "{}  {:<12} {:<24} {} exercises, ~{}",
                    plan.id,
                    join(&plan.weekdays),
                    join(&plan.groups),
                    plan.flattened().len(),
                    format_duration(plan.estimated_seconds())
                );
            }
            Ok(())
        }
        PlanAction::Show { id } => {
            let book = store.load_plans()?;
            let plan = book
                .get(id)
                .ok_or_else(|| Error::NotFound(format!("plan {}", id)))?;
            println!("Plan {}", plan.id);
            println!("  Days:   {}", join(&plan.weekdays));
            println!("  Groups: {}", join(&plan.groups));
            for group in &plan.exercises {
                println!("\n  {}", group.sub_group);
                for ex in &group.exercises {
                    print_planned(ex);
                }
            }
            println!("\n  Estimated: {}", format_duration(plan.estimated_seconds()));
            Ok(())
        }
        PlanAction::Delete { id } => {
            let removed = store::update_document(&store.plans_path(), |book: &mut PlanBook| {
                Ok(book.delete(id))
            })?;
            if !removed {
                return Err(Error::NotFound(format!("plan {}", id)));
            }
            println!("✓ Deleted plan {}", id);
            Ok(())
        }
        PlanAction::Create {
            weekdays,
            groups,
            exercises,
        } => {
            let catalog = store.load_catalog()?;
            let mut draft = PlanDraft::new(weekdays, groups);
            for name in &exercises {
                draft.pick(&catalog, name, config.generator.time_per_set_seconds)?;
            }
            let id = store::update_document(&store.plans_path(), |book: &mut PlanBook| {
                Ok(book.create(draft)?.id)
            })?;
            println!("✓ Created plan {}", id);
            Ok(())
        }
    }
}

fn cmd_session_start(
    store: &DataStore,
    today: NaiveDate,
    auto_complete: bool,
    weights: Vec<(String, f64)>,
) -> Result<()> {
    let book = store.load_plans()?;
    let history = store.load_history()?;
    let plan = book
        .for_weekday(today.weekday())
        .ok_or_else(|| Error::NotFound(format!("plan scheduled for {}", today.weekday())))?;

    let mut slot: ActiveSession<SystemClock> = ActiveSession::new();
    let session = slot.begin(plan, &history, today, SystemClock::default())?;

    println!("\nSession for {} ({})", today.format("%d-%m-%Y"), join(&plan.groups));
    announce_exercise(session);

    while !session.is_completed() {
        if !auto_complete && prompt("Enter when the set is done, 'q' to quit")? == "q" {
            slot.abandon();
            println!("Session abandoned, nothing recorded.");
            return Ok(());
        }

        match session.complete_set()? {
            SessionEvent::RestStarted { seconds } => {
                if auto_complete {
                    session.skip()?;
                } else if !run_rest(session, seconds)? {
                    slot.abandon();
                    println!("Session abandoned, nothing recorded.");
                    return Ok(());
                }
            }
            SessionEvent::ExerciseStarted { .. } => announce_exercise(session),
            _ => {}
        }
    }

    let mut recorded: BTreeMap<String, f64> = weights.into_iter().collect();
    if !auto_complete {
        for ex in session.exercises() {
            if recorded.contains_key(&ex.name) {
                continue;
            }
            let input = prompt(&format!("Weight for {} (kg, blank to skip)", ex.name))?;
            if input.is_empty() {
                continue;
            }
            match input.parse::<f64>() {
                Ok(kg) => {
                    recorded.insert(ex.name.clone(), kg);
                }
                Err(_) => println!("  Not a number, leaving blank"),
            }
        }
    }

    let entry = slot.finish(&recorded)?;
    store::update_document(&store.history_path(), |log: &mut HistoryLog| {
        log.append(entry.clone());
        Ok(())
    })?;

    println!("\n✓ Session logged!");
    println!("  Entry: {}", entry.id);
    Ok(())
}

/// Count a rest down on the wall clock. Returns false if the user quits.
fn run_rest(session: &mut Session<SystemClock>, seconds: u32) -> Result<bool> {
    println!("  Rest {}s", seconds);
    loop {
        match prompt("Enter to start rest, 's' skip, 'r' restart, 'q' quit")?.as_str() {
            "q" => return Ok(false),
            "s" => {
                session.skip()?;
                break;
            }
            "r" => {
                session.restart()?;
                continue;
            }
            _ => {}
        }

        session.resume()?;
        let mut finished = false;
        while !finished {
            std::thread::sleep(Duration::from_millis(250));
            for event in session.poll() {
                match event {
                    SessionEvent::RestTick { remaining } => {
                        print!("\r  {:>3}s ", remaining);
                        io::stdout().flush()?;
                    }
                    SessionEvent::RestFinished => finished = true,
                    _ => {}
                }
            }
        }
        break;
    }
    // Terminal bell
    println!("\r  Rest over\x07");
    announce_set(session);
    Ok(true)
}

fn announce_exercise(session: &Session<SystemClock>) {
    let progress = session.progress();
    let ex = session.current_exercise();
    println!(
        "\n[{}/{}] {} ({})",
        progress.exercise_idx + 1,
        progress.exercise_count,
        ex.name,
        ex.sub_group
    );
    println!(
        "  {} sets x {} reps, {}s rest",
        ex.params.sets, ex.params.reps, ex.params.rest
    );
    announce_set(session);
}

fn announce_set(session: &Session<SystemClock>) {
    let progress = session.progress();
    if progress.phase == SessionPhase::Exercising {
        println!("  Set {} of {}", progress.set_idx + 1, progress.total_sets);
    }
}

fn cmd_history(store: &DataStore, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List { all } => {
            let log = store.load_history()?;
            let entries: Vec<&HistoryEntry> = if all {
                log.all().iter().collect()
            } else {
                log.visible().collect()
            };
            if entries.is_empty() {
                println!("No sessions logged.");
            }
            for entry in entries {
                println!(
                    "{}  {}  {}{}",
                    entry.id,
                    entry.date.format("%d-%m-%Y"),
                    join(&entry.groups),
                    if entry.visible { "" } else { "  [hidden]" }
                );
                for (name, weight) in &entry.weights {
                    match weight {
                        Some(kg) => println!("    {:<28} {:.1} kg", name, kg),
                        None => println!("    {:<28} -", name),
                    }
                }
            }
            Ok(())
        }
        HistoryAction::Hide { id } => set_visibility(store, id, false),
        HistoryAction::Show { id } => set_visibility(store, id, true),
    }
}

fn set_visibility(store: &DataStore, id: Uuid, visible: bool) -> Result<()> {
    store::update_document(&store.history_path(), |log: &mut HistoryLog| {
        log.set_visible(id, visible)
    })?;
    println!("✓ Entry {} {}", id, if visible { "shown" } else { "hidden" });
    Ok(())
}

fn cmd_stats(
    store: &DataStore,
    exercise: &str,
    granularity: Granularity,
    nav: &NavContext,
) -> Result<()> {
    let log = store.load_history()?;
    let report = analytics::query(log.all(), exercise, granularity, nav);

    println!("{} ({})", report.exercise, report.granularity);
    if report.series.is_empty() {
        println!("  No recorded weights in this period.");
    }
    for bucket in &report.series {
        println!(
            "  {:<5} {:>7.1} kg  {}",
            bucket.label, bucket.value, bucket.full_date
        );
    }

    if let Some(latest) = report.metrics.latest {
        println!("\n  Latest: {:.1} kg", latest);
        println!("  Change: {:+.1}%", report.metrics.change_percent);
    }
    match report.comparison.percent {
        Some(pct) => println!(
            "  Vs previous period: {:+.1}% ({:.1} -> {:.1} kg)",
            pct, report.comparison.previous_average, report.comparison.current_average
        ),
        None => println!("  Vs previous period: no data"),
    }
    Ok(())
}

fn cmd_calendar(store: &DataStore, exercise: &str, year: i32, month: u32) -> Result<()> {
    let log = store.load_history()?;
    let days = analytics::calendar(log.all(), exercise, year, month)?;

    println!("{:02}/{}  (* session, + {})", month, year, exercise);
    println!(" Mon Tue Wed Thu Fri Sat Sun");
    let offset = days
        .first()
        .map(|d| d.date.weekday().num_days_from_monday())
        .unwrap_or(0);
    let mut line = "    ".repeat(offset as usize);
    for day in &days {
        let mark = match (day.has_session, day.has_exercise_weight) {
            (true, true) => "*+",
            (true, false) => "* ",
            (false, true) => " +",
            (false, false) => "  ",
        };
        line.push_str(&format!("{:>2}{}", day.date.day(), mark));
        if day.date.weekday() == Weekday::Sun {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }
    Ok(())
}

fn cmd_export(store: &DataStore, out: &Path) -> Result<()> {
    let log = store.load_history()?;
    let count = export_history(&log, out)?;
    println!("✓ Exported {} rows to {}", count, out.display());
    Ok(())
}

fn print_planned(ex: &PlannedExercise) {
    println!(
        "    {:<28} {} x {:<3} {:>3}s/set  {:>3}s rest  (~{})",
        ex.name,
        ex.params.sets,
        ex.params.reps,
        ex.params.time_per_set,
        ex.params.rest,
        format_duration(ex.params.estimated_seconds())
    );
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_duration(seconds: u64) -> String {
    format!("{}m {:02}s", seconds / 60, seconds % 60)
}

fn prompt(message: &str) -> Result<String> {
    println!("{}", message);
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_lowercase())
}
