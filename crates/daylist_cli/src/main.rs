use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use daylist_cli::cli::{Cli, Command, NotesCommand, collect_overrides, split_command_line};
use daylist_cli::render;
use daylist_core::app::{Action, App, Outcome};
use daylist_core::config::{Config, Palette, load_config_with_fallback, merge_overrides};
use daylist_core::error::AppError;
use daylist_core::logging;
use daylist_core::storage::JsonFileStore;
use daylist_core::store::TaskStore;
use std::cell::RefCell;
use std::io::{self, BufRead};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

type DaylistApp = App<JsonFileStore>;

struct Output {
    palette: Palette,
    json: bool,
    interactive: bool,
}

impl Output {
    fn session(palette: Palette) -> Self {
        Self {
            palette,
            json: false,
            interactive: true,
        }
    }
}

enum Parsed {
    Run(Cli),
    Displayed,
}

fn open_app() -> Result<DaylistApp, AppError> {
    let backend = JsonFileStore::open_default()?;
    Ok(App::new(TaskStore::new(backend)))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn parse_words(config: &Config, words: Vec<String>) -> Result<Parsed, AppError> {
    let mut argv = Vec::with_capacity(words.len() + 1);
    argv.push("daylist".to_string());
    argv.extend(config.expand_alias(words));

    match Cli::try_parse_from(argv) {
        Ok(cli) => Ok(Parsed::Run(cli)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().map_err(AppError::from)?;
            Ok(Parsed::Displayed)
        }
        Err(err) => Err(normalize_parse_error(err)),
    }
}

fn output_for(cli: &Cli, config: &Config, interactive: bool) -> Result<Output, AppError> {
    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    let merged = merge_overrides(config, &overrides);
    Ok(Output {
        palette: merged.palette(),
        json: cli.json,
        interactive,
    })
}

fn report(outcome: &Outcome, out: &Output) {
    if out.json {
        println!("{}", render::outcome_json(outcome));
    } else if !out.interactive
        && let Some(message) = render::describe_outcome(outcome)
    {
        println!("{message}");
    }
}

fn report_missing(id: i64, out: &Output) {
    if out.json {
        println!("{}", render::outcome_json(&Outcome::Unchanged));
    } else {
        println!("No task with id {id}");
    }
}

fn run_command(app: &mut DaylistApp, command: Command, out: &Output) -> Result<(), AppError> {
    match command {
        Command::Add {
            text,
            tomorrow,
            section,
        } => {
            let section = Command::add_section(tomorrow, section);
            let frame = app.dispatch(
                Action::AddTask {
                    text: text.join(" "),
                    section,
                },
                Instant::now(),
            )?;
            report(&frame.outcome, out);
        }
        Command::Toggle { id } => {
            let frame = app.dispatch(Action::Toggle(id), Instant::now())?;
            match frame.outcome {
                Outcome::Unchanged => report_missing(id, out),
                ref outcome => report(outcome, out),
            }
        }
        Command::Delete { id } => {
            let frame = app.dispatch(Action::Delete(id), Instant::now())?;
            match frame.outcome {
                Outcome::Unchanged => report_missing(id, out),
                ref outcome => report(outcome, out),
            }
        }
        Command::List => {
            let frame = app.snapshot();
            if out.json {
                println!("{}", render::board_json(&frame.board));
            } else {
                println!(
                    "{}",
                    render::board_text(&frame.board, &out.palette, &frame.active)
                );
            }
        }
        Command::Stats => {
            let stats = app.store().statistics();
            if out.json {
                println!("{}", serde_json::json!(stats));
            } else {
                println!("{}", render::statistics_text(&stats));
            }
        }
        Command::Notes { action } => match action {
            None | Some(NotesCommand::Show) => {
                let notes = app.store().notes();
                if out.json {
                    println!("{}", serde_json::json!({ "notes": notes }));
                } else {
                    println!("{notes}");
                }
            }
            Some(NotesCommand::Save { text }) => {
                let frame = app.dispatch(Action::SaveNotes(text.join(" ")), Instant::now())?;
                report(&frame.outcome, out);
            }
        },
    }

    Ok(())
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

/// Feeds stdin lines to the session so effect deadlines can fire while idle.
fn spawn_line_reader() -> Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn next_line(
    app: &DaylistApp,
    lines: &Receiver<io::Result<String>>,
) -> Result<io::Result<String>, RecvTimeoutError> {
    match app.effects().next_deadline() {
        Some(deadline) => lines.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
    }
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let mut app = open_app()?;
    let current = Rc::new(RefCell::new(Output::session(config.palette())));
    let shown = Rc::clone(&current);
    app.subscribe(move |frame| {
        let out = shown.borrow();
        match frame.outcome {
            Outcome::Reverted(_) => println!("{}", render::revert_text(frame, &out.palette)),
            _ if out.json => {}
            _ => println!("{}", render::frame_text(frame, &out.palette)),
        }
    });
    app.dispatch(Action::Load, Instant::now())?;

    let lines = spawn_line_reader();
    loop {
        let input = match next_line(&app, &lines) {
            Ok(input) => input?,
            Err(RecvTimeoutError::Timeout) => {
                app.tick(Instant::now());
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        app.tick(Instant::now());

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let words = match split_command_line(line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(message) => {
                eprintln!("ERROR: {}", AppError::invalid_input(message));
                continue;
            }
        };

        let cli = match parse_words(config, words) {
            Ok(Parsed::Run(cli)) => cli,
            Ok(Parsed::Displayed) => continue,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let result = output_for(&cli, config, true).and_then(|out| {
            *current.borrow_mut() = out;
            run_command(&mut app, cli.command, &current.borrow())
        });
        *current.borrow_mut() = Output::session(config.palette());
        if let Err(err) = result {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run_once(config: &Config, words: Vec<String>) -> Result<(), AppError> {
    let cli = match parse_words(config, words)? {
        Parsed::Run(cli) => cli,
        Parsed::Displayed => return Ok(()),
    };
    let out = output_for(&cli, config, false)?;

    let mut app = open_app()?;
    let loaded = app.dispatch(Action::Load, Instant::now())?;
    if !out.json
        && let Some(message) = render::describe_outcome(&loaded.outcome)
    {
        eprintln!("{message}");
    }

    run_command(&mut app, cli.command, &out)
}

fn main() {
    logging::init();
    let loaded = load_config_with_fallback();
    if let Some(err) = &loaded.error {
        eprintln!("ERROR: {}", err);
    }
    let config = loaded.config;

    let words: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let result = if words.is_empty() {
        run_interactive(&config)
    } else {
        run_once(&config, words)
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
