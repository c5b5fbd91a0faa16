mod app;
mod export;
mod ui;

use anyhow::Result;
use app::App;
use blockpad_config::Config;
use blockpad_engine::{DocumentFormat, io};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    time::Instant,
};

fn usage(program: &str) {
    eprintln!("Usage: {program} [document]");
    eprintln!("       {program} export <input> <output>");
}

/// Config is optional for every command; a broken file is reported and ignored.
fn load_config() -> Option<Config> {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring config: {e}");
            eprintln!("Warning: Failed to load config file: {e}");
            None
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("blockpad-cli");

    if args.get(1).map(String::as_str) == Some("export") {
        if args.len() != 4 {
            usage(program);
            process::exit(1);
        }
        let fallback = load_config().and_then(|c| DocumentFormat::from_name(&c.export.format));
        let input = PathBuf::from(&args[2]);
        let output = PathBuf::from(&args[3]);
        if let Err(e) = export::export(&input, &output, fallback) {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
        return Ok(());
    }

    let config = load_config();
    let document = match args.len() {
        2 => PathBuf::from(&args[1]),
        1 => match &config {
            Some(config) => {
                // Validate notes directory using engine
                if let Err(e) = io::validate_notes_dir(&config.notes_path) {
                    eprintln!(
                        "Error: Notes path '{}' from config file '{}' is invalid: {e}",
                        config.notes_path.display(),
                        Config::config_path().display()
                    );
                    process::exit(1);
                }
                config.default_document()
            }
            None => {
                eprintln!("Error: No document provided and no config file found");
                usage(program);
                eprintln!(
                    "Or create a config file at {}",
                    Config::config_path().display()
                );
                process::exit(1);
            }
        },
        _ => {
            usage(program);
            process::exit(1);
        }
    };

    let timings = config.map(|c| c.autosave).unwrap_or_default();
    let mut app = match App::open(document.clone(), timings.debounce(), timings.interval()) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: Cannot open '{}': {e}", document.display());
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app))?;
        // Focus queued by the last edit lands only once its block is on screen
        if app.after_render() {
            terminal.draw(|f| ui::ui(f, app))?;
        }
        if app.should_quit {
            return Ok(());
        }

        if event::poll(app.poll_timeout(Instant::now()))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key_event(key, Instant::now());
        }
        app.tick(Instant::now());
    }
}
