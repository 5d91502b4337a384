mod app;
mod board;
mod domain;
mod input;
mod notifications;
mod persistence;
mod ticker;
mod timer;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use board::TaskBoard;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use persistence::{clear_all, get_data_dir, init_local_dir, FileStore, KvStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

#[derive(Parser)]
#[command(name = "focusdeck")]
#[command(about = "A terminal todo list and pomodoro timer with persistent state", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .focusdeck directory in the current directory
    Init,
    /// Export all data as a JSON backup document
    Export {
        /// Output file path. Prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Import a backup document, replacing tasks, lists and settings
    Import {
        /// Path to the backup JSON file
        path: String,
    },
    /// Delete all stored data
    Clear {
        /// Actually delete; the command refuses without this flag
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let data_dir = init_local_dir()?;
            println!("Initialized data directory: {}", data_dir.display());
            println!();
            println!("Focusdeck will now use this local directory for storage.");
            println!("Run 'focusdeck' to start.");
            Ok(())
        }
        Some(Commands::Export { output }) => export_data(output),
        Some(Commands::Import { path }) => import_data(&path),
        Some(Commands::Clear { yes }) => clear_data(yes),
        None => run_tui(),
    }
}

fn export_data(output: Option<String>) -> Result<()> {
    let mut store = FileStore::open_default()?;
    let board = TaskBoard::load(&mut store)?;
    let document = board.export_document()?;

    match output {
        Some(path) => {
            std::fs::write(&path, &document)
                .with_context(|| format!("Failed to write {}", path))?;
            println!("Exported to {}", path);
        }
        None => println!("{}", document),
    }
    Ok(())
}

fn import_data(path: &str) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path))?;

    let mut store = FileStore::open_default()?;
    let mut board = TaskBoard::load(&mut store)?;
    board.import_document(&mut store, &text)?;

    println!(
        "Imported {} tasks in {} lists",
        board.tasks().len(),
        board.lists().len()
    );
    Ok(())
}

fn clear_data(yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("This deletes every task, list and setting. Re-run with --yes to confirm.");
    }

    let mut store = FileStore::open_default()?;
    clear_all(&mut store)?;
    println!("All data cleared.");
    Ok(())
}

fn run_tui() -> Result<()> {
    // Show which directory we're using
    let data_dir = get_data_dir()?;
    eprintln!("Using data directory: {}", data_dir.display());

    let store = FileStore::open_default()?;
    let mut app = AppState::new(store)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Print any errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<S: KvStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
) -> Result<()> {
    let tick_rate = ticker::tick_duration();

    loop {
        // Render
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    let should_quit = input::handle_key(app, key)?;
                    if should_quit {
                        return Ok(());
                    }
                }
            }
        }

        // Advance the countdown; mutations persist themselves, so there is
        // no save-on-exit step
        app.tick()?;
    }
}
