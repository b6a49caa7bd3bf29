#![forbid(unsafe_code)]

//! necro: roll attacks for a necromancer's minions from the terminal.
//!
//! Counts are remembered between runs in `<state-dir>/state.json`.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use necro::{Console, NecRomancer, Outcome};
use necro_runtime::ValueAccessorRegistry;
use necro_runtime::persist::{FileStorage, MemoryStorage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "necro")]
#[command(about = "Roll attacks for a necromancer's skeletons and zombies")]
struct Cli {
    /// Directory holding the saved counts
    #[arg(long, env = "NECRO_STATE_DIR", default_value = ".necro")]
    state_dir: PathBuf,

    /// Seed for reproducible rolls
    #[arg(long, env = "NECRO_SEED")]
    seed: Option<u64>,

    /// Keep counts in memory only
    #[arg(long)]
    in_memory: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("necro=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let app = if cli.in_memory {
        info!("keeping counts in memory");
        NecRomancer::new(MemoryStorage::new())?
    } else {
        info!(dir = %cli.state_dir.display(), "loading saved counts");
        NecRomancer::new(FileStorage::new(&cli.state_dir))?
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut console = Console::new(app, Rc::new(ValueAccessorRegistry::standard()))?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "necro: type `help` for commands")?;
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        match console.execute(&line?, &mut rng) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Continue(text)) if text.is_empty() => {}
            Ok(Outcome::Continue(text)) => writeln!(stdout, "{text}")?,
            Err(err) => {
                debug!(error = %err, "command failed");
                writeln!(stdout, "error: {err}")?;
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}
