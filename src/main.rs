use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use keybridge::keymap::{parse_keys, CompositionOrder, InputHandler};
use keybridge::settings::{FileStore, SettingsContext, SettingsWatcher};

mod cli;

use cli::{describe_outcome, describe_press, parse_key_spec, CliArgs, Command};

const WATCH_DEBOUNCE: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    keybridge::tracing::init();

    let args = CliArgs::parse();

    if let Command::Keys { notation } = &args.command {
        for press in parse_keys(notation)? {
            println!("{}", describe_press(&press));
        }
        return Ok(());
    }

    let store = match args.config {
        Some(path) => FileStore::new(path),
        None => FileStore::default_location()
            .ok_or_else(|| anyhow!("no config directory available; pass --config"))?,
    };

    let context = Arc::new(SettingsContext::default());
    let snapshot = context
        .load_from(&store)
        .with_context(|| format!("loading {}", store.path().display()))?;

    match args.command {
        Command::Check => {
            println!("# {}", store.path().display());
            for diagnostic in &snapshot.diagnostics {
                println!("# warning: {}", diagnostic);
            }
            print!("{}", serde_yaml::to_string(&snapshot.tree)?);
        }
        Command::Resolve { url } => {
            let resolved = context.resolve(&url)?;
            println!(
                "# matched: {}",
                snapshot.sites.matching_patterns(&url).join(", ")
            );
            print!("{}", serde_yaml::to_string(&resolved)?);
        }
        Command::Translate { mode, watch } => {
            let mut watcher = if watch {
                Some(SettingsWatcher::new(store.clone(), WATCH_DEBOUNCE)?)
            } else {
                None
            };

            let mut handler = InputHandler::new(Arc::clone(&context), CompositionOrder::default());
            handler.set_mode(mode);

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for line in io::stdin().lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(watcher) = watcher.as_mut() {
                    for key in watcher.apply(&context) {
                        writeln!(out, "# reloaded {}", key)?;
                    }
                }
                match parse_key_spec(&line) {
                    Ok(event) => {
                        let outcome = handler.handle_key(&event)?;
                        writeln!(out, "{}", describe_outcome(&outcome))?;
                    }
                    Err(e) => writeln!(out, "# error: {}", e)?,
                }
                out.flush()?;
            }
        }
        Command::Keys { .. } => {}
    }

    Ok(())
}
