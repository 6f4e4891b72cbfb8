use anyhow::Context;
use clap::Parser;
use libtranslit_core::{Config, ContextId, ImeContext, ImeEngine, InMemoryDictionary, KeyResult};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

mod script;
mod wordlist;

use wordlist::{WordList, WordListLoader};

#[derive(Parser)]
#[command(name = "translit")]
#[command(about = "Drive the transliteration input method from key scripts on stdin")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Word list file (TOML); a small built-in list is used otherwise
    #[arg(short, long)]
    words: Option<PathBuf>,

    /// Scheme to activate
    #[arg(short, long, default_value = "ml")]
    scheme: String,

    /// Print the available schemes and exit
    #[arg(long)]
    list_schemes: bool,
}

const IC: ContextId = ContextId(0);

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::new("warn"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_state(ctx: &ImeContext, committed: &str) {
    if !committed.is_empty() {
        println!("commit:     {:?}", committed);
    }
    if ctx.preedit_text.is_empty() {
        return;
    }
    println!("preedit:    {} (cursor {})", ctx.preedit_text, ctx.preedit_cursor);
    if ctx.candidates.is_empty() {
        return;
    }
    let page: Vec<String> = ctx
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mark = if ctx.candidate_cursor == Some(i) { "*" } else { "" };
            format!("{}{}.{}", mark, i + 1, c)
        })
        .collect();
    if ctx.auxiliary_text.is_empty() {
        println!("candidates: {}", page.join("  "));
    } else {
        println!("candidates: {}  [{}]", page.join("  "), ctx.auxiliary_text);
    }
}

fn run(engine: &mut ImeEngine, config: &Config) -> anyhow::Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let events = match script::parse(&line, config) {
            Ok(events) => events,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        let mut committed = String::new();
        for event in events {
            if engine.process_key(IC, event) == KeyResult::NotHandled {
                tracing::debug!(key = ?event.key, "passed through to host");
            }
            committed.push_str(&engine.context_mut(IC).take_commit());
        }
        print_state(engine.context(IC), &committed);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_toml(path)?,
        None => Config::default(),
    };
    let words = match &cli.words {
        Some(path) => WordList::load(path)?,
        None => WordList::demo()?,
    };

    let dictionary = InMemoryDictionary::new();
    let mut engine = ImeEngine::new(
        Box::new(WordListLoader::new(words)),
        Arc::new(dictionary.clone()),
        config,
    );

    if cli.list_schemes {
        for scheme in engine.list_schemes() {
            println!("{}\t{}\t{}", scheme.id, scheme.display_name, scheme.lang_code);
        }
        return Ok(());
    }

    engine
        .activate(&cli.scheme)
        .with_context(|| format!("activating scheme {:?}", cli.scheme))?;

    let config = engine.config().clone();
    run(&mut engine, &config)?;
    engine.shutdown();

    let mut learned: Vec<_> = dictionary.snapshot().into_iter().collect();
    learned.sort();
    for (word, count) in learned {
        println!("learned:    {} ({})", word, count);
    }
    Ok(())
}
