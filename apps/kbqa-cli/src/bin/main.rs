use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kbqa_answer::{AnswerGenerator, GeminiClient};
use kbqa_cli::{init_tracing, knowledge_store, load_settings, print_hits, Session};
use kbqa_core::config::Settings;
use kbqa_store::{export_text, parse_text, Section};

#[derive(Parser, Debug)]
#[command(name = "kbqa", about = "Question answering over a local knowledge base")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank knowledge chunks for a query
    Search {
        query: String,
        /// Number of chunks to return (defaults to retrieval.top_k)
        #[arg(long)]
        k: Option<usize>,
        /// Extra directory of .txt/.md files to index for this run
        #[arg(long, env = "KBQA_DOCS")]
        docs: Option<PathBuf>,
    },
    /// Retrieve and answer a question
    Ask {
        query: String,
        #[arg(long)]
        k: Option<usize>,
        #[arg(long, env = "KBQA_DOCS")]
        docs: Option<PathBuf>,
    },
    /// Interactive question loop on stdin
    Chat {
        #[arg(long, env = "KBQA_DOCS")]
        docs: Option<PathBuf>,
    },
    /// Inspect and edit the knowledge base
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
}

#[derive(Subcommand, Debug)]
enum KbAction {
    /// List sections
    Show,
    /// Print the text export used for retrieval
    Export,
    /// Replace all sections with ones parsed from a legacy text file
    ImportText { file: PathBuf },
    /// Add a section whose content is read from a file
    Add { title: String, content_file: PathBuf },
    /// Remove a section by title
    Remove { title: String },
    /// List saved versions
    Versions,
    /// Make a saved version current
    Restore { version: String },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings()?;
    match cli.command {
        Command::Search { query, k, docs } => {
            let session = Session::build(settings, docs.as_deref())?;
            print_hits(&session.search(&query, k));
        }
        Command::Ask { query, k, docs } => {
            let session = Session::build(settings, docs.as_deref())?;
            ask(&session, &query, k);
        }
        Command::Chat { docs } => {
            let session = Session::build(settings, docs.as_deref())?;
            chat(&session)?;
        }
        Command::Kb { action } => kb(&settings, action)?,
    }
    Ok(())
}

fn ask(session: &Session, query: &str, k: Option<usize>) {
    let hits = session.search(query, k);
    let generator = match GeminiClient::from_settings(&session.settings.generator) {
        Ok(g) => g,
        Err(e) => {
            println!("{}", e.user_message());
            return;
        }
    };
    match generator.answer(query, &hits) {
        Ok(answer) => {
            println!("{}\n", answer.text);
            if !answer.sources.is_empty() {
                println!("Sources ({}):", answer.model);
                for s in &answer.sources {
                    println!("  - {} (part {}/{}, score {:.2})", s.doc_title, s.chunk_index + 1, s.total_chunks, s.score);
                }
            }
        }
        Err(e) => println!("{}", e.user_message()),
    }
}

fn chat(session: &Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("Ask a question (empty line or Ctrl-D to quit).");
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            break;
        }
        ask(session, query, None);
        println!();
    }
    Ok(())
}

fn kb(settings: &Settings, action: KbAction) -> Result<()> {
    let store = knowledge_store(settings);
    match action {
        KbAction::Show => {
            let kb = store.load()?;
            println!("version {} ({} sections)", kb.version, kb.sections.len());
            for (i, s) in kb.sections.iter().enumerate() {
                let origin = if s.auto_synced { " [synced]" } else { "" };
                println!("{:>3}. {}{} ({} chars)", i + 1, s.title, origin, s.content.chars().count());
            }
        }
        KbAction::Export => print!("{}", export_text(&store.load()?, &settings.store.export_header)),
        KbAction::ImportText { file } => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let mut kb = store.load()?;
            kb.sections = parse_text(&text);
            kb.extra.insert("migrated_from".into(), file.display().to_string().into());
            let version = store.save(&mut kb, &format!("Import from {}", file.display()))?;
            println!("imported {} sections as version {version}", kb.sections.len());
        }
        KbAction::Add { title, content_file } => {
            let content = std::fs::read_to_string(&content_file)
                .with_context(|| format!("reading {}", content_file.display()))?;
            let mut kb = store.load()?;
            kb.add_section(Section::new(title.as_str(), content.trim()))?;
            let version = store.save(&mut kb, &format!("Add section {title}"))?;
            println!("saved version {version}");
        }
        KbAction::Remove { title } => {
            let mut kb = store.load()?;
            kb.remove_section(&title)?;
            let version = store.save(&mut kb, &format!("Remove section {title}"))?;
            println!("saved version {version}");
        }
        KbAction::Versions => {
            for v in store.versions()? {
                println!("{:<8} {}  {}  {}", v.version, v.hash, v.timestamp, v.commit_message);
            }
        }
        KbAction::Restore { version } => {
            let kb = store.restore(&version)?;
            println!("restored {version} ({} sections)", kb.sections.len());
        }
    }
    Ok(())
}
