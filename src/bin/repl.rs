//! Interactive terminal front-end for the assistant.
//!
//! Plain stdin/stdout loop. Lines starting with `:` are session commands;
//! anything else is a query.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

use pim_assistant::{
    Assistant, AssistantConfig, OllamaEmbeddingProvider, OllamaGenerator, SessionState, Table,
};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    });
}

const HELP: &str = "Commands:\n\
  :upload <path.csv>  attach a dataset and profile it\n\
  :reanalyze          re-profile the attached dataset\n\
  :detach             drop the attached dataset\n\
  :help               show this message\n\
  :quit               exit\n\
Anything else is asked as a question.";

fn upload(session: &mut SessionState, path: &str) {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) => {
            println!("Could not open {path}: {err}");
            return;
        }
    };
    match Table::from_csv_reader(file) {
        Ok(table) => {
            if session.attach_dataset(&name, table) {
                if let Some(profile) = session.profile() {
                    println!("{}", profile.render());
                }
            } else {
                println!("{name} is already attached; use :reanalyze to re-profile it.");
            }
        }
        Err(err) => {
            session.detach();
            println!("Could not parse {name}: {err}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AssistantConfig::from_env()?;
    let provider = Arc::new(OllamaEmbeddingProvider::new(&config.embedding)?);
    let generator = OllamaGenerator::new(&config.generation)?;
    let assistant = Assistant::bootstrap(config, provider, generator).await?;

    let mut session = SessionState::new();
    println!("PIM/MDM assistant ready. Type :help for commands.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ') {
            Some((":upload", path)) => upload(&mut session, path.trim()),
            _ => match line {
                ":quit" | ":exit" => break,
                ":help" => println!("{HELP}"),
                ":detach" => {
                    session.detach();
                    println!("Dataset detached.");
                }
                ":reanalyze" => {
                    if session.reanalyze() {
                        if let Some(profile) = session.profile() {
                            println!("{}", profile.render());
                        }
                    } else {
                        println!("No dataset attached.");
                    }
                }
                ":upload" => println!("Usage: :upload <path.csv>"),
                query => {
                    let answer = assistant.answer(query, &session).await?;
                    println!("{answer}");
                }
            },
        }
    }

    Ok(())
}
