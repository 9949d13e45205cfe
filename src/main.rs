//! Terminal demo: one human seat on the engine, driven over stdin.
//!
//! Lines starting with `/` are commands (`/who`, `/ai NAME`, `/human NAME`,
//! `/leave`); everything else goes to the room as a message. Incoming
//! entries print as they land via the message subscription.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use parlor::{ChatService, EntryKind, Event, EventKind, LlmClient, ParticipantId};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let llm = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            client
        }
        Err(e) => {
            eprintln!("LLM configuration error: {e}");
            eprintln!("set LLM_PROVIDER (anthropic | openai) and the matching API key variable");
            std::process::exit(1);
        }
    };

    let service = ChatService::new(Arc::new(llm));

    // Print each entry exactly once, as it lands.
    let printed = Arc::new(Mutex::new(0_usize));
    {
        let printed = Arc::clone(&printed);
        service.subscribe(EventKind::Message, move |event| {
            let Event::Message(log) = event else { return };
            let mut printed = printed.lock().unwrap();
            for entry in &log[*printed..] {
                match entry.kind {
                    EntryKind::System => println!("   -- {}", entry.text),
                    EntryKind::User => println!("   [{}] {}", entry.author, entry.text),
                }
            }
            *printed = log.len();
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let me = loop {
        let Some(name) = prompt(&mut lines, "your name: ").await else {
            return;
        };
        if name.is_empty() {
            continue;
        }
        match service.join(&name).await {
            Ok(p) => break p,
            Err(e) => eprintln!("{e}"),
        }
    };

    loop {
        let Some(line) = prompt(&mut lines, "> ").await else {
            break;
        };
        match line.split_once(' ').unwrap_or((line.as_str(), "")) {
            ("/leave", _) => break,
            ("/who", _) => {
                for p in service.roster().await {
                    let mode = if p.is_automated { "AI" } else { "human" };
                    println!("   {} ({mode})", p.name);
                }
            }
            ("/ai", name) => set_mode(&service, name, true).await,
            ("/human", name) => set_mode(&service, name, false).await,
            (cmd, _) if cmd.starts_with('/') => {
                eprintln!("commands: /who, /ai NAME, /human NAME, /leave");
            }
            _ if line.is_empty() => {}
            _ => service.send_message(me.id, &line).await,
        }
    }

    service.leave(me.id).await;
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Option<String> {
    print!("{label}");
    let _ = std::io::stdout().flush();
    lines
        .next_line()
        .await
        .ok()
        .flatten()
        .map(|l| l.trim().to_string())
}

async fn set_mode(service: &Arc<ChatService>, name: &str, automated: bool) {
    match find_by_name(service, name).await {
        Some(id) => service.set_automated(id, automated).await,
        None => eprintln!("no such participant: {name}"),
    }
}

async fn find_by_name(service: &ChatService, name: &str) -> Option<ParticipantId> {
    service
        .roster()
        .await
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.id)
}
