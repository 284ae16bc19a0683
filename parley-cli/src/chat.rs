use anyhow::{Context, Result};
use colored::*;
use dialoguer::Input;
use parley_client::SignalingClient;
use parley_core::{RoomId, ServerEvent};
use tokio::sync::mpsc;

#[derive(clap::Args, Debug)]
pub struct ChatArgs {
    /// Room to join.
    room: String,

    #[arg(long, env = "PARLEY_URL", default_value = "ws://localhost:3000/ws")]
    url: String,

    /// Display name shown to other members. Prompted for when omitted.
    #[arg(short, long)]
    name: Option<String>,
}

pub async fn run(args: ChatArgs) -> Result<()> {
    let name = match args.name {
        Some(name) => name,
        None => tokio::task::spawn_blocking(|| {
            Input::<String>::new().with_prompt("Your name").interact_text()
        })
        .await??,
    };

    let (client, mut inbound) = SignalingClient::connect(&args.url)
        .await
        .with_context(|| format!("Failed to reach relay at {}", args.url))?;
    let room = RoomId::from(args.room);
    client.join_room(room.clone(), Some(name.clone()))?;

    println!(
        "{} {} {}",
        "💬 Joined".green().bold(),
        room.to_string().cyan(),
        format!("as {} ({})", name, client.connection_id()).dimmed()
    );
    println!("{}", "Type a message, or /quit to leave.".dimmed());

    let mut lines = spawn_line_reader();

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) if line.trim() == "/quit" => break,
                Some(line) if line.trim().is_empty() => {}
                Some(line) => client.send_chat(room.clone(), line, Some(name.clone()))?,
                None => break,
            },

            event = inbound.recv() => match event {
                Some(event) => print_event(event),
                None => {
                    println!("{}", "Relay closed the connection.".red());
                    break;
                }
            },
        }
    }

    Ok(())
}

fn print_event(event: ServerEvent) {
    match event {
        ServerEvent::UserConnected {
            connection_id,
            user_name,
        } => println!(
            "{} {}",
            "→".green(),
            format!("{} joined", label(&user_name, &connection_id.to_string())).green()
        ),
        ServerEvent::UserDisconnected { connection_id } => {
            println!("{} {}", "←".yellow(), format!("{connection_id} left").yellow())
        }
        ServerEvent::ReceiveChatMessage {
            message,
            sender_id,
            user_name,
        } => println!(
            "{} {}",
            format!("[{}]", label(&user_name, sender_id.as_str())).cyan().bold(),
            message
        ),
        ServerEvent::Signal(_) | ServerEvent::Welcome { .. } => {}
    }
}

fn label(user_name: &Option<String>, fallback: &str) -> String {
    user_name.clone().unwrap_or_else(|| fallback.to_owned())
}

fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        loop {
            let line = match Input::<String>::new().allow_empty(true).interact_text() {
                Ok(line) => line,
                Err(_) => return,
            };
            if tx.send(line).is_err() {
                return;
            }
        }
    });

    rx
}
