//! Interactive chat command

use super::open_engine;
use cookcompass_core::{ChatMessage, InferenceEngine};
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let engine = open_engine(config_path).await?;

    println!("Cook Compass. What's cooking? (/reset clears the chat, /quit exits)");

    let mut history: Vec<ChatMessage> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                history.clear();
                println!("Chat cleared.");
                continue;
            }
            _ => {}
        }

        history.push(ChatMessage::user(input));
        match take_turn(&engine, &history).await {
            Ok(reply) => history.push(ChatMessage::assistant(reply)),
            Err(e) => {
                // Keep user and assistant turns alternating
                history.pop();
                eprintln!("Error: {:#}", e);
            }
        }
    }

    Ok(())
}

/// Stream one reply to stdout and return its full text
async fn take_turn(engine: &InferenceEngine, history: &[ChatMessage]) -> anyhow::Result<String> {
    let mut stream = engine.stream_response(history).await?;
    let mut reply = String::new();
    let mut stdout = std::io::stdout();

    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(fragment) => {
                print!("{}", fragment);
                stdout.flush()?;
                reply.push_str(&fragment);
            }
            Err(e) => {
                println!();
                return Err(e.into());
            }
        }
    }
    println!();

    Ok(reply)
}
