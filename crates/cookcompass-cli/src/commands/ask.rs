//! One-shot question command

use super::open_engine;
use crate::app::{AskArgs, OutputFormat};
use crate::output;
use cookcompass_core::ChatMessage;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;

pub async fn run(args: AskArgs, config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let engine = open_engine(config_path).await?;
    let conversation = vec![ChatMessage::user(args.question.join(" "))];

    let Some(plan) = engine.prepare_turn(&conversation).await? else {
        return Ok(());
    };

    if format == OutputFormat::Json {
        let answer = engine.stream_plan(&plan).collect_text().await?;
        println!("{}", output::json::format_turn(&plan, &answer));
        return Ok(());
    }

    if args.plan {
        print!("{}", output::terminal::format_plan(&plan));
    }

    let mut stream = engine.stream_plan(&plan);
    let mut stdout = std::io::stdout();
    while let Some(fragment) = stream.next().await {
        print!("{}", fragment?);
        stdout.flush()?;
    }
    println!();

    Ok(())
}
