//! Interactive console driver: reads lines from stdin and feeds them to the engine.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;
use uuid::Uuid;

use crate::conversation::engine::ChatEngine;
use crate::errors::AppError;
use crate::models::conversation::SessionPhase;

const EXIT_COMMAND: &str = "exit";
const RESTART_COMMAND: &str = "restart";

/// Runs the console loop on stdin/stdout until `exit` or end of input.
pub async fn run(engine: Arc<ChatEngine>) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_with_io(engine, stdin, stdout).await
}

pub async fn run_with_io<R, W>(engine: Arc<ChatEngine>, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session_key = Uuid::new_v4().to_string();
    info!("CLI session {session_key} started");

    write_line(
        &mut output,
        "AI: Welcome to the AI CV generation chat. Type 'exit' to quit.",
    )
    .await?;
    write_line(
        &mut output,
        "AI: The first phase is collect info, write PROCEED to move on to create the CV\n",
    )
    .await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let user_input = line.trim();

        if user_input.eq_ignore_ascii_case(EXIT_COMMAND) {
            write_line(&mut output, "Exiting chat.").await?;
            break;
        }
        if user_input.is_empty() {
            continue;
        }
        if user_input.eq_ignore_ascii_case(RESTART_COMMAND) {
            engine.reset(&session_key);
            session_key = Uuid::new_v4().to_string();
            info!("CLI session restarted as {session_key}");
            write_line(&mut output, "AI: Starting over. What is your seniority level?\n").await?;
            continue;
        }

        match engine.advance(&session_key, user_input).await {
            Ok(outcome) => {
                write_line(&mut output, &format!("AI: {}\n", outcome.reply)).await?;
                if outcome.phase == SessionPhase::Completed {
                    write_line(
                        &mut output,
                        "AI: Your CV draft is complete. Type 'restart' to begin a new one or 'exit' to quit.\n",
                    )
                    .await?;
                }
            }
            Err(AppError::SessionClosed(_)) => {
                write_line(
                    &mut output,
                    "AI: This CV draft is finished. Type 'restart' to begin a new one or 'exit' to quit.\n",
                )
                .await?;
            }
            Err(e) => {
                write_line(
                    &mut output,
                    &format!("AI: Sorry, that turn failed ({e}). Please repeat your message.\n"),
                )
                .await?;
            }
        }
    }

    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::engine::EngineSettings;
    use crate::conversation::testing::ScriptedModel;

    async fn transcript(model: ScriptedModel, input: &str) -> (String, Arc<ChatEngine>) {
        let engine = Arc::new(ChatEngine::new(Arc::new(model), EngineSettings::default()));
        let mut output = Vec::new();
        run_with_io(engine.clone(), input.as_bytes(), &mut output)
            .await
            .unwrap();
        (String::from_utf8(output).unwrap(), engine)
    }

    #[tokio::test]
    async fn test_exit_stops_loop() {
        let (out, engine) = transcript(ScriptedModel::new(), "exit\nI'm a senior analyst\n").await;
        assert!(out.contains("Welcome"));
        assert!(out.contains("Exiting chat."));
        assert_eq!(engine.session_count(), 0);
    }

    #[tokio::test]
    async fn test_full_conversation() {
        let model = ScriptedModel::new()
            .reply("Are you applying for a specific job?")
            .reply("Generating.")
            .reply("Key Qualities\nExcel.");
        let (out, _) = transcript(model, "I'm a senior analyst\nproceed\nanything else\nexit\n").await;

        assert!(out.contains("AI: Are you applying for a specific job?"));
        assert!(out.contains("AI: Key Qualities\nExcel."));
        assert!(out.contains("Your CV draft is complete"));
        assert!(out.contains("This CV draft is finished"));
    }

    #[tokio::test]
    async fn test_failed_turn_asks_user_to_repeat() {
        let (out, _) = transcript(ScriptedModel::new(), "hello\n").await;
        assert!(out.contains("Please repeat your message."));
    }

    #[tokio::test]
    async fn test_restart_starts_new_session() {
        let model = ScriptedModel::new()
            .reply("Question?")
            .reply("Question again?");
        let (out, engine) = transcript(model, "hi\nrestart\nhi\n").await;
        assert!(out.contains("Starting over."));
        assert_eq!(engine.session_count(), 1);
    }
}
