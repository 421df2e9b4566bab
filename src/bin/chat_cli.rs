//! chat-cli: 聊天传输命令行工具
//!
//! Usage:
//!   chat-cli send <message...>          Stream a reply to stdout
//!   chat-cli sessions <user-id>         List a user's sessions
//!   chat-cli messages <session-id>      Show a session's messages
//!   chat-cli end <session-id>           End a session
//!   chat-cli delete <session-id>        Delete a session

use anyhow::{bail, Context, Result};
use chat_transport::{CancelHandle, ChatBody, ChatClient};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "send" => cmd_send(&args[2..]).await,
        "sessions" => cmd_sessions(&args[2..]).await,
        "messages" => cmd_messages(&args[2..]).await,
        "end" => cmd_end(&args[2..]).await,
        "delete" => cmd_delete(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("chat-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"chat-cli: streaming chat transport

USAGE:
    chat-cli <COMMAND> [ARGS]

COMMANDS:
    send <message...>         Send a message and stream the reply
    sessions <user-id>        List sessions of a user
    messages <session-id>     Show messages of a session
    end <session-id>          End a session
    delete <session-id>       Delete a session
    version                   Show version information
    help                      Show this help message

ENVIRONMENT:
    CHAT_API_BASE_URL         Backend base URL (default http://localhost:5000)
    CHAT_ENDPOINT_PATH        Chat endpoint path (default /api/chat)
    CHAT_AUTH_TOKEN           Bearer token when no keyring entry exists
    CHAT_USER_ID              User id when no keyring entry exists
    RUST_LOG                  Log filter, e.g. chat_transport=debug"#
    );
}

fn one_arg<'a>(args: &'a [String], what: &str) -> Result<&'a str> {
    match args.first() {
        Some(v) if !v.is_empty() => Ok(v.as_str()),
        _ => bail!("missing <{what}>"),
    }
}

async fn cmd_send(args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("missing <message>");
    }
    let message = args.join(" ");
    let client = ChatClient::new().context("building client")?;

    let cancel = CancelHandle::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = client.send_message(message, Some(cancel)).await?;
    if let Some(session_id) = &result.meta.new_session_id {
        eprintln!("[session {session_id}]");
    }

    match result.body {
        ChatBody::Json(text) => println!("{text}"),
        ChatBody::Stream(mut chunks) => {
            let mut stdout = std::io::stdout();
            loop {
                match chunks.next_chunk().await {
                    Ok(Some(delta)) => {
                        write!(stdout, "{delta}")?;
                        stdout.flush()?;
                    }
                    Ok(None) => break,
                    Err(e) if e.is_cancelled() => {
                        eprintln!("\n[cancelled]");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            writeln!(stdout)?;
        }
    }
    Ok(())
}

async fn cmd_sessions(args: &[String]) -> Result<()> {
    let user_id = one_arg(args, "user-id")?;
    let client = ChatClient::new()?;
    let page = client
        .sessions()
        .list_sessions_by_user_id(user_id, None, None)
        .await?;
    println!(
        "{} session(s), page {}/{}",
        page.total, page.page, page.pages
    );
    for summary in page.sessions {
        let status = if summary.session.is_ended() { "ended" } else { "open" };
        println!(
            "  {}  started {}  {}  {} message(s)",
            summary.session.id,
            summary.session.session_started,
            status,
            summary.message_count.unwrap_or(0)
        );
    }
    Ok(())
}

async fn cmd_messages(args: &[String]) -> Result<()> {
    let session_id = one_arg(args, "session-id")?;
    let client = ChatClient::new()?;
    let messages = client
        .sessions()
        .get_messages_by_session_id(session_id, None)
        .await?;
    for msg in messages {
        println!("[{:?}] {}", msg.sender, msg.message);
    }
    Ok(())
}

async fn cmd_end(args: &[String]) -> Result<()> {
    let session_id = one_arg(args, "session-id")?;
    let client = ChatClient::new()?;
    let session = client.sessions().end_session_by_id(session_id).await?;
    println!(
        "ended {} at {}",
        session.id,
        session.session_ended.as_deref().unwrap_or("-")
    );
    Ok(())
}

async fn cmd_delete(args: &[String]) -> Result<()> {
    let session_id = one_arg(args, "session-id")?;
    let client = ChatClient::new()?;
    let deleted = client.sessions().delete_session_by_id(session_id).await?;
    println!("{}", if deleted { "deleted" } else { "not deleted" });
    Ok(())
}
