//! Echo Bot Demo
//!
//! A console bot showing the Courier registration API. Updates are read as
//! JSON lines from stdin; every Bot API call the handlers make is printed to
//! stdout as a JSON line instead of being sent anywhere.
//!
//! # Usage
//!
//! ```bash
//! echo '{"update_id":1,"message":{"message_id":1,"date":0,"chat":{"id":7,"type":"private"},"text":"/echo hi there"}}' \
//!     | cargo run --package echo-bot
//! ```
//!
//! The bot stops on Ctrl+C or when stdin closes, after every running handler
//! has finished.

use std::any::Any;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use courier::prelude::*;
use courier::runtime::config::{ConfigLoader, LogOutput, validate_config};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, mpsc};

// ============================================================================
// Console client
// ============================================================================

/// A client that prints API calls instead of performing them.
struct ConsoleBot {
    stdout: Mutex<tokio::io::Stdout>,
}

impl ConsoleBot {
    fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

#[async_trait]
impl Bot for ConsoleBot {
    fn id(&self) -> &str {
        "console"
    }

    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value> {
        let mut line = serde_json::to_vec(&json!({ "method": method, "params": params }))?;
        line.push(b'\n');

        let mut stdout = self.stdout.lock().await;
        stdout
            .write_all(&line)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Value::Bool(true))
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

async fn send_message(bot: &BoxedBot, chat_id: i64, text: &str) {
    let params = json!({ "chat_id": chat_id, "text": text });
    if let Err(e) = bot.call_api("sendMessage", params).await {
        error!(error = %e, chat_id, "Failed to send message");
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn start_handler(bot: BoxedBot, message: Message) {
    let name = message
        .from
        .as_ref()
        .map_or("there", |user| user.first_name.as_str());
    send_message(&bot, message.chat.id, &format!("Hello, {name}! Try /help.")).await;
}

async fn help_handler(bot: BoxedBot, message: Message) {
    let help = "/echo <text> - Echo text\n\
                /help        - This help\n\
                Anything else in a private chat is echoed back.";
    send_message(&bot, message.chat.id, help).await;
}

async fn echo_handler(bot: BoxedBot, message: Message) {
    let Some(command) = parse_command(message.text()) else {
        return;
    };
    send_message(&bot, message.chat.id, &command.args.join(" ")).await;
}

async fn private_echo_handler(bot: BoxedBot, message: Message) {
    info!(chat_id = message.chat.id, text = message.text(), "Echoing private message");
    send_message(&bot, message.chat.id, message.text()).await;
}

async fn vote_handler(bot: BoxedBot, query: CallbackQuery) {
    let choice = query.data().trim_start_matches("vote:");
    let params = json!({
        "callback_query_id": query.id,
        "text": format!("You voted {choice}"),
    });
    if let Err(e) = bot.call_api("answerCallbackQuery", params).await {
        error!(error = %e, "Failed to answer callback query");
    }
}

async fn inline_handler(bot: BoxedBot, query: InlineQuery) {
    let results = json!([{
        "type": "article",
        "id": "echo",
        "title": format!("Echo: {}", query.query),
        "input_message_content": { "message_text": query.query },
    }]);
    let params = json!({ "inline_query_id": query.id, "results": results });
    if let Err(e) = bot.call_api("answerInlineQuery", params).await {
        error!(error = %e, "Failed to answer inline query");
    }
}

async fn join_request_handler(bot: BoxedBot, request: ChatJoinRequest) {
    let params = json!({ "chat_id": request.chat.id, "user_id": request.from.id });
    if let Err(e) = bot.call_api("approveChatJoinRequest", params).await {
        error!(error = %e, "Failed to approve join request");
    }
}

fn register(bh: &mut BotHandler) {
    bh.handle_message(start_handler, [command_equal("start")])
        .handle_message(help_handler, [command_equal("help")])
        .handle_message(echo_handler, [command_equal("echo")])
        .handle_callback_query(vote_handler, [callback_data_prefix("vote:")])
        .handle_inline_query(inline_handler, [not(inline_query_equal(""))])
        .handle_chat_join_request(join_request_handler, []);

    bh.group([private_chat()])
        .name("private")
        .handle_message(private_echo_handler, [any_message_with_text(), not(any_command())]);
}

// ============================================================================
// Update source
// ============================================================================

/// Forwards JSON-line updates from stdin until EOF or the handler goes away.
async fn read_updates(tx: mpsc::Sender<Update>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match Update::from_json(&line) {
            Ok(update) => {
                if tx.send(update).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Skipping malformed update"),
        }
    }

    debug!("Stdin closed, no more updates");
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries the bot's API calls, so logs go to stderr.
    let mut config = ConfigLoader::new().with_current_dir().load()?;
    if config.logging.output == LogOutput::Stdout {
        config.logging.output = LogOutput::Stderr;
    }
    validate_config(&config)?;

    let runtime = CourierRuntime::from_config(&config);
    let (tx, rx) = runtime.update_channel();

    let mut bh = BotHandler::new(Arc::new(ConsoleBot::new()), rx);
    register(&mut bh);
    info!(
        handlers = bh.router().handler_count(),
        "Echo bot ready, reading updates from stdin"
    );

    let reader = tokio::spawn(read_updates(tx));
    runtime.run(&bh).await?;

    reader.abort();
    Ok(())
}
