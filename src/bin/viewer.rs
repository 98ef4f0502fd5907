//! Chzzk live chat viewer CLI.
//!
//! Resolves the channel's live chat session, follows the chat in the
//! terminal, and reconnects until interrupted. Optionally appends the
//! formatted lines to a log file.
//!
//! Run with:
//! ```not_rust
//! cargo run -- --channel-id <channel>
//! cargo run -- -c <channel> --save
//! cargo run -- -c <channel> --output chat.txt
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::{mpsc, watch};

use chzzk_chat_viewer::client::sink::{FileSink, consume_updates};
use chzzk_chat_viewer::client::run_supervisor;
use chzzk_chat_viewer::common::logger::setup_logger;
use chzzk_chat_viewer::common::time::now_kst;

#[derive(Parser, Debug)]
#[command(name = "chzzk-chat-viewer")]
#[command(about = "Follow the live chat of a Chzzk channel", long_about = None)]
struct Args {
    /// Channel ID of the broadcaster (from the channel page URL)
    #[arg(short = 'c', long)]
    channel_id: String,

    /// Append formatted chat lines to a log file
    #[arg(short = 's', long, default_value_t = false)]
    save: bool,

    /// Chat log path (implies --save)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn default_log_path(channel_id: &str) -> PathBuf {
    PathBuf::from(format!(
        "chzzk_chat_{}_{}.txt",
        channel_id,
        now_kst().format("%Y%m%d_%H%M%S")
    ))
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let channel_id = args.channel_id.trim().to_string();
    if channel_id.is_empty() {
        tracing::error!("channel id must not be empty");
        std::process::exit(1);
    }

    let log_file = if args.save || args.output.is_some() {
        let path = args.output.unwrap_or_else(|| default_log_path(&channel_id));
        match FileSink::open(&path).await {
            Ok(sink) => {
                tracing::info!("appending chat log to {}", path.display());
                Some(sink)
            }
            Err(e) => {
                tracing::error!("cannot open chat log {}: {e}", path.display());
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);

    let supervisor = tokio::spawn(run_supervisor(channel_id, update_tx, stop_rx));
    let consumer = tokio::spawn(consume_updates(update_rx, log_file));

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("stop requested, closing connection..."),
        Err(e) => tracing::error!("failed to listen for ctrl-c: {e}"),
    }
    let _ = stop_tx.send(true);

    // Supervisor exits first and drops its sender; the consumer then drains
    // the channel and closes the log file.
    let _ = supervisor.await;
    let _ = consumer.await;
}
