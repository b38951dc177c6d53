//! Command execution for the terminal client.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use barcart_shared::protocol::MemberId;

use crate::{
    chat::{ChatEvent, ConnectionState},
    context::{ClientContext, ContextEvents},
    directory::RoomDirectory,
    error::ChatError,
    guard::AuthEvent,
};

use super::{error::CliError, formatter::MessageFormatter};

/// `barcart-client rooms`
pub async fn run_rooms(context: &ClientContext) -> Result<(), CliError> {
    let rooms = context.directory().list_rooms().await?;
    print!("{}", MessageFormatter::format_room_list(&rooms));
    Ok(())
}

/// `barcart-client chat --room <id>`: join, print the log as it grows and send
/// each input line. Returns when the user exits or the session ends.
pub async fn run_chat(
    context: &ClientContext,
    events: ContextEvents,
    room_id: &str,
) -> Result<(), CliError> {
    let me = context.me().await?;
    tracing::info!("Signed in as {} (#{})", me.nickname, me.member_id);

    let chat = context.chat();
    chat.connect().await?;
    if let Err(e) = chat.join(room_id, me.member_id).await {
        chat.leave().await;
        return Err(e.into());
    }
    println!(
        "\nYou are '{}' in room {}. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        me.nickname, room_id
    );

    let ContextEvents {
        auth: mut auth_events,
        chat: chat_events,
    } = events;
    let mut printer = tokio::spawn(print_events(
        chat_events,
        me.member_id,
        me.nickname.clone(),
    ));
    let mut input_rx = spawn_readline(me.nickname.clone());

    loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break;
                };
                match chat.send(&line).await {
                    Ok(()) => {}
                    Err(ChatError::EmptyMessage) => {}
                    Err(e) => {
                        print!("{}", MessageFormatter::format_error(&e));
                        redisplay_prompt(&me.nickname);
                    }
                }
            }
            Some(event) = auth_events.recv() => {
                if let AuthEvent::LoggedOut(reason) = event {
                    tracing::warn!("Session ended ({:?}), leaving the room", reason);
                    break;
                }
            }
            _ = &mut printer => {
                break;
            }
        }
    }

    chat.leave().await;
    printer.abort();
    Ok(())
}

/// Print chat events until the session is given up for good
async fn print_events(
    mut events: mpsc::UnboundedReceiver<ChatEvent>,
    me: MemberId,
    nickname: String,
) {
    // Non-zero while automatic reconnect attempts are running.
    let mut attempts_made = 0;
    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::Message(frame) => {
                print!("{}", MessageFormatter::format_chat_frame(&frame, me));
            }
            ChatEvent::StateChanged(state) => {
                if state == ConnectionState::Joined {
                    attempts_made = 0;
                }
                print!("{}", MessageFormatter::format_state(state));
            }
            ChatEvent::Reconnecting {
                attempt,
                max_attempts,
            } => {
                attempts_made = attempt;
                print!(
                    "{}",
                    MessageFormatter::format_reconnecting(attempt, max_attempts)
                );
            }
            ChatEvent::Error(e) => {
                print!("{}", MessageFormatter::format_error(&e));
                // A transport error outside a reconnect means no reconnect
                // follows; during one, only the final failure is reported.
                if matches!(e, ChatError::Transport(_)) || attempts_made > 0 {
                    return;
                }
            }
        }
        redisplay_prompt(&nickname);
    }
}

/// Read lines on a blocking thread; the channel closes on Ctrl+C / Ctrl+D
fn spawn_readline(nickname: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };
        let prompt = format!("{}> ", nickname);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Print the input prompt again after an incoming line
fn redisplay_prompt(nickname: &str) {
    print!("{}> ", nickname);
    std::io::stdout().flush().ok();
}
