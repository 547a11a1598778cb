//! One registered session with an IRC server.
//!
//! The session writes `NICK`/`USER`, answers `PING`, resolves nickname
//! collisions during registration, and feeds every other line through the
//! [`EventAdapter`] in arrival order.

use futures_util::{SinkExt, StreamExt};
use opbot_proto::response::{ERR_NICKNAMEINUSE, RPL_WELCOME};
use opbot_proto::{Command, Line, LineCodec, MAX_IRC_LINE_LEN, Message};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::adapter::{Event, EventAdapter};
use crate::error::{SessionError, SessionResult};

type Lines<S> = Framed<S, LineCodec>;

async fn send<S>(framed: &mut Lines<S>, command: &Command) -> SessionResult
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!(line = %command, "Sending");
    framed.send(command.to_string()).await?;
    Ok(())
}

/// Drive a session over `stream` until the server goes away.
///
/// Always ends in an error; [`SessionError::Closed`] when the server closed
/// the connection cleanly.
pub async fn serve<S>(stream: S, adapter: &mut EventAdapter) -> SessionResult
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, LineCodec::default());
    let mut registered = false;

    let policy = adapter.service().current();
    send(&mut framed, &Command::Nick(adapter.nickname().to_owned())).await?;
    send(
        &mut framed,
        &Command::User {
            username: policy.username.clone(),
            realname: policy.realname.clone(),
        },
    )
    .await?;
    drop(policy);

    while let Some(frame) = framed.next().await {
        let line = match frame? {
            Line::Text(line) => line,
            Line::Overlong => {
                warn!(limit = MAX_IRC_LINE_LEN, "Discarded over-long line");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let msg = match line.parse::<Message>() {
            Ok(m) => m,
            Err(e) => {
                warn!(line = %line, "Failed to parse inbound message: {}", e);
                continue;
            }
        };

        match msg.command.as_str() {
            "PING" => {
                let token = msg.param(0).unwrap_or_default().to_owned();
                send(&mut framed, &Command::Pong(token)).await?;
                continue;
            }
            ERR_NICKNAMEINUSE if !registered => {
                let nickname = format!("{}_", adapter.nickname());
                info!(nickname = %nickname, "Nickname in use, retrying");
                adapter.set_nickname(nickname.as_str());
                send(&mut framed, &Command::Nick(nickname)).await?;
                continue;
            }
            RPL_WELCOME => {
                registered = true;
                if let Some(nickname) = msg.param(0) {
                    adapter.set_nickname(nickname);
                }
            }
            _ => {}
        }

        let Some(event) = Event::from_message(&msg) else {
            continue;
        };

        for command in adapter.handle(event) {
            send(&mut framed, &command).await?;
        }
    }

    Err(SessionError::Closed)
}
