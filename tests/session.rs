//! End-to-end session behavior against a scripted server.
//!
//! Covers registration, auto-join, op gating, auto-rejoin after a kick,
//! private-message commands and nickname collisions.

use anyhow::Result;
use opbot::{OpState, SessionError};

mod common;
use common::{MockServer, POLICY, PolicyFile};

#[tokio::test]
async fn test_registration_joins_every_policy_channel() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let mut server = MockServer::start(file.open()?);

    server.expect("NICK opbot").await?;
    server.expect("USER opbot 0 * :Channel op bot").await?;
    server
        .send_raw(":irc.example.net 001 opbot :Welcome to the network")
        .await?;
    server.expect("JOIN #dev").await?;
    server.expect("JOIN #test").await?;

    assert!(matches!(server.close().await?, Err(SessionError::Closed)));
    Ok(())
}

#[tokio::test]
async fn test_trusted_user_is_opped_once_bot_has_op() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let service = file.open()?;
    let mut server = MockServer::start(service.clone());
    server.register("opbot", 2).await?;

    // Joined but not opped: no op attempts yet.
    server.send_raw(":opbot!bot@bot.host JOIN #test").await?;
    server
        .send_raw(":alice!a@trusted.example JOIN #test")
        .await?;
    server.sync().await?;
    assert_eq!(service.op_state("#test"), OpState::JoinedUnopped);

    server
        .send_raw(":ChanServ!s@services MODE #test +o opbot")
        .await?;
    server.sync().await?;
    assert_eq!(service.op_state("#test"), OpState::JoinedOpped);

    server.send_raw(":mallory!m@evil.example JOIN #test").await?;
    server.sync().await?;

    server
        .send_raw(":alice!a@trusted.example JOIN #test")
        .await?;
    server.expect("MODE #test +o alice").await?;
    server.sync().await?;
    Ok(())
}

#[tokio::test]
async fn test_operator_lists_are_per_channel() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let mut server = MockServer::start(file.open()?);
    server.register("opbot", 2).await?;
    server.join_and_op("opbot", "#test").await?;
    server.join_and_op("opbot", "#dev").await?;

    server.send_raw(":bob!b@home.example.org JOIN #test").await?;
    server.sync().await?;

    server.send_raw(":bob!b@home.example.org JOIN #dev").await?;
    server.expect("MODE #dev +o bob").await?;
    Ok(())
}

#[tokio::test]
async fn test_kick_triggers_rejoin_with_fresh_state() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let service = file.open()?;
    let mut server = MockServer::start(service.clone());
    server.register("opbot", 2).await?;
    server.join_and_op("opbot", "#test").await?;
    server.sync().await?;

    server
        .send_raw(":chanop!c@host KICK #test opbot :out you go")
        .await?;
    server.expect("JOIN #test").await?;
    assert_eq!(service.op_state("#test"), OpState::NotJoined);

    server.send_raw(":opbot!bot@bot.host JOIN #test").await?;
    server
        .send_raw(":alice!a@trusted.example JOIN #test")
        .await?;
    server.sync().await?;
    assert_eq!(service.op_state("#test"), OpState::JoinedUnopped);
    Ok(())
}

#[tokio::test]
async fn test_ctcp_op_request() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let mut server = MockServer::start(file.open()?);
    server.register("opbot", 2).await?;
    server.join_and_op("opbot", "#test").await?;

    server
        .send_raw(":alice!a@trusted.example PRIVMSG opbot :\u{1}OP #test #elsewhere\u{1}")
        .await?;
    server.expect("MODE #test +o alice").await?;
    server.sync().await?;

    server
        .send_raw(":mallory!m@evil.example PRIVMSG opbot :\u{1}OP #test\u{1}")
        .await?;
    server.sync().await?;
    Ok(())
}

#[tokio::test]
async fn test_whoami_over_private_message() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let mut server = MockServer::start(file.open()?);
    server.register("opbot", 2).await?;

    server
        .send_raw(":alice!a@trusted.example PRIVMSG opbot :whoami")
        .await?;
    server.expect("NOTICE alice :Username: 'alice'").await?;
    server
        .expect("NOTICE alice :Hostmask: 'alice!*@trusted.example'")
        .await?;
    server.expect("NOTICE alice :Class:    'admin'").await?;

    server
        .send_raw(":mallory!m@evil.example PRIVMSG opbot :whoami")
        .await?;
    server.expect("NOTICE mallory :Unknown user").await?;

    server
        .send_raw(":alice!a@trusted.example PRIVMSG #test :whoami")
        .await?;
    server.sync().await?;
    Ok(())
}

#[tokio::test]
async fn test_nickname_collision_appends_underscore() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let service = file.open()?;
    let mut server = MockServer::start(service.clone());

    server.expect("NICK opbot").await?;
    server.expect("USER opbot 0 * :Channel op bot").await?;
    server
        .send_raw(":irc.example.net 433 * opbot :Nickname is already in use")
        .await?;
    server.expect("NICK opbot_").await?;
    server
        .send_raw(":irc.example.net 001 opbot_ :Welcome to the network")
        .await?;
    server.expect("JOIN #dev").await?;
    server.expect("JOIN #test").await?;

    // State changes now follow the new nickname.
    server.join_and_op("opbot_", "#test").await?;
    server.sync().await?;
    assert_eq!(service.op_state("#test"), OpState::JoinedOpped);
    Ok(())
}

#[tokio::test]
async fn test_malformed_lines_do_not_end_session() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let mut server = MockServer::start(file.open()?);
    server.register("opbot", 2).await?;

    server.send_raw(":prefix-only").await?;
    server.send_raw(":irc.example.net KICK").await?;
    server.sync().await?;
    Ok(())
}

#[tokio::test]
async fn test_non_utf8_line_keeps_session_and_op_state() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let service = file.open()?;
    let mut server = MockServer::start(service.clone());
    server.register("opbot", 2).await?;
    server.join_and_op("opbot", "#test").await?;

    server
        .send_bytes(b":carol!c@h PRIVMSG #test :caf\xe9")
        .await?;
    server.sync().await?;
    assert_eq!(service.op_state("#test"), OpState::JoinedOpped);

    server
        .send_raw(":alice!a@trusted.example JOIN #test")
        .await?;
    server.expect("MODE #test +o alice").await?;
    Ok(())
}

#[tokio::test]
async fn test_overlong_line_is_skipped() -> Result<()> {
    let file = PolicyFile::new(POLICY)?;
    let service = file.open()?;
    let mut server = MockServer::start(service.clone());
    server.register("opbot", 2).await?;
    server.join_and_op("opbot", "#test").await?;

    let flood = format!(":carol!c@h PRIVMSG #test :{}", "x".repeat(10_000));
    server.send_raw(&flood).await?;
    server.sync().await?;
    assert_eq!(service.op_state("#test"), OpState::JoinedOpped);
    Ok(())
}
