//! Integration test common infrastructure.
//!
//! Provides a scripted IRC server on one end of an in-memory pipe, with the
//! bot's session running on the other end, plus helpers for policy files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use opbot::{EventAdapter, PolicyService, SessionResult};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Policy used by most integration tests.
#[allow(dead_code)]
pub const POLICY: &str = r##"{
    "bot": { "nickname": "opbot", "username": "opbot", "realname": "Channel op bot" },
    "servers": [
        { "hostname": "irc.example.net" }
    ],
    "users": [
        { "name": "alice", "mask": "alice!*@trusted.example", "class": "admin" },
        { "name": "bob", "mask": "bob!*@*.example.org" }
    ],
    "channels": [
        { "name": "#test", "operators": ["alice"] },
        { "name": "#dev", "operators": ["alice", "bob"] }
    ]
}
"##;

/// A policy file in a temporary directory.
pub struct PolicyFile {
    _dir: TempDir,
    pub path: PathBuf,
}

impl PolicyFile {
    pub fn new(contents: &str) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("policy.json");
        std::fs::write(&path, contents)?;
        Ok(Self { _dir: dir, path })
    }

    #[allow(dead_code)]
    pub fn write(&self, contents: &str) -> anyhow::Result<()> {
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    pub fn open(&self) -> anyhow::Result<Arc<PolicyService>> {
        Ok(Arc::new(PolicyService::open(&self.path)?))
    }
}

/// Server end of a bot session.
pub struct MockServer {
    reader: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
    pub session: JoinHandle<SessionResult>,
}

impl MockServer {
    /// Start a session for `service` and return the server end.
    pub fn start(service: Arc<PolicyService>) -> Self {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let session = tokio::spawn(async move {
            let mut adapter = EventAdapter::new(service);
            opbot::network::serve(client, &mut adapter).await
        });

        let (read, writer) = tokio::io::split(server);
        Self {
            reader: BufReader::new(read).lines(),
            writer,
            session,
        }
    }

    /// Send a raw line to the bot.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.send_bytes(line.as_bytes()).await
    }

    /// Send a raw line that need not be valid UTF-8.
    pub async fn send_bytes(&mut self, line: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(line).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line from the bot.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        match timeout(dur, self.reader.next_line()).await?? {
            Some(line) => Ok(line),
            None => anyhow::bail!("bot closed the connection"),
        }
    }

    /// Assert the next line from the bot is exactly `expected`.
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let line = self.recv().await?;
        anyhow::ensure!(line == expected, "expected {:?}, got {:?}", expected, line);
        Ok(())
    }

    /// Round-trip a PING, asserting the bot sent nothing else before the PONG.
    #[allow(dead_code)]
    pub async fn sync(&mut self) -> anyhow::Result<()> {
        self.send_raw("PING :sync").await?;
        self.expect("PONG sync").await
    }

    /// Complete registration and return the bot's initial JOIN lines.
    pub async fn register(&mut self, nickname: &str, channels: usize) -> anyhow::Result<Vec<String>> {
        self.expect(&format!("NICK {}", nickname)).await?;
        let user = self.recv().await?;
        anyhow::ensure!(user.starts_with("USER "), "expected USER, got {:?}", user);

        self.send_raw(&format!(":irc.example.net 001 {} :Welcome to the network", nickname))
            .await?;

        let mut joins = Vec::with_capacity(channels);
        for _ in 0..channels {
            joins.push(self.recv().await?);
        }
        Ok(joins)
    }

    /// Confirm the bot's join to `channel` and op it there.
    #[allow(dead_code)]
    pub async fn join_and_op(&mut self, nickname: &str, channel: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(":{}!bot@bot.host JOIN {}", nickname, channel))
            .await?;
        self.send_raw(&format!(":ChanServ!s@services MODE {} +o {}", channel, nickname))
            .await?;
        Ok(())
    }

    /// Close the server end and wait for the session to finish.
    #[allow(dead_code)]
    pub async fn close(self) -> anyhow::Result<SessionResult> {
        drop(self.reader);
        drop(self.writer);
        Ok(timeout(Duration::from_secs(5), self.session).await??)
    }
}
