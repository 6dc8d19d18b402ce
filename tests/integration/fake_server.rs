//! A small in-process NNTP server with one group of numbered articles

use newsindex::config::ServerConfig;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// What the fake server serves
pub struct FakeNews {
    pub group: String,
    pub low: u64,
    pub high: u64,
    /// Numbers inside `low..=high` that answer 423
    pub missing: HashSet<u64>,
    /// The first `HEAD` of this number hangs up instead of answering
    pub drop_once_at: Option<u64>,
    /// Required `AUTHINFO` user and password
    pub credentials: Option<(String, String)>,
}

impl FakeNews {
    pub fn new(group: &str, low: u64, high: u64) -> Self {
        Self {
            group: group.to_string(),
            low,
            high,
            missing: HashSet::new(),
            drop_once_at: None,
            credentials: None,
        }
    }

    pub fn missing(mut self, numbers: &[u64]) -> Self {
        self.missing.extend(numbers);
        self
    }

    pub fn drop_once_at(mut self, number: u64) -> Self {
        self.drop_once_at = Some(number);
        self
    }

    pub fn credentials(mut self, user: &str, pass: &str) -> Self {
        self.credentials = Some((user.to_string(), pass.to_string()));
        self
    }

    pub async fn start(self) -> FakeServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(State {
            group: self.group,
            low: self.low,
            high: AtomicU64::new(self.high),
            missing: self.missing,
            drop_once_at: Mutex::new(self.drop_once_at),
            credentials: self.credentials,
            connections: AtomicUsize::new(0),
            heads: AtomicUsize::new(0),
        });

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                shared.connections.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(Arc::clone(&shared), stream));
            }
        });

        FakeServer { addr, state }
    }
}

struct State {
    group: String,
    low: u64,
    high: AtomicU64,
    missing: HashSet<u64>,
    drop_once_at: Mutex<Option<u64>>,
    credentials: Option<(String, String)>,
    connections: AtomicUsize,
    heads: AtomicUsize,
}

/// Handle to a running fake server
pub struct FakeServer {
    addr: SocketAddr,
    state: Arc<State>,
}

impl FakeServer {
    /// Client settings pointing at this server
    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            addr: self.addr.to_string(),
            tls: false,
            username: None,
            password: None,
            connections: 1,
            timeout: 5,
        }
    }

    /// Connections accepted so far
    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// `HEAD` commands received so far
    pub fn heads(&self) -> usize {
        self.state.heads.load(Ordering::SeqCst)
    }

    /// Simulates new articles arriving
    pub fn set_high(&self, high: u64) {
        self.state.high.store(high, Ordering::SeqCst);
    }
}

pub fn message_id(number: u64) -> String {
    format!("<{}@fake.test>", number)
}

fn head_block(group: &str, number: u64) -> String {
    format!(
        "221 {n} {id} headers follow\r\n\
         Path: fake!not-for-mail\r\n\
         From: poster{n}@example.com\r\n\
         Newsgroups: {group}\r\n\
         Subject: Article number {n}\r\n\
         Message-ID: {id}\r\n\
         Date: Sat, 24 May 2014 03:40:29 +0000\r\n\
         Xref: fake.test {group}:{n}\r\n\
         Organization: Fake News\r\n\
         .\r\n",
        n = number,
        id = message_id(number),
        group = group
    )
}

async fn serve(state: Arc<State>, stream: TcpStream) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    if write.write_all(b"200 fake news ready\r\n").await.is_err() {
        return;
    }

    let mut authed = state.credentials.is_none();
    let mut user: Option<String> = None;
    let mut selected = false;

    while let Ok(Some(line)) = lines.next_line().await {
        let (command, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let reply = match command.to_ascii_uppercase().as_str() {
            "AUTHINFO" => match arg.split_once(' ') {
                Some(("USER", name)) => {
                    user = Some(name.to_string());
                    "381 password required\r\n".to_string()
                }
                Some(("PASS", pass)) => {
                    let expected = state.credentials.as_ref();
                    let ok = expected
                        .map(|(u, p)| user.as_deref() == Some(u.as_str()) && pass == p)
                        .unwrap_or(true);
                    authed = ok;
                    if ok {
                        "281 welcome\r\n".to_string()
                    } else {
                        "481 rejected\r\n".to_string()
                    }
                }
                _ => "501 syntax error\r\n".to_string(),
            },
            "QUIT" => {
                let _ = write.write_all(b"205 bye\r\n").await;
                return;
            }
            _ if !authed => "480 authentication required\r\n".to_string(),
            "GROUP" if arg == state.group => {
                selected = true;
                let high = state.high.load(Ordering::SeqCst);
                format!(
                    "211 {} {} {} {}\r\n",
                    high.saturating_sub(state.low) + 1,
                    state.low,
                    high,
                    state.group
                )
            }
            "GROUP" => "411 no such group\r\n".to_string(),
            "HEAD" if !selected => "412 no newsgroup selected\r\n".to_string(),
            "HEAD" => {
                state.heads.fetch_add(1, Ordering::SeqCst);
                let number: u64 = match arg.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        let _ = write.write_all(b"501 bad number\r\n").await;
                        continue;
                    }
                };

                let hang_up = {
                    let mut drop_at = state.drop_once_at.lock().unwrap();
                    if *drop_at == Some(number) {
                        *drop_at = None;
                        true
                    } else {
                        false
                    }
                };
                if hang_up {
                    return;
                }

                let high = state.high.load(Ordering::SeqCst);
                if number < state.low || number > high || state.missing.contains(&number) {
                    "423 no such article\r\n".to_string()
                } else {
                    head_block(&state.group, number)
                }
            }
            _ => "500 unknown command\r\n".to_string(),
        };

        if write.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}
