//! A single NNTP connection
//!
//! Handles dialing (plain TCP or TLS), the server greeting, authentication,
//! and the request/response framing of the commands we issue.

use super::headers::{parse_header_block, HeaderMap};
use super::{
    GroupSnapshot, NntpError, AUTH_ACCEPTED, CLOSING, GROUP_SELECTED, HEAD_FOLLOWS,
    PASSWORD_REQUIRED, SERVICE_READY, SERVICE_READY_NO_POSTING,
};
use crate::config::ServerConfig;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

/// Any byte stream an NNTP session can run over
pub trait NntpStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> NntpStream for T {}

/// An established, greeted (and possibly authenticated) NNTP session
pub struct NntpConnection {
    stream: BufReader<Box<dyn NntpStream>>,
    io_timeout: Duration,
}

impl std::fmt::Debug for NntpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NntpConnection")
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

impl NntpConnection {
    /// Dials the configured server, reads the greeting and authenticates
    /// when a username is configured.
    pub async fn connect(server: &ServerConfig) -> Result<Self, NntpError> {
        let io_timeout = server.io_timeout();
        let tcp = timeout(io_timeout, TcpStream::connect(&server.addr))
            .await
            .map_err(|_| NntpError::Timeout(io_timeout))??;

        let mut conn = if server.tls {
            let tls = timeout(io_timeout, tls_handshake(tcp, server.host()))
                .await
                .map_err(|_| NntpError::Timeout(io_timeout))??;
            Self::from_stream(tls, io_timeout).await?
        } else {
            Self::from_stream(tcp, io_timeout).await?
        };

        if let Some(username) = server.username() {
            conn.authenticate(username, server.password()).await?;
            tracing::debug!("Authenticated to {} as {}", server.addr, username);
        }

        Ok(conn)
    }

    /// Wraps an already connected stream and consumes the server greeting
    pub async fn from_stream<S>(stream: S, io_timeout: Duration) -> Result<Self, NntpError>
    where
        S: NntpStream + 'static,
    {
        let mut conn = Self {
            stream: BufReader::new(Box::new(stream)),
            io_timeout,
        };

        let (code, message) = timeout(io_timeout, conn.read_status())
            .await
            .map_err(|_| NntpError::Timeout(io_timeout))??;
        match code {
            SERVICE_READY | SERVICE_READY_NO_POSTING => {
                tracing::trace!("Greeting: {} {}", code, message);
                Ok(conn)
            }
            _ => Err(NntpError::Status { code, message }),
        }
    }

    /// `AUTHINFO USER` / `AUTHINFO PASS`
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), NntpError> {
        let (code, message) = self.command(&format!("AUTHINFO USER {}", username)).await?;
        match code {
            AUTH_ACCEPTED => return Ok(()),
            PASSWORD_REQUIRED => {}
            _ => return Err(NntpError::Status { code, message }),
        }

        let (code, message) = self.command(&format!("AUTHINFO PASS {}", password)).await?;
        if code == AUTH_ACCEPTED {
            Ok(())
        } else {
            Err(NntpError::Status { code, message })
        }
    }

    /// `GROUP name`: selects the group and returns its current watermarks
    pub async fn group(&mut self, name: &str) -> Result<GroupSnapshot, NntpError> {
        let (code, message) = self.command(&format!("GROUP {}", name)).await?;
        if code != GROUP_SELECTED {
            return Err(NntpError::Status { code, message });
        }

        // 211 count low high name
        let fields: Vec<&str> = message.split_whitespace().collect();
        let number = |i: usize| {
            fields
                .get(i)
                .and_then(|f| f.parse::<u64>().ok())
                .ok_or_else(|| NntpError::Malformed(format!("{} {}", code, message)))
        };

        Ok(GroupSnapshot {
            name: name.to_string(),
            count: number(0)?,
            low: number(1)?,
            high: number(2)?,
        })
    }

    /// `HEAD number`: fetches the headers of one article in the selected group
    pub async fn head(&mut self, number: u64) -> Result<HeaderMap, NntpError> {
        let (code, message) = self.command(&format!("HEAD {}", number)).await?;
        if code != HEAD_FOLLOWS {
            return Err(NntpError::Status { code, message });
        }

        let io_timeout = self.io_timeout;
        let lines = timeout(io_timeout, self.read_block())
            .await
            .map_err(|_| NntpError::Timeout(io_timeout))??;
        parse_header_block(&lines)
    }

    /// Sends `QUIT`; failures are only logged
    pub async fn quit(mut self) {
        match self.command("QUIT").await {
            Ok((CLOSING, _)) => {}
            Ok((code, message)) => tracing::debug!("Unexpected QUIT reply: {} {}", code, message),
            Err(e) => tracing::debug!("QUIT failed: {}", e),
        }
        let _ = self.stream.get_mut().shutdown().await;
    }

    /// Writes one command line and reads its status reply
    async fn command(&mut self, line: &str) -> Result<(u16, String), NntpError> {
        let io_timeout = self.io_timeout;
        timeout(io_timeout, async {
            let stream = self.stream.get_mut();
            stream.write_all(line.as_bytes()).await?;
            stream.write_all(b"\r\n").await?;
            stream.flush().await?;
            self.read_status().await
        })
        .await
        .map_err(|_| NntpError::Timeout(io_timeout))?
    }

    async fn read_status(&mut self) -> Result<(u16, String), NntpError> {
        let line = self.read_line().await?;
        parse_status(&line)
    }

    /// Reads a dot-terminated block, undoing dot-stuffing
    async fn read_block(&mut self) -> Result<Vec<String>, NntpError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line == "." {
                return Ok(lines);
            }
            match line.strip_prefix('.') {
                Some(rest) => lines.push(rest.to_string()),
                None => lines.push(line),
            }
        }
    }

    /// Reads one CRLF-terminated line. Header bytes are not guaranteed to be
    /// UTF-8, so invalid sequences are replaced rather than rejected.
    async fn read_line(&mut self) -> Result<String, NntpError> {
        let mut buf = Vec::new();
        let n = self.stream.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Err(NntpError::Closed);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Splits a status line into its three-digit code and message
fn parse_status(line: &str) -> Result<(u16, String), NntpError> {
    let code = line
        .get(..3)
        .filter(|c| c.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| NntpError::Malformed(line.to_string()))?;

    let message = match &line[3..] {
        "" => "",
        rest if rest.starts_with(' ') => rest[1..].trim_end(),
        _ => return Err(NntpError::Malformed(line.to_string())),
    };

    Ok((code, message.to_string()))
}

async fn tls_handshake(tcp: TcpStream, host: &str) -> Result<TlsStream<TcpStream>, NntpError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| NntpError::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| NntpError::ServerName(host.to_string()))?;

    let stream = TlsConnector::from(Arc::new(config))
        .connect(server_name, tcp)
        .await?;
    Ok(stream)
}
