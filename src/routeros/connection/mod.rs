// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Low-level RouterOS API connection handling

mod auth;
mod parse;
mod protocol;

use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::facts::DeviceError;

pub(crate) use parse::{parse_bgp_sessions, parse_interface_counters};
pub use protocol::{encode_length, encode_word, read_length};

/// Connection timeout (5 seconds)
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Read operation timeout (30 seconds)
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// One reply sentence: attribute name -> value
pub(crate) type Sentence = HashMap<String, String>;

fn io_error(e: std::io::Error) -> DeviceError {
    DeviceError::Connectivity(e.to_string())
}

/// Low-level RouterOS API connection
pub(super) struct RouterOsConnection {
    stream: TcpStream,
}

impl RouterOsConnection {
    pub(super) async fn connect(addr: &str) -> Result<Self, DeviceError> {
        tracing::trace!("Attempting TCP connection to: {}", addr);
        let stream = timeout(CONNECTION_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| DeviceError::Timeout(format!("connect to {addr}")))?
            .map_err(io_error)?;
        tracing::trace!("TCP connection established to: {}", addr);
        Ok(Self { stream })
    }

    /// Runs a command and collects every `!re` sentence until `!done`
    ///
    /// A `!trap` reply is read through to its `!done` so the connection stays
    /// usable, then surfaced as a protocol error.
    pub(super) async fn command(
        &mut self,
        path: &str,
        args: &[&str],
    ) -> Result<Vec<Sentence>, DeviceError> {
        let mut words: Vec<String> = Vec::with_capacity(1 + args.len());
        words.push(path.to_string());
        words.extend(args.iter().map(|a| (*a).to_string()));
        self.send_words(&words).await?;
        self.read_sentences().await
    }

    async fn send_words(&mut self, words: &[String]) -> Result<(), DeviceError> {
        let mut buf = Vec::new();
        for w in words {
            buf.extend_from_slice(&encode_word(w));
        }
        buf.push(0);
        self.stream.write_all(&buf).await.map_err(io_error)
    }

    async fn read_sentences(&mut self) -> Result<Vec<Sentence>, DeviceError> {
        timeout(READ_TIMEOUT, async {
            let mut sentences = Vec::new();
            let mut trap: Option<String> = None;
            loop {
                let words = self.read_sentence().await?;
                let Some((reply, rest)) = words.split_first() else {
                    continue;
                };
                tracing::trace!("Received reply: {} ({} words)", reply, rest.len());
                let attributes: Sentence = rest
                    .iter()
                    .filter_map(|w| w.strip_prefix('=')?.split_once('='))
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                match reply.as_str() {
                    "!re" => sentences.push(attributes),
                    "!done" => {
                        // `!done` may carry attributes, e.g. the legacy login challenge
                        if !attributes.is_empty() {
                            sentences.push(attributes);
                        }
                        break;
                    }
                    "!trap" => {
                        trap = Some(
                            attributes
                                .get("message")
                                .cloned()
                                .unwrap_or_else(|| "trap".to_string()),
                        );
                    }
                    "!fatal" => {
                        return Err(DeviceError::Protocol(format!(
                            "RouterOS fatal: {}",
                            rest.join(" ")
                        )));
                    }
                    _ => {}
                }
            }
            if let Some(msg) = trap {
                return Err(DeviceError::Protocol(format!("RouterOS trap: {msg}")));
            }
            tracing::trace!("Command complete, {} sentences received", sentences.len());
            Ok(sentences)
        })
        .await
        .map_err(|_| DeviceError::Timeout(format!("no reply within {READ_TIMEOUT:?}")))?
    }

    /// Reads words up to the zero-length terminator
    async fn read_sentence(&mut self) -> Result<Vec<String>, DeviceError> {
        let mut words = Vec::new();
        loop {
            let word = self.read_word().await?;
            if word.is_empty() {
                return Ok(words);
            }
            words.push(word);
        }
    }

    async fn read_word(&mut self) -> Result<String, DeviceError> {
        let len = read_length(&mut self.stream).await.map_err(io_error)?;
        if len == 0 {
            return Ok(String::new());
        }
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf).await.map_err(io_error)?;
        Ok(String::from_utf8_lossy(&buf).into())
    }
}
