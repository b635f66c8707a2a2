/*
 *  inbox.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Control messages queued by listener tasks, drained by the loop
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, error::TrySendError, Sender};
use tokio::task::JoinHandle;

use crate::mode::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self { topic: topic.into(), payload: payload.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetMode(Mode),
    NextMode,
    Refresh,
}

/// `{prefix}/mode <on|dark|off|next>` and `{prefix}/refresh`.
pub fn parse_command(prefix: &str, msg: &InboundMessage) -> Option<Command> {
    let leaf = msg.topic.strip_prefix(prefix)?.strip_prefix('/')?;
    match leaf {
        "mode" => {
            let payload = msg.payload.trim();
            if payload.eq_ignore_ascii_case("next") {
                Some(Command::NextMode)
            } else {
                payload.parse().ok().map(Command::SetMode)
            }
        }
        "refresh" => Some(Command::Refresh),
        _ => None,
    }
}

/// Receiving half; never blocks the loop.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::Receiver<InboundMessage>,
}

pub fn channel(depth: usize) -> (Sender<InboundMessage>, Inbox) {
    let (tx, rx) = mpsc::channel(depth.max(1));
    (tx, Inbox { rx })
}

impl Inbox {
    /// Everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<InboundMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }
}

/// Queue without waiting; a full queue drops the message.
pub fn offer(tx: &Sender<InboundMessage>, msg: InboundMessage) -> bool {
    match tx.try_send(msg) {
        Ok(()) => true,
        Err(TrySendError::Full(msg)) => {
            warn!("Control queue full, dropped {}", msg.topic);
            false
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

/// `topic payload` per line; blank lines are skipped.
pub fn parse_line(line: &str) -> Option<InboundMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (topic, payload) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    Some(InboundMessage::new(topic, payload.trim()))
}

pub fn spawn_stdin_listener(tx: Sender<InboundMessage>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(msg) = parse_line(&line) {
                        debug!("Control: {} {}", msg.topic, msg.payload);
                        offer(&tx, msg);
                    }
                }
                Ok(None) => {
                    info!("Control: stdin closed");
                    break;
                }
                Err(e) => {
                    warn!("Control: stdin read failed: {}", e);
                    break;
                }
            }
        }
    })
}
