use std::fs::{self, OpenOptions};
use std::io;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use spdlog::{error, info, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

use crate::contact::ContactMessage;

pub const MESSAGES_FILE: &str = "messages.jsonl";

/// Appends contact messages, one JSON document per line.
pub struct Mailbox {
    path: PathBuf,
}

impl Mailbox {
    pub fn new(messages_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(messages_dir)?;
        Ok(Self { path: messages_dir.join(MESSAGES_FILE) })
    }

    pub fn store(&mut self, message: &ContactMessage) -> io::Result<()> {
        let json = serde_json::to_string(message)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", json)?;
        file.flush()
    }
}

/// Reads every stored message, oldest first. Lines that fail to parse are skipped.
pub fn read_messages(messages_dir: &Path) -> io::Result<Vec<ContactMessage>> {
    let path = messages_dir.join(MESSAGES_FILE);
    let file = match fs::File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e),
    };

    let mut messages = vec![];
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ContactMessage>(&line) {
            Ok(message) => messages.push(message),
            Err(e) => warn!("Skipping message at line {} of {}: {}", number + 1, path.display(), e),
        }
    }
    Ok(messages)
}

pub struct MailboxHandler {
    _receiver_task: JoinHandle<()>,
    sender: Sender<ContactMessage>,
}

impl MailboxHandler {
    pub fn new(mut mailbox: Mailbox) -> Self {
        let (tx, mut rx) = mpsc::channel::<ContactMessage>(64);

        let receiver_task = tokio::spawn(async move {
            info!("Starting mailbox receiver");
            while let Some(message) = rx.recv().await {
                if let Err(e) = mailbox.store(&message) {
                    error!("Error storing contact message {}: {}", message.id, e);
                }
            }
        });

        Self {
            _receiver_task: receiver_task,
            sender: tx,
        }
    }

    pub fn new_sender(&self) -> MailboxSender {
        MailboxSender::new(self.sender.clone())
    }

    pub fn no_op() -> MailboxSender {
        MailboxSender::no_op()
    }
}

#[derive(Clone)]
pub struct MailboxSender {
    sender_ch: Option<Sender<ContactMessage>>,
}

impl MailboxSender {
    pub fn new(sender_ch: Sender<ContactMessage>) -> Self {
        Self {
            sender_ch: Some(sender_ch),
        }
    }

    pub fn no_op() -> Self {
        Self { sender_ch: None }
    }

    pub async fn deliver(&self, message: ContactMessage) {
        match self.sender_ch {
            Some(ref sender) => {
                if let Err(e) = sender.send(message).await {
                    error!("Error delivering contact message: {}", e);
                }
            }
            None => info!("Contact message from {} dropped, no messages_dir configured", message.email),
        }
    }
}
