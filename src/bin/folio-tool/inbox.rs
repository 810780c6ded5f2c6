use std::path::Path;

use anyhow::{anyhow, Context};

use folio::config::read_config;
use folio::contact::mailbox::read_messages;
use folio::contact::ContactMessage;

use crate::ConfigArgs;

fn print_message(message: &ContactMessage) {
    println!("{} | {} <{}>", message.received_at.format("%Y-%m-%d %H:%M:%S UTC"), message.name, message.email);
    println!("Subject: {}", if message.subject.is_empty() { "(none)" } else { &message.subject });
    println!();
    println!("{}", message.message);
    println!("{}", "-".repeat(60));
}

pub fn inbox_cmd(args: ConfigArgs) -> anyhow::Result<()> {
    let config = read_config(Path::new(&args.config_path))
        .with_context(|| format!("Loading {}", args.config_path))?;
    let messages_dir = config.paths.messages_dir
        .ok_or_else(|| anyhow!("messages_dir is not set in {}", args.config_path))?;

    let messages = read_messages(&messages_dir)
        .with_context(|| format!("Reading messages from {}", messages_dir.display()))?;
    if messages.is_empty() {
        println!("No messages");
        return Ok(());
    }

    for message in messages.iter() {
        print_message(message);
    }
    println!("{} messages", messages.len());
    Ok(())
}
