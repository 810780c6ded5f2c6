use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context};

use folio::config::{read_config, Config};

use crate::CFG_FILE_NAME;

/// Next to the executable, then the current directory, then the user config dir.
fn find_config_path() -> Option<PathBuf> {
    let mut candidates = vec![];
    if let Some(exe_dir) = env::current_exe().ok().as_deref().and_then(|p| p.parent()) {
        candidates.push(exe_dir.join(CFG_FILE_NAME));
    }
    if let Ok(cur_dir) = env::current_dir() {
        candidates.push(cur_dir.join(CFG_FILE_NAME));
    }
    if let Some(cfg_dir) = dirs::config_dir() {
        candidates.push(cfg_dir.join("folio").join(CFG_FILE_NAME));
    }

    candidates.into_iter().find(|p| p.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config_path = match cfg_path {
        Some(path) => path,
        None => find_config_path().ok_or_else(|| anyhow!("Could not find {}", CFG_FILE_NAME))?,
    };

    println!("Reading config from {}", config_path.display());
    let config = read_config(&config_path)
        .with_context(|| format!("Loading {}", config_path.display()))?;

    if let Some(ref log) = config.log {
        match log.location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("Log level {:?}, writing to the console", log.level),
        }
    } else {
        println!("Log disabled. Using stdout");
    }

    match config.paths.messages_dir {
        Some(ref dir) => println!("Contact messages will be written in {}", dir.display()),
        None => println!("No messages_dir set. Contact messages will be dropped"),
    }

    Ok(config)
}
