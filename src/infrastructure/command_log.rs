use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

const LOG_FILE: &str = "commands.log";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub command: String,
    pub message: String,
}

#[derive(Debug)]
enum Sink {
    File(PathBuf),
    Memory(Vec<LogEntry>),
}

/// JSON-lines log of controller activity, one object per line.
#[derive(Debug)]
pub struct CommandLog {
    sink: Mutex<Sink>,
}

impl CommandLog {
    pub fn to_dir(logs_dir: PathBuf) -> Self {
        Self {
            sink: Mutex::new(Sink::File(logs_dir.join(LOG_FILE))),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            sink: Mutex::new(Sink::Memory(Vec::new())),
        }
    }

    pub fn info(&self, command: &str, message: &str) {
        self.append("info", command, message);
    }

    pub fn error(&self, command: &str, message: &str) {
        self.append("error", command, message);
    }

    /// Entries kept by an in-memory log; always empty for a file log.
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.sink.lock() {
            Ok(sink) => match &*sink {
                Sink::Memory(entries) => entries.clone(),
                Sink::File(_) => Vec::new(),
            },
            Err(_) => Vec::new(),
        }
    }

    fn append(&self, level: &str, command: &str, message: &str) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level.to_string(),
            command: command.to_string(),
            message: message.to_string(),
        };
        match &mut *sink {
            Sink::Memory(entries) => entries.push(entry),
            Sink::File(path) => {
                let Ok(line) = serde_json::to_string(&entry) else {
                    return;
                };
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                    let _ = writeln!(file, "{line}");
                }
            }
        }
    }
}
