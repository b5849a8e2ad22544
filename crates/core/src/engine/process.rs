//! UCI engine subprocess
//!
//! Spawns the engine binary registered for a request and talks UCI over
//! its stdin/stdout.

use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::lichess::AnalysisRequest;
use crate::position::variant_from_name;
use crate::storage::UciOption;

/// Error type for engine operations
#[derive(Debug)]
pub enum EngineError {
    /// Failed to start the engine process
    SpawnError(String),
    /// Failed to communicate with engine
    IoError(std::io::Error),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SpawnError(s) => write!(f, "Failed to start engine: {}", s),
            EngineError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError(error)
    }
}

/// A running engine binary
pub struct EngineProcess {
    /// The child process
    process: Child,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Stdout lines for receiving responses
    stdout: Lines<BufReader<ChildStdout>>,
}

impl EngineProcess {
    /// Starts the engine binary at `path`
    ///
    /// # Example
    /// ```ignore
    /// let mut engine = EngineProcess::spawn("/usr/local/bin/stockfish")?;
    /// ```
    pub fn spawn(path: &str) -> Result<Self, EngineError> {
        let mut command = Command::new(path);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // Hide the console window on Windows
        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let mut process = command
            .spawn()
            .map_err(|e| EngineError::SpawnError(format!("{} for {}", e, path)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::SpawnError("Failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::SpawnError("Failed to open stdout".into()))?;

        Ok(EngineProcess {
            process,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Sends a command to the engine
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!("engine <- {}", cmd);
        self.stdin.write_all(cmd.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Next line of engine output, `None` once the engine closes stdout
    pub async fn next_line(&mut self) -> Result<Option<String>, EngineError> {
        Ok(self.stdout.next_line().await?)
    }

    /// Applies user-configured options stored with the engine binary
    pub async fn set_options(&mut self, options: &[UciOption]) -> Result<(), EngineError> {
        for option in options {
            self.send(&set_option(&option.option, &option.value)).await?;
        }
        Ok(())
    }

    /// Configures the engine for `request` and starts searching
    pub async fn start_search(&mut self, request: &AnalysisRequest) -> Result<(), EngineError> {
        for cmd in search_commands(request) {
            self.send(&cmd).await?;
        }
        Ok(())
    }

    /// Asks the engine to finish the search and print `bestmove`
    pub async fn stop(&mut self) -> Result<(), EngineError> {
        self.send("stop").await
    }

    /// Quit the engine cleanly, killing it if it does not exit
    pub async fn quit(mut self) -> Result<(), EngineError> {
        let _ = self.send("quit").await;
        if tokio::time::timeout(std::time::Duration::from_millis(100), self.process.wait())
            .await
            .is_err()
        {
            self.process.kill().await?;
        }
        Ok(())
    }
}

/// The full command sequence sent before a search
pub fn search_commands(request: &AnalysisRequest) -> Vec<String> {
    let work = &request.work;

    let mut commands = vec![
        set_option("UCI_AnalyseMode", "true"),
        set_option("UCI_Chess960", "true"),
        set_option("Threads", &work.threads.to_string()),
        set_option("Hash", &work.hash.to_string()),
        set_option("MultiPV", &work.multi_pv.to_string()),
    ];

    if is_variant(&work.variant) {
        commands.push(set_option("UCI_Variant", &work.variant));
    }

    commands.push(position_command(&work.initial_fen, &work.moves));
    commands.push(go_command(request));
    commands
}

fn set_option(name: &str, value: &str) -> String {
    format!("setoption name {} value {}", name, value)
}

/// Anything that is not played with standard chess rules
fn is_variant(name: &str) -> bool {
    !matches!(variant_from_name(name), Ok(shakmaty::variant::Variant::Chess))
}

/// "position fen <fen> moves e2e4 e7e5", or "position startpos" without a FEN
pub fn position_command(initial_fen: &str, moves: &[String]) -> String {
    let pos_str = if initial_fen.trim().is_empty() {
        "position startpos".to_string()
    } else {
        format!("position fen {}", initial_fen)
    };

    if moves.is_empty() {
        pos_str
    } else {
        format!("{} moves {}", pos_str, moves.join(" "))
    }
}

/// Search limit for a request: infinite, fixed move time, or depth
pub fn go_command(request: &AnalysisRequest) -> String {
    let work = &request.work;

    if work.infinite {
        return "go infinite".to_string();
    }

    match (work.movetime, work.depth) {
        (Some(movetime), _) => format!("go movetime {}", movetime),
        (None, Some(depth)) => format!("go depth {}", depth),
        (None, None) => format!("go depth {}", request.engine.default_depth),
    }
}
