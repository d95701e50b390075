use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use hanabi::Command;

/// Records the commands sent during each game.
///
/// Every game goes into its own `game_NNNNNN.txt`, one command per line,
/// which is the format the server accepts as a list of preloaded moves.
pub struct Recorder {
    num: usize,
    directory: PathBuf,
    commands: Vec<String>,
}

impl Recorder {
    pub fn new(directory: PathBuf) -> anyhow::Result<Self> {
        if !directory.is_dir() {
            anyhow::bail!("Directory '{}' does not exist", directory.display());
        }
        Ok(Self {
            num: 1,
            directory,
            commands: Vec::new(),
        })
    }

    pub fn store_command(&mut self, command: &Command) {
        // Replays belong to the next game, not this one.
        if command.hands_over_turn() {
            self.commands.push(command.to_string());
        }
    }

    /// Writes the current game, if it had any moves. Returns the file path.
    pub fn write_game_recording(&mut self) -> anyhow::Result<Option<PathBuf>> {
        if self.commands.is_empty() {
            return Ok(None);
        }
        let filepath = self.directory.join(format!("game_{:0>6}.txt", self.num));
        let mut writer = BufWriter::new(File::create(&filepath)?);
        for command in std::mem::take(&mut self.commands) {
            writeln!(writer, "{}", command)?;
        }
        writer.flush()?;
        self.num += 1;
        Ok(Some(filepath))
    }
}
