use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const BANNER_WIDTH: usize = 50;

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter {
    path: String,
}

impl FileWriter {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to file: {}", self.path);
        fs::write(Path::new(&self.path), content)?;
        info!("Output written to file: {}", self.path);
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to console");
        let mut stdout = io::stdout();
        stdout.write_all(content.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub fn create_writer(output_path: &Option<String>) -> Box<dyn OutputWriter> {
    match output_path {
        Some(path) => Box::new(FileWriter::new(path.clone())),
        None => Box::new(ConsoleWriter),
    }
}

/// Writes `content` to the output file when one is given, otherwise prints
/// it under a `title` banner.
pub fn write_output(content: &str, output_path: Option<String>, title: &str) -> anyhow::Result<()> {
    if output_path.is_none() {
        print_banner(title)?;
    }

    let writer = create_writer(&output_path);
    writer.write(content)?;

    if let Some(path) = output_path {
        print_status(Color::Green, &format!("💾 Saved to {}", path))?;
    }
    Ok(())
}

pub fn print_banner(title: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    let rule = "=".repeat(BANNER_WIDTH);

    writeln!(stdout, "\n{}", rule)?;
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    writeln!(stdout, "{}", title)?;
    stdout.execute(ResetColor)?;
    writeln!(stdout, "{}", rule)?;
    Ok(())
}

pub fn print_status(color: Color, message: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(color))?;
    writeln!(stdout, "{}", message)?;
    stdout.execute(ResetColor)?;
    Ok(())
}
