//! Terminal output with optional markdown styling.
//!
//! Headers keep their hash marks and are coloured; other lines go through
//! termimad's inline renderer so bold place names and timeline arrows stand
//! out. With colour disabled the markdown is printed as is.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

const HEADER_COLOR: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Prints rendered markdown to stdout.
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }
        for line in markdown.lines() {
            if line.starts_with('#') {
                println!("{}", styled_header(line));
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
        Ok(())
    }
}

fn styled_header(line: &str) -> String {
    format!("{HEADER_COLOR}{line}{RESET}")
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
