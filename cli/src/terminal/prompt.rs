use colored::*;
use console::Term;

use crate::terminal::colors;

/// Asks a yes/no question on the terminal. Anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let term = Term::stderr();
    if !term.is_term() {
        anyhow::bail!("refusing to write without confirmation on a non-interactive terminal (pass --yes)");
    }

    term.write_str(&format!("{} {} ", question.color(colors::ACCENT).bold(), "[y/N]".color(colors::SEPARATOR)))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
