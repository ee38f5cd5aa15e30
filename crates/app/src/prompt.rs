use std::io::{self, BufRead, Write};

use recall_core::model::CourseId;

/// One line of the quiz picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizEntry {
    pub course: CourseId,
    pub questions: u32,
    pub pending: usize,
}

/// List the quizzes and read a 1-based choice, re-prompting on bad input.
///
/// Returns `Ok(None)` when input ends or the user enters `q`.
pub fn choose_quiz<R: BufRead, W: Write>(
    entries: &[QuizEntry],
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<usize>> {
    writeln!(out, "Select a quiz:")?;
    for (index, entry) in entries.iter().enumerate() {
        let status = if entry.pending == 0 {
            "all answered".to_owned()
        } else {
            format!("{} of {} pending", entry.pending, entry.questions)
        };
        writeln!(out, "  {}. {} ({status})", index + 1, entry.course)?;
    }

    loop {
        write!(out, "Pick a quiz by number (q to quit): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=entries.len()).contains(&n) => return Ok(Some(n - 1)),
            Ok(n) => writeln!(
                out,
                "{n} is out of range. Please pick between 1 and {}.",
                entries.len()
            )?,
            Err(_) => writeln!(out, "Invalid input: {line}")?,
        }
    }
}

/// Ask a yes/no question; anything but `y`/`yes` (or end of input) is no.
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    write!(out, "{question} [y/N]: ")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(false);
    }
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
