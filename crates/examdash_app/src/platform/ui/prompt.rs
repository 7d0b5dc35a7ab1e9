use std::io::{self, BufRead, Write};

use examdash_core::DeleteModalView;

/// Asks on stdin; anything but `y`/`yes` declines.
pub fn confirm_delete(modal: &DeleteModalView) -> io::Result<bool> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "Delete \"{}\"? [y/N] ", modal.exam_name)?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
        assert!(!is_yes("yep"));
    }
}
