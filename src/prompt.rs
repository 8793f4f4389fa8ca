//! Yes/no confirmation prompts.
//!
//! A [`PromptGate`] is built once from the CLI flags and passed to every step
//! that needs consent.  Interactive mode reads a single answer per question;
//! only a leading `y` or `Y` counts as "yes" and there is no retry loop.
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use crate::logging::Log;

/// Where answers come from.
enum Answers {
    /// Read answers from an input stream, echoing questions to an output stream.
    Interactive {
        input: Mutex<Box<dyn BufRead + Send>>,
        output: Mutex<Box<dyn Write + Send>>,
    },
    /// Every question gets the same pre-configured answer.
    Fixed(bool),
}

/// Presents yes/no questions and returns the decision.
pub struct PromptGate {
    answers: Answers,
    log: Arc<dyn Log>,
}

impl std::fmt::Debug for PromptGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.answers {
            Answers::Interactive { .. } => "interactive".to_string(),
            Answers::Fixed(answer) => format!("fixed({answer})"),
        };
        f.debug_struct("PromptGate").field("mode", &mode).finish()
    }
}

impl PromptGate {
    /// Prompt on the terminal: questions to stdout, answers from stdin.
    #[must_use]
    pub fn interactive(log: Arc<dyn Log>) -> Self {
        Self::from_streams(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            log,
        )
    }

    /// Prompt using arbitrary streams.
    #[must_use]
    pub fn from_streams(
        input: Box<dyn BufRead + Send>,
        output: Box<dyn Write + Send>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            answers: Answers::Interactive {
                input: Mutex::new(input),
                output: Mutex::new(output),
            },
            log,
        }
    }

    /// Answer every question with `answer` without blocking.
    #[must_use]
    pub fn assume(answer: bool, log: Arc<dyn Log>) -> Self {
        Self {
            answers: Answers::Fixed(answer),
            log,
        }
    }

    /// Ask `message` and return `true` only for an affirmative answer.
    ///
    /// In interactive mode a read failure, end of input or an empty line is
    /// treated as "no".
    pub fn confirm(&self, message: &str) -> bool {
        let decision = match &self.answers {
            Answers::Fixed(answer) => {
                self.log.info(&format!(
                    "{message} [{}]",
                    if *answer { "yes" } else { "no" }
                ));
                *answer
            }
            Answers::Interactive { input, output } => {
                if let Ok(mut out) = output.lock() {
                    write!(out, "\x1b[1m::\x1b[0m {message} [y/N] ").ok();
                    out.flush().ok();
                }
                let mut line = String::new();
                let read = input
                    .lock()
                    .map_or(Ok(0), |mut inp| inp.read_line(&mut line));
                match read {
                    Ok(0) | Err(_) => false,
                    Ok(_) => is_affirmative(&line),
                }
            }
        };
        self.log
            .debug(&format!("prompt '{message}' answered {decision}"));
        decision
    }
}

/// Only a response starting with `y` or `Y` is affirmative.
fn is_affirmative(response: &str) -> bool {
    matches!(response.chars().next(), Some('y' | 'Y'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use std::io::Cursor;

    fn gate_with_input(input: &str) -> PromptGate {
        PromptGate::from_streams(
            Box::new(Cursor::new(input.as_bytes().to_vec())),
            Box::new(io::sink()),
            Arc::new(Logger::new()),
        )
    }

    #[test]
    fn lowercase_and_uppercase_y_are_affirmative() {
        assert!(gate_with_input("y\n").confirm("Continue?"));
        assert!(gate_with_input("Y\n").confirm("Continue?"));
        assert!(gate_with_input("yes\n").confirm("Continue?"));
    }

    #[test]
    fn anything_else_is_negative() {
        assert!(!gate_with_input("n\n").confirm("Continue?"));
        assert!(!gate_with_input("sure\n").confirm("Continue?"));
        assert!(!gate_with_input(" y\n").confirm("Continue?"));
        assert!(!gate_with_input("\n").confirm("Continue?"));
    }

    #[test]
    fn end_of_input_is_negative() {
        assert!(!gate_with_input("").confirm("Continue?"));
    }

    #[test]
    fn invalid_answer_is_not_retried() {
        let gate = gate_with_input("maybe\ny\n");
        assert!(!gate.confirm("first?"), "invalid answer means no");
        assert!(gate.confirm("second?"), "next question reads the next line");
    }

    #[test]
    fn fixed_answers_never_block() {
        let log: Arc<dyn Log> = Arc::new(Logger::new());
        assert!(PromptGate::assume(true, Arc::clone(&log)).confirm("Re-clone?"));
        assert!(!PromptGate::assume(false, log).confirm("Re-clone?"));
    }

    #[test]
    fn question_is_written_to_output() {
        #[derive(Clone, Default)]
        struct Shared(Arc<Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let out = Shared::default();
        let gate = PromptGate::from_streams(
            Box::new(Cursor::new(b"n\n".to_vec())),
            Box::new(out.clone()),
            Arc::new(Logger::new()),
        );
        gate.confirm("Proceed with installation?");
        let written = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(written.contains("Proceed with installation? [y/N]"));
    }
}
