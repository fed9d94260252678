// UI layer: every prompt, message and wait the setup flow performs goes
// through `UserInterface`, so the flow can run against the real terminal or
// against a scripted stand-in in tests.

use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Confirm, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    Bold,
    Success,
    Warning,
    Error,
}

pub trait UserInterface {
    fn print(&self, message: &str);

    fn print_styled(&self, message: &str, style: MessageStyle);

    /// Free-text answer. Blank answers are returned as-is.
    fn prompt_input(&self, prompt: &str) -> Result<String>;

    /// Hidden answer for secrets. Blank answers are returned as-is.
    fn prompt_secret(&self, prompt: &str) -> Result<String>;

    /// Yes/no question, defaulting to no.
    fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Block for `duration` while showing `message`.
    fn wait(&self, message: &str, duration: Duration);
}

/// The real terminal: dialoguer prompts, crossterm colours and an indicatif
/// spinner for waits.
pub struct Terminal;

impl UserInterface for Terminal {
    fn print(&self, message: &str) {
        println!("{}", message);
    }

    fn print_styled(&self, message: &str, style: MessageStyle) {
        println!("{}", styled(message, style));
    }

    fn prompt_input(&self, prompt: &str) -> Result<String> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn prompt_secret(&self, prompt: &str) -> Result<String> {
        let answer = Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(answer)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }

    fn wait(&self, message: &str, duration: Duration) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        thread::sleep(duration);
        spinner.finish_and_clear();
    }
}

/// Colours `message` for `style`.
pub fn styled(message: &str, style: MessageStyle) -> String {
    match style {
        MessageStyle::Bold => message.bold().to_string(),
        MessageStyle::Success => message.green().to_string(),
        MessageStyle::Warning => message.yellow().to_string(),
        MessageStyle::Error => message.red().to_string(),
    }
}

/// Terminal settings captured before any prompt runs. A hidden-input prompt
/// turns echo off and only turns it back on when it returns, so a process
/// exit from the Ctrl-C handler has to put these settings back itself.
pub struct TerminalState {
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

impl TerminalState {
    /// Captures the settings of standard input, if it is a terminal.
    pub fn capture() -> Self {
        #[cfg(unix)]
        {
            Self::capture_fd(libc::STDIN_FILENO)
        }
        #[cfg(not(unix))]
        {
            TerminalState {}
        }
    }

    #[cfg(unix)]
    fn capture_fd(fd: libc::c_int) -> Self {
        let mut termios = std::mem::MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr only writes into the buffer, and the buffer is
        // read back only when the call reports success.
        let saved = unsafe {
            if libc::tcgetattr(fd, termios.as_mut_ptr()) == 0 {
                Some(termios.assume_init())
            } else {
                None
            }
        };
        TerminalState { saved }
    }

    pub fn is_captured(&self) -> bool {
        #[cfg(unix)]
        {
            self.saved.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Puts the captured settings back and shows the cursor. Returns whether
    /// there was anything to restore.
    pub fn restore(&self) -> bool {
        #[cfg(unix)]
        {
            let Some(termios) = &self.saved else {
                return false;
            };
            let _ = crossterm::execute!(io::stdout(), crossterm::cursor::Show);
            // SAFETY: `termios` came from a successful tcgetattr.
            unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, termios) == 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

/// True when the error came from the operator pressing Ctrl-C at a prompt.
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .map_or(false, |e| e.kind() == io::ErrorKind::Interrupted)
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn interrupted_prompt_is_detected_through_context() {
        let err = Err::<(), _>(io::Error::new(io::ErrorKind::Interrupted, "read interrupted"))
            .context("Reading access token")
            .unwrap_err();
        assert!(is_interrupted(&err));
    }

    #[test]
    fn other_errors_are_not_interruptions() {
        let err = anyhow::Error::new(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(!is_interrupted(&err));
        assert!(!is_interrupted(&anyhow::anyhow!("plain")));
    }

    // Drops `ESC [ ... <letter>` sequences.
    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn styled_keeps_message_text() {
        for style in [
            MessageStyle::Bold,
            MessageStyle::Success,
            MessageStyle::Warning,
            MessageStyle::Error,
        ] {
            let out = styled("✅ Saved credentials", style);
            assert_eq!(strip_ansi(&out), "✅ Saved credentials", "{:?}", style);
        }
    }

    #[test]
    fn bold_style_emits_bold_attribute() {
        let out = styled("Header", MessageStyle::Bold);
        assert!(out.contains("\u{1b}[1m"), "{:?}", out);
    }

    #[cfg(unix)]
    #[test]
    fn terminal_state_ignores_non_terminals() {
        use std::os::unix::io::AsRawFd;

        let file = tempfile::tempfile().unwrap();
        let state = TerminalState::capture_fd(file.as_raw_fd());
        assert!(!state.is_captured());
        assert!(!state.restore());
    }
}
