//! Local commands: the guest buttons, the Enter key and the operator's
//! "next guest" control, in one place.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Capture and analyse a photo of the guest named `name`.
    Submit { name: String },
    /// Return every viewport to idle.
    Reset,
    /// Speak the greeting again, or stop speaking it.
    ToggleNarration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?} (expected submit <name>, reset, read)")]
    Unknown(String),
}

/// Parses one console line.
///
/// ```
/// use kiosk_greeter::coordinator::Command;
///
/// let cmd: Command = "submit Asha Rao".parse().unwrap();
/// assert_eq!(cmd, Command::Submit { name: "Asha Rao".into() });
/// assert_eq!("reset".parse::<Command>().unwrap(), Command::Reset);
/// ```
impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match word.to_lowercase().as_str() {
            "" => Err(ParseCommandError::Empty),
            "submit" => Ok(Command::Submit {
                name: rest.trim().to_string(),
            }),
            "reset" | "next" => Ok(Command::Reset),
            "read" => Ok(Command::ToggleNarration),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_keeps_inner_whitespace() {
        assert_eq!(
            "  submit   Mary  Ann ".parse::<Command>(),
            Ok(Command::Submit {
                name: "Mary  Ann".into()
            })
        );
    }

    #[test]
    fn submit_without_name_parses_to_empty_name() {
        // validation belongs to the coordinator, which alerts the guest
        assert_eq!(
            "submit".parse::<Command>(),
            Ok(Command::Submit { name: String::new() })
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!("RESET".parse::<Command>(), Ok(Command::Reset));
        assert_eq!("Next".parse::<Command>(), Ok(Command::Reset));
        assert_eq!("read".parse::<Command>(), Ok(Command::ToggleNarration));
    }

    #[test]
    fn blank_and_unknown_lines_are_errors() {
        assert_eq!("   ".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(ParseCommandError::Unknown("dance".into()))
        );
    }
}
