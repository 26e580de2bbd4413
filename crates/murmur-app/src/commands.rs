//! Slash commands typed into the composer.

/// A parsed composer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/nick <name>`: join, or rejoin under another name.
    Nick {
        /// Requested name, untrimmed past the command word.
        name: String,
    },
    /// `/leave`: end the session and forget the name.
    Leave,
    /// `/theme`: toggle light and dark.
    Theme,
    /// `/quit` or `/q`.
    Quit,
    /// Anything that is not a command, kept verbatim.
    Message {
        /// The whole line.
        text: String,
    },
    /// A `/word` that is not a known command.
    Unknown {
        /// The command word, without the slash.
        input: String,
    },
    /// A known command with bad arguments.
    InvalidArgs {
        /// Command word.
        command: &'static str,
        /// Usage hint.
        usage: &'static str,
    },
}

impl Command {
    /// Parse one composer line.
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message { text: line.to_owned() };
        };

        let (word, args) = match rest.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args.trim()),
            None => (rest, ""),
        };

        match word {
            "nick" | "join" if args.is_empty() => {
                Self::InvalidArgs { command: "nick", usage: "/nick <name>" }
            },
            "nick" | "join" => Self::Nick { name: args.to_owned() },
            "leave" => Self::Leave,
            "theme" => Self::Theme,
            "quit" | "q" => Self::Quit,
            other => Self::Unknown { input: other.to_owned() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_verbatim_message() {
        assert_eq!(Command::parse("  hi there "), Command::Message { text: "  hi there ".into() });
    }

    #[test]
    fn nick_takes_rest_of_line() {
        assert_eq!(Command::parse("/nick  Ada Lovelace "), Command::Nick { name: "Ada Lovelace".into() });
        assert_eq!(Command::parse("/nick"), Command::InvalidArgs { command: "nick", usage: "/nick <name>" });
    }

    #[test]
    fn simple_commands() {
        assert_eq!(Command::parse("/leave"), Command::Leave);
        assert_eq!(Command::parse("/theme"), Command::Theme);
        assert_eq!(Command::parse("/q"), Command::Quit);
        assert_eq!(Command::parse("/dance"), Command::Unknown { input: "dance".into() });
    }
}
