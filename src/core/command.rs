pub const PREFIX: char = '?';

// Opening and closing marks accepted around a multi-word argument
const QUOTES: [(char, char); 3] = [('"', '"'), ('“', '”'), ('「', '」')];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Adopt(Option<String>),
    PlayBall,
    ForceGift,
    ForceBadMood,
    Test,
}

impl Command {
    /// Parses a message body. Anything without the prefix or with an unknown
    /// verb is not a command.
    pub fn parse(content: &str) -> Option<Command> {
        let body = content.trim().strip_prefix(PREFIX)?;
        let (verb, rest) = match body.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (body, ""),
        };

        match verb {
            "adopt" => Some(Command::Adopt(first_argument(rest))),
            "play_ball" => Some(Command::PlayBall),
            "force_due_gift" if rest.is_empty() => Some(Command::ForceGift),
            "force_due_bad_mood" if rest.is_empty() => Some(Command::ForceBadMood),
            "test" if rest.is_empty() => Some(Command::Test),
            _ => None,
        }
    }
}

/// A quoted argument is taken whole up to its closing mark (or the end of
/// the line when unclosed); otherwise only the first word counts.
fn first_argument(rest: &str) -> Option<String> {
    for (open, close) in QUOTES {
        if let Some(quoted) = rest.strip_prefix(open) {
            let inner = quoted.split_once(close).map_or(quoted, |(inner, _)| inner).trim();
            return (!inner.is_empty()).then(|| inner.to_string());
        }
    }
    rest.split_whitespace().next().map(str::to_string)
}
