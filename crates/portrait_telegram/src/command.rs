/// Bot commands recognised in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Compare,
    /// `/summary <user_id>`; `None` when the argument is missing or not a number
    Summary(Option<i64>),
    Unknown(String),
}

impl Command {
    /// Parse a message text. Returns `None` for text that is not a command.
    ///
    /// Accepts the `/command@botname` form Telegram uses in group chats.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let mut parts = text.split_whitespace();
        let head = parts.next()?;
        let name = head[1..].split('@').next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        Some(match name.as_str() {
            "start" | "help" => Command::Start,
            "compare" => Command::Compare,
            "summary" => Command::Summary(match args.as_slice() {
                [id] => id.parse().ok(),
                _ => None,
            }),
            _ => Command::Unknown(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /compare  "), Some(Command::Compare));
        assert_eq!(Command::parse("/compare@PortraitBot"), Some(Command::Compare));
        assert_eq!(Command::parse("/summary 12345"), Some(Command::Summary(Some(12345))));
        assert_eq!(Command::parse("/Summary"), Some(Command::Summary(None)));
        assert_eq!(Command::parse("/summary abc"), Some(Command::Summary(None)));
        assert_eq!(Command::parse("/summary 1 2"), Some(Command::Summary(None)));
        assert_eq!(Command::parse("/dance"), Some(Command::Unknown("dance".into())));
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse(""), None);
    }
}
