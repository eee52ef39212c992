//! REPL input dispatch.

/// Slash commands offered by completion and hints, with their argument usage.
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/email", "<address>"),
    ("/login", "<email> <password>"),
    ("/logout", ""),
    ("/status", ""),
    ("/help", ""),
];

/// Greyed-out text shown after the cursor.
///
/// While the command name is being typed: the rest of the name followed by
/// its arguments. Right after `/name `: the arguments still to type.
pub fn hint_for(line: &str) -> Option<String> {
    if !line.starts_with('/') {
        return None;
    }

    match line.split_once(' ') {
        None => SLASH_COMMANDS
            .iter()
            .find(|(name, _)| name.starts_with(line))
            .map(|(name, usage)| {
                let rest = &name[line.len()..];
                if usage.is_empty() {
                    rest.to_string()
                } else {
                    format!("{} {}", rest, usage)
                }
            })
            .filter(|hint| !hint.is_empty()),
        Some((name, args)) if args.is_empty() => SLASH_COMMANDS
            .iter()
            .find(|(command, _)| *command == name)
            .map(|(_, usage)| usage.to_string())
            .filter(|usage| !usage.is_empty()),
        Some(_) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the support agent.
    Send(String),
    /// `/email` without an argument prints the current identity.
    Email(Option<String>),
    Login { email: String, password: String },
    Logout,
    Status,
    Help,
    Quit,
    Empty,
    /// Unknown command or bad arguments, with a usage hint.
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        if trimmed == "quit" || trimmed == "exit" {
            return Command::Quit;
        }
        if !trimmed.starts_with('/') {
            return Command::Send(trimmed.to_string());
        }

        let mut parts = trimmed.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match (name, args.as_slice()) {
            ("/email", []) => Command::Email(None),
            ("/email", [address]) => Command::Email(Some(address.to_string())),
            ("/email", _) => Command::Invalid("usage: /email <address>".to_string()),
            ("/login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("/login", _) => Command::Invalid("usage: /login <email> <password>".to_string()),
            ("/logout", []) => Command::Logout,
            ("/status", []) => Command::Status,
            ("/help", []) => Command::Help,
            ("/logout" | "/status" | "/help", _) => {
                Command::Invalid(format!("{} takes no arguments", name))
            }
            _ => Command::Invalid(format!("unknown command {}, try /help", name)),
        }
    }
}

pub fn help_text() -> &'static str {
    "Type a message to chat with support.\n\
     /email <address>           set the email the conversation is tied to\n\
     /login <email> <password>  log in and remember the token\n\
     /logout                    forget the stored token\n\
     /status                    show session, identity and connectivity\n\
     /help                      show this help\n\
     quit | exit                leave"
}
