//! Operator-invocable actions.

/// Commands the host can forward to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Connect to the stored endpoint.
    Connect,
    /// Prompt for a new endpoint, store it and connect.
    SetEndpoint,
    /// Show the reconnect / change URL / uptime menu.
    ShowOptions,
    /// Greeting.
    Hello,
    /// Send a fixed text frame on the open connection.
    SendTestMessage,
}

/// Entries of the options menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChoice {
    Reconnect,
    ChangeUrl,
    ShowUptime,
}

impl OptionChoice {
    pub const ALL: [OptionChoice; 3] = [Self::Reconnect, Self::ChangeUrl, Self::ShowUptime];

    pub fn label(self) -> &'static str {
        match self {
            Self::Reconnect => "Reconnect",
            Self::ChangeUrl => "Change URL",
            Self::ShowUptime => "Show uptime",
        }
    }

    pub fn labels() -> [&'static str; 3] {
        Self::ALL.map(Self::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_menu_order() {
        assert_eq!(OptionChoice::labels(), ["Reconnect", "Change URL", "Show uptime"]);
        assert_eq!(OptionChoice::ALL[2], OptionChoice::ShowUptime);
    }
}
