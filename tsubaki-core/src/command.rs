//! REPLコマンド

/// REPLコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 現在の状態を表示
    Status,
    /// Commandブレークポイントを有効化
    Enable {
        /// 状態を変更せず効果のみ表示する
        dry_run: bool,
    },
    /// Commandブレークポイントを無効化
    Disable {
        /// 状態を変更せず効果のみ表示する
        dry_run: bool,
    },
    /// 外部からの削除をシミュレート
    Remove,
    /// ガードを破棄
    Teardown,
    /// ヘルプ表示
    Help,
    /// 終了
    Quit,
}

impl Command {
    /// コマンド文字列をパースする
    pub fn parse(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.trim().split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }

        let dry_run = parts.len() > 1 && parts[1] == "dry";

        match parts[0] {
            "status" | "st" => Some(Command::Status),
            "enable" | "e" => Some(Command::Enable { dry_run }),
            "disable" | "d" => Some(Command::Disable { dry_run }),
            "remove" | "rm" => Some(Command::Remove),
            "teardown" => Some(Command::Teardown),
            "help" | "h" | "?" => Some(Command::Help),
            "quit" | "q" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("status"), Some(Command::Status));
        assert_eq!(
            Command::parse("enable"),
            Some(Command::Enable { dry_run: false })
        );
        assert_eq!(
            Command::parse("enable dry"),
            Some(Command::Enable { dry_run: true })
        );
        assert_eq!(
            Command::parse("d dry"),
            Some(Command::Disable { dry_run: true })
        );
        assert_eq!(Command::parse("rm"), Some(Command::Remove));
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("bogus"), None);
    }
}
