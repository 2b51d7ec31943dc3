//! ブレークポイントレジストリ

use std::collections::HashMap;

use tracing::debug;
use tsubaki_host::{BreakpointHandle, DebugHost, TriggerSpec};

use crate::{errors::GuardError, Result};

/// Commandブレークポイントの論理名
pub const COMMAND_BREAKPOINT: &str = "Command";

/// レジストリに登録されたブレークポイント
///
/// ホスト側ハンドルと、最後に適用した有効フラグのミラーを一緒に保持します。
#[derive(Debug, Clone)]
pub struct RegisteredBreakpoint {
    /// ホスト側ハンドル
    pub handle: BreakpointHandle,
    /// 有効かどうか
    pub enabled: bool,
    /// 発火条件
    pub trigger: TriggerSpec,
}

/// ブレークポイントレジストリ
///
/// 論理名とホスト側ブレークポイントの対応を管理します。
/// 初期化後はCommandエントリがちょうど1つ存在します（再作成の瞬間を除く）。
pub struct BreakpointRegistry {
    entries: HashMap<String, RegisteredBreakpoint>,
    marker_command: String,
}

impl BreakpointRegistry {
    /// マーカーコマンド名を指定してレジストリを作成する
    pub fn new<S: Into<String>>(marker_command: S) -> Self {
        Self {
            entries: HashMap::new(),
            marker_command: marker_command.into(),
        }
    }

    /// Commandブレークポイントをホストに作成し、レジストリに登録する
    ///
    /// マーカーコマンドの呼び出しで停止するブレークポイントを作成します。
    /// 他のエントリには影響しません。
    pub fn create_command_breakpoint(&mut self, host: &dyn DebugHost) -> Result<RegisteredBreakpoint> {
        let trigger = TriggerSpec::command(self.marker_command.as_str());
        let handle = host
            .create_breakpoint(&trigger)
            .map_err(GuardError::Host)?;

        debug!(
            "registered command breakpoint {} on '{}'",
            handle.id(),
            trigger.command_name()
        );

        let bp = RegisteredBreakpoint {
            handle,
            enabled: true,
            trigger,
        };
        self.entries
            .insert(COMMAND_BREAKPOINT.to_string(), bp.clone());
        Ok(bp)
    }

    /// エントリを登録する（ホスト呼び出しなし）
    pub fn set<S: Into<String>>(&mut self, name: S, bp: RegisteredBreakpoint) {
        self.entries.insert(name.into(), bp);
    }

    /// エントリを取得する（ホスト呼び出しなし）
    pub fn get(&self, name: &str) -> Option<&RegisteredBreakpoint> {
        self.entries.get(name)
    }

    /// エントリを可変参照で取得する
    pub fn get_mut(&mut self, name: &str) -> Option<&mut RegisteredBreakpoint> {
        self.entries.get_mut(name)
    }

    /// 全エントリのブレークポイントをホストから削除し、レジストリを空にする
    ///
    /// ホスト側で既に存在しないものは無視します。
    pub fn remove_all(&mut self, host: &dyn DebugHost) {
        for (name, bp) in self.entries.drain() {
            if let Err(e) = host.remove_breakpoint(&bp.handle) {
                debug!("failed to remove breakpoint '{}': {}", name, e);
            }
        }
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// レジストリが空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// マーカーコマンド名を取得する
    pub fn marker_command(&self) -> &str {
        &self.marker_command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsubaki_host::SimHost;

    #[test]
    fn test_mapping_operations_do_not_touch_host() {
        let mut registry = BreakpointRegistry::new("checkpoint");
        let bp = RegisteredBreakpoint {
            handle: BreakpointHandle::new(7),
            enabled: true,
            trigger: TriggerSpec::command("checkpoint"),
        };

        registry.set(COMMAND_BREAKPOINT, bp);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(COMMAND_BREAKPOINT).map(|bp| bp.handle.id()),
            Some(7)
        );
        assert!(registry.get("Other").is_none());
    }

    #[test]
    fn test_create_command_breakpoint_registers_entry() {
        let host = SimHost::new(true);
        let mut registry = BreakpointRegistry::new("checkpoint");

        let bp = registry.create_command_breakpoint(&host).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(bp.enabled);
        assert_eq!(bp.trigger.command_name(), "checkpoint");
        assert!(host.breakpoint(&bp.handle).is_some());
    }

    #[test]
    fn test_remove_all_clears_registry_and_host() {
        let host = SimHost::new(true);
        let mut registry = BreakpointRegistry::new("checkpoint");
        registry.create_command_breakpoint(&host).unwrap();

        registry.remove_all(&host);

        assert!(registry.is_empty());
        assert_eq!(host.breakpoint_count(), 0);

        // 空のレジストリに対しても安全
        registry.remove_all(&host);
        assert!(registry.is_empty());
    }
}
