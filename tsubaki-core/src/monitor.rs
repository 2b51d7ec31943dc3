//! ブレークポイント更新イベントの監視

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;
use tsubaki_host::{
    BreakpointUpdateEvent, DebugHost, SubscriptionToken, UpdateKind, UpdateListener,
};

use crate::registry::{BreakpointRegistry, COMMAND_BREAKPOINT};

/// Commandブレークポイントの復活を担当するリスナー
///
/// レジストリへの参照を保持する束縛リスナーです。クロージャのキャプチャに
/// 依存しないため、単体で構築・テスト・購読解除できます。
pub struct CommandBreakpointListener {
    registry: Rc<RefCell<BreakpointRegistry>>,
}

impl CommandBreakpointListener {
    /// レジストリを束縛してリスナーを作成する
    pub fn new(registry: Rc<RefCell<BreakpointRegistry>>) -> Self {
        Self { registry }
    }
}

impl UpdateListener for CommandBreakpointListener {
    /// ホストのディスパッチ内で同期的に実行される
    ///
    /// Commandブレークポイントの削除を検出したら、ハンドラが戻る前に再作成を
    /// 完了させます。配送は単一スレッドかつ直列なので、再作成までの不在状態が
    /// 他のコードから観測されることはありません。
    fn handle(
        &self,
        host: &dyn DebugHost,
        event: &mut BreakpointUpdateEvent,
    ) -> anyhow::Result<()> {
        // Removed以外はここで抜ける。再作成中に再入配送されるAdded等も
        // この早期リターンを通るため、レジストリのborrowと衝突しない。
        if event.kind != UpdateKind::Removed {
            return Ok(());
        }

        let guarded_id = self
            .registry
            .borrow()
            .get(COMMAND_BREAKPOINT)
            .map(|bp| bp.handle.id());
        match guarded_id {
            Some(id) if id == event.breakpoint.id => {}
            _ => return Ok(()),
        }

        let was_enabled = event.breakpoint.enabled;
        warn!(
            "command breakpoint {} is required and was removed externally; recreating. \
             Use disable() to turn it off, or teardown() to remove it for the session",
            event.breakpoint.id
        );

        let recreated = self
            .registry
            .borrow_mut()
            .create_command_breakpoint(host)?;

        // 削除直前の有効フラグを引き継ぐ
        if !was_enabled {
            host.disable_breakpoint(&recreated.handle)?;
            if let Some(bp) = self.registry.borrow_mut().get_mut(COMMAND_BREAKPOINT) {
                bp.enabled = false;
            }
        }

        // 後続のハンドラに不在状態を見せない
        event.mark_handled();
        Ok(())
    }
}

/// 更新ストリームの購読を管理するモニタ
pub struct BreakpointEventMonitor {
    token: Option<SubscriptionToken>,
}

impl BreakpointEventMonitor {
    /// モニタを作成する
    pub fn new() -> Self {
        Self { token: None }
    }

    /// リスナーをホストの更新ストリームに登録する
    ///
    /// 既に購読中の場合は何もしません。
    pub fn subscribe(&mut self, host: &dyn DebugHost, listener: Rc<dyn UpdateListener>) {
        if self.token.is_none() {
            self.token = Some(host.subscribe_to_breakpoint_updates(listener));
        }
    }

    /// 購読を解除する
    ///
    /// 冪等で、解除済みの場合は何もしません。
    pub fn unsubscribe(&mut self, host: &dyn DebugHost) {
        if let Some(token) = self.token.take() {
            host.unsubscribe(token);
        }
    }

    /// 購読中かどうか
    pub fn is_subscribed(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for BreakpointEventMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsubaki_host::SimHost;

    #[test]
    fn test_listener_ignores_foreign_removal() {
        let host = SimHost::new(true);
        let registry = Rc::new(RefCell::new(BreakpointRegistry::new("checkpoint")));
        registry.borrow_mut().create_command_breakpoint(&host).unwrap();

        let listener = Rc::new(CommandBreakpointListener::new(Rc::clone(&registry)));
        let mut monitor = BreakpointEventMonitor::new();
        monitor.subscribe(&host, listener);

        // ガード対象ではないブレークポイントの削除には反応しない
        let other = host
            .create_breakpoint(&tsubaki_host::TriggerSpec::command("other"))
            .unwrap();
        host.remove_breakpoint(&other).unwrap();

        assert_eq!(host.breakpoint_count(), 1);
        assert_eq!(registry.borrow().len(), 1);
    }

    #[test]
    fn test_monitor_subscribe_unsubscribe_idempotent() {
        let host = SimHost::new(true);
        let registry = Rc::new(RefCell::new(BreakpointRegistry::new("checkpoint")));
        let listener = Rc::new(CommandBreakpointListener::new(Rc::clone(&registry)));

        let mut monitor = BreakpointEventMonitor::new();
        assert!(!monitor.is_subscribed());

        monitor.subscribe(&host, listener.clone());
        assert!(monitor.is_subscribed());
        // 二重購読はしない
        monitor.subscribe(&host, listener);
        assert!(monitor.is_subscribed());

        monitor.unsubscribe(&host);
        assert!(!monitor.is_subscribed());
        monitor.unsubscribe(&host);
        assert!(!monitor.is_subscribed());
    }
}
