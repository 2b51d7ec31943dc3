//! ブレークポイント更新イベント

use crate::{BreakpointSnapshot, DebugHost};

/// 更新ストリームの購読トークン
pub type SubscriptionToken = u64;

/// 更新の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// ブレークポイントが追加された
    Added,
    /// ブレークポイントが削除された
    Removed,
    /// 有効化された
    EnabledChanged,
    /// 無効化された
    DisabledChanged,
}

/// ブレークポイント更新イベント
///
/// リスナーは`mark_handled`でイベントを処理済みにできます。
/// 処理済みのイベントは後続のリスナーに配送されません。
#[derive(Debug, Clone)]
pub struct BreakpointUpdateEvent {
    /// 更新の種別
    pub kind: UpdateKind,
    /// 更新対象ブレークポイントのスナップショット
    pub breakpoint: BreakpointSnapshot,
    handled: bool,
}

impl BreakpointUpdateEvent {
    /// イベントを作成する
    pub fn new(kind: UpdateKind, breakpoint: BreakpointSnapshot) -> Self {
        Self {
            kind,
            breakpoint,
            handled: false,
        }
    }

    /// イベントを処理済みとしてマークする
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// 処理済みかどうか
    pub fn is_handled(&self) -> bool {
        self.handled
    }
}

/// ブレークポイント更新の通知を受け取るリスナー
///
/// ホストのイベントディスパッチから同期的かつ直列に呼び出されます。
/// リスナーは`host`経由でホストを再入呼び出しできます（配送中の
/// 状態変更も同じディスパッチ文脈で直列に処理されます）。
pub trait UpdateListener {
    /// 更新イベントを処理する
    fn handle(&self, host: &dyn DebugHost, event: &mut BreakpointUpdateEvent)
        -> anyhow::Result<()>;
}
