//! ホストデバッグ環境の能力インターフェース

use std::rc::Rc;

use thiserror::Error;

use crate::{
    BreakpointHandle, BreakpointSnapshot, HandleId, Result, SubscriptionToken, TriggerSpec,
    UpdateListener,
};

/// ホストAPIのエラー
///
/// ホストがブレークポイント操作を拒否した場合に返されます。
/// リトライはされず、呼び出し元へそのまま伝播します。
#[derive(Debug, Error)]
pub enum HostError {
    /// 無効なハンドルが指定された
    #[error("invalid breakpoint handle: {0}")]
    InvalidHandle(HandleId),
    /// ホストが操作を拒否した
    #[error("host rejected breakpoint operation: {0}")]
    Rejected(String),
}

/// ホストデバッグ環境
///
/// ブレークポイントの状態を所有し、更新通知を購読者へ配送する実行環境。
/// すべてのメソッドは単一のディスパッチスレッドから呼び出される前提で、
/// 実装は内部可変性を用います。
pub trait DebugHost {
    /// ブレークポイントを作成する
    ///
    /// 作成直後のブレークポイントは有効状態です。
    fn create_breakpoint(&self, trigger: &TriggerSpec) -> Result<BreakpointHandle>;

    /// ブレークポイントを有効化する
    fn enable_breakpoint(&self, handle: &BreakpointHandle) -> Result<()>;

    /// ブレークポイントを無効化する
    fn disable_breakpoint(&self, handle: &BreakpointHandle) -> Result<()>;

    /// ブレークポイントを削除する
    ///
    /// すでに存在しない場合はエラーになりません。
    fn remove_breakpoint(&self, handle: &BreakpointHandle) -> Result<()>;

    /// ハンドルが指すブレークポイントの現在の状態を取得する
    ///
    /// ホストに存在しない場合はNoneを返します。
    fn breakpoint(&self, handle: &BreakpointHandle) -> Option<BreakpointSnapshot>;

    /// ブレークポイント更新の通知を購読する
    fn subscribe_to_breakpoint_updates(&self, listener: Rc<dyn UpdateListener>)
        -> SubscriptionToken;

    /// 購読を解除する
    ///
    /// 解除済みのトークンを渡しても何も起こりません。
    fn unsubscribe(&self, token: SubscriptionToken);

    /// セッションが対話的かどうか
    fn is_session_interactive(&self) -> bool;
}
