//! ガードのエラー型

use thiserror::Error;
use tsubaki_host::HostError;

/// ガードのエラー
#[derive(Debug, Error)]
pub enum GuardError {
    /// ホストがブレークポイント操作を拒否した
    #[error("host rejected breakpoint operation: {0}")]
    Host(#[from] HostError),

    /// レジストリにCommandブレークポイントが存在しない
    ///
    /// モニタが機能している限り到達しない防御的エラー。
    #[error("command breakpoint not found in registry")]
    MissingCommandBreakpoint,

    /// teardown後に操作が呼ばれた
    #[error("breakpoint guard is already torn down")]
    TornDown,
}
