//! Tsubaki ガードのコア機能
//!
//! このクレートは、コマンドブレークポイントを常駐させるガードの中核ロジックを提供します。
//! レジストリ管理、セッション方針の適用、更新イベントの監視、ライフサイクル制御を統合します。

pub mod command;
pub mod controller;
pub mod errors;
pub mod monitor;
pub mod policy;
pub mod registry;

pub use command::Command;
pub use controller::{
    BreakpointLifecycleController, ConfirmationGate, GuardState, ToggleOptions, ToggleOutcome,
};
pub use errors::GuardError;
pub use monitor::{BreakpointEventMonitor, CommandBreakpointListener};
pub use policy::{ActivationState, SessionActivationPolicy};
pub use registry::{BreakpointRegistry, RegisteredBreakpoint, COMMAND_BREAKPOINT};

// 他のクレートから使用するために再エクスポート
pub use tsubaki_host::{BreakpointHandle, DebugHost, HostError, SimHost, TriggerSpec};

/// ガードの結果型
pub type Result<T> = anyhow::Result<T>;
