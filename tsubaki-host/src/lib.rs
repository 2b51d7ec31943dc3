//! Tsubaki ホスト環境レイヤ
//!
//! このクレートは、ガード本体が依存するホストデバッグ環境の抽象インターフェースを提供します。
//! ブレークポイントの作成・削除、更新通知の購読、セッション情報の取得などを行います。
//! テストとデモのためのシミュレートホストも含みます。

pub mod breakpoint;
pub mod event;
pub mod host;
pub mod sim;

pub use breakpoint::{BreakpointHandle, BreakpointSnapshot, HandleId, TriggerSpec};
pub use event::{BreakpointUpdateEvent, SubscriptionToken, UpdateKind, UpdateListener};
pub use host::{DebugHost, HostError};
pub use sim::SimHost;

/// ホスト操作の結果型
pub type Result<T> = std::result::Result<T, HostError>;
