//! ガードのライフサイクル制御

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error};
use tsubaki_host::{BreakpointHandle, DebugHost};

use crate::{
    errors::GuardError,
    monitor::{BreakpointEventMonitor, CommandBreakpointListener},
    policy::{ActivationState, SessionActivationPolicy},
    registry::{BreakpointRegistry, RegisteredBreakpoint, COMMAND_BREAKPOINT},
    Result,
};

/// Commandブレークポイントの状態
///
/// 不在状態は同期ディスパッチの内部にのみ存在するため、ここには現れません。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// 有効
    EnabledActive,
    /// 無効
    DisabledInactive,
    /// 破棄済み（終端）
    TornDown,
}

/// 状態変更前の確認ゲート
///
/// falseを返すと操作は中止されます。
pub trait ConfirmationGate {
    /// ユーザーに確認する
    fn confirm(&self, prompt: &str) -> bool;
}

/// enable/disableのオプション
#[derive(Default)]
pub struct ToggleOptions<'a> {
    /// 状態を変更せず、意図された効果のみを報告する
    pub dry_run: bool,
    /// 変更前の確認ゲート
    pub gate: Option<&'a dyn ConfirmationGate>,
}

/// enable/disableの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// 変更を適用した（既にその状態だった場合を含む）
    Applied(GuardState),
    /// dry-run: 適用した場合になる状態
    WouldApply(GuardState),
    /// 確認ゲートで中止された
    Declined,
}

/// ブレークポイントのライフサイクルコントローラ
///
/// レジストリ・起動方針・モニタを合成し、セッションの文脈を所有します。
/// グローバル状態は持たず、リスナーにはレジストリへの参照を渡します。
pub struct BreakpointLifecycleController {
    host: Rc<dyn DebugHost>,
    registry: Rc<RefCell<BreakpointRegistry>>,
    monitor: BreakpointEventMonitor,
    torn_down: bool,
}

impl BreakpointLifecycleController {
    /// ガードセッションを開始する
    ///
    /// Commandブレークポイントを作成し、セッションの対話性に応じた初期状態を
    /// 適用してから、更新ストリームの監視を開始します。
    pub fn start<S: Into<String>>(host: Rc<dyn DebugHost>, marker_command: S) -> Result<Self> {
        let registry = Rc::new(RefCell::new(BreakpointRegistry::new(marker_command)));

        let bp = registry.borrow_mut().create_command_breakpoint(host.as_ref())?;

        // 初期状態はちょうど1回だけ適用する
        let initial = SessionActivationPolicy::initial_state(host.is_session_interactive());
        if initial == ActivationState::Disabled {
            host.disable_breakpoint(&bp.handle).map_err(GuardError::Host)?;
            if let Some(entry) = registry.borrow_mut().get_mut(COMMAND_BREAKPOINT) {
                entry.enabled = false;
            }
        }

        let listener = Rc::new(CommandBreakpointListener::new(Rc::clone(&registry)));
        let mut monitor = BreakpointEventMonitor::new();
        monitor.subscribe(host.as_ref(), listener);

        debug!(
            "breakpoint guard started on '{}' ({:?})",
            registry.borrow().marker_command(),
            initial
        );

        Ok(Self {
            host,
            registry,
            monitor,
            torn_down: false,
        })
    }

    /// Commandブレークポイントを有効化する（冪等）
    pub fn enable(&mut self) -> Result<()> {
        self.enable_with(&ToggleOptions::default()).map(|_| ())
    }

    /// Commandブレークポイントを無効化する（冪等）
    pub fn disable(&mut self) -> Result<()> {
        self.disable_with(&ToggleOptions::default()).map(|_| ())
    }

    /// オプション付きで有効化する
    pub fn enable_with(&mut self, opts: &ToggleOptions) -> Result<ToggleOutcome> {
        self.toggle(true, opts)
    }

    /// オプション付きで無効化する
    pub fn disable_with(&mut self, opts: &ToggleOptions) -> Result<ToggleOutcome> {
        self.toggle(false, opts)
    }

    fn toggle(&mut self, enable: bool, opts: &ToggleOptions) -> Result<ToggleOutcome> {
        if self.torn_down {
            return Err(GuardError::TornDown.into());
        }

        let target = if enable {
            GuardState::EnabledActive
        } else {
            GuardState::DisabledInactive
        };

        if opts.dry_run {
            return Ok(ToggleOutcome::WouldApply(target));
        }

        if let Some(gate) = opts.gate {
            let prompt = if enable {
                "Enable the command breakpoint?"
            } else {
                "Disable the command breakpoint?"
            };
            if !gate.confirm(prompt) {
                return Ok(ToggleOutcome::Declined);
            }
        }

        let handle = self.require_command_breakpoint()?;
        let result = if enable {
            self.host.enable_breakpoint(&handle)
        } else {
            self.host.disable_breakpoint(&handle)
        };
        result.map_err(GuardError::Host)?;

        if let Some(entry) = self.registry.borrow_mut().get_mut(COMMAND_BREAKPOINT) {
            entry.enabled = enable;
        }
        Ok(ToggleOutcome::Applied(target))
    }

    /// Commandブレークポイントのハンドルを取得する
    ///
    /// エントリが存在しない場合は防御的に1回だけ再作成を試みます。
    /// モニタが機能している限りこの経路には入りません。
    fn require_command_breakpoint(&mut self) -> Result<BreakpointHandle> {
        let existing = self
            .registry
            .borrow()
            .get(COMMAND_BREAKPOINT)
            .map(|bp| bp.handle.clone());
        if let Some(handle) = existing {
            return Ok(handle);
        }

        error!("command breakpoint missing from registry; attempting one recreation");
        let recreated = self
            .registry
            .borrow_mut()
            .create_command_breakpoint(self.host.as_ref())
            .map_err(|e| e.context(GuardError::MissingCommandBreakpoint))?;
        Ok(recreated.handle)
    }

    /// 現在の状態を取得する
    pub fn state(&self) -> GuardState {
        if self.torn_down {
            return GuardState::TornDown;
        }
        match self.registry.borrow().get(COMMAND_BREAKPOINT) {
            Some(bp) if bp.enabled => GuardState::EnabledActive,
            _ => GuardState::DisabledInactive,
        }
    }

    /// Commandブレークポイントの現在のレジストリエントリを取得する
    pub fn command_breakpoint(&self) -> Option<RegisteredBreakpoint> {
        self.registry.borrow().get(COMMAND_BREAKPOINT).cloned()
    }

    /// レジストリのエントリ数
    pub fn registry_len(&self) -> usize {
        self.registry.borrow().len()
    }

    /// 更新ストリームを購読中かどうか
    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_subscribed()
    }

    /// ガードを破棄する
    ///
    /// モニタの購読を解除してから、レジストリの全ブレークポイントを削除します。
    /// 何度呼んでも安全で、2回目以降は何もしません。
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.monitor.unsubscribe(self.host.as_ref());
        self.registry.borrow_mut().remove_all(self.host.as_ref());
        self.torn_down = true;
        debug!("breakpoint guard torn down");
    }
}

impl Drop for BreakpointLifecycleController {
    /// セッション終了時のteardownフック
    fn drop(&mut self) {
        self.teardown();
    }
}
