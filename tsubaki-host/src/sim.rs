//! シミュレートされたホスト環境
//!
//! CLIデモとテストで使用する、インメモリのホスト実装。
//! 更新イベントは購読順に同期配送し、処理済みイベントで配送を打ち切ります。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, error};

use crate::{
    BreakpointHandle, BreakpointSnapshot, BreakpointUpdateEvent, DebugHost, HandleId, HostError,
    Result, SubscriptionToken, TriggerSpec, UpdateKind, UpdateListener,
};

/// ホスト側ブレークポイントの内部状態
struct SimBreakpoint {
    enabled: bool,
    trigger: TriggerSpec,
}

/// ブレークポイントテーブル
struct SimState {
    breakpoints: HashMap<HandleId, SimBreakpoint>,
    next_id: HandleId,
}

/// シミュレートホスト
///
/// ブレークポイントを単一のテーブルで管理し、状態変更のたびに
/// 更新イベントをリスナーへ同期配送します。
pub struct SimHost {
    state: RefCell<SimState>,
    listeners: RefCell<Vec<(SubscriptionToken, Rc<dyn UpdateListener>)>>,
    next_token: Cell<SubscriptionToken>,
    interactive: bool,
}

impl SimHost {
    /// シミュレートホストを作成する
    pub fn new(interactive: bool) -> Self {
        Self {
            state: RefCell::new(SimState {
                breakpoints: HashMap::new(),
                next_id: 1,
            }),
            listeners: RefCell::new(Vec::new()),
            next_token: Cell::new(1),
            interactive,
        }
    }

    /// ホストに存在するブレークポイントの数
    pub fn breakpoint_count(&self) -> usize {
        self.state.borrow().breakpoints.len()
    }

    /// イベントを購読者へ配送する
    ///
    /// リスナーは配送中にこのホストを再入呼び出しできるため、
    /// リスナーリストを複製し、状態のborrowを解放してから呼び出します。
    fn dispatch(&self, kind: UpdateKind, snapshot: BreakpointSnapshot) {
        let listeners: Vec<Rc<dyn UpdateListener>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        let mut event = BreakpointUpdateEvent::new(kind, snapshot);
        for listener in listeners {
            if event.is_handled() {
                break;
            }
            if let Err(e) = listener.handle(self, &mut event) {
                error!("breakpoint update listener failed: {}", e);
            }
        }
    }
}

impl DebugHost for SimHost {
    fn create_breakpoint(&self, trigger: &TriggerSpec) -> Result<BreakpointHandle> {
        let (id, snapshot) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.breakpoints.insert(
                id,
                SimBreakpoint {
                    enabled: true,
                    trigger: trigger.clone(),
                },
            );
            let snapshot = BreakpointSnapshot {
                id,
                enabled: true,
                trigger: trigger.clone(),
            };
            (id, snapshot)
        };

        debug!("created breakpoint {} on '{}'", id, trigger.command_name());
        self.dispatch(UpdateKind::Added, snapshot);
        Ok(BreakpointHandle::new(id))
    }

    fn enable_breakpoint(&self, handle: &BreakpointHandle) -> Result<()> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let bp = state
                .breakpoints
                .get_mut(&handle.id())
                .ok_or(HostError::InvalidHandle(handle.id()))?;
            if bp.enabled {
                return Ok(());
            }
            bp.enabled = true;
            BreakpointSnapshot {
                id: handle.id(),
                enabled: true,
                trigger: bp.trigger.clone(),
            }
        };

        self.dispatch(UpdateKind::EnabledChanged, snapshot);
        Ok(())
    }

    fn disable_breakpoint(&self, handle: &BreakpointHandle) -> Result<()> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let bp = state
                .breakpoints
                .get_mut(&handle.id())
                .ok_or(HostError::InvalidHandle(handle.id()))?;
            if !bp.enabled {
                return Ok(());
            }
            bp.enabled = false;
            BreakpointSnapshot {
                id: handle.id(),
                enabled: false,
                trigger: bp.trigger.clone(),
            }
        };

        self.dispatch(UpdateKind::DisabledChanged, snapshot);
        Ok(())
    }

    fn remove_breakpoint(&self, handle: &BreakpointHandle) -> Result<()> {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            match state.breakpoints.remove(&handle.id()) {
                Some(bp) => BreakpointSnapshot {
                    id: handle.id(),
                    enabled: bp.enabled,
                    trigger: bp.trigger,
                },
                // 既に存在しない場合は何もしない
                None => return Ok(()),
            }
        };

        debug!("removed breakpoint {}", handle.id());
        self.dispatch(UpdateKind::Removed, snapshot);
        Ok(())
    }

    fn breakpoint(&self, handle: &BreakpointHandle) -> Option<BreakpointSnapshot> {
        let state = self.state.borrow();
        state
            .breakpoints
            .get(&handle.id())
            .map(|bp| BreakpointSnapshot {
                id: handle.id(),
                enabled: bp.enabled,
                trigger: bp.trigger.clone(),
            })
    }

    fn subscribe_to_breakpoint_updates(
        &self,
        listener: Rc<dyn UpdateListener>,
    ) -> SubscriptionToken {
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        self.listeners.borrow_mut().push((token, listener));
        token
    }

    fn unsubscribe(&self, token: SubscriptionToken) {
        self.listeners.borrow_mut().retain(|(t, _)| *t != token);
    }

    fn is_session_interactive(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 受け取ったイベント種別を記録するリスナー
    struct Recorder {
        seen: RefCell<Vec<UpdateKind>>,
        mark_handled: bool,
    }

    impl Recorder {
        fn new(mark_handled: bool) -> Rc<Self> {
            Rc::new(Self {
                seen: RefCell::new(Vec::new()),
                mark_handled,
            })
        }
    }

    impl UpdateListener for Recorder {
        fn handle(
            &self,
            _host: &dyn DebugHost,
            event: &mut BreakpointUpdateEvent,
        ) -> anyhow::Result<()> {
            self.seen.borrow_mut().push(event.kind);
            if self.mark_handled {
                event.mark_handled();
            }
            Ok(())
        }
    }

    #[test]
    fn test_lifecycle_events() {
        let host = SimHost::new(true);
        let recorder = Recorder::new(false);
        host.subscribe_to_breakpoint_updates(recorder.clone());

        let handle = host
            .create_breakpoint(&TriggerSpec::command("checkpoint"))
            .unwrap();
        host.disable_breakpoint(&handle).unwrap();
        host.enable_breakpoint(&handle).unwrap();
        host.remove_breakpoint(&handle).unwrap();

        assert_eq!(
            *recorder.seen.borrow(),
            vec![
                UpdateKind::Added,
                UpdateKind::DisabledChanged,
                UpdateKind::EnabledChanged,
                UpdateKind::Removed,
            ]
        );
        assert_eq!(host.breakpoint_count(), 0);
    }

    #[test]
    fn test_enable_is_idempotent_and_silent() {
        let host = SimHost::new(true);
        let recorder = Recorder::new(false);
        host.subscribe_to_breakpoint_updates(recorder.clone());

        let handle = host
            .create_breakpoint(&TriggerSpec::command("checkpoint"))
            .unwrap();
        // 作成直後は有効なので、enableは状態を変えずイベントも出ない
        host.enable_breakpoint(&handle).unwrap();

        assert_eq!(*recorder.seen.borrow(), vec![UpdateKind::Added]);
    }

    #[test]
    fn test_remove_absent_is_ok() {
        let host = SimHost::new(true);
        let handle = host
            .create_breakpoint(&TriggerSpec::command("checkpoint"))
            .unwrap();
        host.remove_breakpoint(&handle).unwrap();
        host.remove_breakpoint(&handle).unwrap();
    }

    #[test]
    fn test_enable_invalid_handle_errors() {
        let host = SimHost::new(true);
        let bogus = BreakpointHandle::new(99);
        let err = host.enable_breakpoint(&bogus).unwrap_err();
        assert!(matches!(err, HostError::InvalidHandle(99)));
    }

    #[test]
    fn test_handled_event_stops_propagation() {
        let host = SimHost::new(true);
        let first = Recorder::new(true);
        let second = Recorder::new(false);
        host.subscribe_to_breakpoint_updates(first.clone());
        host.subscribe_to_breakpoint_updates(second.clone());

        host.create_breakpoint(&TriggerSpec::command("checkpoint"))
            .unwrap();

        assert_eq!(*first.seen.borrow(), vec![UpdateKind::Added]);
        assert!(second.seen.borrow().is_empty());
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let host = SimHost::new(true);
        let recorder = Recorder::new(false);
        let token = host.subscribe_to_breakpoint_updates(recorder.clone());

        host.unsubscribe(token);
        host.unsubscribe(token);

        host.create_breakpoint(&TriggerSpec::command("checkpoint"))
            .unwrap();
        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn test_is_session_interactive() {
        assert!(SimHost::new(true).is_session_interactive());
        assert!(!SimHost::new(false).is_session_interactive());
    }
}
