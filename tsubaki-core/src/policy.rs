//! セッション起動方針

/// ブレークポイントの初期状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// 有効で開始する
    Enabled,
    /// 無効で開始する
    Disabled,
}

/// セッションの対話性から初期状態を決める方針
///
/// 自動実行などの非対話セッションでは実行を止めないため、無効状態で開始します。
/// ブレークポイント作成直後に、ちょうど1回だけ適用されます。
pub struct SessionActivationPolicy;

impl SessionActivationPolicy {
    /// 初期状態を決定する
    pub fn initial_state(is_interactive: bool) -> ActivationState {
        if is_interactive {
            ActivationState::Enabled
        } else {
            ActivationState::Disabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(
            SessionActivationPolicy::initial_state(true),
            ActivationState::Enabled
        );
        assert_eq!(
            SessionActivationPolicy::initial_state(false),
            ActivationState::Disabled
        );
    }
}
