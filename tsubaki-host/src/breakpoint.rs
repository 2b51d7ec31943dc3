//! ブレークポイントの基本型

/// ホストが割り当てるブレークポイントID
pub type HandleId = u64;

/// ホスト側ブレークポイントへのハンドル
///
/// IDはホストが割り当て、再作成のたびに変わります。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreakpointHandle {
    id: HandleId,
}

impl BreakpointHandle {
    /// ハンドルを作成する
    pub fn new(id: HandleId) -> Self {
        Self { id }
    }

    /// ホストが割り当てたIDを取得する
    pub fn id(&self) -> HandleId {
        self.id
    }
}

/// ブレークポイントの発火条件
///
/// 指定されたマーカーコマンドの呼び出しで停止します。
/// 呼び出し元の場所には依存しません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    command: String,
}

impl TriggerSpec {
    /// マーカーコマンド名から発火条件を作成する
    pub fn command<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// マーカーコマンド名を取得する
    pub fn command_name(&self) -> &str {
        &self.command
    }
}

/// ブレークポイントのスナップショット
///
/// イベントに添付される、ある時点でのブレークポイント状態のコピー。
#[derive(Debug, Clone)]
pub struct BreakpointSnapshot {
    /// ホストが割り当てたID
    pub id: HandleId,
    /// 有効かどうか
    pub enabled: bool,
    /// 発火条件
    pub trigger: TriggerSpec,
}
