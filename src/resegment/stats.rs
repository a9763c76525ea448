/// 再分割処理の累積カウンタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResegmentStats {
    /// ソースからの取得回数（終端通知を含む）
    pub pulls: u64,
    /// 保留ブロックとの連結・成長ループでの連結回数
    pub merges: u64,
    /// 余剰分を切り出した回数
    pub splits: u64,
    /// 取得せずに保留中の余剰から出力した回数
    pub surplus_reuses: u64,
    pub blocks_emitted: u64,
    pub samples_emitted: u64,
    /// `TailPolicy::Drop` で破棄した末尾サンプル数
    pub samples_dropped: u64,
}
