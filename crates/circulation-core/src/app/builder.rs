//! CirculationBuilder - サービスの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 省略された port には既定の実装を差し込む

use std::sync::Arc;

use super::locks::KeyedLocks;
use super::service::CirculationService;
use crate::domain::CirculationConfig;
use crate::entity::{ReturnPolicy, policy_for};
use crate::ports::{Clock, IdGenerator, RecordStore, SystemClock, UlidGenerator};

/// CirculationBuilder は CirculationService を構築
///
/// # 使用例
/// ```ignore
/// let service = CirculationBuilder::new()
///     .store(Arc::new(InMemoryRecordStore::new()))
///     .config(config)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - store だけは既定値がない。未設定なら build() が BuildError を返す
/// - clock: SystemClock、id generator: その clock を使う UlidGenerator
/// - return policy: 明示されなければ `config.return_check` から決める
#[derive(Default)]
pub struct CirculationBuilder {
    store: Option<Arc<dyn RecordStore>>,
    config: CirculationConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    return_policy: Option<Arc<dyn ReturnPolicy>>,
}

/// BuildError はサービス構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No record store configured. Call .store(...) before .build().")]
    MissingStore,
}

impl CirculationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: CirculationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Overrides the policy derived from `config.return_check`.
    pub fn return_policy(mut self, policy: Arc<dyn ReturnPolicy>) -> Self {
        self.return_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<CirculationService, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let ids = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(Arc::clone(&clock))),
        };
        let return_policy = match self.return_policy {
            Some(policy) => policy,
            None => Arc::from(policy_for(self.config.return_check)),
        };

        Ok(CirculationService {
            store,
            config: self.config,
            clock,
            ids,
            return_policy,
            locks: KeyedLocks::new(),
        })
    }
}
