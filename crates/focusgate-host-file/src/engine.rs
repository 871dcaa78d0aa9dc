//! Rule engine backed by a JSON document on disk

use async_trait::async_trait;
use focusgate_api::{EnforcementSnapshot, ReconcileOp};
use focusgate_host_api::{EngineError, EngineResult, RuleEngine, apply_to_snapshot};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{BaselineRuleset, RulesDocument};

/// File-backed rule engine.
///
/// The document on disk is the source of truth: every snapshot re-reads it
/// and every accepted operation rewrites it through a temporary file and a
/// rename, so readers never observe a half-written document.
pub struct FileRuleEngine {
    path: PathBuf,
    baseline: BaselineRuleset,
    write_lock: Mutex<()>,
}

impl FileRuleEngine {
    pub fn new(path: impl Into<PathBuf>, baseline: BaselineRuleset) -> Self {
        Self {
            path: path.into(),
            baseline,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the configured baseline into the document, keeping any
    /// enabled state and dynamic rules already installed.
    pub async fn init(&self) -> EngineResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.read_document().await?;
        let snapshot = doc.snapshot();

        // Re-key the enabled state in case the ruleset id changed
        doc.baseline = self.baseline.clone();
        doc.update_from(snapshot);
        self.write_document(&doc).await?;

        info!(
            path = %self.path.display(),
            ruleset = %self.baseline.id,
            baseline_rules = self.baseline.rules.len(),
            dynamic_rules = doc.dynamic_rules.len(),
            "Rules document ready"
        );
        Ok(())
    }

    async fn read_document(&self) -> EngineResult<RulesDocument> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No rules document yet");
                return Ok(RulesDocument::new(self.baseline.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Unreadable rules document");
            EngineError::Serialization(e.to_string())
        })
    }

    async fn write_document(&self, doc: &RulesDocument) -> EngineResult<()> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| EngineError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RuleEngine for FileRuleEngine {
    async fn get_installed_rules(&self) -> EngineResult<EnforcementSnapshot> {
        let _guard = self.write_lock.lock().await;
        Ok(self.read_document().await?.snapshot())
    }

    async fn apply_op(&self, op: &ReconcileOp) -> EngineResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.read_document().await?;
        let mut snapshot = doc.snapshot();
        apply_to_snapshot(&mut snapshot, op)?;

        doc.update_from(snapshot);
        self.write_document(&doc).await?;

        debug!(op = %op, path = %self.path.display(), "Rules document updated");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.path.parent().is_none_or(Path::exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusgate_api::{ReconcilePlan, RuleDescriptor};
    use focusgate_util::{RuleId, RulesetId};

    fn baseline() -> BaselineRuleset {
        BaselineRuleset {
            id: RulesetId::new("ruleset_1"),
            rules: vec![RuleDescriptor::redirect_main_frame(
                RuleId::new(1),
                "*://*.video.example/*",
                "/block.html",
            )],
        }
    }

    fn custom(id: u32, filter: &str) -> RuleDescriptor {
        RuleDescriptor::redirect_main_frame(RuleId::new(id), filter, "/block.html")
    }

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FileRuleEngine::new(dir.path().join("rules.json"), baseline());

        let snapshot = engine.get_installed_rules().await.unwrap();
        assert_eq!(snapshot, EnforcementSnapshot::default());
    }

    #[tokio::test]
    async fn test_health_follows_rules_directory() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FileRuleEngine::new(dir.path().join("state").join("rules.json"), baseline());
        assert!(!engine.is_healthy());

        engine.init().await.unwrap();
        assert!(engine.is_healthy());
    }

    #[tokio::test]
    async fn test_plan_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("rules.json");
        let engine = FileRuleEngine::new(&path, baseline());
        engine.init().await.unwrap();

        let mut plan = ReconcilePlan::new();
        plan.push(ReconcileOp::EnableBaseline);
        plan.push(ReconcileOp::AddRules {
            rules: vec![custom(1000, "*://*.a.com/*"), custom(2000, "*://a.com/*")],
        });
        assert_eq!(engine.apply_plan(&plan).await.unwrap(), 2);

        // A fresh engine on the same file sees the same state
        let reopened = FileRuleEngine::new(&path, baseline());
        let snapshot = reopened.get_installed_rules().await.unwrap();
        assert!(snapshot.baseline_enabled);
        assert_eq!(snapshot.rules.len(), 2);

        let doc: RulesDocument =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc.enabled_rulesets, vec![RulesetId::new("ruleset_1")]);
        assert_eq!(doc.baseline.rules.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_op_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let engine = FileRuleEngine::new(&path, baseline());

        engine
            .apply_op(&ReconcileOp::AddRules {
                rules: vec![custom(1000, "*://*.a.com/*")],
            })
            .await
            .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = engine
            .apply_op(&ReconcileOp::AddRules {
                rules: vec![custom(1000, "*://*.b.com/*")],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateRuleId(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_init_keeps_installed_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");

        let engine = FileRuleEngine::new(&path, baseline());
        engine.apply_op(&ReconcileOp::EnableBaseline).await.unwrap();
        engine
            .apply_op(&ReconcileOp::AddRules {
                rules: vec![custom(1000, "*://*.a.com/*")],
            })
            .await
            .unwrap();

        let mut updated = baseline();
        updated.rules.push(custom(2, "*://video.example/*"));
        let restarted = FileRuleEngine::new(&path, updated);
        restarted.init().await.unwrap();

        let snapshot = restarted.get_installed_rules().await.unwrap();
        assert!(snapshot.baseline_enabled);
        assert_eq!(snapshot.rules.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();

        let engine = FileRuleEngine::new(&path, baseline());
        let err = engine.get_installed_rules().await.unwrap_err();
        assert!(matches!(err, EngineError::Serialization(_)));
    }
}
