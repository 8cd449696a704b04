//! Rewrite soundness policy
//!
//! Orchestrates the checks for one candidate: configuration gate,
//! admissibility, condition stability, initializer scoping, the pattern's
//! structural precondition, and finally case-split equivalence. Every stage
//! answers conservatively; a candidate is fully `Verified`, `Unknown`, or
//! `Rejected`, never partially applied.

use rayon::prelude::*;
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::features::eval::domain::AnalysisFault;
use crate::features::rewrite_check::domain::{RewriteCandidate, Verdict};
use crate::features::rewrite_check::infrastructure::equivalence::{
    collect_condition_vars, collect_non_init_assign_targets, CheckOutcome, EquivalenceChecker,
};
use crate::features::rewrite_check::infrastructure::precondition::check_pattern_precondition;
use crate::features::rewrite_check::infrastructure::scope::check_initializer_scopes;
use crate::shared::models::Statement;

pub struct SoundnessPolicy {
    config: AnalyzerConfig,
}

impl SoundnessPolicy {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Certify one candidate
    pub fn verify(&self, candidate: &RewriteCandidate) -> Verdict {
        let verdict = self.verify_inner(candidate);
        debug!(
            pattern = ?candidate.pattern,
            verified = verdict.is_verified(),
            "rewrite candidate checked"
        );
        verdict
    }

    /// Certify a batch of candidates in parallel, order preserved
    pub fn verify_all(&self, candidates: &[RewriteCandidate]) -> Vec<Verdict> {
        candidates.par_iter().map(|c| self.verify(c)).collect()
    }

    fn verify_inner(&self, candidate: &RewriteCandidate) -> Verdict {
        // Only the early-return-aware + opaque-calls combination carries
        // enough semantics to certify a rewrite.
        if !self.config.rewrite_checks_enabled() {
            return Verdict::unknown(
                "rewrite checks need early_return_aware mode with opaque_calls policy",
            );
        }

        if let Some(verdict) = self.admissibility(candidate) {
            return verdict;
        }

        if let Some(target) = unstable_condition_operand(candidate) {
            return Verdict::unknown(format!(
                "assignment to condition operand `{target}` defeats case-splitting"
            ));
        }

        for fragment in [&candidate.original, &candidate.rewritten] {
            if let Err(fault) = check_initializer_scopes(fragment, &candidate.visible_idents) {
                return Verdict::from_fault(&fault);
            }
        }

        if let Err(fault) = check_pattern_precondition(candidate.pattern, &candidate.original) {
            return Verdict::from_fault(&fault);
        }

        let checker = EquivalenceChecker::from_config(&self.config);
        match checker.check(&candidate.original, &candidate.rewritten, candidate.in_loop) {
            CheckOutcome::Equivalent => Verdict::Verified,
            CheckOutcome::Fault(fault) => Verdict::from_fault(&fault),
            CheckOutcome::Mismatch { assignment, detail } => Verdict::unknown(format!(
                "rewrite changes behavior under {assignment}: {detail}"
            )),
        }
    }

    /// Structural admissibility of both fragments
    fn admissibility(&self, candidate: &RewriteCandidate) -> Option<Verdict> {
        for fragment in [&candidate.original, &candidate.rewritten] {
            if fragment.contains_unsupported() {
                return Some(Verdict::from_fault(&AnalysisFault::UnsupportedConstruct(
                    "fragment contains an unmodeled statement".to_string(),
                )));
            }
            if fragment.contains_loop() {
                return Some(Verdict::from_fault(&AnalysisFault::UnsupportedConstruct(
                    "fragment contains a loop".to_string(),
                )));
            }
            if fragment.contains_loop_exit() && !candidate.in_loop {
                return Some(Verdict::from_fault(&AnalysisFault::MalformedControlTransfer));
            }
        }
        None
    }
}

/// First assignment target that also feeds a case-split condition
fn unstable_condition_operand(candidate: &RewriteCandidate) -> Option<String> {
    let mut cond_vars = Vec::new();
    collect_condition_vars(&candidate.original, &mut cond_vars);
    collect_condition_vars(&candidate.rewritten, &mut cond_vars);

    let mut targets = Vec::new();
    collect_non_init_assign_targets(&candidate.original, &mut targets);
    collect_non_init_assign_targets(&candidate.rewritten, &mut targets);

    // Initializer-bound names are condition operands by design; they are
    // exempt because the binding precedes its condition on both sides.
    let mut init_names = Vec::new();
    collect_init_names(&candidate.original, &mut init_names);
    collect_init_names(&candidate.rewritten, &mut init_names);

    targets
        .into_iter()
        .find(|t| cond_vars.contains(t) && !init_names.contains(t))
}

fn collect_init_names(stmt: &Statement, out: &mut Vec<String>) {
    use crate::shared::models::StmtKind;
    stmt.walk(&mut |s| {
        if let StmtKind::If {
            init: Some(init), ..
        } = &s.kind
        {
            if let StmtKind::Assign { target, .. } = &init.kind {
                if !out.contains(target) {
                    out.push(target.clone());
                }
            }
        }
    });
}
