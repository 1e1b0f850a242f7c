use crate::agents::update::interaction::PushConfirmation;
use crate::agents::version_control::{UPDATE_BRANCH_PREFIX, VersionControl};
use crate::error::{HamError, Result};
use colored::Colorize;

/// Where a run stands with respect to its update branch.
///
/// ```text
/// Init -> OnBaseBranch -> BranchCreated -> Committing* -> CleanDiscard
///                                                      -> AwaitingPushConfirm -> Pushed | Declined
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    Init,
    OnBaseBranch,
    BranchCreated,
    Committing { commits: usize },
    CleanDiscard,
    AwaitingPushConfirm,
    Pushed,
    Declined,
}

impl BranchState {
    fn commit_count(&self) -> Option<usize> {
        match self {
            BranchState::BranchCreated => Some(0),
            BranchState::Committing { commits } => Some(*commits),
            _ => None,
        }
    }
}

/// How the run's branch was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Discarded { branch: String },
    Pushed { branch: String, commits: Vec<String> },
    Declined { branch: String, commits: Vec<String> },
}

/// One update branch per run, one commit per updated addon.
pub struct UpdateSession<'a> {
    vcs: &'a mut dyn VersionControl,
    base_branch: String,
    remote: String,
    branch: String,
    state: BranchState,
}

impl<'a> UpdateSession<'a> {
    pub fn new(
        vcs: &'a mut dyn VersionControl,
        base_branch: impl Into<String>,
        remote: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            vcs,
            base_branch: base_branch.into(),
            remote: remote.into(),
            branch: branch.into(),
            state: BranchState::Init,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &BranchState {
        &self.state
    }

    /// Syncs the base branch, drops leftover update branches and creates a fresh one.
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(matches!(self.state, BranchState::Init), "start")?;

        self.vcs.checkout(&self.base_branch)?;
        self.vcs.pull()?;
        self.state = BranchState::OnBaseBranch;

        let leftovers = self.vcs.local_branches(UPDATE_BRANCH_PREFIX)?;
        if !leftovers.is_empty() {
            log_git_action(&format!("deleting local branches: {}", leftovers.join(", ")));
            self.vcs.delete_branches(&leftovers, true)?;
        }

        self.vcs.create_and_checkout(&self.branch)?;
        self.vcs.hard_reset()?;
        self.state = BranchState::BranchCreated;
        Ok(())
    }

    /// Stages the addon directory and commits it on the update branch.
    pub fn commit_addon(&mut self, addon_dir: &str, message: &str) -> Result<()> {
        let commits = self.commit_count("commit")?;

        self.vcs.stage(&[addon_dir])?;
        self.vcs.commit(message)?;
        self.state = BranchState::Committing {
            commits: commits + 1,
        };
        Ok(())
    }

    /// Discards an empty branch, or lists its commits and pushes on confirmation.
    pub fn finish(&mut self, confirm: &mut dyn PushConfirmation) -> Result<SessionOutcome> {
        let commits = self.commit_count("finish")?;
        let branch = self.branch.clone();

        if commits == 0 {
            log_git_action("no addons updated, cleaning up git");
            self.vcs.checkout(&self.base_branch)?;
            self.vcs.delete_branches(std::slice::from_ref(&branch), false)?;
            self.state = BranchState::CleanDiscard;
            return Ok(SessionOutcome::Discarded { branch });
        }

        let messages = self.vcs.log(&self.base_branch, &branch)?;
        self.state = BranchState::AwaitingPushConfirm;

        if confirm.confirm_push(&branch, &messages)? {
            self.vcs.push(&self.remote, &branch, true)?;
            log_git_action(&format!("pushed branch {branch}"));
            self.state = BranchState::Pushed;
            Ok(SessionOutcome::Pushed {
                branch,
                commits: messages,
            })
        } else {
            self.state = BranchState::Declined;
            Ok(SessionOutcome::Declined {
                branch,
                commits: messages,
            })
        }
    }

    fn commit_count(&self, action: &str) -> Result<usize> {
        self.state.commit_count().ok_or_else(|| {
            HamError::GitOperation(format!("cannot {action} while update branch is {:?}", self.state))
        })
    }

    fn expect_state(&self, ok: bool, action: &str) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(HamError::GitOperation(format!(
                "cannot {action} while update branch is {:?}",
                self.state
            )))
        }
    }
}

fn log_git_action(text: &str) {
    println!("{}", text.cyan());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{RecordingVcs, ScriptedConfirm};

    #[test]
    fn start_syncs_base_and_replaces_leftover_branches() {
        let mut vcs = RecordingVcs::with_branches(&["updates-2024-01-01", "updates-2024-02-01"]);
        let mut session = UpdateSession::new(&mut vcs, "master", "origin", "updates-2024-03-01");

        session.start().unwrap();
        assert_eq!(session.state(), &BranchState::BranchCreated);

        assert_eq!(
            vcs.calls,
            vec![
                "checkout master",
                "pull",
                "branches updates-",
                "delete -D updates-2024-01-01 updates-2024-02-01",
                "create updates-2024-03-01",
                "reset --hard",
            ]
        );
    }

    #[test]
    fn start_without_leftovers_skips_delete() {
        let mut vcs = RecordingVcs::default();
        let mut session = UpdateSession::new(&mut vcs, "main", "origin", "updates-2024-03-01");
        session.start().unwrap();
        assert!(!vcs.calls.iter().any(|c| c.starts_with("delete")));
    }

    #[test]
    fn empty_run_discards_branch_without_prompt() {
        let mut vcs = RecordingVcs::default();
        let mut confirm = ScriptedConfirm::answering(true);
        let outcome = {
            let mut session = UpdateSession::new(&mut vcs, "master", "origin", "updates-x");
            session.start().unwrap();
            let outcome = session.finish(&mut confirm).unwrap();
            assert_eq!(session.state(), &BranchState::CleanDiscard);
            outcome
        };

        assert_eq!(
            outcome,
            SessionOutcome::Discarded {
                branch: "updates-x".to_string()
            }
        );
        assert_eq!(confirm.prompts, 0);
        assert_eq!(
            &vcs.calls[vcs.calls.len() - 2..],
            &["checkout master", "delete -d updates-x"]
        );
        assert!(!vcs.calls.iter().any(|c| c.starts_with("push")));
    }

    #[test]
    fn each_addon_is_its_own_commit_and_confirmed_push() {
        let mut vcs = RecordingVcs::default();
        let mut confirm = ScriptedConfirm::answering(true);
        {
            let mut session = UpdateSession::new(&mut vcs, "master", "origin", "updates-x");
            session.start().unwrap();
            session.commit_addon("adguard", "Update base image to a:2").unwrap();
            session.commit_addon("nginx", "Update base image to nginx:1.25").unwrap();
            assert_eq!(session.state(), &BranchState::Committing { commits: 2 });

            let outcome = session.finish(&mut confirm).unwrap();
            assert!(matches!(outcome, SessionOutcome::Pushed { ref commits, .. } if commits.len() == 2));
            assert_eq!(session.state(), &BranchState::Pushed);
        }

        assert_eq!(confirm.prompts, 1);
        assert!(vcs.calls.contains(&"stage adguard".to_string()));
        assert!(vcs.calls.contains(&"commit Update base image to nginx:1.25".to_string()));
        assert_eq!(vcs.calls.last().unwrap(), "push -u origin updates-x");
    }

    #[test]
    fn declined_push_leaves_branch_local() {
        let mut vcs = RecordingVcs::default();
        let mut confirm = ScriptedConfirm::answering(false);
        {
            let mut session = UpdateSession::new(&mut vcs, "master", "origin", "updates-x");
            session.start().unwrap();
            session.commit_addon("nginx", "Update base image to nginx:1.25").unwrap();
            let outcome = session.finish(&mut confirm).unwrap();
            assert!(matches!(outcome, SessionOutcome::Declined { .. }));
            assert_eq!(session.state(), &BranchState::Declined);
        }

        assert!(!vcs.calls.iter().any(|c| c.starts_with("push") || c.starts_with("delete")));
    }

    #[test]
    fn commit_before_start_is_rejected() {
        let mut vcs = RecordingVcs::default();
        let mut session = UpdateSession::new(&mut vcs, "master", "origin", "updates-x");
        let err = session.commit_addon("nginx", "msg").unwrap_err();
        assert!(matches!(err, HamError::GitOperation(_)));
    }

    #[test]
    fn git_failure_surfaces_and_stops_the_session() {
        let mut vcs = RecordingVcs::failing_on("pull");
        let mut session = UpdateSession::new(&mut vcs, "master", "origin", "updates-x");
        assert!(session.start().is_err());
        assert_eq!(session.state(), &BranchState::Init);
    }
}
