//! # Court Session
//!
//! One live court: the store, the rules, the resolution guard and the events
//! waiting to be shown.
//!
//! A finished game is resolved in named phases instead of timers:
//!
//! ```text
//! request_resolution ──► Recorded ──advance──► Celebrated ──advance──► Rotated
//!   (history, titles)        (winner shown)        (next match, guard released)
//! ```
//!
//! Once started a resolution always runs to `Rotated`; there is no cancel.
//! Requests arriving in between are dropped, not queued.

mod events;
mod guard;


pub use events::CourtEvent;
pub use guard::ResolutionGuard;

use crate::clock::{self, TickOutcome};
use crate::config::{RulesConfig, DEFENSE_RECLAIM_STREAK};
use crate::error::{CourtError, Result};
use crate::history::{merge_import, HistoryExport, ImportMode};
use crate::model::{
    normalize_entrant, ChallengerQueue, CourtMatch, GameSnapshot, Side, SnapshotPatch, TeamWins,
};
use crate::resolver::{self, Decision, OutcomeKind, Resolution};
use crate::rotation;
use crate::store::{
    DocumentStore, GameStore, StoreDocument, SystemWallClock, WallClock, DEFAULT_SESSION_ID,
};
use chrono::{TimeZone, Utc};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStatus {
    /// Another resolution was running; nothing happened
    Dropped,
    /// Tie: overtime clock set, nothing recorded
    Overtime,
    /// Game decided and recorded; the rotation is pending
    Started(OutcomeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
    /// History and title changes are in the store
    Recorded,
    /// Winner has been announced
    Celebrated,
    /// Next match formed and the guard released
    Rotated,
}

struct PendingResolution {
    decision: Decision,
    celebrated: bool,
}

pub struct CourtSession {
    store: GameStore,
    rules: RulesConfig,
    guard: ResolutionGuard,
    pending: Option<PendingResolution>,
    events: Vec<CourtEvent>,
}

impl CourtSession {
    /// In-memory session on the system clock
    pub fn new(rules: RulesConfig) -> Result<Self> {
        Self::with_clock(rules, Arc::new(SystemWallClock))
    }

    /// In-memory session with a caller-supplied clock
    pub fn with_clock(rules: RulesConfig, wall: Arc<dyn WallClock>) -> Result<Self> {
        let store =
            GameStore::detached(DEFAULT_SESSION_ID, GameSnapshot::empty(rules.regulation_secs), wall);
        Self::with_store(store, rules)
    }

    /// Session replicated through `backend` under `session_id`
    pub fn open(
        session_id: &str,
        rules: RulesConfig,
        wall: Arc<dyn WallClock>,
        backend: Arc<dyn DocumentStore>,
    ) -> Result<Self> {
        rules.validate()?;
        let initial = GameSnapshot::empty(rules.regulation_secs);
        let store = GameStore::open(session_id, initial, wall, backend)?;
        Self::with_store(store, rules)
    }

    /// Session over an existing store; `rules` must validate
    pub fn with_store(store: GameStore, rules: RulesConfig) -> Result<Self> {
        rules.validate()?;
        Ok(Self { store, rules, guard: ResolutionGuard::new(), pending: None, events: Vec::new() })
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        self.store.read()
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn is_resolving(&self) -> bool {
        self.guard.is_held()
    }

    /// Number of resolutions that ran to completion
    pub fn completed_resolutions(&self) -> u64 {
        self.guard.releases()
    }

    pub fn pending_phase(&self) -> Option<ResolutionPhase> {
        self.pending.as_ref().map(|p| {
            if p.celebrated {
                ResolutionPhase::Celebrated
            } else {
                ResolutionPhase::Recorded
            }
        })
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<CourtEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.guard.is_held() {
            return Err(CourtError::ResolutionInFlight);
        }
        Ok(())
    }

    fn regulation(&self) -> u32 {
        self.rules.regulation_secs
    }

    // ========================
    // Queue Management
    // ========================

    /// Put a new team at the back of the line
    pub fn join_queue(&mut self, name: &str) -> Result<()> {
        let name = normalize_entrant(name)?;
        let snapshot = self.store.read();
        if snapshot.is_present(&name) {
            return Err(CourtError::DuplicateEntrant { name });
        }

        let mut queue = snapshot.queue.clone();
        queue.enqueue(name.clone())?;
        log::info!("{} joins the queue at position {}", name, queue.len());
        self.store.update(SnapshotPatch::new().with_queue(queue));
        Ok(())
    }

    pub fn leave_queue(&mut self, name: &str) -> Result<String> {
        let mut queue = self.store.read().queue.clone();
        let removed = queue
            .remove(name.trim())
            .ok_or_else(|| CourtError::NotFound(format!("'{}' is not queued", name.trim())))?;
        self.store.update(SnapshotPatch::new().with_queue(queue));
        Ok(removed)
    }

    pub fn remove_queue_at(&mut self, index: usize) -> Result<String> {
        let mut queue = self.store.read().queue.clone();
        let removed = queue
            .remove_at(index)
            .ok_or_else(|| CourtError::NotFound(format!("no queue entry at position {}", index)))?;
        self.store.update(SnapshotPatch::new().with_queue(queue));
        Ok(removed)
    }

    // ========================
    // Match Entry
    // ========================

    /// Name both teams of an open court by hand
    pub fn set_teams(&mut self, team_a: &str, team_b: &str) -> Result<()> {
        self.ensure_idle()?;
        let team_a = normalize_entrant(team_a)?;
        let team_b = normalize_entrant(team_b)?;
        if team_a == team_b {
            return Err(CourtError::InvalidEntrant(format!("'{}' cannot play itself", team_a)));
        }

        let snapshot = self.store.read();
        if snapshot.current_match.is_active() {
            return Err(CourtError::MatchNotReady("the court is already occupied".to_string()));
        }
        for name in [&team_a, &team_b] {
            if snapshot.queue.contains(name) {
                return Err(CourtError::DuplicateEntrant { name: name.clone() });
            }
        }

        let mut patch =
            SnapshotPatch::new().with_match(CourtMatch::pairing(&team_a, &team_b, self.regulation()));
        if let Some(champion) = &snapshot.champion {
            if *champion == team_a || *champion == team_b {
                self.events.push(CourtEvent::ChampionRecalled { champion: champion.clone() });
                patch = patch.with_champion(None);
            }
        }

        self.store.update(patch);
        self.events.push(CourtEvent::MatchFormed { team_a, team_b });
        Ok(())
    }

    /// Fill the empty side(s) of an open court from the front of the queue
    pub fn seat_challenger(&mut self) -> Result<Vec<String>> {
        self.ensure_idle()?;
        let snapshot = self.store.read();
        if snapshot.current_match.is_active() {
            return Err(CourtError::MatchNotReady("the court is already occupied".to_string()));
        }
        if snapshot.queue.is_empty() {
            return Err(CourtError::NotFound("nobody is waiting".to_string()));
        }

        let mut queue = snapshot.queue.clone();
        let mut current = snapshot.current_match.clone();
        let mut seated = Vec::new();
        while let Some(side) = current.vacant_side() {
            let Some(name) = queue.pop_front() else { break };
            current.set_team(side, &name);
            seated.push(name);
        }
        current.score_a = 0;
        current.score_b = 0;
        current.playing = false;
        current.time_left = self.regulation();

        let mut patch = SnapshotPatch::new().with_queue(queue);
        if current.is_active() {
            if let Some(champion) = &snapshot.champion {
                if current.involves(champion) {
                    log::info!("Champion {} takes on challenger {}", champion, seated.join(", "));
                    self.events.push(CourtEvent::ChampionRecalled { champion: champion.clone() });
                    patch = patch.with_champion(None);
                }
            }
            self.events.push(CourtEvent::MatchFormed {
                team_a: current.team_a.clone(),
                team_b: current.team_b.clone(),
            });
        }

        self.store.update(patch.with_match(current));
        Ok(seated)
    }

    /// Start a fresh rotation with the first two in line, forgetting titles and win tracking
    pub fn start_rotation(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let snapshot = self.store.read();
        if snapshot.current_match.playing {
            return Err(CourtError::MatchNotReady("stop the current match first".to_string()));
        }

        let mut queue = snapshot.queue.clone();
        if queue.len() < 2 {
            return Err(CourtError::MatchNotReady(format!(
                "need two waiting teams, {} queued",
                queue.len()
            )));
        }
        let (Some(team_a), Some(team_b)) = (queue.pop_front(), queue.pop_front()) else {
            return Err(CourtError::MatchNotReady("need two waiting teams".to_string()));
        };

        log::info!("New rotation: {} vs {}", team_a, team_b);
        self.store.update(
            SnapshotPatch::new()
                .with_match(CourtMatch::pairing(&team_a, &team_b, self.regulation()))
                .with_queue(queue)
                .with_champion(None)
                .with_defense_streak(0)
                .with_former_champion(None)
                .with_team_wins(TeamWins::new()),
        );
        self.events.push(CourtEvent::MatchFormed { team_a, team_b });
        Ok(())
    }

    // ========================
    // Clock
    // ========================

    pub fn start(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let mut current = self.store.read().current_match.clone();
        if !current.is_active() {
            return Err(CourtError::MatchNotReady("both teams must be named".to_string()));
        }
        if current.time_left == 0 {
            return Err(CourtError::MatchNotReady("the clock has run out".to_string()));
        }
        if current.playing {
            return Ok(());
        }

        current.playing = true;
        self.store.update(SnapshotPatch::new().with_match(current));
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let mut current = self.store.read().current_match.clone();
        if !current.playing {
            return Ok(());
        }
        current.playing = false;
        self.store.update(SnapshotPatch::new().with_match(current));
        Ok(())
    }

    /// One second of game time. At the buzzer the match stops and is resolved.
    pub fn tick(&mut self) -> Result<Option<ResolveStatus>> {
        if self.guard.is_held() {
            return Ok(None);
        }

        let mut current = self.store.read().current_match.clone();
        match clock::tick(&mut current) {
            TickOutcome::Idle => Ok(None),
            TickOutcome::Running { .. } => {
                self.store.update(SnapshotPatch::new().with_match(current));
                Ok(None)
            }
            TickOutcome::Expired => {
                self.store.update(SnapshotPatch::new().with_match(current));
                self.events.push(CourtEvent::Buzzer);
                self.request_resolution().map(Some)
            }
        }
    }

    /// Back to regulation time at 0-0, stopped
    pub fn reset_timer(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let mut current = self.store.read().current_match.clone();
        current.time_left = self.regulation();
        current.playing = false;
        current.score_a = 0;
        current.score_b = 0;
        self.store.update(SnapshotPatch::new().with_match(current));
        Ok(())
    }

    /// Set the clock to the overtime period, keeping the score
    pub fn extend_overtime(&mut self) -> Result<()> {
        self.ensure_idle()?;
        let mut current = self.store.read().current_match.clone();
        current.time_left = self.rules.overtime_secs;
        current.playing = false;
        self.store.update(SnapshotPatch::new().with_match(current));
        self.events.push(CourtEvent::Overtime { time_left: self.rules.overtime_secs });
        Ok(())
    }

    // ========================
    // Scoring
    // ========================

    /// Change a team's score (negative to correct). Reaching the instant-win
    /// score stops the match and resolves it.
    pub fn add_points(&mut self, side: Side, delta: i32) -> Result<Option<ResolveStatus>> {
        self.ensure_idle()?;
        let mut current = self.store.read().current_match.clone();
        if !current.is_active() {
            return Err(CourtError::MatchNotReady("both teams must be named".to_string()));
        }

        let score = (i64::from(current.score(side)) + i64::from(delta)).max(0);
        current.set_score(side, u32::try_from(score).unwrap_or(u32::MAX));

        if !self.rules.is_instant_win(current.score(side)) {
            self.store.update(SnapshotPatch::new().with_match(current));
            return Ok(None);
        }

        log::info!(
            "{} reaches {} points, instant win",
            current.team(side),
            current.score(side)
        );
        current.playing = false;
        self.store.update(SnapshotPatch::new().with_match(current));
        self.request_resolution().map(Some)
    }

    // ========================
    // Resolution
    // ========================

    /// Decide the stopped match. Ties extend into overtime; a request made
    /// while another resolution runs is dropped.
    pub fn request_resolution(&mut self) -> Result<ResolveStatus> {
        if self.guard.is_held() {
            log::warn!("Already resolving a match, dropping duplicate request");
            self.events.push(CourtEvent::ResolutionDropped);
            return Ok(ResolveStatus::Dropped);
        }

        let now = self.store.now_millis();
        let resolution = resolver::resolve(self.store.read(), &self.rules, now)?;
        self.guard.try_acquire();

        match resolution {
            Resolution::Overtime { patch } => {
                self.store.update(patch);
                self.events.push(CourtEvent::Overtime { time_left: self.rules.overtime_secs });
                self.guard.release();
                Ok(ResolveStatus::Overtime)
            }
            Resolution::Decided(decision) => {
                let kind = decision.kind;
                self.store.update(decision.patch.clone());

                if decision.defense_failed {
                    self.events.push(CourtEvent::DefenseFailed {
                        former_champion: decision.loser.clone(),
                    });
                }
                if kind.crowns_champion() {
                    self.events.push(CourtEvent::ChampionCrowned {
                        champion: decision.winner.clone(),
                        reclaimed: kind == OutcomeKind::Reclaimed,
                    });
                }

                self.pending = Some(PendingResolution { decision, celebrated: false });
                Ok(ResolveStatus::Started(kind))
            }
        }
    }

    /// Run the next phase of the pending resolution, if any
    pub fn advance(&mut self) -> Option<ResolutionPhase> {
        let pending = self.pending.as_mut()?;

        if !pending.celebrated {
            let decision = &pending.decision;
            self.events.push(CourtEvent::Celebration {
                winner: decision.winner.clone(),
                champion: decision.kind.crowns_champion(),
                message: celebration_message(decision.kind),
            });
            pending.celebrated = true;
            return Some(ResolutionPhase::Celebrated);
        }

        let pending = self.pending.take()?;
        let rotation = rotation::rotate(self.store.read(), &pending.decision.rotation, &self.rules);
        log::debug!("Rotation '{}' applied", pending.decision.rotation.name());

        if let Some(champion) = &rotation.recalled {
            self.events.push(CourtEvent::ChampionRecalled { champion: champion.clone() });
        }
        self.events.push(CourtEvent::MatchFormed {
            team_a: rotation.next_match.team_a.clone(),
            team_b: rotation.next_match.team_b.clone(),
        });
        self.store.update(rotation.patch);
        self.guard.release();
        Some(ResolutionPhase::Rotated)
    }

    /// Drive the pending resolution to completion
    pub fn run_pending(&mut self) {
        while self.advance().is_some() {}
    }

    // ========================
    // Admin
    // ========================

    /// Replace the rules; refused while a decided game is still rotating
    pub fn set_rules(&mut self, rules: RulesConfig) -> Result<()> {
        self.ensure_idle()?;
        rules.validate()?;
        log::info!("Rules updated: {:?}", rules);
        self.rules = rules;
        Ok(())
    }

    /// Change the regulation length and put the current clock on it
    pub fn set_regulation_time(&mut self, secs: u32) -> Result<()> {
        self.ensure_idle()?;
        let rules = RulesConfig { regulation_secs: secs, ..self.rules.clone() };
        rules.validate()?;
        self.rules = rules;

        let mut current = self.store.read().current_match.clone();
        current.time_left = secs;
        self.store.update(SnapshotPatch::new().with_match(current));
        Ok(())
    }

    /// Clear the court, queue, titles and history
    pub fn reset_all(&mut self) -> Result<()> {
        self.ensure_idle()?;
        log::warn!("Resetting session '{}'", self.store.session_id());
        self.store.update(
            SnapshotPatch::new()
                .with_match(CourtMatch::empty(self.regulation()))
                .with_queue(ChallengerQueue::new())
                .with_champion(None)
                .with_defense_streak(0)
                .with_former_champion(None)
                .with_team_wins(TeamWins::new())
                .with_history(Vec::new()),
        );
        Ok(())
    }

    // ========================
    // History
    // ========================

    pub fn export_history(&self) -> HistoryExport {
        let at = Utc.timestamp_millis_opt(self.store.now_millis()).single().unwrap_or_else(Utc::now);
        HistoryExport::new(&self.store.read().history, at)
    }

    /// Import an exported history; nothing changes unless every record is valid
    pub fn import_history(&mut self, json: &str, mode: ImportMode) -> Result<usize> {
        let export = HistoryExport::parse(json).inspect_err(|e| {
            log::warn!("History import rejected: {}", e);
        })?;

        let count = export.game_history.len();
        let history = merge_import(&self.store.read().history, export.game_history, mode);
        self.store.update(SnapshotPatch::new().with_history(history));
        log::info!("Imported {} history record(s) ({:?})", count, mode);
        Ok(count)
    }

    // ========================
    // Sync
    // ========================

    /// Adopt a document pushed by the backend if it is newer than our last write.
    ///
    /// Documents arriving while a resolution is in flight are skipped: the
    /// rotation was decided against the current snapshot and its own write
    /// republishes the full state once it lands.
    pub fn reconcile(&mut self, document: StoreDocument) -> bool {
        if self.guard.is_held() {
            log::debug!(
                "Resolution in flight, skipping document for '{}' from {}",
                self.store.session_id(),
                document.last_updated
            );
            return false;
        }
        self.store.reconcile(document)
    }

    /// Reconcile everything waiting on a subscription; returns how many were adopted
    pub fn sync_from(&mut self, updates: &Receiver<StoreDocument>) -> usize {
        updates.try_iter().filter(|document| self.reconcile(document.clone())).count()
    }
}

fn celebration_message(kind: OutcomeKind) -> Option<String> {
    match kind {
        OutcomeKind::Reclaimed => {
            Some(format!("Champion again! ({} straight wins)", DEFENSE_RECLAIM_STREAK))
        }
        OutcomeKind::DefenseProgress { streak } => {
            Some(format!("Title defense {}/{}", streak, DEFENSE_RECLAIM_STREAK))
        }
        OutcomeKind::NewChampion | OutcomeKind::Win => None,
    }
}
