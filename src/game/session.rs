use rand::Rng;

use super::SCORE_PER_MATCH;
use super::board::{Board, GridSize};
use super::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Hidden,
    /// Face up, waiting for the round to be judged.
    Revealed,
    Matched,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    OneRevealed,
    /// Two cards are face up and a resolve is pending.
    Resolving,
    Won,
    Expired,
}

impl Phase {
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::Won | Phase::Expired)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    OutOfRange,
    NotHidden,
    Resolving,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    Ignored(IgnoreReason),
    First,
    /// The second card of the round; `resolve` must follow after the delay.
    Second,
}

/// What the presentation layer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub phase: Phase,
    pub score: u32,
    pub high_score: u32,
    pub remaining_time: u32,
    pub time_limit: u32,
    pub matched_pairs: usize,
    pub total_pairs: usize,
    pub grid_side: usize,
    pub cells: Vec<CellState>,
    /// Symbol per cell, `None` while the cell is face down.
    pub faces: Vec<Option<String>>,
}

/// One playthrough: the dealt board and everything that changes while playing it.
#[derive(Clone, Debug)]
pub struct Session {
    theme: Theme,
    size: GridSize,
    time_limit: u32,
    player_name: String,
    high_score: u32,
    board: Board,
    cells: Vec<CellState>,
    pending: Vec<usize>,
    phase: Phase,
    score: u32,
    matched_pairs: usize,
    remaining_time: u32,
    generation: u64,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(
        theme: Theme,
        size: GridSize,
        time_limit: u32,
        player_name: impl Into<String>,
        high_score: u32,
        rng: &mut R,
    ) -> Self {
        let board = Board::generate(&theme, size, rng);
        Self::with_board(theme, board, time_limit, player_name, high_score)
    }

    /// Starts a session on an already dealt board.
    pub fn with_board(
        theme: Theme,
        board: Board,
        time_limit: u32,
        player_name: impl Into<String>,
        high_score: u32,
    ) -> Self {
        let size = board.size();
        Session {
            theme,
            size,
            time_limit,
            player_name: player_name.into(),
            high_score,
            cells: vec![CellState::Hidden; board.len()],
            board,
            pending: Vec::with_capacity(2),
            phase: Phase::Idle,
            score: 0,
            matched_pairs: 0,
            remaining_time: time_limit,
            generation: 0,
        }
    }

    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        if self.phase.is_finished() {
            return RevealOutcome::Ignored(IgnoreReason::Finished);
        }
        if self.phase == Phase::Resolving {
            return RevealOutcome::Ignored(IgnoreReason::Resolving);
        }
        match self.cells.get(index) {
            None => return RevealOutcome::Ignored(IgnoreReason::OutOfRange),
            Some(CellState::Hidden) => {}
            Some(_) => return RevealOutcome::Ignored(IgnoreReason::NotHidden),
        }

        self.cells[index] = CellState::Revealed;
        self.pending.push(index);
        if self.pending.len() == 1 {
            self.phase = Phase::OneRevealed;
            RevealOutcome::First
        } else {
            self.phase = Phase::Resolving;
            RevealOutcome::Second
        }
    }

    /// Judges the two face-up cards. Returns whether they matched, or `None`
    /// when nothing was waiting.
    pub fn resolve(&mut self) -> Option<bool> {
        if self.phase != Phase::Resolving {
            return None;
        }
        let (first, second) = (self.pending[0], self.pending[1]);
        self.pending.clear();

        let matched = self.board.symbol(first) == self.board.symbol(second);
        let next = if matched {
            CellState::Matched
        } else {
            CellState::Hidden
        };
        self.cells[first] = next;
        self.cells[second] = next;
        if matched {
            self.score += SCORE_PER_MATCH;
            self.matched_pairs += 1;
        }

        self.phase = if self.matched_pairs == self.total_pairs() {
            Phase::Won
        } else {
            Phase::Idle
        };
        Some(matched)
    }

    /// One second of countdown. Returns the phase afterwards.
    pub fn tick(&mut self) -> Phase {
        if self.phase.is_finished() {
            return self.phase;
        }
        self.remaining_time = self.remaining_time.saturating_sub(1);
        if self.remaining_time == 0 {
            self.phase = Phase::Expired;
        }
        self.phase
    }

    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.board = Board::generate(&self.theme, self.size, rng);
        self.cells = vec![CellState::Hidden; self.board.len()];
        self.pending.clear();
        self.phase = Phase::Idle;
        self.score = 0;
        self.matched_pairs = 0;
        self.remaining_time = self.time_limit;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let faces = self
            .cells
            .iter()
            .enumerate()
            .map(|(idx, state)| match state {
                CellState::Hidden => None,
                _ => self.board.symbol(idx).map(str::to_string),
            })
            .collect();
        SessionSnapshot {
            generation: self.generation,
            phase: self.phase,
            score: self.score,
            high_score: self.high_score,
            remaining_time: self.remaining_time,
            time_limit: self.time_limit,
            matched_pairs: self.matched_pairs,
            total_pairs: self.total_pairs(),
            grid_side: self.size.side(),
            cells: self.cells.clone(),
            faces,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.size.total_pairs()
    }

    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, index: usize) -> Option<CellState> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn ab_session(time_limit: u32) -> (Session, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let theme = Theme::new("AB", ["A", "B"]).unwrap();
        let size = GridSize::new(2).unwrap();
        let session = Session::new(theme, size, time_limit, "ada", 30, &mut rng);
        (session, rng)
    }

    fn indices_of(session: &Session, symbol: &str) -> Vec<usize> {
        (0..session.board().len())
            .filter(|&i| session.board().symbol(i) == Some(symbol))
            .collect()
    }

    fn pairs(session: &Session) -> Vec<(usize, usize)> {
        let mut used = vec![false; session.board().len()];
        let mut out = Vec::new();
        for i in 0..used.len() {
            if used[i] {
                continue;
            }
            if let Some(j) = ((i + 1)..used.len())
                .find(|&j| !used[j] && session.board().symbol(i) == session.board().symbol(j))
            {
                used[i] = true;
                used[j] = true;
                out.push((i, j));
            }
        }
        out
    }

    fn revealed_count(session: &Session) -> usize {
        session
            .cells()
            .iter()
            .filter(|c| **c == CellState::Revealed)
            .count()
    }

    #[test]
    fn two_by_two_game_is_won_after_two_matches() {
        let (mut session, _) = ab_session(60);
        let a = indices_of(&session, "A");
        let b = indices_of(&session, "B");
        assert_eq!((a.len(), b.len()), (2, 2));

        assert_eq!(session.reveal(a[0]), RevealOutcome::First);
        assert_eq!(session.phase(), Phase::OneRevealed);
        assert_eq!(session.reveal(a[1]), RevealOutcome::Second);
        assert_eq!(session.phase(), Phase::Resolving);
        assert_eq!(session.resolve(), Some(true));
        assert_eq!((session.matched_pairs(), session.score()), (1, 10));
        assert_eq!(session.phase(), Phase::Idle);

        session.reveal(b[0]);
        session.reveal(b[1]);
        assert_eq!(session.resolve(), Some(true));
        assert_eq!((session.matched_pairs(), session.score()), (2, 20));
        assert_eq!(session.phase(), Phase::Won);
        assert!(session.cells().iter().all(|c| *c == CellState::Matched));
    }

    #[test]
    fn mismatch_turns_both_cards_back() {
        let (mut session, _) = ab_session(60);
        let a = indices_of(&session, "A");
        let b = indices_of(&session, "B");
        session.reveal(a[0]);
        session.reveal(b[0]);
        assert_eq!(session.resolve(), Some(false));
        assert_eq!(session.cell(a[0]), Some(CellState::Hidden));
        assert_eq!(session.cell(b[0]), Some(CellState::Hidden));
        assert_eq!(session.score(), 0);
        assert_eq!(revealed_count(&session), 0);
    }

    #[test]
    fn reveal_while_resolving_changes_nothing() {
        let (mut session, _) = ab_session(60);
        let a = indices_of(&session, "A");
        let b = indices_of(&session, "B");
        session.reveal(a[0]);
        session.reveal(b[0]);
        let before = session.cells().to_vec();

        assert_eq!(session.reveal(a[1]), RevealOutcome::Ignored(IgnoreReason::Resolving));
        assert_eq!(session.reveal(b[1]), RevealOutcome::Ignored(IgnoreReason::Resolving));
        assert_eq!(session.cells(), before.as_slice());
        assert_eq!(revealed_count(&session), 2);
    }

    #[test]
    fn invalid_reveals_are_ignored() {
        let (mut session, _) = ab_session(60);
        assert_eq!(session.reveal(4), RevealOutcome::Ignored(IgnoreReason::OutOfRange));
        session.reveal(0);
        assert_eq!(session.reveal(0), RevealOutcome::Ignored(IgnoreReason::NotHidden));
        assert_eq!(session.phase(), Phase::OneRevealed);
    }

    #[test]
    fn resolve_without_two_cards_is_a_no_op() {
        let (mut session, _) = ab_session(60);
        assert_eq!(session.resolve(), None);
        session.reveal(0);
        assert_eq!(session.resolve(), None);
        assert_eq!(session.cell(0), Some(CellState::Revealed));
    }

    #[test]
    fn single_tick_expires_one_second_game() {
        let (mut session, _) = ab_session(1);
        let a = indices_of(&session, "A");
        session.reveal(a[0]);
        session.reveal(a[1]);
        session.resolve();

        assert_eq!(session.tick(), Phase::Expired);
        assert_eq!(session.remaining_time(), 0);
        assert_eq!(
            session.reveal(indices_of(&session, "B")[0]),
            RevealOutcome::Ignored(IgnoreReason::Finished)
        );
        assert_eq!(session.tick(), Phase::Expired);
        assert_eq!(session.remaining_time(), 0);
    }

    #[test]
    fn expiry_wins_over_a_pending_resolve() {
        let (mut session, _) = ab_session(1);
        let a = indices_of(&session, "A");
        session.reveal(a[0]);
        session.reveal(a[1]);
        session.tick();
        assert_eq!(session.resolve(), None);
        assert_eq!(session.matched_pairs(), 0);
    }

    #[test]
    fn restart_resets_progress_and_deals_again() {
        let mut rng = StdRng::seed_from_u64(9);
        let theme = Theme::new("Classic", ["A", "B", "C", "D", "E", "F", "G", "H"]).unwrap();
        let mut session = Session::new(theme, GridSize::new(4).unwrap(), 90, "ada", 50, &mut rng);

        for (i, j) in pairs(&session).into_iter().take(2) {
            session.reveal(i);
            session.reveal(j);
            assert_eq!(session.resolve(), Some(true));
        }
        session.tick();
        assert_eq!(session.score(), 20);
        let old_board = session.board().clone();
        let old_generation = session.generation();

        let mut reshuffled = false;
        for _ in 0..5 {
            session.restart(&mut rng);
            reshuffled |= *session.board() != old_board;
        }
        assert!(reshuffled);
        assert_eq!(session.score(), 0);
        assert_eq!(session.matched_pairs(), 0);
        assert_eq!(session.remaining_time(), 90);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.cells().iter().all(|c| *c == CellState::Hidden));
        assert!(session.generation() > old_generation);
        assert_eq!(session.player_name(), "ada");
        assert_eq!(session.high_score(), 50);
    }

    #[test]
    fn score_tracks_matches_through_random_play() {
        let mut rng = StdRng::seed_from_u64(1234);
        let theme = Theme::new("Classic", ["A", "B", "C", "D", "E", "F", "G", "H"]).unwrap();
        let mut session = Session::new(theme, GridSize::new(6).unwrap(), 500, "ada", 0, &mut rng);
        let mut last_matched = 0;
        for step in 0..2000 {
            let index = rng.random_range(0..36);
            if session.reveal(index) == RevealOutcome::Second {
                session.resolve();
                assert_eq!(revealed_count(&session), 0);
            }
            assert!(session.matched_pairs() >= last_matched);
            assert!(session.matched_pairs() <= session.total_pairs());
            assert_eq!(session.score(), SCORE_PER_MATCH * session.matched_pairs() as u32);
            assert!(revealed_count(&session) <= 2);
            last_matched = session.matched_pairs();
            if step % 10 == 0 {
                session.tick();
            }
            if session.phase().is_finished() {
                break;
            }
        }
    }

    #[test]
    fn snapshot_hides_face_down_symbols() {
        let (mut session, _) = ab_session(60);
        session.reveal(2);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.faces.iter().filter(|f| f.is_some()).count(), 1);
        assert_eq!(snapshot.faces[2].as_deref(), session.board().symbol(2));
        assert_eq!(snapshot.total_pairs, 2);
        assert_eq!(snapshot.grid_side, 2);
        assert_eq!(snapshot.high_score, 30);
    }
}
