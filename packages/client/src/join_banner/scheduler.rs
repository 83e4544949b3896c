//! Join banner state machine.
//!
//! The scheduler owns the pending queue, the displayed slot and three
//! deadlines (rotation, hide, cooldown). It never sleeps: callers feed it
//! submissions and the current time, and fire timers once their deadline
//! has passed (see [`JoinBannerScheduler::next_deadline`]).
//!
//! | state         | event                         | next state                  |
//! |---------------|-------------------------------|-----------------------------|
//! | `Idle`        | submit                        | `Rotating` (shown at once)  |
//! | `Rotating`    | rotation timer, queue pending | `Rotating`                  |
//! | `Rotating`    | rotation timer, queue empty   | `HoldingLast`               |
//! | `Rotating`    | burst ceiling reached         | `Cooldown`                  |
//! | `HoldingLast` | submit                        | `Rotating` (shown at once)  |
//! | `HoldingLast` | hide timer                    | `Idle`                      |
//! | `Cooldown`    | submit                        | `Cooldown` (queued only)    |
//! | `Cooldown`    | cooldown timer                | `Idle` or `Rotating`        |

use std::time::Duration;

use tokio::time::Instant;

use crate::domain::JoinEvent;

use super::queue::JoinQueue;

/// Maximum number of pending join notifications
pub const QUEUE_CAPACITY: usize = 10;
/// Dwell time of each displayed entry
pub const ROTATION_INTERVAL: Duration = Duration::from_millis(2000);
/// How long the last entry stays visible once the queue drained
pub const HIDE_DELAY: Duration = Duration::from_millis(3000);
/// Longest continuous rotation before the banner is forced into cooldown
pub const BURST_CEILING: Duration = Duration::from_millis(30000);
/// How long rotation stays suppressed after a burst
pub const COOLDOWN_DURATION: Duration = Duration::from_millis(15000);

/// Timing and capacity parameters of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerTimings {
    pub queue_capacity: usize,
    pub rotation_interval: Duration,
    pub hide_delay: Duration,
    pub burst_ceiling: Duration,
    pub cooldown: Duration,
}

impl Default for BannerTimings {
    fn default() -> Self {
        Self {
            queue_capacity: QUEUE_CAPACITY,
            rotation_interval: ROTATION_INTERVAL,
            hide_delay: HIDE_DELAY,
            burst_ceiling: BURST_CEILING,
            cooldown: COOLDOWN_DURATION,
        }
    }
}

/// Scheduler state; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing displayed, no timers, queue empty
    Idle,
    /// Cycling through queued entries
    Rotating,
    /// Queue drained, last entry still shown until the hide timer fires
    HoldingLast,
    /// Overload protection, nothing displayed until the cooldown timer fires
    Cooldown,
}

/// The scheduler's timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Rotation,
    Hide,
    Cooldown,
}

#[derive(Debug, Default, Clone, Copy)]
struct Timers {
    rotation: Option<Instant>,
    hide: Option<Instant>,
    cooldown: Option<Instant>,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<Instant> {
        match kind {
            TimerKind::Rotation => &mut self.rotation,
            TimerKind::Hide => &mut self.hide,
            TimerKind::Cooldown => &mut self.cooldown,
        }
    }

    fn get(&self, kind: TimerKind) -> Option<Instant> {
        match kind {
            TimerKind::Rotation => self.rotation,
            TimerKind::Hide => self.hide,
            TimerKind::Cooldown => self.cooldown,
        }
    }

    fn armed(&self) -> impl Iterator<Item = (TimerKind, Instant)> + '_ {
        [TimerKind::Rotation, TimerKind::Hide, TimerKind::Cooldown]
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|at| (kind, at)))
    }

    fn cancel_all(&mut self) {
        *self = Self::default();
    }
}

/// Single-consumer rotation scheduler for join notifications.
#[derive(Debug)]
pub struct JoinBannerScheduler {
    timings: BannerTimings,
    queue: JoinQueue,
    displayed: Option<JoinEvent>,
    state: SchedulerState,
    timers: Timers,
    /// Start of the current burst; `None` until the first display after Idle
    burst_started_at: Option<Instant>,
    disposed: bool,
}

impl Default for JoinBannerScheduler {
    fn default() -> Self {
        Self::new(BannerTimings::default())
    }
}

impl JoinBannerScheduler {
    pub fn new(timings: BannerTimings) -> Self {
        Self {
            timings,
            queue: JoinQueue::with_capacity(timings.queue_capacity),
            displayed: None,
            state: SchedulerState::Idle,
            timers: Timers::default(),
            burst_started_at: None,
            disposed: false,
        }
    }

    /// Queue a join notification and start rotating if the banner is idle.
    ///
    /// Never fails. While cooling down the entry is only queued.
    pub fn submit(&mut self, event: JoinEvent, now: Instant) {
        if self.disposed {
            tracing::debug!(user_id = %event.user_id, "Join banner disposed, dropping event");
            return;
        }

        if let Some(evicted) = self.queue.push(event) {
            tracing::debug!(user_id = %evicted.user_id, "Join queue full, evicted oldest entry");
        }

        match self.state {
            SchedulerState::Idle | SchedulerState::HoldingLast => {
                self.timers.hide = None;
                self.rotate(now);
            }
            SchedulerState::Rotating | SchedulerState::Cooldown => {}
        }
    }

    /// Entry that should currently be rendered
    pub fn current_display(&self) -> Option<&JoinEvent> {
        self.displayed.as_ref()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn queue(&self) -> &JoinQueue {
        &self.queue
    }

    pub fn timings(&self) -> &BannerTimings {
        &self.timings
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Deadline of a single timer, if armed
    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.timers.get(kind)
    }

    /// Earliest armed deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.armed().map(|(_, at)| at).min()
    }

    /// Fire every timer whose deadline is at or before `now`, earliest first.
    ///
    /// Timers armed by these firings are left for a later call. Returns the
    /// number of timers fired.
    pub fn fire_due(&mut self, now: Instant) -> usize {
        let mut due: Vec<(TimerKind, Instant)> =
            self.timers.armed().filter(|(_, at)| *at <= now).collect();
        due.sort_by_key(|(_, at)| *at);

        let mut fired = 0;
        for (kind, at) in due {
            // An earlier firing may have cancelled or re-armed this timer.
            if self.timers.get(kind) == Some(at) && self.fire(kind, now) {
                fired += 1;
            }
        }
        fired
    }

    /// Fire one timer. Returns `false` when it was not armed or the
    /// scheduler is disposed, in which case nothing changes.
    pub fn fire(&mut self, kind: TimerKind, now: Instant) -> bool {
        if self.disposed || self.timers.slot(kind).take().is_none() {
            return false;
        }

        match kind {
            TimerKind::Rotation => self.rotate(now),
            TimerKind::Hide => {
                tracing::debug!("Join banner hidden after hold");
                self.displayed = None;
                self.burst_started_at = None;
                self.state = SchedulerState::Idle;
            }
            TimerKind::Cooldown => {
                tracing::debug!(pending = self.queue.len(), "Join banner cooldown ended");
                self.state = SchedulerState::Idle;
                if !self.queue.is_empty() {
                    self.rotate(now);
                }
            }
        }
        true
    }

    /// Cancel every timer and drop all pending and displayed entries.
    ///
    /// Idempotent; timers fired afterwards are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.timers.cancel_all();
        self.queue.clear();
        self.displayed = None;
        self.burst_started_at = None;
        self.state = SchedulerState::Idle;
        self.disposed = true;
        tracing::debug!("Join banner disposed");
    }

    /// One rotation step: display the next entry, or hold the last one when
    /// the queue has drained.
    fn rotate(&mut self, now: Instant) {
        if self.state == SchedulerState::Cooldown {
            return;
        }

        if self.queue.is_empty() {
            self.timers.rotation = None;
            if self.displayed.is_some() {
                self.timers.hide = Some(now + self.timings.hide_delay);
                self.state = SchedulerState::HoldingLast;
            } else {
                self.state = SchedulerState::Idle;
            }
            return;
        }

        match self.burst_started_at {
            None => self.burst_started_at = Some(now),
            Some(started) if now.duration_since(started) >= self.timings.burst_ceiling => {
                self.enter_cooldown(now);
                return;
            }
            Some(_) => {}
        }

        if let Some(next) = self.queue.pop() {
            tracing::debug!(
                user_id = %next.user_id,
                pending = self.queue.len(),
                "Join banner showing next entry"
            );
            self.displayed = Some(next);
        }
        self.timers.hide = None;
        self.timers.rotation = Some(now + self.timings.rotation_interval);
        self.state = SchedulerState::Rotating;
    }

    fn enter_cooldown(&mut self, now: Instant) {
        tracing::warn!(
            dropped = self.queue.len(),
            cooldown_ms = self.timings.cooldown.as_millis() as u64,
            "Join banner burst ceiling reached, cooling down"
        );
        self.timers.rotation = None;
        self.timers.hide = None;
        self.queue.clear();
        self.displayed = None;
        self.burst_started_at = None;
        self.timers.cooldown = Some(now + self.timings.cooldown);
        self.state = SchedulerState::Cooldown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, UserId};

    fn event(name: &str) -> JoinEvent {
        JoinEvent {
            user_id: UserId::new(format!("id-{name}")).unwrap(),
            username: name.to_string(),
            joined_at: Timestamp::new(0),
        }
    }

    fn shown(scheduler: &JoinBannerScheduler) -> Option<&str> {
        scheduler.current_display().map(|e| e.username.as_str())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_queue_never_exceeds_capacity() {
        // テスト項目: submit を繰り返してもキューは容量 10 を超えない
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();

        // when (操作): 1 件目は即表示され、残り 11 件がキューに入る
        for n in 0..12 {
            scheduler.submit(event(&format!("u{n}")), t0);
            assert!(scheduler.queue().len() <= QUEUE_CAPACITY);
        }

        // then (期待する結果): 最も古い待機エントリ (u1) が追い出されている
        assert_eq!(scheduler.queue().len(), QUEUE_CAPACITY);
        assert!(!scheduler.queue().iter().any(|e| e.username == "u1"));
        assert_eq!(
            scheduler.queue().iter().last().map(|e| e.username.as_str()),
            Some("u11")
        );
    }

    #[test]
    fn test_first_submit_displays_immediately() {
        // テスト項目: Idle の状態で submit すると遅延なしで表示される
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();

        // when (操作):
        scheduler.submit(event("alice"), t0);

        // then (期待する結果):
        assert_eq!(shown(&scheduler), Some("alice"));
        assert_eq!(scheduler.state(), SchedulerState::Rotating);
        assert_eq!(scheduler.deadline(TimerKind::Rotation), Some(t0 + ROTATION_INTERVAL));
        assert!(scheduler.queue().is_empty());
    }

    #[test]
    fn test_rotation_is_fifo() {
        // テスト項目: A, B, C の順に submit すると同じ順で表示される
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();
        scheduler.submit(event("a"), t0);
        scheduler.submit(event("b"), t0);
        scheduler.submit(event("c"), t0);

        // when (操作):
        let mut sequence = vec![shown(&scheduler).map(str::to_string)];
        for step in 1..=2 {
            scheduler.fire_due(t0 + ms(2000 * step));
            sequence.push(shown(&scheduler).map(str::to_string));
        }

        // then (期待する結果):
        let expected: Vec<Option<String>> =
            ["a", "b", "c"].iter().map(|s| Some(s.to_string())).collect();
        assert_eq!(sequence, expected);
    }

    #[test]
    fn test_submit_while_rotating_waits_for_rotation_timer() {
        // テスト項目: ローテーション中の submit はタイマーを待ってから表示される
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();
        scheduler.submit(event("a"), t0);

        // when (操作):
        scheduler.submit(event("b"), t0 + ms(500));

        // then (期待する結果):
        assert_eq!(shown(&scheduler), Some("a"));
        assert_eq!(scheduler.fire_due(t0 + ms(1999)), 0);
        assert_eq!(shown(&scheduler), Some("a"));
        assert_eq!(scheduler.fire_due(t0 + ms(2000)), 1);
        assert_eq!(shown(&scheduler), Some("b"));
    }

    #[test]
    fn test_last_entry_is_held_for_hide_delay() {
        // テスト項目: キューが空になった後、最後のエントリは hide 遅延の間だけ表示され続ける
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();
        scheduler.submit(event("a"), t0);

        // when (操作): ローテーションタイマーがキューの空を検出する
        scheduler.fire_due(t0 + ROTATION_INTERVAL);
        let held_at = t0 + ROTATION_INTERVAL;

        // then (期待する結果):
        assert_eq!(scheduler.state(), SchedulerState::HoldingLast);
        assert_eq!(scheduler.deadline(TimerKind::Rotation), None);
        assert_eq!(scheduler.deadline(TimerKind::Hide), Some(held_at + HIDE_DELAY));

        scheduler.fire_due(held_at + HIDE_DELAY - ms(1));
        assert_eq!(shown(&scheduler), Some("a"));

        scheduler.fire_due(held_at + HIDE_DELAY);
        assert_eq!(shown(&scheduler), None);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_submit_during_hold_preempts_hide() {
        // テスト項目: 保持中の submit は hide タイマーを取り消し、即座に表示する
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();
        scheduler.submit(event("a"), t0);
        scheduler.fire_due(t0 + ms(2000));
        assert_eq!(scheduler.state(), SchedulerState::HoldingLast);

        // when (操作):
        let arrival = t0 + ms(3000);
        scheduler.submit(event("b"), arrival);

        // then (期待する結果):
        assert_eq!(shown(&scheduler), Some("b"));
        assert_eq!(scheduler.state(), SchedulerState::Rotating);
        assert_eq!(scheduler.deadline(TimerKind::Hide), None);
        assert_eq!(scheduler.deadline(TimerKind::Rotation), Some(arrival + ROTATION_INTERVAL));

        // 元の hide 期限を過ぎても表示は消えない
        scheduler.fire_due(t0 + ms(5000));
        assert_eq!(shown(&scheduler), Some("b"));
    }

    #[test]
    fn test_sustained_burst_enters_cooldown() {
        // テスト項目: 30 秒以上ローテーションが続くと cooldown に入り、待機中のエントリは破棄される
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();
        scheduler.submit(event("u0"), t0);

        // when (操作): ローテーションのたびに新しい参加者が来る
        let mut step = 1;
        while scheduler.state() != SchedulerState::Cooldown {
            let now = t0 + ms(2000 * step);
            scheduler.submit(event(&format!("u{step}")), now);
            scheduler.submit(event(&format!("v{step}")), now);
            scheduler.fire_due(now);
            step += 1;
            assert!(step <= 16, "cooldown was never entered");
        }

        // then (期待する結果): 30000 ms 時点で cooldown
        assert_eq!(step - 1, 15);
        assert_eq!(shown(&scheduler), None);
        assert!(scheduler.queue().is_empty());
        assert_eq!(scheduler.deadline(TimerKind::Rotation), None);
        assert_eq!(
            scheduler.deadline(TimerKind::Cooldown),
            Some(t0 + BURST_CEILING + COOLDOWN_DURATION)
        );
    }

    #[test]
    fn test_cooldown_suppresses_rotation_then_resumes_from_queue() {
        // テスト項目: cooldown 中の submit はキューに入るだけで、終了後にキューから再開する
        // given (前提条件):
        let timings = BannerTimings {
            burst_ceiling: ms(4000),
            ..BannerTimings::default()
        };
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::new(timings);
        scheduler.submit(event("a"), t0);
        scheduler.submit(event("b"), t0);
        scheduler.submit(event("c"), t0);
        scheduler.submit(event("d"), t0);
        scheduler.fire_due(t0 + ms(2000));
        scheduler.fire_due(t0 + ms(4000));
        assert_eq!(scheduler.state(), SchedulerState::Cooldown);
        let cooldown_end = t0 + ms(4000) + COOLDOWN_DURATION;

        // when (操作):
        scheduler.submit(event("x"), t0 + ms(5000));
        scheduler.submit(event("y"), t0 + ms(6000));

        // then (期待する結果):
        assert_eq!(shown(&scheduler), None);
        assert_eq!(scheduler.queue().len(), 2);
        assert_eq!(scheduler.next_deadline(), Some(cooldown_end));

        scheduler.fire_due(cooldown_end);
        assert_eq!(scheduler.state(), SchedulerState::Rotating);
        assert_eq!(shown(&scheduler), Some("x"));
        scheduler.fire_due(cooldown_end + ROTATION_INTERVAL);
        assert_eq!(shown(&scheduler), Some("y"));
    }

    #[test]
    fn test_cooldown_end_with_empty_queue_goes_idle() {
        // テスト項目: キューが空のまま cooldown が終わると Idle に戻る
        // given (前提条件):
        let timings = BannerTimings {
            burst_ceiling: ms(2000),
            ..BannerTimings::default()
        };
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::new(timings);
        scheduler.submit(event("a"), t0);
        scheduler.submit(event("b"), t0);
        scheduler.fire_due(t0 + ms(2000));
        assert_eq!(scheduler.state(), SchedulerState::Cooldown);

        // when (操作):
        scheduler.fire_due(t0 + ms(2000) + COOLDOWN_DURATION);

        // then (期待する結果):
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(shown(&scheduler), None);
        assert_eq!(scheduler.next_deadline(), None);

        // 次の submit は即表示される
        scheduler.submit(event("c"), t0 + ms(30000));
        assert_eq!(shown(&scheduler), Some("c"));
    }

    #[test]
    fn test_burst_window_survives_hold_but_resets_on_idle() {
        // テスト項目: バースト計測は HoldingLast では継続し、Idle で初期化される
        // given (前提条件):
        let timings = BannerTimings {
            burst_ceiling: ms(5000),
            ..BannerTimings::default()
        };
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::new(timings);
        scheduler.submit(event("a"), t0);
        scheduler.fire_due(t0 + ms(2000));
        assert_eq!(scheduler.state(), SchedulerState::HoldingLast);

        // when (操作): 保持中にバースト上限を超えて submit
        scheduler.submit(event("b"), t0 + ms(4999));
        scheduler.fire_due(t0 + ms(6999));
        scheduler.submit(event("c"), t0 + ms(7000));

        // then (期待する結果): b は表示されたが、保持中の c の到着で上限超過
        assert_eq!(scheduler.state(), SchedulerState::Cooldown);

        // Idle まで戻れば新しいバーストになる
        let mut fresh = JoinBannerScheduler::new(timings);
        fresh.submit(event("a"), t0);
        fresh.fire_due(t0 + ms(2000));
        fresh.fire_due(t0 + ms(5000));
        assert_eq!(fresh.state(), SchedulerState::Idle);
        fresh.submit(event("b"), t0 + ms(9000));
        assert_eq!(fresh.state(), SchedulerState::Rotating);
        assert_eq!(shown(&fresh), Some("b"));
    }

    #[test]
    fn test_dispose_is_idempotent_and_ignores_late_timers() {
        // テスト項目: dispose は冪等で、dispose 後のタイマー発火や submit は何も変えない
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();
        scheduler.submit(event("a"), t0);
        scheduler.submit(event("b"), t0);

        // when (操作):
        scheduler.dispose();
        scheduler.dispose();

        // then (期待する結果):
        assert!(scheduler.is_disposed());
        assert_eq!(shown(&scheduler), None);
        assert!(scheduler.queue().is_empty());
        assert_eq!(scheduler.next_deadline(), None);

        assert!(!scheduler.fire(TimerKind::Rotation, t0 + ms(2000)));
        assert!(!scheduler.fire(TimerKind::Hide, t0 + ms(5000)));
        assert_eq!(scheduler.fire_due(t0 + ms(60000)), 0);
        scheduler.submit(event("c"), t0 + ms(60000));
        assert_eq!(shown(&scheduler), None);
        assert!(scheduler.queue().is_empty());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_unarmed_timer_fire_is_noop() {
        // テスト項目: 設定されていないタイマーの発火は状態を変えない
        // given (前提条件):
        let t0 = Instant::now();
        let mut scheduler = JoinBannerScheduler::default();
        scheduler.submit(event("a"), t0);

        // when (操作):
        let fired = scheduler.fire(TimerKind::Hide, t0 + ms(100));

        // then (期待する結果):
        assert!(!fired);
        assert_eq!(shown(&scheduler), Some("a"));
        assert_eq!(scheduler.state(), SchedulerState::Rotating);
    }
}
