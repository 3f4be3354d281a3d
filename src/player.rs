// ABOUTME: Slideshow player for the slideforge application
// ABOUTME: Wrapping slide cursor with a deterministic auto-advance timer and key handling

use crate::errors::{ForgeError, Result};
use crate::model::{Presentation, Slide};
use crate::navigation::Key;
use log::debug;
use std::time::{Duration, Instant};

pub const DEFAULT_AUTO_ADVANCE_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

/// Which way the last move went, for enter/exit animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None,
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Continue,
    Exit,
}

/// Full-screen slideshow over a presentation.
///
/// Time is passed in explicitly, so the timer only fires when `poll` sees a
/// deadline that has passed.
pub struct Player {
    presentation: Presentation,
    cursor: usize,
    direction: Direction,
    state: PlayState,
    interval: Duration,
    deadline: Option<Instant>,
}

impl Player {
    /// Start playing from the first slide.
    pub fn new(presentation: Presentation, interval: Duration, now: Instant) -> Result<Self> {
        if presentation.is_empty() {
            return Err(ForgeError::NoPresentation);
        }
        Ok(Self {
            presentation,
            cursor: 0,
            direction: Direction::None,
            state: PlayState::Playing,
            interval,
            deadline: Some(now + interval),
        })
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn current_slide(&self) -> &Slide {
        &self.presentation.slides[self.cursor]
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.presentation.len()
    }

    fn step(&mut self, forward: bool) {
        let len = self.presentation.len();
        self.cursor = if forward {
            (self.cursor + 1) % len
        } else {
            (self.cursor + len - 1) % len
        };
        self.direction = if forward {
            Direction::Forward
        } else {
            Direction::Backward
        };
    }

    fn rearm(&mut self, now: Instant) {
        self.deadline = match self.state {
            PlayState::Playing => Some(now + self.interval),
            PlayState::Paused => None,
        };
    }

    pub fn next(&mut self, now: Instant) {
        self.step(true);
        self.rearm(now);
    }

    pub fn previous(&mut self, now: Instant) {
        self.step(false);
        self.rearm(now);
    }

    pub fn toggle(&mut self, now: Instant) {
        self.state = match self.state {
            PlayState::Playing => PlayState::Paused,
            PlayState::Paused => PlayState::Playing,
        };
        debug!("Slideshow {:?} at slide {}", self.state, self.cursor + 1);
        self.rearm(now);
    }

    /// Fire the timer if its deadline has passed. Returns whether the cursor
    /// moved. Landing on the last slide pauses playback.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return false,
        }
        self.step(true);
        if self.is_last() {
            self.state = PlayState::Paused;
        }
        self.rearm(now);
        true
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> PlayerAction {
        match key {
            Key::Left => self.previous(now),
            Key::Right => self.next(now),
            Key::Space => self.toggle(now),
            Key::Escape => return PlayerAction::Exit,
        }
        PlayerAction::Continue
    }
}
