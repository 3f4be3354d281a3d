// ABOUTME: Screen navigation for the slideforge application
// ABOUTME: Tracks the screen back stack and the key events shared by editor and player

use crate::storage::{SessionStore, Storage};
use log::debug;
use std::fmt;

/// Keyboard input understood by the editor and the slideshow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Space,
    Escape,
}

impl Key {
    /// Map a DOM-style key name or its terminal shorthand.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "Left" | "left" | "p" => Some(Key::Left),
            "ArrowRight" | "Right" | "right" | "n" => Some(Key::Right),
            " " | "Space" | "space" => Some(Key::Space),
            "Escape" | "Esc" | "escape" | "esc" | "q" => Some(Key::Escape),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Create,
    Editor,
    Preview,
}

impl Screen {
    /// Editor and Preview only make sense with a stored deck.
    pub fn needs_presentation(&self) -> bool {
        matches!(self, Screen::Editor | Screen::Preview)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = match self {
            Screen::Home => "/",
            Screen::Create => "/create",
            Screen::Editor => "/editor",
            Screen::Preview => "/preview",
        };
        f.write_str(path)
    }
}

/// Back-stack navigation between screens.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            stack: vec![Screen::Home],
        }
    }

    pub fn current(&self) -> Screen {
        // The stack is never emptied below its root.
        self.stack.last().copied().unwrap_or(Screen::Home)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, screen: Screen) {
        debug!("Navigating to {}", screen);
        self.stack.push(screen);
    }

    pub fn replace(&mut self, screen: Screen) {
        debug!("Replacing {} with {}", self.current(), screen);
        match self.stack.last_mut() {
            Some(top) => *top = screen,
            None => self.stack.push(screen),
        }
    }

    /// Pop one screen. Returns `false` at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    /// Push `screen`, or redirect to Create when it needs a deck and the
    /// store holds none. Returns the screen actually shown.
    pub fn open<S: Storage>(&mut self, screen: Screen, store: &SessionStore<S>) -> Screen {
        self.push(screen);
        if screen.needs_presentation() && !has_presentation(store) {
            self.replace(Screen::Create);
        }
        self.current()
    }
}

fn has_presentation<S: Storage>(store: &SessionStore<S>) -> bool {
    matches!(store.load_presentation(), Ok(Some(_)))
}
