use crate::problem::Difficulty;
use crate::session::DotState;

/// Which top-level screen is visible. This presentation state machine is
/// deliberately separate from the tutoring state machine: the tutoring core
/// never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    KeyEntry,
    Start,
    Chat,
    Settings,
}

/// One rendered transcript entry. Reveal replies that carried well-formed
/// sentinel markers get the segmented variant; everything else is plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    Student(String),
    Mentor(String),
    MentorPseudo {
        before: String,
        pseudocode: String,
        after: String,
    },
    System(String),
}

/// Context-bar data cached from the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBar {
    pub title: String,
    pub difficulty: Difficulty,
    pub language: String,
    pub dots: Vec<DotState>,
}

/// A single-line editable input with a char-based cursor.
#[derive(Debug, Default)]
pub struct InputState {
    text: String,
    cursor: usize,
}

impl InputState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = char_to_byte_idx(&self.text, self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor = self.cursor.saturating_add(1);
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = char_to_byte_idx(&self.text, self.cursor - 1);
        let end = char_to_byte_idx(&self.text, self.cursor);
        self.text.drain(start..end);
        self.cursor -= 1;
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Trimmed contents, or `None` for whitespace-only input. Does not clear.
    pub fn trimmed(&self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

const CHAT_PAGE_SCROLL_LINES: u16 = 5;

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub ticks: u64,
    screen: Screen,
    settings_return: Screen,
    key_input: InputState,
    target_input: InputState,
    chat_input: InputState,
    mask_key: bool,
    key_error: Option<String>,
    key_notice: Option<String>,
    start_error: Option<String>,
    masked_stored_key: Option<String>,
    entries: Vec<ChatEntry>,
    chat_scroll: u16,
    follow_chat: bool,
    context: Option<ContextBar>,
    verify_in_flight: bool,
    read_in_flight: bool,
    reread_in_flight: bool,
    reply_in_flight: bool,
    session_started: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            running: true,
            ticks: 0,
            screen: Screen::KeyEntry,
            settings_return: Screen::Start,
            key_input: InputState::default(),
            target_input: InputState::default(),
            chat_input: InputState::default(),
            mask_key: true,
            key_error: None,
            key_notice: None,
            start_error: None,
            masked_stored_key: None,
            entries: Vec::new(),
            chat_scroll: 0,
            follow_chat: true,
            context: None,
            verify_in_flight: false,
            read_in_flight: false,
            reread_in_flight: false,
            reply_in_flight: false,
            session_started: false,
        }
    }
}

impl App {
    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    // --- screens -----------------------------------------------------------

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn show_key_entry(&mut self) {
        self.screen = Screen::KeyEntry;
        self.key_input.clear();
        self.mask_key = true;
        self.key_notice = None;
    }

    pub fn show_start(&mut self) {
        self.screen = Screen::Start;
        self.start_error = None;
    }

    pub fn show_chat(&mut self) {
        self.screen = Screen::Chat;
        self.session_started = true;
        self.follow_chat = true;
    }

    pub fn open_settings(&mut self, masked_key: Option<String>) {
        if self.screen == Screen::Settings {
            return;
        }
        self.settings_return = self.screen;
        self.masked_stored_key = masked_key;
        self.screen = Screen::Settings;
    }

    /// Back from settings returns to the chat when a session has started,
    /// otherwise to wherever settings was opened from.
    pub fn close_settings(&mut self) {
        self.screen = if self.session_started {
            Screen::Chat
        } else {
            self.settings_return
        };
    }

    pub fn session_started(&self) -> bool {
        self.session_started
    }

    // --- input editing -----------------------------------------------------

    fn active_input_mut(&mut self) -> Option<&mut InputState> {
        match self.screen {
            Screen::KeyEntry => Some(&mut self.key_input),
            Screen::Start => Some(&mut self.target_input),
            Screen::Chat => Some(&mut self.chat_input),
            Screen::Settings => None,
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.active_input_mut() {
            input.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.active_input_mut() {
            input.backspace();
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some(input) = self.active_input_mut() {
            input.move_left();
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(input) = self.active_input_mut() {
            input.move_right();
        }
    }

    pub fn key_input(&self) -> &InputState {
        &self.key_input
    }

    pub fn target_input(&self) -> &InputState {
        &self.target_input
    }

    pub fn target_input_mut(&mut self) -> &mut InputState {
        &mut self.target_input
    }

    pub fn chat_input(&self) -> &InputState {
        &self.chat_input
    }

    pub fn take_chat_message(&mut self) -> Option<String> {
        let message = self.chat_input.trimmed()?;
        self.chat_input.clear();
        Some(message)
    }

    pub fn toggle_key_mask(&mut self) {
        if self.screen == Screen::KeyEntry {
            self.mask_key = !self.mask_key;
        }
    }

    pub fn key_masked(&self) -> bool {
        self.mask_key
    }

    // --- notices -----------------------------------------------------------

    pub fn set_key_error(&mut self, message: impl Into<String>) {
        self.key_error = Some(message.into());
        self.key_notice = None;
    }

    pub fn set_key_notice(&mut self, message: impl Into<String>) {
        self.key_notice = Some(message.into());
        self.key_error = None;
    }

    pub fn clear_key_messages(&mut self) {
        self.key_error = None;
        self.key_notice = None;
    }

    pub fn key_error(&self) -> Option<&str> {
        self.key_error.as_deref()
    }

    pub fn key_notice(&self) -> Option<&str> {
        self.key_notice.as_deref()
    }

    pub fn set_start_error(&mut self, message: impl Into<String>) {
        self.start_error = Some(message.into());
    }

    pub fn clear_start_error(&mut self) {
        self.start_error = None;
    }

    pub fn start_error(&self) -> Option<&str> {
        self.start_error.as_deref()
    }

    pub fn masked_stored_key(&self) -> Option<&str> {
        self.masked_stored_key.as_deref()
    }

    // --- transcript --------------------------------------------------------

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn clear_transcript(&mut self) {
        self.entries.clear();
        self.chat_scroll = 0;
        self.follow_chat = true;
    }

    pub fn push_student(&mut self, text: impl Into<String>) {
        self.push_entry(ChatEntry::Student(text.into()));
    }

    pub fn push_mentor(&mut self, text: impl Into<String>) {
        self.push_entry(ChatEntry::Mentor(text.into()));
    }

    pub fn push_mentor_pseudo(&mut self, before: String, pseudocode: String, after: String) {
        self.push_entry(ChatEntry::MentorPseudo {
            before,
            pseudocode,
            after,
        });
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.push_entry(ChatEntry::System(text.into()));
    }

    fn push_entry(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
        self.follow_chat = true;
    }

    // --- context bar -------------------------------------------------------

    pub fn context(&self) -> Option<&ContextBar> {
        self.context.as_ref()
    }

    pub fn set_context(&mut self, context: ContextBar) {
        self.context = Some(context);
    }

    pub fn set_dots(&mut self, dots: Vec<DotState>) {
        if let Some(context) = self.context.as_mut() {
            context.dots = dots;
        }
    }

    pub fn set_context_language(&mut self, language: impl Into<String>) {
        if let Some(context) = self.context.as_mut() {
            context.language = language.into();
        }
    }

    // --- scrolling ---------------------------------------------------------

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.follow_chat = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines.max(1));
    }

    pub fn scroll_chat_down(&mut self, lines: u16, max_scroll: u16) {
        self.chat_scroll = self
            .chat_scroll
            .saturating_add(lines.max(1))
            .min(max_scroll);
        if self.chat_scroll >= max_scroll {
            self.follow_chat = true;
        }
    }

    pub fn chat_page_lines() -> u16 {
        CHAT_PAGE_SCROLL_LINES
    }

    /// Effective scroll for rendering: pinned to the bottom while following.
    pub fn chat_scroll_for(&self, max_scroll: u16) -> u16 {
        if self.follow_chat {
            max_scroll
        } else {
            self.chat_scroll.min(max_scroll)
        }
    }

    // --- busy flags --------------------------------------------------------

    pub fn set_verify_in_flight(&mut self, value: bool) {
        self.verify_in_flight = value;
    }

    pub fn verify_in_flight(&self) -> bool {
        self.verify_in_flight
    }

    pub fn set_read_in_flight(&mut self, value: bool) {
        self.read_in_flight = value;
    }

    pub fn read_in_flight(&self) -> bool {
        self.read_in_flight
    }

    pub fn set_reread_in_flight(&mut self, value: bool) {
        self.reread_in_flight = value;
    }

    pub fn reread_in_flight(&self) -> bool {
        self.reread_in_flight
    }

    pub fn set_reply_in_flight(&mut self, value: bool) {
        self.reply_in_flight = value;
    }

    pub fn reply_in_flight(&self) -> bool {
        self.reply_in_flight
    }

    // --- chat commands -----------------------------------------------------

    pub fn is_quit_command(message: &str) -> bool {
        let normalized = message.trim();
        normalized.eq_ignore_ascii_case("/quit") || normalized.eq_ignore_ascii_case("/exit")
    }

    pub fn is_settings_command(message: &str) -> bool {
        message.trim().eq_ignore_ascii_case("/settings")
    }

    pub fn is_reread_command(message: &str) -> bool {
        message.trim().eq_ignore_ascii_case("/reread")
    }
}

#[cfg(test)]
#[path = "../tests/unit/app_tests.rs"]
mod tests;
