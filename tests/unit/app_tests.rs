use super::*;
use crate::session::DotState;

fn chat_app() -> App {
    let mut app = App::default();
    app.show_start();
    app.show_chat();
    app
}

#[test]
fn starts_on_key_entry_screen() {
    let app = App::default();
    assert_eq!(app.screen(), Screen::KeyEntry);
    assert!(app.key_masked());
    assert!(!app.session_started());
}

#[test]
fn input_editing_handles_unicode_boundaries() {
    let mut app = App::default();
    app.input_char('é');
    app.input_char('b');
    app.cursor_left();
    app.input_char('a');
    assert_eq!(app.key_input().text(), "éab");
    app.backspace();
    assert_eq!(app.key_input().text(), "éb");
    assert_eq!(app.key_input().cursor(), 1);
}

#[test]
fn cursor_movement_is_clamped_to_the_text() {
    let mut app = App::default();
    app.input_char('h');
    app.input_char('i');
    app.cursor_right();
    app.cursor_right();
    assert_eq!(app.key_input().cursor(), 2);
    app.cursor_left();
    app.cursor_left();
    app.cursor_left();
    assert_eq!(app.key_input().cursor(), 0);
    app.backspace(); // no-op at the start
    assert_eq!(app.key_input().text(), "hi");
}

#[test]
fn each_screen_edits_its_own_input() {
    let mut app = App::default();
    app.input_char('k');
    app.show_start();
    app.input_char('u');
    app.show_chat();
    app.input_char('c');
    assert_eq!(app.key_input().text(), "k");
    assert_eq!(app.target_input().text(), "u");
    assert_eq!(app.chat_input().text(), "c");
}

#[test]
fn take_chat_message_trims_and_clears() {
    let mut app = chat_app();
    for c in "  hello there  ".chars() {
        app.input_char(c);
    }
    assert_eq!(app.take_chat_message().as_deref(), Some("hello there"));
    assert_eq!(app.chat_input().text(), "");
    assert!(app.take_chat_message().is_none());
}

#[test]
fn whitespace_only_chat_input_yields_no_message() {
    let mut app = chat_app();
    for c in "   ".chars() {
        app.input_char(c);
    }
    assert!(app.take_chat_message().is_none());
}

#[test]
fn settings_returns_to_start_before_a_session_exists() {
    let mut app = App::default();
    app.show_start();
    app.open_settings(None);
    assert_eq!(app.screen(), Screen::Settings);
    app.close_settings();
    assert_eq!(app.screen(), Screen::Start);
}

#[test]
fn settings_returns_to_chat_once_a_session_has_started() {
    let mut app = chat_app();
    app.open_settings(Some("gsk_abcd\u{2022}\u{2022}wxyz".to_string()));
    assert_eq!(app.masked_stored_key(), Some("gsk_abcd\u{2022}\u{2022}wxyz"));
    app.close_settings();
    assert_eq!(app.screen(), Screen::Chat);
}

#[test]
fn key_mask_toggle_only_applies_on_the_key_screen() {
    let mut app = App::default();
    assert!(app.key_masked());
    app.toggle_key_mask();
    assert!(!app.key_masked());
    app.show_start();
    app.toggle_key_mask();
    // Unchanged away from the key screen; re-entry restores masking.
    app.show_key_entry();
    assert!(app.key_masked());
}

#[test]
fn key_error_and_notice_are_mutually_exclusive() {
    let mut app = App::default();
    app.set_key_error("bad key");
    assert_eq!(app.key_error(), Some("bad key"));
    app.set_key_notice("saved");
    assert_eq!(app.key_notice(), Some("saved"));
    assert!(app.key_error().is_none());
}

#[test]
fn transcript_entries_accumulate_in_order() {
    let mut app = chat_app();
    app.push_student("my guess");
    app.push_mentor("why?");
    app.push_system("note");
    app.push_mentor_pseudo(
        "Good try".to_string(),
        "1. scan".to_string(),
        "now implement".to_string(),
    );
    assert_eq!(app.entries().len(), 4);
    assert_eq!(
        app.entries()[0],
        ChatEntry::Student("my guess".to_string())
    );
    assert!(matches!(app.entries()[3], ChatEntry::MentorPseudo { .. }));
}

#[test]
fn clearing_the_transcript_resets_scroll_state() {
    let mut app = chat_app();
    app.push_mentor("hello");
    app.scroll_chat_up(1);
    app.clear_transcript();
    assert!(app.entries().is_empty());
    assert_eq!(app.chat_scroll_for(10), 10); // following the bottom again
}

#[test]
fn scrolling_up_unpins_and_new_messages_repin() {
    let mut app = chat_app();
    app.push_mentor("one");
    assert_eq!(app.chat_scroll_for(7), 7);
    app.scroll_chat_up(1);
    assert_ne!(app.chat_scroll_for(7), 7);
    app.push_mentor("two");
    assert_eq!(app.chat_scroll_for(7), 7);
}

#[test]
fn scrolling_to_the_bottom_repins() {
    let mut app = chat_app();
    app.push_mentor("one");
    app.scroll_chat_up(3);
    app.scroll_chat_down(1, 2);
    app.scroll_chat_down(1, 2);
    app.scroll_chat_down(1, 2);
    assert_eq!(app.chat_scroll_for(5), 5);
}

#[test]
fn context_bar_updates_language_and_dots_in_place() {
    let mut app = chat_app();
    app.set_context(ContextBar {
        title: "Two Sum".to_string(),
        difficulty: crate::problem::Difficulty::Easy,
        language: "unknown".to_string(),
        dots: vec![DotState::Empty, DotState::Empty, DotState::Empty],
    });
    app.set_context_language("rust");
    app.set_dots(vec![DotState::Used, DotState::Empty, DotState::Empty]);
    let context = app.context().expect("context");
    assert_eq!(context.language, "rust");
    assert_eq!(context.dots[0], DotState::Used);
}

#[test]
fn recognizes_chat_commands() {
    assert!(App::is_quit_command("/quit"));
    assert!(App::is_quit_command("  /EXIT "));
    assert!(!App::is_quit_command("quit please"));
    assert!(App::is_settings_command("/settings"));
    assert!(!App::is_settings_command("/settings now"));
    assert!(App::is_reread_command("/reread"));
    assert!(!App::is_reread_command("/re read"));
}

#[test]
fn busy_flags_round_trip() {
    let mut app = App::default();
    app.set_verify_in_flight(true);
    app.set_read_in_flight(true);
    app.set_reread_in_flight(true);
    app.set_reply_in_flight(true);
    assert!(app.verify_in_flight());
    assert!(app.read_in_flight());
    assert!(app.reread_in_flight());
    assert!(app.reply_in_flight());
}
