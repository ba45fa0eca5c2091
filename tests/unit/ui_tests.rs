use super::*;
use crate::app::App;
use crate::session::DotState;

#[test]
fn dots_glyphs_render_each_slot_state() {
    let glyphs = dots_glyphs(&[DotState::Used, DotState::Empty, DotState::Pseudo]);
    assert_eq!(glyphs, "\u{25CF} \u{25CB} \u{25C6}");
}

#[test]
fn dots_glyphs_empty_indicator_is_empty() {
    assert_eq!(dots_glyphs(&[]), "");
}

#[test]
fn thinking_frames_cycle() {
    let first = thinking_frame(0);
    assert_eq!(first, "[   ]");
    // One full cycle later the frame repeats.
    assert_eq!(thinking_frame(12), first);
    assert_ne!(thinking_frame(2), first);
}

#[test]
fn difficulty_colors_are_distinct() {
    use crate::problem::Difficulty;
    let colors = [
        difficulty_color(Difficulty::Easy),
        difficulty_color(Difficulty::Medium),
        difficulty_color(Difficulty::Hard),
        difficulty_color(Difficulty::Unknown),
    ];
    for (i, a) in colors.iter().enumerate() {
        for b in colors.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn status_line_reflects_the_active_screen() {
    let mut app = App::default();
    assert!(status_line_text(&app).contains("verify & save"));
    app.show_start();
    assert!(status_line_text(&app).contains("start session"));
    app.show_chat();
    assert!(status_line_text(&app).contains("/reread"));
    app.open_settings(None);
    assert!(status_line_text(&app).contains("change key"));
}

#[test]
fn status_line_appends_busy_animation() {
    let mut app = App::default();
    app.set_verify_in_flight(true);
    assert!(status_line_text(&app).contains("Verifying key"));
    app.set_verify_in_flight(false);

    app.show_start();
    app.set_read_in_flight(true);
    assert!(status_line_text(&app).contains("Reading page"));
    app.set_read_in_flight(false);

    app.show_chat();
    app.set_reply_in_flight(true);
    assert!(status_line_text(&app).contains("Mentor is thinking"));
}
